use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:4000")]
    pub server_addr: String,

    /// API key for the upstream chat API. Chat requests fail with a
    /// configuration error while this is unset.
    #[arg(long, env = "API_KEY")]
    pub api_key: Option<String>,

    /// Model name for chat completion (e.g., gemini-2.5-flash)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter default if None
    pub chat_model: Option<String>,

    /// Base URL for the chat provider API
    #[arg(long, env = "CHAT_BASE_URL")] // No default, rely on adapter default if None
    pub chat_base_url: Option<String>,

    /// Optional path to a file whose contents replace the built-in system instruction.
    #[arg(long, env = "PERSONA_PATH")]
    pub persona_path: Option<String>,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
