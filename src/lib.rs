pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;

use cli::Args;
use log::info;
use relay::ChatRelay;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("API Key Present: {}", args.api_key.as_deref().map_or(false, |k| !k.is_empty()));
    info!("Persona Path: {}", args.persona_path.as_deref().unwrap_or("built-in"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let relay = Arc::new(ChatRelay::from_args(&args)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, relay, args);
    server.run().await?;

    Ok(())
}
