pub mod gemini;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;

use super::LlmConfig;
use self::gemini::GeminiChatClient;

/// Role of a prior turn as the upstream chat API understands it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryRole {
    User,
    Model,
}

impl HistoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRole::User => "user",
            HistoryRole::Model => "model",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

/// One provider-side chat session: a fixed system instruction, the prior
/// turns in conversation order, and the new user message. Used for exactly
/// one exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub system_instruction: String,
    pub history: Vec<HistoryEntry>,
    pub message: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one message in a session seeded with history and a system
    /// instruction, and await the full (non-streamed) reply text.
    async fn send_message(
        &self,
        session: SessionRequest
    ) -> Result<String, Box<dyn StdError + Send + Sync>>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
