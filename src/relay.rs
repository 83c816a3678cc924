use log::{ info, warn };
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::cli::Args;
use crate::config::persona;
use crate::llm::LlmConfig;
use crate::llm::chat::{ new_client as new_chat_client, ChatClient, HistoryEntry, HistoryRole, SessionRequest };
use crate::models::chat::{ Author, ChatMessage, ChatReply, ChatRequest };

pub const MESSAGES_REQUIRED: &str = "Invalid request body. 'messages' key is required.";

#[derive(Debug)]
pub enum RelayError {
    InvalidRequest(String),
    MissingApiKey,
    Upstream(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::InvalidRequest(msg) => write!(f, "{}", msg),
            RelayError::MissingApiKey => write!(f, "API_KEY environment variable not set."),
            RelayError::Upstream(e) => write!(f, "Upstream chat request failed: {}", e),
        }
    }
}

impl Error for RelayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RelayError::Upstream(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Stateless relay between the frontend's conversation log and the
/// upstream chat API. Configuration is fixed at construction; each
/// request builds its own session.
pub struct ChatRelay {
    chat_client: Option<Arc<dyn ChatClient>>,
    system_instruction: String,
}

impl ChatRelay {
    pub fn new(chat_client: Option<Arc<dyn ChatClient>>, system_instruction: String) -> Self {
        Self { chat_client, system_instruction }
    }

    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let system_instruction = persona::load_system_instruction(
            args.persona_path.as_deref()
        )?;

        let chat_client = match &args.api_key {
            Some(key) if !key.is_empty() => {
                let config = LlmConfig {
                    api_key: Some(key.clone()),
                    completion_model: args.chat_model.clone(),
                    base_url: args.chat_base_url.clone(),
                };
                Some(new_chat_client(&config)?)
            }
            _ => {
                warn!("API_KEY is not set; chat requests will fail until it is provided.");
                None
            }
        };

        Ok(Self::new(chat_client, system_instruction))
    }

    /// Relay one conversation turn: validate, map history, run a single
    /// upstream exchange, and hand back the generated text.
    pub async fn handle_chat(&self, request: ChatRequest) -> Result<ChatReply, RelayError> {
        let Some((prompt, history_messages)) = request.messages.split_last() else {
            return Err(RelayError::InvalidRequest(MESSAGES_REQUIRED.to_string()));
        };

        let chat_client = self.chat_client.as_ref().ok_or(RelayError::MissingApiKey)?;

        let history = map_history(history_messages);
        info!(
            "Relaying chat turn: {} prior message(s), {} forwarded",
            history_messages.len(),
            history.len()
        );

        let session = SessionRequest {
            system_instruction: self.system_instruction.clone(),
            history,
            message: prompt.content.clone(),
        };

        let text = chat_client.send_message(session).await.map_err(RelayError::Upstream)?;
        Ok(ChatReply { text })
    }
}

/// Map prior turns into upstream roles. Entries with an unrecognized
/// author are dropped from the forwarded history, not rejected.
fn map_history(messages: &[ChatMessage]) -> Vec<HistoryEntry> {
    messages
        .iter()
        .filter_map(|msg| {
            let role = match msg.author {
                Author::User => HistoryRole::User,
                Author::Rhesus => HistoryRole::Model,
                Author::Unknown => {
                    warn!("Dropping history entry with unrecognized author");
                    return None;
                }
            };
            Some(HistoryEntry { role, text: msg.content.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct StubChatClient {
        reply: Option<String>,
        calls: AtomicUsize,
        seen: Mutex<Vec<SessionRequest>>,
    }

    impl StubChatClient {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatClient for StubChatClient {
        async fn send_message(
            &self,
            session: SessionRequest
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(session);
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err("upstream unavailable".into()),
            }
        }
    }

    fn message(author: Author, content: &str) -> ChatMessage {
        ChatMessage { author, content: content.to_string() }
    }

    fn relay_with(stub: Arc<StubChatClient>) -> ChatRelay {
        ChatRelay::new(Some(stub as Arc<dyn ChatClient>), "persona".to_string())
    }

    #[tokio::test]
    async fn maps_history_in_order_and_splits_prompt() {
        let stub = StubChatClient::replying("ok");
        let relay = relay_with(stub.clone());

        let request = ChatRequest {
            messages: vec![
                message(Author::User, "a"),
                message(Author::Rhesus, "b"),
                message(Author::User, "c")
            ],
        };
        relay.handle_chat(request).await.unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system_instruction, "persona");
        assert_eq!(seen[0].message, "c");
        assert_eq!(
            seen[0].history,
            vec![
                HistoryEntry { role: HistoryRole::User, text: "a".to_string() },
                HistoryEntry { role: HistoryRole::Model, text: "b".to_string() }
            ]
        );
    }

    #[tokio::test]
    async fn unknown_authors_are_dropped_without_failing() {
        let stub = StubChatClient::replying("ok");
        let relay = relay_with(stub.clone());

        let request = ChatRequest {
            messages: vec![
                message(Author::User, "a"),
                message(Author::Unknown, "noise"),
                message(Author::Rhesus, "b"),
                message(Author::User, "c")
            ],
        };
        relay.handle_chat(request).await.unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].history.len(), 2);
        assert!(seen[0].history.iter().all(|entry| entry.text != "noise"));
    }

    #[tokio::test]
    async fn empty_messages_never_reach_upstream() {
        let stub = StubChatClient::replying("ok");
        let relay = relay_with(stub.clone());

        let err = relay.handle_chat(ChatRequest { messages: vec![] }).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest(_)));
        assert_eq!(err.to_string(), MESSAGES_REQUIRED);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_api_key_is_a_configuration_error() {
        let relay = ChatRelay::new(None, "persona".to_string());

        let request = ChatRequest { messages: vec![message(Author::User, "hi")] };
        let err = relay.handle_chat(request).await.unwrap_err();
        assert!(matches!(err, RelayError::MissingApiKey));
        assert_eq!(err.to_string(), "API_KEY environment variable not set.");
    }

    #[tokio::test]
    async fn upstream_failures_are_classified_as_upstream() {
        let stub = StubChatClient::failing();
        let relay = relay_with(stub);

        let request = ChatRequest { messages: vec![message(Author::User, "hi")] };
        let err = relay.handle_chat(request).await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream(_)));
    }

    #[tokio::test]
    async fn single_message_means_empty_history() {
        let stub = StubChatClient::replying("Hello there");
        let relay = relay_with(stub.clone());

        let request = ChatRequest { messages: vec![message(Author::User, "hi")] };
        let reply = relay.handle_chat(request).await.unwrap();
        assert_eq!(reply.text, "Hello there");

        let seen = stub.seen.lock().unwrap();
        assert!(seen[0].history.is_empty());
        assert_eq!(seen[0].message, "hi");
    }

    #[tokio::test]
    async fn identical_requests_yield_identical_replies() {
        let stub = StubChatClient::replying("deterministic");
        let relay = relay_with(stub.clone());

        let request = ChatRequest {
            messages: vec![message(Author::User, "a"), message(Author::User, "b")],
        };
        let first = relay.handle_chat(request.clone()).await.unwrap();
        let second = relay.handle_chat(request).await.unwrap();

        assert_eq!(first.text, second.text);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0], seen[1]);
    }
}
