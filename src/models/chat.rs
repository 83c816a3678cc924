use serde::{ Serialize, Deserialize };

/// Who produced a message in the frontend's conversation log.
///
/// Anything other than `user` or `rhesus` lands on `Unknown` so a single
/// odd entry does not reject the whole request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Rhesus,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: Author,
    pub content: String,
}

/// Body of `POST /api/chat`. The last message is the active prompt; all
/// preceding messages are prior turns.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatReply {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorReply {
    pub error: String,
}
