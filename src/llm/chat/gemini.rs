use async_trait::async_trait;
use log::info;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::{ ChatClient, HistoryRole, SessionRequest };
use crate::llm::LlmConfig;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiInstruction,
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    #[serde(default)]
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    #[serde(default)]
    text: String,
}

fn extract_text(resp: GoogleResponse) -> Option<String> {
    let candidate = resp.candidates.into_iter().next()?;
    let content = candidate.content?;
    let text: String = content.parts
        .into_iter()
        .map(|p| p.text)
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub struct GeminiChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "Google API key is required for GeminiChatClient".to_string())?;
        Ok(
            Self::new(api_key, config.completion_model.clone(), config.base_url.clone())
        )
    }

    fn build_payload(&self, session: SessionRequest) -> GenerateContentRequest {
        let mut contents: Vec<GeminiContent> = session.history
            .into_iter()
            .map(|entry| GeminiContent {
                role: entry.role.as_str().to_string(),
                parts: vec![GeminiPart { text: entry.text }],
            })
            .collect();
        contents.push(GeminiContent {
            role: HistoryRole::User.as_str().to_string(),
            parts: vec![GeminiPart { text: session.message }],
        });

        GenerateContentRequest {
            system_instruction: GeminiInstruction {
                parts: vec![GeminiPart { text: session.system_instruction }],
            },
            contents,
        }
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn send_message(
        &self,
        session: SessionRequest
    ) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let payload = self.build_payload(session);
        // Key travels in the query string, as the API expects.
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        );

        info!("GeminiChatClient::send_message() → model={}", self.model);

        let resp = self.http
            .post(&url)
            .json(&payload)
            .send().await?
            .error_for_status()?;
        let body: GoogleResponse = resp.json().await?;

        extract_text(body).ok_or_else(|| "Gemini response contained no generated text".into())
    }
}
