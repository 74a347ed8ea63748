use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_key, check_status, http_client, Chat, ChatError, Message, Role, SendResult};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const MAX_TOKENS: u32 = 8192;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

pub struct AnthropicChat {
    client: Client,
    api_key: String,
    history: Vec<Message>,
}

impl AnthropicChat {
    pub fn new(api_key: String) -> Result<Self, ChatError> {
        Ok(Self {
            client: http_client()?,
            api_key,
            history: Vec::new(),
        })
    }

    /// Read the key from `ANTHROPIC_API_KEY`
    pub fn from_env() -> Result<Self, ChatError> {
        Self::new(api_key(API_KEY_VAR)?)
    }
}

impl Chat for AnthropicChat {
    fn send(&mut self, prompt: &str, model: &str) -> Result<SendResult, ChatError> {
        self.history.push(Message {
            role: Role::User,
            content: prompt.to_string(),
        });

        let request = MessagesRequest {
            model,
            max_tokens: MAX_TOKENS,
            messages: &self.history,
        };
        debug!("POST {} ({} messages)", API_URL, self.history.len());

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()?;
        let body: MessagesResponse = check_status(response)?.json()?;

        let content: String = body
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();
        if content.is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        self.history.push(Message {
            role: Role::Assistant,
            content: content.clone(),
        });

        Ok(SendResult {
            content,
            finish_reason: body.stop_reason.unwrap_or_default(),
        })
    }

    fn history(&self) -> &[Message] {
        &self.history
    }
}
