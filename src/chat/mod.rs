//! LLM chat capability and its provider implementations.
//!
//! Every provider keeps the conversation so far and resends it with each prompt.

pub mod anthropic;
pub mod local;
pub mod openai;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use anthropic::AnthropicChat;
pub use local::LocalChat;
pub use openai::OpenAiChat;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
// Generation of a long file can take minutes
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("unsupported LLM driver: {0} (expected anthropic, open-ai or local)")]
    UnsupportedDriver(String),

    #[error("{var} is not set")]
    MissingApiKey { var: &'static str },

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("API response contained no content")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    pub content: String,
    pub finish_reason: String,
}

pub trait Chat {
    /// Send `prompt` as the next user turn and return the model's reply
    fn send(&mut self, prompt: &str, model: &str) -> Result<SendResult, ChatError>;

    /// Conversation so far, oldest first
    fn history(&self) -> &[Message];
}

/// Select the chat implementation for a configured driver name.
pub fn factory(driver: &str) -> Result<Box<dyn Chat>, ChatError> {
    match driver {
        "anthropic" => Ok(Box::new(AnthropicChat::from_env()?)),
        "open-ai" => Ok(Box::new(OpenAiChat::from_env()?)),
        "local" => Ok(Box::new(LocalChat::new())),
        other => Err(ChatError::UnsupportedDriver(other.to_string())),
    }
}

pub(crate) fn api_key(var: &'static str) -> Result<String, ChatError> {
    std::env::var(var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or(ChatError::MissingApiKey { var })
}

pub(crate) fn http_client() -> Result<Client, ChatError> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("sisho/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Turn a non-2xx response into `ChatError::Status`, keeping the body for diagnosis
pub(crate) fn check_status(response: Response) -> Result<Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ChatError::Status {
        status: status.as_u16(),
        body,
    })
}
