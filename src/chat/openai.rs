use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_key, check_status, http_client, Chat, ChatError, Message, Role, SendResult};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChat {
    client: Client,
    api_key: String,
    history: Vec<Message>,
}

impl OpenAiChat {
    pub fn new(api_key: String) -> Result<Self, ChatError> {
        Ok(Self {
            client: http_client()?,
            api_key,
            history: Vec::new(),
        })
    }

    /// Read the key from `OPENAI_API_KEY`
    pub fn from_env() -> Result<Self, ChatError> {
        Self::new(api_key(API_KEY_VAR)?)
    }
}

impl Chat for OpenAiChat {
    fn send(&mut self, prompt: &str, model: &str) -> Result<SendResult, ChatError> {
        self.history.push(Message {
            role: Role::User,
            content: prompt.to_string(),
        });

        let request = CompletionRequest {
            model,
            messages: &self.history,
        };
        debug!("POST {} ({} messages)", API_URL, self.history.len());

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;
        let body: CompletionResponse = check_status(response)?.json()?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyResponse)?;
        let content = choice.message.content.ok_or(ChatError::EmptyResponse)?;

        self.history.push(Message {
            role: Role::Assistant,
            content: content.clone(),
        });

        Ok(SendResult {
            content,
            finish_reason: choice.finish_reason.unwrap_or_default(),
        })
    }

    fn history(&self) -> &[Message] {
        &self.history
    }
}
