use super::{Chat, ChatError, Message, Role, SendResult};

const CANNED_ANSWER: &str = "This is a canned answer from the local driver. No model was called.";

/// Offline driver that answers every prompt with the same text
pub struct LocalChat {
    answer: String,
    history: Vec<Message>,
}

impl LocalChat {
    pub fn new() -> Self {
        Self::with_answer(CANNED_ANSWER)
    }

    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            history: Vec::new(),
        }
    }
}

impl Default for LocalChat {
    fn default() -> Self {
        Self::new()
    }
}

impl Chat for LocalChat {
    fn send(&mut self, prompt: &str, _model: &str) -> Result<SendResult, ChatError> {
        self.history.push(Message {
            role: Role::User,
            content: prompt.to_string(),
        });
        self.history.push(Message {
            role: Role::Assistant,
            content: self.answer.clone(),
        });

        Ok(SendResult {
            content: self.answer.clone(),
            finish_reason: "stop".to_string(),
        })
    }

    fn history(&self) -> &[Message] {
        &self.history
    }
}
