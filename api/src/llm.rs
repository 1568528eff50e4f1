//! OpenAI-compatible chat-completions client backing the session analyzer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use engage_core::reasoner::{Reasoner, ReasonerError};

use crate::config::LlmSettings;

const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiReasoner {
    client: Client,
    endpoint: String,
    api_key: String,
    settings: LlmSettings,
}

impl OpenAiReasoner {
    pub fn new(settings: &LlmSettings, api_key: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url),
            api_key: api_key.to_string(),
            settings: settings.clone(),
        })
    }

    fn request_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        }
    }

    fn classify(&self, err: reqwest::Error) -> ReasonerError {
        if err.is_timeout() {
            ReasonerError::Timeout(self.settings.timeout.as_secs())
        } else {
            ReasonerError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Reasoner for OpenAiReasoner {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ReasonerError> {
        tracing::debug!(
            model = %self.settings.model,
            endpoint = %self.endpoint,
            "calling reasoning service"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system, user))
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let text = response.text().await.map_err(|err| self.classify(err))?;

        if !status.is_success() {
            return Err(ReasonerError::Status {
                status: status.as_u16(),
                body: truncate_chars(&text, MAX_ERROR_BODY_CHARS),
            });
        }

        extract_content(&text)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response body.
fn extract_content(body: &str) -> Result<String, ReasonerError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|err| ReasonerError::Malformed(err.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ReasonerError::Malformed("no choices in response".to_string()))?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
