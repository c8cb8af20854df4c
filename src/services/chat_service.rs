use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::ChatProviderConfig;

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant for PanelX, a comic creation platform.\n\n\
Your role is to help comic creators with:\n\
- Brainstorming story ideas and plot concepts\n\
- Developing characters and their backgrounds\n\
- Suggesting panel compositions and layouts\n\
- Writing dialogue and captions\n\
- Giving creative feedback on their work\n\
- Providing comic creation tips and best practices\n\n\
Be friendly, creative, and encouraging. Keep responses concise (2-3 sentences usually).\n\
When users mention generating images, remind them they can type \"generate: description\" to create comic panels.\n\
Be enthusiastic about their comic ideas!";

const UNCONFIGURED_FALLBACK: &str =
    "AI chat is not configured. Add a chat provider API key to enable the PanelX assistant.";
const TIMEOUT_FALLBACK: &str = "The response timed out. Please try again.";
const GENERIC_FALLBACK: &str = "Something went wrong talking to the assistant. Please try again.";

/// Chat-completion provider client.
///
/// Never surfaces provider errors to the caller: every failure path collapses
/// into a friendly fallback string, so the assistant degrades instead of
/// erroring.
pub struct ChatService {
    config: ChatProviderConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponseMessage {
    content: String,
}

impl ChatService {
    pub fn new(config: &ChatProviderConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            config: config.clone(),
            http_client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends a message to the assistant and returns its reply, or a fallback
    /// string when the provider is unconfigured or misbehaves.
    #[instrument(skip(self, message))]
    pub async fn chat(&self, message: &str) -> String {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return UNCONFIGURED_FALLBACK.to_string();
        };

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatCompletionMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatCompletionMessage {
                    role: "user".to_string(),
                    content: message.to_string(),
                },
            ],
            temperature: 0.7,
            max_tokens: 300,
            top_p: 1.0,
        };

        let mut attempts = 0;
        loop {
            let response = self
                .http_client
                .post(format!("{}/chat/completions", self.config.api_base))
                .header("Authorization", format!("Bearer {}", api_key))
                .json(&request)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let parsed: std::result::Result<ChatCompletionResponse, _> = resp.json().await;
                    match parsed {
                        Ok(completion) => {
                            if let Some(choice) = completion.choices.into_iter().next() {
                                info!(
                                    "Chat completion: model={}, reply_len={}",
                                    self.config.model,
                                    choice.message.content.len()
                                );
                                return choice.message.content;
                            }
                            warn!("Chat provider returned no choices");
                            return GENERIC_FALLBACK.to_string();
                        }
                        Err(e) => {
                            warn!("Failed to parse chat completion: {}", e);
                            return GENERIC_FALLBACK.to_string();
                        }
                    }
                }
                Ok(resp) => {
                    let status = resp.status();
                    if (status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS)
                        && attempts < self.config.retry_attempts
                    {
                        attempts += 1;
                        tokio::time::sleep(std::time::Duration::from_millis(
                            200 * attempts as u64,
                        ))
                        .await;
                        continue;
                    }
                    warn!("Chat provider error: status={}", status.as_u16());
                    return GENERIC_FALLBACK.to_string();
                }
                Err(e) if e.is_timeout() => {
                    warn!("Chat provider request timed out");
                    return TIMEOUT_FALLBACK.to_string();
                }
                Err(e) => {
                    if attempts < self.config.retry_attempts {
                        attempts += 1;
                        tokio::time::sleep(std::time::Duration::from_millis(
                            200 * attempts as u64,
                        ))
                        .await;
                        continue;
                    }
                    warn!("Chat provider request failed: {}", e);
                    return GENERIC_FALLBACK.to_string();
                }
            }
        }
    }
}
