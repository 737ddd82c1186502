//! LLM Client: the single point of entry for all language-model calls.
//!
//! Talks to a local Ollama server (`/api/chat`, `/api/tags`, `/api/pull`).
//! No other module may call the inference server directly.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
/// Generous timeout: small local models on CPU can take a while.
const REQUEST_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {retries} retries")]
    Exhausted { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling options forwarded to the model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Maximum tokens to generate (Ollama's `num_predict`).
    pub num_predict: u32,
}

impl SamplingOptions {
    pub const fn new(temperature: f32, num_predict: u32) -> Self {
        Self {
            temperature,
            top_p: None,
            num_predict,
        }
    }

    pub const fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: SamplingOptions,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// The single LLM client used by all services.
/// Wraps the Ollama HTTP API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(base_url: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a full conversation and returns the assistant's reply text.
    /// Retries on transport failures and 5xx errors with exponential backoff.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: SamplingOptions,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options,
        };
        let url = format!("{}/api/chat", self.base_url);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(&request_body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM server returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
            }

            let chat: ChatResponse = response.json().await?;

            debug!(
                "LLM call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                chat.prompt_eval_count, chat.eval_count
            );

            let content = chat.message.content.trim();
            if content.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            return Ok(content.to_string());
        }

        Err(last_error.unwrap_or(LlmError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience wrapper for a single system + user exchange.
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        options: SamplingOptions,
    ) -> Result<String, LlmError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        self.chat(&messages, options).await
    }

    /// Returns whether the configured model is already present on the server.
    pub async fn is_model_available(&self) -> Result<bool, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.iter().any(|m| m.name == self.model))
    }

    /// Asks the server to download the configured model. Blocks until done.
    pub async fn pull_model(&self) -> Result<(), LlmError> {
        info!("Pulling model {}...", self.model);
        let url = format!("{}/api/pull", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PullRequest {
                name: &self.model,
                stream: false,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }
        let pulled: PullResponse = response.json().await?;
        info!("Model {} pull finished: {}", self.model, pulled.status);
        Ok(())
    }
}

/// Extracts Ollama's `{"error": "..."}` message, falling back to the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<OllamaError>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_parses_ollama_error() {
        let body = r#"{"error":"model 'llama3.2:3b' not found"}"#.to_string();
        assert_eq!(error_message(body), "model 'llama3.2:3b' not found");
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("bad gateway".to_string()), "bad gateway");
    }

    #[test]
    fn test_chat_request_serialization() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = ChatRequest {
            model: "llama3.2:3b",
            messages: &messages,
            stream: false,
            options: SamplingOptions::new(0.7, 1000).with_top_p(0.9),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["options"]["num_predict"], 1000);
        assert!((value["options"]["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_top_p_omitted_when_unset() {
        let value = serde_json::to_value(SamplingOptions::new(0.3, 800)).unwrap();
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = LlmClient::new("http://localhost:11434/".into(), "m".into()).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "m");
    }
}
