//! Chat-completion client with timeout and bounded retry

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::ProviderConfig;
use crate::core::errors::ProviderError;
use crate::core::models::{Completion, TokenUsage};

/// Sampling temperature; low for stable translations
pub const TEMPERATURE: f32 = 0.3;

/// Upper bound on generated tokens
pub const MAX_TOKENS: u32 = 2000;

/// Anything that can turn a prompt into a completion
#[async_trait]
pub trait CompletionBackend: Send + Sync + Debug {
    /// Run one completion for `prompt` with `model`
    async fn complete(&self, prompt: &str, model: &str) -> Result<Completion, ProviderError>;
}

/// Upper bound on the wait between two attempts
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Body of a chat-completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
    #[serde(default)]
    error: Option<ErrorEnvelope>,
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

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorEnvelope,
}

/// OpenAI-compatible chat-completion client
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
    config: ProviderConfig,
    api_key: String,
}

impl RemoteClient {
    /// Create a client; `None` when no credential is configured
    pub fn new(config: ProviderConfig) -> Result<Option<Self>, ProviderError> {
        let api_key = match config.api_key.as_deref() {
            Some(key) if config.is_configured() => key.trim().to_string(),
            _ => return Ok(None),
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()
            .map_err(|e| ProviderError::RequestError {
                message: e.to_string(),
            })?;

        info!("Completion client initialized for {}", config.base_url);

        Ok(Some(Self {
            client,
            config,
            api_key,
        }))
    }

    /// One attempt, no retry
    async fn send_request(&self, prompt: &str, model: &str) -> Result<Completion, ProviderError> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.site_name)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_completion(&text)
    }

    fn classify(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::TimeoutError {
                timeout: self.config.timeout(),
            }
        } else if err.is_builder() {
            ProviderError::RequestError {
                message: err.to_string(),
            }
        } else {
            ProviderError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for RemoteClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<Completion, ProviderError> {
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = backoff_delay(self.config.retry_delay_ms, attempt);
                debug!("Retry attempt {} for model {} in {:?}", attempt, model, delay);
                sleep(delay).await;
            }

            match self.send_request(prompt, model).await {
                Ok(completion) => {
                    if attempt > 0 {
                        info!("Completion succeeded after {} retries", attempt);
                    }
                    return Ok(completion);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    warn!("Completion attempt {} failed: {}", attempt + 1, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wait before retry number `attempt` (1-based): doubles each time, capped
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(base_ms.saturating_mul(factor)).min(MAX_RETRY_DELAY)
}

/// Extract a readable message from an error body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ErrorEnvelope {
                message: Some(message),
                ..
            },
        }) => message,
        _ if body.trim().is_empty() => "empty error response".to_string(),
        _ => body.trim().to_string(),
    }
}

fn parse_completion(body: &str) -> Result<Completion, ProviderError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponseError {
            message: e.to_string(),
        })?;

    // Some providers report upstream failures with a 200 and an error envelope
    if let Some(error) = response.error {
        let status = error
            .code
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(502);
        return Err(ProviderError::ApiError {
            status,
            message: error
                .message
                .unwrap_or_else(|| "unknown provider error".to_string()),
        });
    }

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::InvalidResponseError {
            message: "No completion in response".to_string(),
        })?;

    Ok(Completion {
        content,
        model: response.model,
        usage: response.usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        assert!(RemoteClient::new(ProviderConfig::default()).unwrap().is_none());

        let config = ProviderConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(RemoteClient::new(config).unwrap().is_none());

        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(RemoteClient::new(config).unwrap().is_some());
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "openai/gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "prompt".to_string(),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "openai/gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "prompt");
        assert_eq!(json["max_tokens"], 2000);
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        assert_eq!(backoff_delay(500, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(500, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(500, 5), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(0, 70), Duration::ZERO);
        assert_eq!(backoff_delay(u64::MAX, u32::MAX), MAX_RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_large_retry_budget_does_not_overflow() {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://127.0.0.1:1".to_string(),
            max_retries: 70,
            retry_delay_ms: 0,
            timeout_ms: 1000,
            ..Default::default()
        };
        let client = RemoteClient::new(config).unwrap().unwrap();

        let err = client.complete("p", "m").await.unwrap_err();
        assert!(matches!(err, ProviderError::NetworkError { .. }));
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{
            "id": "gen-1",
            "model": "openai/gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": " 你好 "}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;
        let completion = parse_completion(body).unwrap();

        assert_eq!(completion.content, " 你好 ");
        assert_eq!(completion.model.as_deref(), Some("openai/gpt-4o-mini"));
        assert_eq!(completion.usage.unwrap().total_tokens, 12);
    }

    #[test]
    fn test_parse_completion_rejects_malformed() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(ProviderError::InvalidResponseError { .. })
        ));
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(ProviderError::InvalidResponseError { .. })
        ));
        assert!(matches!(
            parse_completion(r#"{"choices": [{"message": {"content": null}}]}"#),
            Err(ProviderError::InvalidResponseError { .. })
        ));
    }

    #[test]
    fn test_error_envelope_in_success_body() {
        let body = r#"{"error": {"message": "Rate limit exceeded", "code": 429}}"#;
        match parse_completion(body) {
            Err(ProviderError::ApiError { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": {"message": "No auth credentials found", "code": 401}}"#),
            "No auth credentials found"
        );
        assert_eq!(error_message("Service Unavailable"), "Service Unavailable");
        assert_eq!(error_message(""), "empty error response");
    }
}
