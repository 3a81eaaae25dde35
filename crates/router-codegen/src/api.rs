//! Code generation over an OpenAI-compatible chat completion endpoint.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use router_types::CodegenSettings;

use super::{CodeGenerator, CodegenError};

const SYSTEM_PROMPT: &str = "You are a Python coding assistant.";

/// Configuration for [`ApiCodeGenerator`].
#[derive(Debug, Clone)]
pub struct ApiCodeGeneratorConfig {
    /// API base URL (e.g., "https://api.together.xyz/v1")
    pub base_url: String,

    pub model: String,

    pub api_key: SecretString,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Per-request timeout
    pub timeout: Duration,

    /// Total attempts, including the first
    pub max_retries: u32,

    /// First backoff delay; doubles (with jitter) after each failure
    pub retry_initial_interval: Duration,
}

impl ApiCodeGeneratorConfig {
    /// Build from settings; fails when no API key is configured.
    pub fn from_settings(settings: &CodegenSettings) -> Result<Self, CodegenError> {
        let api_key = settings
            .resolved_api_key()
            .ok_or(CodegenError::MissingApiKey)?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: SecretString::from(api_key),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries.max(1),
            retry_initial_interval: Duration::from_millis(500),
        })
    }
}

/// API-backed code generator.
pub struct ApiCodeGenerator {
    client: Client,
    config: ApiCodeGeneratorConfig,
}

impl ApiCodeGenerator {
    pub fn new(config: ApiCodeGeneratorConfig) -> Result<Self, CodegenError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CodegenError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_prompt(action_id: &str) -> String {
        format!(
            "Write a Python code snippet that imports the function '{action_id}' \
             from 'function_registry.py' and executes it in a main() function. \
             Please include error handling."
        )
    }

    /// Call the API, retrying transient failures with exponential backoff.
    async fn call_api(&self, prompt: &str) -> Result<String, CodegenError> {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.retry_initial_interval,
            current_interval: self.config.retry_initial_interval,
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling code generation API");

            match self.make_request(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() => {
                    error!(error = %e, "Code generation failed");
                    return Err(e);
                }
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "API call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    async fn make_request(&self, prompt: &str) -> Result<String, CodegenError> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            max_tokens: u32,
            temperature: f32,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessageResponse,
        }

        #[derive(Deserialize)]
        struct ChatMessageResponse {
            content: String,
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    CodegenError::ServerError(e.to_string())
                } else {
                    CodegenError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CodegenError::RateLimitExceeded);
        }
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(CodegenError::ServerError(format!("HTTP {}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CodegenError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CodegenError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| CodegenError::ParseError("No choices in response".to_string()))
    }
}

#[async_trait]
impl CodeGenerator for ApiCodeGenerator {
    async fn generate(&self, action_id: &str) -> Result<String, CodegenError> {
        let prompt = Self::build_prompt(action_id);
        self.call_api(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ApiCodeGeneratorConfig {
        ApiCodeGeneratorConfig {
            base_url,
            model: "test-model".to_string(),
            api_key: SecretString::from("test-key".to_string()),
            max_tokens: 250,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_initial_interval: Duration::from_millis(10),
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn test_prompt_names_action() {
        let prompt = ApiCodeGenerator::build_prompt("check_ram_usage");
        assert!(prompt.contains("'check_ram_usage'"));
        assert!(prompt.contains("main()"));
    }

    #[test]
    fn test_from_settings_requires_key() {
        let settings = CodegenSettings {
            api_key: Some("k".to_string()),
            base_url: "https://example.test/v1/".to_string(),
            max_retries: 0,
            ..Default::default()
        };
        let config = ApiCodeGeneratorConfig::from_settings(&settings).unwrap();
        assert_eq!(config.base_url, "https://example.test/v1");
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.api_key.expose_secret(), "k");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "max_tokens": 250
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                "\n  def main():\n    open_calculator()\n",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let generator = ApiCodeGenerator::new(test_config(server.uri())).unwrap();
        let snippet = generator.generate("open_calculator").await.unwrap();
        assert_eq!(snippet, "def main():\n    open_calculator()");
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .with_priority(2)
            .mount(&server)
            .await;

        let generator = ApiCodeGenerator::new(test_config(server.uri())).unwrap();
        assert_eq!(generator.generate("check_ram_usage").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&server)
            .await;

        let generator = ApiCodeGenerator::new(test_config(server.uri())).unwrap();
        let err = generator.generate("open_chrome").await.unwrap_err();
        assert!(matches!(err, CodegenError::ApiError(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_server_error_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let generator = ApiCodeGenerator::new(test_config(server.uri())).unwrap();
        let err = generator.generate("open_chrome").await.unwrap_err();
        assert!(matches!(err, CodegenError::ServerError(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let generator = ApiCodeGenerator::new(test_config(server.uri())).unwrap();
        assert!(matches!(
            generator.generate("open_chrome").await,
            Err(CodegenError::ParseError(_))
        ));
    }
}
