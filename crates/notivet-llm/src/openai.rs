//! OpenAI-compatible chat completions backend.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::generator::{GenerationError, GenerationResult, TextGenerator};

/// Chat completions client configuration.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Bearer token; generation is unavailable without it
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the first choice's content. A missing choice or content is an
/// empty answer; a body that is not a completion object is an error.
pub fn parse_completion(body: &str) -> GenerationResult<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default())
}

/// Blocking chat completions client.
pub struct ChatCompletionsClient {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionsClient {
    /// Build a client. Fails with `NotConfigured` when no API key is set.
    pub fn new(config: &GeneratorConfig) -> GenerationResult<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GenerationError::NotConfigured("missing API key".into()))?
            .to_string();

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for ChatCompletionsClient {
    fn complete(&self, system: &str, user: &str) -> GenerationResult<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
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
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "chat completion request");
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GenerationError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .text()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        parse_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.timeout_secs, 60);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_partial_json() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"model":"gpt-4o-mini","api_key":"sk-test"}"#).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeneratorConfig {
            api_key: Some("sk-secret".into()),
            ..GeneratorConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_client_requires_key() {
        let result = ChatCompletionsClient::new(&GeneratorConfig::default());
        assert!(matches!(result, Err(GenerationError::NotConfigured(_))));

        let blank = GeneratorConfig {
            api_key: Some("   ".into()),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            ChatCompletionsClient::new(&blank),
            Err(GenerationError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_client_endpoint() {
        let config = GeneratorConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://localhost:8080/v1/".into(),
            ..GeneratorConfig::default()
        };
        let client = ChatCompletionsClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-4o",
            temperature: 0.2,
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "question",
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "question");
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Use with food."}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Use with food.");
    }

    #[test]
    fn test_parse_completion_missing_content_is_empty() {
        assert_eq!(parse_completion(r#"{"choices":[]}"#).unwrap(), "");
        assert_eq!(parse_completion(r#"{}"#).unwrap(), "");
        assert_eq!(
            parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn test_parse_completion_malformed() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":"nope"}"#),
            Err(GenerationError::MalformedResponse(_))
        ));
    }
}
