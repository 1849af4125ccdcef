//! Messages API client.
//!
//! [`CompletionClient`] is the seam between suggestion building and the network.
//! [`AnthropicClient`] is the blocking HTTP implementation; tests substitute
//! their own implementations.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Settings;
use crate::error::{Error, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One single-turn request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens,
            temperature,
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

pub trait CompletionClient {
    /// Returns the text of the model's reply.
    ///
    /// # Errors
    ///
    /// Returns a `Network`, `Authentication`, `MalformedResponse` or `Api` error.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns a `Network` error if the HTTP client cannot be constructed.
    pub fn new(settings: &Settings, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_url: settings.api_url.clone(),
            model: settings.model.clone(),
        })
    }

    fn payload(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut payload = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{ "role": "user", "content": request.prompt }],
        });
        if let Some(system) = &request.system {
            payload["system"] = json!(system);
        }
        payload
    }
}

impl CompletionClient for AnthropicClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!("Sending completion request to {}", self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.payload(request))
            .send()
            .map_err(|e| transport_error(&e))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| transport_error(&e))?;
        info!("Completion response status: {status}");

        classify_response(status, &body)
    }
}

fn transport_error(err: &reqwest::Error) -> Error {
    warn!("Transport error talking to the language model: {err}");
    if err.is_timeout() {
        Error::Network("the request timed out".to_string())
    } else if err.is_connect() {
        Error::Network(format!("could not connect: {err}"))
    } else {
        Error::Network(err.to_string())
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Maps an HTTP status and body to the reply text or a classified error.
///
/// # Errors
///
/// Returns `Authentication` for 401/403, `Api` for other non-success statuses,
/// and `MalformedResponse` when a success body has no text block.
pub fn classify_response(status: u16, body: &str) -> Result<String> {
    match status {
        200..=299 => extract_text(body),
        401 | 403 => Err(Error::Authentication(status)),
        _ => Err(Error::Api {
            status,
            body: body.trim().to_string(),
        }),
    }
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))?;

    parsed
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| Error::MalformedResponse("no text content in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_returns_first_text_block() {
        let body = r#"{"content":[{"type":"text","text":"  ls -la \n"}],"role":"assistant"}"#;
        assert_eq!(classify_response(200, body).unwrap(), "ls -la");
    }

    #[test]
    fn test_success_skips_non_text_blocks() {
        let body = r#"{"content":[{"type":"thinking"},{"type":"text","text":"pwd"}]}"#;
        assert_eq!(classify_response(200, body).unwrap(), "pwd");
    }

    #[test]
    fn test_authentication_statuses() {
        assert!(matches!(
            classify_response(401, "{}"),
            Err(Error::Authentication(401))
        ));
        assert!(matches!(
            classify_response(403, "{}"),
            Err(Error::Authentication(403))
        ));
    }

    #[test]
    fn test_other_status_is_api_error() {
        let result = classify_response(529, "overloaded");
        let Err(Error::Api { status, body }) = result else {
            panic!("expected api error");
        };
        assert_eq!(status, 529);
        assert_eq!(body, "overloaded");
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            classify_response(200, "not json"),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            classify_response(200, r#"{"content":[]}"#),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_payload_includes_system_when_set() {
        let client = AnthropicClient::new(&Settings::default(), "key".to_string()).unwrap();
        let request = CompletionRequest::new("hello", 100, 0.0).with_system("be brief");
        let payload = client.payload(&request);

        assert_eq!(payload["model"], Settings::default().model);
        assert_eq!(payload["system"], "be brief");
        assert_eq!(payload["messages"][0]["content"], "hello");
    }
}
