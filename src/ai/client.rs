//! Chat completion client
//!
//! `LlmClient` is the seam the rest of the crate talks to. `HttpLlmClient`
//! speaks the OpenAI-compatible chat completions protocol over blocking
//! reqwest; tests substitute an in-memory client.

use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::sse::{extract_delta, SseEvent, SseParser};
use crate::config::AiSettings;
use crate::error::{SpendwiseError, SpendwiseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: 0.2,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Approximate size, for logging
    pub fn char_count(&self) -> usize {
        self.messages.iter().map(|m| m.content.len()).sum()
    }
}

/// A chat completion provider
pub trait LlmClient {
    /// Send a request and return the full reply text
    fn complete(&self, request: &ChatRequest) -> SpendwiseResult<String>;

    /// Send a request, passing each text delta to `on_delta` as it arrives,
    /// and return the full reply text
    fn stream(
        &self,
        request: &ChatRequest,
        on_delta: &mut dyn FnMut(&str),
    ) -> SpendwiseResult<String>;
}

/// OpenAI-compatible HTTP client
pub struct HttpLlmClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpLlmClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> SpendwiseResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from settings, reading the key from the configured
    /// environment variable
    pub fn from_settings(settings: &AiSettings) -> SpendwiseResult<Self> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                SpendwiseError::Ai(format!(
                    "No API key: set the {} environment variable",
                    settings.api_key_env
                ))
            })?;
        Self::new(
            settings.endpoint.clone(),
            settings.model.clone(),
            api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn body(&self, request: &ChatRequest, stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "stream": stream,
        })
    }

    fn send(&self, request: &ChatRequest, stream: bool) -> SpendwiseResult<reqwest::blocking::Response> {
        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            chars = request.char_count(),
            stream,
            "sending chat request"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(request, stream))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            warn!(%status, "chat request failed");
            return Err(SpendwiseError::Ai(format!(
                "Provider returned {}: {}",
                status,
                text.chars().take(300).collect::<String>()
            )));
        }
        Ok(response)
    }
}

impl LlmClient for HttpLlmClient {
    fn complete(&self, request: &ChatRequest) -> SpendwiseResult<String> {
        let value: Value = self.send(request, false)?.json()?;
        let content = value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| SpendwiseError::Ai("Response has no message content".into()))?;
        debug!(chars = content.len(), "chat response received");
        Ok(content.to_string())
    }

    fn stream(
        &self,
        request: &ChatRequest,
        on_delta: &mut dyn FnMut(&str),
    ) -> SpendwiseResult<String> {
        let mut response = self.send(request, true)?;
        let mut parser = SseParser::new();
        let mut reply = String::new();
        let mut chunk = [0u8; 4096];

        let mut handle = |events: Vec<SseEvent>, reply: &mut String| {
            for event in events {
                if let SseEvent::Message { data, .. } = event {
                    if let Some(delta) = extract_delta(&data) {
                        on_delta(&delta);
                        reply.push_str(&delta);
                    }
                }
            }
        };

        while !parser.is_done() {
            let read = response.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            handle(parser.feed(&chunk[..read]), &mut reply);
        }
        handle(parser.finish(), &mut reply);

        debug!(chars = reply.len(), "chat stream finished");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_ai_error() {
        let settings = AiSettings {
            api_key_env: "SPENDWISE_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..AiSettings::default()
        };
        let err = HttpLlmClient::from_settings(&settings).err().unwrap();
        assert!(matches!(err, SpendwiseError::Ai(_)));
        assert!(err.to_string().contains("SPENDWISE_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_request_body_shape() {
        let client =
            HttpLlmClient::new("http://localhost", "test-model", "k", Duration::from_secs(1)).unwrap();
        let request = ChatRequest::new(vec![ChatMessage::system("s"), ChatMessage::user("u")]);
        let body = client.body(&request, true);
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "u");
    }
}
