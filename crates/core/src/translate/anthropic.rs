//! Anthropic-backed translator implementation.
//! This sends one messages request per batch and reads the generated text.

use super::Translator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Public messages endpoint used when no override is given.
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Model sent with every request unless overridden.
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Translator that delegates to the Anthropic messages API.
/// The credential is taken at construction time; nothing is read from the
/// process environment here.
pub struct AnthropicTranslator {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

/// Request body for the messages endpoint.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

/// A single role-tagged message.
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Response body; only the content segments are read.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

/// One generated content segment.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: String,
}

impl AnthropicTranslator {
    /// Create a translator for the given API credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the translator at a different messages endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a different model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Translator for AnthropicTranslator {
    /// Send one instruction prompt and return the first text segment of
    /// the reply. Non-2xx statuses surface as errors carrying the response
    /// body so failed attempts can be diagnosed from the logs.
    async fn translate(&self, text: &str, language: &str) -> Result<String> {
        let prompt = format!(
            "Translate only the following text to {language}. Keep every line \
             containing exactly \"---\" unchanged and in place. Do not add any \
             commentary or additional text:\n\n{text}"
        );
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(anyhow!("translation endpoint returned {status}: {body}"));
        }
        let reply: MessagesResponse = response.json().await?;
        debug!("received {} content segments", reply.content.len());
        reply
            .content
            .into_iter()
            .find(|segment| segment.kind == "text")
            .map(|segment| segment.text)
            .ok_or_else(|| anyhow!("response contained no text segment"))
    }
}
