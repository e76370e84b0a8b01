use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{base_url, build_client, non_empty, send_json};
use crate::config::LlmProviderConfig;
use crate::oracle::OracleError;

pub const PROVIDER_NAME: &str = "anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(config: &LlmProviderConfig) -> Result<Self, OracleError> {
        Ok(Self {
            client: build_client(PROVIDER_NAME)?,
            api_key: config.api_key.clone(),
            model: config.model_or(DEFAULT_MODEL),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            base_url: base_url(config.base_url.as_deref(), DEFAULT_BASE_URL),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let request = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let response: MessagesResponse = send_json(PROVIDER_NAME, request).await?;
        let text = response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text);

        non_empty(PROVIDER_NAME, text)
    }
}
