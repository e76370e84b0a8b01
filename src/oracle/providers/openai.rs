use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{base_url, build_client, non_empty, send_json};
use crate::config::LlmProviderConfig;
use crate::oracle::OracleError;

pub const PROVIDER_NAME: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible chat completions endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
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
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatResponse = send_json(PROVIDER_NAME, request).await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        non_empty(PROVIDER_NAME, text)
    }
}
