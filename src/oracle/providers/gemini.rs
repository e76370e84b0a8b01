use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{base_url, build_client, non_empty, send_json};
use crate::config::LlmProviderConfig;
use crate::oracle::OracleError;

pub const PROVIDER_NAME: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Google Gemini `generateContent`.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiProvider {
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
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let request = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response: GenerateResponse = send_json(PROVIDER_NAME, request).await?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            });

        non_empty(PROVIDER_NAME, text)
    }
}
