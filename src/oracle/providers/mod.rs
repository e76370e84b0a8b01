//! HTTP strategy generators for the supported LLM vendors.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{OracleError, StrategyGenerator};
use crate::config::{GitAgentConfig, LlmProviderConfig};

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider names accepted in configuration.
pub const SUPPORTED_PROVIDERS: [&str; 3] = ["anthropic", "gemini", "openai"];

/// The configured strategy generator, chosen once at startup.
pub enum OracleBackend {
    Disabled,
    OpenAi(OpenAiProvider),
    Anthropic(AnthropicProvider),
    Gemini(GeminiProvider),
}

impl OracleBackend {
    /// Build the backend for the first enabled provider that has a key.
    ///
    /// Anything unusable degrades to [`OracleBackend::Disabled`] with a warning.
    pub fn from_config(config: &GitAgentConfig) -> Self {
        for (name, provider) in &config.llm_providers {
            if !provider.is_usable() {
                continue;
            }
            match Self::for_provider(name, provider) {
                Ok(Some(backend)) => {
                    info!(provider = %name, model = %backend.model(), "Using strategy generator");
                    return backend;
                }
                Ok(None) => warn!(
                    "Unknown LLM provider '{}' in configuration (expected one of: {}), skipping",
                    name,
                    SUPPORTED_PROVIDERS.join(", ")
                ),
                Err(e) => warn!("Failed to initialize provider '{}': {}", name, e),
            }
        }

        debug!("No LLM provider enabled, recovery oracle disabled");
        OracleBackend::Disabled
    }

    /// `Ok(None)` when the name is not a supported provider.
    pub fn for_provider(
        name: &str,
        provider: &LlmProviderConfig,
    ) -> Result<Option<Self>, OracleError> {
        let backend = match name.to_ascii_lowercase().as_str() {
            "openai" => OracleBackend::OpenAi(OpenAiProvider::new(provider)?),
            "anthropic" => OracleBackend::Anthropic(AnthropicProvider::new(provider)?),
            "gemini" => OracleBackend::Gemini(GeminiProvider::new(provider)?),
            _ => return Ok(None),
        };
        Ok(Some(backend))
    }

    pub fn model(&self) -> &str {
        match self {
            OracleBackend::Disabled => "",
            OracleBackend::OpenAi(p) => p.model(),
            OracleBackend::Anthropic(p) => p.model(),
            OracleBackend::Gemini(p) => p.model(),
        }
    }
}

#[async_trait]
impl StrategyGenerator for OracleBackend {
    fn name(&self) -> &str {
        match self {
            OracleBackend::Disabled => "disabled",
            OracleBackend::OpenAi(_) => openai::PROVIDER_NAME,
            OracleBackend::Anthropic(_) => anthropic::PROVIDER_NAME,
            OracleBackend::Gemini(_) => gemini::PROVIDER_NAME,
        }
    }

    fn is_available(&self) -> bool {
        !matches!(self, OracleBackend::Disabled)
    }

    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        match self {
            OracleBackend::Disabled => Err(OracleError::NotConfigured),
            OracleBackend::OpenAi(p) => p.generate(prompt).await,
            OracleBackend::Anthropic(p) => p.generate(prompt).await,
            OracleBackend::Gemini(p) => p.generate(prompt).await,
        }
    }
}

fn build_client(provider: &str) -> Result<Client, OracleError> {
    Client::builder()
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .map_err(|source| OracleError::Request {
            provider: provider.to_string(),
            source,
        })
}

/// Base URL without a trailing slash, falling back to the vendor default.
fn base_url(configured: Option<&str>, default: &str) -> String {
    configured
        .filter(|url| !url.trim().is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// Send a request and decode a JSON body, mapping non-2xx replies to `Api`.
async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, OracleError> {
    let request_error = |source| OracleError::Request {
        provider: provider.to_string(),
        source,
    };

    let response = request.send().await.map_err(request_error)?;
    let status = response.status();
    let body = response.text().await.map_err(request_error)?;

    if !status.is_success() {
        return Err(OracleError::Api {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| OracleError::InvalidResponse {
        provider: provider.to_string(),
        reason: e.to_string(),
    })
}

/// Pull `error.message` out of a vendor error body, or return the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn non_empty(provider: &str, text: Option<String>) -> Result<String, OracleError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(OracleError::EmptyResponse(provider.to_string())),
    }
}
