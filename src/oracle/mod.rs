//! Recovery oracle
//!
//! The strategy generator is an opaque `prompt -> text` capability. This
//! module owns the prompt, the response parser, and the gateway that turns
//! whatever comes back into an optional typed plan.

use async_trait::async_trait;
use thiserror::Error;

pub mod gateway;
pub mod plan;
pub mod prompt;
pub mod providers;

pub use gateway::RecoveryOracleGateway;
pub use plan::{PlanParseError, RecoveryPlan, RecoveryStep, RiskLevel};
pub use prompt::{build_commit_message_prompt, build_recovery_prompt};
pub use providers::OracleBackend;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no strategy generator is configured")]
    NotConfigured,

    #[error("request to {provider} failed: {source}")]
    Request {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} returned an unexpected response: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("{0} returned no text")]
    EmptyResponse(String),
}

/// Something that can turn a prompt into free-form text.
#[async_trait]
pub trait StrategyGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}
