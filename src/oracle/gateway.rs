use std::sync::Arc;
use tracing::{debug, info, warn};

use super::plan::{PlanParseError, RecoveryPlan};
use super::prompt::build_recovery_prompt;
use super::StrategyGenerator;
use crate::agent::OperationKind;
use crate::git::RepositoryStatus;

/// What a single consultation of the generator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consultation {
    Plan(RecoveryPlan),
    /// Generator not configured; no call was made.
    Unavailable,
    /// The call failed or returned blank text.
    NoResponse(String),
    /// Text came back but held no usable plan.
    Unparseable { raw: String, error: PlanParseError },
}

impl Consultation {
    pub fn into_plan(self) -> Option<RecoveryPlan> {
        match self {
            Consultation::Plan(plan) => Some(plan),
            _ => None,
        }
    }
}

/// Bridges repository state and failure text to a typed recovery plan.
#[derive(Clone)]
pub struct RecoveryOracleGateway {
    generator: Arc<dyn StrategyGenerator>,
}

impl RecoveryOracleGateway {
    pub fn new(generator: Arc<dyn StrategyGenerator>) -> Self {
        Self { generator }
    }

    /// Ask for a recovery plan. Never errors; anything unusable is `None`.
    pub async fn resolve(
        &self,
        kind: OperationKind,
        status: &RepositoryStatus,
        failure_text: &str,
    ) -> Option<RecoveryPlan> {
        self.consult(kind, status, failure_text).await.into_plan()
    }

    /// Like [`resolve`](Self::resolve) but keeps the reason a plan is missing.
    pub async fn consult(
        &self,
        kind: OperationKind,
        status: &RepositoryStatus,
        failure_text: &str,
    ) -> Consultation {
        if !self.generator.is_available() {
            warn!(
                generator = self.generator.name(),
                "Strategy generator unavailable, no recovery plan"
            );
            return Consultation::Unavailable;
        }

        let prompt = build_recovery_prompt(kind, status, failure_text);
        debug!(operation = %kind, prompt_len = prompt.len(), "Requesting recovery strategy");

        let response = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(generator = self.generator.name(), "Strategy generator returned no text");
                return Consultation::NoResponse("empty response".to_string());
            }
            Err(e) => {
                warn!(generator = self.generator.name(), "Strategy generation failed: {}", e);
                return Consultation::NoResponse(e.to_string());
            }
        };

        match RecoveryPlan::parse(&response) {
            Ok(plan) => {
                info!(
                    steps = plan.steps.len(),
                    risk = %plan.risk_level,
                    safe = plan.safe_to_proceed,
                    "Recovery strategy: {}",
                    plan.strategy_description
                );
                Consultation::Plan(plan)
            }
            Err(error) => {
                warn!("Could not parse recovery strategy: {}", error);
                Consultation::Unparseable {
                    raw: response,
                    error,
                }
            }
        }
    }

    /// Free-form generation for callers that want plain text back.
    pub async fn ask(&self, prompt: &str) -> Option<String> {
        if !self.generator.is_available() {
            return None;
        }
        match self.generator.generate(prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!(generator = self.generator.name(), "Generation failed: {}", e);
                None
            }
        }
    }
}
