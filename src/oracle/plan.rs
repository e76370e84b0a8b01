//! Typed recovery plans and the lenient parser for oracle responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Risk the oracle attributes to its own plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryStep {
    pub command: String,
    pub description: String,
}

impl RecoveryStep {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

/// The oracle's structured proposal for recovering a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryPlan {
    /// Free-text rationale. Logged, never executed.
    pub strategy_description: String,
    pub steps: Vec<RecoveryStep>,
    /// Hint only; the force policy in configuration always wins.
    pub requires_force: bool,
    pub safe_to_proceed: bool,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanParseError {
    #[error("response contains no JSON object")]
    NoJsonObject,
    #[error("invalid JSON in response: {0}")]
    InvalidJson(String),
    #[error("response JSON does not match plan structure: {0}")]
    InvalidStructure(String),
}

#[derive(Debug, Deserialize)]
struct WirePlan {
    #[serde(default)]
    strategy: String,
    #[serde(default)]
    steps: Vec<WireStep>,
    #[serde(default, alias = "requiresforce")]
    requires_force: bool,
    #[serde(default, alias = "safetoproceed")]
    safe_to_proceed: bool,
    #[serde(default, alias = "risklevel")]
    risk_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
    #[serde(default)]
    command: String,
    #[serde(default)]
    description: String,
}

impl RecoveryPlan {
    /// Parse the span from the first `{` to the last `}` of a free-form response.
    ///
    /// Field names match case-insensitively; unknown fields are ignored and
    /// missing ones take their defaults (`safe_to_proceed` defaults to false).
    pub fn parse(response: &str) -> Result<Self, PlanParseError> {
        let span = extract_json_object(response).ok_or(PlanParseError::NoJsonObject)?;
        let value: Value =
            serde_json::from_str(span).map_err(|e| PlanParseError::InvalidJson(e.to_string()))?;

        let wire: WirePlan = serde_json::from_value(lowercase_keys(value))
            .map_err(|e| PlanParseError::InvalidStructure(e.to_string()))?;

        Ok(Self {
            strategy_description: wire.strategy,
            steps: wire
                .steps
                .into_iter()
                .map(|step| RecoveryStep::new(step.command, step.description))
                .collect(),
            requires_force: wire.requires_force,
            safe_to_proceed: wire.safe_to_proceed,
            risk_level: wire
                .risk_level
                .as_deref()
                .map(RiskLevel::parse)
                .unwrap_or(RiskLevel::Unknown),
        })
    }
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), lowercase_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_embedded_in_prose() {
        let response = r#"Sure, here's what I'd do:
```json
{
    "strategy": "Rebase local work onto the remote",
    "steps": [
        {"command": "git fetch origin", "description": "Fetch latest"},
        {"command": "git rebase origin/main", "description": "Replay local commits"}
    ],
    "requires_force": false,
    "safe_to_proceed": true,
    "risk_level": "low"
}
```
Let me know if that helps!"#;

        let plan = RecoveryPlan::parse(response).unwrap();
        assert_eq!(plan.strategy_description, "Rebase local work onto the remote");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].command, "git rebase origin/main");
        assert!(plan.safe_to_proceed);
        assert!(!plan.requires_force);
        assert_eq!(plan.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_field_names_match_case_insensitively() {
        let response = r#"{"Strategy": "merge", "STEPS": [{"Command": "git merge", "Description": "merge"}],
            "Safe_To_Proceed": true, "Risk_Level": "HIGH"}"#;

        let plan = RecoveryPlan::parse(response).unwrap();
        assert_eq!(plan.strategy_description, "merge");
        assert_eq!(plan.steps[0].command, "git merge");
        assert!(plan.safe_to_proceed);
        assert_eq!(plan.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let plan = RecoveryPlan::parse(r#"{"strategy": "nothing to do", "extra": 42}"#).unwrap();

        assert!(plan.steps.is_empty());
        assert!(!plan.requires_force);
        assert!(!plan.safe_to_proceed);
        assert_eq!(plan.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_unrecognized_risk_level_is_unknown() {
        let plan = RecoveryPlan::parse(r#"{"risk_level": "low/medium/high"}"#).unwrap();
        assert_eq!(plan.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_text_without_object_is_rejected() {
        assert_eq!(
            RecoveryPlan::parse("I cannot help with that."),
            Err(PlanParseError::NoJsonObject)
        );
        assert_eq!(
            RecoveryPlan::parse("} backwards {"),
            Err(PlanParseError::NoJsonObject)
        );
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let result = RecoveryPlan::parse(r#"{"strategy": "oops", "steps": [}"#);
        assert!(matches!(result, Err(PlanParseError::InvalidJson(_))));
    }

    #[test]
    fn test_wrongly_typed_fields_are_rejected() {
        let result = RecoveryPlan::parse(r#"{"steps": "git pull"}"#);
        assert!(matches!(result, Err(PlanParseError::InvalidStructure(_))));
    }
}
