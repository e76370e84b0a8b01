//! Operation orchestration
//!
//! `GitAgent` drives a pull or push through the direct attempt and, on
//! failure, a single oracle-guided recovery pass. Every proposed step goes
//! through `StepGuard` before it can reach the command runner.

pub mod guard;
pub mod orchestrator;
pub mod types;

pub use guard::{is_force_flag, tokenize, StepDecision, StepGuard, VCS_PROGRAM};
pub use orchestrator::{GitAgent, AUTO_STASH_MESSAGE, OPERATION_CANCELLED};
pub use types::{render_trail, ExecutedStep, OperationKind, OperationResult, StepStatus};
