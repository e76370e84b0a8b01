// git-agent library - guarded autonomous recovery for git pull/push
// This exposes the core components for testing and integration

pub mod agent;
pub mod cli;
pub mod config;
pub mod external;
pub mod git;
pub mod oracle;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use agent::{ExecutedStep, GitAgent, OperationKind, OperationResult, StepGuard, StepStatus};
pub use config::{ConfigError, GitAgentConfig, GitSettings, LlmProviderConfig, LoggingConfig};
pub use external::{CommandExecutor, CommandOutcome, ProcessCommandExecutor};
pub use git::{BackupManager, Git2Inspector, RepositoryInspector, RepositoryStatus};
pub use oracle::{
    OracleBackend, OracleError, RecoveryOracleGateway, RecoveryPlan, RecoveryStep, RiskLevel,
    StrategyGenerator,
};
pub use shutdown::ShutdownCoordinator;
pub use telemetry::{create_operation_span, generate_correlation_id, init_telemetry};
