use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "git-agent")]
#[command(about = "Git pull/push with guarded, LLM-assisted recovery")]
#[command(long_about = "git-agent runs git pull and git push, and when they fail asks a configured \
                       LLM for a recovery plan. Plans run only when marked safe, only git commands \
                       are executed, and force operations follow your configuration.")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, help = "Path to settings.config or git-agent.toml")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true, help = "Write console logs as structured JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull with automatic recovery
    Pull {
        #[arg(default_value = ".", help = "Repository path")]
        path: PathBuf,
        /// Retry failed attempts up to max_retry_attempts times
        #[arg(long, help = "Re-run the whole operation while it fails, up to max_retry_attempts")]
        retry: bool,
    },
    /// Push with automatic recovery
    Push {
        #[arg(default_value = ".", help = "Repository path")]
        path: PathBuf,
        #[arg(long, help = "Re-run the whole operation while it fails, up to max_retry_attempts")]
        retry: bool,
    },
    /// Show repository status
    Status {
        #[arg(default_value = ".", help = "Repository path")]
        path: PathBuf,
    },
    /// Show current configuration
    ConfigInfo,
    /// Setup LLM provider with API key
    SetupProvider {
        #[arg(value_enum)]
        provider: ProviderName,
        api_key: String,
    },
    /// Commit all changes, optionally with an LLM-improved message
    SmartCommit {
        message: String,
        #[arg(default_value = ".", help = "Repository path")]
        path: PathBuf,
        /// Accept the suggested message without asking
        #[arg(short = 'y', long, help = "Use the suggested commit message without prompting")]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderName {
    Gemini,
    Openai,
    Anthropic,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Gemini => "gemini",
            ProviderName::Openai => "openai",
            ProviderName::Anthropic => "anthropic",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::Openai => "OPENAI_API_KEY",
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}
