use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// JSON settings file name, looked up like a dotfile.
pub const SETTINGS_FILE_NAME: &str = "settings.config";
/// TOML alternative to [`SETTINGS_FILE_NAME`].
pub const TOML_FILE_NAME: &str = "git-agent.toml";
/// Directory name searched in the working directory and its ancestors.
pub const CONFIG_DIR_NAME: &str = "git-agent";
pub const ENV_PREFIX: &str = "GIT_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Main configuration structure for git-agent
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitAgentConfig {
    /// LLM providers keyed by vendor name
    pub llm_providers: BTreeMap<String, LlmProviderConfig>,
    pub git_settings: GitSettings,
    pub logging: LoggingConfig,
    /// File this configuration was read from, or will be saved to
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmProviderConfig {
    pub enabled: bool,
    /// Literal key, or `${ENV_VAR}` resolved at load time
    pub api_key: String,
    /// Empty means the provider's default model
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            model: String::new(),
            temperature: 0.3,
            max_tokens: 1000,
            base_url: None,
        }
    }
}

impl LlmProviderConfig {
    /// Enabled and holding a non-blank key
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }

    pub fn model_or(&self, default: &str) -> String {
        if self.model.trim().is_empty() {
            default.to_string()
        } else {
            self.model.clone()
        }
    }
}

/// How failed operations are recovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ConflictResolutionStrategy {
    #[default]
    #[serde(rename = "llm_guided", alias = "oracle_guided")]
    OracleGuided,
}

/// Git operation settings, fixed for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GitSettings {
    pub auto_stash: bool,
    pub force_push_allowed: bool,
    pub backup_before_operations: bool,
    /// Upper bound for the CLI `--retry` loop
    pub max_retry_attempts: u32,
    pub conflict_resolution_strategy: ConflictResolutionStrategy,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            auto_stash: true,
            force_push_allowed: true,
            backup_before_operations: true,
            max_retry_attempts: 3,
            conflict_resolution_strategy: ConflictResolutionStrategy::OracleGuided,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file appended to in addition to the console; `None` disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: Some("git_agent.log".to_string()),
            console: true,
        }
    }
}

impl GitAgentConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Settings file (explicit path, or discovered from the working directory)
    /// 3. Environment variables (`GIT_AGENT_<SECTION>__<KEY>`)
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => discover_config_file(&cwd).unwrap_or_else(|| cwd.join(SETTINGS_FILE_NAME)),
        };
        Self::load_from(&path)
    }

    /// Load from a specific file; a missing file yields defaults plus environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if path.is_file() {
            builder = builder.add_source(File::from(path).format(file_format(path)));
        } else {
            debug!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: GitAgentConfig = builder.build()?.try_deserialize()?;
        config.expand_env_vars();
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// First enabled provider with a key, in name order.
    pub fn enabled_provider(&self) -> Option<(&str, &LlmProviderConfig)> {
        self.llm_providers
            .iter()
            .find(|(_, provider)| provider.is_usable())
            .map(|(name, provider)| (name.as_str(), provider))
    }

    /// Whether a settings file was read, as opposed to defaults plus environment.
    pub fn loaded_from_file(&self) -> bool {
        self.config_path.as_deref().is_some_and(Path::is_file)
    }

    /// Save configuration; `.toml` paths are written as TOML, anything else as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Save back to the file this configuration was loaded from.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
        self.save_to_file(&path)?;
        Ok(path)
    }

    fn expand_env_vars(&mut self) {
        for provider in self.llm_providers.values_mut() {
            provider.api_key = expand_env_var(&provider.api_key);
        }
    }

    /// Load a .env file if one exists; `Ok(None)` when there is none.
    ///
    /// Runs before logging is set up, so the caller reports the outcome.
    pub fn load_env_file() -> Result<Option<PathBuf>, dotenvy::Error> {
        match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Find the settings file: working directory, `./git-agent/`, then `<ancestor>/git-agent/`.
pub fn discover_config_file(start: &Path) -> Option<PathBuf> {
    let in_dir = |dir: &Path| {
        [SETTINGS_FILE_NAME, TOML_FILE_NAME]
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    };

    in_dir(start)
        .or_else(|| in_dir(&start.join(CONFIG_DIR_NAME)))
        .or_else(|| {
            start
                .ancestors()
                .skip(1)
                .find_map(|parent| in_dir(&parent.join(CONFIG_DIR_NAME)))
        })
}

/// `${NAME}` becomes the value of `NAME` (empty when unset); anything else is literal.
pub fn expand_env_var(value: &str) -> String {
    match value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(name) => std::env::var(name).unwrap_or_default(),
        None => value.to_string(),
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn file_format(path: &Path) -> FileFormat {
    if is_toml(path) {
        FileFormat::Toml
    } else {
        FileFormat::Json
    }
}
