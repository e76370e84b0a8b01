use anyhow::{Context, Result};

use crate::cli::ProviderName;
use crate::config::GitAgentConfig;

pub struct SetupProviderCommand {
    pub provider: ProviderName,
    pub api_key: String,
}

impl SetupProviderCommand {
    pub fn new(provider: ProviderName, api_key: String) -> Self {
        Self { provider, api_key }
    }

    /// Enable the provider with the given key and write the configuration back.
    pub async fn execute(&self, mut config: GitAgentConfig) -> Result<()> {
        self.apply(&mut config);
        let path = config.save().context("Failed to save configuration")?;

        println!("✅ {} provider configured successfully", self.provider.as_str());
        println!("📄 Saved to {}", path.display());
        println!(
            "💡 Tip: store \"${{{}}}\" as the api_key to read it from the environment",
            self.provider.env_var()
        );
        Ok(())
    }

    pub fn apply(&self, config: &mut GitAgentConfig) {
        let entry = config
            .llm_providers
            .entry(self.provider.as_str().to_string())
            .or_default();
        entry.enabled = true;
        entry.api_key = self.api_key.clone();
    }
}
