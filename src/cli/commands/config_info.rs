use anyhow::Result;

use crate::config::GitAgentConfig;

pub struct ConfigInfoCommand;

impl ConfigInfoCommand {
    pub async fn execute(&self, config: &GitAgentConfig) -> Result<()> {
        print!("{}", render_config(config));
        Ok(())
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "✅"
    } else {
        "❌"
    }
}

/// Human-readable summary; API keys are reported by presence only.
pub fn render_config(config: &GitAgentConfig) -> String {
    let mut out = String::from("⚙️  Git Agent Configuration\n\n🤖 LLM PROVIDERS:\n────────────────\n");

    if config.llm_providers.is_empty() {
        out.push_str("   (none configured)\n");
    }
    for (name, provider) in &config.llm_providers {
        let model = if provider.model.is_empty() {
            "default"
        } else {
            provider.model.as_str()
        };
        out.push_str(&format!(
            "   {:<10} enabled: {}  model: {:<24} api key: {}\n",
            name,
            flag(provider.enabled),
            model,
            flag(!provider.api_key.trim().is_empty()),
        ));
    }

    let settings = &config.git_settings;
    out.push_str("\n🔧 GIT SETTINGS:\n───────────────\n");
    out.push_str(&format!("   Auto stash:                 {}\n", flag(settings.auto_stash)));
    out.push_str(&format!(
        "   Force push allowed:         {}\n",
        flag(settings.force_push_allowed)
    ));
    out.push_str(&format!(
        "   Backup before operations:   {}\n",
        flag(settings.backup_before_operations)
    ));
    out.push_str(&format!(
        "   Max retry attempts:         {}\n",
        settings.max_retry_attempts
    ));

    let path = config
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());
    out.push_str(&format!("\n📄 Config file: {path}\n"));
    out
}
