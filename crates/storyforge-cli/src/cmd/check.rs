use crate::output::print_json;
use anyhow::Context;
use storyforge_core::config::{Config, HarmonizeConfig, WarnLevel};

pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let tunables =
        HarmonizeConfig::load(&config.layout).context("failed to load harmonize.yaml")?;
    let warnings = tunables.validate();

    if json {
        let value = serde_json::json!({
            "config": tunables,
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("harmonize.yaml is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
