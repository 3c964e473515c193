pub mod check;
pub mod generate;
pub mod harmonize;
pub mod report;

use anyhow::Context;
use storyforge_core::config::{Config, HarmonizeConfig, WarnLevel};

/// Load `harmonize.yaml`, logging its warnings. Error-level findings abort.
pub(crate) fn load_tunables(config: &Config) -> anyhow::Result<HarmonizeConfig> {
    let path = config.layout.harmonize_config_path();
    let tunables = HarmonizeConfig::load(&config.layout)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let warnings = tunables.validate();
    for w in &warnings {
        tracing::warn!("{}: {}", path.display(), w.message);
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("{} has errors; run `storyforge check`", path.display());
    }
    Ok(tunables)
}
