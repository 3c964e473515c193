use crate::error::Result;
use crate::paths::Layout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SPEAK_COMMAND: &str = "voice/speakLessac.sh";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// HarmonizeConfig
// ---------------------------------------------------------------------------

/// Tunables read from `harmonize.yaml` in the docs root. Every field has a
/// default, so the file and each key are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonizeConfig {
    #[serde(default = "default_min_story_lines")]
    pub min_story_lines: usize,
    #[serde(default = "default_split_exclusions")]
    pub split_exclusions: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_effort")]
    pub effort: String,
}

fn default_min_story_lines() -> usize {
    800
}

fn default_split_exclusions() -> Vec<String> {
    [
        "infrastructure",
        "data",
        "monitoring",
        "rag",
        "ai",
        "database",
        "caching",
        "scalability",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_priority() -> String {
    "High".to_string()
}

fn default_effort() -> String {
    "5-8 story points".to_string()
}

impl Default for HarmonizeConfig {
    fn default() -> Self {
        Self {
            min_story_lines: default_min_story_lines(),
            split_exclusions: default_split_exclusions(),
            priority: default_priority(),
            effort: default_effort(),
        }
    }
}

impl HarmonizeConfig {
    /// Load `harmonize.yaml` from the docs root, or defaults when absent.
    pub fn load(layout: &Layout) -> Result<Self> {
        let path = layout.harmonize_config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: HarmonizeConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Case-insensitive substring test against the exclusion keywords.
    pub fn excludes_from_split(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.split_exclusions
            .iter()
            .any(|kw| lower.contains(&kw.to_lowercase()))
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.min_story_lines == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "min_story_lines is 0; no story will ever be enhanced".to_string(),
            });
        }

        for kw in &self.split_exclusions {
            if kw.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "empty keyword in split_exclusions excludes every epic".to_string(),
                });
            }
        }

        if self.priority.trim().is_empty() || self.effort.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "priority and effort should not be blank".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Everything a run needs, resolved once at process entry.
#[derive(Debug, Clone)]
pub struct Config {
    pub layout: Layout,
    pub log_file: PathBuf,
    pub report_path: PathBuf,
    pub speak_command: String,
    pub harmonize: HarmonizeConfig,
}

impl Config {
    /// Defaults for `docs_root`: log and report next to it, stock tunables.
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        let layout = Layout::new(docs_root);
        Self {
            log_file: layout.default_log_path(),
            report_path: layout.default_report_path(),
            layout,
            speak_command: DEFAULT_SPEAK_COMMAND.to_string(),
            harmonize: HarmonizeConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
