use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EpicSide
// ---------------------------------------------------------------------------

/// Which half of the stack an epic covers. `A` marks frontend, `B` backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpicSide {
    Frontend,
    Backend,
    FullStack,
}

impl EpicSide {
    pub fn from_suffix(suffix: Option<char>) -> Option<EpicSide> {
        match suffix {
            Some('A') => Some(EpicSide::Frontend),
            Some('B') => Some(EpicSide::Backend),
            _ => None,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            EpicSide::Frontend => "A",
            EpicSide::Backend => "B",
            EpicSide::FullStack => "",
        }
    }

    /// Label used in the story `**Type**` line.
    pub fn label(self) -> &'static str {
        match self {
            EpicSide::Frontend => "Frontend",
            EpicSide::Backend => "Backend",
            EpicSide::FullStack => "Full-Stack",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EpicSide::Frontend => "frontend",
            EpicSide::Backend => "backend",
            EpicSide::FullStack => "full_stack",
        }
    }
}

impl fmt::Display for EpicSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EpicType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpicType {
    Frontend,
    Backend,
    Infrastructure,
    Data,
    Monitoring,
    General,
}

impl EpicType {
    /// First keyword found in `name` decides the type, in declaration order.
    pub fn from_name(name: &str) -> EpicType {
        let lower = name.to_lowercase();
        [
            ("frontend", EpicType::Frontend),
            ("backend", EpicType::Backend),
            ("infrastructure", EpicType::Infrastructure),
            ("data", EpicType::Data),
            ("monitoring", EpicType::Monitoring),
        ]
        .into_iter()
        .filter_map(|(kw, t)| lower.find(kw).map(|pos| (pos, t)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, t)| t)
        .unwrap_or(EpicType::General)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EpicType::Frontend => "frontend",
            EpicType::Backend => "backend",
            EpicType::Infrastructure => "infrastructure",
            EpicType::Data => "data",
            EpicType::Monitoring => "monitoring",
            EpicType::General => "general",
        }
    }
}

impl fmt::Display for EpicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StoryType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    #[default]
    Feature,
    Technical,
    Documentation,
}

impl StoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            StoryType::Feature => "feature",
            StoryType::Technical => "technical",
            StoryType::Documentation => "documentation",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Harmonization phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Split,
    Create,
    Enhance,
    Link,
    Report,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Split,
            Phase::Create,
            Phase::Enhance,
            Phase::Link,
            Phase::Report,
        ]
    }

    /// 1-based position, as shown in logs.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Split => "split",
            Phase::Create => "create",
            Phase::Enhance => "enhance",
            Phase::Link => "link",
            Phase::Report => "report",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Phase::Split => "Splitting Full-Stack Epics",
            Phase::Create => "Creating Missing Stories",
            Phase::Enhance => "Enhancing Short Stories",
            Phase::Link => "Updating Links Between Epics and Stories",
            Phase::Report => "Validating and Generating Report",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
