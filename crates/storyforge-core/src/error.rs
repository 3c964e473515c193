use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("invalid epic id '{0}': expected EPIC-<digits>[A|B]")]
    InvalidEpicId(String),

    #[error("invalid story id '{0}': expected STORY-<digits>[A|B][-<nnn>]")]
    InvalidStoryId(String),

    #[error("unknown template placeholder '{{{{{0}}}}}'")]
    UnknownPlaceholder(String),

    #[error("unterminated template placeholder near '{0}'")]
    UnterminatedPlaceholder(String),

    #[error("no content rule registered for slot '{0}'")]
    UnfilledSlot(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
