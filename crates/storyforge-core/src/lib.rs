//! Story catalog generation and epic/story harmonization over a markdown
//! documentation tree.

pub mod catalog;
pub mod config;
pub mod epic;
pub mod error;
pub mod harmonize;
pub mod ids;
pub mod io;
pub mod notify;
pub mod paths;
pub mod sections;
pub mod snapshot;
pub mod story;
pub mod template;
pub mod types;

pub use error::{ForgeError, Result};
