//! Layered YAML configuration.
//!
//! Loads YAML documents with recursive `import:` directives, tracks the
//! files that built each layer, and composes layers into one document with
//! later-wins override and `null` deletion.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;

pub use config::{Document, Layer, LayerStack, LiveConfig, Loader};
pub use error::{ConfigError, Result};
