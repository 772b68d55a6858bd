//! Error types for configuration loading.
//!
//! Missing and empty files are not errors: the loader reports them through
//! the [`Logger`](crate::logging::Logger) and substitutes a default. Every
//! variant here is fatal and propagates to whoever started the load.

use std::path::PathBuf;

/// Fatal configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but is not valid YAML.
    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML could not be represented as a document (e.g. a sequence
    /// used as a mapping key).
    #[error("Unsupported YAML structure in {}: {source}", path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed, but its top level is not a mapping.
    #[error("Config {} must be a mapping, found {found}", path.display())]
    NotADocument { path: PathBuf, found: &'static str },

    /// The file exists but could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An `import` directive is malformed.
    #[error("Invalid import in {}: {reason}", path.display())]
    InvalidImport { path: PathBuf, reason: String },
}

impl ConfigError {
    pub fn invalid_import(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidImport {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The file the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Parse { path, .. }
            | Self::Convert { path, .. }
            | Self::NotADocument { path, .. }
            | Self::Io { path, .. }
            | Self::InvalidImport { path, .. } => path,
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
