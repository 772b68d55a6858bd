//! Output formatting for composed documents and fingerprints.

use crate::config::{Document, Fingerprint};
use clap::ValueEnum;
use serde_json::Value;
use std::time::UNIX_EPOCH;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Render a whole document.
    pub fn render(&self, document: &Document) -> anyhow::Result<String> {
        match self {
            OutputFormat::Yaml => Ok(serde_yaml::to_string(document)?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(document)? + "\n"),
        }
    }

    /// Render a single value. Strings print bare in YAML mode.
    pub fn render_value(&self, value: &Value) -> anyhow::Result<String> {
        match (self, value) {
            (OutputFormat::Yaml, Value::String(s)) => Ok(format!("{s}\n")),
            (OutputFormat::Yaml, other) => Ok(serde_yaml::to_string(other)?),
            (OutputFormat::Json, other) => Ok(serde_json::to_string_pretty(other)? + "\n"),
        }
    }
}

/// One line per fingerprint: state, size, mtime (seconds), path.
pub fn format_fingerprints(fingerprints: &[Fingerprint]) -> String {
    let mut out = String::new();
    for fp in fingerprints {
        let mtime = fp
            .mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let state = if fp.exists { "ok" } else { "missing" };
        out.push_str(&format!(
            "{:<8} {:>10} {:>18.3} {}\n",
            state,
            fp.size,
            mtime,
            fp.path.display()
        ));
    }
    out
}
