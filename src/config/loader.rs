//! Document loading and staleness checks.
//!
//! Missing and empty files are reported as warnings and replaced by a
//! default document. Malformed YAML is fatal.
//!
//! Merge keys (`<<: *anchor`) are applied before conversion. Non-finite
//! floats have no JSON number form and are kept as their YAML spelling
//! (`.inf`, `-.inf`, `.nan`), so they never read back as null.

use super::document::Document;
use super::fingerprint::{Change, Fingerprint, first_change};
use crate::error::{ConfigError, Result};
use crate::logging::Logger;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Loads YAML files into [`Document`]s, reporting through a [`Logger`].
#[derive(Debug, Clone, Default)]
pub struct Loader {
    logger: Logger,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Load a YAML file, falling back to an empty document.
    pub fn open(&self, path: &Path) -> Result<Document> {
        self.open_or(path, Document::new())
    }

    /// Load a YAML file, falling back to `default` when the file is missing
    /// or parses to nothing.
    pub fn open_or(&self, path: &Path, default: Document) -> Result<Document> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.logger
                    .warning(&format!("Missing config: {}", path.display()));
                return Ok(default);
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        self.logger
            .debug(&format!("Loading config: {}", path.display()));

        let mut yaml: serde_yaml::Value = serde_yaml::from_str(&content)
            .and_then(|mut yaml: serde_yaml::Value| yaml.apply_merge().map(|()| yaml))
            .map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        spell_non_finite(&mut yaml);
        let value = serde_json::to_value(yaml).map_err(|source| ConfigError::Convert {
            path: path.clone(),
            source,
        })?;

        match value {
            Value::Null => {
                self.logger
                    .warning(&format!("Empty config: {}", path.display()));
                Ok(default)
            }
            Value::Object(map) => Ok(Document::from(map)),
            other => Err(ConfigError::NotADocument {
                path,
                found: kind_name(&other),
            }),
        }
    }

    /// Whether anything recorded in `fingerprints` has changed on disk.
    ///
    /// An empty list means nothing was ever loaded, which always needs a
    /// load. Stops at the first change found and logs it.
    pub fn is_stale(&self, fingerprints: &[Fingerprint]) -> bool {
        if fingerprints.is_empty() {
            return true;
        }
        match first_change(fingerprints) {
            Some((Change::Deleted, path)) => {
                self.logger
                    .info(&format!("Deleted config: {}", path.display()));
                true
            }
            Some((Change::Created, path)) => {
                self.logger
                    .info(&format!("Created config: {}", path.display()));
                true
            }
            Some((Change::Updated, path)) => {
                self.logger
                    .info(&format!("Updated config: {}", path.display()));
                true
            }
            None => false,
        }
    }
}

/// Replace non-finite floats with their YAML spelling, at any depth.
fn spell_non_finite(value: &mut serde_yaml::Value) {
    match value {
        serde_yaml::Value::Number(n) => {
            let Some(f) = n.as_f64().filter(|f| !f.is_finite()) else {
                return;
            };
            let spelling = if f.is_nan() {
                ".nan"
            } else if f > 0.0 {
                ".inf"
            } else {
                "-.inf"
            };
            *value = serde_yaml::Value::String(spelling.to_string());
        }
        serde_yaml::Value::Sequence(items) => items.iter_mut().for_each(spell_non_finite),
        serde_yaml::Value::Mapping(map) => map.values_mut().for_each(spell_non_finite),
        serde_yaml::Value::Tagged(tagged) => spell_non_finite(&mut tagged.value),
        _ => {}
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Severity;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn capturing_loader() -> (Loader, Arc<Mutex<Vec<(Severity, String)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let logger =
            Logger::new().with_sink(move |level, msg| captured.lock().unwrap().push((level, msg.to_string())));
        (Loader::with_logger(logger), seen)
    }

    #[test]
    fn test_open_preserves_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("base.yaml");
        std::fs::write(&path, "zeta: 1\nalpha: 2\nmid:\n  y: true\n  x: [1, 2]\n").unwrap();

        let doc = Loader::new().open(&path).unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(doc.into_value(), json!({"zeta": 1, "alpha": 2, "mid": {"y": true, "x": [1, 2]}}));
    }

    #[test]
    fn test_open_missing_warns_and_uses_default() {
        let temp = TempDir::new().unwrap();
        let (loader, seen) = capturing_loader();

        let mut default = Document::new();
        default.insert("fallback", json!(true));
        let doc = loader.open_or(&temp.path().join("nope.yaml"), default.clone()).unwrap();
        assert_eq!(doc, default);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, Severity::Warning);
        assert!(seen[0].1.starts_with("Missing config:"));
    }

    #[test]
    fn test_open_empty_warns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.yaml");
        std::fs::write(&path, "# only a comment\n").unwrap();
        let (loader, seen) = capturing_loader();

        let doc = loader.open(&path).unwrap();
        assert!(doc.is_empty());
        assert!(
            seen.lock()
                .unwrap()
                .iter()
                .any(|(level, msg)| *level == Severity::Warning && msg.starts_with("Empty config:"))
        );
    }

    #[test]
    fn test_open_malformed_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(&path, "a: [1, 2\nb: {").unwrap();

        let err = Loader::new().open(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_open_sequence_is_not_a_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("list.yaml");
        std::fs::write(&path, "- a\n- b\n").unwrap();

        let err = Loader::new().open(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotADocument { found: "a sequence", .. }));
    }

    #[test]
    fn test_open_keeps_non_finite_floats() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("limits.yaml");
        std::fs::write(&path, "timeout: .inf\nfloor: -.inf\nratio: .nan\nlist: [.inf, 1.5]\nport: 1\n").unwrap();

        let doc = Loader::new().open(&path).unwrap();
        assert_eq!(
            doc.into_value(),
            json!({"timeout": ".inf", "floor": "-.inf", "ratio": ".nan", "list": [".inf", 1.5], "port": 1})
        );
    }

    #[test]
    fn test_open_applies_merge_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("anchors.yaml");
        std::fs::write(&path, "defaults: &d {host: x, port: 1}\nsvc:\n  <<: *d\n  port: 2\n").unwrap();

        let doc = Loader::new().open(&path).unwrap();
        assert_eq!(doc.lookup("svc.host"), Some(&json!("x")));
        assert_eq!(doc.lookup("svc.port"), Some(&json!(2)));
        assert!(doc.get_map("svc").unwrap().get("<<").is_none());
    }

    #[test]
    fn test_open_bad_merge_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad-merge.yaml");
        std::fs::write(&path, "svc:\n  <<: 3\n").unwrap();

        let err = Loader::new().open(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_is_stale_empty() {
        assert!(Loader::new().is_stale(&[]));
    }

    #[test]
    fn test_is_stale_logs_deletion() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.yaml");
        std::fs::write(&path, "a: 1\n").unwrap();
        let fps = vec![Fingerprint::capture(&path)];
        let (loader, seen) = capturing_loader();

        assert!(!loader.is_stale(&fps));
        std::fs::remove_file(&path).unwrap();
        assert!(loader.is_stale(&fps));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().map(|(l, _)| *l), Some(Severity::Info));
        assert!(seen.last().unwrap().1.starts_with("Deleted config:"));
    }
}
