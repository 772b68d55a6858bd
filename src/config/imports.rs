//! `import` directive resolution.
//!
//! Any mapping, at any depth, may contain an `import` key whose value maps
//! arbitrary names to patterns:
//!
//! ```yaml
//! app:
//!   port: 8000
//!   import:
//!     defaults: app-defaults.yaml
//!     plugins: "plugins/*.yaml"
//! ```
//!
//! Patterns containing `*` or `?` are globs relative to the importing
//! file's directory; matches are loaded in sorted path order. Anything
//! else is a single path (relative paths are joined onto the importing
//! file's directory) that may or may not exist.
//!
//! Each imported file is resolved recursively, then its top-level keys are
//! assigned into the node holding the directive. Precedence depends on
//! position: keys declared *before* `import` in that node are overwritten
//! by imported content, keys declared *after* it are kept. Later imports
//! overwrite earlier imports. The `import` key is removed afterwards.

use super::document::{Document, Walk, node_at_mut, walk};
use super::fingerprint::Fingerprint;
use super::loader::Loader;
use crate::error::{ConfigError, Result};
use globset::GlobBuilder;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The reserved directive key.
pub const IMPORT_KEY: &str = "import";

/// Whether a pattern is expanded as a glob rather than a single path.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

impl Loader {
    /// Expand every `import` directive in `document`, which was loaded from
    /// `source`.
    ///
    /// Returns fingerprints for every contributing file: `source` first,
    /// then each imported file followed by whatever it imported, in the
    /// order they were discovered.
    pub fn resolve_imports(&self, document: &mut Document, source: &Path) -> Result<Vec<Fingerprint>> {
        let source = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());
        let mut chain = vec![identity(&source)];
        self.resolve_from(document, &source, &mut chain)
    }

    fn resolve_from(
        &self,
        document: &mut Document,
        source: &Path,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Vec<Fingerprint>> {
        let mut fingerprints = vec![Fingerprint::capture(source)];
        let base = source.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

        // Locate directives first, then mutate.
        for site in directive_sites(document) {
            let Some(node) = node_at_mut(document.as_map_mut(), &site) else {
                // Replaced by an earlier import in an enclosing node.
                continue;
            };
            let Some(protected) = keys_after_import(node) else {
                continue;
            };
            let Some(directive) = node.shift_remove(IMPORT_KEY) else {
                continue;
            };
            let entries = match directive {
                Value::Object(entries) => entries,
                // Every entry commented out.
                Value::Null => Map::new(),
                _ => {
                    return Err(ConfigError::invalid_import(
                        source,
                        format!("`{IMPORT_KEY}` must map names to patterns"),
                    ));
                }
            };

            for (name, pattern) in entries {
                let Value::String(pattern) = pattern else {
                    return Err(ConfigError::invalid_import(
                        source,
                        format!("pattern for `{name}` must be a string"),
                    ));
                };
                let candidates = expand(&base, &pattern)
                    .map_err(|reason| ConfigError::invalid_import(source, reason))?;
                for candidate in candidates {
                    let id = identity(&candidate);
                    if chain.contains(&id) {
                        self.logger()
                            .warning(&format!("Import cycle skipped: {}", candidate.display()));
                        continue;
                    }

                    let mut imported = self.open(&candidate)?;
                    chain.push(id);
                    let nested = self.resolve_from(&mut imported, &candidate, chain);
                    chain.pop();
                    fingerprints.extend(nested?);

                    merge_into(node, imported, &protected);
                }
            }
        }

        Ok(fingerprints)
    }
}

/// A spelling-independent name for a file, used to detect import cycles.
fn identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Paths (from the root) of every node holding an `import` key, in
/// pre-order document order. Directive values are not descended into.
fn directive_sites(document: &Document) -> Vec<Vec<String>> {
    let mut sites = Vec::new();
    walk(document.as_map(), &mut |parents, key, _| {
        if key == IMPORT_KEY {
            sites.push(parents.iter().map(|p| p.to_string()).collect());
            Walk::Skip
        } else {
            Walk::Continue
        }
    });
    sites
}

/// Sibling keys declared after `import`, which imports must not overwrite.
fn keys_after_import(node: &Map<String, Value>) -> Option<HashSet<String>> {
    let mut keys = node.keys();
    keys.find(|key| *key == IMPORT_KEY)?;
    Some(keys.cloned().collect())
}

fn merge_into(node: &mut Map<String, Value>, imported: Document, protected: &HashSet<String>) {
    for (key, value) in imported {
        if !protected.contains(&key) {
            node.insert(key, value);
        }
    }
}

/// Candidate paths for one pattern, relative to `base`.
fn expand(base: &Path, pattern: &str) -> std::result::Result<Vec<PathBuf>, String> {
    if !is_glob(pattern) {
        return Ok(vec![base.join(pattern)]);
    }

    // Walk from the deepest directory that has no wildcard in it, so that
    // patterns such as `../shared/*.yaml` or absolute globs work.
    let pattern_path = Path::new(pattern);
    let mut root = if pattern_path.is_absolute() {
        PathBuf::new()
    } else {
        base.to_path_buf()
    };
    let mut rest = Vec::new();
    for component in pattern_path.components() {
        let text = component.as_os_str().to_string_lossy();
        if rest.is_empty() && !is_glob(&text) {
            root.push(component);
        } else {
            rest.push(text.into_owned());
        }
    }
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let relative = rest.join("/");
    let matcher = GlobBuilder::new(&relative)
        .literal_separator(true)
        .build()
        .map_err(|e| format!("bad pattern `{pattern}`: {e}"))?
        .compile_matcher();
    let depth = if relative.contains("**") { usize::MAX } else { rest.len() };

    let mut matches: Vec<PathBuf> = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            entry
                .path()
                .strip_prefix(&root)
                .map(|rel| matcher.is_match(rel))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    matches.sort();
    Ok(matches)
}
