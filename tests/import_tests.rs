//! Integration tests for `import` directive resolution.
//!
//! Covers literal and glob imports, ordering-sensitive precedence,
//! transitive fingerprint order, and malformed directives.

use layerconf::config::{Document, IMPORT_KEY, Loader};
use layerconf::error::ConfigError;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Load `path` and resolve its imports, returning the document and the
/// fingerprinted paths.
fn resolve(path: &Path) -> (Document, Vec<std::path::PathBuf>) {
    let loader = Loader::new();
    let mut doc = loader.open(path).unwrap();
    let fps = loader.resolve_imports(&mut doc, path).unwrap();
    (doc, fps.into_iter().map(|fp| fp.path).collect())
}

fn keys(doc: &Document) -> Vec<String> {
    doc.keys().map(str::to_string).collect()
}

#[test]
fn test_import_precedence_depends_on_position() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "child.conf", "a: 9\nc: 3\n");
    let root = write(temp.path(), "root.conf", "a: 1\nimport:\n  x: child.conf\nb: 2\n");

    let (doc, _) = resolve(&root);
    assert_eq!(doc.clone().into_value(), json!({"a": 9, "b": 2, "c": 3}));
    assert_eq!(keys(&doc), vec!["a", "b", "c"]);
}

#[test]
fn test_keys_after_import_are_not_overwritten() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "child.conf", "before: imported\nafter: imported\n");
    let root = write(
        temp.path(),
        "root.conf",
        "before: local\nimport:\n  x: child.conf\nafter: local\n",
    );

    let (doc, _) = resolve(&root);
    assert_eq!(doc.get_str("before"), Some("imported"));
    assert_eq!(doc.get_str("after"), Some("local"));
    assert!(!doc.contains_key(IMPORT_KEY));
}

#[test]
fn test_glob_import_merges_in_sorted_order() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "b.sub.conf", "shared: b\nfrom_b: 1\n");
    write(temp.path(), "a.sub.conf", "shared: a\nfrom_a: 1\n");
    write(temp.path(), "c.sub.conf", "shared: c\nfrom_c: 1\n");
    write(temp.path(), "ignored.conf", "shared: ignored\n");
    let root = write(temp.path(), "root.conf", "import:\n  subs: \"*.sub.conf\"\n");

    let (doc, paths) = resolve(&root);
    assert_eq!(doc.get_str("shared"), Some("c"));
    assert_eq!(doc.get_i64("from_a"), Some(1));
    assert_eq!(doc.get_i64("from_b"), Some(1));
    assert_eq!(doc.get_i64("from_c"), Some(1));
    assert!(!doc.contains_key(IMPORT_KEY));
    assert_eq!(keys(&doc), vec!["shared", "from_a", "from_b", "from_c"]);

    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["root.conf", "a.sub.conf", "b.sub.conf", "c.sub.conf"]);
}

#[test]
fn test_glob_with_no_matches_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "root.conf", "keep: 1\nimport:\n  none: \"*.missing\"\n");

    let (doc, paths) = resolve(&root);
    assert_eq!(doc.into_value(), json!({"keep": 1}));
    assert_eq!(paths, vec![root]);
}

#[test]
fn test_recursive_imports_fingerprint_order() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yaml", "from_a: 1\nimport:\n  b: b.yaml\n");
    let b = write(temp.path(), "b.yaml", "from_b: 1\nimport:\n  c: c.yaml\n");
    let c = write(temp.path(), "c.yaml", "from_c: 1\n");

    let (doc, paths) = resolve(&a);
    assert_eq!(paths, vec![a, b, c]);
    assert_eq!(doc.into_value(), json!({"from_a": 1, "from_b": 1, "from_c": 1}));
}

#[test]
fn test_fingerprints_are_depth_first() {
    let temp = TempDir::new().unwrap();
    let root = write(
        temp.path(),
        "root.yaml",
        "import:\n  first: one.yaml\n  second: two.yaml\n",
    );
    let one = write(temp.path(), "one.yaml", "import:\n  nested: one-child.yaml\n");
    let one_child = write(temp.path(), "one-child.yaml", "x: 1\n");
    let two = write(temp.path(), "two.yaml", "y: 2\n");

    let (_, paths) = resolve(&root);
    assert_eq!(paths, vec![root, one, one_child, two]);
}

#[test]
fn test_nested_import_merges_into_enclosing_node() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "db.yaml", "host: db.internal\nport: 5432\n");
    let root = write(
        temp.path(),
        "root.yaml",
        "app:\n  name: demo\n  database:\n    import:\n      db: db.yaml\n    port: 6432\n",
    );

    let (doc, _) = resolve(&root);
    assert_eq!(
        doc.into_value(),
        json!({"app": {"name": "demo", "database": {"port": 6432, "host": "db.internal"}}})
    );
}

#[test]
fn test_imports_relative_to_importing_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "conf/shared/common.yaml", "common: true\nimport:\n  deep: deeper.yaml\n");
    write(temp.path(), "conf/shared/deeper.yaml", "deeper: true\n");
    let root = write(temp.path(), "conf/app.yaml", "import:\n  common: shared/common.yaml\n");

    let (doc, paths) = resolve(&root);
    assert_eq!(doc.get_bool("common"), Some(true));
    assert_eq!(doc.get_bool("deeper"), Some(true));
    assert_eq!(paths.len(), 3);
}

#[test]
fn test_missing_literal_import_is_fingerprinted() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "root.yaml", "a: 1\nimport:\n  local: local.yaml\n");

    let loader = Loader::new();
    let mut doc = loader.open(&root).unwrap();
    let fps = loader.resolve_imports(&mut doc, &root).unwrap();

    assert_eq!(doc.into_value(), json!({"a": 1}));
    assert_eq!(fps.len(), 2);
    assert!(!fps[1].exists);
    assert_eq!(fps[1].path, temp.path().join("local.yaml"));
}

#[test]
fn test_import_cycle_is_skipped() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yaml", "a: 1\nimport:\n  b: b.yaml\n");
    let b = write(temp.path(), "b.yaml", "b: 1\nimport:\n  a: ./a.yaml\n");

    let (doc, paths) = resolve(&a);
    assert_eq!(doc.into_value(), json!({"a": 1, "b": 1}));
    assert_eq!(paths, vec![a, b]);
}

#[test]
fn test_imported_tombstones_survive_resolution() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "child.yaml", "removed: null\n");
    let root = write(temp.path(), "root.yaml", "removed: 1\nimport:\n  c: child.yaml\n");

    let (doc, _) = resolve(&root);
    assert_eq!(doc.get("removed"), Some(&Value::Null));
}

#[test]
fn test_import_must_be_mapping() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "root.yaml", "import: child.yaml\n");

    let loader = Loader::new();
    let mut doc = loader.open(&root).unwrap();
    let err = loader.resolve_imports(&mut doc, &root).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidImport { .. }));
}

#[test]
fn test_empty_import_is_dropped() {
    let temp = TempDir::new().unwrap();
    let root = write(
        temp.path(),
        "root.yaml",
        "a: 1\nimport:\n  # off: child.yaml\nb: 2\n",
    );

    let (doc, paths) = resolve(&root);
    assert_eq!(doc.into_value(), json!({"a": 1, "b": 2}));
    assert_eq!(paths, vec![root]);
}

#[test]
fn test_import_pattern_must_be_string() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "root.yaml", "import:\n  bad: [a.yaml, b.yaml]\n");

    let loader = Loader::new();
    let mut doc = loader.open(&root).unwrap();
    let err = loader.resolve_imports(&mut doc, &root).unwrap_err();
    assert!(err.to_string().contains("pattern for `bad` must be a string"));
}

#[test]
fn test_malformed_import_propagates_parse_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "broken.yaml", "key: [unclosed\n");
    let root = write(temp.path(), "root.yaml", "import:\n  b: broken.yaml\n");

    let loader = Loader::new();
    let mut doc = loader.open(&root).unwrap();
    let err = loader.resolve_imports(&mut doc, &root).unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => assert!(path.ends_with("broken.yaml")),
        other => panic!("expected parse error, got {other:?}"),
    }
}
