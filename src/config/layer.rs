//! A single path-bound configuration layer.

use super::document::Document;
use super::fingerprint::Fingerprint;
use super::loader::Loader;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A layer shared between stacks. The mutex allows at most one refresh of
/// the layer at a time.
pub type SharedLayer = Arc<Mutex<Layer>>;

/// A named document loaded from a root file plus everything it imports.
///
/// `fingerprints[0]` describes the root file; the rest describe imported
/// files in discovery order. Document and fingerprints are only ever
/// replaced together.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    path: PathBuf,
    document: Document,
    fingerprints: Vec<Fingerprint>,
    generation: u64,
    loader: Loader,
}

impl Layer {
    /// Create an unloaded layer. The first [`refresh`](Self::refresh) loads it.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: name.into(),
            path: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
            document: Document::new(),
            fingerprints: Vec::new(),
            generation: 0,
            loader: Loader::default(),
        }
    }

    /// Create a layer and load it immediately.
    pub fn load(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let mut layer = Self::new(name, path);
        layer.refresh()?;
        Ok(layer)
    }

    /// Use `loader` (and its logger) for every subsequent load.
    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    /// Wrap the layer so it can be shared between stacks.
    pub fn shared(self) -> SharedLayer {
        Arc::new(Mutex::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    /// Number of times the layer has been (re)loaded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the next refresh would reload.
    pub fn is_stale(&self) -> bool {
        self.loader.is_stale(&self.fingerprints)
    }

    /// Reload if any contributing file changed, or if never loaded.
    ///
    /// On error the previous document and fingerprints are kept.
    pub fn refresh(&mut self) -> Result<&mut Self> {
        if self.is_stale() {
            self.reload()?;
        }
        Ok(self)
    }

    /// Reload unconditionally.
    pub fn reload(&mut self) -> Result<()> {
        self.loader
            .logger()
            .debug(&format!("Reloading layer {}: {}", self.name, self.path.display()));

        let mut document = self.loader.open(&self.path)?;
        let fingerprints = self.loader.resolve_imports(&mut document, &self.path)?;

        self.document = document;
        self.fingerprints = fingerprints;
        self.generation += 1;
        Ok(())
    }
}
