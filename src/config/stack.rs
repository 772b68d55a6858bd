//! Ordered composition of layers.
//!
//! A [`LayerStack`] holds named members in insertion order. Composing it
//! refreshes every layer, assigns each member's top-level keys over the
//! previous members' (later members win, no deep merge), and finally
//! deletes every key whose value is null at any depth.

use super::document::Document;
use super::layer::{Layer, SharedLayer};
use crate::error::Result;
use std::sync::{MutexGuard, PoisonError};

/// One entry of a [`LayerStack`].
#[derive(Debug, Clone)]
pub enum Member {
    /// A file-backed layer, refreshed on every compose.
    Layer(SharedLayer),
    /// An in-memory document with no backing path.
    Static(Document),
}

impl Member {
    /// Whether composing would reload this member.
    pub fn is_stale(&self) -> bool {
        match self {
            Member::Layer(layer) => lock(layer).is_stale(),
            Member::Static(_) => false,
        }
    }

    /// Refresh if file-backed, then copy out the current document.
    fn refreshed_document(&self) -> Result<Document> {
        match self {
            Member::Layer(layer) => {
                let mut layer = lock(layer);
                layer.refresh()?;
                Ok(layer.document().clone())
            }
            Member::Static(document) => Ok(document.clone()),
        }
    }
}

/// Lock a shared layer.
///
/// A layer swaps its document and fingerprints in one step, so a panic in
/// another holder cannot leave it half-updated and the poison flag is
/// ignored.
pub fn lock(layer: &SharedLayer) -> MutexGuard<'_, Layer> {
    layer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Named layers composed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    members: Vec<(String, Member)>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member.
    ///
    /// Replacing keeps the member's original position, and so its
    /// precedence.
    pub fn insert(&mut self, name: impl Into<String>, member: Member) -> Option<Member> {
        let name = name.into();
        match self.members.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, member)),
            None => {
                self.members.push((name, member));
                None
            }
        }
    }

    /// Add a file-backed layer under its own name.
    pub fn push_layer(&mut self, layer: Layer) -> SharedLayer {
        let name = layer.name().to_string();
        let shared = layer.shared();
        self.insert(name, Member::Layer(shared.clone()));
        shared
    }

    /// Add a layer that may also belong to other stacks.
    pub fn push_shared(&mut self, name: impl Into<String>, layer: SharedLayer) {
        self.insert(name, Member::Layer(layer));
    }

    /// Add an in-memory document.
    pub fn push_static(&mut self, name: impl Into<String>, document: Document) {
        self.insert(name, Member::Static(document));
    }

    /// Builder-style [`push_layer`](Self::push_layer).
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.push_layer(layer);
        self
    }

    /// Builder-style [`push_static`](Self::push_static).
    pub fn with_static(mut self, name: impl Into<String>, document: Document) -> Self {
        self.push_static(name, document);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Member> {
        let index = self.members.iter().position(|(existing, _)| existing == name)?;
        Some(self.members.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, member)| member)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether any file-backed member would reload on the next compose.
    pub fn is_stale(&self) -> bool {
        self.members.iter().any(|(_, member)| member.is_stale())
    }

    /// Refresh every layer and merge all members into a new document.
    ///
    /// The result is independent of the members' own documents. The first
    /// fatal load error aborts the compose.
    pub fn compose(&self) -> Result<Document> {
        let mut merged = Document::new();
        for (_, member) in &self.members {
            merged.assign(member.refreshed_document()?);
        }
        merged.remove_tombstones();
        Ok(merged)
    }
}
