//! A composed configuration that can be re-read while it is being reloaded.
//!
//! [`LiveConfig`] owns a [`LayerStack`] and publishes each composed
//! document through an `ArcSwap`. Reloads are serialized by a mutex around
//! the stack; readers never block and always see either the previous or
//! the new document.

use super::document::Document;
use super::stack::LayerStack;
use crate::error::Result;
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug)]
pub struct LiveConfig {
    stack: Mutex<LayerStack>,
    current: ArcSwap<Document>,
}

impl LiveConfig {
    /// Compose `stack` once and publish the result.
    pub fn new(stack: LayerStack) -> Result<Self> {
        let document = stack.compose()?;
        Ok(Self {
            stack: Mutex::new(stack),
            current: ArcSwap::from_pointee(document),
        })
    }

    /// The most recently published document.
    pub fn current(&self) -> Arc<Document> {
        self.current.load_full()
    }

    /// Recompose and publish if the result differs from what readers see.
    ///
    /// Returns whether a new document was published. On error the
    /// published document is left as it was.
    pub fn reload(&self) -> Result<bool> {
        let stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        let document = stack.compose()?;
        if *self.current.load_full() == document {
            return Ok(false);
        }
        self.current.store(Arc::new(document));
        Ok(true)
    }

    /// Whether any layer would reload on the next [`reload`](Self::reload).
    pub fn is_stale(&self) -> bool {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_stale()
    }

    /// Change the stack's members. Takes effect on the next reload.
    pub fn update_stack<R>(&self, f: impl FnOnce(&mut LayerStack) -> R) -> R {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut stack)
    }
}
