//! Layered configuration.
//!
//! Configuration is built from YAML files in three steps:
//! 1. **Load** - [`Loader::open`] parses one file into an ordered [`Document`]
//! 2. **Import** - [`Loader::resolve_imports`] expands `import:` directives
//!    found at any depth and records a [`Fingerprint`] for every file used
//! 3. **Compose** - [`LayerStack::compose`] refreshes each [`Layer`] and
//!    assigns their top-level keys in order, later layers winning
//!
//! ## Reloading
//! Nothing watches the filesystem. A layer re-stats its fingerprints when
//! refreshed and reloads only if a file was created, deleted, grew newer,
//! or changed size.
//!
//! ## Deleting keys
//! A `null` value anywhere in the composed document deletes that key. Use
//! it in a later layer to remove a key set by an earlier one.

mod document;
mod fingerprint;
mod imports;
mod layer;
mod live;
mod loader;
mod stack;

pub use document::{Document, Walk, walk};
pub use fingerprint::{Change, Fingerprint, first_change};
pub use imports::{IMPORT_KEY, is_glob};
pub use layer::{Layer, SharedLayer};
pub use live::LiveConfig;
pub use loader::Loader;
pub use stack::{LayerStack, Member, lock};
