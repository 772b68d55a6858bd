//! File fingerprints for staleness polling.
//!
//! A [`Fingerprint`] freezes a path's existence, modification time and
//! size. Nothing watches the filesystem; staleness is decided by
//! re-statting recorded paths when a refresh is requested.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Snapshot of a path's state at capture time.
///
/// A missing path is recorded as `exists = false`, `mtime = UNIX_EPOCH`,
/// `size = 0` rather than omitted, so "never existed" and "deleted" can
/// both be compared against later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub path: PathBuf,
    pub exists: bool,
    pub mtime: SystemTime,
    pub size: u64,
}

/// How a fingerprinted path differs from its live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The path existed when captured and is now gone.
    Deleted,
    /// The path was missing when captured and now exists.
    Created,
    /// The path is newer than recorded, or its size differs.
    Updated,
}

impl Fingerprint {
    /// Stat `path` now.
    ///
    /// Any metadata failure (including a file removed between an existence
    /// check and the stat) is treated as "does not exist".
    pub fn capture(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(meta) => Self {
                path: path.to_path_buf(),
                exists: true,
                mtime: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                size: meta.len(),
            },
            Err(_) => Self::missing(path),
        }
    }

    /// The sentinel fingerprint for a path that does not exist.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exists: false,
            mtime: SystemTime::UNIX_EPOCH,
            size: 0,
        }
    }

    /// Compare against the live state of the path.
    pub fn change(&self) -> Option<Change> {
        self.compare(&Self::capture(&self.path))
    }

    /// Compare against another capture of the same path.
    ///
    /// A newer mtime or a different size is an update; an older mtime with
    /// the same size is not.
    pub fn compare(&self, current: &Fingerprint) -> Option<Change> {
        match (self.exists, current.exists) {
            (true, false) => Some(Change::Deleted),
            (false, false) => None,
            (false, true) => Some(Change::Created),
            (true, true) => {
                if current.mtime > self.mtime || current.size != self.size {
                    Some(Change::Updated)
                } else {
                    None
                }
            }
        }
    }
}

/// The first recorded change in `fingerprints`, with the affected path.
pub fn first_change(fingerprints: &[Fingerprint]) -> Option<(Change, &Path)> {
    fingerprints
        .iter()
        .find_map(|fp| fp.change().map(|change| (change, fp.path.as_path())))
}
