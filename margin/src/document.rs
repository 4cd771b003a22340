//! Document identity and the host-side document contracts.

use crate::error::{Error, Result};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
};

/// Canonical identifier for a document.
///
/// Built from a symlink-resolved absolute path so that two names for the same
/// file collide. When the file can't be resolved (typically because it doesn't
/// exist yet) the literal absolute path is used instead.
///
/// Equality, hashing and ordering all work on the raw path string, so keys
/// sort lexically rather than component-wise.
#[derive(Clone)]
pub struct DocumentKey(PathBuf);

impl DocumentKey {
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyDocumentKey);
        }

        match std::fs::canonicalize(path) {
            Ok(canonical) => Ok(Self(canonical)),
            Err(err) => {
                tracing::trace!("falling back to absolute path for {}: {err}", path.display());
                let absolute = std::path::absolute(path).map_err(|source| Error::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Self(absolute))
            },
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Path relative to `base` when the document lives under it, the full path otherwise.
    pub fn short_path(&self, base: Option<&Path>) -> String {
        base.and_then(|base| self.0.strip_prefix(base).ok())
            .filter(|relative| !relative.as_os_str().is_empty())
            .unwrap_or(&self.0)
            .display()
            .to_string()
    }
}

impl PartialEq for DocumentKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_os_str() == other.0.as_os_str()
    }
}

impl Eq for DocumentKey {}

impl Hash for DocumentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_os_str().hash(state);
    }
}

impl PartialOrd for DocumentKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DocumentKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_os_str().cmp(other.0.as_os_str())
    }
}

impl fmt::Debug for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DocumentKey").field(&self.0).finish()
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Read access to the documents a host currently has loaded.
///
/// Lines are 1-based. `None` means the document is not open.
pub trait DocumentAccess {
    fn line_count(&self, document: &DocumentKey) -> Option<u32>;

    fn line_text(&self, document: &DocumentKey, line: u32) -> Option<String>;
}

/// Answers whether a document still exists on disk.
pub trait ExistenceCheck {
    fn exists(&self, document: &DocumentKey) -> bool;
}

/// [`ExistenceCheck`] backed by the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskExistence;

impl ExistenceCheck for DiskExistence {
    fn exists(&self, document: &DocumentKey) -> bool {
        document.as_path().exists()
    }
}
