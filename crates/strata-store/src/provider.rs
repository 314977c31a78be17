//! Storage providers
//!
//! [`StorageProvider`] is the seam between record persistence and whatever
//! actually holds the bytes. Paths are always relative, forward-slash
//! separated, and resolved by the provider; a provider must refuse any
//! path that would escape its root.
//!
//! Two implementations ship here:
//!
//! - [`DiskStore`]: a directory subtree on the local filesystem
//! - [`MemoryStore`]: an in-process map, for tests and ephemeral use

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised by storage providers
#[derive(Debug, Error)]
pub enum StoreError {
    /// The path does not name an existing entry
    #[error("no entry at '{path}'")]
    NotFound {
        /// The missing path, as given by the caller
        path: String,
    },

    /// The path is absolute or would escape the provider's root
    #[error("invalid path '{path}'")]
    InvalidPath {
        /// The offending path
        path: String,
    },

    /// The underlying medium failed
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Storage operation result
pub type StoreResult<T> = Result<T, StoreError>;

/// One entry returned by [`StorageProvider::enumerate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Name relative to the enumerated directory
    pub name: String,
    /// Whether the entry is itself a directory
    pub is_dir: bool,
}

/// Abstract byte storage keyed by relative paths
pub trait StorageProvider {
    /// Whether an entry exists at the path
    fn exists(&self, path: &str) -> StoreResult<bool>;

    /// Read the full contents of the entry at the path
    fn read(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Write the bytes to the path, replacing any previous contents
    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()>;

    /// Delete the entry at the path
    ///
    /// With `recursive` set, a directory and everything under it is
    /// removed; without it, deleting a non-empty directory fails.
    fn delete(&self, path: &str, recursive: bool) -> StoreResult<()>;

    /// List the entries directly under the path
    fn enumerate(&self, path: &str) -> StoreResult<Vec<Entry>>;
}

/// Reject absolute paths and any traversal out of the root
fn validate(path: &str) -> StoreResult<&Path> {
    let p = Path::new(path);
    for component in p.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath {
                    path: path.to_string(),
                });
            }
        }
    }
    Ok(p)
}

/// Filesystem-backed provider rooted at a directory
#[derive(Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "opened disk store");
        Ok(Self { root })
    }

    /// The root directory this store resolves paths under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        Ok(self.root.join(validate(path)?))
    }
}

impl StorageProvider for DiskStore {
    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.resolve(path)?.exists())
    }

    fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full = self.resolve(path)?;
        match fs::read(&full) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, data)?;
        Ok(())
    }

    fn delete(&self, path: &str, recursive: bool) -> StoreResult<()> {
        let full = self.resolve(path)?;
        let meta = match fs::symlink_metadata(&full) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if meta.is_dir() {
            if recursive {
                fs::remove_dir_all(&full)?;
            } else {
                fs::remove_dir(&full)?;
            }
        } else {
            fs::remove_file(&full)?;
        }
        Ok(())
    }

    fn enumerate(&self, path: &str) -> StoreResult<Vec<Entry>> {
        let full = self.resolve(path)?;
        let dir = match fs::read_dir(&full) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry?;
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// In-memory provider for tests and ephemeral data
///
/// Directories are implicit: they exist exactly when some stored path
/// passes through them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(path: &str) -> StoreResult<PathBuf> {
        // Strip CurDir components so "./a" and "a" hit the same key.
        Ok(validate(path)?
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect())
    }
}

impl StorageProvider for MemoryStore {
    fn exists(&self, path: &str) -> StoreResult<bool> {
        let key = Self::normalize(path)?;
        let files = self.files.read();
        Ok(files.contains_key(&key) || files.keys().any(|p| p.starts_with(&key) && *p != key))
    }

    fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        let key = Self::normalize(path)?;
        self.files
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let key = Self::normalize(path)?;
        self.files.write().insert(key, data.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str, recursive: bool) -> StoreResult<()> {
        let key = Self::normalize(path)?;
        let mut files = self.files.write();
        if files.remove(&key).is_some() {
            return Ok(());
        }
        let children: Vec<PathBuf> = files
            .keys()
            .filter(|p| p.starts_with(&key))
            .cloned()
            .collect();
        if children.is_empty() {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        if !recursive {
            return Err(StoreError::Io(io::Error::other("directory not empty")));
        }
        for child in children {
            files.remove(&child);
        }
        Ok(())
    }

    fn enumerate(&self, path: &str) -> StoreResult<Vec<Entry>> {
        let key = Self::normalize(path)?;
        let files = self.files.read();
        let mut entries: Vec<Entry> = Vec::new();
        let mut found = key.as_os_str().is_empty();
        for stored in files.keys() {
            let Ok(rest) = stored.strip_prefix(&key) else {
                continue;
            };
            let mut components = rest.components();
            let Some(Component::Normal(first)) = components.next() else {
                // The path itself is a file, not a directory.
                continue;
            };
            found = true;
            let entry = Entry {
                name: first.to_string_lossy().into_owned(),
                is_dir: components.next().is_some(),
            };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        if !found {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
