// src/fs/mock.rs

//! In-memory filesystem with explicit modification times.
//!
//! Times are given as whole seconds after the Unix epoch so tests can state
//! "input is newer than output" without sleeping.

use super::{normalize_path, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { mtime: u64 },
    Dir { children: Vec<String>, mtime: u64 },
}

impl MockEntry {
    fn mtime(&self) -> u64 {
        match self {
            MockEntry::File { mtime } | MockEntry::Dir { mtime, .. } => *mtime,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(
            PathBuf::from("."),
            MockEntry::Dir {
                children: Vec::new(),
                mtime: 0,
            },
        );

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        // A poisoned lock only means another test thread panicked.
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create (or overwrite) a file with the given mtime, creating parents.
    pub fn add_file(&self, path: impl AsRef<Path>, mtime: u64) {
        let path = normalize_path(path.as_ref());
        let mut files = self.lock();
        files.insert(path.clone(), MockEntry::File { mtime });
        Self::link_to_parent(&mut files, &path, mtime);
    }

    /// Create a directory with the given mtime, creating parents.
    pub fn add_dir(&self, path: impl AsRef<Path>, mtime: u64) {
        let path = normalize_path(path.as_ref());
        let mut files = self.lock();
        match files.get_mut(&path) {
            Some(MockEntry::Dir { mtime: m, .. }) => *m = mtime,
            _ => {
                files.insert(
                    path.clone(),
                    MockEntry::Dir {
                        children: Vec::new(),
                        mtime,
                    },
                );
            }
        }
        Self::link_to_parent(&mut files, &path, mtime);
    }

    /// Update the mtime of an existing entry, or create a file if absent.
    pub fn touch(&self, path: impl AsRef<Path>, mtime: u64) {
        let key = normalize_path(path.as_ref());
        let mut files = self.lock();
        if let Some(MockEntry::File { mtime: m } | MockEntry::Dir { mtime: m, .. }) =
            files.get_mut(&key)
        {
            *m = mtime;
            return;
        }
        files.insert(key.clone(), MockEntry::File { mtime });
        Self::link_to_parent(&mut files, &key, mtime);
    }

    fn link_to_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path, mtime: u64) {
        let Some(parent) = path.parent() else {
            return;
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if parent == path {
            return;
        }

        if !files.contains_key(parent) {
            files.insert(
                parent.to_path_buf(),
                MockEntry::Dir {
                    children: Vec::new(),
                    mtime,
                },
            );
            Self::link_to_parent(files, parent, mtime);
        }

        if let (Some(MockEntry::Dir { children, .. }), Some(name)) = (
            files.get_mut(parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn to_system_time(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(&normalize_path(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(
            self.lock().get(&normalize_path(path)),
            Some(MockEntry::File { .. })
        )
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.lock().get(&normalize_path(path)),
            Some(MockEntry::Dir { .. })
        )
    }

    fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
        Ok(self
            .lock()
            .get(&normalize_path(path))
            .map(|e| to_system_time(e.mtime())))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.lock();
        match files.get(&normalize_path(path)) {
            Some(MockEntry::Dir { children, .. }) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn remove(&self, path: &Path) -> Result<bool> {
        let key = normalize_path(path);
        let mut files = self.lock();
        if files.remove(&key).is_none() {
            return Ok(false);
        }

        // Drop everything below a removed directory.
        files.retain(|p, _| !p.starts_with(&key));

        if let Some(parent) = key.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let (Some(MockEntry::Dir { children, .. }), Some(name)) = (
                files.get_mut(parent),
                key.file_name().and_then(|n| n.to_str()),
            ) {
                children.retain(|c| c != name);
            }
        }
        Ok(true)
    }
}
