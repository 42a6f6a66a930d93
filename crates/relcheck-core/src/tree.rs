//! Source tree access.
//!
//! The engine reads manifests and version files through the [`SourceTree`]
//! trait instead of touching the filesystem directly, so the orchestrator is
//! testable from in-memory fixtures. Paths are relative, `/`-separated, with
//! `""` naming the root. Target-file resolution is case-insensitive; folder
//! snapshots from the artifact server mix cases freely.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by a source tree provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TreeError {
    /// An underlying I/O operation failed.
    #[error("source tree I/O failed at {path}: {source}")]
    Io {
        /// The relative path being accessed.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Read-only access to a comparison source tree.
pub trait SourceTree {
    /// Immediate subdirectory names of `dir`, sorted. A missing directory
    /// lists as empty.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] when the listing fails.
    fn subdirs(&self, dir: &str) -> Result<Vec<String>, TreeError>;

    /// Read a file, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] for I/O failures other than absence.
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, TreeError>;

    /// Resolve `file_name` inside `dir` ignoring ASCII case. Returns the
    /// actual relative path, or `None` when no entry matches.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] when the listing fails.
    fn resolve_file(&self, dir: &str, file_name: &str) -> Result<Option<String>, TreeError>;

    /// Resolve and read a target file as UTF-8 text (lossily).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] for I/O failures other than absence.
    fn read_target(&self, dir: &str, file_name: &str) -> Result<Option<String>, TreeError> {
        match self.resolve_file(dir, file_name)? {
            Some(path) => Ok(self
                .read_file(&path)?
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }
}

/// Join two relative path segments.
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// A [`SourceTree`] rooted at a filesystem directory.
#[derive(Debug, Clone)]
pub struct FsSourceTree {
    root: PathBuf,
}

impl FsSourceTree {
    /// Create a tree rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

impl SourceTree for FsSourceTree {
    fn subdirs(&self, dir: &str) -> Result<Vec<String>, TreeError> {
        let abs = self.abs(dir);
        let entries = match std::fs::read_dir(&abs) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(TreeError::Io {
                    path: dir.to_string(),
                    source,
                })
            }
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| TreeError::Io {
                path: dir.to_string(),
                source,
            })?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, TreeError> {
        match std::fs::read(self.abs(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TreeError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    fn resolve_file(&self, dir: &str, file_name: &str) -> Result<Option<String>, TreeError> {
        let abs = self.abs(dir);
        let entries = match std::fs::read_dir(&abs) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TreeError::Io {
                    path: dir.to_string(),
                    source,
                })
            }
        };
        for entry in entries {
            let entry = entry.map_err(|source| TreeError::Io {
                path: dir.to_string(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.eq_ignore_ascii_case(file_name) && entry.path().is_file() {
                return Ok(Some(join(dir, &name)));
            }
        }
        Ok(None)
    }
}

/// An in-memory [`SourceTree`] for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemSourceTree {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemSourceTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at a relative path.
    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> &mut Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Builder-style [`Self::add_file`].
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, content);
        self
    }

    fn children(&self, dir: &str) -> Vec<&str> {
        if dir.is_empty() {
            return self.files.keys().map(String::as_str).collect();
        }
        let prefix = format!("{dir}/");
        self.files
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .collect()
    }
}

impl SourceTree for MemSourceTree {
    fn subdirs(&self, dir: &str) -> Result<Vec<String>, TreeError> {
        let mut names: Vec<String> = self
            .children(dir)
            .into_iter()
            .filter_map(|rest| {
                rest.split_once('/')
                    .map(|(first, _)| first.to_string())
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, TreeError> {
        Ok(self.files.get(path).cloned())
    }

    fn resolve_file(&self, dir: &str, file_name: &str) -> Result<Option<String>, TreeError> {
        for rest in self.children(dir) {
            if !rest.contains('/') && rest.eq_ignore_ascii_case(file_name) {
                return Ok(Some(join(dir, rest)));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemSourceTree {
        MemSourceTree::new()
            .with_file("mod1/DB2302/manifest.xml", "<manifest/>")
            .with_file("mod1/DB2302/F_VERSION.TXT", "P_GIT_001;a\n")
            .with_file("mod1/DB2302-premp/manifest.xml", "<manifest/>")
            .with_file("mod2/DB9999/Version.txt", "Version: 1\n")
    }

    #[test]
    fn test_mem_subdirs_root() {
        let tree = sample();
        assert_eq!(tree.subdirs("").unwrap(), ["mod1", "mod2"]);
    }

    #[test]
    fn test_mem_subdirs_nested() {
        let tree = sample();
        assert_eq!(tree.subdirs("mod1").unwrap(), ["DB2302", "DB2302-premp"]);
    }

    #[test]
    fn test_mem_resolve_case_insensitive() {
        let tree = sample();
        assert_eq!(
            tree.resolve_file("mod1/DB2302", "f_version.txt").unwrap(),
            Some("mod1/DB2302/F_VERSION.TXT".to_string())
        );
        assert_eq!(tree.resolve_file("mod1/DB2302", "Version.txt").unwrap(), None);
    }

    #[test]
    fn test_mem_read_target() {
        let tree = sample();
        let content = tree.read_target("mod1/DB2302", "F_Version.txt").unwrap();
        assert_eq!(content.as_deref(), Some("P_GIT_001;a\n"));
    }

    #[test]
    fn test_fs_tree_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("mod1/DB1");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(module.join("MANIFEST.xml"), "<manifest/>").unwrap();

        let tree = FsSourceTree::new(dir.path());
        assert_eq!(tree.subdirs("").unwrap(), ["mod1"]);
        assert_eq!(tree.subdirs("mod1").unwrap(), ["DB1"]);
        assert_eq!(
            tree.resolve_file("mod1/DB1", "manifest.xml").unwrap(),
            Some("mod1/DB1/MANIFEST.xml".to_string())
        );
        assert_eq!(
            tree.read_target("mod1/DB1", "manifest.xml").unwrap(),
            Some("<manifest/>".to_string())
        );
        assert_eq!(tree.read_file("mod1/DB1/absent").unwrap(), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a", "b"), "a/b");
    }
}
