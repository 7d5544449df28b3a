//! File storage used by the `/files` handlers.
//!
//! Handlers only see the [`Storage`] trait. [`DirectoryStorage`] maps names onto
//! a base directory on disk; [`MemoryStorage`] keeps everything in a map and is
//! handy for tests.
//!
//! Names must be a single path segment. Anything else is rejected with
//! `ErrorKind::InvalidInput` before touching the backing store.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub trait Storage: Send + Sync + fmt::Debug {
    /// Returns the full contents of `name`.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Creates `name` with `contents`, replacing any existing file.
    fn create(&self, name: &str, contents: &[u8]) -> io::Result<()>;
}

/// Returns true if `name` is a single, non-empty path segment.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

fn check_name(name: &str) -> io::Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid file name {name:?}"),
        ))
    }
}

/// Files stored directly under a base directory.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for DirectoryStorage {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        check_name(name)?;
        fs::read(self.root.join(name))
    }

    fn create(&self, name: &str, contents: &[u8]) -> io::Result<()> {
        check_name(name)?;
        // A root that is missing or is not a directory reads as NotFound.
        if !self.root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ));
        }
        fs::write(self.root.join(name), contents)
    }
}

/// In-memory storage keyed by file name.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut files) = self.files.write() {
            files.insert(name.into(), contents.into());
        }
        self
    }
}

impl Storage for MemoryStorage {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        check_name(name)?;
        let files = self
            .files
            .read()
            .map_err(|_| io::Error::other("storage lock poisoned"))?;
        files
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{name} not found")))
    }

    fn create(&self, name: &str, contents: &[u8]) -> io::Result<()> {
        check_name(name)?;
        let mut files = self
            .files
            .write()
            .map_err(|_| io::Error::other("storage lock poisoned"))?;
        files.insert(name.to_string(), contents.to_vec());
        Ok(())
    }
}
