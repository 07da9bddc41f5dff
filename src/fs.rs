//! Filesystem abstraction used by migrations
//!
//! Migrations only ever need three operations: check that a file exists,
//! read it, and replace its content. Replacing is atomic in both
//! implementations: the new content is staged first and only swapped in once
//! it is complete, so a failed rewrite never leaves a truncated file behind.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;

/// Operations the migration engine needs from a filesystem
pub trait FileSystem {
    /// Returns true if `path` exists and is a regular file
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read the full content of `path`
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Atomically replace the content of an existing file, keeping its permissions
    fn replace(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn replace(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        // Rewrite the file a symlink points to, not the link itself
        let path = fs::canonicalize(path)?;
        let permissions = fs::metadata(&path)?.permissions();

        // The staging file must live on the same filesystem for the rename to be atomic
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(contents)?;
        staged.as_file().sync_all()?;
        staged.as_file().set_permissions(permissions)?;
        staged.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    contents: Vec<u8>,
    mode: u32,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, MemoryFile>,
    failing_writes: BTreeSet<PathBuf>,
    failing_checks: BTreeSet<PathBuf>,
    writes: usize,
}

/// In-memory filesystem
///
/// Used to run the engine without touching disk. Failures can be injected per
/// path, and successful replacements are counted.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<MemoryState>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or overwrite a file with mode `0o644`
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.insert_with_mode(path, contents, 0o644);
    }

    /// Add or overwrite a file with explicit permission bits
    pub fn insert_with_mode(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>, mode: u32) {
        self.state().files.insert(
            path.into(),
            MemoryFile {
                contents: contents.into(),
                mode,
            },
        );
    }

    /// Current content of a file, if present
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state()
            .files
            .get(path.as_ref())
            .map(|f| f.contents.clone())
    }

    /// Current content of a file as a string, if present and valid UTF-8
    pub fn contents_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.contents(path).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// Permission bits of a file, if present
    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.state().files.get(path.as_ref()).map(|f| f.mode)
    }

    /// Make every later `replace` of `path` fail before the swap
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.state().failing_writes.insert(path.into());
    }

    /// Make every later `exists` check of `path` fail
    pub fn fail_checks_on(&self, path: impl Into<PathBuf>) {
        self.state().failing_checks.insert(path.into());
    }

    /// Number of successful replacements so far
    pub fn write_count(&self) -> usize {
        self.state().writes
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        let state = self.state();
        if state.failing_checks.contains(path) {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(state.files.contains_key(path))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.state()
            .files
            .get(path)
            .map(|f| f.contents.clone())
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "file not found"))
    }

    fn replace(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.state();
        let mode = state
            .files
            .get(path)
            .map(|f| f.mode)
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "file not found"))?;

        let staged = MemoryFile {
            contents: contents.to_vec(),
            mode,
        };
        if state.failing_writes.contains(path) {
            return Err(io::Error::other("no space left on device"));
        }

        state.files.insert(path.to_path_buf(), staged);
        state.writes += 1;
        Ok(())
    }
}
