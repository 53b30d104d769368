//! Resolution of load-directive paths to absolute paths and their text.
//!
//! A [`SourceResolver`] answers two questions for the load-directive expander:
//! which absolute path a directive refers to (relative to the unit containing
//! it), and what text lives at that path. [`FileSystemResolver`] reads from
//! disk; [`InMemoryResolver`] serves an editor's open buffers or test fixtures.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolves load-directive paths and reads the referenced text.
pub trait SourceResolver: Send + Sync {
    /// Resolves `path` relative to `base` (the path of the referencing unit).
    ///
    /// Returns `None` when no candidate exists.
    fn resolve(&self, path: &str, base: Option<&Path>) -> Option<PathBuf>;

    /// Reads the text at a path previously returned by [`resolve`](Self::resolve).
    fn read_text(&self, resolved: &Path) -> io::Result<String>;
}

/// Normalizes `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Candidate locations for `path`, in lookup order.
///
/// Absolute paths are their own only candidate. Relative paths are tried next
/// to the referencing unit first, then under every search path.
fn candidates(path: &str, base: Option<&Path>, search_paths: &[PathBuf]) -> Vec<PathBuf> {
    let requested = Path::new(path);
    if requested.is_absolute() {
        return vec![normalize_path(requested)];
    }
    let mut out = Vec::with_capacity(search_paths.len() + 1);
    if let Some(dir) = base.and_then(Path::parent) {
        out.push(normalize_path(&dir.join(requested)));
    }
    for root in search_paths {
        out.push(normalize_path(&root.join(requested)));
    }
    out
}

/// Resolves against the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileSystemResolver {
    search_paths: Vec<PathBuf>,
}

impl FileSystemResolver {
    /// Creates a resolver that only looks next to the referencing unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that falls back to the given search paths.
    pub fn with_search_paths(search_paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_paths: search_paths.into_iter().collect(),
        }
    }

    /// The configured search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl SourceResolver for FileSystemResolver {
    fn resolve(&self, path: &str, base: Option<&Path>) -> Option<PathBuf> {
        candidates(path, base, &self.search_paths)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    fn read_text(&self, resolved: &Path) -> io::Result<String> {
        std::fs::read_to_string(resolved)
    }
}

/// Resolves against an in-memory path → text table.
///
/// Entries may be registered as unreadable to exercise read-failure paths: they
/// resolve successfully but reading them fails with the given error kind.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    files: HashMap<PathBuf, Result<String, io::ErrorKind>>,
    search_paths: Vec<PathBuf>,
}

impl InMemoryResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file with the given text.
    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Registers a file that resolves but cannot be read.
    pub fn with_unreadable(mut self, path: impl AsRef<Path>, kind: io::ErrorKind) -> Self {
        self.files
            .insert(normalize_path(path.as_ref()), Err(kind));
        self
    }

    /// Adds a search path used for relative lookups.
    pub fn with_search_path(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_paths.push(root.into());
        self
    }

    /// Registers (or overwrites) a file with the given text.
    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files
            .insert(normalize_path(path.as_ref()), Ok(text.into()));
    }
}

impl SourceResolver for InMemoryResolver {
    fn resolve(&self, path: &str, base: Option<&Path>) -> Option<PathBuf> {
        candidates(path, base, &self.search_paths)
            .into_iter()
            .find(|candidate| self.files.contains_key(candidate))
    }

    fn read_text(&self, resolved: &Path) -> io::Result<String> {
        match self.files.get(resolved) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(kind)) => Err(io::Error::new(
                *kind,
                format!("cannot read '{}'", resolved.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file '{}'", resolved.display()),
            )),
        }
    }
}
