//! Virtual file system for termfolio.
//!
//! Filesystem commands never touch the host. They go through the [`Vfs`]
//! trait, which [`MemoryVfs`] implements with an in-memory tree that can be
//! reset to a fixed seed.

mod memory;
mod seed;

pub use memory::MemoryVfs;
pub use seed::seed_tree;

use termfolio_types::error::Result;

/// Kind of a VFS node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

/// Node metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsMetadata {
    pub kind: EntryKind,
    pub size: u64,
}

/// File system operations used by filesystem commands.
///
/// Paths are absolute. Callers resolve user input with [`resolve_path`]
/// first.
pub trait Vfs {
    /// List the direct children of a directory, sorted by name.
    fn readdir(&self, path: &str) -> Result<Vec<VfsEntry>>;

    /// Read a file's contents.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Create or overwrite a file. The parent directory must exist.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<()>;

    fn stat(&self, path: &str) -> Result<VfsMetadata>;

    /// Create a directory and any missing parents.
    fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Remove a file or an empty directory.
    fn remove(&mut self, path: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;

    /// Remove a file, or a directory together with everything beneath it.
    fn remove_all(&mut self, path: &str) -> Result<()> {
        if self.stat(path)?.kind == EntryKind::Directory {
            for entry in self.readdir(path)? {
                let child = join(path, &entry.name);
                self.remove_all(&child)?;
            }
        }
        self.remove(path)
    }

    /// Whether `path` exists and is a directory.
    fn is_dir(&self, path: &str) -> bool {
        self.stat(path)
            .is_ok_and(|m| m.kind == EntryKind::Directory)
    }
}

/// Join a child name onto an absolute directory path.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Resolve user input against the working directory.
///
/// Handles absolute paths, relative paths, `.`, `..`, and a leading `~`
/// (which expands to `home`). The result is always absolute and normalized.
/// `..` at the root stays at the root.
pub fn resolve_path(cwd: &str, input: &str, home: &str) -> String {
    let raw = if input == "~" {
        home.to_string()
    } else if let Some(rest) = input.strip_prefix("~/") {
        join(home, rest)
    } else if input.starts_with('/') {
        input.to_string()
    } else {
        join(cwd, input)
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Display form of an absolute path, with the home prefix shown as `~`.
pub fn display_path(path: &str, home: &str) -> String {
    if path == home {
        "~".to_string()
    } else if let Some(rest) = path.strip_prefix(home)
        && rest.starts_with('/')
    {
        format!("~{rest}")
    } else {
        path.to_string()
    }
}
