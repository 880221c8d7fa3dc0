//! In-memory VFS.
//!
//! The tree is a flat `BTreeMap` keyed by normalized absolute path, so a
//! directory's children are a contiguous key range and listings come out
//! sorted for free.

use std::borrow::Cow;
use std::collections::BTreeMap;

use termfolio_types::error::{Result, TermError};

use crate::{EntryKind, Vfs, VfsEntry, VfsMetadata, seed};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// A fully in-memory virtual file system.
#[derive(Debug, Clone)]
pub struct MemoryVfs {
    nodes: BTreeMap<String, Node>,
    /// Home directory the seed tree was built for, if any.
    seed_home: Option<String>,
}

impl MemoryVfs {
    /// Create an empty VFS holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self {
            nodes,
            seed_home: None,
        }
    }

    /// Create a VFS populated with the portfolio seed tree.
    pub fn seeded(home: &str) -> Self {
        let mut vfs = Self::new();
        vfs.seed_home = Some(home.to_string());
        vfs.populate_seed();
        vfs
    }

    /// Discard all changes and rebuild the seed tree.
    ///
    /// A VFS created with [`MemoryVfs::new`] resets to an empty root.
    pub fn reset_to_seed(&mut self) {
        self.nodes.clear();
        self.nodes.insert("/".to_string(), Node::Dir);
        self.populate_seed();
        log::info!("vfs reset ({} nodes)", self.nodes.len());
    }

    fn populate_seed(&mut self) {
        let Some(home) = self.seed_home.clone() else {
            return;
        };
        for (path, content) in seed::seed_tree(&home) {
            match content {
                None => {
                    self.nodes.insert(path, Node::Dir);
                },
                Some(text) => {
                    self.nodes.insert(path, Node::File(text.into_bytes()));
                },
            }
        }
    }
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a path is already in normal form: leading `/`, no `//`, and no
/// trailing `/` unless it is the root.
fn is_normalized(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    if path.len() > 1 && path.ends_with('/') {
        return false;
    }
    !path.contains("//")
}

/// Normalize slashes without resolving `.` or `..`. Borrows when the input
/// is already normalized.
fn normalize(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }
    let mut result = String::with_capacity(path.len() + 1);
    result.push('/');
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if result.len() > 1 {
            result.push('/');
        }
        result.push_str(segment);
    }
    Cow::Owned(result)
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

impl Vfs for MemoryVfs {
    fn readdir(&self, path: &str) -> Result<Vec<VfsEntry>> {
        let path = normalize(path);
        match self.nodes.get(path.as_ref()) {
            Some(Node::Dir) => {},
            Some(Node::File(_)) => {
                return Err(TermError::Vfs(format!("not a directory: {path}")));
            },
            None => {
                return Err(TermError::Vfs(format!("no such directory: {path}")));
            },
        }

        let prefix = if path.as_ref() == "/" {
            "/".to_string()
        } else {
            format!("{path}/")
        };

        let mut entries = Vec::new();
        for (key, node) in self.nodes.range(prefix.clone()..) {
            if !key.starts_with(&prefix) {
                break;
            }
            let rest = &key[prefix.len()..];
            if rest.is_empty() || rest.contains('/') {
                continue;
            }
            let (kind, size) = match node {
                Node::Dir => (EntryKind::Directory, 0),
                Node::File(data) => (EntryKind::File, data.len() as u64),
            };
            entries.push(VfsEntry {
                name: rest.to_string(),
                kind,
                size,
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = normalize(path);
        match self.nodes.get(path.as_ref()) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(TermError::Vfs(format!("is a directory: {path}"))),
            None => Err(TermError::Vfs(format!("no such file: {path}"))),
        }
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let path = normalize(path);
        if matches!(self.nodes.get(path.as_ref()), Some(Node::Dir)) {
            return Err(TermError::Vfs(format!("is a directory: {path}")));
        }
        let par = parent(&path);
        match self.nodes.get(par) {
            Some(Node::Dir) => {},
            Some(Node::File(_)) => {
                return Err(TermError::Vfs(format!("not a directory: {par}")));
            },
            None => {
                return Err(TermError::Vfs(format!(
                    "parent directory does not exist: {par}"
                )));
            },
        }
        self.nodes
            .insert(path.into_owned(), Node::File(data.to_vec()));
        Ok(())
    }

    fn stat(&self, path: &str) -> Result<VfsMetadata> {
        let path = normalize(path);
        match self.nodes.get(path.as_ref()) {
            Some(Node::File(data)) => Ok(VfsMetadata {
                kind: EntryKind::File,
                size: data.len() as u64,
            }),
            Some(Node::Dir) => Ok(VfsMetadata {
                kind: EntryKind::Directory,
                size: 0,
            }),
            None => Err(TermError::Vfs(format!("no such path: {path}"))),
        }
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        let path = normalize(path);
        match self.nodes.get(path.as_ref()) {
            Some(Node::Dir) => return Ok(()),
            Some(Node::File(_)) => {
                return Err(TermError::Vfs(format!("file exists: {path}")));
            },
            None => {},
        }
        let par = parent(&path).to_string();
        if par != path.as_ref() {
            self.mkdir(&par)?;
        }
        self.nodes.insert(path.into_owned(), Node::Dir);
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<()> {
        let path = normalize(path);
        if path.as_ref() == "/" {
            return Err(TermError::Vfs("cannot remove root".to_string()));
        }
        match self.nodes.get(path.as_ref()) {
            Some(Node::Dir) => {
                let prefix = format!("{path}/");
                let has_children = self
                    .nodes
                    .range(prefix.clone()..)
                    .next()
                    .is_some_and(|(k, _)| k.starts_with(&prefix));
                if has_children {
                    return Err(TermError::Vfs(format!("directory not empty: {path}")));
                }
            },
            Some(Node::File(_)) => {},
            None => {
                return Err(TermError::Vfs(format!("no such path: {path}")));
            },
        }
        self.nodes.remove(path.as_ref());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(normalize(path).as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "/home/guest";

    #[test]
    fn new_has_only_root() {
        let vfs = MemoryVfs::new();
        assert!(vfs.exists("/"));
        assert!(vfs.readdir("/").unwrap().is_empty());
    }

    #[test]
    fn seeded_has_home_and_readme() {
        let vfs = MemoryVfs::seeded(HOME);
        assert!(vfs.is_dir(HOME));
        assert!(vfs.exists("/home/guest/README.md"));
        assert!(vfs.is_dir("/home/guest/projects"));
    }

    #[test]
    fn reset_discards_changes() {
        let mut vfs = MemoryVfs::seeded(HOME);
        vfs.write("/home/guest/scratch.txt", b"tmp").unwrap();
        vfs.remove("/home/guest/README.md").unwrap();
        vfs.reset_to_seed();
        assert!(!vfs.exists("/home/guest/scratch.txt"));
        assert!(vfs.exists("/home/guest/README.md"));
    }

    #[test]
    fn reset_of_unseeded_is_empty_root() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/tmp").unwrap();
        vfs.reset_to_seed();
        assert!(!vfs.exists("/tmp"));
        assert!(vfs.exists("/"));
    }

    #[test]
    fn readdir_lists_direct_children_sorted() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/a/b/c").unwrap();
        vfs.write("/a/zeta.txt", b"z").unwrap();
        vfs.write("/a/alpha.txt", b"al").unwrap();
        let names: Vec<String> = vfs
            .readdir("/a")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["alpha.txt", "b", "zeta.txt"]);
    }

    #[test]
    fn readdir_reports_sizes() {
        let mut vfs = MemoryVfs::new();
        vfs.write("/f", b"four").unwrap();
        let entries = vfs.readdir("/").unwrap();
        assert_eq!(entries[0].size, 4);
        assert_eq!(entries[0].kind, EntryKind::File);
    }

    #[test]
    fn readdir_on_file_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.write("/file", b"data").unwrap();
        assert!(vfs.readdir("/file").is_err());
    }

    #[test]
    fn write_without_parent_fails() {
        let mut vfs = MemoryVfs::new();
        assert!(vfs.write("/no/such/dir/file", b"x").is_err());
    }

    #[test]
    fn write_over_directory_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/dir").unwrap();
        assert!(vfs.write("/dir", b"data").is_err());
        assert!(vfs.is_dir("/dir"));
    }

    #[test]
    fn write_under_file_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.write("/file", b"data").unwrap();
        assert!(vfs.write("/file/child", b"x").is_err());
    }

    #[test]
    fn mkdir_creates_parents_and_is_idempotent() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/a/b/c").unwrap();
        vfs.mkdir("/a/b/c").unwrap();
        assert!(vfs.is_dir("/a"));
        assert!(vfs.is_dir("/a/b"));
    }

    #[test]
    fn mkdir_over_file_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.write("/x", b"").unwrap();
        assert!(vfs.mkdir("/x").is_err());
    }

    #[test]
    fn remove_nonempty_dir_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/dir").unwrap();
        vfs.write("/dir/file", b"x").unwrap();
        assert!(vfs.remove("/dir").is_err());
    }

    #[test]
    fn remove_root_and_missing_fail() {
        let mut vfs = MemoryVfs::new();
        assert!(vfs.remove("/").is_err());
        assert!(vfs.remove("/ghost").is_err());
    }

    #[test]
    fn sibling_prefix_is_not_a_child() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/dir").unwrap();
        vfs.mkdir("/dir2").unwrap();
        vfs.remove("/dir").unwrap();
        assert!(vfs.exists("/dir2"));
    }

    #[test]
    fn normalize_collapses_slashes() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/dir/").unwrap();
        vfs.write("//dir//file", b"ok").unwrap();
        assert_eq!(vfs.read("/dir/file").unwrap(), b"ok");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_is_idempotent(path in "[/a-z0-9_.]{1,50}") {
                let once = normalize(&path).into_owned();
                let twice = normalize(&once).into_owned();
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn normalize_is_well_formed(path in "[a-z0-9_./]{0,50}") {
                let normed = normalize(&path);
                prop_assert!(normed.starts_with('/'));
                prop_assert!(!normed.contains("//"));
                if normed != "/" {
                    prop_assert!(!normed.ends_with('/'));
                }
            }

            #[test]
            fn mkdir_creates_every_ancestor(segments in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
                let mut vfs = MemoryVfs::new();
                let path = format!("/{}", segments.join("/"));
                vfs.mkdir(&path).unwrap();
                let mut partial = String::new();
                for seg in &segments {
                    partial.push('/');
                    partial.push_str(seg);
                    prop_assert!(vfs.is_dir(&partial), "missing ancestor: {partial}");
                }
            }
        }
    }
}
