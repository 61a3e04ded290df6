//! Arena-backed directory tree

use super::node::{
    DirEntry, Metadata, Node, NodeId, NodeKind, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE,
};
use crate::archive::ArchiveEntry;
use crate::error::{Error, Result};

const ROOT: NodeId = NodeId(0);

/// In-memory virtual filesystem.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Ownership
/// runs root to children through the `children` maps; the `parent` id is a
/// plain back-reference used for `..` and path reconstruction. Nothing is
/// ever removed, so ids never dangle.
#[derive(Debug, Clone)]
pub struct Vfs {
    nodes: Vec<Node>,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs {
    /// Create an empty filesystem holding only the root directory.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::directory("", None, DEFAULT_DIR_MODE)],
        }
    }

    /// Create a filesystem seeded from archive entries.
    pub fn from_entries(entries: impl IntoIterator<Item = ArchiveEntry>) -> Result<Self> {
        let mut vfs = Self::new();
        vfs.build(entries)?;
        Ok(vfs)
    }

    /// Insert archive entries in order.
    ///
    /// Missing ancestors are created as directories. Re-inserting a directory
    /// only refreshes its recorded mode; re-inserting a file replaces its
    /// content (last write wins). A file over a directory, or anything below
    /// a file, is an [`Error::Archive`].
    pub fn build(&mut self, entries: impl IntoIterator<Item = ArchiveEntry>) -> Result<()> {
        let mut files = 0usize;
        let mut dirs = 0usize;

        for entry in entries {
            let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
            let Some((last, ancestors)) = segments.split_last() else {
                continue;
            };

            let mut current = ROOT;
            for name in ancestors {
                current = self.ensure_dir(current, name, DEFAULT_DIR_MODE).ok_or_else(|| {
                    Error::archive(format!("{}: Not a directory", entry.path))
                })?;
            }

            if entry.is_dir {
                let mode = entry.mode.unwrap_or(DEFAULT_DIR_MODE);
                let id = self.ensure_dir(current, last, mode).ok_or_else(|| {
                    Error::archive(format!("{}: File exists", entry.path))
                })?;
                if let Some(mode) = entry.mode {
                    self.nodes[id.0].mode = mode;
                }
                dirs += 1;
                continue;
            }

            let mode = entry.mode.unwrap_or(DEFAULT_FILE_MODE);
            match self.node(current).child(last) {
                Some(id) if self.node(id).is_dir() => {
                    return Err(Error::archive(format!("{}: Is a directory", entry.path)));
                }
                Some(id) => {
                    let node = &mut self.nodes[id.0];
                    node.kind = NodeKind::File {
                        content: entry.data,
                    };
                    node.mode = mode;
                }
                None => {
                    self.add_child(current, Node::file(*last, current, mode, entry.data));
                }
            }
            files += 1;
        }

        tracing::info!(files, dirs, nodes = self.nodes.len(), "built vfs");
        Ok(())
    }

    /// The root directory.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Metadata for a node.
    pub fn stat(&self, id: NodeId) -> Metadata {
        self.node(id).metadata()
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Resolve `path` starting at `from` (or at the root for absolute paths).
    ///
    /// `.` is skipped and `..` climbs to the parent, stopping at the root.
    /// Every other segment must name an existing child, so a missing segment
    /// anywhere in the path fails the whole lookup. An empty path yields
    /// `from`.
    pub fn resolve(&self, from: NodeId, path: &str) -> Result<NodeId> {
        let mut current = if path.starts_with('/') { ROOT } else { from };

        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }
            if !self.node(current).is_dir() {
                return Err(Error::NotADirectory(path.to_string()));
            }
            match segment {
                "." => {}
                ".." => current = self.node(current).parent.unwrap_or(current),
                name => {
                    current = self
                        .node(current)
                        .child(name)
                        .ok_or_else(|| Error::NotFound(path.to_string()))?;
                }
            }
        }

        Ok(current)
    }

    /// Create a directory and any missing parents, like `mkdir -p`.
    ///
    /// Existing directories along the way (including the final one) are
    /// reused. Fails with [`Error::AlreadyExists`] when the final segment is
    /// a file and [`Error::NotADirectory`] when an intermediate one is.
    pub fn mkdir(&mut self, from: NodeId, path: &str, mode: u32) -> Result<NodeId> {
        let mut current = if path.starts_with('/') { ROOT } else { from };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let last = segments.len().saturating_sub(1);

        for (i, segment) in segments.iter().enumerate() {
            match *segment {
                "." => {}
                ".." => current = self.node(current).parent.unwrap_or(current),
                name => {
                    current = match self.node(current).child(name) {
                        Some(id) if self.node(id).is_dir() => id,
                        Some(_) if i == last => {
                            return Err(Error::AlreadyExists(path.to_string()));
                        }
                        Some(_) => return Err(Error::NotADirectory(path.to_string())),
                        None => self.add_child(current, Node::directory(name, Some(current), mode)),
                    };
                }
            }
        }

        Ok(current)
    }

    /// Set permission bits on a node.
    pub fn chmod(&mut self, id: NodeId, mode: u32) {
        self.nodes[id.0].mode = mode;
    }

    /// List a directory's children sorted by name.
    pub fn list(&self, dir: NodeId) -> Result<Vec<DirEntry>> {
        match &self.node(dir).kind {
            NodeKind::Directory { children } => Ok(children
                .iter()
                .map(|(name, &id)| DirEntry {
                    name: name.clone(),
                    id,
                    metadata: self.stat(id),
                })
                .collect()),
            NodeKind::File { .. } => Err(Error::NotADirectory(self.path_of(dir))),
        }
    }

    /// Read a file's content.
    pub fn read_file(&self, id: NodeId) -> Option<&[u8]> {
        self.node(id).content()
    }

    /// Absolute path of a node, reconstructed from parent links.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            names.push(self.node(current).name.as_str());
            current = parent;
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Return the child directory `name` of `parent`, creating it if absent.
    /// `None` when a file already holds the name.
    fn ensure_dir(&mut self, parent: NodeId, name: &str, mode: u32) -> Option<NodeId> {
        match self.node(parent).child(name) {
            Some(id) if self.node(id).is_dir() => Some(id),
            Some(_) => None,
            None => Some(self.add_child(parent, Node::directory(name, Some(parent), mode))),
        }
    }

    fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let name = node.name.clone();
        self.nodes.push(node);
        if let NodeKind::Directory { children } = &mut self.nodes[parent.0].kind {
            children.insert(name, id);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileType;

    fn sample() -> Vfs {
        Vfs::from_entries(vec![
            ArchiveEntry::file("README.txt", b"This is a sample VFS.\n".to_vec()),
            ArchiveEntry::file("bin/run.sh", b"#!/bin/sh\necho hello".to_vec()).with_mode(0o755),
            ArchiveEntry::file("dir1/file1.txt", b"Content of file1".to_vec()),
            ArchiveEntry::file("dir1/dir2/file2.txt", b"Content of file2".to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_synthesizes_ancestors() {
        let vfs = sample();
        let dir2 = vfs.resolve(vfs.root(), "dir1/dir2").unwrap();
        assert!(vfs.node(dir2).is_dir());
        assert_eq!(vfs.node(dir2).mode(), DEFAULT_DIR_MODE);
        let file2 = vfs.resolve(dir2, "file2.txt").unwrap();
        assert_eq!(vfs.read_file(file2), Some(&b"Content of file2"[..]));
        assert_eq!(vfs.node(file2).mode(), DEFAULT_FILE_MODE);
    }

    #[test]
    fn test_build_keeps_recorded_mode() {
        let vfs = sample();
        let run = vfs.resolve(vfs.root(), "/bin/run.sh").unwrap();
        assert_eq!(vfs.node(run).mode(), 0o755);
    }

    #[test]
    fn test_build_directory_reinsert_is_noop() {
        let mut vfs = sample();
        let before = vfs.len();
        vfs.build(vec![ArchiveEntry::dir("dir1"), ArchiveEntry::dir("dir1/dir2")])
            .unwrap();
        assert_eq!(vfs.len(), before);
    }

    #[test]
    fn test_build_file_last_write_wins() {
        let vfs = Vfs::from_entries(vec![
            ArchiveEntry::file("a.txt", b"first".to_vec()),
            ArchiveEntry::file("a.txt", b"second".to_vec()),
        ])
        .unwrap();
        let id = vfs.resolve(vfs.root(), "a.txt").unwrap();
        assert_eq!(vfs.read_file(id), Some(&b"second"[..]));
        assert_eq!(vfs.list(vfs.root()).unwrap().len(), 1);
    }

    #[test]
    fn test_build_rejects_file_over_directory() {
        let err = Vfs::from_entries(vec![
            ArchiveEntry::dir("x"),
            ArchiveEntry::file("x", b"oops".to_vec()),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Archive(_)));

        let err = Vfs::from_entries(vec![
            ArchiveEntry::file("x", b"file".to_vec()),
            ArchiveEntry::file("x/y", b"below".to_vec()),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_resolve_absolute_relative_and_dots() {
        let vfs = sample();
        let dir1 = vfs.resolve(vfs.root(), "dir1").unwrap();
        let dir2 = vfs.resolve(dir1, "dir2").unwrap();
        assert_eq!(vfs.resolve(dir2, "..").unwrap(), dir1);
        assert_eq!(vfs.resolve(dir2, "../..").unwrap(), vfs.root());
        assert_eq!(vfs.resolve(dir2, "/dir1").unwrap(), dir1);
        assert_eq!(vfs.resolve(dir2, "./.././dir2/.").unwrap(), dir2);
        assert_eq!(vfs.resolve(dir2, "").unwrap(), dir2);
    }

    #[test]
    fn test_resolve_dotdot_at_root_stays() {
        let vfs = sample();
        assert_eq!(vfs.resolve(vfs.root(), "..").unwrap(), vfs.root());
        assert_eq!(vfs.resolve(vfs.root(), "../../..").unwrap(), vfs.root());
        let dir1 = vfs.resolve(vfs.root(), "../dir1").unwrap();
        assert_eq!(vfs.path_of(dir1), "/dir1");
    }

    #[test]
    fn test_resolve_missing_segment_fails_mid_path() {
        let vfs = sample();
        assert!(matches!(
            vfs.resolve(vfs.root(), "nonexistent/child"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            vfs.resolve(vfs.root(), "nonexistent/.."),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_through_file_is_not_a_directory() {
        let vfs = sample();
        assert!(matches!(
            vfs.resolve(vfs.root(), "README.txt/x"),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_mkdir_recursive_and_idempotent() {
        let mut vfs = Vfs::new();
        let c = vfs.mkdir(vfs.root(), "a/b/c", 0o755).unwrap();
        assert_eq!(vfs.path_of(c), "/a/b/c");
        for path in ["a", "a/b", "a/b/c"] {
            let id = vfs.resolve(vfs.root(), path).unwrap();
            assert_eq!(vfs.stat(id).file_type, FileType::Directory);
        }
        let len = vfs.len();
        assert_eq!(vfs.mkdir(vfs.root(), "a/b/c", 0o755).unwrap(), c);
        assert_eq!(vfs.len(), len);
    }

    #[test]
    fn test_mkdir_blocked_by_file() {
        let mut vfs = sample();
        let root = vfs.root();
        assert!(matches!(
            vfs.mkdir(root, "README.txt", 0o755),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(
            vfs.mkdir(root, "README.txt/sub", 0o755),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_mkdir_relative_with_dotdot() {
        let mut vfs = sample();
        let dir2 = vfs.resolve(vfs.root(), "dir1/dir2").unwrap();
        let id = vfs.mkdir(dir2, "../sibling", 0o700).unwrap();
        assert_eq!(vfs.path_of(id), "/dir1/sibling");
        assert_eq!(vfs.node(id).mode(), 0o700);
    }

    #[test]
    fn test_chmod_and_list_sorted() {
        let mut vfs = sample();
        let dir1 = vfs.resolve(vfs.root(), "dir1").unwrap();
        vfs.chmod(dir1, 0o700);
        let names: Vec<_> = vfs
            .list(vfs.root())
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.metadata.mode))
            .collect();
        assert_eq!(
            names,
            vec![
                ("README.txt".to_string(), 0o644),
                ("bin".to_string(), 0o755),
                ("dir1".to_string(), 0o700),
            ]
        );
    }

    #[test]
    fn test_list_empty_directory() {
        let mut vfs = Vfs::new();
        let empty = vfs.mkdir(vfs.root(), "empty", 0o755).unwrap();
        assert!(vfs.list(empty).unwrap().is_empty());
    }

    #[test]
    fn test_path_of_root() {
        let vfs = Vfs::new();
        assert_eq!(vfs.path_of(vfs.root()), "/");
        assert!(vfs.is_empty());
    }
}
