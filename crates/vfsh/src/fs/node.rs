//! Node and metadata types

use std::collections::BTreeMap;

/// Default permission bits for directories.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Default permission bits for files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Handle to a node in a [`Vfs`](super::Vfs) arena.
///
/// Ids are only meaningful for the tree that issued them. Nodes are never
/// removed, so an id stays valid for the lifetime of its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// File type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
}

impl FileType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Node metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// File type
    pub file_type: FileType,
    /// Content size in bytes (0 for directories)
    pub size: u64,
    /// Permission bits
    pub mode: u32,
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (not full path)
    pub name: String,
    /// Node the entry points at
    pub id: NodeId,
    /// Entry metadata
    pub metadata: Metadata,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Directory { children: BTreeMap<String, NodeId> },
    File { content: Vec<u8> },
}

/// A file or directory in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) mode: u32,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn directory(name: impl Into<String>, parent: Option<NodeId>, mode: u32) -> Self {
        Self {
            name: name.into(),
            parent,
            mode,
            kind: NodeKind::Directory {
                children: BTreeMap::new(),
            },
        }
    }

    pub(crate) fn file(
        name: impl Into<String>,
        parent: NodeId,
        mode: u32,
        content: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            mode,
            kind: NodeKind::File { content },
        }
    }

    /// Segment name; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning directory, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Permission bits.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Directory or regular file.
    pub fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::Directory { .. } => FileType::Directory,
            NodeKind::File { .. } => FileType::File,
        }
    }

    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type().is_dir()
    }

    /// File content, `None` for directories.
    pub fn content(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Snapshot of type, size and mode. Directories report size 0.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            file_type: self.file_type(),
            size: self.content().map_or(0, |c| c.len() as u64),
            mode: self.mode,
        }
    }

    pub(crate) fn child(&self, name: &str) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Directory { children } => children.get(name).copied(),
            NodeKind::File { .. } => None,
        }
    }
}
