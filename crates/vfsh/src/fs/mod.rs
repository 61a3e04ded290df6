//! Virtual filesystem for vfsh
//!
//! A single in-memory tree ([`Vfs`]) seeded once from an archive and then
//! mutated only by `mkdir` and `chmod`.

mod node;
mod tree;

pub use node::{
    DirEntry, FileType, Metadata, Node, NodeId, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE,
};
pub use tree::Vfs;
