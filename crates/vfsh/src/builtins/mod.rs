//! Built-in shell commands
//!
//! This module provides the [`Builtin`] trait for implementing commands and
//! the [`Context`] struct they run against.
//!
//! # Custom Builtins
//!
//! Implement the [`Builtin`] trait to create custom commands:
//!
//! ```rust
//! use vfsh::{async_trait, Builtin, BuiltinContext, ExecResult};
//!
//! struct Pwd;
//!
//! #[async_trait]
//! impl Builtin for Pwd {
//!     async fn execute(&self, ctx: BuiltinContext<'_>) -> vfsh::Result<ExecResult> {
//!         Ok(ExecResult::ok(format!("{}\n", ctx.fs.path_of(*ctx.cwd))))
//!     }
//!
//!     fn description(&self) -> &'static str {
//!         "Print working directory"
//!     }
//! }
//! ```
//!
//! Register via [`ShellBuilder::builtin`](crate::ShellBuilder::builtin).

mod cal;
mod fileops;
mod flow;
mod help;
mod ls;
mod navigation;

pub use cal::{render_month, Cal};
pub use fileops::{Chmod, Mkdir};
pub use flow::Exit;
pub use help::Help;
pub use ls::{Ls, Tree};
pub use navigation::Cd;

use async_trait::async_trait;

use crate::error::Result;
use crate::fs::{NodeId, Vfs};
use crate::interpreter::ExecResult;

/// Name and one-line description of a registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: &'static str,
}

/// Execution context for builtin commands.
///
/// Carries the arguments plus the session state a command may read or
/// change: the filesystem and the current directory cursor.
pub struct Context<'a> {
    /// Command arguments (not including the command name).
    ///
    /// For `mkdir a b`, this contains `["a", "b"]`.
    pub args: &'a [String],

    /// Virtual filesystem (mutable).
    pub fs: &'a mut Vfs,

    /// Current working directory (mutable).
    ///
    /// Always a directory. Used by `cd` and relative path resolution.
    pub cwd: &'a mut NodeId,

    /// Registered commands, in registration order.
    pub commands: &'a [CommandInfo],

    /// Mode given to directories created by `mkdir`.
    pub dir_mode: u32,
}

/// Trait for implementing builtin commands.
///
/// Every builtin shares the same signature: it receives the session state
/// through [`Context`] and answers with an [`ExecResult`]. Expected failures
/// (missing paths, bad modes) are reported as `ExecResult::err` so the
/// session carries on; an `Err` is reserved for failures that should abort.
#[async_trait]
pub trait Builtin: Send + Sync {
    /// Execute the builtin command.
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult>;

    /// One-line description shown by `help`.
    fn description(&self) -> &'static str {
        ""
    }
}

/// Format permission bits the way `ls` prints them (`0o755`).
pub(crate) fn format_mode(mode: u32) -> String {
    format!("{:#o}", mode)
}
