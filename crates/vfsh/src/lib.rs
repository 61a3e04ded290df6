//! vfsh - an in-memory filesystem shell seeded from an archive
//!
//! A ZIP or TAR archive is decoded once into a tree of directories and
//! files. Commands (`ls`, `cd`, `tree`, `cal`, `mkdir`, `chmod`, `help`,
//! `exit`) then query and mutate that tree while a current-directory cursor
//! moves through it. Nothing is ever written back to the archive.
//!
//! # Example
//!
//! ```rust
//! use vfsh::{ArchiveEntry, Shell};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> vfsh::Result<()> {
//!     let mut shell = Shell::builder()
//!         .entries(vec![ArchiveEntry::file("dir1/file1.txt", b"hello".to_vec())])
//!         .build()?;
//!
//!     shell.exec("cd dir1").await?;
//!     let result = shell.exec("ls").await?;
//!     assert_eq!(result.stdout, "0o644 file1.txt\n");
//!     assert_eq!(shell.cwd_path(), "/dir1");
//!     Ok(())
//! }
//! ```
//!
//! Archives are loaded from bytes; reading them from disk is up to the
//! caller:
//!
//! ```rust,no_run
//! # async fn run() -> vfsh::Result<()> {
//! let bytes = std::fs::read("vfs.zip")?;
//! let mut shell = vfsh::Shell::builder().archive(bytes).build()?;
//! shell.exec("tree").await?;
//! # Ok(())
//! # }
//! ```

mod archive;
mod builtins;
mod error;
mod fs;
mod interpreter;
mod parser;
mod session;

pub use archive::{detect_format, load as load_archive, ArchiveEntry, ArchiveFormat};
pub use async_trait::async_trait;
pub use builtins::{render_month, Builtin, CommandInfo, Context as BuiltinContext};
pub use error::{Error, Result};
pub use fs::{
    DirEntry, FileType, Metadata, Node, NodeId, Vfs, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE,
};
pub use interpreter::{ControlFlow, ExecResult, COMMAND_NOT_FOUND_EXIT, PARSE_ERROR_EXIT};
pub use parser::{Lexer, Parser, SimpleCommand};
pub use session::{
    BufReadLines, LineReader, PromptConfig, ReadOutcome, RootStyle, Session, ARCHIVE_ERROR_EXIT,
    DEFAULT_PROMPT, IO_ERROR_EXIT,
};

use std::io::Write;

use interpreter::Interpreter;

/// Main entry point for vfsh.
///
/// Owns the filesystem, the cursor, the command registry and the prompt
/// settings of one session.
pub struct Shell {
    interpreter: Interpreter,
    prompt: PromptConfig,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    /// Create a shell over an empty filesystem with default settings.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(Vfs::new()),
            prompt: PromptConfig::default(),
        }
    }

    /// Create a new ShellBuilder for customized configuration.
    pub fn builder() -> ShellBuilder {
        ShellBuilder::default()
    }

    /// Execute one command line and return its result.
    ///
    /// Command failures come back as a non-zero `exit_code` with a message
    /// on stderr. `Err` is reserved for failures that should end the session.
    pub async fn exec(&mut self, line: &str) -> Result<ExecResult> {
        self.interpreter.exec(line).await
    }

    /// The prompt for the current cursor position.
    pub fn prompt(&self) -> String {
        self.prompt.render(&self.interpreter.cwd_path())
    }

    /// Prompt settings.
    pub fn prompt_config(&self) -> &PromptConfig {
        &self.prompt
    }

    /// The filesystem.
    pub fn fs(&self) -> &Vfs {
        self.interpreter.fs()
    }

    /// Node of the current directory, for resolving relative paths against
    /// [`Shell::fs`].
    pub fn cwd(&self) -> NodeId {
        self.interpreter.cwd()
    }

    /// Absolute path of the current directory.
    pub fn cwd_path(&self) -> String {
        self.interpreter.cwd_path()
    }

    /// Registered commands, in registration order.
    pub fn commands(&self) -> &[CommandInfo] {
        self.interpreter.commands()
    }

    /// Start a session writing command output to `out` and diagnostics to
    /// `err`.
    pub fn session<O: Write, E: Write>(&mut self, out: O, err: E) -> Session<'_, O, E> {
        Session::new(self, out, err)
    }
}

/// Builder for customized Shell configuration.
#[derive(Default)]
pub struct ShellBuilder {
    archive: Option<Vec<u8>>,
    entries: Vec<ArchiveEntry>,
    prompt: PromptConfig,
    dir_mode: Option<u32>,
    builtins: Vec<(String, Box<dyn Builtin>)>,
}

impl ShellBuilder {
    /// Seed the filesystem from archive bytes (ZIP, TAR or gzipped TAR).
    pub fn archive(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.archive = Some(bytes.into());
        self
    }

    /// Seed the filesystem from already-decoded entries.
    ///
    /// Applied after the archive, so an entry here overrides a file of the
    /// same path from the archive.
    pub fn entries(mut self, entries: impl IntoIterator<Item = ArchiveEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Set the prompt template (`{user}`, `{host}`, `{cwd}` placeholders).
    pub fn prompt(mut self, template: impl Into<String>) -> Self {
        self.prompt.template = template.into();
        self
    }

    /// Set the user shown in the prompt.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.prompt.user = user.into();
        self
    }

    /// Set the host shown in the prompt.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.prompt.host = host.into();
        self
    }

    /// Set how the root directory is shown in the prompt.
    pub fn root_style(mut self, style: RootStyle) -> Self {
        self.prompt.root_style = style;
        self
    }

    /// Set the mode given to directories created by `mkdir`.
    pub fn dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = Some(mode);
        self
    }

    /// Register a custom builtin, or replace a default one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vfsh::{async_trait, Builtin, BuiltinContext, ExecResult, Shell};
    ///
    /// struct Hello;
    ///
    /// #[async_trait]
    /// impl Builtin for Hello {
    ///     async fn execute(&self, ctx: BuiltinContext<'_>) -> vfsh::Result<ExecResult> {
    ///         let name = ctx.args.first().map(|s| s.as_str()).unwrap_or("world");
    ///         Ok(ExecResult::ok(format!("hello {}\n", name)))
    ///     }
    /// }
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> vfsh::Result<()> {
    /// let mut shell = Shell::builder().builtin("hello", Box::new(Hello)).build()?;
    /// assert_eq!(shell.exec("hello vfs").await?.stdout, "hello vfs\n");
    /// # Ok(())
    /// # }
    /// ```
    pub fn builtin(mut self, name: impl Into<String>, builtin: Box<dyn Builtin>) -> Self {
        self.builtins.push((name.into(), builtin));
        self
    }

    /// Build the Shell instance.
    ///
    /// Fails with [`Error::Archive`] when the archive cannot be decoded or
    /// its entries do not form a tree.
    pub fn build(self) -> Result<Shell> {
        let mut entries = match &self.archive {
            Some(bytes) => archive::load(bytes)?,
            None => Vec::new(),
        };
        entries.extend(self.entries);

        let fs = Vfs::from_entries(entries)?;
        let mut interpreter = Interpreter::new(fs);
        if let Some(mode) = self.dir_mode {
            interpreter.set_dir_mode(mode);
        }
        for (name, builtin) in self.builtins {
            interpreter.register(name, builtin);
        }

        Ok(Shell {
            interpreter,
            prompt: self.prompt,
        })
    }
}
