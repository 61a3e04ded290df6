//! Interpreter for executing command lines against the VFS

mod state;

pub use state::{ControlFlow, ExecResult};

use std::collections::HashMap;

use crate::builtins::{self, Builtin, CommandInfo};
use crate::error::{Error, Result};
use crate::fs::{NodeId, Vfs, DEFAULT_DIR_MODE};
use crate::parser::Parser;

/// Exit code reported for a command name with no registered builtin.
pub const COMMAND_NOT_FOUND_EXIT: i32 = 127;

/// Exit code reported for a line that could not be tokenized.
pub const PARSE_ERROR_EXIT: i32 = 2;

/// Interpreter state.
///
/// Owns the filesystem, the current directory cursor and the command
/// registry. Each call to [`exec`](Interpreter::exec) runs one line to
/// completion.
pub struct Interpreter {
    fs: Vfs,
    cwd: NodeId,
    builtins: HashMap<String, Box<dyn Builtin>>,
    commands: Vec<CommandInfo>,
    dir_mode: u32,
}

impl Interpreter {
    /// Create a new interpreter over the given filesystem with the default
    /// command set registered and the cursor at the root.
    pub fn new(fs: Vfs) -> Self {
        let cwd = fs.root();
        let mut interp = Self {
            fs,
            cwd,
            builtins: HashMap::new(),
            commands: Vec::new(),
            dir_mode: DEFAULT_DIR_MODE,
        };

        interp.register("ls", Box::new(builtins::Ls));
        interp.register("cd", Box::new(builtins::Cd));
        interp.register("tree", Box::new(builtins::Tree));
        interp.register("cal", Box::new(builtins::Cal));
        interp.register("mkdir", Box::new(builtins::Mkdir));
        interp.register("chmod", Box::new(builtins::Chmod));
        interp.register("help", Box::new(builtins::Help));
        interp.register("exit", Box::new(builtins::Exit));

        interp
    }

    /// Register a builtin. An existing command of the same name is replaced
    /// and keeps its place in the `help` listing.
    pub fn register(&mut self, name: impl Into<String>, builtin: Box<dyn Builtin>) {
        let name = name.into();
        let info = CommandInfo {
            name: name.clone(),
            description: builtin.description(),
        };
        match self.commands.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = info,
            None => self.commands.push(info),
        }
        self.builtins.insert(name, builtin);
    }

    /// Set the mode given to directories created by `mkdir`.
    pub fn set_dir_mode(&mut self, mode: u32) {
        self.dir_mode = mode & 0o7777;
    }

    /// The filesystem.
    pub fn fs(&self) -> &Vfs {
        &self.fs
    }

    /// The current directory cursor.
    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    /// Absolute path of the current directory.
    pub fn cwd_path(&self) -> String {
        self.fs.path_of(self.cwd)
    }

    /// Registered commands, in registration order.
    pub fn commands(&self) -> &[CommandInfo] {
        &self.commands
    }

    /// Execute one command line.
    ///
    /// Blank and comment-only lines yield an empty successful result.
    /// Malformed quoting and unknown commands are reported on stderr; an
    /// `Err` only comes from a builtin that hit an unrecoverable failure.
    pub async fn exec(&mut self, line: &str) -> Result<ExecResult> {
        let command = match Parser::new(line).parse() {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(ExecResult::default()),
            Err(Error::Parse(msg)) => {
                tracing::trace!(line, error = %msg, "parse failed");
                return Ok(ExecResult::err(
                    format!("vfsh: {}\n", msg),
                    PARSE_ERROR_EXIT,
                ));
            }
            Err(e) => return Err(e),
        };

        let Some(builtin) = self.builtins.get(command.name.as_str()) else {
            tracing::debug!(name = %command.name, "unknown command");
            return Ok(ExecResult::err(
                format!("{}: unknown command\n", command.name),
                COMMAND_NOT_FOUND_EXIT,
            ));
        };

        tracing::debug!(name = %command.name, args = ?command.args, "dispatch");
        let ctx = builtins::Context {
            args: &command.args,
            fs: &mut self.fs,
            cwd: &mut self.cwd,
            commands: &self.commands,
            dir_mode: self.dir_mode,
        };
        let result = builtin.execute(ctx).await?;

        if !result.is_success() {
            tracing::trace!(
                name = %command.name,
                exit_code = result.exit_code,
                "command failed"
            );
        }
        Ok(result)
    }
}
