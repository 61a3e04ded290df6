//! File operation builtins - mkdir, chmod

use async_trait::async_trait;

use super::{format_mode, Builtin, Context};
use crate::error::{Error, Result};
use crate::interpreter::ExecResult;

/// The mkdir builtin - create directories.
///
/// Usage: mkdir [-p] DIRECTORY...
///
/// Missing parents are always created, so `-p` is accepted and ignored.
/// An existing directory is not an error.
pub struct Mkdir;

#[async_trait]
impl Builtin for Mkdir {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let dirs: Vec<_> = ctx.args.iter().filter(|a| a.as_str() != "-p").collect();

        if dirs.is_empty() {
            return Ok(ExecResult::err("mkdir: missing operand\n".to_string(), 1));
        }

        let mut stderr = String::new();
        for dir in dirs {
            match ctx.fs.mkdir(*ctx.cwd, dir, ctx.dir_mode) {
                Ok(_) => {}
                Err(Error::AlreadyExists(_)) => {
                    stderr.push_str(&format!("mkdir: {}: File exists\n", dir));
                }
                Err(Error::NotADirectory(_)) => {
                    stderr.push_str(&format!("mkdir: {}: Not a directory\n", dir));
                }
                Err(e) => return Err(e),
            }
        }

        if stderr.is_empty() {
            Ok(ExecResult::ok(String::new()))
        } else {
            tracing::trace!(stderr = %stderr.trim_end(), "mkdir failed");
            Ok(ExecResult::err(stderr, 1))
        }
    }

    fn description(&self) -> &'static str {
        "Create directory (in-memory only)"
    }
}

/// The chmod builtin - change file mode bits.
///
/// Usage: chmod MODE FILE...
///
/// MODE can be octal (e.g., 755) or symbolic (e.g., u+x, a+r, go-w)
pub struct Chmod;

/// Largest mode accepted in octal form.
const MAX_OCTAL_MODE: u32 = 0o7777;

const INVALID_MODE: &str = "chmod: invalid mode\n";

/// A parsed MODE operand.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ModeSpec {
    Octal(u32),
    Symbolic(String),
}

impl ModeSpec {
    fn parse(mode_str: &str) -> Option<Self> {
        if !mode_str.is_empty() && mode_str.chars().all(|c| c.is_digit(8)) {
            let mode = u32::from_str_radix(mode_str, 8).ok()?;
            return (mode <= MAX_OCTAL_MODE).then_some(ModeSpec::Octal(mode));
        }
        // Validate the clauses once so a bad mode is reported before any lookup
        apply_symbolic_mode(mode_str, 0, false)?;
        Some(ModeSpec::Symbolic(mode_str.to_string()))
    }

    fn apply(&self, current_mode: u32, is_dir: bool) -> Option<u32> {
        match self {
            ModeSpec::Octal(mode) => Some(*mode),
            ModeSpec::Symbolic(s) => apply_symbolic_mode(s, current_mode, is_dir),
        }
    }
}

/// Parse a symbolic mode string and apply it to an existing mode.
/// Handles: [ugoa]*[+-=][rwxXst]* (comma-separated clauses).
/// Examples: +x, u+x, a+r, go-w, u=rwx, ug+rw, o=
fn apply_symbolic_mode(mode_str: &str, current_mode: u32, is_dir: bool) -> Option<u32> {
    let mut mode = current_mode;

    for clause in mode_str.split(',') {
        let clause = clause.trim();
        if clause.is_empty() {
            return None;
        }

        let mut chars = clause.chars().peekable();

        let (mut who_u, mut who_g, mut who_o) = (false, false, false);
        while let Some(&c) = chars.peek() {
            match c {
                'u' => who_u = true,
                'g' => who_g = true,
                'o' => who_o = true,
                'a' => (who_u, who_g, who_o) = (true, true, true),
                _ => break,
            }
            chars.next();
        }
        // No who specified means all
        if !(who_u || who_g || who_o) {
            (who_u, who_g, who_o) = (true, true, true);
        }

        let op = chars.next()?;
        if !matches!(op, '+' | '-' | '=') {
            return None;
        }

        let mut perm_bits: u32 = 0;
        let mut special: u32 = 0;
        for c in chars {
            match c {
                'r' => perm_bits |= 0o4,
                'w' => perm_bits |= 0o2,
                'x' => perm_bits |= 0o1,
                // execute only for directories or already-executable nodes
                'X' => {
                    if is_dir || current_mode & 0o111 != 0 {
                        perm_bits |= 0o1;
                    }
                }
                's' => {
                    if who_u {
                        special |= 0o4000;
                    }
                    if who_g {
                        special |= 0o2000;
                    }
                }
                't' => special |= 0o1000,
                _ => return None,
            }
        }

        let mut mask: u32 = 0;
        let mut bits: u32 = special;
        if who_u {
            mask |= 0o4700;
            bits |= perm_bits << 6;
        }
        if who_g {
            mask |= 0o2070;
            bits |= perm_bits << 3;
        }
        if who_o {
            mask |= 0o1007;
            bits |= perm_bits;
        }

        match op {
            '+' => mode |= bits,
            '-' => mode &= !bits,
            _ => mode = (mode & !mask) | bits,
        }
    }

    Some(mode)
}

#[async_trait]
impl Builtin for Chmod {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        if ctx.args.len() < 2 {
            return Ok(ExecResult::err("chmod: missing operand\n".to_string(), 1));
        }

        let mode_str = &ctx.args[0];
        let files = &ctx.args[1..];

        let Some(spec) = ModeSpec::parse(mode_str) else {
            tracing::debug!(mode = %mode_str, "chmod: unparseable mode");
            return Ok(ExecResult::err(INVALID_MODE.to_string(), 1));
        };

        let mut stderr = String::new();
        for file in files {
            let id = match ctx.fs.resolve(*ctx.cwd, file) {
                Ok(id) => id,
                Err(_) => {
                    stderr.push_str(&format!(
                        "chmod: cannot access '{}': No such file or directory\n",
                        file
                    ));
                    continue;
                }
            };

            let node = ctx.fs.node(id);
            let Some(mode) = spec.apply(node.mode(), node.is_dir()) else {
                return Ok(ExecResult::err(INVALID_MODE.to_string(), 1));
            };
            tracing::debug!(path = %file, mode = %format_mode(mode), "chmod");
            ctx.fs.chmod(id, mode);
        }

        if stderr.is_empty() {
            Ok(ExecResult::ok(String::new()))
        } else {
            Ok(ExecResult::err(stderr, 1))
        }
    }

    fn description(&self) -> &'static str {
        "Change file/directory permissions (in-memory only)"
    }
}
