//! Directory listing builtins - ls, tree

use async_trait::async_trait;

use super::{format_mode, Builtin, Context};
use crate::error::Result;
use crate::fs::{NodeId, Vfs};
use crate::interpreter::ExecResult;

/// The ls builtin - list directory contents.
///
/// Usage: ls [PATH...]
///
/// Each line is `<mode> <name>`, mode in `0o` octal. Directories carry a
/// trailing `/`. A file operand prints its own mode and the operand as given.
pub struct Ls;

#[async_trait]
impl Builtin for Ls {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let paths: Vec<&str> = if ctx.args.is_empty() {
            vec![""]
        } else {
            ctx.args.iter().map(|s| s.as_str()).collect()
        };

        let mut output = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;
        let multiple_paths = paths.len() > 1;

        for (i, path_str) in paths.iter().enumerate() {
            let id = match ctx.fs.resolve(*ctx.cwd, path_str) {
                Ok(id) => id,
                Err(e) => {
                    tracing::trace!(path = path_str, error = %e, "ls: resolve failed");
                    stderr.push_str(&format!(
                        "ls: cannot access '{}': No such file or directory\n",
                        path_str
                    ));
                    exit_code = 2;
                    continue;
                }
            };

            let node = ctx.fs.node(id);
            if !node.is_dir() {
                output.push_str(&format!("{} {}\n", format_mode(node.mode()), path_str));
                continue;
            }

            if multiple_paths {
                if i > 0 && !output.is_empty() {
                    output.push('\n');
                }
                output.push_str(&format!("{}:\n", path_str));
            }

            for entry in ctx.fs.list(id)? {
                let suffix = if entry.metadata.file_type.is_dir() {
                    "/"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "{} {}{}\n",
                    format_mode(entry.metadata.mode),
                    entry.name,
                    suffix
                ));
            }
        }

        Ok(ExecResult {
            stdout: output,
            stderr,
            exit_code,
            ..ExecResult::default()
        })
    }

    fn description(&self) -> &'static str {
        "List directory contents"
    }
}

/// The tree builtin - print a directory hierarchy.
///
/// Usage: tree [PATH]
pub struct Tree;

#[async_trait]
impl Builtin for Tree {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let path_str = ctx.args.first().map(|s| s.as_str()).unwrap_or("");

        let id = match ctx.fs.resolve(*ctx.cwd, path_str) {
            Ok(id) => id,
            Err(_) => {
                return Ok(ExecResult::err(
                    format!("tree: {}: No such directory\n", path_str),
                    1,
                ));
            }
        };

        let label = if path_str.is_empty() { "." } else { path_str };
        let mut output = String::new();
        output.push_str(label);
        if ctx.fs.node(id).is_dir() && !label.ends_with('/') {
            output.push('/');
        }
        output.push('\n');
        format_tree(ctx.fs, id, "", &mut output)?;

        Ok(ExecResult::ok(output))
    }

    fn description(&self) -> &'static str {
        "Display directory tree"
    }
}

fn format_tree(fs: &Vfs, dir: NodeId, prefix: &str, output: &mut String) -> Result<()> {
    if !fs.node(dir).is_dir() {
        return Ok(());
    }

    let children = fs.list(dir)?;
    for (i, entry) in children.iter().enumerate() {
        let is_last_child = i == children.len() - 1;
        let connector = if is_last_child { "└── " } else { "├── " };
        let is_dir = entry.metadata.file_type.is_dir();

        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(&entry.name);
        if is_dir {
            output.push('/');
        }
        output.push('\n');

        if is_dir {
            let new_prefix = if is_last_child {
                format!("{}    ", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            format_tree(fs, entry.id, &new_prefix, output)?;
        }
    }

    Ok(())
}
