//! Navigation builtin (cd)

use async_trait::async_trait;

use super::{Builtin, Context};
use crate::error::{Error, Result};
use crate::interpreter::ExecResult;

/// The cd builtin - change directory.
///
/// Usage: cd [PATH]
///
/// With no argument, `~` or `/`, returns to the root.
pub struct Cd;

#[async_trait]
impl Builtin for Cd {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let target = ctx.args.first().map(|s| s.as_str()).unwrap_or("");

        if matches!(target, "" | "~" | "/") {
            *ctx.cwd = ctx.fs.root();
            return Ok(ExecResult::ok(""));
        }

        // "~/x" is relative to the root, which doubles as home
        let lookup = match target.strip_prefix("~/") {
            Some(rest) => format!("/{}", rest),
            None => target.to_string(),
        };

        match ctx.fs.resolve(*ctx.cwd, &lookup) {
            Ok(id) if ctx.fs.node(id).is_dir() => {
                *ctx.cwd = id;
                Ok(ExecResult::ok(""))
            }
            Ok(_) | Err(Error::NotADirectory(_)) => Ok(ExecResult::err(
                format!("cd: {}: Not a directory\n", target),
                1,
            )),
            Err(_) => Ok(ExecResult::err(
                format!("cd: {}: No such file or directory\n", target),
                1,
            )),
        }
    }

    fn description(&self) -> &'static str {
        "Change current directory"
    }
}
