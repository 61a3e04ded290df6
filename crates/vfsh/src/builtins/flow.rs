//! Flow control builtin (exit)

use async_trait::async_trait;

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::ExecResult;

/// The exit builtin - end the session with a status code.
///
/// Usage: exit [N]
///
/// Without an argument the code is 0; a non-numeric argument yields 1.
pub struct Exit;

#[async_trait]
impl Builtin for Exit {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let exit_code = match ctx.args.first() {
            None => 0,
            Some(arg) => arg.trim().parse::<i32>().unwrap_or_else(|_| {
                tracing::trace!(arg = %arg, "exit: non-numeric argument");
                1
            }),
        };

        Ok(ExecResult::exit(exit_code))
    }

    fn description(&self) -> &'static str {
        "Exit the shell"
    }
}
