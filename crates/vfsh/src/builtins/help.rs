//! help builtin

use async_trait::async_trait;

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::ExecResult;

/// The help builtin - list the registered commands.
pub struct Help;

#[async_trait]
impl Builtin for Help {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let mut output = String::from("Available commands:\n");
        for info in ctx.commands {
            if info.description.is_empty() {
                output.push_str(&format!("  {}\n", info.name));
            } else {
                output.push_str(&format!("  {:<8} - {}\n", info.name, info.description));
            }
        }
        Ok(ExecResult::ok(output))
    }

    fn description(&self) -> &'static str {
        "Show list of commands"
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::Harness;
    use super::super::CommandInfo;
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_help_lists_in_registration_order() {
        let mut h = Harness::sample();
        h.commands = vec![
            CommandInfo {
                name: "tree".to_string(),
                description: "Display directory tree",
            },
            CommandInfo {
                name: "ls".to_string(),
                description: "List directory contents",
            },
            CommandInfo {
                name: "custom".to_string(),
                description: "",
            },
        ];

        let result = h.run(&Help, &[]).await;
        assert_eq!(
            result.stdout,
            "Available commands:\n  \
             tree     - Display directory tree\n  \
             ls       - List directory contents\n  \
             custom\n"
        );
    }
}
