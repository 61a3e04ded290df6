//! Interpreter state types

/// Control flow signal raised by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlFlow {
    /// Keep reading commands
    #[default]
    None,
    /// Terminate the session with this exit code
    Exit(i32),
}

/// Result of executing one command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit code
    pub exit_code: i32,
    /// Termination request
    pub control_flow: ControlFlow,
}

impl ExecResult {
    /// Create a successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Create a failed result with the given stderr.
    pub fn err(stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code,
            ..Self::default()
        }
    }

    /// Create a result that ends the session.
    pub fn exit(exit_code: i32) -> Self {
        Self {
            exit_code,
            control_flow: ControlFlow::Exit(exit_code),
            ..Self::default()
        }
    }

    /// Check if the result indicates success.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Exit code requested by `exit`, if any.
    pub fn exit_request(&self) -> Option<i32> {
        match self.control_flow {
            ControlFlow::Exit(code) => Some(code),
            ControlFlow::None => None,
        }
    }
}
