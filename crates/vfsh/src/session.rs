//! Session driver: prompt rendering, startup scripts and the read loop
//!
//! A [`Session`] feeds lines to a [`Shell`] and writes each command's stdout
//! and stderr to separate sinks. Input comes from a [`LineReader`], which
//! lets the CLI plug in a line editor while tests use in-memory buffers.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::Shell;

/// Default prompt template.
pub const DEFAULT_PROMPT: &str = "{user}@{host}:{cwd}$ ";

/// Exit code when the archive cannot be loaded.
pub const ARCHIVE_ERROR_EXIT: i32 = 2;

/// Exit code for I/O failures outside command execution.
pub const IO_ERROR_EXIT: i32 = 1;

/// How the root directory appears in the `{cwd}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootStyle {
    /// Root is `/`, nested paths are absolute (`/dir1`)
    Slash,
    /// Root is `~`, nested paths hang off it (`~/dir1`)
    #[default]
    Tilde,
}

impl std::str::FromStr for RootStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "slash" | "/" => Ok(RootStyle::Slash),
            "tilde" | "~" => Ok(RootStyle::Tilde),
            other => Err(format!("unknown root style '{}'", other)),
        }
    }
}

/// Prompt settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    /// Template with `{user}`, `{host}` and `{cwd}` placeholders
    pub template: String,
    pub user: String,
    pub host: String,
    pub root_style: RootStyle,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT.to_string(),
            user: "user".to_string(),
            host: "localhost".to_string(),
            root_style: RootStyle::default(),
        }
    }
}

impl PromptConfig {
    /// Render the prompt for an absolute cursor path.
    pub fn render(&self, cwd_path: &str) -> String {
        let cwd = match self.root_style {
            RootStyle::Slash => cwd_path.to_string(),
            RootStyle::Tilde if cwd_path == "/" => "~".to_string(),
            RootStyle::Tilde => format!("~{}", cwd_path),
        };
        self.template
            .replace("{user}", &self.user)
            .replace("{host}", &self.host)
            .replace("{cwd}", &cwd)
    }
}

/// Outcome of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The user interrupted the line (Ctrl-C); discard and prompt again
    Interrupted,
    Eof,
}

/// Source of interactive input.
pub trait LineReader {
    /// Show `prompt` and read one line, without its terminator.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// [`LineReader`] over any buffered reader.
///
/// The prompt is written to `prompt_out` before each read.
pub struct BufReadLines<R, W> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> BufReadLines<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineReader for BufReadLines<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        self.prompt_out.write_all(prompt.as_bytes())?;
        self.prompt_out.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(ReadOutcome::Line(line))
    }
}

/// Drives a [`Shell`] through a startup script and an interactive loop.
pub struct Session<'a, O, E> {
    shell: &'a mut Shell,
    out: O,
    err: E,
}

impl<'a, O: Write, E: Write> Session<'a, O, E> {
    pub fn new(shell: &'a mut Shell, out: O, err: E) -> Self {
        Self { shell, out, err }
    }

    /// Run the startup script, then the interactive loop unless the script
    /// exited. Returns the session's exit code.
    pub async fn run(&mut self, startup: Option<&str>, reader: &mut dyn LineReader) -> Result<i32> {
        if let Some(script) = startup {
            if let Some(code) = self.run_startup(script).await? {
                return Ok(code);
            }
        }
        self.run_interactive(reader).await
    }

    /// Execute a startup script.
    ///
    /// Blank lines are skipped and `#` comment lines echoed verbatim,
    /// indentation included. Every other line is echoed after the prompt and
    /// executed. Returns the exit code if a line ended the session.
    pub async fn run_startup(&mut self, script: &str) -> Result<Option<i32>> {
        for (lineno, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                writeln!(self.out, "{}", raw)?;
                continue;
            }

            let prompt = self.shell.prompt();
            writeln!(self.out, "{}{}", prompt, line)?;
            tracing::debug!(lineno = lineno + 1, line, "startup");

            if let Some(code) = self.dispatch(line).await? {
                tracing::info!(code, "startup script requested exit");
                return Ok(Some(code));
            }
        }
        Ok(None)
    }

    /// Prompt and execute lines until end of input or `exit`.
    pub async fn run_interactive(&mut self, reader: &mut dyn LineReader) -> Result<i32> {
        loop {
            let prompt = self.shell.prompt();
            match reader.read_line(&prompt)? {
                ReadOutcome::Line(line) => {
                    if let Some(code) = self.dispatch(&line).await? {
                        return Ok(code);
                    }
                }
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => return Ok(0),
            }
        }
    }

    async fn dispatch(&mut self, line: &str) -> Result<Option<i32>> {
        let result = self.shell.exec(line).await?;
        self.out.write_all(result.stdout.as_bytes())?;
        self.err.write_all(result.stderr.as_bytes())?;
        self.out.flush()?;
        self.err.flush()?;
        Ok(result.exit_request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveEntry;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn shell() -> Shell {
        Shell::builder()
            .entries(vec![
                ArchiveEntry::file("README.txt", b"hi".to_vec()),
                ArchiveEntry::dir("dir1"),
            ])
            .user("alice")
            .host("box")
            .build()
            .unwrap()
    }

    struct Scripted(Vec<ReadOutcome>);

    impl LineReader for Scripted {
        fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
            if self.0.is_empty() {
                Ok(ReadOutcome::Eof)
            } else {
                Ok(self.0.remove(0))
            }
        }
    }

    #[test]
    fn test_prompt_root_styles() {
        let mut config = PromptConfig {
            user: "alice".to_string(),
            host: "box".to_string(),
            ..PromptConfig::default()
        };
        assert_eq!(config.render("/"), "alice@box:~$ ");
        assert_eq!(config.render("/dir1"), "alice@box:~/dir1$ ");

        config.root_style = RootStyle::Slash;
        assert_eq!(config.render("/"), "alice@box:/$ ");
        assert_eq!(config.render("/dir1"), "alice@box:/dir1$ ");
    }

    #[test]
    fn test_prompt_custom_template() {
        let config = PromptConfig {
            template: "[{cwd}] {user}> ".to_string(),
            ..PromptConfig::default()
        };
        assert_eq!(config.render("/a/b"), "[~/a/b] user> ");
    }

    #[test]
    fn test_root_style_from_str() {
        assert_eq!("slash".parse::<RootStyle>(), Ok(RootStyle::Slash));
        assert_eq!("tilde".parse::<RootStyle>(), Ok(RootStyle::Tilde));
        assert!("home".parse::<RootStyle>().is_err());
    }

    #[test]
    fn test_buf_read_lines() {
        let mut prompt_out = Vec::new();
        let mut reader = BufReadLines::new(Cursor::new("ls\r\ncd dir1\n"), &mut prompt_out);
        assert_eq!(reader.read_line("> ").unwrap(), ReadOutcome::Line("ls".to_string()));
        assert_eq!(
            reader.read_line("> ").unwrap(),
            ReadOutcome::Line("cd dir1".to_string())
        );
        assert_eq!(reader.read_line("> ").unwrap(), ReadOutcome::Eof);
        drop(reader);
        assert_eq!(prompt_out, b"> > > ");
    }

    #[tokio::test]
    async fn test_startup_echoes_and_executes() {
        let mut shell = shell();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = Session::new(&mut shell, &mut out, &mut err)
            .run_startup("# setup\n\ncd dir1\nls ..\nbogus\n")
            .await
            .unwrap();

        assert_eq!(code, None);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# setup\n\
             alice@box:~$ cd dir1\n\
             alice@box:~/dir1$ ls ..\n\
             0o644 README.txt\n\
             0o755 dir1/\n\
             alice@box:~/dir1$ bogus\n"
        );
        assert_eq!(String::from_utf8(err).unwrap(), "bogus: unknown command\n");
    }

    #[tokio::test]
    async fn test_startup_comment_echoed_verbatim() {
        let mut shell = shell();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = Session::new(&mut shell, &mut out, &mut err)
            .run_startup("  # indented note  \n#tight\n")
            .await
            .unwrap();

        assert_eq!(code, None);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  # indented note  \n#tight\n"
        );
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_startup_exit_skips_rest() {
        let mut shell = shell();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let mut reader = Scripted(vec![ReadOutcome::Line("exit 9".to_string())]);
        let code = Session::new(&mut shell, &mut out, &mut err)
            .run(Some("exit 3\nmkdir never\n"), &mut reader)
            .await
            .unwrap();

        assert_eq!(code, 3);
        assert!(shell.fs().resolve(shell.fs().root(), "never").is_err());
        // The interactive phase never ran
        assert_eq!(reader.0.len(), 1);
    }

    #[tokio::test]
    async fn test_interactive_eof_and_interrupt() {
        let mut shell = shell();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let mut reader = Scripted(vec![
            ReadOutcome::Interrupted,
            ReadOutcome::Line("mkdir made".to_string()),
        ]);
        let code = Session::new(&mut shell, &mut out, &mut err)
            .run(None, &mut reader)
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert!(shell.fs().resolve(shell.fs().root(), "made").is_ok());
    }

    #[tokio::test]
    async fn test_interactive_exit_code() {
        let mut shell = shell();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let mut reader = Scripted(vec![
            ReadOutcome::Line("exit 5".to_string()),
            ReadOutcome::Line("ls".to_string()),
        ]);
        let code = Session::new(&mut shell, &mut out, &mut err)
            .run_interactive(&mut reader)
            .await
            .unwrap();
        assert_eq!(code, 5);
        assert!(out.is_empty());
    }
}
