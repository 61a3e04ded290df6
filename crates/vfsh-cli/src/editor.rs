//! rustyline-backed line reader for terminal sessions

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use vfsh::{LineReader, ReadOutcome};

/// Line editor with in-memory history.
pub struct EditorReader {
    editor: Editor<(), DefaultHistory>,
}

impl EditorReader {
    pub fn new() -> Result<Self> {
        let editor = Editor::new().context("Failed to create editor")?;
        Ok(Self { editor })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> vfsh::Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        tracing::warn!("Failed to add history entry: {}", e);
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                Ok(ReadOutcome::Interrupted)
            }
            Err(ReadlineError::Eof) => {
                println!();
                Ok(ReadOutcome::Eof)
            }
            Err(ReadlineError::Io(e)) => Err(e.into()),
            Err(e) => Err(std::io::Error::other(e.to_string()).into()),
        }
    }
}
