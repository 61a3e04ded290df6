//! Parser module for vfsh
//!
//! A command line is a single simple command: a name followed by arguments.
//! There are no pipelines, redirections or expansions.

mod lexer;

pub use lexer::Lexer;

use crate::error::Result;

/// A parsed simple command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCommand {
    /// Command name (first word)
    pub name: String,
    /// Remaining words
    pub args: Vec<String>,
}

/// Parser for one command line.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Parse the line. Blank and comment-only lines yield `None`.
    pub fn parse(self) -> Result<Option<SimpleCommand>> {
        let mut words = self.lexer.words()?.into_iter();
        Ok(words.next().map(|name| SimpleCommand {
            name,
            args: words.collect(),
        }))
    }
}
