//! Lexer for command lines
//!
//! Splits one line into words using shell quoting rules:
//! - whitespace separates words
//! - `'...'` is literal
//! - `"..."` allows `\"`, `\\`, `\$` and `` \` `` escapes
//! - a backslash outside quotes escapes the next character
//! - `#` at the start of a word comments out the rest of the line

use crate::error::{Error, Result};

/// Lexer for a single command line.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Get the next word, `Ok(None)` at end of input or at a comment.
    pub fn next_word(&mut self) -> Result<Option<String>> {
        self.skip_whitespace();

        match self.peek_char() {
            None => return Ok(None),
            Some('#') => {
                // Comment runs to end of line
                while self.advance().is_some() {}
                return Ok(None);
            }
            Some(_) => {}
        }

        let mut word = String::new();
        while let Some(ch) = self.peek_char() {
            match ch {
                c if c.is_whitespace() => break,
                '\'' => {
                    self.advance();
                    self.read_single_quoted(&mut word)?;
                }
                '"' => {
                    self.advance();
                    self.read_double_quoted(&mut word)?;
                }
                '\\' => {
                    self.advance();
                    // Trailing backslash is kept literally
                    word.push(self.advance().unwrap_or('\\'));
                }
                c => {
                    self.advance();
                    word.push(c);
                }
            }
        }

        Ok(Some(word))
    }

    fn read_single_quoted(&mut self, word: &mut String) -> Result<()> {
        loop {
            match self.advance() {
                Some('\'') => return Ok(()),
                Some(c) => word.push(c),
                None => return Err(Error::Parse("unterminated single quote".to_string())),
            }
        }
    }

    fn read_double_quoted(&mut self, word: &mut String) -> Result<()> {
        loop {
            match self.advance() {
                Some('"') => return Ok(()),
                Some('\\') => match self.peek_char() {
                    Some(c @ ('"' | '\\' | '$' | '`')) => {
                        self.advance();
                        word.push(c);
                    }
                    _ => word.push('\\'),
                },
                Some(c) => word.push(c),
                None => return Err(Error::Parse("unterminated double quote".to_string())),
            }
        }
    }

    /// Collect all remaining words.
    pub fn words(mut self) -> Result<Vec<String>> {
        let mut words = Vec::new();
        while let Some(word) = self.next_word()? {
            words.push(word);
        }
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<String> {
        Lexer::new(line).words().unwrap()
    }

    #[test]
    fn test_simple_words() {
        assert_eq!(split("ls  dir1\tdir2 "), vec!["ls", "dir1", "dir2"]);
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(split("").is_empty());
        assert!(split("   \t ").is_empty());
    }

    #[test]
    fn test_comment_line_and_trailing_comment() {
        assert!(split("# just a comment").is_empty());
        assert!(split("   #indented").is_empty());
        assert_eq!(split("ls dir1 # list it"), vec!["ls", "dir1"]);
        assert_eq!(split("ls a#b"), vec!["ls", "a#b"]);
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(split(r#"mkdir 'my dir' 'a\b'"#), vec!["mkdir", "my dir", r"a\b"]);
    }

    #[test]
    fn test_double_quotes_with_escapes() {
        assert_eq!(
            split(r#"cd "with \"quotes\" and \\ and \n""#),
            vec!["cd", r#"with "quotes" and \ and \n"#]
        );
    }

    #[test]
    fn test_backslash_outside_quotes() {
        assert_eq!(split(r"mkdir my\ dir"), vec!["mkdir", "my dir"]);
        assert_eq!(split(r"ls trailing\"), vec!["ls", r"trailing\"]);
    }

    #[test]
    fn test_adjacent_quoted_parts_join() {
        assert_eq!(split(r#"ls a'b c'"d e"f"#), vec!["ls", "ab cd ef"]);
        assert_eq!(split("ls ''"), vec!["ls", ""]);
    }

    #[test]
    fn test_unterminated_quotes() {
        assert!(matches!(
            Lexer::new("ls 'oops").words(),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Lexer::new("ls \"oops").words(),
            Err(Error::Parse(_))
        ));
    }
}
