//! Path Query Lexer
//!
//! Tokenizes path queries into tokens with byte positions.

use crate::error::CompileError;
use std::fmt;

/// Query token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Slash,       // /
    DoubleSlash, // //
    At,          // @
    Star,        // *
    Name(String),

    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Slash => f.write_str("/"),
            Token::DoubleSlash => f.write_str("//"),
            Token::At => f.write_str("@"),
            Token::Star => f.write_str("*"),
            Token::Name(name) => f.write_str(name),
            Token::Eof => f.write_str("end of query"),
        }
    }
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub position: usize,
}

/// Query lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Get the remaining input
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current character
    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip whitespace
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Lexeme, CompileError> {
        self.skip_whitespace();
        let position = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Lexeme { token: Token::Eof, position });
        };

        let token = match c {
            '/' => {
                self.advance(1);
                if self.peek() == Some('/') {
                    self.advance(1);
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '@' => {
                self.advance(1);
                Token::At
            }
            '*' => {
                self.advance(1);
                Token::Star
            }
            c if is_name_start(c) => self.read_name(),
            ch => return Err(CompileError::UnexpectedChar { ch, position }),
        };

        Ok(Lexeme { token, position })
    }

    /// Read a name
    fn read_name(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
        Token::Name(self.input[start..self.pos].to_string())
    }

    /// Tokenize the whole query; the last lexeme is always `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Lexeme>, CompileError> {
        let mut lexemes = Vec::new();
        loop {
            let lexeme = self.next_token()?;
            let done = lexeme.token == Token::Eof;
            lexemes.push(lexeme);
            if done {
                return Ok(lexemes);
            }
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|l| l.token)
            .collect()
    }

    #[test]
    fn test_simple_path() {
        assert_eq!(
            tokens("/html/body"),
            vec![
                Token::Slash,
                Token::Name("html".to_string()),
                Token::Slash,
                Token::Name("body".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_descendant_and_attribute() {
        assert_eq!(
            tokens("//a/@href"),
            vec![
                Token::DoubleSlash,
                Token::Name("a".to_string()),
                Token::Slash,
                Token::At,
                Token::Name("href".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_triple_slash() {
        assert_eq!(tokens("///"), vec![Token::DoubleSlash, Token::Slash, Token::Eof]);
    }

    #[test]
    fn test_names_with_punctuation() {
        assert_eq!(
            tokens("og:title/data-x.y"),
            vec![
                Token::Name("og:title".to_string()),
                Token::Slash,
                Token::Name("data-x.y".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_whitespace_and_positions() {
        let lexemes = Lexer::new(" / a ").tokenize().unwrap();
        let positions: Vec<_> = lexemes.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![1, 3, 5]);
    }

    #[test]
    fn test_unexpected_char() {
        let err = Lexer::new("//a[1]").tokenize().unwrap_err();
        assert_eq!(err, CompileError::UnexpectedChar { ch: '[', position: 3 });
    }
}
