//! Path Query Compiler
//!
//! Compiles a query string into a flat list of steps. Supported grammar:
//! - optional leading `/` (child of the root) or `//` (descendant-or-self)
//! - steps separated by `/` or `//`
//! - a step is a name or `*`
//! - an `@name` attribute selector, only as the final step
//!
//! A query without a leading separator is evaluated from the root, like `/`.

use super::lexer::{Lexeme, Lexer, Token};
use crate::error::CompileError;

/// Step axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Direct element children
    Child,
    /// The candidate itself and every descendant
    DescendantOrSelf,
}

/// Element name matcher
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameTest {
    Name(String),
    /// `*`
    Any,
}

/// One location step
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub axis: Axis,
    pub test: NameTest,
    /// Attribute selector, only ever set on the last step
    pub attribute: Option<String>,
}

impl Step {
    fn new(axis: Axis, test: NameTest) -> Self {
        Step {
            axis,
            test,
            attribute: None,
        }
    }
}

/// Compiled query: the source string and its steps
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledQuery {
    source: String,
    steps: Vec<Step>,
}

impl CompiledQuery {
    /// The query string this was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Element steps, never empty
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Trailing attribute selector, if any
    pub fn attribute(&self) -> Option<&str> {
        self.steps.last()?.attribute.as_deref()
    }
}

/// Compile a query string
pub fn compile(query: &str) -> Result<CompiledQuery, CompileError> {
    if query.trim().is_empty() {
        return Err(CompileError::Empty);
    }

    let lexemes = Lexer::new(query).tokenize()?;
    let steps = StepParser::new(&lexemes).parse()?;

    Ok(CompiledQuery {
        source: query.to_string(),
        steps,
    })
}

struct StepParser<'a> {
    lexemes: &'a [Lexeme],
    pos: usize,
}

impl<'a> StepParser<'a> {
    fn new(lexemes: &'a [Lexeme]) -> Self {
        StepParser { lexemes, pos: 0 }
    }

    fn peek(&self) -> &'a Lexeme {
        // tokenize always ends with Eof, and parsing stops there
        &self.lexemes[self.pos.min(self.lexemes.len() - 1)]
    }

    fn bump(&mut self) -> &'a Lexeme {
        let lexeme = self.peek();
        self.pos += 1;
        lexeme
    }

    fn parse(mut self) -> Result<Vec<Step>, CompileError> {
        let mut steps = Vec::new();

        let mut axis = match self.peek().token {
            Token::Slash => {
                self.bump();
                Axis::Child
            }
            Token::DoubleSlash => {
                self.bump();
                Axis::DescendantOrSelf
            }
            _ => Axis::Child,
        };

        loop {
            let lexeme = self.bump();
            match &lexeme.token {
                Token::Name(name) => steps.push(Step::new(axis, NameTest::Name(name.clone()))),
                Token::Star => steps.push(Step::new(axis, NameTest::Any)),
                Token::At => {
                    let name = self.attribute_name()?;
                    self.attach_attribute(&mut steps, axis, name)?;
                    return Ok(steps);
                }
                Token::Slash | Token::DoubleSlash | Token::Eof => {
                    return Err(CompileError::EmptyStep {
                        position: lexeme.position,
                    });
                }
            }

            let sep = self.bump();
            axis = match &sep.token {
                Token::Eof => return Ok(steps),
                Token::Slash => Axis::Child,
                Token::DoubleSlash => Axis::DescendantOrSelf,
                other => {
                    return Err(CompileError::UnexpectedToken {
                        found: other.to_string(),
                        position: sep.position,
                    });
                }
            };
        }
    }

    /// Name following `@`
    fn attribute_name(&mut self) -> Result<String, CompileError> {
        let lexeme = self.peek();
        match &lexeme.token {
            Token::Name(name) => {
                self.bump();
                Ok(name.clone())
            }
            _ => Err(CompileError::EmptyAttributeName {
                position: lexeme.position,
            }),
        }
    }

    /// Attach `@name` to the step before it; the selector must end the query
    fn attach_attribute(
        &mut self,
        steps: &mut Vec<Step>,
        axis: Axis,
        name: String,
    ) -> Result<(), CompileError> {
        let next = self.peek();
        match &next.token {
            Token::Eof => {}
            Token::Slash | Token::DoubleSlash => return Err(CompileError::MisplacedAttribute { name }),
            other => {
                return Err(CompileError::UnexpectedToken {
                    found: other.to_string(),
                    position: next.position,
                });
            }
        }

        match axis {
            Axis::DescendantOrSelf => {
                let mut step = Step::new(Axis::DescendantOrSelf, NameTest::Any);
                step.attribute = Some(name);
                steps.push(step);
            }
            Axis::Child => match steps.last_mut() {
                Some(last) => last.attribute = Some(name),
                None => return Err(CompileError::AttributeWithoutElement { name }),
            },
        }
        Ok(())
    }
}
