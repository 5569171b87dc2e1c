//! Error types
//!
//! One enum per failure class:
//! - DecodeError / ParseError: per document, recoverable at the batch level
//! - CompileError: per query, recoverable at the batch level
//! - BatchEnvelopeError: the request could not be decomposed at all (fatal)

use thiserror::Error;

/// Raw bytes could not be turned into Unicode text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("document is empty")]
    Empty,
    #[error("malformed byte sequence for encoding {encoding}")]
    Malformed { encoding: &'static str },
}

/// Markup could not be turned into a tree
///
/// Unbalanced tags never produce one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document has no markup")]
    Empty,
    #[error("unterminated quoted attribute value starting at byte {position}")]
    UnterminatedQuote { position: usize },
    #[error("unexpected '{ch}' inside tag at byte {position}")]
    UnexpectedCharInTag { ch: char, position: usize },
    #[error("input ends inside the tag starting at byte {position}")]
    UnterminatedTag { position: usize },
    #[error("document contains no element")]
    NoRootElement,
}

/// Why a document contributes nothing to the matrix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A path query outside the supported grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("query is empty")]
    Empty,
    #[error("empty step at byte {position}")]
    EmptyStep { position: usize },
    #[error("attribute selector @{name} must be the last step")]
    MisplacedAttribute { name: String },
    #[error("attribute selector at byte {position} has no name")]
    EmptyAttributeName { position: usize },
    #[error("attribute selector @{name} has no element step to apply to")]
    AttributeWithoutElement { name: String },
    #[error("unsupported character '{ch}' at byte {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("unexpected {found} at byte {position}")]
    UnexpectedToken { found: String, position: usize },
}

/// The batch request itself is unusable
#[derive(Debug, Error)]
pub enum BatchEnvelopeError {
    #[error("invalid batch request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read batch request: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors surfaced by the command-line front end
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Envelope(#[from] BatchEnvelopeError),
    #[error("failed to write result matrix: {0}")]
    Output(#[source] std::io::Error),
    #[error("failed to serialize result matrix: {0}")]
    Serialize(#[source] serde_json::Error),
}
