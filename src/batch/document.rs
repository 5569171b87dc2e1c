//! Batch Documents
//!
//! A document is its key, raw bytes and an optional declared encoding. The
//! decoded tree is built on first use and kept for the document's lifetime,
//! so repeated runs over the same documents parse each of them once.

use crate::core::encoding::decode;
use crate::dom::Tree;
use crate::error::DocumentError;
use std::sync::OnceLock;

/// A keyed document in a batch
#[derive(Debug, Clone)]
pub struct Document {
    key: String,
    content: Vec<u8>,
    encoding: Option<String>,
    parsed: OnceLock<Result<Tree, DocumentError>>,
}

impl Document {
    /// Create a document from raw bytes; the encoding is detected
    pub fn new(key: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Document {
            key: key.into(),
            content: content.into(),
            encoding: None,
            parsed: OnceLock::new(),
        }
    }

    /// Declare the document's encoding (a WHATWG label such as `"shift_jis"`)
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self.parsed = OnceLock::new();
        self
    }

    /// Opaque document key, typically a URL
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Decode and parse on first call; later calls return the same outcome
    pub fn tree(&self) -> Result<&Tree, &DocumentError> {
        self.parsed.get_or_init(|| self.parse()).as_ref()
    }

    fn parse(&self) -> Result<Tree, DocumentError> {
        let text = decode(&self.content, self.encoding.as_deref())?;
        Ok(Tree::parse(&text)?)
    }
}
