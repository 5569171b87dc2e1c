//! JSON Batch Envelope
//!
//! Request:
//! ```json
//! {"xpaths": ["//title"], "urls": {"http://a.example": {"content": "<html>...</html>"}}}
//! ```
//! Response: the [`ResultMatrix`] as `{"<query>": {"<key>": "<value>"}}`.
//!
//! Content arrives as a JSON string, so it is already Unicode. Documents from
//! the envelope are decoded as UTF-8 unless the entry names an `encoding`.

use crate::batch::{BatchReport, Document, Extractor, ResultMatrix};
use crate::error::{BatchEnvelopeError, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Label used for envelope content without an explicit encoding
const ENVELOPE_ENCODING: &str = "utf-8";

/// One document in the request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// A batch request: queries plus documents keyed by URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub xpaths: Vec<String>,
    #[serde(default)]
    pub urls: BTreeMap<String, DocumentSource>,
}

impl BatchRequest {
    pub fn from_slice(input: &[u8]) -> Result<Self, BatchEnvelopeError> {
        Ok(serde_json::from_slice(input)?)
    }

    /// Read the whole request, then parse it
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, BatchEnvelopeError> {
        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;
        Self::from_slice(&input)
    }

    /// Split into the query list and batch documents
    pub fn into_parts(self) -> (Vec<String>, Vec<Document>) {
        let documents = self
            .urls
            .into_iter()
            .map(|(key, source)| {
                let encoding = source.encoding.unwrap_or_else(|| ENVELOPE_ENCODING.to_string());
                Document::new(key, source.content).with_encoding(encoding)
            })
            .collect();
        (self.xpaths, documents)
    }
}

/// Parse a request and run it
pub fn process(input: &[u8], extractor: &Extractor) -> Result<BatchReport, BatchEnvelopeError> {
    let (queries, documents) = BatchRequest::from_slice(input)?.into_parts();
    Ok(extractor.run(&queries, &documents))
}

/// Serialize a matrix followed by a newline
pub fn write_matrix<W: Write>(matrix: &ResultMatrix, mut writer: W, pretty: bool) -> Result<(), Error> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, matrix).map_err(Error::Serialize)?;
    } else {
        serde_json::to_writer(&mut writer, matrix).map_err(Error::Serialize)?;
    }
    writeln!(writer).map_err(Error::Output)?;
    writer.flush().map_err(Error::Output)
}
