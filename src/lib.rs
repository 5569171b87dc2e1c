//! xprobe - batch path-query extraction over tolerant-parsed markup
//!
//! Pipeline:
//! A: Decode raw bytes to text (core::encoding)
//! B: Tolerant single-pass parse into an arena tree (core, dom)
//! C: Compile path queries once (xpath)
//! D: Evaluate every query against every tree, sequentially or on rayon (batch, strategy)
//! E: JSON request/response envelope (envelope)
//!
//! ```
//! use xprobe::batch::{run_batch, Document};
//!
//! let docs = [Document::new("a.example", "<html><head><title>Hi</title></head></html>")];
//! let matrix = run_batch(&["//title"], &docs);
//! assert_eq!(matrix.get("//title", "a.example"), Some("Hi"));
//! ```

pub mod batch;
pub mod core;
pub mod dom;
pub mod envelope;
pub mod error;
pub mod strategy;
pub mod xpath;

pub use batch::{run_batch, BatchOptions, BatchReport, Diagnostic, Document, Extractor, ResultMatrix};
pub use dom::Tree;
pub use error::{BatchEnvelopeError, CompileError, DecodeError, DocumentError, Error, ParseError};
pub use xpath::{compile, evaluate, CompiledQuery};
