//! Core markup parsing primitives
//!
//! This module contains the fundamental building blocks for turning bytes
//! into tokens:
//! - Encoding: charset resolution and decoding to Unicode text
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: single-pass token extraction, tolerant of HTML habits
//! - Attributes: attribute parsing and extraction
//! - Entities: character reference decoding with Cow (zero-copy when possible)

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
