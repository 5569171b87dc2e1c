//! Charset Detection and Decoding
//!
//! Turns raw document bytes into Unicode text:
//! - A recognized declared encoding always wins
//! - Otherwise a byte order mark, then a markup declaration
//!   (`<?xml encoding=...?>` or `<meta charset=...>`) in the first bytes
//! - UTF-8 when nothing is found
//!
//! The charset database itself is `encoding_rs`. Decoding never substitutes
//! replacement characters; invalid input is a `DecodeError`.

use crate::error::DecodeError;
use encoding_rs::{Encoding, UTF_8};
use memchr::memmem;

/// How many leading bytes are searched for a markup declaration
const PRESCAN_LIMIT: usize = 1024;

/// Decode document bytes into text
pub fn decode(input: &[u8], declared: Option<&str>) -> Result<String, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }

    let (encoding, bom_len) = resolve_encoding(input, declared);
    encoding
        .decode_without_bom_handling_and_without_replacement(&input[bom_len..])
        .map(|text| text.into_owned())
        .ok_or(DecodeError::Malformed {
            encoding: encoding.name(),
        })
}

/// Pick the encoding for `input` and the number of BOM bytes to skip
pub fn resolve_encoding(input: &[u8], declared: Option<&str>) -> (&'static Encoding, usize) {
    let bom = Encoding::for_bom(input);

    if let Some(encoding) = declared.and_then(|label| Encoding::for_label(label.trim().as_bytes())) {
        // Only strip a BOM that agrees with the declaration
        let skip = match bom {
            Some((bom_encoding, len)) if bom_encoding == encoding => len,
            _ => 0,
        };
        return (encoding, skip);
    }

    if let Some((encoding, len)) = bom {
        return (encoding, len);
    }

    let head = &input[..input.len().min(PRESCAN_LIMIT)];
    match sniff_declaration(head).and_then(|label| Encoding::for_label(label)) {
        // A declaration we could read as ASCII can't really be UTF-16
        Some(encoding) => (encoding.output_encoding(), 0),
        None => (UTF_8, 0),
    }
}

/// Find a charset label in an XML declaration or an HTML meta tag
fn sniff_declaration(head: &[u8]) -> Option<&[u8]> {
    if head.starts_with(b"<?xml") {
        let end = memmem::find(head, b"?>").unwrap_or(head.len());
        if let Some(label) = attribute_value(&head[..end], b"encoding") {
            return Some(label);
        }
    }

    let lowered = head.to_ascii_lowercase();
    let mut offset = 0;
    while let Some(found) = memmem::find(&lowered[offset..], b"<meta") {
        let start = offset + found;
        let end = memchr::memchr(b'>', &lowered[start..]).map_or(lowered.len(), |e| start + e);
        let tag = &lowered[start..end];

        if let Some(value) = attribute_value(tag, b"charset") {
            return Some(&head[start..end][offset_of(tag, value)..][..value.len()]);
        }
        if let Some(content) = attribute_value(tag, b"content") {
            if let Some(pos) = memmem::find(content, b"charset=") {
                let label = &content[pos + 8..];
                let label_end = label
                    .iter()
                    .position(|&b| b == b';' || b == b' ' || b == b'"' || b == b'\'')
                    .unwrap_or(label.len());
                let begin = offset_of(tag, label);
                return Some(&head[start..end][begin..begin + label_end]);
            }
        }
        offset = end;
    }
    None
}

/// Value of `name=...` inside a tag, quoted or bare
fn attribute_value<'a>(tag: &'a [u8], name: &[u8]) -> Option<&'a [u8]> {
    let mut from = 0;
    while let Some(found) = memmem::find(&tag[from..], name) {
        let mut pos = from + found + name.len();
        while tag.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
            pos += 1;
        }
        if tag.get(pos) != Some(&b'=') {
            from = pos;
            continue;
        }
        pos += 1;
        while tag.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
            pos += 1;
        }
        return match tag.get(pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let rest = &tag[pos + 1..];
                let len = memchr::memchr(quote, rest).unwrap_or(rest.len());
                Some(&rest[..len])
            }
            Some(_) => {
                let rest = &tag[pos..];
                let len = rest
                    .iter()
                    .position(|&b| b.is_ascii_whitespace() || matches!(b, b'/' | b'>' | b';' | b'"' | b'\''))
                    .unwrap_or(rest.len());
                Some(&rest[..len])
            }
            None => None,
        };
    }
    None
}

/// Byte offset of a subslice within its parent slice
fn offset_of(parent: &[u8], child: &[u8]) -> usize {
    child.as_ptr() as usize - parent.as_ptr() as usize
}
