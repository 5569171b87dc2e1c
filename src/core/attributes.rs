//! Attribute Parsing
//!
//! Scans the attribute section of a start tag, from just after the element
//! name up to and including the closing `>` or `/>`.
//!
//! Lenient about HTML habits (bare values, valueless attributes, stray
//! characters) but fails on input that leaves the tag boundary unknown:
//! an unterminated quote, a `<` inside the tag, or end of input.

use super::entities::decode_text;
use super::scanner::{is_name_start_char, is_whitespace, Scanner};
use crate::error::ParseError;
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name as written
    pub name: &'a str,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, str>,
}

/// Attributes of one start tag
#[derive(Debug, Clone, Default)]
pub struct TagAttributes<'a> {
    /// Attributes in source order, first occurrence of each name only
    pub attributes: Vec<Attribute<'a>>,
    /// True for `<name ... />`
    pub self_closing: bool,
}

/// Parse attributes of the tag that opened at `tag_start`
///
/// The scanner must be positioned right after the element name; on success it
/// is left just past the closing `>`.
pub fn parse_attributes<'a>(
    scanner: &mut Scanner<'a>,
    tag_start: usize,
) -> Result<TagAttributes<'a>, ParseError> {
    let mut tag = TagAttributes::default();

    loop {
        scanner.skip_whitespace();

        let Some(b) = scanner.peek() else {
            return Err(ParseError::UnterminatedTag { position: tag_start });
        };

        match b {
            b'>' => {
                scanner.advance(1);
                return Ok(tag);
            }
            b'/' if scanner.peek_at(1) == Some(b'>') => {
                scanner.advance(2);
                tag.self_closing = true;
                return Ok(tag);
            }
            b'<' => {
                return Err(ParseError::UnexpectedCharInTag {
                    ch: '<',
                    position: scanner.position(),
                });
            }
            _ if is_name_start_char(b) => {
                let attr = parse_attribute(scanner, tag_start)?;
                if !tag.attributes.iter().any(|a| a.name == attr.name) {
                    tag.attributes.push(attr);
                }
            }
            _ => {
                // Stray character between attributes
                let len = scanner.peek_char().map_or(1, char::len_utf8);
                scanner.advance(len);
            }
        }
    }
}

/// Parse one `name`, `name=value`, `name="value"` or `name='value'`
fn parse_attribute<'a>(scanner: &mut Scanner<'a>, tag_start: usize) -> Result<Attribute<'a>, ParseError> {
    // Caller checked for a name start char
    let name = scanner.read_name().unwrap_or_default();

    let after_name = scanner.position();
    scanner.skip_whitespace();
    if scanner.peek() != Some(b'=') {
        // Valueless attribute (HTML boolean attributes)
        scanner.set_position(after_name);
        return Ok(Attribute { name, value: Cow::Borrowed("") });
    }
    scanner.advance(1);
    scanner.skip_whitespace();

    let value = match scanner.peek() {
        None => return Err(ParseError::UnterminatedTag { position: tag_start }),
        Some(quote @ (b'"' | b'\'')) => {
            let open = scanner.position();
            scanner.advance(1);
            let close = scanner
                .find_quote(quote)
                .ok_or(ParseError::UnterminatedQuote { position: open })?;
            let raw = scanner.slice(open + 1, close);
            scanner.set_position(close + 1);
            decode_text(raw)
        }
        Some(b'>') => Cow::Borrowed(""),
        Some(_) => {
            let start = scanner.position();
            while let Some(b) = scanner.peek() {
                if is_whitespace(b) || b == b'>' || b == b'<' {
                    break;
                }
                if b == b'/' && scanner.peek_at(1) == Some(b'>') {
                    break;
                }
                let len = scanner.peek_char().map_or(1, char::len_utf8);
                scanner.advance(len);
            }
            decode_text(scanner.slice(start, scanner.position()))
        }
    };

    Ok(Attribute { name, value })
}
