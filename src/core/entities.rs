//! Entity Decoding
//!
//! Handles decoding of character references in text and attribute values:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Common HTML named entities (&nbsp; &copy; ...)
//! - Numeric character references: &#123; &#x7B;
//!
//! Unknown or unterminated references are kept verbatim.
//! Uses Cow for zero-copy when no references are present.

use memchr::memchr;
use std::borrow::Cow;

/// Longest reference body we try to resolve (`&` and `;` excluded)
const MAX_ENTITY_LEN: usize = 32;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp_offset;
        result.push_str(&input[pos..amp]);

        // Bounded window keeps runs of bare `&` linear
        let window_end = (amp + 2 + MAX_ENTITY_LEN).min(bytes.len());
        let body_end = memchr(b';', &bytes[amp + 1..window_end]).map(|len| amp + 1 + len);

        match body_end.and_then(|end| decode_entity(&input[amp + 1..end]).map(|c| (c, end))) {
            Some((decoded, end)) => {
                result.push(decoded);
                pos = end + 1;
            }
            None => {
                result.push('&');
                pos = amp + 1;
            }
        }
    }

    result.push_str(&input[pos..]);
    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        // HTML5 named entities (common ones)
        "nbsp" => Some('\u{00A0}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "trade" => Some('\u{2122}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "hellip" => Some('\u{2026}'),
        _ => None,
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    // NUL and surrogates are not characters
    char::from_u32(codepoint).filter(|&c| c != '\0')
}
