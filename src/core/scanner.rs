//! SIMD-accelerated markup scanning using memchr
//!
//! Works on decoded text; every delimiter searched for is ASCII, so positions
//! returned here always fall on `char` boundaries.

use memchr::{memchr, memmem};

/// Scanner for markup delimiter detection
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    /// Get remaining input
    #[inline]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Get a slice from start to end positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    /// Peek at the current character (may be multi-byte)
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_position(self.pos + n);
    }

    /// Skip whitespace characters (space, tab, newline, carriage return, form feed)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Check whether the remaining input starts with `prefix`
    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    /// Find next '<' (tag start) using SIMD
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', &self.bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Find next '>' (tag end) using SIMD
    /// Note: Does not handle '>' inside quotes
    #[inline]
    pub fn find_tag_end(&self) -> Option<usize> {
        memchr(b'>', &self.bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Find the given quote byte
    #[inline]
    pub fn find_quote(&self, quote: u8) -> Option<usize> {
        memchr(quote, &self.bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Find a literal delimiter sequence such as `-->` or `]]>`
    #[inline]
    pub fn find_sequence(&self, needle: &str) -> Option<usize> {
        memmem::find(&self.bytes()[self.pos..], needle.as_bytes()).map(|i| self.pos + i)
    }

    /// Find a closing tag `</name` for raw text elements, ignoring ASCII case
    pub fn find_closing_tag(&self, name: &str) -> Option<usize> {
        let bytes = self.bytes();
        let mut from = self.pos;
        while let Some(i) = memmem::find(&bytes[from..], b"</") {
            let at = from + i;
            let after = at + 2;
            let candidate = &bytes[after..(after + name.len()).min(bytes.len())];
            let terminated = bytes
                .get(after + name.len())
                .is_none_or(|&b| is_whitespace(b) || b == b'>' || b == b'/');
            if candidate.eq_ignore_ascii_case(name.as_bytes()) && terminated {
                return Some(at);
            }
            from = after;
        }
        None
    }

    /// Read a markup name at the current position
    pub fn read_name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let first = self.peek()?;
        if !is_name_start_char(first) {
            return None;
        }
        self.pos += 1;
        while let Some(b) = self.peek() {
            if is_name_char(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        // Non-ASCII bytes are consumed whole, so this stays on a boundary
        Some(&self.input[start..self.pos])
    }
}

/// Markup whitespace
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Check if a byte can start a tag or attribute name
/// Non-ASCII bytes (>= 0x80) are allowed as they may be UTF-8 encoded Unicode letters
#[inline]
pub fn is_name_start_char(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b':' || c >= 0x80
}

/// Check if a byte can continue a tag or attribute name
#[inline]
pub fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'.' || c == b'-' || c == b'_' || c == b':' || c >= 0x80
}
