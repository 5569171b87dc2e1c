//! Markup Tokenizer - single left-to-right scan
//!
//! Extracts tokens from decoded markup text:
//! - Element start/end tags (with attributes, self-closing flag)
//! - Text runs (entities decoded)
//! - CDATA sections
//! - Comments, processing instructions, DOCTYPE
//!
//! The tokenizer never balances tags; that is the tree builder's job.
//! `script` and `style` bodies are returned as raw text.

use super::attributes::{parse_attributes, Attribute};
use super::entities::decode_text;
use super::scanner::{is_name_start_char, Scanner};
use crate::error::ParseError;
use std::borrow::Cow;

/// Elements whose body is not markup
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// A markup token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<name attrs...>` or `<name attrs.../>`
    StartTag {
        name: &'a str,
        attributes: Vec<Attribute<'a>>,
        self_closing: bool,
    },
    /// `</name>`
    EndTag { name: &'a str },
    /// Text between tags
    Text(Cow<'a, str>),
    /// `<![CDATA[...]]>` content
    CData(&'a str),
    /// `<!--...-->` content
    Comment(&'a str),
    /// `<?...?>` content, including the XML declaration
    ProcessingInstruction(&'a str),
    /// `<!DOCTYPE ...>` and other `<!...>` declarations
    DocType(&'a str),
}

/// Markup tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    len: usize,
    /// Set after a raw text element's start tag
    raw_text: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            len: input.len(),
            raw_text: None,
        }
    }

    /// Get the next token, `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        loop {
            if let Some(element) = self.raw_text.take() {
                if let Some(text) = self.parse_raw_text(element) {
                    return Ok(Some(text));
                }
            }

            if self.scanner.is_eof() {
                return Ok(None);
            }

            if self.at_markup() {
                if let Some(token) = self.parse_markup()? {
                    return Ok(Some(token));
                }
                // Skipped construct such as `</>`
                continue;
            }

            return Ok(Some(self.parse_text()));
        }
    }

    /// Whether the '<' at the current position opens markup
    fn at_markup(&self) -> bool {
        self.scanner.peek() == Some(b'<') && self.scanner.peek_at(1).is_some_and(opens_markup)
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        let start = self.scanner.position();

        if self.scanner.starts_with("<!--") {
            return Ok(Some(self.parse_comment()));
        }
        if self.scanner.starts_with("<![CDATA[") {
            return Ok(Some(self.parse_cdata()));
        }

        self.scanner.advance(1); // Skip '<'
        match self.scanner.peek() {
            Some(b'!') => self.parse_declaration(start).map(Some),
            Some(b'?') => self.parse_pi(start).map(Some),
            Some(b'/') => self.parse_end_tag(start),
            _ => self.parse_start_tag(start).map(Some),
        }
    }

    /// Parse a start tag or self-closing tag
    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        // at_markup guarantees a name start char
        let name = self.scanner.read_name().unwrap_or_default();
        let tag = parse_attributes(&mut self.scanner, start)?;

        if !tag.self_closing {
            self.raw_text = RAW_TEXT_ELEMENTS
                .iter()
                .copied()
                .find(|raw| raw.eq_ignore_ascii_case(name));
        }

        Ok(Token::StartTag {
            name,
            attributes: tag.attributes,
            self_closing: tag.self_closing,
        })
    }

    /// Parse an end tag; `</>` and similar are skipped
    fn parse_end_tag(&mut self, start: usize) -> Result<Option<Token<'a>>, ParseError> {
        self.scanner.advance(1); // Skip '/'
        let name = self.scanner.read_name();

        let end = self
            .scanner
            .find_tag_end()
            .ok_or(ParseError::UnterminatedTag { position: start })?;
        self.scanner.set_position(end + 1);

        Ok(name.map(|name| Token::EndTag { name }))
    }

    /// Parse a comment <!--...-->; an unterminated comment runs to end of input
    fn parse_comment(&mut self) -> Token<'a> {
        self.scanner.advance(4); // Skip '<!--'
        let content_start = self.scanner.position();
        let (content_end, resume) = match self.scanner.find_sequence("-->") {
            Some(pos) => (pos, pos + 3),
            None => (self.input_len(), self.input_len()),
        };
        self.scanner.set_position(resume);
        Token::Comment(self.scanner.slice(content_start, content_end))
    }

    /// Parse a CDATA section <![CDATA[...]]>
    fn parse_cdata(&mut self) -> Token<'a> {
        self.scanner.advance(9); // Skip '<![CDATA['
        let content_start = self.scanner.position();
        let (content_end, resume) = match self.scanner.find_sequence("]]>") {
            Some(pos) => (pos, pos + 3),
            None => (self.input_len(), self.input_len()),
        };
        self.scanner.set_position(resume);
        Token::CData(self.scanner.slice(content_start, content_end))
    }

    /// Parse <!DOCTYPE ...> or another <!...> declaration
    fn parse_declaration(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '!'
        let content_start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_end()
            .ok_or(ParseError::UnterminatedTag { position: start })?;
        self.scanner.set_position(end + 1);
        Ok(Token::DocType(self.scanner.slice(content_start, end)))
    }

    /// Parse a processing instruction <?...?>
    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '?'
        let content_start = self.scanner.position();
        let (content_end, resume) = match self.scanner.find_sequence("?>") {
            Some(pos) => (pos, pos + 2),
            None => {
                let end = self
                    .scanner
                    .find_tag_end()
                    .ok_or(ParseError::UnterminatedTag { position: start })?;
                (end, end + 1)
            }
        };
        self.scanner.set_position(resume);
        Ok(Token::ProcessingInstruction(self.scanner.slice(content_start, content_end)))
    }

    /// Parse text up to the next '<' that opens markup
    fn parse_text(&mut self) -> Token<'a> {
        let start = self.scanner.position();

        // A leading '<' here is literal (e.g. "a < b")
        let first = self.scanner.peek_char().map_or(1, char::len_utf8);
        self.scanner.advance(first);
        let end = loop {
            match self.scanner.find_tag_start() {
                Some(pos) => {
                    self.scanner.set_position(pos);
                    if self.at_markup() {
                        break pos;
                    }
                    self.scanner.advance(1);
                }
                None => break self.input_len(),
            }
        };
        self.scanner.set_position(end);

        Token::Text(decode_text(self.scanner.slice(start, end)))
    }

    /// Body of a raw text element, up to its closing tag
    fn parse_raw_text(&mut self, element: &str) -> Option<Token<'a>> {
        let start = self.scanner.position();
        let end = self.scanner.find_closing_tag(element).unwrap_or(self.input_len());
        self.scanner.set_position(end);
        (end > start).then(|| Token::Text(Cow::Borrowed(self.scanner.slice(start, end))))
    }

    fn input_len(&self) -> usize {
        self.len
    }
}

/// Bytes that may follow '<' to open markup
#[inline]
fn opens_markup(b: u8) -> bool {
    is_name_start_char(b) || matches!(b, b'/' | b'!' | b'?')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        let mut tok = Tokenizer::new(input);
        let mut out = Vec::new();
        while let Some(t) = tok.next_token().unwrap() {
            out.push(t);
        }
        out
    }

    #[test]
    fn test_simple_element() {
        let toks = tokens("<root>content</root>");
        assert_eq!(toks.len(), 3);
        assert!(matches!(&toks[0], Token::StartTag { name: "root", self_closing: false, .. }));
        assert_eq!(toks[1], Token::Text(Cow::Borrowed("content")));
        assert_eq!(toks[2], Token::EndTag { name: "root" });
    }

    #[test]
    fn test_empty_element() {
        let toks = tokens("<br/>");
        assert!(matches!(&toks[0], Token::StartTag { name: "br", self_closing: true, .. }));
    }

    #[test]
    fn test_attributes_carried() {
        let toks = tokens(r#"<a href="/link">Click</a>"#);
        match &toks[0] {
            Token::StartTag { attributes, .. } => {
                assert_eq!(attributes[0].name, "href");
                assert_eq!(attributes[0].value, "/link");
            }
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn test_cdata() {
        let toks = tokens("<![CDATA[<script>code</script>]]>");
        assert_eq!(toks, vec![Token::CData("<script>code</script>")]);
    }

    #[test]
    fn test_comment() {
        let toks = tokens("<!-- comment -->");
        assert_eq!(toks, vec![Token::Comment(" comment ")]);
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        let toks = tokens("<a><!-- never closed");
        assert_eq!(toks[1], Token::Comment(" never closed"));
    }

    #[test]
    fn test_declarations_and_pi() {
        let toks = tokens("<?xml version=\"1.0\"?><!DOCTYPE html><r/>");
        assert_eq!(toks[0], Token::ProcessingInstruction("xml version=\"1.0\""));
        assert_eq!(toks[1], Token::DocType("DOCTYPE html"));
        assert!(matches!(&toks[2], Token::StartTag { name: "r", .. }));
    }

    #[test]
    fn test_literal_lt_in_text() {
        let toks = tokens("<p>a < b &amp; c</p>");
        assert_eq!(toks[1], Token::Text(Cow::Owned("a < b & c".to_string())));
        assert_eq!(toks[2], Token::EndTag { name: "p" });
    }

    #[test]
    fn test_script_is_raw_text() {
        let toks = tokens("<script>if (a<b) { x = '<p>'; }</script>");
        assert_eq!(toks[1], Token::Text(Cow::Borrowed("if (a<b) { x = '<p>'; }")));
        assert_eq!(toks[2], Token::EndTag { name: "script" });
    }

    #[test]
    fn test_empty_end_tag_skipped() {
        let toks = tokens("<a></>x</a>");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1], Token::Text(Cow::Borrowed("x")));
    }

    #[test]
    fn test_malformed_tag_is_error() {
        let mut tok = Tokenizer::new("<ht<ml>><body>Invalid");
        assert_eq!(
            tok.next_token(),
            Err(ParseError::UnexpectedCharInTag { ch: '<', position: 3 })
        );
    }

    #[test]
    fn test_unterminated_tag_is_error() {
        let mut tok = Tokenizer::new("<html><body class=x");
        assert!(tok.next_token().unwrap().is_some());
        assert_eq!(tok.next_token(), Err(ParseError::UnterminatedTag { position: 6 }));
    }
}
