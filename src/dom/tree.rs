//! Arena Tree - tolerant markup parsing into NodeId-indexed nodes
//!
//! The tree is built in one pass over the token stream with an explicit
//! stack of open elements. Unbalanced markup never fails:
//! - an end tag pops down to the nearest open element with the same name
//! - an end tag with no matching open element is ignored
//! - elements still open at end of input are closed silently
//!
//! Only the first top-level element is kept; scanning stops once it closes.
//!
//! HTML void elements (`<meta>`, `<br>`, ...) never take children, unless an
//! `<?xml ...?>` declaration precedes the document element.

use super::node::{Node, NodeAttribute, NodeId};
use super::strings::{NameId, StringPool};
use crate::core::attributes::Attribute;
use crate::core::scanner::is_whitespace;
use crate::core::tokenizer::{Token, Tokenizer};
use crate::error::ParseError;

/// Id of the synthetic root node
const ROOT: NodeId = 0;

/// Elements closed as soon as they open (ASCII case-insensitive)
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[inline]
fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

/// `<?xml ...?>` content, as opposed to other processing instructions
fn is_xml_declaration(content: &str) -> bool {
    match content.get(..3) {
        Some(target) if target.eq_ignore_ascii_case("xml") => {
            content[3..].bytes().next().is_none_or(is_whitespace)
        }
        _ => false,
    }
}

/// Parsed document tree
#[derive(Debug, Clone)]
pub struct Tree {
    /// All nodes, in document order
    nodes: Vec<Node>,
    /// Attribute arena, sliced per element
    attributes: Vec<NodeAttribute>,
    /// Interned element and attribute names
    strings: StringPool,
    /// First top-level element
    document_element: NodeId,
}

impl Tree {
    /// Parse decoded markup text into a tree
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.bytes().all(is_whitespace) {
            return Err(ParseError::Empty);
        }

        let mut builder = TreeBuilder::new(input.len());
        let mut tokenizer = Tokenizer::new(input);

        while let Some(token) = tokenizer.next_token()? {
            if builder.push_token(token) {
                break;
            }
        }

        builder.finish()
    }

    /// Id of the synthetic root
    #[inline]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Id of the first top-level element
    #[inline]
    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    /// Get a node by ID
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Parent of a node (None for the root)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Element name
    pub fn name(&self, id: NodeId) -> Option<&str> {
        let node = self.node(id).filter(|n| n.is_element())?;
        self.strings.get(node.name_id)
    }

    /// Interned id of a name, None when no node or attribute uses it
    #[inline]
    pub fn lookup_name(&self, name: &str) -> Option<NameId> {
        self.strings.lookup(name)
    }

    /// Get the string pool
    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    fn attribute_slice(&self, id: NodeId) -> &[NodeAttribute] {
        match self.node(id) {
            Some(node) => {
                let start = node.attr_start as usize;
                let end = start + node.attr_count as usize;
                &self.attributes[start..end]
            }
            None => &[],
        }
    }

    /// Get attribute value by name
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attribute_by_id(id, self.lookup_name(name)?)
    }

    /// Get attribute value by interned name
    pub fn attribute_by_id(&self, id: NodeId, name_id: NameId) -> Option<&str> {
        self.attribute_slice(id)
            .iter()
            .find(|attr| attr.name_id == name_id)
            .map(|attr| attr.value.as_str())
    }

    /// All attribute names and values of an element, in source order
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.attribute_slice(id)
            .iter()
            .filter_map(|attr| Some((self.strings.get(attr.name_id)?, attr.value.as_str())))
            .collect()
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.node(id).and_then(|n| n.first_child);
        ChildIter { tree: self, next: first }
    }

    /// Iterate over all descendants of a node in pre-order
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut iter = DescendantIter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_children(id);
        iter
    }

    /// Concatenated text of a node and its descendants, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let own = self.node(id).and_then(|n| n.text.as_deref());
        let mut out = String::from(own.unwrap_or_default());
        for desc in self.descendants(id) {
            if let Some(text) = self.node(desc).and_then(|n| n.text.as_deref()) {
                out.push_str(text);
            }
        }
        out
    }

    /// Get total number of nodes (root included)
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a parsed tree holds at least the root and one element
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Iterator over child nodes
pub struct ChildIter<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first, pre-order)
pub struct DescendantIter<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl DescendantIter<'_> {
    /// Push children in reverse so the first child is visited first
    fn push_children(&mut self, id: NodeId) {
        let mut child = self.tree.node(id).and_then(|n| n.last_child);
        while let Some(cid) = child {
            self.stack.push(cid);
            child = self.tree.node(cid).and_then(|n| n.prev_sibling);
        }
    }
}

impl Iterator for DescendantIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.push_children(current);
        Some(current)
    }
}

// =============================================================================
// Builder
// =============================================================================

struct TreeBuilder {
    nodes: Vec<Node>,
    attributes: Vec<NodeAttribute>,
    strings: StringPool,
    /// Open elements; the root is always at the bottom
    stack: Vec<NodeId>,
    document_element: Option<NodeId>,
    /// Declared XML: void elements keep their content
    xml: bool,
}

impl TreeBuilder {
    fn new(input_len: usize) -> Self {
        // Rough estimate: one node per 16 bytes of markup
        let mut nodes = Vec::with_capacity(input_len / 16 + 1);
        nodes.push(Node::root());
        TreeBuilder {
            nodes,
            attributes: Vec::new(),
            strings: StringPool::new(),
            stack: vec![ROOT],
            document_element: None,
            xml: false,
        }
    }

    /// Apply one token; returns true once the document element is closed
    fn push_token(&mut self, token: Token<'_>) -> bool {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.start_element(name, attributes, self_closing),
            Token::EndTag { name } => self.end_element(name),
            Token::Text(text) => {
                self.append_text(&text);
                false
            }
            Token::CData(text) => {
                self.append_text(text);
                false
            }
            Token::ProcessingInstruction(content) => {
                if self.document_element.is_none() && is_xml_declaration(content) {
                    self.xml = true;
                }
                false
            }
            Token::Comment(_) | Token::DocType(_) => false,
        }
    }

    #[inline]
    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    #[inline]
    fn document_closed(&self) -> bool {
        self.document_element.is_some() && self.stack.len() == 1
    }

    fn start_element(&mut self, name: &str, attributes: Vec<Attribute<'_>>, self_closing: bool) -> bool {
        let parent = self.current();
        let mut node = Node::element(self.strings.intern(name), parent);

        node.attr_start = self.attributes.len() as u32;
        node.attr_count = attributes.len() as u32;
        for attr in attributes {
            let name_id = self.strings.intern(attr.name);
            self.attributes.push(NodeAttribute {
                name_id,
                value: attr.value.into_owned(),
            });
        }

        let id = self.push_node(node, parent);
        if parent == ROOT {
            self.document_element = Some(id);
        }

        if !self_closing && (self.xml || !is_void_element(name)) {
            self.stack.push(id);
        }
        self.document_closed()
    }

    fn end_element(&mut self, name: &str) -> bool {
        let Some(name_id) = self.strings.lookup(name) else {
            // Never opened
            return false;
        };

        let open = self.stack[1..]
            .iter()
            .rposition(|&id| self.nodes[id as usize].name_id == name_id);
        if let Some(index) = open {
            self.stack.truncate(index + 1);
        }
        self.document_closed()
    }

    /// Append text to the current element, merging with a preceding text node
    fn append_text(&mut self, text: &str) {
        let parent = self.current();
        if parent == ROOT || text.is_empty() {
            return;
        }

        if let Some(last) = self.nodes[parent as usize].last_child {
            if let Some(existing) = self.nodes[last as usize].text.as_mut() {
                existing.push_str(text);
                return;
            }
        }
        self.push_node(Node::text(text.to_string(), parent), parent);
    }

    fn push_node(&mut self, node: Node, parent: NodeId) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_child(parent, id);
        id
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let last_child = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child {
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    fn finish(self) -> Result<Tree, ParseError> {
        let document_element = self.document_element.ok_or(ParseError::NoRootElement)?;
        Ok(Tree {
            nodes: self.nodes,
            attributes: self.attributes,
            strings: self.strings,
            document_element,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_names(tree: &Tree, id: NodeId) -> Vec<&str> {
        tree.children(id).filter_map(|c| tree.name(c)).collect()
    }

    fn find(tree: &Tree, name: &str) -> NodeId {
        tree.descendants(tree.root())
            .find(|&id| tree.name(id) == Some(name))
            .unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let tree = Tree::parse("<html><head><title>Test Page</title></head><body/></html>").unwrap();
        let html = tree.document_element();
        assert_eq!(tree.name(html), Some("html"));
        assert_eq!(tree.parent(html), Some(tree.root()));
        assert_eq!(child_names(&tree, html), vec!["head", "body"]);
        assert_eq!(tree.text_content(find(&tree, "title")), "Test Page");
    }

    #[test]
    fn test_root_has_single_child() {
        let tree = Tree::parse("<!DOCTYPE html>\n<a>1</a><b>2</b>").unwrap();
        let children: Vec<_> = tree.children(tree.root()).collect();
        assert_eq!(children, vec![tree.document_element()]);
        assert_eq!(tree.text_content(tree.root()), "1");
    }

    #[test]
    fn test_mismatched_end_tag_closes_intervening() {
        let tree = Tree::parse("<div><p><b>bold</p><span>x</span></div>").unwrap();
        let div = tree.document_element();
        assert_eq!(child_names(&tree, div), vec!["p", "span"]);
        assert_eq!(child_names(&tree, find(&tree, "p")), vec!["b"]);
    }

    #[test]
    fn test_unmatched_end_tag_ignored() {
        let tree = Tree::parse("<div></span><p>x</p></div>").unwrap();
        assert_eq!(child_names(&tree, tree.document_element()), vec!["p"]);
    }

    #[test]
    fn test_unclosed_elements_at_eof() {
        let tree = Tree::parse("<html><body><p>open").unwrap();
        assert_eq!(tree.text_content(find(&tree, "p")), "open");
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let tree = Tree::parse(
            "<html><head><meta charset=\"utf-8\"><LINK rel=\"x\"><title>T</title></head>\
             <body>a<br>b<img src=\"i\"></img><p>c</p></body></html>",
        )
        .unwrap();
        assert_eq!(child_names(&tree, find(&tree, "head")), vec!["meta", "LINK", "title"]);
        assert_eq!(child_names(&tree, find(&tree, "body")), vec!["br", "img", "p"]);
        assert_eq!(tree.text_content(find(&tree, "body")), "abc");
        assert!(tree.children(find(&tree, "meta")).next().is_none());
    }

    #[test]
    fn test_xml_declaration_keeps_void_names_open() {
        let tree = Tree::parse("<?xml version=\"1.0\"?><rss><link>http://a.example/</link><item/></rss>").unwrap();
        assert_eq!(child_names(&tree, tree.document_element()), vec!["link", "item"]);
        assert_eq!(tree.text_content(find(&tree, "link")), "http://a.example/");

        // Other processing instructions do not switch modes
        let tree = Tree::parse("<?xml-stylesheet href=\"s\"?><r><link>x</link></r>").unwrap();
        assert_eq!(tree.text_content(find(&tree, "link")), "");
    }

    #[test]
    fn test_text_runs_merged() {
        let tree = Tree::parse("<p>a<!-- c -->b<![CDATA[<c>]]>&amp;</p>").unwrap();
        let p = tree.document_element();
        let children: Vec<_> = tree.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(tree.text_content(p), "ab<c>&");
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let tree = Tree::parse("<p>one <b>two</b> three</p>").unwrap();
        assert_eq!(tree.text_content(tree.document_element()), "one two three");
    }

    #[test]
    fn test_attributes() {
        let tree = Tree::parse(r#"<a href="/x" class=link hidden>t</a>"#).unwrap();
        let a = tree.document_element();
        assert_eq!(tree.attribute(a, "href"), Some("/x"));
        assert_eq!(tree.attribute(a, "hidden"), Some(""));
        assert_eq!(tree.attribute(a, "missing"), None);
        assert_eq!(tree.attributes(a), vec![("href", "/x"), ("class", "link"), ("hidden", "")]);
    }

    #[test]
    fn test_script_raw_text() {
        let tree = Tree::parse("<html><script>if (a<b) {}</script><p>x</p></html>").unwrap();
        assert_eq!(tree.text_content(find(&tree, "script")), "if (a<b) {}");
        assert_eq!(child_names(&tree, tree.document_element()), vec!["script", "p"]);
    }

    #[test]
    fn test_descendants_pre_order() {
        let tree = Tree::parse("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<_> = tree
            .descendants(tree.root())
            .filter_map(|id| tree.name(id))
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_stops_after_document_element() {
        // The broken tag after the root is never scanned
        let tree = Tree::parse("<a>ok</a><b x=\"unterminated").unwrap();
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Tree::parse("").unwrap_err(), ParseError::Empty);
        assert_eq!(Tree::parse(" \n\t").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_no_root_element() {
        assert_eq!(Tree::parse("just text").unwrap_err(), ParseError::NoRootElement);
        assert_eq!(Tree::parse("<!-- only -->").unwrap_err(), ParseError::NoRootElement);
    }

    #[test]
    fn test_malformed_tag() {
        assert_eq!(
            Tree::parse("<ht<ml>><body>Invalid").unwrap_err(),
            ParseError::UnexpectedCharInTag { ch: '<', position: 3 }
        );
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            Tree::parse("<a href=\"x>text</a>"),
            Err(ParseError::UnterminatedQuote { .. })
        ));
    }
}
