//! Tree node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

use super::strings::NameId;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic root holding the document element
    Root,
    /// Element node
    Element,
    /// Text content (CDATA is folded into text)
    Text,
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Interned element name, 0 for root and text nodes
    pub name_id: NameId,
    /// Start of attributes in the attribute arena (for elements)
    pub attr_start: u32,
    /// Number of attributes
    pub attr_count: u32,
    /// Text content (text nodes only)
    pub text: Option<String>,
}

impl Node {
    fn with_kind(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Node {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id: 0,
            attr_start: 0,
            attr_count: 0,
            text: None,
        }
    }

    /// Create the synthetic root node
    pub fn root() -> Self {
        Self::with_kind(NodeKind::Root, None)
    }

    /// Create a new element node
    pub fn element(name_id: NameId, parent: NodeId) -> Self {
        Node {
            name_id,
            ..Self::with_kind(NodeKind::Element, Some(parent))
        }
    }

    /// Create a new text node
    pub fn text(content: String, parent: NodeId) -> Self {
        Node {
            text: Some(content),
            ..Self::with_kind(NodeKind::Text, Some(parent))
        }
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this is a text node
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Check if this node has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Stored attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttribute {
    /// Interned attribute name
    pub name_id: NameId,
    /// Decoded value
    pub value: String,
}
