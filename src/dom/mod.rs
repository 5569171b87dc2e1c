//! DOM Module - Arena-based document tree
//!
//! Implements a compact tree representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for element/attribute names

pub mod node;
pub mod strings;
pub mod tree;

pub use node::{Node, NodeAttribute, NodeId, NodeKind};
pub use strings::{NameId, StringPool};
pub use tree::{ChildIter, DescendantIter, Tree};
