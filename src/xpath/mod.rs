//! Path Query Engine
//!
//! A small XPath subset:
//! - child (`/`) and descendant-or-self (`//`) steps
//! - element names and the `*` wildcard
//! - a trailing `@name` attribute selector
//!
//! Queries compile once into a [`CompiledQuery`] and evaluate against any
//! number of trees.

pub mod axes;
pub mod compiler;
pub mod eval;
pub mod lexer;

pub use compiler::{compile, Axis, CompiledQuery, NameTest, Step};
pub use eval::{evaluate, select};
