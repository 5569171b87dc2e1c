//! Execution Strategy Module
//!
//! - Sequential: plain iteration on the calling thread
//! - Parallel: Rayon work-stealing over independent units (queries, documents)
//!
//! Both return results in input order, so callers merge identically.

pub mod parallel;

pub use parallel::{evaluate_parallel, map_units};
