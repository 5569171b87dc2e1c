//! Parallel Batch Execution
//!
//! Uses Rayon to spread independent units of work across the global pool.

use crate::dom::Tree;
use crate::xpath::{evaluate, CompiledQuery};
use rayon::prelude::*;

/// Apply `f` to every item, in parallel when `parallel` is set
///
/// Results come back in the order of `items` either way.
pub fn map_units<'a, T, R, F>(items: &'a [T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&'a T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

/// Evaluate several compiled queries against one tree in parallel
///
/// Returns `(query index, value)` for every query that matched.
pub fn evaluate_parallel(tree: &Tree, queries: &[&CompiledQuery]) -> Vec<(usize, String)> {
    queries
        .par_iter()
        .enumerate()
        .filter_map(|(index, query)| evaluate(query, tree).map(|value| (index, value)))
        .collect()
}
