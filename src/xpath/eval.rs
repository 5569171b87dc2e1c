//! Query Evaluation Engine
//!
//! Evaluates compiled queries against a parsed tree. Evaluation never fails:
//! no match, an unknown name and an empty value all produce `None`.

use super::axes::{navigate, NameMatch};
use super::compiler::{CompiledQuery, NameTest};
use crate::dom::{NodeId, Tree};

/// Evaluate a compiled query, returning the first match's value
///
/// With an attribute selector the value comes from the first candidate (in
/// document order) defining that attribute; otherwise it is the text content
/// of the first candidate.
#[must_use = "query evaluation result should be used"]
pub fn evaluate(query: &CompiledQuery, tree: &Tree) -> Option<String> {
    let candidates = select(query, tree)?;

    let value = match query.attribute() {
        Some(name) => {
            let name_id = tree.lookup_name(name)?;
            candidates
                .iter()
                .find_map(|&id| tree.attribute_by_id(id, name_id))?
                .to_string()
        }
        None => tree.text_content(*candidates.first()?),
    };

    (!value.is_empty()).then_some(value)
}

/// Run the element steps, returning the final candidate set in document order
pub fn select(query: &CompiledQuery, tree: &Tree) -> Option<Vec<NodeId>> {
    let mut candidates = vec![tree.root()];

    for step in query.steps() {
        let test = match &step.test {
            NameTest::Any => NameMatch::Any,
            // A name the document never uses cannot match
            NameTest::Name(name) => NameMatch::Id(tree.lookup_name(name)?),
        };

        candidates = navigate(tree, &candidates, step.axis, test);
        if candidates.is_empty() {
            return None;
        }
    }

    Some(candidates)
}
