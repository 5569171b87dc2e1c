//! Step Axes
//!
//! Both axes return element ids only. Node ids are assigned in pre-order,
//! so sorting a candidate set by id puts it in document order.

use super::compiler::Axis;
use crate::dom::{NameId, NodeId, Tree};

/// Resolved element name matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Id(NameId),
    Any,
}

/// Check whether a node is an element accepted by the matcher
#[inline]
pub fn matches(tree: &Tree, id: NodeId, test: NameMatch) -> bool {
    match tree.node(id) {
        Some(node) if node.is_element() => match test {
            NameMatch::Any => true,
            NameMatch::Id(name_id) => node.name_id == name_id,
        },
        _ => false,
    }
}

/// Navigate along an axis from every candidate, returning matches in document order
pub fn navigate(tree: &Tree, candidates: &[NodeId], axis: Axis, test: NameMatch) -> Vec<NodeId> {
    let mut result = Vec::new();
    match axis {
        Axis::Child => {
            for &context in candidates {
                result.extend(tree.children(context).filter(|&id| matches(tree, id, test)));
            }
        }
        Axis::DescendantOrSelf => {
            // A subtree is a contiguous id range ending at its last pre-order
            // node; sorted candidates inside the last walked range add nothing
            let mut covered_end: Option<NodeId> = None;
            for &context in candidates {
                if covered_end.is_some_and(|end| context <= end) {
                    continue;
                }
                let mut last = context;
                for id in std::iter::once(context).chain(tree.descendants(context)) {
                    last = id;
                    if matches(tree, id, test) {
                        result.push(id);
                    }
                }
                covered_end = Some(last);
            }
        }
    }
    result.sort_unstable();
    result.dedup();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree {
        Tree::parse("<a><b><c/><b/></b><c/></a>").unwrap()
    }

    fn names<'t>(tree: &'t Tree, ids: &[NodeId]) -> Vec<&'t str> {
        ids.iter().filter_map(|&id| tree.name(id)).collect()
    }

    #[test]
    fn test_child_axis() {
        let tree = tree();
        let found = navigate(&tree, &[tree.root()], Axis::Child, NameMatch::Any);
        assert_eq!(names(&tree, &found), vec!["a"]);
    }

    #[test]
    fn test_descendant_or_self_includes_self() {
        let tree = tree();
        let b = tree.lookup_name("b").unwrap();
        let outer = navigate(&tree, &[tree.root()], Axis::DescendantOrSelf, NameMatch::Id(b));
        assert_eq!(outer.len(), 2);

        // Nested b matches from both candidates but appears once
        let again = navigate(&tree, &outer, Axis::DescendantOrSelf, NameMatch::Id(b));
        assert_eq!(again, outer);
    }

    #[test]
    fn test_many_sibling_candidates() {
        let markup = format!("<ul>{}</ul>", "<li><a>x</a></li>".repeat(50_000));
        let tree = Tree::parse(&markup).unwrap();
        let li = tree.lookup_name("li").unwrap();
        let a = tree.lookup_name("a").unwrap();

        let items = navigate(&tree, &[tree.root()], Axis::DescendantOrSelf, NameMatch::Id(li));
        assert_eq!(items.len(), 50_000);
        let links = navigate(&tree, &items, Axis::DescendantOrSelf, NameMatch::Id(a));
        assert_eq!(links.len(), 50_000);
        assert!(links.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(links.iter().all(|&id| tree.name(id) == Some("a")));
    }

    #[test]
    fn test_nested_candidates_after_sibling() {
        // The second b starts after the first b's subtree ends
        let tree = Tree::parse("<r><b><c/></b><d><b><c/></b></d></r>").unwrap();
        let b = tree.lookup_name("b").unwrap();
        let c = tree.lookup_name("c").unwrap();
        let found = navigate(&tree, &[tree.root()], Axis::DescendantOrSelf, NameMatch::Any);
        let bs: Vec<_> = found.iter().copied().filter(|&id| matches(&tree, id, NameMatch::Id(b))).collect();
        assert_eq!(bs.len(), 2);
        let cs = navigate(&tree, &bs, Axis::DescendantOrSelf, NameMatch::Id(c));
        assert_eq!(cs.len(), 2);

        // r covers every later candidate
        let all = navigate(&tree, &found, Axis::DescendantOrSelf, NameMatch::Any);
        assert_eq!(all, found);
    }

    #[test]
    fn test_document_order() {
        let tree = tree();
        let found = navigate(&tree, &[tree.root()], Axis::DescendantOrSelf, NameMatch::Any);
        assert_eq!(names(&tree, &found), vec!["a", "b", "c", "b", "c"]);
    }

    #[test]
    fn test_root_never_matches() {
        let tree = tree();
        assert!(!matches(&tree, tree.root(), NameMatch::Any));
    }
}
