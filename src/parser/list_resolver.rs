//! Canonical list id resolution.
//!
//! List elements reference their parent by id, and nothing in the format
//! stops those references from forming cycles or pointing nowhere. Every
//! element is resolved to the id of the topmost ancestor it can reach. The
//! walk is iterative and carries a visited set, so a cycle is cut where it
//! closes: the element reached twice loses its parent and becomes the root.

use std::collections::HashSet;

use crate::model::ListElements;

/// Resolve the canonical list id of every element in place.
pub fn resolve_list_ids(elements: &mut ListElements) {
    let ids: Vec<u32> = elements.keys().copied().collect();
    for id in ids {
        resolve_one(elements, id);
    }
}

/// Resolve a single element, returning its canonical id.
///
/// Returns `None` only when `id` is not in the map.
pub fn resolve_one(elements: &mut ListElements, id: u32) -> Option<u32> {
    let first = elements.get(&id)?;
    if let Some(list_id) = first.list_id {
        return Some(list_id);
    }

    let mut path: Vec<u32> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();
    let mut current = id;

    let root = loop {
        let Some(element) = elements.get(&current) else {
            // Dangling parent: the last element on the path is the top.
            match path.last() {
                Some(&last) => break last,
                None => return None,
            }
        };
        if let Some(list_id) = element.list_id {
            break list_id;
        }
        if !seen.insert(current) {
            log::debug!("list element {} closes a parent cycle, detaching it", current);
            if let Some(element) = elements.get_mut(&current) {
                element.parent_id = None;
            }
            break current;
        }
        let parent_id = element.parent_id;
        path.push(current);
        match parent_id {
            Some(parent) if parent != current => current = parent,
            Some(_) => {
                if let Some(element) = elements.get_mut(&current) {
                    element.parent_id = None;
                }
                break current;
            }
            None => break current,
        }
    };

    for elem_id in path {
        if let Some(element) = elements.get_mut(&elem_id) {
            element.list_id = Some(root);
        }
    }
    Some(root)
}

/// Number of levels from the element up to its root, counting itself.
///
/// Stops on cycles and dangling parents.
pub fn list_depth(elements: &ListElements, id: u32) -> u32 {
    let mut depth = 0;
    let mut seen = HashSet::new();
    let mut current = Some(id);
    while let Some(cur) = current {
        if !seen.insert(cur) {
            break;
        }
        let Some(element) = elements.get(&cur) else {
            break;
        };
        depth += 1;
        current = element.parent_id;
    }
    depth.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListElement, ListKind};

    fn element(id: u32, parent: Option<u32>) -> ListElement {
        ListElement::new(id, parent, ListKind::from_type(Some(0)))
    }

    fn build(pairs: &[(u32, Option<u32>)]) -> ListElements {
        pairs.iter().map(|&(id, p)| (id, element(id, p))).collect()
    }

    #[test]
    fn test_roots_resolve_to_themselves() {
        let mut elements = build(&[(1, None), (5, None)]);
        resolve_list_ids(&mut elements);
        assert_eq!(elements[&1].list_id, Some(1));
        assert_eq!(elements[&5].list_id, Some(5));
    }

    #[test]
    fn test_forest_resolves_to_roots() {
        let mut elements = build(&[
            (1, None),
            (2, Some(1)),
            (3, Some(2)),
            (10, None),
            (11, Some(10)),
            (4, Some(3)),
        ]);
        resolve_list_ids(&mut elements);
        for id in [1, 2, 3, 4] {
            assert_eq!(elements[&id].list_id, Some(1), "element {}", id);
        }
        assert_eq!(elements[&10].list_id, Some(10));
        assert_eq!(elements[&11].list_id, Some(10));
    }

    #[test]
    fn test_child_before_parent_in_key_order() {
        // 2 is visited first but its root is 7
        let mut elements = build(&[(2, Some(7)), (7, None)]);
        resolve_list_ids(&mut elements);
        assert_eq!(elements[&2].list_id, Some(7));
        assert_eq!(elements[&7].list_id, Some(7));
    }

    #[test]
    fn test_two_cycle_terminates() {
        let mut elements = build(&[(1, Some(2)), (2, Some(1))]);
        resolve_list_ids(&mut elements);
        assert_eq!(elements[&1].list_id, Some(1));
        assert_eq!(elements[&2].list_id, Some(1));
        assert_eq!(elements[&1].parent_id, None);
        assert_eq!(elements[&2].parent_id, Some(1));
    }

    #[test]
    fn test_long_cycle_with_tail() {
        // 9 -> 1 -> 2 -> 3 -> 1
        let mut elements = build(&[(9, Some(1)), (1, Some(2)), (2, Some(3)), (3, Some(1))]);
        resolve_list_ids(&mut elements);
        for element in elements.values() {
            assert!(element.list_id.is_some());
        }
        let root = elements[&9].list_id.unwrap();
        assert!(elements.values().all(|e| e.list_id == Some(root)));
    }

    #[test]
    fn test_self_parent() {
        let mut elements = build(&[(4, Some(4))]);
        resolve_list_ids(&mut elements);
        assert_eq!(elements[&4].list_id, Some(4));
        assert_eq!(elements[&4].parent_id, None);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let mut elements = build(&[(3, Some(42)), (4, Some(3))]);
        resolve_list_ids(&mut elements);
        assert_eq!(elements[&3].list_id, Some(3));
        assert_eq!(elements[&4].list_id, Some(3));
    }

    #[test]
    fn test_resolve_missing_id() {
        let mut elements = build(&[(1, None)]);
        assert_eq!(resolve_one(&mut elements, 99), None);
    }

    #[test]
    fn test_list_depth() {
        let elements = build(&[(1, None), (2, Some(1)), (3, Some(2)), (8, Some(9)), (9, Some(8))]);
        assert_eq!(list_depth(&elements, 1), 1);
        assert_eq!(list_depth(&elements, 3), 3);
        assert_eq!(list_depth(&elements, 8), 2);
        assert_eq!(list_depth(&elements, 77), 1);
    }
}
