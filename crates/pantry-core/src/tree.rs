//! # Tree Projector
//!
//! Turns a flat, parent-referencing collection into a forest for display.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input (store order)           Forest                                   │
//! │                                                                         │
//! │  A  id 1  parent -             A                                        │
//! │  B  id 2  parent 1      ──►    └── B                                    │
//! │  C  id 3  parent -             C                                        │
//! │  D  id 4  parent 9             D   (parent 9 missing → root)            │
//! │                                                                         │
//! │  Pass 1: id → position lookup                                           │
//! │  Pass 2: no parent        → root                                        │
//! │          parent found     → child of that parent                        │
//! │          parent missing   → root (never dropped)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Roots keep the input order of root entities and every child list keeps the
//! input order of the entities pointing at that parent.
//!
//! No cycle breaking happens here. The category form never offers an entity
//! as its own parent; entities caught in a parent cycle anyway are unreachable
//! from every root and are left out with a warning instead of looping.

use std::collections::HashMap;

use tracing::warn;

use crate::types::EntityId;

// =============================================================================
// Hierarchical Trait
// =============================================================================

/// An entity that may reference a parent in the same collection.
pub trait Hierarchical {
    fn node_id(&self) -> EntityId;
    fn parent_ref(&self) -> Option<EntityId>;
}

// =============================================================================
// Tree Node
// =============================================================================

/// An entity together with the entities that reference it as parent.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub entity: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Builds the forest for `entities`.
///
/// ## Example
/// ```rust
/// use pantry_core::tree::{build_forest, Hierarchical};
///
/// #[derive(Clone)]
/// struct Cat(i64, Option<i64>);
///
/// impl Hierarchical for Cat {
///     fn node_id(&self) -> i64 { self.0 }
///     fn parent_ref(&self) -> Option<i64> { self.1 }
/// }
///
/// let forest = build_forest(&[Cat(1, None), Cat(2, Some(1)), Cat(3, None)]);
/// assert_eq!(forest.len(), 2);
/// assert_eq!(forest[0].children[0].entity.0, 2);
/// ```
pub fn build_forest<T: Hierarchical + Clone>(entities: &[T]) -> Vec<TreeNode<T>> {
    // Pass 1: id → position. With duplicate ids the first entity wins.
    let mut position_of: HashMap<EntityId, usize> = HashMap::with_capacity(entities.len());
    for (pos, entity) in entities.iter().enumerate() {
        position_of.entry(entity.node_id()).or_insert(pos);
    }

    // Pass 2: attach every entity to its parent or to the root list
    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); entities.len()];
    for (pos, entity) in entities.iter().enumerate() {
        match entity
            .parent_ref()
            .and_then(|parent| position_of.get(&parent).copied())
        {
            Some(parent) => children[parent].push(pos),
            None => roots.push(pos),
        }
    }

    // Pre-order walk from the roots. Each position sits in exactly one list,
    // so every reachable entity is visited once.
    let mut preorder: Vec<usize> = Vec::with_capacity(entities.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(pos) = stack.pop() {
        preorder.push(pos);
        stack.extend(children[pos].iter().rev().copied());
    }

    if preorder.len() < entities.len() {
        warn!(
            omitted = entities.len() - preorder.len(),
            "Entities on a parent cycle are unreachable and were left out of the tree"
        );
    }

    // Assemble bottom-up: in reverse pre-order every child is built before
    // its parent.
    let mut built: Vec<Option<TreeNode<T>>> = (0..entities.len()).map(|_| None).collect();
    for &pos in preorder.iter().rev() {
        let node_children = children[pos]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[pos] = Some(TreeNode {
            entity: entities[pos].clone(),
            children: node_children,
        });
    }

    roots
        .into_iter()
        .filter_map(|pos| built[pos].take())
        .collect()
}

/// Total number of nodes in a forest.
pub fn node_count<T>(forest: &[TreeNode<T>]) -> usize {
    forest.iter().map(TreeNode::size).sum()
}

/// Depth-first `(entity, depth)` rows for indented rendering.
pub fn flatten<T>(forest: &[TreeNode<T>]) -> Vec<(&T, usize)> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&TreeNode<T>, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        rows.push((&node.entity, depth));
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    rows
}

/// Entities offered as parent when editing `editing` (or creating, if `None`).
///
/// The edited entity itself is excluded so it can never become its own parent.
pub fn parent_candidates<T: Hierarchical>(entities: &[T], editing: Option<EntityId>) -> Vec<&T> {
    entities
        .iter()
        .filter(|entity| Some(entity.node_id()) != editing)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: EntityId,
        parent: Option<EntityId>,
        label: &'static str,
    }

    impl Hierarchical for Node {
        fn node_id(&self) -> EntityId {
            self.id
        }

        fn parent_ref(&self) -> Option<EntityId> {
            self.parent
        }
    }

    fn n(id: EntityId, parent: Option<EntityId>, label: &'static str) -> Node {
        Node { id, parent, label }
    }

    fn labels(forest: &[TreeNode<Node>]) -> Vec<&'static str> {
        forest.iter().map(|node| node.entity.label).collect()
    }

    #[test]
    fn test_roots_and_children_keep_input_order() {
        let items = vec![n(1, None, "A"), n(2, Some(1), "B"), n(3, None, "C")];
        let forest = build_forest(&items);

        assert_eq!(labels(&forest), vec!["A", "C"]);
        assert_eq!(labels(&forest[0].children), vec!["B"]);
        assert!(forest[1].is_leaf());
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let forest = build_forest(&[n(1, Some(5), "orphan")]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].entity.id, 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_every_entity_appears_exactly_once() {
        let items = vec![
            n(10, Some(20), "child before parent"),
            n(20, None, "root"),
            n(30, Some(99), "dangling"),
            n(40, Some(10), "grandchild"),
            n(50, Some(20), "second child"),
            n(60, None, "root 2"),
        ];
        let forest = build_forest(&items);

        assert_eq!(node_count(&forest), items.len());
        assert_eq!(labels(&forest), vec!["root", "dangling", "root 2"]);
        assert_eq!(
            labels(&forest[0].children),
            vec!["child before parent", "second child"]
        );
        assert_eq!(labels(&forest[0].children[0].children), vec!["grandchild"]);
    }

    #[test]
    fn test_empty_input() {
        let forest = build_forest::<Node>(&[]);
        assert!(forest.is_empty());
        assert_eq!(node_count(&forest), 0);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let items: Vec<Node> = (1..=1_000)
            .map(|id| n(id, if id == 1 { None } else { Some(id - 1) }, "link"))
            .collect();
        let forest = build_forest(&items);
        assert_eq!(forest.len(), 1);
        assert_eq!(flatten(&forest).len(), 1_000);
    }

    #[test]
    fn test_cycle_terminates_without_those_entities() {
        // Precondition violation: 2 → 3 → 2. Must not loop.
        let items = vec![n(1, None, "root"), n(2, Some(3), "x"), n(3, Some(2), "y")];
        let forest = build_forest(&items);
        assert_eq!(labels(&forest), vec!["root"]);
        assert_eq!(node_count(&forest), 1);
    }

    #[test]
    fn test_self_parent_is_unreachable() {
        let forest = build_forest(&[n(1, Some(1), "self")]);
        assert!(forest.is_empty());
    }

    #[test]
    fn test_duplicate_ids_each_get_a_node() {
        let items = vec![n(1, None, "first"), n(1, None, "second"), n(2, Some(1), "child")];
        let forest = build_forest(&items);
        assert_eq!(labels(&forest), vec!["first", "second"]);
        assert_eq!(labels(&forest[0].children), vec!["child"]);
        assert_eq!(node_count(&forest), 3);
    }

    #[test]
    fn test_flatten_depths() {
        let items = vec![
            n(1, None, "A"),
            n(2, None, "B"),
            n(3, Some(1), "A1"),
            n(4, Some(1), "A2"),
            n(5, Some(3), "A1a"),
        ];
        let forest = build_forest(&items);
        let rows: Vec<(&str, usize)> = flatten(&forest)
            .into_iter()
            .map(|(node, depth)| (node.label, depth))
            .collect();
        assert_eq!(
            rows,
            vec![("A", 0), ("A1", 1), ("A1a", 2), ("A2", 1), ("B", 0)]
        );
    }

    #[test]
    fn test_projection_does_not_touch_input() {
        let items = vec![n(2, Some(1), "B"), n(1, None, "A")];
        let before = items.clone();
        let _ = build_forest(&items);
        assert_eq!(items, before);
    }

    #[test]
    fn test_parent_candidates_exclude_edited_entity() {
        let items = vec![n(1, None, "A"), n(2, Some(1), "B"), n(3, None, "C")];

        let editing: Vec<EntityId> = parent_candidates(&items, Some(2))
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(editing, vec![1, 3]);

        assert_eq!(parent_candidates(&items, None).len(), 3);
    }
}
