use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

/// Stable handle to a node stored in a [`TreeArena`].
pub type NodeId = Index;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct SilNode<T> {
    value: T,
    /// Generation count from the root
    pub(crate) depth: usize,
    /// Position within the level sequence of `depth`
    pub(crate) index: usize,
    /// Index of parent node in the arena, None for the root
    pub(crate) parent: Option<NodeId>,
    /// Indices of child nodes in the arena, in insertion order
    pub(crate) children: Vec<NodeId>,
}

impl<T> SilNode<T> {
    fn new(value: T, depth: usize, parent: Option<NodeId>) -> Self {
        Self {
            value,
            depth,
            index: 0,
            parent,
            children: Vec::new(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// `{}` prints the value, `{:#}` appends the `(depth:index)` coordinate.
impl<T: fmt::Display> fmt::Display for SilNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{} ({}:{})", self.value, self.depth, self.index)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// Arena-based tree: the single owner of every node.
///
/// Parent and child links are stored as [`NodeId`] handles, so other views of
/// the same nodes (the level index in [`Silmaril`](crate::domain::Silmaril))
/// can refer to them without owning them.
#[derive(Debug, Clone)]
pub struct TreeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<SilNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<NodeId>,
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Inserts `value` below `parent` at child slot `slot` (appended when `None`
    /// or out of range).
    ///
    /// Without a live parent the node becomes the new root; any previous root
    /// must have been removed by the caller.
    #[instrument(level = "trace", skip(self, value))]
    pub fn insert_node(&mut self, value: T, parent: Option<NodeId>, slot: Option<usize>) -> NodeId {
        let parent = parent.filter(|&p| self.arena.contains(p));
        let depth = parent
            .and_then(|p| self.arena.get(p))
            .map_or(0, |p| p.depth + 1);
        let node_idx = self.arena.insert(SilNode::new(value, depth, parent));

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => {
                let slot = slot.map_or(parent.children.len(), |s| s.min(parent.children.len()));
                parent.children.insert(slot, node_idx);
            }
            None => self.root = Some(node_idx),
        }

        node_idx
    }

    /// Removes `idx` and its whole subtree, returning the value of `idx`.
    ///
    /// The node is detached from its parent first; removing the root empties
    /// the tree.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, idx: NodeId) -> Option<T> {
        let parent = self.arena.get(idx)?.parent;
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.retain(|&c| c != idx),
            None => self.root = None,
        }

        let doomed: Vec<NodeId> = self.descendants(idx).collect();
        for &child in doomed.iter().skip(1) {
            self.arena.remove(child);
        }
        debug!(removed = doomed.len(), "Removed subtree");
        self.arena.remove(idx).map(SilNode::into_value)
    }

    /// Position of `child` within the child list of `parent`.
    pub fn child_slot(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.get_node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: NodeId) -> Option<&SilNode<T>> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn get_node_mut(&mut self, idx: NodeId) -> Option<&mut SilNode<T>> {
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, idx: NodeId) -> bool {
        self.arena.contains(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order walk of the subtree rooted at `idx`, `idx` first.
    pub fn descendants(&self, idx: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        TreeIterator::new(self, Some(idx)).map(|(i, _)| i)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Number of generations below and including the root; 0 for empty trees.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: NodeId) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects all leaf nodes (nodes with no children), left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }
}

pub struct TreeIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>, start: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (NodeId, &'a SilNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        Self {
            arena,
            stack: arena.root().map(|root| (root, false)).into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (NodeId, &'a SilNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //      a
    //     / \
    //    b   c
    //    |
    //    d
    fn sample() -> (TreeArena<&'static str>, [NodeId; 4]) {
        let mut tree = TreeArena::new();
        let a = tree.insert_node("a", None, None);
        let b = tree.insert_node("b", Some(a), None);
        let c = tree.insert_node("c", Some(a), None);
        let d = tree.insert_node("d", Some(b), None);
        (tree, [a, b, c, d])
    }

    #[test]
    fn test_insert_node_sets_depth_and_links() {
        let (tree, [a, b, _, d]) = sample();
        assert_eq!(tree.root(), Some(a));
        assert_eq!(tree.get_node(d).unwrap().depth(), 2);
        assert_eq!(tree.get_node(d).unwrap().parent(), Some(b));
        assert_eq!(tree.get_node(a).unwrap().children().len(), 2);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_insert_node_at_slot() {
        let (mut tree, [a, b, c, _]) = sample();
        let e = tree.insert_node("e", Some(a), Some(1));
        assert_eq!(tree.get_node(a).unwrap().children(), &[b, e, c]);
        assert_eq!(tree.child_slot(a, c), Some(2));
    }

    #[test]
    fn test_iterators_order() {
        let (tree, _) = sample();
        let pre: Vec<_> = tree.iter().map(|(_, n)| *n.value()).collect();
        assert_eq!(pre, vec!["a", "b", "d", "c"]);
        let post: Vec<_> = tree.iter_postorder().map(|(_, n)| *n.value()).collect();
        assert_eq!(post, vec!["d", "b", "c", "a"]);
        let leaves: Vec<_> = tree
            .leaf_nodes()
            .into_iter()
            .map(|i| *tree.get_node(i).unwrap().value())
            .collect();
        assert_eq!(leaves, vec!["d", "c"]);
    }

    #[test]
    fn test_remove_subtree_detaches_and_drops_descendants() {
        let (mut tree, [a, b, c, d]) = sample();
        assert_eq!(tree.remove_subtree(b), Some("b"));
        assert!(!tree.contains(d));
        assert_eq!(tree.get_node(a).unwrap().children(), &[c]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_remove_root_empties_tree() {
        let (mut tree, [a, ..]) = sample();
        assert_eq!(tree.remove_subtree(a), Some("a"));
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.remove_subtree(a), None);
    }

    #[test]
    fn test_display_alternate_shows_coordinates() {
        let (tree, [_, _, _, d]) = sample();
        let node = tree.get_node(d).unwrap();
        assert_eq!(format!("{}", node), "d");
        assert_eq!(format!("{:#}", node), "d (2:0)");
    }
}
