//! Tree with a per-depth index: every node is reachable both through its
//! parent and through its `(depth, index)` coordinate.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeId, PostOrderIterator, SilNode, TreeArena, TreeIterator};
use crate::domain::error::{SilmarilError, SilmarilResult};

/// Rooted N-ary tree whose nodes are also indexed level by level.
///
/// The arena owns the nodes; `levels` maps each depth to the ordered handles of
/// all nodes at that depth, across all parents, in insertion order. Both views
/// are updated together by every mutating operation, and each node's `index`
/// always equals its position in its level.
#[derive(Debug, Clone)]
pub struct Silmaril<T> {
    tree: TreeArena<T>,
    levels: BTreeMap<usize, Vec<NodeId>>,
}

impl<T> Default for Silmaril<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Silmaril<T> {
    pub fn new() -> Self {
        Self {
            tree: TreeArena::new(),
            levels: BTreeMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn root(&self) -> Option<&SilNode<T>> {
        self.tree.root().and_then(|r| self.tree.get_node(r))
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// The full level map. Read-only: changing levels bypasses the
    /// structure's bookkeeping.
    pub fn levels(&self) -> &BTreeMap<usize, Vec<NodeId>> {
        &self.levels
    }

    /// The underlying arena.
    pub fn tree(&self) -> &TreeArena<T> {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> Option<&SilNode<T>> {
        self.tree.get_node(id)
    }

    /// Handles of all nodes at `depth`, left to right.
    #[instrument(level = "trace", skip(self))]
    pub fn level_ids(&self, depth: usize) -> Option<&[NodeId]> {
        self.levels.get(&depth).map(Vec::as_slice)
    }

    /// All nodes at `depth`, left to right.
    ///
    /// `None` if nothing was ever placed at that depth; a level emptied by
    /// removals is returned as an empty vector.
    #[instrument(level = "trace", skip(self))]
    pub fn get_level_nodes(&self, depth: usize) -> Option<Vec<&SilNode<T>>> {
        self.level_ids(depth).map(|ids| {
            ids.iter()
                .filter_map(|&id| self.tree.get_node(id))
                .collect()
        })
    }

    /// Values at `depth`, left to right.
    pub fn level_values(&self, depth: usize) -> Option<Vec<&T>> {
        self.get_level_nodes(depth)
            .map(|nodes| nodes.into_iter().map(SilNode::value).collect())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node_id(&self, depth: usize, index: usize) -> Option<NodeId> {
        self.levels.get(&depth)?.get(index).copied()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, depth: usize, index: usize) -> Option<&SilNode<T>> {
        self.node_id(depth, index).and_then(|id| self.tree.get_node(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<&SilNode<T>> {
        self.node(id)?.parent.and_then(|p| self.tree.get_node(p))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &SilNode<T>> + '_ {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&c| self.tree.get_node(c))
    }

    /// Left neighbour on the same level, regardless of parent.
    pub fn prev_neighbor(&self, id: NodeId) -> Option<&SilNode<T>> {
        let node = self.node(id)?;
        let index = node.index.checked_sub(1)?;
        self.get_node(node.depth, index)
    }

    /// Right neighbour on the same level, regardless of parent.
    pub fn next_neighbor(&self, id: NodeId) -> Option<&SilNode<T>> {
        let node = self.node(id)?;
        self.get_node(node.depth, node.index + 1)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of non-empty levels.
    pub fn height(&self) -> usize {
        self.levels.values().filter(|l| !l.is_empty()).count()
    }

    /// Pre-order, left to right.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        self.tree.iter()
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        self.tree.iter_postorder()
    }

    pub fn leaf_nodes(&self) -> Vec<&SilNode<T>> {
        self.tree
            .leaf_nodes()
            .into_iter()
            .filter_map(|id| self.tree.get_node(id))
            .collect()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Adds `value` as a child of the node at `dest`.
    ///
    /// When `dest` is `None` or does not resolve, the node is attached to the
    /// root; on an empty structure it becomes the root.
    #[instrument(level = "debug", skip(self, value))]
    pub fn add_node(&mut self, value: T, dest: Option<(usize, usize)>) -> NodeId {
        let Some(root) = self.tree.root() else {
            let id = self.tree.insert_node(value, None, None);
            self.levels.clear();
            self.insert_into_level(0, 0, id);
            debug!("Created root");
            return id;
        };

        let target = dest.and_then(|(depth, index)| self.node_id(depth, index));
        if target.is_none() && dest.is_some() {
            debug!(?dest, "Destination not found, attaching to root");
        }
        let parent = target.unwrap_or(root);

        let id = self.tree.insert_node(value, Some(parent), None);
        let depth = self.tree.get_node(parent).map_or(1, |p| p.depth + 1);
        let siblings = self.tree.get_node(parent).map_or(1, |p| p.children.len());
        let position = match (target, self.levels.get(&depth)) {
            (Some(_), Some(level)) => level.len(),
            _ => siblings.saturating_sub(1),
        };
        self.insert_into_level(depth, position, id);
        id
    }

    /// Adds every value in order under the same destination.
    #[instrument(level = "debug", skip(self, values))]
    pub fn add_nodes<I>(&mut self, values: I, dest: Option<(usize, usize)>) -> Vec<NodeId>
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .map(|value| self.add_node(value, dest))
            .collect()
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Removes the node at `(depth, index)` together with its subtree and
    /// returns its value. Removing the root empties the structure.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, depth: usize, index: usize) -> SilmarilResult<T> {
        let target = self
            .node_id(depth, index)
            .ok_or(SilmarilError::NotFound { depth, index })?;

        if self.tree.root() == Some(target) {
            let value = self
                .tree
                .remove_subtree(target)
                .ok_or(SilmarilError::NotFound { depth, index })?;
            self.tree.clear();
            self.levels.clear();
            debug!("Removed root, structure reset");
            return Ok(value);
        }

        let doomed: Vec<NodeId> = self.tree.descendants(target).collect();
        self.drop_from_levels(&doomed);
        let value = self.tree.remove_subtree(target).ok_or_else(|| {
            SilmarilError::InvariantViolation(format!(
                "node at depth {depth}, index {index} indexed but missing from tree"
            ))
        })?;
        debug!(removed = doomed.len(), "Removed node with subtree");
        Ok(value)
    }

    /// Performs `end - start` removals, each taking whatever node is currently
    /// first at `depth`. Stops early when the level runs out.
    ///
    /// Returns the number of nodes removed from `depth`.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_nodes(&mut self, depth: usize, start: usize, end: usize) -> usize {
        let count = end.saturating_sub(start);
        let mut removed = 0;
        while removed < count && self.remove_node(depth, 0).is_ok() {
            removed += 1;
        }
        removed
    }

    /// Removes every node at `depth` (and everything below them).
    ///
    /// Returns the number of nodes removed from `depth`. The cleared level
    /// stays as an empty sequence, except for depth 0: removing the root
    /// resets the structure, so `get_level_nodes(0)` is `None` afterwards.
    #[instrument(level = "debug", skip(self))]
    pub fn clear_level(&mut self, depth: usize) -> usize {
        let mut removed = 0;
        while self.remove_node(depth, 0).is_ok() {
            removed += 1;
        }
        removed
    }

    // ------------------------------------------------------------------
    // Replacement
    // ------------------------------------------------------------------

    /// Replaces the node at `(depth, index)` and its subtree with a node built
    /// from the first value, whose children are the remaining values.
    ///
    /// The new node takes the old node's parent, child slot and level
    /// position.
    #[instrument(level = "debug", skip(self, values))]
    pub fn replace_node<I>(&mut self, depth: usize, index: usize, values: I) -> SilmarilResult<NodeId>
    where
        I: IntoIterator<Item = T>,
    {
        let target = self
            .node_id(depth, index)
            .ok_or(SilmarilError::NotFound { depth, index })?;
        let mut values = values.into_iter();
        let head = values
            .next()
            .ok_or(SilmarilError::EmptyReplacement { depth, index })?;

        let parent = self.tree.get_node(target).and_then(|n| n.parent);
        let slot = parent.and_then(|p| self.tree.child_slot(p, target));
        self.remove_node(depth, index)?;

        let replacement = self.tree.insert_node(head, parent, slot);
        self.insert_into_level(depth, index, replacement);

        let child_depth = depth + 1;
        for value in values {
            let child = self.tree.insert_node(value, Some(replacement), None);
            let position = self.levels.get(&child_depth).map_or(0, Vec::len);
            self.insert_into_level(child_depth, position, child);
        }
        debug!("Replaced node");
        Ok(replacement)
    }

    // ------------------------------------------------------------------
    // Level bookkeeping
    // ------------------------------------------------------------------

    /// Inserts `id` into the level sequence of `depth` at `position` (clamped)
    /// and renumbers the nodes from there on.
    fn insert_into_level(&mut self, depth: usize, position: usize, id: NodeId) {
        let level = self.levels.entry(depth).or_default();
        let position = position.min(level.len());
        level.insert(position, id);
        trace!(depth, position, "Inserted into level");
        self.renumber(depth, position);
    }

    /// Removes `ids` from their level sequences and renumbers every level
    /// that changed.
    fn drop_from_levels(&mut self, ids: &[NodeId]) {
        let mut depths: Vec<usize> = ids
            .iter()
            .filter_map(|&id| self.tree.get_node(id))
            .map(|n| n.depth)
            .collect();
        depths.sort_unstable();
        depths.dedup();

        let doomed: HashSet<NodeId> = ids.iter().copied().collect();
        for depth in depths {
            let Some(level) = self.levels.get_mut(&depth) else {
                continue;
            };
            let first = level.iter().position(|id| doomed.contains(id)).unwrap_or(level.len());
            level.retain(|id| !doomed.contains(id));
            self.renumber(depth, first);
        }
    }

    /// Restores `index == position` for the nodes at `depth` from `from` on.
    fn renumber(&mut self, depth: usize, from: usize) {
        let Some(level) = self.levels.get(&depth) else {
            return;
        };
        for (position, &id) in level.iter().enumerate().skip(from) {
            if let Some(node) = self.tree.get_node_mut(id) {
                node.index = position;
            }
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Verifies that the tree view and the level view describe the same
    /// nodes, that depths follow parent links and that indices are dense.
    #[instrument(level = "debug", skip(self))]
    pub fn check_invariants(&self) -> SilmarilResult<()> {
        let violation =
            |msg: String| -> SilmarilResult<()> { Err(SilmarilError::InvariantViolation(msg)) };

        if let Some(root) = self.root() {
            if root.depth != 0 || root.index != 0 || !root.is_root() {
                return violation(format!(
                    "root at ({}:{}) with parent {:?}",
                    root.depth, root.index, root.parent
                ));
            }
        } else if !self.levels.is_empty() || !self.tree.is_empty() {
            return violation("levels or arena populated without a root".into());
        }

        let mut indexed = HashSet::new();
        for (&depth, level) in &self.levels {
            for (position, &id) in level.iter().enumerate() {
                let Some(node) = self.tree.get_node(id) else {
                    return violation(format!("stale handle at ({depth}:{position})"));
                };
                if node.depth != depth || node.index != position {
                    return violation(format!(
                        "node at ({depth}:{position}) records ({}:{})",
                        node.depth, node.index
                    ));
                }
                if !indexed.insert(id) {
                    return violation(format!("node listed twice, again at ({depth}:{position})"));
                }
            }
        }

        let mut reachable = 0;
        for (id, node) in self.tree.iter() {
            reachable += 1;
            if !indexed.contains(&id) {
                return violation(format!("node ({}:{}) missing from levels", node.depth, node.index));
            }
            if let Some(parent) = node.parent.and_then(|p| self.tree.get_node(p)) {
                if parent.depth + 1 != node.depth {
                    return violation(format!(
                        "node ({}:{}) under parent at depth {}",
                        node.depth, node.index, parent.depth
                    ));
                }
            } else if self.tree.root() != Some(id) {
                return violation(format!("node ({}:{}) has no live parent", node.depth, node.index));
            }
        }
        if reachable != indexed.len() || reachable != self.tree.len() {
            return violation(format!(
                "{reachable} reachable, {} indexed, {} stored",
                indexed.len(),
                self.tree.len()
            ));
        }
        Ok(())
    }
}
