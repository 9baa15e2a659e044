//! Text renderings of a [`Silmaril`]: as a tree and as a stack of levels.

use std::fmt::Display;

use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeId, Silmaril};

pub trait TreeNodeConvert {
    /// Builds a printable tree; `show_index` labels nodes with `(depth:index)`.
    fn to_tree_string(&self, show_index: bool) -> Tree<String>;
}

impl<T: Display> TreeNodeConvert for Silmaril<T> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, show_index: bool) -> Tree<String> {
        let label = |id: NodeId| {
            self.node(id)
                .map(|node| {
                    if show_index {
                        format!("{node:#}")
                    } else {
                        node.to_string()
                    }
                })
                .unwrap_or_default()
        };

        fn build_tree<U: Display>(
            silmaril: &Silmaril<U>,
            node_idx: NodeId,
            label: &dyn Fn(NodeId) -> String,
        ) -> Tree<String> {
            let leaves = silmaril
                .node(node_idx)
                .map(|node| node.children())
                .unwrap_or_default()
                .iter()
                .map(|&child| build_tree(silmaril, child, label));
            Tree::new(label(node_idx)).with_leaves(leaves)
        }

        match self.root_id() {
            Some(root) => build_tree(self, root, &label),
            None => Tree::new("Empty silmaril".to_string()),
        }
    }
}

/// One `LEVEL d: [..]` line per depth, in depth order.
pub fn render_levels<T: Display>(silmaril: &Silmaril<T>, show_index: bool) -> String {
    if silmaril.levels().is_empty() {
        return "Empty silmaril".to_string();
    }
    silmaril
        .levels()
        .keys()
        .map(|&depth| {
            let nodes = silmaril.get_level_nodes(depth).unwrap_or_default();
            let values = nodes
                .iter()
                .map(|node| {
                    if show_index {
                        format!("{node:#}")
                    } else {
                        node.to_string()
                    }
                })
                .join(", ");
            format!("LEVEL {depth}: [{values}]")
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Silmaril<i32> {
        let mut s = Silmaril::new();
        s.add_nodes([1, 2, 3], None);
        s.add_nodes([4, 5], Some((1, 1)));
        s
    }

    #[test]
    fn test_to_tree_string() {
        let rendered = sample().to_tree_string(false).to_string();
        let expected = "1\n├── 2\n└── 3\n    ├── 4\n    └── 5\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_to_tree_string_with_index() {
        let rendered = sample().to_tree_string(true).to_string();
        assert!(rendered.starts_with("1 (0:0)\n"));
        assert!(rendered.contains("5 (2:1)"));
    }

    #[test]
    fn test_to_tree_string_empty() {
        let s: Silmaril<i32> = Silmaril::new();
        assert_eq!(s.to_tree_string(false).to_string(), "Empty silmaril\n");
    }

    #[test]
    fn test_render_levels() {
        let rendered = render_levels(&sample(), false);
        assert_eq!(rendered, "LEVEL 0: [1]\nLEVEL 1: [2, 3]\nLEVEL 2: [4, 5]");
    }
}
