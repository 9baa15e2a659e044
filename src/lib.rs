//! A rooted N-ary tree whose nodes are also indexed level by level, so any
//! node can be addressed by its `(depth, index)` coordinate.
//!
//! ```
//! use silmaril::Silmaril;
//!
//! let mut silmaril = Silmaril::new();
//! silmaril.add_nodes([1, 2, 3, 4], None);
//! silmaril.add_nodes([5, 6, 7], Some((1, 0)));
//! assert_eq!(silmaril.get_node(2, 1).map(|n| *n.value()), Some(6));
//!
//! silmaril.remove_node(1, 0).unwrap();
//! assert_eq!(silmaril.level_values(1).unwrap(), vec![&3, &4]);
//! assert!(silmaril.get_level_nodes(2).unwrap().is_empty());
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use domain::{NodeId, SilNode, Silmaril, SilmarilError, SilmarilResult};
