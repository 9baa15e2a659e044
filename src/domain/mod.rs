//! Domain layer: the arena tree and its per-level index
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod silmaril;

pub use arena::{NodeId, PostOrderIterator, SilNode, TreeArena, TreeIterator};
pub use error::{SilmarilError, SilmarilResult};
pub use silmaril::Silmaril;
