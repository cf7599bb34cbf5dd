pub mod inline;
pub mod model;
pub mod normalize;

// Re-export key types for easier usage
pub use model::{Mark, MarkKind, Node, NodeError, NodeKind};
pub use normalize::{
    NormalizeOptions, normalize, normalize_str, normalize_str_with, normalize_with,
};
