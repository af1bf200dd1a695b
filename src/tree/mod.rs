//! The adaptive quadrature tree: nodes, builder, metadata.

mod build;
mod metadata;
mod node;

pub use build::{AdaptiveGaussTree, TreeOptions};
pub use metadata::{TreeMetadata, UpdateEntry};
pub use node::{select_rule, RuleKind, TreeNode};
