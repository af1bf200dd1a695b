//! Adaptive Gauss quadrature with resumable trees.
//!
//! `quadr` integrates real functions of one variable by recursively
//! bisecting the interval into a binary tree. Each node estimates its local
//! error by comparing a low-order and a high-order Gauss rule; nodes split
//! until the estimate falls below a per-level tolerance or a depth cap.
//! Intervals with an integrable endpoint singularity `|x - c|^{-alpha}`
//! (`0 <= alpha < 1`) use a transformed Gauss-Laguerre rule that never
//! samples the singular point.
//!
//! The tree itself is the result: it aggregates to `(integral, error)`,
//! serializes to JSON, and reloads without re-evaluating the integrand.
//!
//! # Components
//!
//! - [`AdaptiveGaussTree`] - build, aggregate, save, load
//! - [`TreeOptions`] / [`TreeMetadata`] - construction parameters and
//!   descriptive metadata with an append-only update log
//! - [`RuleProvider`] - pluggable source of quadrature tables, with built-in
//!   Newton-Raphson providers [`LegendreRules`] and [`LaguerreRules`]
//! - [`BatchQuadrature`] - one tree per combination of a parameter grid
//!
//! # Example
//!
//! ```
//! use quadr::{AdaptiveGaussTree, TreeMetadata, TreeOptions};
//!
//! // Integral of x^(-1/2) over [0, 1] = 2, singular at the lower bound.
//! let options = TreeOptions {
//!     a_singular: true,
//!     alpha_a: 0.5,
//!     ..Default::default()
//! };
//! let tree = AdaptiveGaussTree::new(
//!     |x: f64| x.powf(-0.5),
//!     0.0,
//!     1.0,
//!     options,
//!     TreeMetadata::named("inverse sqrt"),
//! )
//! .unwrap();
//!
//! let (integral, error) = tree.integral_and_error();
//! assert!((integral - 2.0).abs() < 1e-3);
//! assert!(error.is_finite());
//! ```

pub mod batch;
pub mod codec;
pub mod error;
pub mod rules;
pub mod tree;

pub use batch::{BatchJob, BatchQuadrature, BatchRecord, BatchRun, ParamGrid, ParamValue};
pub use codec::{NodeRecord, RootsRecord, TreeRecord};
pub use error::{QuadError, QuadResult};
pub use rules::{LaguerreRules, LegendreRules, RuleProvider, RuleSet, RuleTable};
pub use tree::{
    select_rule, AdaptiveGaussTree, RuleKind, TreeMetadata, TreeNode, TreeOptions, UpdateEntry,
};
