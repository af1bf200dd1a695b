//! Quadrature rule families and the provider seam.
//!
//! Two rule families drive the adaptive tree:
//!
//! - **Standard** (Gauss-Legendre): affine-mapped onto each subinterval;
//!   optimal for smooth integrands.
//! - **Singular** (Gauss-Laguerre): an exponential substitution clustering
//!   samples toward an endpoint with an integrable singularity of known
//!   exponent.
//!
//! Tables come from a [`RuleProvider`]; the built-in [`LegendreRules`] and
//! [`LaguerreRules`] cover both families, and callers with their own tables
//! (or higher-precision generators) can substitute any provider pair.

mod laguerre;
mod legendre;
mod provider;

pub use laguerre::LaguerreRules;
pub use legendre::LegendreRules;
pub use provider::{RuleProvider, RuleSet, RuleTable};
