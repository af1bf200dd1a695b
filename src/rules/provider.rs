//! Rule tables, the provider seam, and the per-tree rule cache.
//!
//! A quadrature rule is a finite set of abscissa/weight pairs. Where the
//! tables come from is pluggable: anything implementing [`RuleProvider`] can
//! supply them (the built-in providers live in [`crate::rules::legendre`] and
//! [`crate::rules::laguerre`]). Tables are fetched once per tree and cached in
//! a [`RuleSet`], keyed by rule family and order.

use crate::error::{QuadError, QuadResult};

/// Abscissas and weights for one rule family at one order.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    /// Quadrature nodes (canonical domain of the rule family).
    pub nodes: Vec<f64>,
    /// Quadrature weights.
    pub weights: Vec<f64>,
}

impl RuleTable {
    /// Create a table, checking that both sequences have exactly `order`
    /// entries. Providers are not trusted to get this right; mismatched
    /// tables would produce silently wrong integrals.
    pub fn new(order: usize, nodes: Vec<f64>, weights: Vec<f64>) -> QuadResult<Self> {
        if nodes.len() != order || weights.len() != order {
            return Err(QuadError::RuleTableMismatch {
                order,
                nodes: nodes.len(),
                weights: weights.len(),
            });
        }
        Ok(Self { nodes, weights })
    }

    /// Number of sample points.
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Integrate `f` over `[lower, upper]` with a rule whose canonical
    /// domain is `[-1, 1]` (the Gauss-Legendre family).
    ///
    /// Maps each node via `x = mid + half_width * t` and scales the weighted
    /// sum by the half-width.
    pub fn integrate_mapped<F>(&self, f: &F, lower: f64, upper: f64) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let mid = (lower + upper) / 2.0;
        let half_width = (upper - lower) / 2.0;

        let mut result = 0.0;
        for (&node, &weight) in self.nodes.iter().zip(&self.weights) {
            result += weight * f(mid + half_width * node);
        }

        result * half_width
    }

    /// Integrate `f` over a span of width `width` ending at an integrable
    /// singularity of exponent `alpha` (`0 <= alpha < 1`) at `point`, with a
    /// rule whose canonical domain is `[0, inf)` under weight `e^{-y}` (the
    /// Gauss-Laguerre family).
    ///
    /// Substitutes `x = point ± width * exp(-y / (1 - alpha))` (toward the
    /// interval interior; `at_lower` selects the sign) so the sample points
    /// accumulate at the singular endpoint without ever reaching it, and
    /// regularizes the integrand with `z^alpha`:
    ///
    /// `I = width / (1 - alpha) * Σ w_i f(x_i) z_i^alpha`
    pub fn integrate_singular<F>(
        &self,
        f: &F,
        point: f64,
        width: f64,
        alpha: f64,
        at_lower: bool,
    ) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let sign = if at_lower { 1.0 } else { -1.0 };

        let mut result = 0.0;
        for (&node, &weight) in self.nodes.iter().zip(&self.weights) {
            let z = (-node / (1.0 - alpha)).exp();
            let x = point + sign * width * z;
            // For the deepest nodes width * z underflows and x rounds onto
            // the singular point itself; the weight there is below f64
            // resolution, so the sample is dropped rather than forcing the
            // integrand to be evaluable at the singularity.
            if x == point {
                continue;
            }
            result += weight * f(x) * z.powf(alpha);
        }

        result * width / (1.0 - alpha)
    }
}

/// Source of rule tables for one rule family.
///
/// `rule(order)` must return exactly `order` abscissa/weight pairs; results
/// are treated as pure and cacheable. One provider instance serves the
/// standard (Legendre) family, another the singular (Laguerre) family.
pub trait RuleProvider {
    /// Return the abscissas and weights for the given order (>= 1).
    fn rule(&self, order: usize) -> QuadResult<RuleTable>;
}

/// The four tables a tree needs: both rule families at both orders.
///
/// Built once per tree and shared read-only by every recursive call, so the
/// provider is never consulted twice for the same (family, order) pair.
#[derive(Debug, Clone)]
pub struct RuleSet {
    n1: usize,
    n2: usize,
    legendre_n1: RuleTable,
    legendre_n2: RuleTable,
    laguerre_n1: RuleTable,
    laguerre_n2: RuleTable,
}

impl RuleSet {
    /// Fetch all four tables from a provider pair.
    pub fn from_providers(
        legendre: &dyn RuleProvider,
        laguerre: &dyn RuleProvider,
        n1: usize,
        n2: usize,
    ) -> QuadResult<Self> {
        if n1 == 0 || n2 == 0 {
            return Err(QuadError::InvalidParameter {
                parameter: "order".to_string(),
                message: "rule orders must be at least 1".to_string(),
            });
        }
        Ok(Self {
            n1,
            n2,
            legendre_n1: legendre.rule(n1)?,
            legendre_n2: legendre.rule(n2)?,
            laguerre_n1: laguerre.rule(n1)?,
            laguerre_n2: laguerre.rule(n2)?,
        })
    }

    /// Assemble from already-materialized tables (a decoded record),
    /// validating each against its recorded order.
    pub fn from_tables(
        n1: usize,
        n2: usize,
        legendre_n1: RuleTable,
        legendre_n2: RuleTable,
        laguerre_n1: RuleTable,
        laguerre_n2: RuleTable,
    ) -> QuadResult<Self> {
        for (order, table) in [
            (n1, &legendre_n1),
            (n2, &legendre_n2),
            (n1, &laguerre_n1),
            (n2, &laguerre_n2),
        ] {
            if table.order() != order {
                return Err(QuadError::RuleTableMismatch {
                    order,
                    nodes: table.nodes.len(),
                    weights: table.weights.len(),
                });
            }
        }
        Ok(Self {
            n1,
            n2,
            legendre_n1,
            legendre_n2,
            laguerre_n1,
            laguerre_n2,
        })
    }

    /// Low-order rule size.
    pub fn n1(&self) -> usize {
        self.n1
    }

    /// High-order rule size.
    pub fn n2(&self) -> usize {
        self.n2
    }

    /// Standard-family table; `high_order` selects n2 over n1.
    pub fn legendre(&self, high_order: bool) -> &RuleTable {
        if high_order {
            &self.legendre_n2
        } else {
            &self.legendre_n1
        }
    }

    /// Singular-family table; `high_order` selects n2 over n1.
    pub fn laguerre(&self, high_order: bool) -> &RuleTable {
        if high_order {
            &self.laguerre_n2
        } else {
            &self.laguerre_n1
        }
    }
}
