//! Gauss-Laguerre rule provider.
//!
//! An n-point Gauss-Laguerre rule approximates `∫_0^∞ e^{-y} g(y) dy` as
//! `Σ w_i g(y_i)` and is exact for polynomial `g` of degree 2n-1. The
//! singular endpoint rule feeds on these tables after its exponential
//! substitution.
//!
//! Nodes are found by Newton-Raphson on the Laguerre recurrence, walking
//! outward from the smallest root with the standard staggered initial
//! guesses; weights follow from `L_{n+1}` at each root.

use crate::error::QuadResult;
use crate::rules::provider::{RuleProvider, RuleTable};

/// Default provider for the singular (Laguerre) rule family.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaguerreRules;

impl RuleProvider for LaguerreRules {
    fn rule(&self, order: usize) -> QuadResult<RuleTable> {
        let (nodes, weights) = compute_nodes_weights(order);
        RuleTable::new(order, nodes, weights)
    }
}

/// Compute nodes and weights using Newton-Raphson on Laguerre polynomials.
///
/// Root i starts from a guess offset from root i-1 (the roots of L_n spread
/// out roughly quadratically); each converges in a handful of iterations.
/// Weights use `w = x / ((n+1)^2 L_{n+1}(x)^2)`.
fn compute_nodes_weights(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes: Vec<f64> = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    let eps = 1e-15;
    let max_iter = 100;

    let n_f64 = n as f64;
    let mut z = 0.0;

    for i in 0..n {
        if i == 0 {
            z = 3.0 / (1.0 + 2.4 * n_f64);
        } else if i == 1 {
            z += 15.0 / (1.0 + 2.5 * n_f64);
        } else {
            let ai = (i - 1) as f64;
            z += (1.0 + 2.55 * ai) / (1.9 * ai) * (z - nodes[i - 2]);
        }

        for _ in 0..max_iter {
            let (p, dp) = laguerre_eval(n, z);

            let dz = p / dp;
            z -= dz;

            if dz.abs() < eps {
                break;
            }
        }

        let (l_next, _) = laguerre_eval(n + 1, z);
        let w = z / ((n_f64 + 1.0) * (n_f64 + 1.0) * l_next * l_next);

        nodes.push(z);
        weights.push(w);
    }

    (nodes, weights)
}

/// Evaluate Laguerre polynomial L_n(x) and its derivative L_n'(x) via the
/// three-term recurrence `(k+1) L_{k+1} = (2k+1-x) L_k - k L_{k-1}` and the
/// identity `x L_n'(x) = n (L_n(x) - L_{n-1}(x))`.
fn laguerre_eval(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }

    let mut l_prev = 1.0; // L_0(x)
    let mut l_curr = 1.0 - x; // L_1(x)

    for k in 1..n {
        let k_f64 = k as f64;
        let l_next = ((2.0 * k_f64 + 1.0 - x) * l_curr - k_f64 * l_prev) / (k_f64 + 1.0);
        l_prev = l_curr;
        l_curr = l_next;
    }

    let dl = n as f64 * (l_curr - l_prev) / x;
    (l_curr, dl)
}
