//! Gauss-Legendre rule provider.
//!
//! An n-point Gauss-Legendre rule integrates polynomials of degree 2n-1
//! exactly on [-1, 1]. Orders up to 10 use pre-computed high-precision
//! tables; larger orders fall back to Newton-Raphson root-finding on the
//! Legendre recurrence with Chebyshev initial guesses.

use crate::error::QuadResult;
use crate::rules::provider::{RuleProvider, RuleTable};

/// Default provider for the standard (Legendre) rule family.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegendreRules;

impl RuleProvider for LegendreRules {
    fn rule(&self, order: usize) -> QuadResult<RuleTable> {
        let (nodes, weights) = match order {
            1 => (vec![0.0], vec![2.0]),
            2 => {
                let x = 0.5773502691896257_f64; // 1/sqrt(3)
                (vec![-x, x], vec![1.0, 1.0])
            }
            3 => {
                let x = 0.7745966692414834_f64; // sqrt(3/5)
                (vec![-x, 0.0, x], vec![5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0])
            }
            4 => (
                vec![
                    -0.8611363115940526,
                    -0.3399810435848563,
                    0.3399810435848563,
                    0.8611363115940526,
                ],
                vec![
                    0.3478548451374538,
                    0.6521451548625461,
                    0.6521451548625461,
                    0.3478548451374538,
                ],
            ),
            5 => (
                vec![
                    -0.906_179_845_938_664,
                    -0.5384693101056831,
                    0.0,
                    0.5384693101056831,
                    0.906_179_845_938_664,
                ],
                vec![
                    0.2369268850561891,
                    0.4786286704993665,
                    0.5688888888888889,
                    0.4786286704993665,
                    0.2369268850561891,
                ],
            ),
            6 => (
                vec![
                    -0.932_469_514_203_152,
                    -0.6612093864662645,
                    -0.2386191860831969,
                    0.2386191860831969,
                    0.6612093864662645,
                    0.932_469_514_203_152,
                ],
                vec![
                    0.1713244923791704,
                    0.3607615730481386,
                    0.467_913_934_572_691,
                    0.467_913_934_572_691,
                    0.3607615730481386,
                    0.1713244923791704,
                ],
            ),
            7 => (
                vec![
                    -0.9491079123427585,
                    -0.7415311855993945,
                    -0.4058451513773972,
                    0.0,
                    0.4058451513773972,
                    0.7415311855993945,
                    0.9491079123427585,
                ],
                vec![
                    0.1294849661688697,
                    0.2797053914892766,
                    0.3818300505051189,
                    0.4179591836734694,
                    0.3818300505051189,
                    0.2797053914892766,
                    0.1294849661688697,
                ],
            ),
            8 => (
                vec![
                    -0.9602898564975363,
                    -0.7966664774136267,
                    -0.525_532_409_916_329,
                    -0.1834346424956498,
                    0.1834346424956498,
                    0.525_532_409_916_329,
                    0.7966664774136267,
                    0.9602898564975363,
                ],
                vec![
                    0.1012285362903763,
                    0.2223810344533745,
                    0.3137066458778873,
                    0.362_683_783_378_362,
                    0.362_683_783_378_362,
                    0.3137066458778873,
                    0.2223810344533745,
                    0.1012285362903763,
                ],
            ),
            9 => (
                vec![
                    -0.9681602395076261,
                    -0.8360311073266358,
                    -0.6133714327005904,
                    -0.3242534234038089,
                    0.0,
                    0.3242534234038089,
                    0.6133714327005904,
                    0.8360311073266358,
                    0.9681602395076261,
                ],
                vec![
                    0.0812743883615744,
                    0.1806481606948574,
                    0.2606106964029354,
                    0.3123470770400029,
                    0.3302393550012598,
                    0.3123470770400029,
                    0.2606106964029354,
                    0.1806481606948574,
                    0.0812743883615744,
                ],
            ),
            10 => (
                vec![
                    -0.9739065285171717,
                    -0.8650633666889845,
                    -0.6794095682990244,
                    -0.4333953941292472,
                    -0.1488743389816312,
                    0.1488743389816312,
                    0.4333953941292472,
                    0.6794095682990244,
                    0.8650633666889845,
                    0.9739065285171717,
                ],
                vec![
                    0.0666713443086881,
                    0.1494513491505806,
                    0.219_086_362_515_982,
                    0.2692667193099963,
                    0.2955242247147529,
                    0.2955242247147529,
                    0.2692667193099963,
                    0.219_086_362_515_982,
                    0.1494513491505806,
                    0.0666713443086881,
                ],
            ),
            n => compute_nodes_weights(n),
        };
        RuleTable::new(order, nodes, weights)
    }
}

/// Compute nodes and weights using Newton-Raphson on Legendre polynomials.
///
/// Finds the roots of P_n(x) starting from Chebyshev-node guesses, then
/// computes weights as `2 / ((1 - x^2) P_n'(x)^2)`. Only the positive half
/// is solved; the negative half follows by symmetry.
fn compute_nodes_weights(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    let eps = 1e-15;
    let max_iter = 100;

    let m = n.div_ceil(2);

    for i in 0..m {
        let mut x = ((4 * i + 3) as f64 / (4 * n + 2) as f64 * std::f64::consts::PI).cos();

        for _ in 0..max_iter {
            let (p, dp) = legendre_eval(n, x);

            let dx = p / dp;
            x -= dx;

            if dx.abs() < eps {
                break;
            }
        }

        let (_, dp) = legendre_eval(n, x);
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        if i != n - 1 - i {
            nodes.push(x);
            weights.push(w);
            nodes.push(-x);
            weights.push(w);
        } else {
            // Middle node (x = 0 for odd n)
            nodes.push(x);
            weights.push(w);
        }
    }

    let mut pairs: Vec<(f64, f64)> = nodes.into_iter().zip(weights).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    pairs.into_iter().unzip()
}

/// Evaluate Legendre polynomial P_n(x) and its derivative P_n'(x) via the
/// three-term recurrence.
fn legendre_eval(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    if n == 1 {
        return (x, 1.0);
    }

    let mut p_prev = 1.0; // P_0(x)
    let mut p_curr = x; // P_1(x)
    let mut dp_prev = 0.0;
    let mut dp_curr = 1.0;

    for k in 1..n {
        let k_f64 = k as f64;

        // P_{k+1}(x) = ((2k+1)*x*P_k(x) - k*P_{k-1}(x)) / (k+1)
        let p_next = ((2.0 * k_f64 + 1.0) * x * p_curr - k_f64 * p_prev) / (k_f64 + 1.0);
        let dp_next =
            ((2.0 * k_f64 + 1.0) * (p_curr + x * dp_curr) - k_f64 * dp_prev) / (k_f64 + 1.0);

        p_prev = p_curr;
        p_curr = p_next;
        dp_prev = dp_curr;
        dp_curr = dp_next;
    }

    (p_curr, dp_curr)
}
