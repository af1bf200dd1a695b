//! Adaptive tree construction.
//!
//! The builder recursively bisects the integration interval. At each node
//! the integrand is evaluated with the low-order and high-order rule; the
//! difference is the local error estimate. A node splits while forced below
//! `min_depth`, or while its error estimate is at or above the local
//! tolerance and `max_depth` allows; the tolerance halves per level. A leaf
//! still above tolerance at `max_depth` is accepted silently — the slack
//! shows up in the aggregated error, never as a failure.

use tracing::debug;

use crate::error::{QuadError, QuadResult};
use crate::rules::{LaguerreRules, LegendreRules, RuleProvider, RuleSet};
use crate::tree::metadata::TreeMetadata;
use crate::tree::node::{select_rule, RuleKind, TreeNode};

/// Options controlling tree construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOptions {
    /// Base error tolerance at the root (default: 1e-6).
    pub tol: f64,
    /// Depth every branch is forced to reach (default: 2).
    pub min_depth: u32,
    /// Hard recursion cap; the sole bound on tree size (default: 10).
    pub max_depth: u32,
    /// Low-order rule size (default: 5).
    pub n1: usize,
    /// High-order rule size (default: 10).
    pub n2: usize,
    /// Integrable singularity at the lower bound.
    pub a_singular: bool,
    /// Integrable singularity at the upper bound.
    pub b_singular: bool,
    /// Singularity exponent at the lower bound, `0 <= alpha < 1`.
    pub alpha_a: f64,
    /// Singularity exponent at the upper bound, `0 <= alpha < 1`.
    pub alpha_b: f64,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            tol: 1e-6,
            min_depth: 2,
            max_depth: 10,
            n1: 5,
            n2: 10,
            a_singular: false,
            b_singular: false,
            alpha_a: 0.0,
            alpha_b: 0.0,
        }
    }
}

impl TreeOptions {
    /// Fail-fast validation of the numeric configuration.
    pub fn validate(&self) -> QuadResult<()> {
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(QuadError::InvalidParameter {
                parameter: "tol".to_string(),
                message: "tolerance must be positive and finite".to_string(),
            });
        }
        if self.min_depth > self.max_depth {
            return Err(QuadError::InvalidDepthRange {
                min_depth: self.min_depth,
                max_depth: self.max_depth,
            });
        }
        if self.n1 == 0 || self.n2 == 0 {
            return Err(QuadError::InvalidParameter {
                parameter: "n1/n2".to_string(),
                message: "rule orders must be at least 1".to_string(),
            });
        }
        if self.a_singular && !(0.0..1.0).contains(&self.alpha_a) {
            return Err(QuadError::InvalidParameter {
                parameter: "alpha_a".to_string(),
                message: "singular exponent must lie in [0, 1)".to_string(),
            });
        }
        if self.b_singular && !(0.0..1.0).contains(&self.alpha_b) {
            return Err(QuadError::InvalidParameter {
                parameter: "alpha_b".to_string(),
                message: "singular exponent must lie in [0, 1)".to_string(),
            });
        }
        Ok(())
    }
}

/// An adaptive Gauss quadrature tree over a fixed interval.
///
/// Built once from an integrand; immutable afterwards. Rebuilding with other
/// bounds or orders means constructing a new tree. The integrand itself is
/// not retained — a decoded tree carries everything needed to aggregate
/// without re-evaluating it.
///
/// # Example
///
/// ```
/// use quadr::{AdaptiveGaussTree, TreeMetadata, TreeOptions};
///
/// let tree = AdaptiveGaussTree::new(
///     |x: f64| x.sin(),
///     0.0,
///     std::f64::consts::PI,
///     TreeOptions::default(),
///     TreeMetadata::default(),
/// )
/// .unwrap();
///
/// let (integral, error) = tree.integral_and_error();
/// assert!((integral - 2.0).abs() < 1e-8);
/// assert!(error < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveGaussTree {
    pub(crate) a: f64,
    pub(crate) b: f64,
    pub(crate) options: TreeOptions,
    pub(crate) metadata: TreeMetadata,
    pub(crate) rules: RuleSet,
    pub(crate) root: TreeNode,
}

impl AdaptiveGaussTree {
    /// Build a tree using the built-in rule providers.
    pub fn new<F>(
        f: F,
        a: f64,
        b: f64,
        options: TreeOptions,
        metadata: TreeMetadata,
    ) -> QuadResult<Self>
    where
        F: Fn(f64) -> f64,
    {
        Self::with_providers(f, a, b, options, metadata, &LegendreRules, &LaguerreRules)
    }

    /// Build a tree fetching rule tables from the given providers.
    pub fn with_providers<F>(
        f: F,
        a: f64,
        b: f64,
        options: TreeOptions,
        mut metadata: TreeMetadata,
        legendre: &dyn RuleProvider,
        laguerre: &dyn RuleProvider,
    ) -> QuadResult<Self>
    where
        F: Fn(f64) -> f64,
    {
        if a >= b {
            return Err(QuadError::InvalidInterval {
                a,
                b,
                context: "AdaptiveGaussTree::new".to_string(),
            });
        }
        options.validate()?;

        let rules = RuleSet::from_providers(legendre, laguerre, options.n1, options.n2)?;

        let builder = Builder {
            f: &f,
            a,
            b,
            options: &options,
            rules: &rules,
        };
        let root = builder.build(a, b, 0, options.tol);

        metadata.add_update_log("Initial build");

        let (integral, error) = root.aggregate();
        debug!(
            nodes = root.node_count(),
            integral, error, "adaptive tree built"
        );

        Ok(Self {
            a,
            b,
            options,
            metadata,
            rules,
            root,
        })
    }

    /// Reassemble a tree from decoded parts. Used by the codec.
    pub(crate) fn from_parts(
        a: f64,
        b: f64,
        options: TreeOptions,
        metadata: TreeMetadata,
        rules: RuleSet,
        root: TreeNode,
    ) -> Self {
        Self {
            a,
            b,
            options,
            metadata,
            rules,
            root,
        }
    }

    /// Total integral and accumulated error over all leaves.
    pub fn integral_and_error(&self) -> (f64, f64) {
        self.root.aggregate()
    }

    /// Root node of the tree.
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Global integration bounds `(a, b)`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    /// Construction options.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Descriptive metadata and update log.
    pub fn metadata(&self) -> &TreeMetadata {
        &self.metadata
    }

    /// Cached rule tables.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Append a timestamped message to the update log.
    pub fn add_update_log(&mut self, message: impl Into<String>) {
        self.metadata.add_update_log(message);
    }
}

impl std::fmt::Display for AdaptiveGaussTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (integral, error) = self.integral_and_error();
        write!(f, "({}, {})", integral, error)
    }
}

/// Recursive tree builder. Borrows everything; the rule tables are shared
/// read-only across all calls.
struct Builder<'a, F> {
    f: &'a F,
    a: f64,
    b: f64,
    options: &'a TreeOptions,
    rules: &'a RuleSet,
}

impl<F> Builder<'_, F>
where
    F: Fn(f64) -> f64,
{
    fn build(&self, lower: f64, upper: f64, depth: u32, tol: f64) -> TreeNode {
        // Re-evaluated against the global bounds at every call: only spans
        // still touching an original singular endpoint stay singular.
        let rule = select_rule(
            lower,
            upper,
            self.a,
            self.b,
            self.options.a_singular,
            self.options.b_singular,
        );

        let i_low = self.evaluate(rule, lower, upper, false);
        let i_high = self.evaluate(rule, lower, upper, true);
        let error = (i_high - i_low).abs();

        let children = if depth < self.options.min_depth
            || (error >= tol && depth < self.options.max_depth)
        {
            let mid = (lower + upper) / 2.0;
            let left = self.build(lower, mid, depth + 1, tol / 2.0);
            let right = self.build(mid, upper, depth + 1, tol / 2.0);
            Some(Box::new((left, right)))
        } else {
            None
        };

        TreeNode {
            lower,
            upper,
            depth,
            tolerance: tol,
            error,
            integral: i_high,
            rule,
            children,
        }
    }

    fn evaluate(&self, rule: RuleKind, lower: f64, upper: f64, high_order: bool) -> f64 {
        let width = upper - lower;
        match rule {
            RuleKind::Standard => self
                .rules
                .legendre(high_order)
                .integrate_mapped(self.f, lower, upper),
            RuleKind::SingularLow => self.rules.laguerre(high_order).integrate_singular(
                self.f,
                self.a,
                width,
                self.options.alpha_a,
                true,
            ),
            RuleKind::SingularHigh => self.rules.laguerre(high_order).integrate_singular(
                self.f,
                self.b,
                width,
                self.options.alpha_b,
                false,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_invariants(node: &TreeNode, options: &TreeOptions) {
        assert!(node.depth() <= options.max_depth, "depth ceiling violated");
        if node.is_leaf() {
            assert!(node.depth() >= options.min_depth, "depth floor violated");
        } else {
            let left = node.left().unwrap();
            let right = node.right().unwrap();
            let mid = (node.lower() + node.upper()) / 2.0;
            assert_eq!(left.lower(), node.lower());
            assert_eq!(left.upper(), mid);
            assert_eq!(right.lower(), mid);
            assert_eq!(right.upper(), node.upper());
            assert_eq!(left.depth(), node.depth() + 1);
            assert_eq!(right.depth(), node.depth() + 1);
            assert_eq!(left.tolerance(), node.tolerance() / 2.0);
            assert_eq!(right.tolerance(), node.tolerance() / 2.0);
            check_invariants(left, options);
            check_invariants(right, options);
        }
    }

    #[test]
    fn test_constant_single_leaf() {
        // f = 1 over [0, 1] with min = max = 0: one leaf, exact to
        // round-off, error estimate at round-off.
        let options = TreeOptions {
            min_depth: 0,
            max_depth: 0,
            n1: 2,
            n2: 4,
            ..Default::default()
        };
        let tree =
            AdaptiveGaussTree::new(|_x| 1.0, 0.0, 1.0, options, TreeMetadata::default()).unwrap();

        assert!(tree.root().is_leaf());
        assert!((tree.root().integral() - 1.0).abs() < 1e-14);
        assert!(tree.root().error() < 1e-14);
    }

    #[test]
    fn test_forced_depth_linear() {
        // f = x over [0, 1] with min = max = 3: full depth-3 tree, 8 leaves,
        // integral 1/2.
        let options = TreeOptions {
            min_depth: 3,
            max_depth: 3,
            n1: 2,
            n2: 4,
            ..Default::default()
        };
        let tree =
            AdaptiveGaussTree::new(|x| x, 0.0, 1.0, options.clone(), TreeMetadata::default())
                .unwrap();

        let leaves = tree.root().leaves();
        assert_eq!(leaves.len(), 8);
        assert!(leaves.iter().all(|l| l.depth() == 3));
        check_invariants(tree.root(), &options);

        let (integral, _) = tree.integral_and_error();
        assert!((integral - 0.5).abs() < 1e-10, "got {}", integral);
    }

    #[test]
    fn test_smooth_adaptive() {
        // sin over [0, pi] = 2.
        let options = TreeOptions {
            tol: 1e-10,
            max_depth: 12,
            ..Default::default()
        };
        let tree = AdaptiveGaussTree::new(
            |x: f64| x.sin(),
            0.0,
            std::f64::consts::PI,
            options.clone(),
            TreeMetadata::default(),
        )
        .unwrap();

        check_invariants(tree.root(), &options);
        let (integral, error) = tree.integral_and_error();
        assert!((integral - 2.0).abs() < 1e-10, "got {}", integral);
        assert!(error < 1e-10);
    }

    #[test]
    fn test_singular_lower_endpoint() {
        // f = x^(-1/2) over [0, 1] = 2, integrable singularity at 0.
        let options = TreeOptions {
            a_singular: true,
            alpha_a: 0.5,
            ..Default::default()
        };
        let tree = AdaptiveGaussTree::new(
            |x: f64| x.powf(-0.5),
            0.0,
            1.0,
            options,
            TreeMetadata::default(),
        )
        .unwrap();

        // Every leaf is finite, including the ones touching x = 0.
        for leaf in tree.root().leaves() {
            assert!(leaf.integral().is_finite());
            assert!(leaf.error().is_finite());
        }
        let (integral, _) = tree.integral_and_error();
        assert!((integral - 2.0).abs() < 1e-3, "got {}", integral);
    }

    #[test]
    fn test_singular_upper_endpoint() {
        // f = (1-x)^(-1/2) over [0, 1] = 2, singular at the upper bound.
        let options = TreeOptions {
            b_singular: true,
            alpha_b: 0.5,
            ..Default::default()
        };
        let tree = AdaptiveGaussTree::new(
            |x: f64| (1.0 - x).powf(-0.5),
            0.0,
            1.0,
            options,
            TreeMetadata::default(),
        )
        .unwrap();

        let (integral, _) = tree.integral_and_error();
        assert!((integral - 2.0).abs() < 1e-3, "got {}", integral);
    }

    #[test]
    fn test_both_endpoints_singular() {
        // f = (x(1-x))^(-1/2) over [0, 1] = pi; interior spans fall back to
        // the standard rule even with both flags set.
        let options = TreeOptions {
            tol: 1e-8,
            max_depth: 14,
            a_singular: true,
            b_singular: true,
            alpha_a: 0.5,
            alpha_b: 0.5,
            ..Default::default()
        };
        let tree = AdaptiveGaussTree::new(
            |x: f64| (x * (1.0 - x)).powf(-0.5),
            0.0,
            1.0,
            options,
            TreeMetadata::default(),
        )
        .unwrap();

        let (integral, _) = tree.integral_and_error();
        assert!(
            (integral - std::f64::consts::PI).abs() < 1e-3,
            "got {}",
            integral
        );

        for leaf in tree.root().leaves() {
            let expected = select_rule(leaf.lower(), leaf.upper(), 0.0, 1.0, true, true);
            assert_eq!(leaf.rule(), expected);
        }
    }

    #[test]
    fn test_max_depth_accepts_under_resolved_leaf() {
        // Unflagged singularity: the cap is reached and the leaf is accepted
        // with its large error estimate, not an Err.
        let options = TreeOptions {
            min_depth: 1,
            max_depth: 4,
            ..Default::default()
        };
        let tree = AdaptiveGaussTree::new(
            |x: f64| if x > 0.0 { x.powf(-0.5) } else { 0.0 },
            0.0,
            1.0,
            options,
            TreeMetadata::default(),
        )
        .unwrap();

        let (_, error) = tree.integral_and_error();
        assert!(error > tree.options().tol, "degradation must be visible");
        let deepest = tree.root().leaves().iter().map(|l| l.depth()).max();
        assert_eq!(deepest, Some(4));
    }

    #[test]
    fn test_invalid_configurations() {
        let meta = TreeMetadata::default;
        assert!(
            AdaptiveGaussTree::new(|x| x, 1.0, 0.0, TreeOptions::default(), meta()).is_err(),
            "reversed interval"
        );

        let options = TreeOptions {
            min_depth: 5,
            max_depth: 3,
            ..Default::default()
        };
        assert!(AdaptiveGaussTree::new(|x| x, 0.0, 1.0, options, meta()).is_err());

        let options = TreeOptions {
            tol: 0.0,
            ..Default::default()
        };
        assert!(AdaptiveGaussTree::new(|x| x, 0.0, 1.0, options, meta()).is_err());

        let options = TreeOptions {
            n1: 0,
            ..Default::default()
        };
        assert!(AdaptiveGaussTree::new(|x| x, 0.0, 1.0, options, meta()).is_err());

        let options = TreeOptions {
            a_singular: true,
            alpha_a: 1.0,
            ..Default::default()
        };
        assert!(AdaptiveGaussTree::new(|x| x, 0.0, 1.0, options, meta()).is_err());
    }

    #[test]
    fn test_update_log_on_build() {
        let tree = AdaptiveGaussTree::new(
            |x| x,
            0.0,
            1.0,
            TreeOptions::default(),
            TreeMetadata::default(),
        )
        .unwrap();
        assert_eq!(tree.metadata().update_log.len(), 1);
        assert_eq!(tree.metadata().update_log[0].message, "Initial build");
    }
}
