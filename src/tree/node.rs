//! Tree nodes, rule selection, and aggregation.

/// Which rule family produced a node's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Standard Gauss-Legendre rule over the subinterval.
    Standard,
    /// Singular rule anchored at the global lower bound.
    SingularLow,
    /// Singular rule anchored at the global upper bound.
    SingularHigh,
}

impl RuleKind {
    /// Whether this is one of the singular variants.
    pub fn is_singular(self) -> bool {
        !matches!(self, RuleKind::Standard)
    }
}

/// Pick the rule family for a subinterval.
///
/// The decision uses the *global* bounds, not the local ones: only the
/// subintervals still touching an original singular endpoint get the
/// singular treatment. A span touching both singular endpoints resolves to
/// the lower one. Isolated here so the policy is testable on its own.
pub fn select_rule(
    lower: f64,
    upper: f64,
    a: f64,
    b: f64,
    a_singular: bool,
    b_singular: bool,
) -> RuleKind {
    if lower == a && a_singular {
        RuleKind::SingularLow
    } else if upper == b && b_singular {
        RuleKind::SingularHigh
    } else {
        RuleKind::Standard
    }
}

/// One node of the adaptive quadrature tree.
///
/// Immutable after construction. A leaf's `integral`/`error` are final
/// contributions to the total; an internal node's own values are diagnostic
/// only and are superseded by its children during aggregation.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    pub(crate) depth: u32,
    pub(crate) tolerance: f64,
    pub(crate) error: f64,
    pub(crate) integral: f64,
    pub(crate) rule: RuleKind,
    // Both children or none; a partially expanded node is unrepresentable.
    pub(crate) children: Option<Box<(TreeNode, TreeNode)>>,
}

impl TreeNode {
    /// Lower bound of this node's subinterval.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound of this node's subinterval.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Recursion depth (root is 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Tolerance in effect at this node.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Two-rule error estimate `|I_high - I_low|`.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// High-order rule result over this subinterval.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Rule family that produced this node's values.
    pub fn rule(&self) -> RuleKind {
        self.rule
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Left child, covering `[lower, mid]`.
    pub fn left(&self) -> Option<&TreeNode> {
        self.children.as_deref().map(|c| &c.0)
    }

    /// Right child, covering `[mid, upper]`.
    pub fn right(&self) -> Option<&TreeNode> {
        self.children.as_deref().map(|c| &c.1)
    }

    /// Sum leaf integrals and leaf errors, post-order.
    ///
    /// Internal nodes contribute nothing of their own; their stored values
    /// are superseded by the sum over descendants.
    pub fn aggregate(&self) -> (f64, f64) {
        match self.children.as_deref() {
            None => (self.integral, self.error),
            Some((left, right)) => {
                let (li, le) = left.aggregate();
                let (ri, re) = right.aggregate();
                (li + ri, le + re)
            }
        }
    }

    /// Collect all leaves, left to right.
    pub fn leaves(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TreeNode>) {
        match self.children.as_deref() {
            None => out.push(self),
            Some((left, right)) => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self.children.as_deref() {
            None => 1,
            Some((left, right)) => 1 + left.node_count() + right.node_count(),
        }
    }
}
