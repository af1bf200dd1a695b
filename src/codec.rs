//! Persisted tree format.
//!
//! A built tree serializes to a JSON record carrying the global parameters,
//! metadata, the recursive node structure, and optionally the cached rule
//! tables for bit-exact reproducibility. Decoding reconstructs the tree
//! without re-evaluating the integrand; when cached tables are absent they
//! are recomputed from the recorded orders.
//!
//! The per-node `method` label collapses both singular variants into
//! `"Gauss-Laguerre"`. On decode the variant is re-derived from the recorded
//! bounds: a singular node always touches a global endpoint, and a node
//! touching both resolves to the lower one, matching builder priority.
//! Singularity exponents are not persisted; a decoded tree aggregates
//! exactly but cannot resume the original build.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QuadError, QuadResult};
use crate::rules::{LaguerreRules, LegendreRules, RuleProvider, RuleSet, RuleTable};
use crate::tree::{AdaptiveGaussTree, RuleKind, TreeMetadata, TreeNode, TreeOptions, UpdateEntry};

/// Node label for the standard rule family.
pub const METHOD_STANDARD: &str = "Gauss-Legendre";
/// Node label for either singular rule variant.
pub const METHOD_SINGULAR: &str = "Gauss-Laguerre";

/// Persisted form of one tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub a: f64,
    pub b: f64,
    pub depth: u32,
    pub tol: f64,
    pub error: f64,
    pub integral: f64,
    pub method: String,
    pub left: Option<Box<NodeRecord>>,
    pub right: Option<Box<NodeRecord>>,
}

/// Persisted rule table: a pair of equal-length sequences (nodes, weights).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootsRecord(pub Vec<f64>, pub Vec<f64>);

impl RootsRecord {
    fn from_table(table: &RuleTable) -> Self {
        Self(table.nodes.clone(), table.weights.clone())
    }

    fn into_table(self, order: usize) -> QuadResult<RuleTable> {
        RuleTable::new(order, self.0, self.1)
    }
}

fn default_name() -> String {
    TreeMetadata::default().name
}

fn default_version() -> String {
    TreeMetadata::default().version
}

/// Persisted form of a whole tree.
///
/// Metadata fields default when absent; the numeric parameters are required
/// and never default silently. Integration bounds live on `tree.a`/`tree.b`,
/// not at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRecord {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub update_log: Vec<UpdateEntry>,
    pub tolerance: f64,
    pub min_depth: u32,
    pub max_depth: u32,
    pub n1: usize,
    pub n2: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legendre_roots_n1: Option<RootsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laguerre_roots_n1: Option<RootsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legendre_roots_n2: Option<RootsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laguerre_roots_n2: Option<RootsRecord>,
    pub tree: NodeRecord,
}

fn encode_node(node: &TreeNode) -> NodeRecord {
    NodeRecord {
        a: node.lower(),
        b: node.upper(),
        depth: node.depth(),
        tol: node.tolerance(),
        error: node.error(),
        integral: node.integral(),
        method: if node.rule().is_singular() {
            METHOD_SINGULAR.to_string()
        } else {
            METHOD_STANDARD.to_string()
        },
        left: node.left().map(|n| Box::new(encode_node(n))),
        right: node.right().map(|n| Box::new(encode_node(n))),
    }
}

fn decode_node(record: &NodeRecord, a: f64, b: f64) -> QuadResult<TreeNode> {
    let rule = if record.method == METHOD_SINGULAR {
        if record.a == a {
            RuleKind::SingularLow
        } else if record.b == b {
            RuleKind::SingularHigh
        } else {
            return Err(QuadError::MalformedRecord {
                message: format!(
                    "singular node [{}, {}] touches neither global endpoint",
                    record.a, record.b
                ),
            });
        }
    } else {
        RuleKind::Standard
    };

    let children = match (&record.left, &record.right) {
        (Some(left), Some(right)) => Some(Box::new((
            decode_node(left, a, b)?,
            decode_node(right, a, b)?,
        ))),
        (None, None) => None,
        _ => {
            return Err(QuadError::MalformedRecord {
                message: format!(
                    "node [{}, {}] has exactly one child; the tree is strictly binary",
                    record.a, record.b
                ),
            });
        }
    };

    Ok(TreeNode {
        lower: record.a,
        upper: record.b,
        depth: record.depth,
        tolerance: record.tol,
        error: record.error,
        integral: record.integral,
        rule,
        children,
    })
}

/// Walk the record tree and recover the endpoint singularity flags from the
/// collapsed method labels.
fn infer_singular_flags(record: &NodeRecord, a: f64, b: f64, flags: &mut (bool, bool)) {
    if record.method == METHOD_SINGULAR {
        if record.a == a {
            flags.0 = true;
        } else if record.b == b {
            flags.1 = true;
        }
    }
    if let (Some(left), Some(right)) = (&record.left, &record.right) {
        infer_singular_flags(left, a, b, flags);
        infer_singular_flags(right, a, b, flags);
    }
}

impl AdaptiveGaussTree {
    /// Encode this tree as a persistable record.
    ///
    /// With `dump_roots`, the cached rule tables travel with the record so a
    /// decode reproduces the numerics without consulting any provider.
    pub fn to_record(&self, dump_roots: bool) -> TreeRecord {
        let meta = self.metadata();
        let rules = self.rules();
        TreeRecord {
            name: meta.name.clone(),
            reference: meta.reference.clone(),
            description: meta.description.clone(),
            author: meta.author.clone(),
            version: meta.version.clone(),
            update_log: meta.update_log.clone(),
            tolerance: self.options().tol,
            min_depth: self.options().min_depth,
            max_depth: self.options().max_depth,
            n1: self.options().n1,
            n2: self.options().n2,
            legendre_roots_n1: dump_roots.then(|| RootsRecord::from_table(rules.legendre(false))),
            laguerre_roots_n1: dump_roots.then(|| RootsRecord::from_table(rules.laguerre(false))),
            legendre_roots_n2: dump_roots.then(|| RootsRecord::from_table(rules.legendre(true))),
            laguerre_roots_n2: dump_roots.then(|| RootsRecord::from_table(rules.laguerre(true))),
            tree: encode_node(self.root()),
        }
    }

    /// Decode a record using the built-in providers for any absent tables.
    pub fn from_record(record: TreeRecord) -> QuadResult<Self> {
        Self::from_record_with_providers(record, &LegendreRules, &LaguerreRules)
    }

    /// Decode a record, recomputing absent rule tables from the given
    /// providers at the recorded orders. Present tables are length-validated
    /// and used as-is.
    pub fn from_record_with_providers(
        record: TreeRecord,
        legendre: &dyn RuleProvider,
        laguerre: &dyn RuleProvider,
    ) -> QuadResult<Self> {
        // Bounds are recovered from the root node, not top-level fields.
        let a = record.tree.a;
        let b = record.tree.b;
        if a >= b {
            return Err(QuadError::InvalidInterval {
                a,
                b,
                context: "decode".to_string(),
            });
        }

        fn table(
            cached: Option<RootsRecord>,
            provider: &dyn RuleProvider,
            order: usize,
        ) -> QuadResult<RuleTable> {
            match cached {
                Some(roots) => roots.into_table(order),
                None => provider.rule(order),
            }
        }
        let rules = RuleSet::from_tables(
            record.n1,
            record.n2,
            table(record.legendre_roots_n1, legendre, record.n1)?,
            table(record.legendre_roots_n2, legendre, record.n2)?,
            table(record.laguerre_roots_n1, laguerre, record.n1)?,
            table(record.laguerre_roots_n2, laguerre, record.n2)?,
        )?;

        let mut flags = (false, false);
        infer_singular_flags(&record.tree, a, b, &mut flags);

        // The singularity exponents are not part of the persisted format;
        // a decoded tree aggregates exactly but cannot resume the build.
        let options = TreeOptions {
            tol: record.tolerance,
            min_depth: record.min_depth,
            max_depth: record.max_depth,
            n1: record.n1,
            n2: record.n2,
            a_singular: flags.0,
            b_singular: flags.1,
            alpha_a: 0.0,
            alpha_b: 0.0,
        };
        options.validate()?;

        let root = decode_node(&record.tree, a, b)?;

        let mut metadata = TreeMetadata {
            name: record.name,
            reference: record.reference,
            description: record.description,
            author: record.author,
            version: record.version,
            update_log: record.update_log,
        };
        metadata.add_update_log("Loaded from record");

        debug!(nodes = root.node_count(), "tree decoded");
        Ok(Self::from_parts(a, b, options, metadata, rules, root))
    }

    /// Serialize to a pretty-printed JSON file.
    ///
    /// Refuses to replace an existing file unless `overwrite` is set.
    pub fn save_to_json<P: AsRef<Path>>(
        &self,
        path: P,
        overwrite: bool,
        dump_roots: bool,
    ) -> QuadResult<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(QuadError::FileExists {
                path: path.to_path_buf(),
            });
        }
        let json = serde_json::to_string_pretty(&self.to_record(dump_roots))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Deserialize a tree from a JSON file written by [`save_to_json`].
    ///
    /// I/O failures are surfaced untranslated; malformed content fails fast.
    ///
    /// [`save_to_json`]: AdaptiveGaussTree::save_to_json
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> QuadResult<Self> {
        let json = fs::read_to_string(path)?;
        let record: TreeRecord = serde_json::from_str(&json)?;
        Self::from_record(record)
    }
}
