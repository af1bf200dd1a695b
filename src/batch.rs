//! Batch quadrature over a parameter grid.
//!
//! A batch takes named parameter dimensions, forms their cartesian product,
//! and builds one adaptive tree per combination. Results live in a flat run
//! table keyed by the parameter values, in product order (first dimension
//! varies slowest). The whole batch persists to a single JSON file; on load,
//! a run whose tree fails to decode is logged and skipped rather than
//! failing the batch.

use std::fmt;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::TreeRecord;
use crate::error::{QuadError, QuadResult};
use crate::tree::{AdaptiveGaussTree, TreeMetadata, TreeOptions};

/// One coordinate of a parameter combination.
///
/// Untagged on the wire: integers stay integers, everything else falls
/// through to float or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Ordered parameter dimensions for a batch.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    dimensions: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named dimension. Order matters: earlier dimensions vary
    /// slower in the product.
    pub fn dimension(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<ParamValue>>,
    ) -> Self {
        self.dimensions
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Dimension names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.dimensions.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Every value combination, in product order.
    pub fn combinations(&self) -> Vec<Vec<ParamValue>> {
        self.dimensions
            .iter()
            .map(|(_, values)| values.iter().cloned())
            .multi_cartesian_product()
            .collect()
    }

    fn validate(&self) -> QuadResult<()> {
        if self.dimensions.is_empty() {
            return Err(QuadError::InvalidParameter {
                parameter: "grid".to_string(),
                message: "a batch needs at least one dimension".to_string(),
            });
        }
        for (name, values) in &self.dimensions {
            if values.is_empty() {
                return Err(QuadError::InvalidParameter {
                    parameter: name.clone(),
                    message: "dimension has no values".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The integration problem for one parameter combination.
pub struct BatchJob<F> {
    pub f: F,
    pub a: f64,
    pub b: f64,
    pub options: TreeOptions,
}

/// One completed run: the parameter values and the tree they produced.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub values: Vec<ParamValue>,
    pub tree: AdaptiveGaussTree,
}

impl BatchRun {
    /// Underscore-joined value string, used as the run label.
    pub fn key(&self) -> String {
        self.values.iter().join("_")
    }
}

/// A family of adaptive trees over a parameter grid.
#[derive(Debug, Clone)]
pub struct BatchQuadrature {
    dimensions: Vec<String>,
    runs: Vec<BatchRun>,
}

/// Persisted form of a batch: the dimension names and a flat run table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    pub dimensions: Vec<String>,
    pub runs: Vec<BatchRunRecord>,
}

/// Persisted form of one run. The tree may be absent in a damaged or
/// partially written file; the load path warns and skips such runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRunRecord {
    pub values: Vec<ParamValue>,
    #[serde(default)]
    pub tree: Option<TreeRecord>,
}

impl BatchQuadrature {
    /// Build one tree per grid combination.
    ///
    /// `job` maps each combination to its integrand, bounds, and options.
    /// Any single failed build fails the whole batch; partial results are
    /// the load path's concern, not the build path's.
    pub fn run<F, G>(grid: &ParamGrid, job: G) -> QuadResult<Self>
    where
        F: Fn(f64) -> f64,
        G: Fn(&[ParamValue]) -> BatchJob<F>,
    {
        grid.validate()?;

        let mut runs = Vec::new();
        for values in grid.combinations() {
            let BatchJob { f, a, b, options } = job(&values);
            let key = values.iter().join("_");
            let tree = AdaptiveGaussTree::new(f, a, b, options, TreeMetadata::named(&key))?;
            debug!(run = %key, "batch run complete");
            runs.push(BatchRun { values, tree });
        }

        Ok(Self {
            dimensions: grid.names(),
            runs,
        })
    }

    /// Dimension names, in grid order.
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// All runs, in product order.
    pub fn runs(&self) -> &[BatchRun] {
        &self.runs
    }

    /// Look up a run by its exact parameter values.
    pub fn find(&self, values: &[ParamValue]) -> Option<&BatchRun> {
        self.runs.iter().find(|run| run.values == values)
    }

    /// `(values, integral, error)` for every run.
    pub fn results(&self) -> Vec<(&[ParamValue], f64, f64)> {
        self.runs
            .iter()
            .map(|run| {
                let (integral, error) = run.tree.integral_and_error();
                (run.values.as_slice(), integral, error)
            })
            .collect()
    }

    /// Encode the whole batch as a persistable record.
    pub fn to_record(&self, dump_roots: bool) -> BatchRecord {
        BatchRecord {
            dimensions: self.dimensions.clone(),
            runs: self
                .runs
                .iter()
                .map(|run| BatchRunRecord {
                    values: run.values.clone(),
                    tree: Some(run.tree.to_record(dump_roots)),
                })
                .collect(),
        }
    }

    /// Decode a batch record. A run whose tree record does not decode is
    /// logged and dropped; the surviving runs still form a usable batch.
    pub fn from_record(record: BatchRecord) -> Self {
        let mut runs = Vec::new();
        for run in record.runs {
            let key = run.values.iter().join("_");
            let Some(tree_record) = run.tree else {
                warn!(run = %key, "skipping batch run with no tree");
                continue;
            };
            match AdaptiveGaussTree::from_record(tree_record) {
                Ok(tree) => runs.push(BatchRun {
                    values: run.values,
                    tree,
                }),
                Err(err) => {
                    warn!(run = %key, %err, "skipping undecodable batch run");
                }
            }
        }
        Self {
            dimensions: record.dimensions,
            runs,
        }
    }

    /// Serialize the batch to a pretty-printed JSON file.
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

    /// Deserialize a batch from a JSON file written by [`save_to_json`].
    ///
    /// [`save_to_json`]: BatchQuadrature::save_to_json
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> QuadResult<Self> {
        let json = fs::read_to_string(path)?;
        let record: BatchRecord = serde_json::from_str(&json)?;
        Ok(Self::from_record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power_grid() -> ParamGrid {
        ParamGrid::new()
            .dimension("power", [1i64, 2, 3])
            .dimension("scale", [1.0, 2.0])
    }

    fn power_job(values: &[ParamValue]) -> BatchJob<impl Fn(f64) -> f64> {
        let power = match values[0] {
            ParamValue::Int(p) => p as i32,
            _ => panic!("power must be an integer"),
        };
        let scale = match values[1] {
            ParamValue::Float(c) => c,
            _ => panic!("scale must be a float"),
        };
        BatchJob {
            f: move |x: f64| scale * x.powi(power),
            a: 0.0,
            b: 1.0,
            options: TreeOptions {
                n1: 3,
                n2: 6,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_grid_product_order() {
        let combos = power_grid().combinations();
        assert_eq!(combos.len(), 6);
        // First dimension varies slowest.
        assert_eq!(
            combos[0],
            vec![ParamValue::Int(1), ParamValue::Float(1.0)]
        );
        assert_eq!(
            combos[1],
            vec![ParamValue::Int(1), ParamValue::Float(2.0)]
        );
        assert_eq!(
            combos[5],
            vec![ParamValue::Int(3), ParamValue::Float(2.0)]
        );
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(BatchQuadrature::run(&ParamGrid::new(), power_job).is_err());

        let grid = ParamGrid::new().dimension("power", Vec::<i64>::new());
        assert!(BatchQuadrature::run(&grid, power_job).is_err());
    }

    #[test]
    fn test_batch_integrals() {
        // Integral of c * x^p over [0, 1] is c / (p + 1).
        let batch = BatchQuadrature::run(&power_grid(), power_job).unwrap();
        assert_eq!(batch.dimensions(), ["power", "scale"]);
        assert_eq!(batch.runs().len(), 6);

        for (values, integral, _) in batch.results() {
            let (ParamValue::Int(p), ParamValue::Float(c)) = (&values[0], &values[1]) else {
                panic!("unexpected value kinds");
            };
            let expected = c / (*p as f64 + 1.0);
            assert!(
                (integral - expected).abs() < 1e-10,
                "p = {}, c = {}: got {}",
                p,
                c,
                integral
            );
        }
    }

    #[test]
    fn test_find_and_key() {
        let batch = BatchQuadrature::run(&power_grid(), power_job).unwrap();

        let run = batch
            .find(&[ParamValue::Int(2), ParamValue::Float(2.0)])
            .unwrap();
        assert_eq!(run.key(), "2_2");
        let (integral, _) = run.tree.integral_and_error();
        assert!((integral - 2.0 / 3.0).abs() < 1e-10);

        assert!(batch
            .find(&[ParamValue::Int(9), ParamValue::Float(1.0)])
            .is_none());
    }

    #[test]
    fn test_record_round_trip() {
        let batch = BatchQuadrature::run(&power_grid(), power_job).unwrap();
        let decoded = BatchQuadrature::from_record(batch.to_record(false));

        assert_eq!(decoded.dimensions(), batch.dimensions());
        assert_eq!(decoded.runs().len(), batch.runs().len());
        for (orig, dec) in batch.runs().iter().zip(decoded.runs()) {
            assert_eq!(orig.values, dec.values);
            assert_eq!(
                orig.tree.integral_and_error(),
                dec.tree.integral_and_error()
            );
        }
    }

    #[test]
    fn test_undecodable_run_skipped() {
        let batch = BatchQuadrature::run(&power_grid(), power_job).unwrap();
        let mut record = batch.to_record(false);
        // A one-sided child makes the run's tree undecodable.
        record.runs[2].tree.as_mut().unwrap().tree.right = None;

        let decoded = BatchQuadrature::from_record(record);
        assert_eq!(decoded.runs().len(), 5);
        assert!(decoded
            .find(&[ParamValue::Int(2), ParamValue::Float(1.0)])
            .is_none());
    }

    #[test]
    fn test_missing_tree_skipped() {
        let batch = BatchQuadrature::run(&power_grid(), power_job).unwrap();
        let mut record = batch.to_record(false);
        record.runs[0].tree = None;

        let decoded = BatchQuadrature::from_record(record);
        assert_eq!(decoded.runs().len(), 5);
        assert!(decoded
            .find(&[ParamValue::Int(1), ParamValue::Float(1.0)])
            .is_none());
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");

        let batch = BatchQuadrature::run(&power_grid(), power_job).unwrap();
        batch.save_to_json(&path, false, false).unwrap();
        let err = batch.save_to_json(&path, false, false);
        assert!(matches!(err, Err(QuadError::FileExists { .. })));

        let loaded = BatchQuadrature::load_from_json(&path).unwrap();
        assert_eq!(loaded.runs().len(), 6);
        for (orig, dec) in batch.runs().iter().zip(loaded.runs()) {
            assert_eq!(
                orig.tree.integral_and_error(),
                dec.tree.integral_and_error()
            );
        }
    }

    #[test]
    fn test_param_value_wire_form() {
        let json = serde_json::to_string(&vec![
            ParamValue::Int(2),
            ParamValue::Float(0.5),
            ParamValue::Text("cosine".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[2,0.5,"cosine"]"#);

        let back: Vec<ParamValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0], ParamValue::Int(2));
        assert_eq!(back[1], ParamValue::Float(0.5));
        assert_eq!(back[2], ParamValue::Text("cosine".to_string()));
    }
}
