//! Error types for adaptive quadrature operations.

use std::fmt;
use std::path::PathBuf;

/// Result type for quadrature operations.
pub type QuadResult<T> = Result<T, QuadError>;

/// Errors that can occur while building or persisting a quadrature tree.
///
/// Numeric degradation — an error estimate still above tolerance when the
/// depth cap is reached — is deliberately *not* represented here. The leaf is
/// accepted and its error estimate surfaces through aggregation.
#[derive(Debug)]
pub enum QuadError {
    /// Invalid interval provided (a >= b).
    InvalidInterval { a: f64, b: f64, context: String },

    /// Invalid parameter value.
    InvalidParameter { parameter: String, message: String },

    /// Depth bounds are inconsistent (min_depth > max_depth).
    InvalidDepthRange { min_depth: u32, max_depth: u32 },

    /// A rule provider returned tables whose length does not match the
    /// requested order.
    RuleTableMismatch {
        order: usize,
        nodes: usize,
        weights: usize,
    },

    /// A persisted record is not valid JSON or is missing required keys.
    MalformedRecord { message: String },

    /// Refusing to overwrite an existing file without the overwrite flag.
    FileExists { path: PathBuf },

    /// Underlying I/O failure, surfaced untranslated.
    Io(std::io::Error),
}

impl fmt::Display for QuadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInterval { a, b, context } => {
                write!(
                    f,
                    "Invalid interval [{}, {}] in {}: bounds must satisfy a < b",
                    a, b, context
                )
            }
            Self::InvalidParameter { parameter, message } => {
                write!(f, "Invalid parameter '{}': {}", parameter, message)
            }
            Self::InvalidDepthRange {
                min_depth,
                max_depth,
            } => {
                write!(
                    f,
                    "Invalid depth range: min_depth {} exceeds max_depth {}",
                    min_depth, max_depth
                )
            }
            Self::RuleTableMismatch {
                order,
                nodes,
                weights,
            } => {
                write!(
                    f,
                    "Rule table mismatch for order {}: {} nodes, {} weights",
                    order, nodes, weights
                )
            }
            Self::MalformedRecord { message } => {
                write!(f, "Malformed tree record: {}", message)
            }
            Self::FileExists { path } => {
                write!(
                    f,
                    "File {} exists; set overwrite to replace it",
                    path.display()
                )
            }
            Self::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for QuadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for QuadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for QuadError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedRecord {
            message: err.to_string(),
        }
    }
}
