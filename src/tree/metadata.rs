//! Tree metadata and the append-only update log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped entry in a tree's update log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntry {
    /// Wall-clock time the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Free-text message.
    pub message: String,
}

/// Descriptive metadata carried alongside a tree.
///
/// All fields are presentational; none affect the numerics. The update log
/// is append-only and gains entries at construction and load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeMetadata {
    pub name: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub version: String,
    pub update_log: Vec<UpdateEntry>,
}

impl Default for TreeMetadata {
    fn default() -> Self {
        Self {
            name: "Adaptive Quadrature Tree".to_string(),
            reference: None,
            description: None,
            author: None,
            version: "1.0".to_string(),
            update_log: Vec::new(),
        }
    }
}

impl TreeMetadata {
    /// Metadata with the given name and defaults elsewhere.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a timestamped message to the update log.
    pub fn add_update_log(&mut self, message: impl Into<String>) {
        self.update_log.push(UpdateEntry {
            timestamp: Utc::now(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_log_appends_in_order() {
        let mut meta = TreeMetadata::named("test");
        meta.add_update_log("first");
        meta.add_update_log("second");

        assert_eq!(meta.update_log.len(), 2);
        assert_eq!(meta.update_log[0].message, "first");
        assert_eq!(meta.update_log[1].message, "second");
        assert!(meta.update_log[0].timestamp <= meta.update_log[1].timestamp);
    }

    #[test]
    fn test_defaults() {
        let meta = TreeMetadata::default();
        assert_eq!(meta.name, "Adaptive Quadrature Tree");
        assert_eq!(meta.version, "1.0");
        assert!(meta.author.is_none());
        assert!(meta.update_log.is_empty());
    }
}
