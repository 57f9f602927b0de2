//! Domain types shared across the sync pipeline.

use serde::{Deserialize, Serialize};

/// One destination table to synchronize into.
///
/// A target is a (base, table) pair in the record-base API. Blank targets
/// are tolerated in configuration and skipped at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base identifier (e.g. `appXXXXXXXXXXXXXX`).
    pub base_id: String,
    /// Table identifier or name within the base.
    pub table_id: String,
}

impl TargetConfig {
    /// Create a target from its two identifiers.
    pub fn new(base_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            table_id: table_id.into(),
        }
    }

    /// A target is blank when either identifier is empty after trimming.
    /// Blank targets are skipped by the orchestrator, never treated as errors.
    pub fn is_blank(&self) -> bool {
        self.base_id.trim().is_empty() || self.table_id.trim().is_empty()
    }
}

/// A record fetched from a destination table.
///
/// Invariant: `match_key` is always non-empty. Records whose source URL is
/// empty or does not contain the configured prefix are discarded before a
/// `RemoteRecord` is ever constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    /// Opaque record identifier assigned by the remote service.
    pub id: String,
    /// The full donation-page URL stored on the record.
    pub source_url: String,
    /// Form slug derived from `source_url` by prefix stripping.
    pub match_key: String,
}

/// One qualifying row read from the donations sheet.
///
/// Invariant: `amount > 0.0 || count > 0`. Rows where both measures coerce
/// to zero are dropped by the reader and never reach aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// Form slug from the `form_name` column.
    pub match_key: String,
    /// Dollars raised for this row.
    pub amount: f64,
    /// Number of donations for this row.
    pub count: i64,
}

/// A single field update to issue against a remote record.
///
/// Produced by joining remote records with aggregates on `match_key`; only
/// keys present on both sides yield an instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInstruction {
    /// Remote record to patch.
    pub record_id: String,
    /// Summed dollars raised for the record's form.
    pub total_amount: f64,
    /// Summed donation count for the record's form.
    pub total_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_target_detection() {
        assert!(TargetConfig::new("", "tblX").is_blank());
        assert!(TargetConfig::new("appX", "").is_blank());
        assert!(TargetConfig::new("  ", "tblX").is_blank());
        assert!(!TargetConfig::new("appX", "tblX").is_blank());
    }

    #[test]
    fn target_round_trips_through_json() {
        let target = TargetConfig::new("appA", "tblB");
        let json = serde_json::to_string(&target).unwrap();
        let back: TargetConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(target, back);
    }
}
