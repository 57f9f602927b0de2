//! Per-form aggregation and the record/aggregate join.

use crate::{RemoteRecord, SheetRow, UpdateInstruction};
use std::collections::HashMap;

/// Summed measures for one form slug.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    /// Sum of `amount` across all contributing rows.
    pub total_amount: f64,
    /// Sum of `count` across all contributing rows.
    pub total_count: i64,
}

/// Group rows by match key and sum both measures.
///
/// The accumulation is a plain left-to-right fold in input row order, so
/// floating-point sums are reproducible across runs with identical input.
/// Rows are already filtered by the reader; a key appears in the output iff
/// at least one row carried it.
pub fn aggregate_rows(rows: &[SheetRow]) -> HashMap<String, Aggregate> {
    let mut totals: HashMap<String, Aggregate> = HashMap::new();

    for row in rows {
        let entry = totals.entry(row.match_key.clone()).or_default();
        entry.total_amount += row.amount;
        entry.total_count += row.count;
    }

    totals
}

/// Join remote records with aggregates by exact match-key equality.
///
/// Instructions come out in remote-record order. Records without an
/// aggregate produce nothing; aggregates without a record are ignored.
pub fn build_update_instructions(
    records: &[RemoteRecord],
    aggregates: &HashMap<String, Aggregate>,
) -> Vec<UpdateInstruction> {
    records
        .iter()
        .filter_map(|record| {
            aggregates.get(&record.match_key).map(|agg| UpdateInstruction {
                record_id: record.id.clone(),
                total_amount: agg.total_amount,
                total_count: agg.total_count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, amount: f64, count: i64) -> SheetRow {
        SheetRow {
            match_key: key.to_string(),
            amount,
            count,
        }
    }

    fn record(id: &str, key: &str) -> RemoteRecord {
        RemoteRecord {
            id: id.to_string(),
            source_url: format!("https://give.example.org/donate/{key}"),
            match_key: key.to_string(),
        }
    }

    #[test]
    fn sums_both_measures_per_key() {
        let rows = vec![row("alpha", 10.5, 2), row("alpha", 4.5, 1), row("beta", 3.0, 1)];
        let totals = aggregate_rows(&rows);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals["alpha"].total_amount, 15.0);
        assert_eq!(totals["alpha"].total_count, 3);
        assert_eq!(totals["beta"].total_amount, 3.0);
        assert_eq!(totals["beta"].total_count, 1);
    }

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(aggregate_rows(&[]).is_empty());
    }

    #[test]
    fn key_order_does_not_change_totals() {
        let forward = vec![row("a", 1.0, 1), row("b", 2.0, 2), row("a", 3.0, 3)];
        let shuffled = vec![row("b", 2.0, 2), row("a", 1.0, 1), row("a", 3.0, 3)];

        let lhs = aggregate_rows(&forward);
        let rhs = aggregate_rows(&shuffled);
        assert_eq!(lhs["a"].total_count, rhs["a"].total_count);
        assert_eq!(lhs["b"].total_amount, rhs["b"].total_amount);
    }

    #[test]
    fn join_emits_only_keys_present_on_both_sides() {
        let records = vec![record("r1", "alpha"), record("r2", "beta")];
        let mut aggregates = HashMap::new();
        aggregates.insert(
            "alpha".to_string(),
            Aggregate {
                total_amount: 15.0,
                total_count: 3,
            },
        );
        aggregates.insert(
            "gamma".to_string(),
            Aggregate {
                total_amount: 100.0,
                total_count: 5,
            },
        );

        let instructions = build_update_instructions(&records, &aggregates);
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].record_id, "r1");
        assert_eq!(instructions[0].total_amount, 15.0);
        assert_eq!(instructions[0].total_count, 3);
    }

    #[test]
    fn join_preserves_remote_record_order() {
        let records = vec![record("r2", "beta"), record("r1", "alpha")];
        let mut aggregates = HashMap::new();
        aggregates.insert("alpha".to_string(), Aggregate::default());
        aggregates.insert("beta".to_string(), Aggregate::default());

        let instructions = build_update_instructions(&records, &aggregates);
        let ids: Vec<_> = instructions.iter().map(|i| i.record_id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1"]);
    }

    #[test]
    fn idempotent_for_identical_input() {
        let rows = vec![row("alpha", 10.5, 2), row("alpha", 4.5, 1)];
        let records = vec![record("r1", "alpha")];

        let first = build_update_instructions(&records, &aggregate_rows(&rows));
        let second = build_update_instructions(&records, &aggregate_rows(&rows));
        assert_eq!(first, second);
    }
}
