//! Per-target sync pipeline.
//!
//! One run walks the configured destination targets in order and, for
//! each, pulls the remote records, reads the matching sheet rows,
//! aggregates per form slug, and pushes the totals back. Every stage can
//! degrade: a blank target, a fetch failure, a missing sheet, or an empty
//! join each log one run-log line and move on to the next target, so a
//! single broken target never stops the others.

use donation_sync_core::{aggregate_rows, build_update_instructions, TargetConfig};
use records_api_client::{PushOutcome, RecordsApi};
use sheet_grid_reader::RowReader;
use std::collections::HashSet;
use std::sync::Arc;
use sync_run_log::RunLog;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Totals for one full sync run, across all targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Targets that reached the push stage.
    pub targets_pushed: usize,
    /// Targets skipped at some earlier stage (blank config, no records,
    /// no rows, no instructions, or a degraded error).
    pub targets_skipped: usize,
    /// Record updates acknowledged across all targets.
    pub updates_succeeded: usize,
    /// Record updates that failed across all targets.
    pub updates_failed: usize,
}

/// Sequences the sync pipeline per configured target.
pub struct SyncOrchestrator {
    api: Arc<dyn RecordsApi>,
    reader: Arc<dyn RowReader>,
    run_log: Arc<dyn RunLog>,
    targets: Vec<TargetConfig>,
    sheet_name: String,
}

impl SyncOrchestrator {
    /// Wire an orchestrator over its injected collaborators.
    pub fn new(
        api: Arc<dyn RecordsApi>,
        reader: Arc<dyn RowReader>,
        run_log: Arc<dyn RunLog>,
        targets: Vec<TargetConfig>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            api,
            reader,
            run_log,
            targets,
            sheet_name: sheet_name.into(),
        }
    }

    /// Run one full sync across all configured targets.
    pub async fn run_sync(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("sync_run", run_id = %run_id);

        async {
            let mut report = RunReport::default();
            self.run_log.info(&format!(
                "sync run started ({} targets)",
                self.targets.len()
            ));

            for target in &self.targets {
                match self.sync_target(target).await {
                    Some(outcome) => {
                        report.targets_pushed += 1;
                        report.updates_succeeded += outcome.success_count;
                        report.updates_failed += outcome.error_count;
                    }
                    None => report.targets_skipped += 1,
                }
            }

            info!(
                pushed = report.targets_pushed,
                skipped = report.targets_skipped,
                succeeded = report.updates_succeeded,
                failed = report.updates_failed,
                "sync run finished"
            );
            self.run_log.info(&format!(
                "sync run finished: {} updated, {} failed, {} targets skipped",
                report.updates_succeeded, report.updates_failed, report.targets_skipped
            ));
            report
        }
        .instrument(span)
        .await
    }

    /// Run the pipeline for one target. Returns `None` when any stage
    /// decided to skip; the reason is already in the run log.
    async fn sync_target(&self, target: &TargetConfig) -> Option<PushOutcome> {
        let label = format!("{}/{}", target.base_id, target.table_id);

        if target.is_blank() {
            self.run_log.info(&format!("target {label}: blank config, skipped"));
            return None;
        }

        let records = match self.api.fetch_records(target).await {
            Ok(records) => records,
            Err(e) => {
                // Fetch failures degrade to "no records" for this target.
                self.run_log
                    .error(&format!("target {label}: record fetch failed: {e}"));
                return None;
            }
        };
        if records.is_empty() {
            self.run_log
                .info(&format!("target {label}: no records with donation URLs, skipped"));
            return None;
        }

        let candidate_keys: HashSet<String> =
            records.iter().map(|r| r.match_key.clone()).collect();

        let rows = match self.reader.read_matching_rows(&self.sheet_name, &candidate_keys) {
            Ok(rows) => rows,
            Err(e) => {
                self.run_log
                    .error(&format!("target {label}: sheet read failed: {e}"));
                return None;
            }
        };
        if rows.is_empty() {
            self.run_log
                .info(&format!("target {label}: no qualifying sheet rows, skipped"));
            return None;
        }

        let aggregates = aggregate_rows(&rows);
        let instructions = build_update_instructions(&records, &aggregates);
        if instructions.is_empty() {
            self.run_log
                .info(&format!("target {label}: no records matched an aggregate, skipped"));
            return None;
        }

        info!(
            target = %label,
            records = records.len(),
            rows = rows.len(),
            instructions = instructions.len(),
            "pushing updates"
        );
        let outcome = self.api.push_updates(target, &instructions).await;
        self.run_log.info(&format!(
            "target {label}: pushed {} updates, {} failed",
            outcome.success_count, outcome.error_count
        ));
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use donation_sync_core::{RemoteRecord, SheetRow, UpdateInstruction};
    use parking_lot::Mutex;
    use records_api_client::{ApiError, ApiResult};
    use sheet_grid_reader::{ReaderError, ReaderResult};
    use sync_run_log::MemoryRunLog;

    struct MockApi {
        records: ApiResult<Vec<RemoteRecord>>,
        fetch_calls: Mutex<usize>,
        pushed: Mutex<Vec<(TargetConfig, Vec<UpdateInstruction>)>>,
    }

    impl MockApi {
        fn with_records(records: Vec<RemoteRecord>) -> Self {
            Self {
                records: Ok(records),
                fetch_calls: Mutex::new(0),
                pushed: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                records: Err(ApiError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
                fetch_calls: Mutex::new(0),
                pushed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecordsApi for MockApi {
        async fn fetch_records(&self, _target: &TargetConfig) -> ApiResult<Vec<RemoteRecord>> {
            *self.fetch_calls.lock() += 1;
            match &self.records {
                Ok(records) => Ok(records.clone()),
                Err(_) => Err(ApiError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }

        async fn push_updates(
            &self,
            target: &TargetConfig,
            instructions: &[UpdateInstruction],
        ) -> PushOutcome {
            self.pushed.lock().push((target.clone(), instructions.to_vec()));
            PushOutcome {
                success_count: instructions.len(),
                error_count: 0,
            }
        }
    }

    struct MockReader {
        result: Result<Vec<SheetRow>, ()>,
    }

    impl RowReader for MockReader {
        fn read_matching_rows(
            &self,
            _sheet_name: &str,
            candidate_keys: &HashSet<String>,
        ) -> ReaderResult<Vec<SheetRow>> {
            match &self.result {
                Ok(rows) => Ok(rows
                    .iter()
                    .filter(|r| candidate_keys.contains(&r.match_key))
                    .cloned()
                    .collect()),
                Err(()) => Err(ReaderError::MissingColumn("num_of_donations".to_string())),
            }
        }
    }

    fn record(id: &str, key: &str) -> RemoteRecord {
        RemoteRecord {
            id: id.to_string(),
            source_url: format!("https://give.example.org/donate/{key}"),
            match_key: key.to_string(),
        }
    }

    fn row(key: &str, amount: f64, count: i64) -> SheetRow {
        SheetRow {
            match_key: key.to_string(),
            amount,
            count,
        }
    }

    fn orchestrator(
        api: Arc<MockApi>,
        reader: MockReader,
        log: Arc<MemoryRunLog>,
        targets: Vec<TargetConfig>,
    ) -> SyncOrchestrator {
        SyncOrchestrator::new(api, Arc::new(reader), log, targets, "Donations")
    }

    #[tokio::test]
    async fn end_to_end_scenario_updates_only_matched_positive_forms() {
        // Remote: alpha + beta. Sheet: alpha twice, beta all-zero (dropped
        // by the reader), gamma with no remote record.
        let api = Arc::new(MockApi::with_records(vec![
            record("r1", "alpha"),
            record("r2", "beta"),
        ]));
        let reader = MockReader {
            result: Ok(vec![
                row("alpha", 10.5, 2),
                row("alpha", 4.5, 1),
                row("gamma", 100.0, 5),
            ]),
        };
        let log = Arc::new(MemoryRunLog::new());

        let orch = orchestrator(
            api.clone(),
            reader,
            log,
            vec![TargetConfig::new("appA", "tblB")],
        );
        let report = orch.run_sync().await;

        let pushed = api.pushed.lock();
        assert_eq!(pushed.len(), 1);
        let (_, instructions) = &pushed[0];
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].record_id, "r1");
        assert_eq!(instructions[0].total_amount, 15.0);
        assert_eq!(instructions[0].total_count, 3);

        assert_eq!(report.targets_pushed, 1);
        assert_eq!(report.updates_succeeded, 1);
        assert_eq!(report.updates_failed, 0);
    }

    #[tokio::test]
    async fn blank_target_issues_no_requests_and_logs_once() {
        let api = Arc::new(MockApi::with_records(vec![record("r1", "alpha")]));
        let reader = MockReader { result: Ok(vec![]) };
        let log = Arc::new(MemoryRunLog::new());

        let orch = orchestrator(
            api.clone(),
            reader,
            log.clone(),
            vec![TargetConfig::new("", "tblX")],
        );
        let report = orch.run_sync().await;

        assert_eq!(*api.fetch_calls.lock(), 0);
        assert!(api.pushed.lock().is_empty());
        assert_eq!(report.targets_skipped, 1);

        let skip_lines: Vec<_> = log
            .messages()
            .into_iter()
            .filter(|m| m.contains("blank config"))
            .collect();
        assert_eq!(skip_lines.len(), 1);
    }

    #[tokio::test]
    async fn missing_column_skips_target_and_logs_error() {
        let api = Arc::new(MockApi::with_records(vec![record("r1", "alpha")]));
        let reader = MockReader { result: Err(()) };
        let log = Arc::new(MemoryRunLog::new());

        let orch = orchestrator(
            api.clone(),
            reader,
            log.clone(),
            vec![TargetConfig::new("appA", "tblB")],
        );
        let report = orch.run_sync().await;

        assert!(api.pushed.lock().is_empty());
        assert_eq!(report.targets_pushed, 0);
        assert_eq!(report.targets_skipped, 1);
        assert!(log
            .entries()
            .iter()
            .any(|e| e.level == sync_run_log::LogLevel::Error
                && e.message.contains("sheet read failed")));
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_skip() {
        let api = Arc::new(MockApi::failing());
        let reader = MockReader {
            result: Ok(vec![row("alpha", 1.0, 1)]),
        };
        let log = Arc::new(MemoryRunLog::new());

        let orch = orchestrator(
            api.clone(),
            reader,
            log.clone(),
            vec![TargetConfig::new("appA", "tblB")],
        );
        let report = orch.run_sync().await;

        assert!(api.pushed.lock().is_empty());
        assert_eq!(report.targets_skipped, 1);
        assert!(log.messages().iter().any(|m| m.contains("record fetch failed")));
    }

    #[tokio::test]
    async fn one_bad_target_does_not_stop_the_next() {
        let api = Arc::new(MockApi::with_records(vec![record("r1", "alpha")]));
        let reader = MockReader {
            result: Ok(vec![row("alpha", 5.0, 1)]),
        };
        let log = Arc::new(MemoryRunLog::new());

        let orch = orchestrator(
            api.clone(),
            reader,
            log,
            vec![
                TargetConfig::new("", ""),
                TargetConfig::new("appA", "tblB"),
            ],
        );
        let report = orch.run_sync().await;

        assert_eq!(report.targets_skipped, 1);
        assert_eq!(report.targets_pushed, 1);
        assert_eq!(api.pushed.lock().len(), 1);
    }

    #[tokio::test]
    async fn no_matching_rows_skips_push() {
        let api = Arc::new(MockApi::with_records(vec![record("r1", "alpha")]));
        let reader = MockReader {
            result: Ok(vec![row("delta", 5.0, 1)]),
        };
        let log = Arc::new(MemoryRunLog::new());

        let orch = orchestrator(
            api.clone(),
            reader,
            log.clone(),
            vec![TargetConfig::new("appA", "tblB")],
        );
        orch.run_sync().await;

        assert!(api.pushed.lock().is_empty());
        assert!(log.messages().iter().any(|m| m.contains("no qualifying sheet rows")));
    }

    #[tokio::test]
    async fn sync_is_idempotent_for_unchanged_input() {
        let api = Arc::new(MockApi::with_records(vec![record("r1", "alpha")]));
        let reader = MockReader {
            result: Ok(vec![row("alpha", 10.5, 2), row("alpha", 4.5, 1)]),
        };
        let log = Arc::new(MemoryRunLog::new());

        let orch = orchestrator(
            api.clone(),
            reader,
            log,
            vec![TargetConfig::new("appA", "tblB")],
        );
        orch.run_sync().await;
        orch.run_sync().await;

        let pushed = api.pushed.lock();
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[0].1, pushed[1].1);
    }
}
