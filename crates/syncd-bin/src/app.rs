//! Component wiring and trigger entry points.

use anyhow::Result;
use records_api_client::{PushPolicy, RecordBaseClient, RecordFieldConfig};
use sheet_grid_reader::{GridReader, JsonWorkbook};
use std::sync::Arc;
use std::time::Duration;
use sync_orchestrator::SyncOrchestrator;
use sync_rate_limiter::{RateLimiter, SystemClock};
use sync_run_log::{JsonlRunLog, RunLog};
use syncd_config_and_utils::{api_token_from_env, Config, Paths, API_TOKEN_ENV};
use syncd_storage::JsonFileStore;
use tracing::{error, info, warn};

/// Manual trigger: one sync, no rate limiting.
pub async fn run_manual(config: &Config, paths: &Paths) -> Result<()> {
    let run_log = open_run_log(paths)?;
    let Some(orchestrator) = build_orchestrator(config, paths, run_log.clone())? else {
        return Ok(());
    };

    info!("manual sync triggered");
    orchestrator.run_sync().await;
    Ok(())
}

/// Automatic trigger: one sync, suppressed when the previous automatic
/// run was less than `rate_limit_hours` ago.
pub async fn run_tick(config: &Config, paths: &Paths) -> Result<()> {
    let run_log = open_run_log(paths)?;
    let store = Arc::new(JsonFileStore::new(paths.state_file()));
    let limiter = RateLimiter::new(store, Arc::new(SystemClock), config.rate_limit_hours);

    if limiter.should_skip()? {
        info!("automatic sync rate limited, skipping");
        run_log.info("automatic sync skipped: rate limited");
        return Ok(());
    }

    let Some(orchestrator) = build_orchestrator(config, paths, run_log.clone())? else {
        return Ok(());
    };

    info!("automatic sync triggered");
    orchestrator.run_sync().await;
    limiter.record_sync_now()?;
    Ok(())
}

/// Resident timer loop: an automatic trigger attempt every interval.
pub async fn run_watch(config: &Config, paths: &Paths, interval_secs: u64) -> Result<()> {
    info!(interval_secs = interval_secs, "watch loop started");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick fires immediately; that is the intended behavior for
    // a freshly started watcher.
    loop {
        ticker.tick().await;
        watch_tick(config, paths).await;
    }
}

/// One watch-loop iteration. A failed tick (corrupt state slot, log file
/// IO) is logged and the loop keeps running; only `tick` as a standalone
/// subcommand propagates the error.
async fn watch_tick(config: &Config, paths: &Paths) {
    if let Err(e) = run_tick(config, paths).await {
        error!(error = %e, "automatic sync tick failed");
        if let Ok(run_log) = open_run_log(paths) {
            run_log.error(&format!("automatic sync tick failed: {e}"));
        }
    }
}

fn open_run_log(paths: &Paths) -> Result<Arc<dyn RunLog>> {
    Ok(Arc::new(JsonlRunLog::new(&paths.run_log_file())?))
}

/// Wire the pipeline. Returns `None` (after logging) when configuration
/// rules out a run entirely: a missing token is a skip, never a crash.
fn build_orchestrator(
    config: &Config,
    paths: &Paths,
    run_log: Arc<dyn RunLog>,
) -> Result<Option<SyncOrchestrator>> {
    let Some(token) = api_token_from_env() else {
        warn!("no API token in environment, sync run skipped");
        run_log.error(&format!("sync skipped: {API_TOKEN_ENV} is not set"));
        return Ok(None);
    };

    let fields = RecordFieldConfig {
        url_field_name: config.url_field_name.clone(),
        url_field_id: config.url_field_id.clone(),
        raised_field_name: config.raised_field_name.clone(),
        raised_field_id: config.raised_field_id.clone(),
        donations_field_name: config.donations_field_name.clone(),
        donations_field_id: config.donations_field_id.clone(),
        donate_url_prefix: config.donate_url_prefix.clone(),
    };
    let policy = PushPolicy {
        delay_between_requests: Duration::from_millis(config.push_delay_ms),
    };
    let api = Arc::new(RecordBaseClient::new(
        &config.api_base_url,
        &token,
        fields,
        policy,
        run_log.clone(),
    )?);

    let workbook = Arc::new(JsonWorkbook::new(config.workbook_path(paths)));
    let reader = Arc::new(GridReader::new(workbook));

    Ok(Some(SyncOrchestrator::new(
        api,
        reader,
        run_log,
        config.targets.clone(),
        config.sheet_name.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn paths_with_corrupt_state() -> (tempfile::TempDir, Paths) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("state.json"), "not json").unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        (dir, paths)
    }

    #[tokio::test]
    async fn standalone_tick_propagates_a_corrupt_state_slot() {
        let (_dir, paths) = paths_with_corrupt_state();
        let config = Config::default();
        assert!(run_tick(&config, &paths).await.is_err());
    }

    #[tokio::test]
    async fn watch_tick_survives_a_failing_tick() {
        let (_dir, paths) = paths_with_corrupt_state();
        let config = Config::default();

        // Must return (not error, not panic) so the resident loop keeps
        // running, and the failure must be visible in the run log.
        watch_tick(&config, &paths).await;

        let log = std::fs::read_to_string(paths.run_log_file()).unwrap();
        assert!(log.contains("automatic sync tick failed"));
    }
}
