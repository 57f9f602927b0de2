//! Record listing and paced field updates.

use crate::{ApiError, ApiResult, PushOutcome, PushPolicy};
use async_trait::async_trait;
use donation_sync_core::{derive_match_key, RemoteRecord, TargetConfig, UpdateInstruction};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use sync_run_log::RunLog;
use tracing::{debug, error, info, warn};

/// Request timeout for individual API calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Field names and IDs for the destination table schema.
///
/// Every value carries both a human-readable field name and a stable field
/// identifier. Reads try the name first with the ID as fallback; writes
/// set both, so the sync survives a field rename on either axis.
#[derive(Debug, Clone)]
pub struct RecordFieldConfig {
    /// Donation-page URL field, by name.
    pub url_field_name: String,
    /// Donation-page URL field, by stable ID.
    pub url_field_id: String,
    /// Dollars-raised field, by name.
    pub raised_field_name: String,
    /// Dollars-raised field, by stable ID.
    pub raised_field_id: String,
    /// Donation-count field, by name.
    pub donations_field_name: String,
    /// Donation-count field, by stable ID.
    pub donations_field_id: String,
    /// Fixed prefix stripped from the URL to derive the match key.
    pub donate_url_prefix: String,
}

/// Operations the orchestrator needs from the record-base API.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    /// Fetch all records of the target table that carry a derivable match
    /// key. An empty vec means the table is empty or no record has a
    /// qualifying URL.
    async fn fetch_records(&self, target: &TargetConfig) -> ApiResult<Vec<RemoteRecord>>;

    /// Apply the update instructions sequentially, pacing between
    /// requests. Individual failures are counted and logged, never fatal.
    async fn push_updates(
        &self,
        target: &TargetConfig,
        instructions: &[UpdateInstruction],
    ) -> PushOutcome;
}

/// Response body of the list-records endpoint.
#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    #[serde(default)]
    records: Vec<RecordPayload>,
}

/// One record in the list-records response.
#[derive(Debug, Deserialize)]
struct RecordPayload {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// HTTP client for the record-base API.
pub struct RecordBaseClient {
    client: reqwest::Client,
    api_base_url: String,
    token: String,
    fields: RecordFieldConfig,
    policy: PushPolicy,
    run_log: Arc<dyn RunLog>,
}

impl RecordBaseClient {
    /// Create a client. Fails when the token is blank; the API base URL is
    /// trimmed of trailing slashes.
    pub fn new(
        api_base_url: &str,
        token: &str,
        fields: RecordFieldConfig,
        policy: PushPolicy,
        run_log: Arc<dyn RunLog>,
    ) -> ApiResult<Self> {
        if token.trim().is_empty() {
            return Err(ApiError::Config("missing API token".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            fields,
            policy,
            run_log,
        })
    }

    fn table_url(&self, target: &TargetConfig) -> String {
        format!("{}/{}/{}", self.api_base_url, target.base_id, target.table_id)
    }

    fn record_url(&self, target: &TargetConfig, record_id: &str) -> String {
        format!("{}/{}", self.table_url(target), record_id)
    }

    async fn patch_record(
        &self,
        target: &TargetConfig,
        instruction: &UpdateInstruction,
    ) -> ApiResult<()> {
        let body = json!({
            "fields": update_fields(instruction, &self.fields),
        });

        let response = self
            .client
            .patch(self.record_url(target, &instruction.record_id))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl RecordsApi for RecordBaseClient {
    async fn fetch_records(&self, target: &TargetConfig) -> ApiResult<Vec<RemoteRecord>> {
        let response = self
            .client
            .get(self.table_url(target))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let listed: ListRecordsResponse = response.json().await?;
        let total = listed.records.len();
        let records = to_remote_records(listed.records, &self.fields);

        debug!(
            base_id = %target.base_id,
            table_id = %target.table_id,
            listed = total,
            matched = records.len(),
            "fetched remote records"
        );
        Ok(records)
    }

    async fn push_updates(
        &self,
        target: &TargetConfig,
        instructions: &[UpdateInstruction],
    ) -> PushOutcome {
        let mut outcome = PushOutcome::default();

        for (i, instruction) in instructions.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.policy.delay_between_requests).await;
            }

            match self.patch_record(target, instruction).await {
                Ok(()) => {
                    outcome.success_count += 1;
                    debug!(
                        record_id = %instruction.record_id,
                        total_amount = instruction.total_amount,
                        total_count = instruction.total_count,
                        "record updated"
                    );
                }
                Err(e) => {
                    outcome.error_count += 1;
                    error!(record_id = %instruction.record_id, error = %e, "record update failed");
                    self.run_log.error(&format!(
                        "update failed for record {} in {}/{}: {e}",
                        instruction.record_id, target.base_id, target.table_id
                    ));
                }
            }
        }

        info!(
            base_id = %target.base_id,
            table_id = %target.table_id,
            succeeded = outcome.success_count,
            failed = outcome.error_count,
            "push batch finished"
        );
        outcome
    }
}

/// Pull the donation-page URL out of a record's fields, trying the
/// human-readable name first and the stable field ID as fallback.
fn source_url<'a>(fields: &'a Map<String, Value>, cfg: &RecordFieldConfig) -> Option<&'a str> {
    fields
        .get(&cfg.url_field_name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            fields
                .get(&cfg.url_field_id)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
}

/// Convert listed payloads into `RemoteRecord`s, dropping records without
/// a derivable (non-empty) match key.
fn to_remote_records(payloads: Vec<RecordPayload>, cfg: &RecordFieldConfig) -> Vec<RemoteRecord> {
    payloads
        .into_iter()
        .filter_map(|payload| {
            let url = source_url(&payload.fields, cfg)?.to_string();
            let Some(match_key) = derive_match_key(&url, &cfg.donate_url_prefix) else {
                warn!(record_id = %payload.id, url = %url, "record URL has no derivable match key");
                return None;
            };
            Some(RemoteRecord {
                id: payload.id,
                source_url: url,
                match_key,
            })
        })
        .collect()
}

/// Build the PATCH field map, writing each value under both the field
/// name and the field ID.
fn update_fields(instruction: &UpdateInstruction, cfg: &RecordFieldConfig) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(cfg.raised_field_name.clone(), json!(instruction.total_amount));
    fields.insert(cfg.raised_field_id.clone(), json!(instruction.total_amount));
    fields.insert(cfg.donations_field_name.clone(), json!(instruction.total_count));
    fields.insert(cfg.donations_field_id.clone(), json!(instruction.total_count));
    fields
}
