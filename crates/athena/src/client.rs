//! Report execution on AWS Athena.
//!
//! [`AthenaClient`] submits a query, polls it with exponential backoff until
//! it reaches a terminal state, cancels it once the configured timeout has
//! passed, and pages through the result set.

use std::time::{Duration, Instant};

use aws_config::BehaviorVersion;
use aws_sdk_athena::types::{
    QueryExecution, QueryExecutionContext, QueryExecutionState, ResultConfiguration, Row,
};
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::config::AthenaConfig;
use crate::error::AthenaError;
use crate::reports::Report;
use crate::result::{AthenaColumn, AthenaQueryResult, QueryMetadata};

const JITTER_MS: u64 = 100;

/// Poll interval: starts at 200ms, grows by 1.5x, capped at 2s.
#[derive(Debug, Clone)]
struct Backoff {
    delay: Duration,
}

impl Backoff {
    const INITIAL: Duration = Duration::from_millis(200);
    const MAX: Duration = Duration::from_secs(2);
    const FACTOR: f64 = 1.5;

    fn new() -> Self {
        Self { delay: Self::INITIAL }
    }

    /// Sleep for this round, then advance.
    fn next_delay(&mut self, jitter_ms: u64) -> Duration {
        let sleep = self.delay + Duration::from_millis(jitter_ms);
        self.delay = self.delay.mul_f64(Self::FACTOR).min(Self::MAX);
        sleep
    }
}

fn sdk_err(e: impl std::fmt::Display) -> AthenaError {
    AthenaError::AwsSdk(e.to_string())
}

/// Flatten result rows into optional strings, dropping the header echo
/// Athena puts at the top of the first page of a SELECT.
fn page_rows(rows: &[Row], skip_header: bool) -> Vec<Vec<Option<String>>> {
    let skip = usize::from(skip_header && !rows.is_empty());
    rows.iter()
        .skip(skip)
        .map(|row| {
            row.data()
                .iter()
                .map(|datum| datum.var_char_value().map(str::to_string))
                .collect()
        })
        .collect()
}

fn extract_metadata(query_id: &str, qe: &QueryExecution) -> QueryMetadata {
    let stats = qe.statistics();
    QueryMetadata {
        query_id: query_id.to_string(),
        bytes_scanned: stats
            .and_then(|s| s.data_scanned_in_bytes())
            .unwrap_or(0)
            .max(0) as u64,
        execution_time_ms: stats
            .and_then(|s| s.engine_execution_time_in_millis())
            .unwrap_or(0)
            .max(0) as u64,
        state: qe
            .status()
            .and_then(|s| s.state())
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        output_location: qe
            .result_configuration()
            .and_then(|rc| rc.output_location())
            .map(str::to_string),
    }
}

pub struct AthenaClient {
    config: AthenaConfig,
    inner: aws_sdk_athena::Client,
}

impl AthenaClient {
    /// Fails with [`AthenaError::NotEnabled`] unless `ATHENA_ENABLED` is set.
    pub async fn new(config: AthenaConfig) -> Result<Self, AthenaError> {
        if !config.enabled {
            return Err(AthenaError::NotEnabled);
        }

        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_athena::config::Region::new(config.region.clone()))
            .load()
            .await;

        info!(
            region = %config.region,
            database = %config.database,
            table = %config.table,
            workgroup = %config.workgroup,
            "athena client ready"
        );

        Ok(Self {
            inner: aws_sdk_athena::Client::new(&aws_cfg),
            config,
        })
    }

    pub fn config(&self) -> &AthenaConfig {
        &self.config
    }

    /// Render `report` against the configured table and run it.
    ///
    /// Scans above `max_scan_bytes` are reported as
    /// [`AthenaError::ScanLimitExceeded`] once the query has finished; Athena
    /// offers no estimate up front.
    pub async fn run_report(&self, report: &Report) -> Result<AthenaQueryResult, AthenaError> {
        let sql = report.render(&self.config.target())?;
        let result = self.execute_query(&sql).await?;

        let limit = self.config.max_scan_bytes;
        if limit > 0 && result.metadata.bytes_scanned > limit {
            warn!(
                report = report.name(),
                query_id = %result.metadata.query_id,
                bytes_scanned = result.metadata.bytes_scanned,
                limit,
                "report exceeded scan limit"
            );
            return Err(AthenaError::ScanLimitExceeded {
                bytes_scanned: result.metadata.bytes_scanned,
                limit,
            });
        }

        info!(
            report = report.name(),
            query_id = %result.metadata.query_id,
            rows = result.row_count(),
            bytes_scanned = result.metadata.bytes_scanned,
            "report finished"
        );
        Ok(result)
    }

    /// Run arbitrary SQL in the configured database and collect every page
    /// of the result.
    pub async fn execute_query(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError> {
        let query_id = self.submit(sql).await?;
        let execution = self.poll_until_complete(&query_id).await?;
        let metadata = extract_metadata(&query_id, &execution);
        self.fetch_results(metadata).await
    }

    pub async fn cancel_query(&self, query_id: &str) -> Result<(), AthenaError> {
        self.inner
            .stop_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(sdk_err)?;
        info!(query_id = %query_id, "query cancellation requested");
        Ok(())
    }

    async fn submit(&self, sql: &str) -> Result<String, AthenaError> {
        debug!(sql = %sql, "starting athena query");

        let context = QueryExecutionContext::builder()
            .database(&self.config.database)
            .build();
        let output = ResultConfiguration::builder()
            .output_location(&self.config.output_location)
            .build();

        let resp = self
            .inner
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(context)
            .result_configuration(output)
            .work_group(&self.config.workgroup)
            .send()
            .await
            .map_err(sdk_err)?;

        let query_id = resp
            .query_execution_id()
            .ok_or_else(|| AthenaError::AwsSdk("no query execution id returned".into()))?
            .to_string();
        info!(query_id = %query_id, "query submitted");
        Ok(query_id)
    }

    async fn describe(&self, query_id: &str) -> Result<QueryExecution, AthenaError> {
        let resp = self
            .inner
            .get_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(sdk_err)?;
        resp.query_execution()
            .cloned()
            .ok_or_else(|| AthenaError::AwsSdk("no query execution in response".into()))
    }

    async fn poll_until_complete(&self, query_id: &str) -> Result<QueryExecution, AthenaError> {
        let start = Instant::now();
        let timeout = self.config.timeout();
        let mut backoff = Backoff::new();

        loop {
            let qe = self.describe(query_id).await?;
            let state = qe
                .status()
                .and_then(|s| s.state())
                .cloned()
                .unwrap_or(QueryExecutionState::Queued);

            debug!(
                query_id = %query_id,
                state = ?state,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "polling query"
            );

            match state {
                QueryExecutionState::Succeeded => return Ok(qe),
                QueryExecutionState::Failed => {
                    let reason = qe
                        .status()
                        .and_then(|s| s.state_change_reason())
                        .unwrap_or("unknown")
                        .to_string();
                    error!(query_id = %query_id, reason = %reason, "query failed");
                    return Err(AthenaError::QueryFailed {
                        query_id: query_id.to_string(),
                        reason,
                    });
                }
                QueryExecutionState::Cancelled => {
                    return Err(AthenaError::QueryCancelled {
                        query_id: query_id.to_string(),
                    });
                }
                _ => {}
            }

            if start.elapsed() > timeout {
                warn!(
                    query_id = %query_id,
                    timeout_seconds = self.config.timeout_seconds,
                    "query timed out, cancelling"
                );
                if let Err(e) = self.cancel_query(query_id).await {
                    warn!(query_id = %query_id, error = %e, "cancel failed");
                }
                return Err(AthenaError::QueryTimeout {
                    query_id: query_id.to_string(),
                    seconds: self.config.timeout_seconds,
                });
            }

            let jitter = rand::thread_rng().gen_range(0..JITTER_MS);
            tokio::time::sleep(backoff.next_delay(jitter)).await;
        }
    }

    async fn fetch_results(
        &self,
        metadata: QueryMetadata,
    ) -> Result<AthenaQueryResult, AthenaError> {
        let mut columns: Vec<AthenaColumn> = Vec::new();
        let mut rows = Vec::new();
        let mut next_token: Option<String> = None;
        let mut first_page = true;

        loop {
            let page = self
                .inner
                .get_query_results()
                .query_execution_id(&metadata.query_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_err)?;

            let result_set = page
                .result_set()
                .ok_or_else(|| AthenaError::ParseError("no ResultSet in response".into()))?;

            if first_page {
                columns = result_set
                    .result_set_metadata()
                    .map(|meta| {
                        meta.column_info()
                            .iter()
                            .map(|ci| AthenaColumn {
                                name: ci.name().to_string(),
                                data_type: ci.r#type().to_string(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
            }

            let skip_header = first_page && page.update_count().is_none();
            rows.extend(page_rows(result_set.rows(), skip_header));
            first_page = false;

            match page.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(
            query_id = %metadata.query_id,
            columns = columns.len(),
            rows = rows.len(),
            "collected result pages"
        );
        Ok(AthenaQueryResult { columns, rows, metadata })
    }
}
