//! End-to-end report queries: dispatch, assembly and whole-query retry.

use chrono::NaiveDate;
use pacer_api::{Client, ReportQuery};

use crate::config::{RetryConfig, Settings};
use crate::error::FreeDocumentsError;
use crate::report::{assemble, SkippedRow};
use crate::row::OpinionRecord;

/// Result of one report query.
#[derive(Debug)]
pub struct FreeDocumentsReport {
    pub court_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub records: Vec<OpinionRecord>,
    /// Rows left out because they could not be parsed.
    pub skipped_rows: Vec<SkippedRow>,
    /// Days lost in transit under the tolerant failure policy.
    pub failed_days: Vec<NaiveDate>,
}

impl FreeDocumentsReport {
    /// True when every requested day was fetched.
    pub fn is_complete(&self) -> bool {
        self.failed_days.is_empty()
    }
}

/// Runs report queries against the PACER written opinions report.
///
/// Each query, and each retry of it, gets its own session and token; nothing
/// is shared between queries, so one client can be used from many tasks.
pub struct FreeDocumentsClient {
    inner: Client,
    retry: RetryConfig,
}

impl FreeDocumentsClient {
    /// Creates a client pointing at the production ECF hosts.
    pub fn new(settings: &Settings) -> Self {
        Self {
            inner: Client::new(settings.client.clone()),
            retry: settings.retry.clone(),
        }
    }

    /// Creates a client with a custom base URL. Used for testing.
    pub fn with_base_url(base_url: &str, settings: &Settings) -> Self {
        Self {
            inner: Client::with_base_url(base_url, settings.client.clone()),
            retry: settings.retry.clone(),
        }
    }

    /// Fetches and parses the report for `query`.
    ///
    /// Token and transport failures retry the whole query from a fresh
    /// session; parse failures are returned immediately.
    pub async fn query(
        &self,
        query: &ReportQuery,
    ) -> Result<FreeDocumentsReport, FreeDocumentsError> {
        let mut attempt = 0usize;
        loop {
            match self.query_once(query).await {
                Ok(report) => return Ok(report),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries || !err.is_retryable() {
                        return Err(err);
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} report query failed (attempt {}/{}): {}; retrying in {:.1}s",
                        query.court_id,
                        attempt,
                        self.retry.max_retries,
                        err,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn query_once(
        &self,
        query: &ReportQuery,
    ) -> Result<FreeDocumentsReport, FreeDocumentsError> {
        let batch = self
            .inner
            .dispatch(query)
            .await
            .map_err(|e| FreeDocumentsError::api(&query.court_id, e))?;
        let assembly = assemble(&batch.responses)?;
        if !batch.is_complete() {
            tracing::warn!(
                "Report for {} is incomplete: {} of {} days failed",
                query.court_id,
                batch.failed_days.len(),
                query.days().len()
            );
        }
        Ok(FreeDocumentsReport {
            court_id: query.court_id.clone(),
            start: query.start,
            end: query.end,
            records: assembly.records,
            skipped_rows: assembly.skipped_rows,
            failed_days: batch.failed_days.iter().map(|f| f.day).collect(),
        })
    }
}
