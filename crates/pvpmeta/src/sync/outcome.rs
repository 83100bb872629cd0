//! Per-batch success/failure accounting.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use super::errors::SyncError;

/// Samples listed in [`BatchOutcome::summary_message`].
const SUMMARY_SAMPLES: usize = 5;

/// Samples listed in the total-failure message.
const TOTAL_FAILURE_SAMPLES: usize = 3;

/// Result of processing one item of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    // success
    Synced,
    AppliedFreshSnapshot,
    ReusedSnapshot,
    NotModified,
    NoEntries,
    SkippedPrivate,
    EquipmentUnavailable,
    TalentsUnavailable,
    // failure
    Failed,
    ApiError,
    RateLimited,
    ServiceFailure,
    UnexpectedError,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Synced => "synced",
            OutcomeStatus::AppliedFreshSnapshot => "applied_fresh_snapshot",
            OutcomeStatus::ReusedSnapshot => "reused_snapshot",
            OutcomeStatus::NotModified => "not_modified",
            OutcomeStatus::NoEntries => "no_entries",
            OutcomeStatus::SkippedPrivate => "skipped_private",
            OutcomeStatus::EquipmentUnavailable => "equipment_unavailable",
            OutcomeStatus::TalentsUnavailable => "talents_unavailable",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::ApiError => "api_error",
            OutcomeStatus::RateLimited => "rate_limited",
            OutcomeStatus::ServiceFailure => "service_failure",
            OutcomeStatus::UnexpectedError => "unexpected_error",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            OutcomeStatus::Failed
                | OutcomeStatus::ApiError
                | OutcomeStatus::RateLimited
                | OutcomeStatus::ServiceFailure
                | OutcomeStatus::UnexpectedError
        )
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessRecord {
    pub id: i64,
    pub status: OutcomeStatus,
}

/// A recorded failure with its short error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub id: i64,
    pub status: OutcomeStatus,
    pub error: String,
}

#[derive(Debug, Default)]
struct Records {
    successes: Vec<SuccessRecord>,
    failures: Vec<FailureRecord>,
}

/// Append-only outcome collector shared between the tasks of one batch.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    inner: Arc<Mutex<Records>>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Records> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_success(&self, id: i64, status: OutcomeStatus) {
        self.records().successes.push(SuccessRecord { id, status });
    }

    pub fn record_failure(&self, id: i64, status: OutcomeStatus, error: impl Into<String>) {
        self.records().failures.push(FailureRecord {
            id,
            status,
            error: error.into(),
        });
    }

    pub fn successes(&self) -> Vec<SuccessRecord> {
        self.records().successes.clone()
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        self.records().failures.clone()
    }

    pub fn success_count(&self) -> usize {
        self.records().successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.records().failures.len()
    }

    pub fn total(&self) -> usize {
        let records = self.records();
        records.successes.len() + records.failures.len()
    }

    /// At least one item and no successes.
    pub fn is_total_failure(&self) -> bool {
        let records = self.records();
        records.successes.is_empty() && !records.failures.is_empty()
    }

    /// Count per status, in first-seen order (successes before failures).
    pub fn counts_by_status(&self) -> Vec<(OutcomeStatus, usize)> {
        let records = self.records();
        let statuses = records
            .successes
            .iter()
            .map(|s| s.status)
            .chain(records.failures.iter().map(|f| f.status));
        count_in_order(statuses)
    }

    /// One-line batch summary for the application log.
    pub fn summary_message(&self, label: &str) -> String {
        let records = self.records();
        let succeeded = records.successes.len();
        let failed = records.failures.len();
        let total = succeeded + failed;
        drop(records);

        let mut msg = format!(
            "[{}] Batch complete: {}/{} succeeded, {} failed. Breakdown: {{{}}}",
            label,
            succeeded,
            total,
            failed,
            format_counts(&self.counts_by_status())
        );

        let failures = self.failures();
        if !failures.is_empty() {
            msg.push_str(&format!(
                ". Failures: [{}]",
                format_samples(&failures, SUMMARY_SAMPLES, "; ")
            ));
            if failed > SUMMARY_SAMPLES {
                msg.push_str(&format!(" (+{} more)", failed - SUMMARY_SAMPLES));
            }
        }

        msg
    }

    /// Error out when every item of the batch failed.
    pub fn raise_if_total_failure(&self, label: &str) -> Result<(), SyncError> {
        if !self.is_total_failure() {
            return Ok(());
        }

        let failures = self.failures();
        let statuses = count_in_order(failures.iter().map(|f| f.status));

        Err(SyncError::TotalBatchFailure(format!(
            "[{}] All {} items failed. Statuses: {{{}}}. Samples: {}",
            label,
            failures.len(),
            format_counts(&statuses),
            format_samples(&failures, TOTAL_FAILURE_SAMPLES, "; ")
        )))
    }
}

fn count_in_order(statuses: impl Iterator<Item = OutcomeStatus>) -> Vec<(OutcomeStatus, usize)> {
    let mut counts: Vec<(OutcomeStatus, usize)> = Vec::new();
    for status in statuses {
        match counts.iter_mut().find(|(s, _)| *s == status) {
            Some((_, n)) => *n += 1,
            None => counts.push((status, 1)),
        }
    }
    counts
}

/// `status: n, status: n`
pub fn format_counts(counts: &[(OutcomeStatus, usize)]) -> String {
    counts
        .iter()
        .map(|(status, n)| format!("{}: {}", status, n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_samples(failures: &[FailureRecord], limit: usize, sep: &str) -> String {
    failures
        .iter()
        .take(limit)
        .map(|f| format!("{}: {}", f.id, f.error))
        .collect::<Vec<_>>()
        .join(sep)
}
