use thiserror::Error;

use crate::blizzard::ApiError;
use crate::repository::RepositoryError;

use super::outcome::OutcomeStatus;

/// Errors raised by the sync orchestrator.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Upstream API error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Storage error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A collaborating service reported failure without a typed cause.
    #[error("Service failure: {0}")]
    ServiceFailure(String),

    /// No season row has `is_current` set.
    #[error("No current PvP season")]
    NoCurrentSeason,

    /// Shutdown was requested before the cycle finished.
    #[error("Interrupted by shutdown request")]
    Interrupted,

    /// Every item of a batch failed.
    #[error("{0}")]
    TotalBatchFailure(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl SyncError {
    /// Failure status recorded for this error in a batch outcome.
    pub fn outcome_status(&self) -> OutcomeStatus {
        match self {
            SyncError::Api(e) if e.is_rate_limited() => OutcomeStatus::RateLimited,
            SyncError::Api(_) => OutcomeStatus::ApiError,
            SyncError::Repository(_) | SyncError::ServiceFailure(_) => {
                OutcomeStatus::ServiceFailure
            }
            SyncError::NoCurrentSeason
            | SyncError::Interrupted
            | SyncError::TotalBatchFailure(_)
            | SyncError::Unexpected(_) => OutcomeStatus::UnexpectedError,
        }
    }

    /// Short message for outcome samples.
    pub fn short_message(&self) -> String {
        match self {
            SyncError::Api(e) => crate::blizzard::short_error_message(e),
            other => other.to_string(),
        }
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_failure_statuses() {
        let limited = SyncError::from(ApiError::RateLimited {
            path: "/x".to_string(),
        });
        assert_eq!(limited.outcome_status(), OutcomeStatus::RateLimited);

        let status = SyncError::from(ApiError::Status {
            status: 503,
            body: String::new(),
        });
        assert_eq!(status.outcome_status(), OutcomeStatus::ApiError);
        assert_eq!(status.short_message(), "HTTP 503");

        let repo = SyncError::from(RepositoryError::invalid_input("bad"));
        assert_eq!(repo.outcome_status(), OutcomeStatus::ServiceFailure);

        assert_eq!(
            SyncError::Unexpected("boom".into()).outcome_status(),
            OutcomeStatus::UnexpectedError
        );
    }

    #[test]
    fn every_mapped_status_is_a_failure() {
        let errors = [
            SyncError::ServiceFailure("x".into()),
            SyncError::NoCurrentSeason,
            SyncError::TotalBatchFailure("x".into()),
        ];
        for err in errors {
            assert!(err.outcome_status().is_failure());
        }
    }
}
