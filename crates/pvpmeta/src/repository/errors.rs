use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

use crate::retry::{RetryConfig, with_retry};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// A row that must exist does not.
    #[error("Record not found: {context}")]
    NotFound { context: String },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepositoryError {
    /// NotFound for a primary-key lookup.
    pub fn not_found_by_id(table: &str, id: i64) -> Self {
        Self::NotFound {
            context: format!("{} id={}", table, id),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether retrying the same statement may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RepositoryError::Database(db_err) => is_retryable_db_error(db_err),
            _ => false,
        }
    }
}

fn is_retryable_db_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(_) | DbErr::Query(_) => {
            let err_str = err.to_string().to_lowercase();
            // SQLite: database is locked, busy
            // PostgreSQL: deadlock, too many connections
            err_str.contains("locked")
                || err_str.contains("busy")
                || err_str.contains("deadlock")
                || err_str.contains("timeout")
                || err_str.contains("temporarily unavailable")
        }
        _ => false,
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Default number of retries for bulk writes.
pub const DEFAULT_BULK_WRITE_RETRIES: usize = 3;

/// Initial backoff for bulk write retries.
pub const DEFAULT_BULK_WRITE_BACKOFF_MS: u64 = 100;

/// Run a bulk write, retrying transient database errors with backoff.
pub async fn with_write_retry<T, F, Fut>(label: &str, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let config = RetryConfig::new(
        Duration::from_millis(DEFAULT_BULK_WRITE_BACKOFF_MS),
        Duration::from_secs(2),
        DEFAULT_BULK_WRITE_RETRIES,
    );

    with_retry(
        operation,
        config,
        RepositoryError::is_retryable,
        |e: &RepositoryError| e.to_string(),
        label,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn not_found_by_id_names_table_and_id() {
        let msg = RepositoryError::not_found_by_id("characters", 42).to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("characters id=42"));
    }

    #[test]
    fn locked_database_is_retryable() {
        let err = RepositoryError::Database(DbErr::Exec(RuntimeErr::Internal(
            "database is locked".to_string(),
        )));
        assert!(err.is_retryable());
    }

    #[test]
    fn constraint_violation_is_not_retryable() {
        let err = RepositoryError::Database(DbErr::Exec(RuntimeErr::Internal(
            "UNIQUE constraint failed: characters.blizzard_id".to_string(),
        )));
        assert!(!err.is_retryable());
        assert!(!RepositoryError::invalid_input("bad").is_retryable());
    }

    #[tokio::test]
    async fn with_write_retry_retries_transient_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let result = with_write_retry("test", move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                if calls_capture.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RepositoryError::Database(DbErr::Exec(RuntimeErr::Internal(
                        "database is locked".to_string(),
                    ))))
                } else {
                    Ok(7u64)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
