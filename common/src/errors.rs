// Error handling framework

use thiserror::Error;

/// Ledger storage errors
///
/// Every variant here is fatal to the current cycle except when raised inside
/// the retention sweep, where callers downgrade it to a logged warning.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Store connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Schema creation failed: {0}")]
    SchemaFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Duplicate key violation: {0}")]
    DuplicateKey(String),
}

/// Video search collaborator errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Search API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

/// Webhook delivery errors
///
/// Deliberately non-fatal: the announcement pipeline logs these and still
/// records the video as announced (at-most-once delivery policy).
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    RequestFailed(String),

    #[error("Webhook returned unexpected status {status}")]
    UnexpectedStatus { status: u16 },
}

/// Scan cycle errors
///
/// Search failures are isolated per channel; storage failures abort the
/// whole cycle since ledger integrity cannot be assumed afterwards.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

// Implement From for common external errors
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    StorageError::DuplicateKey(db_err.message().to_string())
                } else {
                    StorageError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::RequestFailed(err.to_string())
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::RequestFailed(err.to_string())
    }
}
