use redb::{CommitError, StorageError, TableError, TransactionError};
use thiserror::Error;

/// Failures from the content document store. `NotFound` and `DuplicateSlug`
/// map to 4xx at the route layer; everything else is a 5xx and is never
/// retried here.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("UUID parse error: {0}")]
    Uuid(#[from] uuid::Error),
    #[error("Item not found in database: {0}")]
    NotFound(String),
    #[error("Slug already in use: {0}")]
    DuplicateSlug(String),
}

pub mod ads_db_operations;
pub mod comments_db_operations;
pub mod posts_db_operations;
pub mod submissions_db_operations;
pub mod users_db_operations;
