use redb::{CommitError, Database, StorageError, TableError, TransactionError};
use rusqlite::Connection;
use thiserror::Error;

use crate::models::db_operations::ads_db_operations::ADS;
use crate::models::db_operations::comments_db_operations::COMMENTS;
use crate::models::db_operations::posts_db_operations::{
    CHRONOLOGICAL_INDEX, POSTS, SLUG_INDEX,
};
use crate::models::db_operations::submissions_db_operations::{
    SUBMISSIONS, SUBMISSION_EMAIL_INDEX,
};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
}

pub fn setup_accounts_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    tx.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK(role IN ('admin', 'moderator')),
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            last_login_time TEXT
        )",
        [],
    )?;
    tx.commit()?;
    Ok(())
}

/// Opens every content table once so later read transactions never hit a
/// missing-table error on a fresh database.
pub fn setup_content_db(db: &Database) -> Result<(), SetupError> {
    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(POSTS)?;
        write_txn.open_table(SLUG_INDEX)?;
        write_txn.open_table(CHRONOLOGICAL_INDEX)?;
        write_txn.open_table(ADS)?;
        write_txn.open_table(COMMENTS)?;
        write_txn.open_table(SUBMISSIONS)?;
        write_txn.open_table(SUBMISSION_EMAIL_INDEX)?;
    }
    write_txn.commit()?;
    Ok(())
}
