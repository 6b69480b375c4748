use bcrypt::{hash, verify, BcryptError};
use chrono::Utc;
use rusqlite::{params, Connection, Error as RusqliteError, OptionalExtension};
use thiserror::Error;

use crate::models::{Account, Role};

/// Login failure taxonomy. A suspended account is deliberately
/// distinguishable from bad credentials so the caller can show a different
/// message.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("account suspended")]
    Suspended,
    #[error("Rusqlite error: {0}")]
    Db(#[from] RusqliteError),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

fn bcrypt_to_rusqlite_error(e: BcryptError) -> RusqliteError {
    RusqliteError::ToSqlConversionFailure(Box::new(e))
}

pub fn create_account(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), RusqliteError> {
    let hashed_password = hash(password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "INSERT INTO accounts (username, email, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
        params![username, email.trim().to_lowercase(), hashed_password, role.as_str()],
    )?;
    Ok(())
}

fn account_from_row(row: &rusqlite::Row) -> rusqlite::Result<Account> {
    let role_str: String = row.get(3)?;
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: Role::parse(&role_str).unwrap_or(Role::Moderator),
        is_active: row.get(4)?,
        created_at: row.get(5)?,
        last_login_time: row.get(6)?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, username, email, role, is_active, created_at, last_login_time";

pub fn read_all_accounts(conn: &Connection) -> Result<Vec<Account>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
    ))?;
    let accounts = stmt
        .query_map([], account_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn read_account_by_username(conn: &Connection, username: &str) -> Option<Account> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
        [username],
        account_from_row,
    )
    .ok()
}

pub fn read_account_by_id(conn: &Connection, id: i32) -> Option<Account> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
        [id],
        account_from_row,
    )
    .ok()
}

/// Checks a login attempt. The password is verified before the suspension
/// flag is consulted, so a wrong password on a suspended account still reads
/// as bad credentials.
pub fn verify_credentials(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<(String, Role), AuthError> {
    let row: Option<(String, String, bool)> = conn
        .query_row(
            "SELECT password_hash, role, is_active FROM accounts WHERE username = ?1",
            [username],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let (stored_hash, role_str, is_active) = row.ok_or(AuthError::InvalidCredentials)?;
    if !verify(password, &stored_hash).unwrap_or(false) {
        return Err(AuthError::InvalidCredentials);
    }
    if !is_active {
        return Err(AuthError::Suspended);
    }
    let role = Role::parse(&role_str).ok_or(AuthError::InvalidCredentials)?;
    Ok((username.to_string(), role))
}

/// Flips the suspension flag and returns the new state. `None` if the
/// account does not exist.
pub fn toggle_account_status(conn: &Connection, id: i32) -> Result<Option<bool>, RusqliteError> {
    let current: Option<bool> = conn
        .query_row("SELECT is_active FROM accounts WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?;
    match current {
        Some(is_active) => {
            conn.execute(
                "UPDATE accounts SET is_active = ?1 WHERE id = ?2",
                params![!is_active, id],
            )?;
            Ok(Some(!is_active))
        }
        None => Ok(None),
    }
}

pub fn delete_account(conn: &Connection, id: i32) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM accounts WHERE id = ?1", [id])
}

pub fn update_last_login_time(conn: &Connection, username: &str) -> Result<(), RusqliteError> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE accounts SET last_login_time = ?1 WHERE username = ?2",
        params![now, username],
    )?;
    Ok(())
}
