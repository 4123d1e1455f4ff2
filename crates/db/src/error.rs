//! Error type for repository operations that enforce domain rules.
//!
//! Plain CRUD methods return `sqlx::Error` directly. Methods that validate
//! input or translate constraint violations into domain errors return
//! [`DbError`].

use cype_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// PostgreSQL SQLSTATE for unique violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// The violated constraint name if `err` is a unique violation.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    violation(err, UNIQUE_VIOLATION)
}

/// The violated constraint name if `err` is a foreign key violation.
pub fn foreign_key_violation(err: &sqlx::Error) -> Option<&str> {
    violation(err, FOREIGN_KEY_VIOLATION)
}

fn violation<'a>(err: &'a sqlx::Error, code: &str) -> Option<&'a str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(code) => {
            Some(db_err.constraint().unwrap_or_default())
        }
        _ => None,
    }
}

/// Translate a unique violation on `constraint` into `mapped`, passing every
/// other error through unchanged.
pub fn map_unique(
    err: sqlx::Error,
    constraint: &str,
    mapped: impl FnOnce() -> CoreError,
) -> DbError {
    if unique_violation(&err) == Some(constraint) {
        DbError::Core(mapped())
    } else {
        DbError::Database(err)
    }
}
