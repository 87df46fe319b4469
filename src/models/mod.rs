pub mod activity;
pub mod workout;

use sqlx::postgres::PgQueryResult;
use sqlx::PgPool;
use std::fmt;

/// Errors raised by the persistence layer.
#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    NotFound,
    /// A mutating statement touched no row.
    NoRowsAffected,
    /// A mutating statement touched more than one row.
    RowsAffected(u64),
    InvalidColumn { column: &'static str, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "{}", err),
            StoreError::NotFound => write!(f, "no rows in result set"),
            StoreError::NoRowsAffected => write!(f, "no rows affected"),
            StoreError::RowsAffected(n) => {
                write!(f, "expected exactly one row to be affected, got {}", n)
            }
            StoreError::InvalidColumn { column, reason } => {
                write!(f, "invalid value in column {}: {}", column, reason)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// The capability set every persisted entity implements against the
/// relational store. Every method runs exactly one statement.
#[allow(async_fn_in_trait)]
pub trait PersistenceObject: Sized {
    /// Label used in error messages and log lines.
    const TYPE_NAME: &'static str;

    fn id(&self) -> &str;

    async fn exists(db: &PgPool, id: &str) -> Result<bool, StoreError>;

    async fn get(db: &PgPool, id: &str) -> Result<Self, StoreError>;

    async fn save(&self, db: &PgPool) -> Result<(), StoreError>;

    async fn update(&self, db: &PgPool) -> Result<(), StoreError>;

    async fn delete(db: &PgPool, id: &str) -> Result<(), StoreError>;

    async fn list_all(db: &PgPool) -> Result<Vec<Self>, StoreError>;
}

pub(crate) fn expect_one_row(result: PgQueryResult) -> Result<(), StoreError> {
    match result.rows_affected() {
        1 => Ok(()),
        0 => Err(StoreError::NoRowsAffected),
        n => Err(StoreError::RowsAffected(n)),
    }
}
