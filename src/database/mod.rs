pub mod memory;
pub mod postgres;
pub mod repository;

use thiserror::Error;

use crate::error::ApiError;

pub use memory::InMemoryRepository;
pub use postgres::{PgEntity, PgQueryAs, PgRepository};
pub use repository::Repository;

/// Errors from repositories
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            other => DatabaseError::Sqlx(other),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::bad_request(msg),
            other => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", other);
                ApiError::Api {
                    message: Some("Database error occurred".to_string()),
                    source: Some(Box::new(other)),
                }
            }
        }
    }
}
