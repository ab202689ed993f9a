pub mod company_service;
pub mod job_service;
pub mod user_service;

use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

use crate::auth::PasswordError;
use crate::database::SqlBuildError;

pub use company_service::CompanyService;
pub use job_service::JobService;
pub use user_service::UserService;

/// Failures from the resource services, classified so the API layer can pick a status
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// Unique constraint violated; carries the constraint name until a service rewrites it
    #[error("{0}")]
    Conflict(String),

    /// Foreign key violated
    #[error("{0}")]
    InvalidReference(String),

    #[error("{0}")]
    InvalidData(String),

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error(transparent)]
    NoData(#[from] SqlBuildError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Sql(sqlx::Error),
}

impl From<sqlx::Error> for ServiceError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::NotFound("Not Found".to_string());
        }

        let Some(db_error) = error.as_database_error() else {
            return Self::Sql(error);
        };
        let kind = db_error.kind();
        let message = db_error.message().to_string();
        let detail = db_error.constraint().map_or_else(|| message.clone(), str::to_string);

        match kind {
            ErrorKind::UniqueViolation => Self::Conflict(detail),
            ErrorKind::ForeignKeyViolation => Self::InvalidReference(detail),
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => Self::InvalidData(message),
            _ => Self::Sql(error),
        }
    }
}
