use rsvp_core::validation::ValidationErrors;
use rsvp_db::error::DbError;
use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// One or more field rules failed; nothing was written.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// The store refused or failed the operation. Never retried here.
    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl ServiceError {
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<diesel::result::Error> for ServiceError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Persistence(DbError::from(error))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
