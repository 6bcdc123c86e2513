use thiserror::Error;

use domain::error::DomainError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Failure reported by the remote service. Displays the service's own
    /// message so it can be shown to the user unchanged.
    #[error("{message}")]
    RemoteService { status: Option<u16>, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("No user returned")]
    NoUserReturned,

    #[error("No user logged in")]
    NoUserLoggedIn,

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },
}

impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteService {
            status,
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
