use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid profile role: {0}")]
    InvalidRole(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
