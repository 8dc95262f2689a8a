//! Error Types for User Registration

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UserError>;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}
