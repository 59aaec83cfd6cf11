use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid credentials input")]
    Validation(crate::login::FieldErrors),
}

pub type Result<T> = std::result::Result<T, SessionError>;
