//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace, plus the
//! `ApiException` raised by view permission hooks.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Invalid project configuration (unknown views, bad regexes, ...).
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Config(String),

    /// Failure while serializing a document.
    #[from(ignore)]
    #[display("Render Error: {_0}")]
    Render(String),

    /// The caller has no visible API surface.
    #[from(ignore)]
    #[display("Permission Denied: {_0}")]
    PermissionDenied(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised by a view's request-scoped hooks.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ApiException {
    /// The request carries no authenticated user.
    #[display("{_0}")]
    NotAuthenticated(String),

    /// The request is authenticated but not allowed.
    #[display("{_0}")]
    PermissionDenied(String),
}

impl ApiException {
    /// HTTP status code associated with the exception.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiException::NotAuthenticated(_) => 401,
            ApiException::PermissionDenied(_) => 403,
        }
    }

    /// Human readable detail message.
    pub fn detail(&self) -> &str {
        match self {
            ApiException::NotAuthenticated(s) | ApiException::PermissionDenied(s) => s,
        }
    }
}

impl std::error::Error for ApiException {}
