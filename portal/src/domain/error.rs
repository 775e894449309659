//! Domain-level error types.
//!
//! These errors are transport agnostic. The CLI and any future view layer
//! map them to user-visible messages; they never reach the session store as
//! a committed state change.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed email, password, name, or answer.
    ValidationFailed,
    /// Login mismatch: unknown account or wrong password.
    InvalidCredentials,
    /// Registration for an email that already has an account.
    AccountExists,
    /// The operation needs a current identity and none is present.
    NoActiveSession,
    /// Another session mutation is already in flight.
    Busy,
    /// The caller abandoned the operation before it committed.
    Cancelled,
    /// The requested resource does not exist.
    NotFound,
    /// The competition does not currently accept submissions.
    CompetitionClosed,
    /// The per-task attempt limit has been reached.
    AttemptsExhausted,
    /// A collaborating service could not be reached.
    Unavailable,
    /// An unexpected error occurred inside the domain.
    Internal,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace; blank messages are
///   replaced with a generic description of the code.
///
/// # Examples
/// ```
/// use portal::domain::{Error, ErrorCode};
///
/// let err = Error::account_exists("user@example.com is already registered");
/// assert_eq!(err.code(), ErrorCode::AccountExists);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a new error for `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            fallback_message(code).to_owned()
        } else {
            message
        };
        Self { code, message }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message for views.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::ValidationFailed`].
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidCredentials`].
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCredentials, message)
    }

    /// Convenience constructor for [`ErrorCode::AccountExists`].
    pub fn account_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AccountExists, message)
    }

    /// Convenience constructor for [`ErrorCode::NoActiveSession`].
    pub fn no_active_session(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoActiveSession, message)
    }

    /// Convenience constructor for [`ErrorCode::Busy`].
    pub fn busy(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Busy, message)
    }

    /// Convenience constructor for [`ErrorCode::Cancelled`].
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cancelled, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::CompetitionClosed`].
    pub fn competition_closed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CompetitionClosed, message)
    }

    /// Convenience constructor for [`ErrorCode::AttemptsExhausted`].
    pub fn attempts_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AttemptsExhausted, message)
    }

    /// Convenience constructor for [`ErrorCode::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

fn fallback_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::ValidationFailed => "validation failed",
        ErrorCode::InvalidCredentials => "invalid email or password",
        ErrorCode::AccountExists => "account already exists",
        ErrorCode::NoActiveSession => "login required",
        ErrorCode::Busy => "another request is in progress",
        ErrorCode::Cancelled => "request cancelled",
        ErrorCode::NotFound => "not found",
        ErrorCode::CompetitionClosed => "competition is not accepting submissions",
        ErrorCode::AttemptsExhausted => "no attempts left",
        ErrorCode::Unavailable => "service unavailable",
        ErrorCode::Internal => "internal error",
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
