//! Error types for the Twitch auth session library

use thiserror::Error;

/// Internal cause of a failed sign-in.
///
/// Every variant is reported to callers as the same generic
/// [`AuthError::InvalidLogin`] message; the kind is kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// Returned `state` did not match the one generated for this request
    StateMismatch,
    /// Provider denied access or the user cancelled the redirect
    UserDenied,
    /// Callback carried a matching state but no access token
    MalformedCallback,
    /// Network or parse failure while fetching the profile
    ExchangeFailure,
}

impl std::fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StateMismatch => "state mismatch",
            Self::UserDenied => "user denied",
            Self::MalformedCallback => "malformed callback",
            Self::ExchangeFailure => "exchange failure",
        };
        f.write_str(name)
    }
}

/// Main error type for the auth session library
#[derive(Error, Debug)]
pub enum AuthError {
    /// Sign-in failed; the message never reveals the cause
    #[error("Invalid login.")]
    InvalidLogin(LoginFailure),

    /// A sign-in attempt is already in flight
    #[error("Sign-in already in progress")]
    SignInInProgress,

    /// A sign-out is already in flight
    #[error("Sign-out already in progress")]
    SignOutInProgress,

    /// A session is already active; sign out first
    #[error("Already authenticated. Sign out before signing in again.")]
    AlreadyAuthenticated,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Provider answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for auth session operations
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Create a generic login failure carrying its internal cause
    #[must_use]
    pub fn invalid_login(kind: LoginFailure) -> Self {
        Self::InvalidLogin(kind)
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Internal cause of a failed sign-in, if this is one
    #[must_use]
    pub fn login_failure(&self) -> Option<LoginFailure> {
        match self {
            Self::InvalidLogin(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_login_message_hides_cause() {
        for kind in [
            LoginFailure::StateMismatch,
            LoginFailure::UserDenied,
            LoginFailure::MalformedCallback,
            LoginFailure::ExchangeFailure,
        ] {
            let err = AuthError::invalid_login(kind);
            assert_eq!(err.to_string(), "Invalid login.");
            assert_eq!(err.login_failure(), Some(kind));
        }
    }

    #[test]
    fn test_login_failure_absent_on_other_errors() {
        assert!(AuthError::SignInInProgress.login_failure().is_none());
        assert!(AuthError::http(500, "boom").login_failure().is_none());
    }

    #[test]
    fn test_http_error_display() {
        let err = AuthError::http(401, "invalid token");
        assert_eq!(err.to_string(), "HTTP 401: invalid token");
    }
}
