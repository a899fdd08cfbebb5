//! Controller status and the snapshot published to consumers

use super::session::Session;

/// Lifecycle status owned by the session controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    /// No session and nothing in flight
    #[default]
    Idle,
    /// Sign-in in flight
    Authenticating,
    /// Session established
    Authenticated,
    /// Sign-out in flight
    RevokingOut,
}

impl AuthStatus {
    /// True while a sign-in is in flight
    #[must_use]
    pub fn is_logging_in(self) -> bool {
        self == Self::Authenticating
    }

    /// True while a sign-out is in flight
    #[must_use]
    pub fn is_logging_out(self) -> bool {
        self == Self::RevokingOut
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::RevokingOut => "revoking",
        };
        f.write_str(name)
    }
}

/// Snapshot of the controller's observable state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Current status
    pub status: AuthStatus,
    /// Current session, empty unless authenticated
    pub session: Session,
}

impl AuthState {
    /// True while a sign-in is in flight
    #[must_use]
    pub fn is_logging_in(&self) -> bool {
        self.status.is_logging_in()
    }

    /// True while a sign-out is in flight
    #[must_use]
    pub fn is_logging_out(&self) -> bool {
        self.status.is_logging_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_flags() {
        assert!(!AuthStatus::Idle.is_logging_in());
        assert!(!AuthStatus::Idle.is_logging_out());
        assert!(AuthStatus::Authenticating.is_logging_in());
        assert!(!AuthStatus::Authenticating.is_logging_out());
        assert!(!AuthStatus::Authenticated.is_logging_in());
        assert!(AuthStatus::RevokingOut.is_logging_out());
    }

    #[test]
    fn test_default_state_is_idle_and_empty() {
        let state = AuthState::default();
        assert_eq!(state.status, AuthStatus::Idle);
        assert!(!state.session.is_authenticated());
    }
}
