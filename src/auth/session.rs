//! Session, profile and access token types

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Access Token
// ============================================================================

/// Opaque bearer token returned by the provider.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Get the Authorization header value
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<String> for AccessToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccessToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// User Profile
// ============================================================================

/// Profile record returned by `GET /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider user id
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
    /// Display name
    pub display_name: String,
    /// Email address
    pub email: String,
    /// Avatar URL
    pub profile_image_url: String,
}

/// Helix sends ids as strings; plain numbers are accepted too.
fn numeric_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Identity {
    profile: UserProfile,
    access_token: AccessToken,
}

/// Authenticated session, or the empty session.
///
/// The profile and the token are stored together, so a session can never
/// hold a token without a profile or a partial profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub(crate) fn authenticated(profile: UserProfile, access_token: AccessToken) -> Self {
        Self {
            identity: Some(Identity {
                profile,
                access_token,
            }),
        }
    }

    /// Whether this session holds a verified identity
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Verified profile, if authenticated
    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        self.identity.as_ref().map(|i| &i.profile)
    }

    /// Access token, if authenticated
    #[must_use]
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.identity.as_ref().map(|i| &i.access_token)
    }

    /// Provider user id
    #[must_use]
    pub fn user_id(&self) -> Option<u64> {
        self.profile().map(|p| p.id)
    }

    /// Display name
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.profile().map(|p| p.display_name.as_str())
    }

    /// Email address
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.profile().map(|p| p.email.as_str())
    }

    /// Avatar URL
    #[must_use]
    pub fn profile_image_url(&self) -> Option<&str> {
        self.profile().map(|p| p.profile_image_url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 141_981_764,
            display_name: "TwitchDev".to_string(),
            email: "dev@example.com".to_string(),
            profile_image_url: "https://cdn.example/avatar.png".to_string(),
        }
    }

    #[test]
    fn test_empty_session() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(session.access_token().is_none());
        assert!(session.user_id().is_none());
        assert!(session.display_name().is_none());
        assert!(session.email().is_none());
        assert!(session.profile_image_url().is_none());
    }

    #[test]
    fn test_authenticated_session_fields() {
        let session = Session::authenticated(profile(), AccessToken::new("tok"));
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some(141_981_764));
        assert_eq!(session.display_name(), Some("TwitchDev"));
        assert_eq!(session.email(), Some("dev@example.com"));
        assert_eq!(session.profile_image_url(), Some("https://cdn.example/avatar.png"));
        assert_eq!(session.access_token().map(AccessToken::secret), Some("tok"));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        let session = Session::authenticated(profile(), token);
        assert!(!format!("{session:?}").contains("super-secret"));
    }

    #[test]
    fn test_authorization_header() {
        assert_eq!(
            AccessToken::new("abc").authorization_header(),
            "Bearer abc"
        );
    }

    #[test]
    fn test_profile_id_from_string_or_number() {
        let from_string: UserProfile = serde_json::from_value(serde_json::json!({
            "id": "141981764",
            "display_name": "TwitchDev",
            "email": "dev@example.com",
            "profile_image_url": "https://cdn.example/avatar.png"
        }))
        .unwrap();
        let from_number: UserProfile = serde_json::from_value(serde_json::json!({
            "id": 141_981_764,
            "display_name": "TwitchDev",
            "email": "dev@example.com",
            "profile_image_url": "https://cdn.example/avatar.png"
        }))
        .unwrap();
        assert_eq!(from_string, profile());
        assert_eq!(from_number, profile());
    }

    #[test]
    fn test_profile_rejects_non_numeric_id() {
        let result = serde_json::from_value::<UserProfile>(serde_json::json!({
            "id": "abc",
            "display_name": "x",
            "email": "x",
            "profile_image_url": "x"
        }));
        assert!(result.is_err());
    }
}
