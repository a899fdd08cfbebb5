//! Provider configuration
//!
//! Static settings for the identity provider: client id, endpoints, redirect
//! target and scopes. Defaults point at Twitch.

use typed_builder::TypedBuilder;

use crate::auth::AuthorizationRequestBuilder;
use crate::error::{AuthError, Result};

/// Twitch authorization endpoint
pub const DEFAULT_AUTH_URL: &str = "https://id.twitch.tv/oauth2/authorize";
/// Twitch token revocation endpoint
pub const DEFAULT_REVOCATION_URL: &str = "https://id.twitch.tv/oauth2/revoke";
/// Twitch Helix API base
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitch.tv/helix";
/// Local redirect target registered with the provider
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000";
/// Scopes requested on every sign-in
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "user:read:email", "user:read:follows"];

/// Environment variable holding the provider client id
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";
/// Environment variable overriding the redirect target
pub const REDIRECT_URI_ENV: &str = "REDIRECT_URI";

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(ToString::to_string).collect()
}

/// Identity provider configuration
#[derive(Debug, Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for AuthConfig"),
    builder_type(doc = "Builder for AuthConfig", vis = "pub"),
    build_method(doc = "Build the AuthConfig")
)]
pub struct AuthConfig {
    /// Provider client id, sent on authorization, revocation and API calls
    #[builder(setter(into))]
    pub client_id: String,

    /// Authorization endpoint
    #[builder(default = DEFAULT_AUTH_URL.to_string(), setter(into))]
    pub auth_url: String,

    /// Revocation endpoint
    #[builder(default = DEFAULT_REVOCATION_URL.to_string(), setter(into))]
    pub revocation_url: String,

    /// Resource API base URL (no trailing slash)
    #[builder(default = DEFAULT_API_BASE_URL.to_string(), setter(into))]
    pub api_base_url: String,

    /// Redirect target the redirect mechanism intercepts
    #[builder(default = DEFAULT_REDIRECT_URI.to_string(), setter(into))]
    pub redirect_uri: String,

    /// Ordered scopes to request
    #[builder(default = default_scopes(), setter(into))]
    pub scopes: Vec<String>,

    /// Force the provider to re-prompt even with an active provider session
    #[builder(default = true)]
    pub force_verify: bool,
}

impl AuthConfig {
    /// Load configuration from the environment.
    ///
    /// Reads `CLIENT_ID` (required) and `REDIRECT_URI` (optional).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` if `CLIENT_ID` is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let client_id = lookup(CLIENT_ID_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AuthError::invalid_config(format!("{CLIENT_ID_ENV} is not set")))?;

        let mut config = Self::builder().client_id(client_id).build();
        if let Some(redirect_uri) = lookup(REDIRECT_URI_ENV).filter(|v| !v.is_empty()) {
            config.redirect_uri = redirect_uri;
        }
        Ok(config)
    }

    /// Authorization request builder for this provider
    #[must_use]
    pub fn request_builder(&self) -> AuthorizationRequestBuilder {
        AuthorizationRequestBuilder::new(&self.auth_url, &self.client_id, &self.redirect_uri)
            .scopes(self.scopes.clone())
            .force_verify(self.force_verify)
    }
}
