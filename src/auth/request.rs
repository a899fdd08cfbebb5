//! Authorization request construction with anti-forgery state

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;

/// Random bytes behind each state value (43 base64url characters)
const STATE_BYTES: usize = 32;

/// Minimum length of a generated state value
pub const MIN_STATE_LEN: usize = 30;

/// Everything except the RFC 3986 unreserved characters
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A single-use authorization request.
///
/// Pairs the URL handed to the redirect mechanism with the state value the
/// callback must echo back. Consumed once when the callback is validated.
#[derive(Debug)]
pub struct AuthorizationRequest {
    authorization_url: String,
    expected_state: String,
}

impl AuthorizationRequest {
    /// Fully assembled authorization URL
    #[must_use]
    pub fn authorization_url(&self) -> &str {
        &self.authorization_url
    }

    /// Anti-forgery token embedded in this request
    #[must_use]
    pub fn expected_state(&self) -> &str {
        &self.expected_state
    }

    /// Check a returned state value against the one this request sent.
    ///
    /// Consumes the request so a state can never be validated twice.
    #[must_use]
    pub fn verify_state(self, returned: Option<&str>) -> bool {
        returned.is_some_and(|state| {
            constant_time_eq(state.as_bytes(), self.expected_state.as_bytes())
        })
    }
}

/// Builder for [`AuthorizationRequest`]
#[derive(Debug, Clone)]
pub struct AuthorizationRequestBuilder {
    auth_url: String,
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    force_verify: bool,
}

impl AuthorizationRequestBuilder {
    /// Create a builder for the given endpoint, client and redirect target
    #[must_use]
    pub fn new(
        auth_url: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            auth_url: auth_url.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            force_verify: true,
        }
    }

    /// Set the ordered scopes to request
    #[must_use]
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether the provider must re-prompt the user (default: true)
    #[must_use]
    pub fn force_verify(mut self, force: bool) -> Self {
        self.force_verify = force;
        self
    }

    /// Build a request with a freshly generated state
    #[must_use]
    pub fn build(&self) -> AuthorizationRequest {
        let state = generate_state();
        let scope = self.scopes.join(" ");
        let force_verify = if self.force_verify { "true" } else { "false" };

        let params = [
            ("response_type", "token"),
            ("client_id", self.client_id.as_str()),
            ("scope", scope.as_str()),
            ("state", state.as_str()),
            ("force_verify", force_verify),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.auth_url.contains('?') { '&' } else { '?' };

        AuthorizationRequest {
            authorization_url: format!("{}{separator}{query}", self.auth_url),
            expected_state: state,
        }
    }
}

/// Generate a state parameter (base64url encoded CSPRNG bytes)
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Percent-encode a query value, leaving only unreserved characters
fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn builder() -> AuthorizationRequestBuilder {
        AuthorizationRequestBuilder::new(
            "https://id.twitch.tv/oauth2/authorize",
            "abc123",
            "http://localhost:3000",
        )
        .scopes(["openid", "user:read:email"])
    }

    fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    #[test]
    fn test_state_length_and_alphabet() {
        let state = generate_state();
        assert_eq!(state.len(), 43);
        assert!(state.len() >= MIN_STATE_LEN);
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_state_distinct_across_requests() {
        let builder = builder();
        let states: HashSet<String> = (0..1000)
            .map(|_| builder.build().expected_state().to_string())
            .collect();
        assert_eq!(states.len(), 1000);
    }

    #[test]
    fn test_url_scenario() {
        let request = builder().build();
        let url = request.authorization_url();

        assert!(url.starts_with("https://id.twitch.tv/oauth2/authorize?"));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("force_verify=true"));
        assert_eq!(
            query_param(url, "scope"),
            Some("openid%20user%3Aread%3Aemail")
        );
        assert_eq!(
            query_param(url, "redirect_uri"),
            Some("http%3A%2F%2Flocalhost%3A3000")
        );

        let state = query_param(url, "state").unwrap();
        assert!(state.len() >= MIN_STATE_LEN);
        assert_eq!(state, request.expected_state());
    }

    #[test]
    fn test_endpoint_with_existing_query() {
        let request = AuthorizationRequestBuilder::new(
            "https://idp.example/authorize?tenant=x",
            "c",
            "app://cb",
        )
        .build();
        assert!(
            request
                .authorization_url()
                .starts_with("https://idp.example/authorize?tenant=x&response_type=token")
        );
    }

    #[test]
    fn test_verify_state() {
        let request = builder().build();
        let expected = request.expected_state().to_string();
        assert!(request.verify_state(Some(&expected)));

        assert!(!builder().build().verify_state(Some("forged")));
        assert!(!builder().build().verify_state(None));

        let request = builder().build();
        let truncated = request.expected_state()[1..].to_string();
        assert!(!request.verify_state(Some(&truncated)));
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("hello"), "hello");
        assert_eq!(encode_component("hello world"), "hello%20world");
        assert_eq!(encode_component("a+b"), "a%2Bb");
        assert_eq!(encode_component("user:read:email"), "user%3Aread%3Aemail");
        assert_eq!(encode_component("A-z_0.9~"), "A-z_0.9~");
        assert_eq!(encode_component("é"), "%C3%A9");
    }
}
