//! `reqwest`-backed resource API client and revoker

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use super::{CredentialAttacher, ResourceApi, TokenRevoker};
use crate::auth::{AccessToken, UserProfile};
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};

const CLIENT_ID_HEADER: HeaderName = HeaderName::from_static("client-id");

/// Helix list envelope: `{ "data": [...] }`
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

/// Checks HTTP response status; returns the response on success or an error with details.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::http(status, body))
}

/// Resource API client with default `Client-Id` and bearer headers
#[derive(Debug)]
pub struct HelixClient {
    http: reqwest::Client,
    base_url: String,
    default_headers: RwLock<HeaderMap>,
}

impl HelixClient {
    /// Create a client for `config.api_base_url` carrying `Client-Id`
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` if the client id is not a valid header value.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let client_id = HeaderValue::from_str(&config.client_id)
            .map_err(|e| AuthError::invalid_config(format!("client id: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, client_id);

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            default_headers: RwLock::new(headers),
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Whether a bearer credential is currently attached
    #[must_use]
    pub fn has_bearer(&self) -> bool {
        self.headers().contains_key(AUTHORIZATION)
    }

    fn headers(&self) -> HeaderMap {
        self.default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Issue a GET against the API base with the default headers
    ///
    /// # Errors
    ///
    /// Returns error on network failure or a non-success status.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.http.get(url).headers(self.headers()).send().await?;
        ensure_success(response).await
    }
}

impl CredentialAttacher for HelixClient {
    fn set_bearer(&self, token: &AccessToken) -> Result<()> {
        let mut value = HeaderValue::from_str(&token.authorization_header())
            .map_err(|_| AuthError::invalid_config("access token is not a valid header value"))?;
        value.set_sensitive(true);

        self.default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(AUTHORIZATION, value);
        Ok(())
    }

    fn clear_bearer(&self) {
        self.default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(AUTHORIZATION);
    }
}

#[async_trait]
impl ResourceApi for HelixClient {
    async fn users(&self) -> Result<Vec<UserProfile>> {
        let response = self.get("/users").await?;
        let text = response.text().await?;
        let envelope: DataEnvelope<UserProfile> = serde_json::from_str(&text)?;
        Ok(envelope.data)
    }
}

/// Revocation endpoint client
#[derive(Debug, Clone)]
pub struct HttpRevoker {
    http: reqwest::Client,
    revocation_url: String,
}

impl HttpRevoker {
    /// Create a revoker for `config.revocation_url`
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            revocation_url: config.revocation_url.clone(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

#[async_trait]
impl TokenRevoker for HttpRevoker {
    async fn revoke(&self, token: &AccessToken, client_id: &str) -> Result<()> {
        let params = [("client_id", client_id), ("token", token.secret())];
        let response = self
            .http
            .post(&self.revocation_url)
            .form(&params)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn users_handler(headers: AxumHeaders) -> (StatusCode, Json<serde_json::Value>) {
        let client_id = headers.get("client-id").and_then(|v| v.to_str().ok());
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
        match (client_id, auth) {
            (Some("abc123"), Some("Bearer tok123")) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "data": [{
                        "id": "42",
                        "login": "someone",
                        "display_name": "Someone",
                        "email": "someone@example.com",
                        "profile_image_url": "https://cdn.example/42.png"
                    }]
                })),
            ),
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            ),
        }
    }

    async fn revoke_handler(Form(form): Form<HashMap<String, String>>) -> StatusCode {
        match (form.get("client_id"), form.get("token")) {
            (Some(id), Some(token)) if id == "abc123" && token == "tok123" => StatusCode::OK,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/users", get(users_handler))
            .route("/revoke", post(revoke_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(base: &str) -> AuthConfig {
        AuthConfig::builder()
            .client_id("abc123")
            .api_base_url(format!("{base}/"))
            .revocation_url(format!("{base}/revoke"))
            .build()
    }

    #[tokio::test]
    async fn test_users_requires_bearer() {
        let base = spawn_server().await;
        let client = HelixClient::new(&config(&base)).unwrap();

        assert!(!client.has_bearer());
        let err = client.users().await.unwrap_err();
        assert!(matches!(err, AuthError::Http { status: 401, .. }));

        client.set_bearer(&AccessToken::new("tok123")).unwrap();
        assert!(client.has_bearer());
        let users = client.users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, 42);
        assert_eq!(users[0].display_name, "Someone");

        client.clear_bearer();
        assert!(!client.has_bearer());
        assert!(client.users().await.is_err());
    }

    #[tokio::test]
    async fn test_revoke() {
        let base = spawn_server().await;
        let revoker = HttpRevoker::new(&config(&base));

        revoker
            .revoke(&AccessToken::new("tok123"), "abc123")
            .await
            .unwrap();

        let err = revoker
            .revoke(&AccessToken::new("other"), "abc123")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Http { status: 400, .. }));
    }

    #[test]
    fn test_rejects_header_unsafe_values() {
        let bad = AuthConfig::builder().client_id("abc\n123").build();
        assert!(matches!(
            HelixClient::new(&bad),
            Err(AuthError::InvalidConfig(_))
        ));

        let client = HelixClient::new(&config("http://127.0.0.1:1")).unwrap();
        assert!(client.set_bearer(&AccessToken::new("tok\r\n")).is_err());
        assert!(!client.has_bearer());
    }
}
