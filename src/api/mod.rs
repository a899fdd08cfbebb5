//! Resource API and revocation seams
//!
//! The session controller depends on three narrow interfaces instead of a
//! shared HTTP client with ad-hoc header mutation:
//!
//! - [`CredentialAttacher`] - sets and clears the bearer credential that all
//!   resource API calls carry. Only the controller calls it.
//! - [`ResourceApi`] - fetches the signed-in user's profile records.
//! - [`TokenRevoker`] - tells the provider to invalidate a token.
//!
//! [`HelixClient`] implements the first two over `reqwest`; [`HttpRevoker`]
//! implements the third.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::{AccessToken, UserProfile};
use crate::error::Result;

pub use http::{HelixClient, HttpRevoker};

/// Sets and clears the bearer credential on the resource API client
pub trait CredentialAttacher: Send + Sync {
    /// Attach `Authorization: Bearer <token>` to subsequent requests
    ///
    /// # Errors
    /// Returns error if the token cannot be carried in a header
    fn set_bearer(&self, token: &AccessToken) -> Result<()>;

    /// Remove the bearer credential
    fn clear_bearer(&self);
}

/// Resource API used to verify the signed-in identity
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// `GET /users` for the attached credential
    ///
    /// # Errors
    /// Returns error on network, status or parse failure
    async fn users(&self) -> Result<Vec<UserProfile>>;
}

/// Provider token revocation endpoint
#[async_trait]
pub trait TokenRevoker: Send + Sync {
    /// Revoke `token` issued to `client_id`
    ///
    /// # Errors
    /// Returns error if the provider could not be reached or refused
    async fn revoke(&self, token: &AccessToken, client_id: &str) -> Result<()>;
}

impl<T: CredentialAttacher + ?Sized> CredentialAttacher for Arc<T> {
    fn set_bearer(&self, token: &AccessToken) -> Result<()> {
        (**self).set_bearer(token)
    }

    fn clear_bearer(&self) {
        (**self).clear_bearer();
    }
}

#[async_trait]
impl<T: ResourceApi + ?Sized> ResourceApi for Arc<T> {
    async fn users(&self) -> Result<Vec<UserProfile>> {
        (**self).users().await
    }
}

#[async_trait]
impl<T: TokenRevoker + ?Sized> TokenRevoker for Arc<T> {
    async fn revoke(&self, token: &AccessToken, client_id: &str) -> Result<()> {
        (**self).revoke(token, client_id).await
    }
}
