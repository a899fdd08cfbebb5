//! # Twitch Auth Session
//!
//! OAuth 2.0 implicit-grant sign-in for Twitch-style identity providers,
//! producing a short-lived in-memory session: an access token bound to a
//! verified user profile, with a clean revocation path on sign-out.
//! Async/await, strong typing, tokio-based.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use twitch_auth_session::{AuthConfig, AuthSessionController, TerminalRedirect};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads CLIENT_ID (and optionally REDIRECT_URI)
//!     let config = AuthConfig::from_env()?;
//!     let controller = AuthSessionController::with_http(config, Arc::new(TerminalRedirect::new()))?;
//!
//!     controller.sign_in().await?;
//!     let user = controller.user();
//!     println!("Signed in as {:?} ({:?})", user.display_name(), user.email());
//!
//!     controller.sign_out().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`auth`]: request builder, session types, and the [`AuthSessionController`] state machine
//! - [`redirect`]: the redirect mechanism seam and a terminal implementation
//! - [`api`]: credential attacher, resource API and revocation seams, plus `reqwest` implementations
//! - [`config`]: provider endpoints, client id and scopes
//! - [`error`]: error types and handling
//!
//! ## Observing State
//!
//! The controller publishes an [`AuthState`] snapshot on every transition.
//! UI layers can render reactively from [`AuthSessionController::subscribe`]:
//!
//! ```no_run
//! # use twitch_auth_session::AuthSessionController;
//! # async fn example(controller: &AuthSessionController) {
//! let mut rx = controller.subscribe();
//! while rx.changed().await.is_ok() {
//!     let state = rx.borrow_and_update().clone();
//!     println!("logging in: {}, logging out: {}", state.is_logging_in(), state.is_logging_out());
//! }
//! # }
//! ```
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tracing events are always emitted but are zero-cost when no subscriber is attached.
//! Access tokens are never logged.
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, AuthError>`](Result). Every
//! failed sign-in is reported as [`AuthError::InvalidLogin`], whose message
//! is always `"Invalid login."`; the internal cause is available through
//! [`AuthError::login_failure`]:
//!
//! ```no_run
//! # use twitch_auth_session::{AuthError, AuthSessionController};
//! # async fn example(controller: &AuthSessionController) {
//! match controller.sign_in().await {
//!     Ok(()) => {}
//!     Err(e @ AuthError::InvalidLogin(_)) => {
//!         eprintln!("{e}");
//!         tracing::debug!(cause = ?e.login_failure(), "sign-in failed");
//!     }
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod redirect;

// Re-export commonly used types
pub use api::{CredentialAttacher, HelixClient, HttpRevoker, ResourceApi, TokenRevoker};
pub use auth::{
    AccessToken, AuthSessionController, AuthSessionControllerBuilder, AuthState, AuthStatus,
    AuthorizationRequest, AuthorizationRequestBuilder, Session, UserProfile,
};
pub use config::AuthConfig;
pub use error::{AuthError, LoginFailure, Result};
pub use redirect::{
    CallbackParams, FnRedirectHandler, RedirectHandler, RedirectOutcome, TerminalRedirect,
};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
