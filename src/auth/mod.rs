//! OAuth 2.0 implicit-grant session management
//!
//! # Overview
//!
//! This module implements sign-in and sign-out against a Twitch-style
//! identity provider. The flow works as follows:
//!
//! 1. Build an authorization URL with a fresh anti-forgery `state`
//! 2. Hand it to a [`RedirectHandler`](crate::redirect::RedirectHandler) and wait for the callback
//! 3. Reject the callback unless it echoes the exact `state`
//! 4. Attach the returned access token as a bearer credential
//! 5. Fetch `/users` and keep the first profile as the session identity
//!
//! Sign-out revokes the token best-effort, then always clears the session
//! and the bearer credential.
//!
//! # Security
//!
//! - `state` is 32 CSPRNG bytes, compared in constant time, and used once
//! - `force_verify=true` makes the provider re-prompt, so a stale provider
//!   session cannot silently sign in a different user
//! - Access tokens are redacted from `Debug` output and never logged
//! - Sign-in failures all surface as the same `"Invalid login."` error

mod controller;
mod request;
mod session;
mod status;

pub use controller::{AuthSessionController, AuthSessionControllerBuilder};
pub use request::{
    AuthorizationRequest, AuthorizationRequestBuilder, MIN_STATE_LEN, generate_state,
};
pub use session::{AccessToken, Session, UserProfile};
pub use status::{AuthState, AuthStatus};
