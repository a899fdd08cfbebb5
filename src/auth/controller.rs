//! Sign-in / sign-out state machine
//!
//! ```text
//!            sign_in()                      redirect + validate + /users
//!   Idle ───────────────► Authenticating ─────────────────────────────► Authenticated
//!    ▲                         │ any failure, cancel, or dropped future        │
//!    ├─────────────────────────┘                                               │ sign_out()
//!    │                                                                         ▼
//!    └──────────────────────── always (revocation best-effort) ──────────  RevokingOut
//! ```
//!
//! Both transitions hold a drop guard for their whole duration. Whatever
//! happens inside (error return, panic in a collaborator, the caller dropping
//! the future), the guard restores a consistent resting state: no
//! "authenticating" flag left set, and no bearer credential attached without
//! a committed session.

use std::sync::Arc;

use tokio::sync::watch;

use super::request::{AuthorizationRequest, AuthorizationRequestBuilder};
use super::session::{AccessToken, Session, UserProfile};
use super::status::{AuthState, AuthStatus};
use crate::api::{CredentialAttacher, HelixClient, HttpRevoker, ResourceApi, TokenRevoker};
use crate::config::AuthConfig;
use crate::error::{AuthError, LoginFailure, Result};
use crate::redirect::{RedirectHandler, RedirectOutcome};

/// Resets the controller after a sign-in attempt that did not commit
struct SignInGuard<'a> {
    state: &'a watch::Sender<AuthState>,
    credentials: &'a dyn CredentialAttacher,
    attached: bool,
}

impl SignInGuard<'_> {
    fn attach(&mut self, token: &AccessToken) -> Result<()> {
        self.attached = true;
        self.credentials.set_bearer(token)
    }

    fn commit(mut self, session: Session) {
        self.attached = false;
        self.state.send_modify(|s| {
            s.status = AuthStatus::Authenticated;
            s.session = session;
        });
    }
}

impl Drop for SignInGuard<'_> {
    fn drop(&mut self) {
        if self.attached {
            self.credentials.clear_bearer();
        }
        self.state.send_if_modified(|s| {
            if s.status == AuthStatus::Authenticating {
                s.status = AuthStatus::Idle;
                s.session = Session::default();
                true
            } else {
                false
            }
        });
    }
}

/// Clears all local session state when a sign-out finishes, however it finishes
struct SignOutGuard<'a> {
    state: &'a watch::Sender<AuthState>,
    credentials: &'a dyn CredentialAttacher,
}

impl Drop for SignOutGuard<'_> {
    fn drop(&mut self) {
        self.credentials.clear_bearer();
        self.state.send_if_modified(|s| {
            if s.status == AuthStatus::Idle && !s.session.is_authenticated() {
                return false;
            }
            s.session = Session::default();
            s.status = AuthStatus::Idle;
            true
        });
    }
}

/// Builder for [`AuthSessionController`]
pub struct AuthSessionControllerBuilder {
    config: AuthConfig,
    redirect: Option<Arc<dyn RedirectHandler>>,
    api: Option<Arc<dyn ResourceApi>>,
    credentials: Option<Arc<dyn CredentialAttacher>>,
    revoker: Option<Arc<dyn TokenRevoker>>,
}

impl AuthSessionControllerBuilder {
    /// Set the redirect mechanism
    #[must_use]
    pub fn redirect(mut self, redirect: Arc<dyn RedirectHandler>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Set the resource API used to fetch the profile
    #[must_use]
    pub fn resource_api(mut self, api: Arc<dyn ResourceApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the credential attacher for the resource API client
    #[must_use]
    pub fn credentials(mut self, credentials: Arc<dyn CredentialAttacher>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the revocation endpoint client
    #[must_use]
    pub fn revoker(mut self, revoker: Arc<dyn TokenRevoker>) -> Self {
        self.revoker = Some(revoker);
        self
    }

    /// Build the controller
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` if a collaborator is missing or the
    /// client id is empty.
    pub fn build(self) -> Result<AuthSessionController> {
        let missing = |name: &str| AuthError::invalid_config(format!("{name} not set"));
        if self.config.client_id.trim().is_empty() {
            return Err(AuthError::invalid_config("client id is empty"));
        }

        Ok(AuthSessionController {
            requests: self.config.request_builder(),
            redirect: self.redirect.ok_or_else(|| missing("redirect handler"))?,
            api: self.api.ok_or_else(|| missing("resource API"))?,
            credentials: self.credentials.ok_or_else(|| missing("credential attacher"))?,
            revoker: self.revoker.ok_or_else(|| missing("token revoker"))?,
            state: watch::Sender::new(AuthState::default()),
            config: self.config,
        })
    }
}

/// Drives the sign-in and sign-out flows and owns the resulting session.
///
/// Share it behind an `Arc`; observe it with [`subscribe`](Self::subscribe)
/// or the snapshot accessors.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use twitch_auth_session::{AuthConfig, AuthSessionController, TerminalRedirect};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AuthConfig::from_env()?;
/// let controller = AuthSessionController::with_http(config, Arc::new(TerminalRedirect::new()))?;
///
/// controller.sign_in().await?;
/// println!("Hello, {:?}", controller.user().display_name());
///
/// controller.sign_out().await?;
/// assert!(!controller.user().is_authenticated());
/// # Ok(())
/// # }
/// ```
pub struct AuthSessionController {
    config: AuthConfig,
    requests: AuthorizationRequestBuilder,
    redirect: Arc<dyn RedirectHandler>,
    api: Arc<dyn ResourceApi>,
    credentials: Arc<dyn CredentialAttacher>,
    revoker: Arc<dyn TokenRevoker>,
    state: watch::Sender<AuthState>,
}

impl std::fmt::Debug for AuthSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionController")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl AuthSessionController {
    /// Create a builder for custom collaborators
    #[must_use]
    pub fn builder(config: AuthConfig) -> AuthSessionControllerBuilder {
        AuthSessionControllerBuilder {
            config,
            redirect: None,
            api: None,
            credentials: None,
            revoker: None,
        }
    }

    /// Create a controller backed by [`HelixClient`] and [`HttpRevoker`]
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be configured.
    pub fn with_http(config: AuthConfig, redirect: Arc<dyn RedirectHandler>) -> Result<Self> {
        let helix = Arc::new(HelixClient::new(&config)?);
        let revoker = Arc::new(HttpRevoker::new(&config));
        Self::builder(config)
            .redirect(redirect)
            .resource_api(helix.clone())
            .credentials(helix)
            .revoker(revoker)
            .build()
    }

    /// Get the provider configuration
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Current session (empty unless authenticated)
    #[must_use]
    pub fn user(&self) -> Session {
        self.state.borrow().session.clone()
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.state.borrow().status
    }

    /// True while a sign-in is in flight
    #[must_use]
    pub fn is_logging_in(&self) -> bool {
        self.status().is_logging_in()
    }

    /// True while a sign-out is in flight
    #[must_use]
    pub fn is_logging_out(&self) -> bool {
        self.status().is_logging_out()
    }

    /// Snapshot of status and session
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receive every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Run the authorization flow and establish a session.
    ///
    /// # Errors
    ///
    /// - `AuthError::SignInInProgress` / `SignOutInProgress` /
    ///   `AlreadyAuthenticated` if the controller is not idle; nothing is
    ///   started in that case.
    /// - `AuthError::InvalidLogin` for any failure of the flow itself. The
    ///   controller is back in `Idle` with an empty session.
    pub async fn sign_in(&self) -> Result<()> {
        let mut guard = self.begin_sign_in()?;

        let request = self.requests.build();
        tracing::debug!("Starting authorization request");
        let outcome = self.redirect.authorize(request.authorization_url()).await;

        let token = Self::validate_callback(request, outcome)?;

        if let Err(e) = guard.attach(&token) {
            tracing::warn!(error = %e, "Could not attach bearer credential");
            return Err(AuthError::invalid_login(LoginFailure::ExchangeFailure));
        }

        let profile = self.fetch_profile().await?;
        let user_id = profile.id;
        guard.commit(Session::authenticated(profile, token));

        tracing::info!(user_id, "Signed in");
        Ok(())
    }

    /// End the session.
    ///
    /// Revocation is best-effort: its failure is logged and the local session
    /// is cleared regardless.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignInInProgress` or `AuthError::SignOutInProgress`
    /// if another transition is running; state is left untouched.
    pub async fn sign_out(&self) -> Result<()> {
        let token = self.begin_sign_out()?;
        let _guard = SignOutGuard {
            state: &self.state,
            credentials: self.credentials.as_ref(),
        };

        if let Some(token) = token {
            tracing::debug!("Revoking access token");
            if let Err(e) = self.revoker.revoke(&token, &self.config.client_id).await {
                tracing::warn!(
                    error = %e,
                    "Token revocation failed; clearing local session anyway"
                );
            }
        }

        tracing::info!("Signed out");
        Ok(())
    }

    fn begin_sign_in(&self) -> Result<SignInGuard<'_>> {
        let mut rejection = None;
        self.state.send_if_modified(|s| match s.status {
            AuthStatus::Idle => {
                s.status = AuthStatus::Authenticating;
                true
            }
            AuthStatus::Authenticating => {
                rejection = Some(AuthError::SignInInProgress);
                false
            }
            AuthStatus::RevokingOut => {
                rejection = Some(AuthError::SignOutInProgress);
                false
            }
            AuthStatus::Authenticated => {
                rejection = Some(AuthError::AlreadyAuthenticated);
                false
            }
        });

        if let Some(err) = rejection {
            tracing::debug!(error = %err, "Sign-in rejected");
            return Err(err);
        }

        Ok(SignInGuard {
            state: &self.state,
            credentials: self.credentials.as_ref(),
            attached: false,
        })
    }

    fn begin_sign_out(&self) -> Result<Option<AccessToken>> {
        let mut result = Ok(None);
        self.state.send_if_modified(|s| match s.status {
            AuthStatus::Authenticated => {
                result = Ok(s.session.access_token().cloned());
                s.status = AuthStatus::RevokingOut;
                true
            }
            AuthStatus::Idle => false,
            AuthStatus::Authenticating => {
                result = Err(AuthError::SignInInProgress);
                false
            }
            AuthStatus::RevokingOut => {
                result = Err(AuthError::SignOutInProgress);
                false
            }
        });
        result
    }

    /// Check the callback against the request and extract the token
    fn validate_callback(
        request: AuthorizationRequest,
        outcome: RedirectOutcome,
    ) -> Result<AccessToken> {
        let params = match outcome {
            RedirectOutcome::Success(params) => params,
            RedirectOutcome::Cancelled => {
                tracing::debug!("Authorization cancelled by user");
                return Err(AuthError::invalid_login(LoginFailure::UserDenied));
            }
            RedirectOutcome::Denied { error, description } => {
                tracing::debug!(%error, ?description, "Authorization denied by provider");
                return Err(AuthError::invalid_login(LoginFailure::UserDenied));
            }
        };

        if let Some(error) = params.error.as_deref() {
            tracing::debug!(%error, "Callback carried an error");
            return Err(AuthError::invalid_login(LoginFailure::UserDenied));
        }

        if !request.verify_state(params.state.as_deref()) {
            tracing::warn!("Callback state does not match request; possible forgery or replay");
            return Err(AuthError::invalid_login(LoginFailure::StateMismatch));
        }

        params
            .access_token
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| {
                tracing::warn!("Callback carried no access token");
                AuthError::invalid_login(LoginFailure::MalformedCallback)
            })
    }

    /// Fetch the profile list and keep the first record
    async fn fetch_profile(&self) -> Result<UserProfile> {
        let users = self.api.users().await.map_err(|e| {
            tracing::warn!(error = %e, "Profile fetch failed");
            AuthError::invalid_login(LoginFailure::ExchangeFailure)
        })?;

        users.into_iter().next().ok_or_else(|| {
            tracing::warn!("Profile list was empty");
            AuthError::invalid_login(LoginFailure::ExchangeFailure)
        })
    }
}
