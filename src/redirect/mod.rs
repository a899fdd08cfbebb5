//! Redirect mechanism abstraction
//!
//! The redirect mechanism shows the authorization URL to the user (browser,
//! webview, terminal prompt) and resolves once with the provider's callback,
//! a cancellation, or a denial. It is modeled as a single-shot async call so
//! the controller's transition table stays total.
//!
//! # Example: Custom handler
//!
//! ```no_run
//! use twitch_auth_session::redirect::{RedirectHandler, RedirectOutcome};
//! use async_trait::async_trait;
//!
//! struct AlwaysCancel;
//!
//! #[async_trait]
//! impl RedirectHandler for AlwaysCancel {
//!     async fn authorize(&self, _authorization_url: &str) -> RedirectOutcome {
//!         RedirectOutcome::Cancelled
//!     }
//! }
//! ```

pub mod terminal;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use url::Url;

pub use terminal::TerminalRedirect;

/// Parameters carried by the provider's callback
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Echoed anti-forgery state
    pub state: Option<String>,
    /// Access token (implicit grant)
    pub access_token: Option<String>,
    /// Provider error code, e.g. `access_denied`
    pub error: Option<String>,
    /// Provider error description
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse `key=value&...` pairs, as found in a callback fragment or query
    #[must_use]
    pub fn from_pairs(encoded: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(encoded.as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "state" => params.state = value,
                "access_token" => params.access_token = value,
                "error" => params.error = value,
                "error_description" => params.error_description = value,
                _ => {}
            }
        }
        params
    }
}

/// Resolution of a single redirect round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Provider redirected back with parameters
    Success(CallbackParams),
    /// User dismissed the flow
    Cancelled,
    /// Provider reported an error
    Denied {
        /// Error code
        error: String,
        /// Optional human-readable description
        description: Option<String>,
    },
}

impl RedirectOutcome {
    /// Classify a callback URL.
    ///
    /// Implicit-grant providers return parameters in the fragment; errors
    /// usually arrive in the query. Fragment parameters win when both are
    /// present. A callback carrying `error` resolves to [`Self::Denied`].
    ///
    /// # Errors
    ///
    /// Returns an error if `callback_url` is not an absolute URL.
    pub fn from_callback_url(callback_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(callback_url)?;
        let params = match url.fragment().filter(|f| !f.is_empty()) {
            Some(fragment) => CallbackParams::from_pairs(fragment),
            None => CallbackParams::from_pairs(url.query().unwrap_or_default()),
        };
        Ok(Self::from_params(params))
    }

    /// Classify already-extracted callback parameters
    #[must_use]
    pub fn from_params(params: CallbackParams) -> Self {
        match params.error {
            Some(error) => Self::Denied {
                error,
                description: params.error_description,
            },
            None => Self::Success(params),
        }
    }
}

/// Trait for redirect mechanisms.
///
/// Implementations must resolve exactly once per call and must not hang
/// when the user abandons the flow: resolve with [`RedirectOutcome::Cancelled`].
#[async_trait]
pub trait RedirectHandler: Send + Sync {
    /// Present the authorization URL and wait for the callback
    async fn authorize(&self, authorization_url: &str) -> RedirectOutcome;
}

#[async_trait]
impl<T: RedirectHandler + ?Sized> RedirectHandler for Arc<T> {
    async fn authorize(&self, authorization_url: &str) -> RedirectOutcome {
        (**self).authorize(authorization_url).await
    }
}

#[async_trait]
impl RedirectHandler for Box<dyn RedirectHandler> {
    async fn authorize(&self, authorization_url: &str) -> RedirectOutcome {
        (**self).authorize(authorization_url).await
    }
}

/// Type alias for a shared redirect handler.
pub type SharedRedirectHandler = Arc<dyn RedirectHandler>;

/// Boxed future returned by closure-based handlers
pub type RedirectFuture = BoxFuture<'static, RedirectOutcome>;

/// Wrapper to convert a closure into a `RedirectHandler`.
///
/// # Example
///
/// ```no_run
/// use twitch_auth_session::redirect::{CallbackParams, FnRedirectHandler, RedirectOutcome};
///
/// let handler = FnRedirectHandler::new(|url| {
///     Box::pin(async move {
///         println!("would open {url}");
///         RedirectOutcome::Success(CallbackParams::default())
///     })
/// });
/// ```
pub struct FnRedirectHandler<F>
where
    F: Fn(String) -> RedirectFuture + Send + Sync,
{
    func: F,
}

impl<F> FnRedirectHandler<F>
where
    F: Fn(String) -> RedirectFuture + Send + Sync,
{
    /// Create a new function-based redirect handler.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> RedirectHandler for FnRedirectHandler<F>
where
    F: Fn(String) -> RedirectFuture + Send + Sync,
{
    async fn authorize(&self, authorization_url: &str) -> RedirectOutcome {
        (self.func)(authorization_url.to_string()).await
    }
}
