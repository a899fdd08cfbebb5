//! Terminal redirect handler
//!
//! Prints the authorization URL, optionally opens the system browser, and
//! reads the callback URL the user pastes back from the address bar.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CallbackParams, RedirectHandler, RedirectOutcome};
use crate::error::{AuthError, Result};

/// Redirect handler driven by stdin/stdout
#[derive(Debug, Clone)]
pub struct TerminalRedirect {
    auto_open_browser: bool,
}

impl Default for TerminalRedirect {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRedirect {
    /// Create a handler that opens the browser automatically
    #[must_use]
    pub fn new() -> Self {
        Self {
            auto_open_browser: true,
        }
    }

    /// Set whether to automatically open browser (default: true)
    #[must_use]
    pub fn auto_open_browser(mut self, auto_open: bool) -> Self {
        self.auto_open_browser = auto_open;
        self
    }

    /// Open URL in default browser
    fn open_browser(url: &str) -> Result<()> {
        #[cfg(target_os = "macos")]
        {
            std::process::Command::new("open").arg(url).spawn()?;
        }

        #[cfg(target_os = "linux")]
        {
            std::process::Command::new("xdg-open").arg(url).spawn()?;
        }

        #[cfg(target_os = "windows")]
        {
            std::process::Command::new("cmd")
                .args(["/C", "start", "", url])
                .spawn()?;
        }

        Ok(())
    }

    async fn read_line() -> Result<String> {
        let mut input = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        let read = reader.read_line(&mut input).await?;
        if read == 0 {
            return Err(AuthError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stdin closed",
            )));
        }
        Ok(input)
    }
}

/// Interpret a line pasted by the user.
///
/// Accepts a full callback URL or a bare `access_token=...&state=...`
/// fragment. An empty line or `cancel` cancels the flow.
fn parse_pasted(input: &str) -> RedirectOutcome {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("cancel") {
        return RedirectOutcome::Cancelled;
    }

    if input.contains("://") {
        match RedirectOutcome::from_callback_url(input) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse pasted callback URL");
                RedirectOutcome::Success(CallbackParams::default())
            }
        }
    } else {
        let pairs = input.trim_start_matches(['#', '?']);
        RedirectOutcome::from_params(CallbackParams::from_pairs(pairs))
    }
}

#[async_trait]
impl RedirectHandler for TerminalRedirect {
    async fn authorize(&self, authorization_url: &str) -> RedirectOutcome {
        println!();
        println!("To sign in, please:");
        println!("  1. Open the following URL in your browser");
        println!("  2. Approve access with your Twitch account");
        println!("  3. Copy the full URL you are redirected to");
        println!("  4. Paste it below");
        println!();
        println!("Authorization URL:");
        println!("  {authorization_url}");
        println!();

        if self.auto_open_browser {
            if let Err(e) = Self::open_browser(authorization_url) {
                tracing::debug!("Could not open browser: {e}");
                println!("(Could not open browser automatically - please open the URL manually)");
            } else {
                println!("(Opening browser...)");
            }
        }

        println!("Paste callback URL (or 'cancel' to abort): ");

        match Self::read_line().await {
            Ok(line) => parse_pasted(&line),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read callback from stdin");
                RedirectOutcome::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_inputs() {
        assert_eq!(parse_pasted(""), RedirectOutcome::Cancelled);
        assert_eq!(parse_pasted("  \n"), RedirectOutcome::Cancelled);
        assert_eq!(parse_pasted("CANCEL\n"), RedirectOutcome::Cancelled);
    }

    #[test]
    fn test_full_callback_url() {
        let outcome = parse_pasted("http://localhost:3000/#access_token=tok&state=s1\n");
        let RedirectOutcome::Success(params) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(params.access_token.as_deref(), Some("tok"));
        assert_eq!(params.state.as_deref(), Some("s1"));
    }

    #[test]
    fn test_bare_fragment() {
        let outcome = parse_pasted("#access_token=tok&state=s1");
        assert!(matches!(outcome, RedirectOutcome::Success(ref p) if p.state.as_deref() == Some("s1")));
    }

    #[test]
    fn test_pasted_denial() {
        let outcome = parse_pasted("error=access_denied&state=s1");
        assert!(matches!(outcome, RedirectOutcome::Denied { ref error, .. } if error == "access_denied"));
    }

    #[test]
    fn test_builder_flag() {
        let handler = TerminalRedirect::new().auto_open_browser(false);
        assert!(!handler.auto_open_browser);
    }
}
