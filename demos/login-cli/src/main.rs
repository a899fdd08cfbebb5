//! Twitch Login Demo
//!
//! Demonstrates the in-memory session lifecycle:
//! 1. Load the client id from the environment
//! 2. Open the authorization URL and paste back the redirect URL
//! 3. Verify the state, fetch the profile, show the session
//! 4. Press Enter to sign out (revocation is best-effort)
//!
//! Run with: CLIENT_ID=... cargo run -p twitch-login-cli

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use twitch_auth_session::{AuthConfig, AuthSessionController, Session, TerminalRedirect};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twitch_auth_session=debug".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut open_browser = true;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--no-browser" => open_browser = false,
            "help" | "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_help();
                return Ok(());
            }
        }
    }

    let config = AuthConfig::from_env().context("loading provider configuration")?;
    println!("Twitch Sign-In Demo");
    println!("───────────────────");
    println!("  Client id:    {}", config.client_id);
    println!("  Redirect URI: {}", config.redirect_uri);
    println!("  Scopes:       {}", config.scopes.join(" "));

    let redirect = Arc::new(TerminalRedirect::new().auto_open_browser(open_browser));
    let controller = Arc::new(AuthSessionController::with_http(config, redirect)?);

    // Mirror status transitions the way a UI would render them
    let mut rx = controller.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().status;
            tracing::info!(%status, "Session status changed");
        }
    });

    if let Err(e) = controller.sign_in().await {
        tracing::debug!(cause = ?e.login_failure(), "Sign-in failed");
        eprintln!();
        eprintln!("✗ {e}");
        return Ok(());
    }

    println!();
    println!("✓ Signed in");
    print_session(&controller.user());

    println!();
    println!("Press Enter to sign out...");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    controller.sign_out().await?;
    println!("✓ Signed out");
    println!("  Session cleared: {}", !controller.user().is_authenticated());

    Ok(())
}

fn print_session(session: &Session) {
    let Some(profile) = session.profile() else {
        println!("  (no session)");
        return;
    };
    println!("Session:");
    println!("  User id:      {}", profile.id);
    println!("  Display name: {}", profile.display_name);
    println!("  Email:        {}", profile.email);
    println!("  Avatar:       {}", profile.profile_image_url);
    if let Some(token) = session.access_token() {
        println!("  Access token: {}...", token_preview(token.secret()));
    }
}

/// First few characters of a secret, safe for any UTF-8 input
fn token_preview(secret: &str) -> String {
    secret.chars().take(6).collect()
}

fn print_help() {
    println!("Usage: cargo run -p twitch-login-cli [--no-browser]");
    println!();
    println!("Environment:");
    println!("  CLIENT_ID      Twitch application client id (required)");
    println!("  REDIRECT_URI   Redirect registered for the application (default http://localhost:3000)");
    println!("  RUST_LOG       Tracing filter (default twitch_auth_session=debug)");
    println!();
    println!("Flow:");
    println!("  1. The authorization URL is printed (and opened unless --no-browser)");
    println!("  2. Approve access in the browser");
    println!("  3. Copy the URL you land on and paste it in the terminal");
    println!("  4. Press Enter to sign out");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("abcdefghij"), "abcdef");
        assert_eq!(token_preview("abc"), "abc");
        assert_eq!(token_preview("ééééééé"), "éééééé");
    }
}
