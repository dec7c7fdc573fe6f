//! Command-line interface definition for Spottoken
//!
//! This module defines the CLI structure using clap's derive API.  The tool
//! is single-purpose, so there are no subcommands: every invocation runs
//! one authorization attempt.

use clap::Parser;

use crate::auth::flow::{DEFAULT_REDIRECT_PORT, SPOTIFY_AUTH_URL, SPOTIFY_TOKEN_URL};

/// Default scopes requested when `--scope` is not given.
pub const DEFAULT_SCOPE: &str =
    "user-read-private user-library-read playlist-read-private playlist-read-collaborative";

/// Spottoken - Get a Spotify access token via the authorization code flow
/// with PKCE
///
/// Prints an authorization URL for the operator to open in a browser,
/// captures the redirect on a local port, exchanges the code for tokens,
/// and copies the access token to the clipboard.
#[derive(Parser, Debug, Clone)]
#[command(name = "spottoken")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Spotify application client ID
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: String,

    /// Spotify application client secret (omit for public-client PKCE-only mode)
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", default_value = "")]
    pub client_secret: String,

    /// Space-separated scopes to request
    #[arg(long, default_value = DEFAULT_SCOPE)]
    pub scope: String,

    /// Local port for the redirect callback (must match the registered redirect URI)
    #[arg(long, default_value_t = DEFAULT_REDIRECT_PORT)]
    pub port: u16,

    /// Authorization endpoint URL
    #[arg(long, default_value = SPOTIFY_AUTH_URL)]
    pub auth_url: String,

    /// Token endpoint URL
    #[arg(long, default_value = SPOTIFY_TOKEN_URL)]
    pub token_url: String,

    /// Seconds to wait for the browser authorization before giving up
    #[arg(long, default_value_t = 600)]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The client secret as an option: empty string means "not supplied"
    /// (public client).
    pub fn client_secret_opt(&self) -> Option<String> {
        if self.client_secret.is_empty() {
            None
        } else {
            Some(self.client_secret.clone())
        }
    }
}
