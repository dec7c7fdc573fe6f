//! OAuth 2.0 authorization code flow with PKCE
//!
//! This module drives the one-shot interactive flow: generate a PKCE pair
//! and state token, start the local callback listener, present the
//! authorization URL to the operator, wait for the browser redirect, and
//! exchange the captured code for tokens at the token endpoint.
//!
//! # Flow overview
//!
//! 1. Generate a PKCE S256 pair and a random `state` value.
//! 2. Bind the loopback listener on the fixed redirect port.
//! 3. Build the authorization URL, print it, and copy it to the clipboard.
//!    The browser is never opened automatically.
//! 4. Wait (with a generous timeout) for the single redirect callback.
//! 5. Validate `state`; exchange `code` for tokens.  Confidential clients
//!    authenticate the exchange with HTTP Basic credentials; public clients
//!    rely on PKCE alone.
//!
//! # References
//!
//! - RFC 6749 <https://www.rfc-editor.org/rfc/rfc6749>
//! - RFC 7636 PKCE <https://www.rfc-editor.org/rfc/rfc7636>

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::listener::{AuthorizationResult, CallbackListener};
use crate::auth::pkce;
use crate::clipboard;
use crate::error::{Result, SpottokenError};

/// Spotify's authorization endpoint, the default for `--auth-url`.
pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Spotify's token endpoint, the default for `--token-url`.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Default loopback port; must match the redirect URI registered with the
/// authorization server.
pub const DEFAULT_REDIRECT_PORT: u16 = 8888;

/// How long to wait for the operator to complete the browser flow before
/// giving up.  Generous on purpose: the operator may need to log in first.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

// ---------------------------------------------------------------------------
// TokenResponse
// ---------------------------------------------------------------------------

/// JSON response from the OAuth token endpoint, held in memory only for the
/// duration of the process.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenResponse {
    /// The bearer access token.
    pub access_token: String,

    /// Token type, normally `"Bearer"`.  Defaulted when the server omits it.
    #[serde(default)]
    pub token_type: Option<String>,

    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,

    /// Refresh token, when the server grants one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Space-separated scopes actually granted.
    #[serde(default)]
    pub scope: Option<String>,
}

// ---------------------------------------------------------------------------
// AuthFlowConfig
// ---------------------------------------------------------------------------

/// Configuration for one authorization attempt.
///
/// Built from the CLI arguments in `src/commands/mod.rs`.
///
/// # Examples
///
/// ```
/// use spottoken::auth::flow::AuthFlowConfig;
///
/// let config = AuthFlowConfig::new("my-client-id".to_string());
/// assert_eq!(config.redirect_port, 8888);
/// assert!(config.client_secret.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct AuthFlowConfig {
    /// OAuth client identifier (required).
    pub client_id: String,

    /// Optional client secret.  When set, the token exchange authenticates
    /// with HTTP Basic credentials (confidential-client mode); when `None`,
    /// no credentials are sent (public-client PKCE-only mode).
    pub client_secret: Option<String>,

    /// Space-separated scopes to request.
    pub scope: String,

    /// Local TCP port to bind for the redirect callback.
    pub redirect_port: u16,

    /// Authorization endpoint URL.
    pub authorize_url: String,

    /// Token endpoint URL.
    pub token_url: String,

    /// Maximum time to wait for the redirect callback.
    pub wait_timeout: Duration,
}

impl AuthFlowConfig {
    /// Creates a config with the Spotify defaults for everything except the
    /// client id.
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            client_secret: None,
            scope: String::new(),
            redirect_port: DEFAULT_REDIRECT_PORT,
            authorize_url: SPOTIFY_AUTH_URL.to_string(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// AuthFlow
// ---------------------------------------------------------------------------

/// Drives one OAuth 2.0 authorization code + PKCE attempt.
///
/// Single attempt only: no retries, no backoff, no token persistence.  The
/// operator re-invokes the tool to try again after any failure.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use spottoken::auth::flow::{AuthFlow, AuthFlowConfig};
///
/// # async fn example() -> spottoken::error::Result<()> {
/// let config = AuthFlowConfig::new("my-client-id".to_string());
/// let flow = AuthFlow::new(Arc::new(reqwest::Client::new()), config);
/// let token = flow.run().await?;
/// println!("{}", token.access_token);
/// # Ok(())
/// # }
/// ```
pub struct AuthFlow {
    http: Arc<reqwest::Client>,
    config: AuthFlowConfig,
}

impl AuthFlow {
    /// Creates a new `AuthFlow`.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client for the token exchange.
    /// * `config` - Attempt configuration.
    pub fn new(http: Arc<reqwest::Client>, config: AuthFlowConfig) -> Self {
        Self { http, config }
    }

    /// Runs the full interactive authorization flow and returns the token.
    ///
    /// # Errors
    ///
    /// - [`SpottokenError::Listener`] when the redirect port cannot be bound.
    /// - [`SpottokenError::Authorization`] when the operator denies the
    ///   request, the callback times out or lacks a code, or the echoed
    ///   `state` does not match the one sent.
    /// - [`SpottokenError::TokenExchange`] when the token endpoint returns a
    ///   non-success status.
    pub async fn run(&self) -> Result<TokenResponse> {
        // Step 1: PKCE pair + state token, one per attempt.
        let pair = pkce::generate()?;
        let state = pkce::generate_state()?;

        // Step 2: bind the listener before handing out the URL, so the
        // redirect target exists by the time the operator clicks through.
        let listener = CallbackListener::bind(self.config.redirect_port).await?;
        let redirect_uri = listener.redirect_uri();
        println!("[*] Local server started at {redirect_uri}");

        // Step 3: authorization URL; printed and copied, never auto-opened.
        let auth_url = self.build_authorization_url(&redirect_uri, &pair.challenge, &state)?;
        println!("[*] Open browser and navigate to this URL to authorize...");
        println!("    URL: {auth_url}");
        if clipboard::copy_best_effort("authorization URL", &auth_url) {
            println!("[-] Authorization URL copied to clipboard.");
        }

        // Step 4: one callback, bounded by a generous timeout.
        println!("[*] Waiting for user authorization...");
        let result = tokio::time::timeout(self.config.wait_timeout, listener.recv())
            .await
            .map_err(|_| {
                SpottokenError::Authorization(format!(
                    "no callback received within {} seconds",
                    self.config.wait_timeout.as_secs()
                ))
            })??;

        let code = match result {
            AuthorizationResult::Granted { code, state: echoed } => {
                // Step 5: the echoed state must match the one we sent, or the
                // redirect may belong to a forged request.
                if echoed.as_deref() != Some(state.as_str()) {
                    return Err(SpottokenError::Authorization(
                        "state mismatch in authorization callback".to_string(),
                    )
                    .into());
                }
                code
            }
            AuthorizationResult::Denied { error } => {
                return Err(
                    SpottokenError::Authorization(format!("authorization denied: {error}")).into(),
                );
            }
        };
        println!("[*] Authorization code received.");

        // Step 6: exchange the code; the verifier leaves the process here
        // and nowhere else.
        println!("[*] Exchanging code for access token...");
        self.exchange_code(&code, &redirect_uri, &pair.verifier)
            .await
    }

    /// Builds the authorization URL with all required query parameters.
    pub fn build_authorization_url(
        &self,
        redirect_uri: &str,
        code_challenge: &str,
        state: &str,
    ) -> Result<String> {
        let mut url = Url::parse(&self.config.authorize_url)
            .map_err(|e| SpottokenError::Config(format!("invalid authorization URL: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("response_type", "code");
            query.append_pair("redirect_uri", redirect_uri);
            query.append_pair("code_challenge_method", "S256");
            query.append_pair("code_challenge", code_challenge);
            query.append_pair("scope", &self.config.scope);
            query.append_pair("state", state);
        }

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for tokens at the token endpoint.
    ///
    /// Sends a form-encoded POST with `grant_type=authorization_code`.  When
    /// a client secret is configured the request carries an
    /// `Authorization: Basic` header; otherwise no credentials are sent.
    ///
    /// # Errors
    ///
    /// Returns [`SpottokenError::TokenExchange`] with the status code and raw
    /// body on any non-success response.  No retries.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse> {
        let mut params: HashMap<&str, &str> = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("redirect_uri", redirect_uri);
        params.insert("client_id", &self.config.client_id);
        params.insert("code_verifier", code_verifier);

        let mut request = self.http.post(&self.config.token_url).form(&params);

        // Confidential clients authenticate with Basic credentials; public
        // clients rely on PKCE alone.
        if let Some(ref secret) = self.config.client_secret {
            request = request.basic_auth(&self.config.client_id, Some(secret));
        }

        let resp = request.send().await.map_err(SpottokenError::Http)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SpottokenError::TokenExchange { status, body }.into());
        }

        let token: TokenResponse = resp.json().await.map_err(SpottokenError::Http)?;

        Ok(token)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_flow(config: AuthFlowConfig) -> AuthFlow {
        AuthFlow::new(Arc::new(reqwest::Client::new()), config)
    }

    // -----------------------------------------------------------------------
    // AuthFlowConfig
    // -----------------------------------------------------------------------

    #[test]
    fn test_config_defaults_point_at_spotify() {
        let config = AuthFlowConfig::new("client".to_string());
        assert_eq!(config.authorize_url, SPOTIFY_AUTH_URL);
        assert_eq!(config.token_url, SPOTIFY_TOKEN_URL);
        assert_eq!(config.redirect_port, DEFAULT_REDIRECT_PORT);
        assert!(config.client_secret.is_none());
    }

    // -----------------------------------------------------------------------
    // build_authorization_url
    // -----------------------------------------------------------------------

    #[test]
    fn test_build_authorization_url_contains_required_params() {
        let mut config = AuthFlowConfig::new("test_client".to_string());
        config.scope = "user-read-private".to_string();
        let flow = make_flow(config);

        let url = flow
            .build_authorization_url(
                "http://127.0.0.1:8888/callback",
                "test_challenge",
                "test_state",
            )
            .unwrap();

        assert!(
            url.contains("client_id=test_client"),
            "missing client_id: {url}"
        );
        assert!(
            url.contains("response_type=code"),
            "missing response_type: {url}"
        );
        assert!(url.contains("redirect_uri="), "missing redirect_uri: {url}");
        assert!(
            url.contains("code_challenge_method=S256"),
            "missing method: {url}"
        );
        assert!(
            url.contains("code_challenge=test_challenge"),
            "missing code_challenge: {url}"
        );
        assert!(
            url.contains("scope=user-read-private"),
            "missing scope: {url}"
        );
        assert!(url.contains("state=test_state"), "missing state: {url}");
    }

    #[test]
    fn test_build_authorization_url_percent_encodes_scope() {
        let mut config = AuthFlowConfig::new("c".to_string());
        config.scope = "user-read-private user-library-read".to_string();
        let flow = make_flow(config);

        let url = flow
            .build_authorization_url("http://127.0.0.1:8888/callback", "ch", "st")
            .unwrap();

        assert!(
            !url.contains("user-read-private user"),
            "spaces in scope must be encoded: {url}"
        );
    }

    #[test]
    fn test_build_authorization_url_rejects_invalid_endpoint() {
        let mut config = AuthFlowConfig::new("c".to_string());
        config.authorize_url = "not a url".to_string();
        let flow = make_flow(config);

        let err = flow
            .build_authorization_url("http://127.0.0.1:8888/callback", "ch", "st")
            .unwrap_err();
        assert!(
            err.to_string().contains("invalid authorization URL"),
            "unexpected error: {err}"
        );
    }

    // -----------------------------------------------------------------------
    // TokenResponse deserialization
    // -----------------------------------------------------------------------

    #[test]
    fn test_token_response_minimal_body_parses() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok","expires_in":3600}"#).unwrap();
        assert_eq!(token.access_token, "tok");
        assert_eq!(token.expires_in, Some(3600));
        assert!(token.refresh_token.is_none());
        assert!(token.token_type.is_none());
        assert!(token.scope.is_none());
    }

    #[test]
    fn test_token_response_full_body_parses() {
        let body = r#"{
            "access_token": "tok",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "refresh",
            "scope": "user-read-private"
        }"#;
        let token: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(token.scope.as_deref(), Some("user-read-private"));
    }
}
