//! Spottoken - Spotify access token CLI library
//!
//! This library implements a one-shot interactive OAuth 2.0 authorization
//! code flow with PKCE against Spotify's accounts service, for a human
//! operator running the `spottoken` binary.
//!
//! # Architecture
//!
//! - `auth::pkce`: PKCE verifier/challenge generation (RFC 7636 S256)
//! - `auth::listener`: single-shot loopback listener capturing the redirect
//! - `auth::flow`: authorization URL construction and the token exchange
//! - `commands`: the CLI command handler and console reporting
//! - `clipboard`: best-effort clipboard copies
//! - `cli`: command-line interface definition
//! - `error`: error types and result aliases

pub mod auth;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod error;

// Re-export commonly used types
pub use auth::{AuthFlow, AuthFlowConfig, AuthorizationResult, CallbackListener, TokenResponse};
pub use cli::Cli;
pub use error::{Result, SpottokenError};
