//! OAuth 2.0 authorization code + PKCE flow
//!
//! Submodules:
//!
//! - [`pkce`]: verifier/challenge generation (RFC 7636 S256)
//! - [`listener`]: single-shot loopback listener for the redirect callback
//! - [`flow`]: the orchestrated authorization attempt and token exchange

pub mod flow;
pub mod listener;
pub mod pkce;

pub use flow::{AuthFlow, AuthFlowConfig, TokenResponse};
pub use listener::{AuthorizationResult, CallbackListener};
