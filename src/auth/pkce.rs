//! PKCE S256 verifier and challenge generation
//!
//! This module implements the Proof Key for Code Exchange (PKCE) extension
//! to OAuth 2.0 as defined in RFC 7636, specifically the `S256` challenge
//! method required by Spotify's authorization code flow.
//!
//! # How PKCE works
//!
//! 1. The client generates a high-entropy random string called the `code_verifier`.
//! 2. The client computes a SHA-256 hash of the verifier and base64url-encodes
//!    it to produce the `code_challenge`.
//! 3. The authorization request includes `code_challenge` and
//!    `code_challenge_method=S256`.
//! 4. The token exchange request includes the original `code_verifier`.
//! 5. The authorization server recomputes the challenge and compares it to
//!    the value sent in step 3, proving possession of the verifier.
//!
//! # References
//!
//! - RFC 7636 <https://www.rfc-editor.org/rfc/rfc7636>

use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Number of random bytes drawn for the code verifier.
///
/// 64 bytes encode to 86 base64url characters, comfortably inside the
/// 43–128 character range RFC 7636 section 4.1 permits.
const VERIFIER_BYTES: usize = 64;

// ---------------------------------------------------------------------------
// PkcePair
// ---------------------------------------------------------------------------

/// A PKCE S256 pair consisting of a verifier and its derived challenge.
///
/// Created by [`generate`] and consumed by the authorization flow in
/// `src/auth/flow.rs`. The verifier must never leave the process except in
/// the final token exchange request body.
///
/// # Examples
///
/// ```
/// use spottoken::auth::pkce::generate;
///
/// let pair = generate().expect("PKCE generation must not fail");
/// assert_eq!(pair.method, "S256");
/// assert_eq!(pair.verifier.len(), 86);
/// ```
#[derive(Debug, Clone)]
pub struct PkcePair {
    /// The code verifier: a base64url-encoded (no padding) random string of
    /// exactly 86 characters derived from 64 random bytes.
    ///
    /// Sent to the token endpoint in the `code_verifier` parameter during
    /// the authorization code exchange.
    pub verifier: String,

    /// The code challenge: the base64url-encoded (no padding) SHA-256 digest
    /// of the UTF-8 representation of [`Self::verifier`].
    ///
    /// Sent to the authorization endpoint in the `code_challenge` parameter.
    pub challenge: String,

    /// The challenge method.  Always `"S256"` for pairs produced by this
    /// module.
    pub method: String,
}

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Generates a fresh PKCE S256 pair.
///
/// The verifier is 64 cryptographically random bytes encoded as a base64url
/// string without padding (86 characters).  The challenge is derived with
/// [`derive_challenge`] as specified in RFC 7636 section 4.2.
///
/// # Returns
///
/// A [`PkcePair`] containing `verifier`, `challenge`, and `method`.
///
/// # Errors
///
/// This function is infallible in practice; it returns a `Result` so that
/// callers can use `?` uniformly.  An error would only occur if the OS
/// random number generator failed, which does not happen on supported
/// platforms.
///
/// # Examples
///
/// ```
/// use spottoken::auth::pkce::generate;
///
/// let pair = generate().unwrap();
///
/// // Verifier is exactly 86 base64url characters (64 bytes * 4/3 rounded).
/// assert_eq!(pair.verifier.len(), 86);
///
/// // Verifier and challenge are distinct strings.
/// assert_ne!(pair.verifier, pair.challenge);
/// ```
pub fn generate() -> Result<PkcePair> {
    use rand::RngCore as _;

    // Step 1: 64 cryptographically random bytes.
    let mut random_bytes = [0u8; VERIFIER_BYTES];
    rand::rng().fill_bytes(&mut random_bytes);

    // Step 2: base64url-encode (no padding) to produce the verifier.
    let verifier = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes);

    // Step 3: derive the challenge from the verifier string.
    let challenge = derive_challenge(&verifier);

    Ok(PkcePair {
        verifier,
        challenge,
        method: "S256".to_string(),
    })
}

/// Derives the S256 code challenge for a verifier string.
///
/// Computes `BASE64URL-ENCODE(SHA256(ASCII(code_verifier)))` with padding
/// stripped, per RFC 7636 section 4.2.  Deterministic: the same verifier
/// always produces the same challenge.
///
/// # Examples
///
/// ```
/// use spottoken::auth::pkce::derive_challenge;
///
/// // RFC 7636 Appendix B test vector.
/// let challenge = derive_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
/// assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
/// ```
pub fn derive_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest.as_slice())
}

/// Generates a cryptographically random state token.
///
/// 16 random bytes encoded as base64url without padding.  The state binds
/// one authorization attempt to its redirect callback and is compared
/// against the value the authorization server echoes back.
pub fn generate_state() -> Result<String> {
    use rand::RngCore as _;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
