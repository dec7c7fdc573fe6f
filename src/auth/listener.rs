//! Single-shot local HTTP listener for the authorization redirect
//!
//! The OAuth authorization server redirects the operator's browser to
//! `http://127.0.0.1:<port>/callback` once the operator approves or denies
//! the request.  [`CallbackListener`] binds that loopback address, accepts
//! exactly one connection, answers it with a small human-readable page, and
//! hands the captured [`AuthorizationResult`] back to the flow.
//!
//! The listener state machine is `Listening -> Captured -> Stopped`:
//! [`CallbackListener::recv`] consumes `self`, so the socket is closed as
//! soon as the single request has been served and a second request can
//! never be accepted.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};

use crate::error::{Result, SpottokenError};

/// HTML page shown in the browser after a successful authorization.
const SUCCESS_PAGE: &str = "<html><h1>Authorization Successful</h1>\
<p>You can close this window and return to your terminal.</p></html>";

/// Plain-text body shown in the browser after a denied authorization.
const FAILURE_PAGE: &str = "Authorization failed.";

// ---------------------------------------------------------------------------
// AuthorizationResult
// ---------------------------------------------------------------------------

/// Outcome of one authorization redirect, captured exactly once per run.
///
/// Returned by [`CallbackListener::recv`] and consumed exactly once by the
/// authorization flow.  There is no shared mutable state between the
/// listener and the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    /// The operator approved the request; the redirect carried a code.
    Granted {
        /// The authorization code to exchange at the token endpoint.
        code: String,
        /// The `state` parameter echoed back by the authorization server,
        /// if present.  Compared against the value originally sent.
        state: Option<String>,
    },

    /// The operator denied the request or the server reported an error.
    Denied {
        /// The `error` parameter from the redirect (e.g. `access_denied`).
        error: String,
    },
}

// ---------------------------------------------------------------------------
// CallbackListener
// ---------------------------------------------------------------------------

/// A single-use HTTP listener bound to the loopback redirect address.
///
/// # Examples
///
/// ```no_run
/// use spottoken::auth::listener::CallbackListener;
///
/// # async fn example() -> spottoken::error::Result<()> {
/// let listener = CallbackListener::bind(8888).await?;
/// println!("waiting on {}", listener.redirect_uri());
/// let result = listener.recv().await?;
/// # let _ = result;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CallbackListener {
    listener: tokio::net::TcpListener,
    port: u16,
}

impl CallbackListener {
    /// Binds the listener to `127.0.0.1:<port>`.
    ///
    /// Pass `0` to let the OS assign a free port (used by tests).  The port
    /// must match the redirect URI registered with the authorization server,
    /// so production callers use the fixed default.
    ///
    /// # Errors
    ///
    /// Returns [`SpottokenError::Listener`] when the port is already bound
    /// or otherwise cannot be opened.  This is fatal for the run.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| {
                SpottokenError::Listener(format!("failed to bind 127.0.0.1:{port}: {e}"))
            })?;
        let port = listener
            .local_addr()
            .map_err(|e| SpottokenError::Listener(format!("failed to get local address: {e}")))?
            .port();

        tracing::debug!("callback listener bound on 127.0.0.1:{}", port);
        Ok(Self { listener, port })
    }

    /// The port the listener is actually bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The redirect URI the authorization server must send the browser to.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.port)
    }

    /// Accepts exactly one connection, parses the redirect query string,
    /// answers the browser, and returns the captured result.
    ///
    /// Consumes `self`: once the single request has been served the socket
    /// is dropped and the listener stops.
    ///
    /// # Errors
    ///
    /// Returns [`SpottokenError::Listener`] on accept/IO failures and
    /// [`SpottokenError::Authorization`] when the callback carries neither
    /// a `code` nor an `error` parameter.
    pub async fn recv(self) -> Result<AuthorizationResult> {
        let (stream, peer) = self.listener.accept().await.map_err(|e| {
            SpottokenError::Listener(format!("failed to accept callback connection: {e}"))
        })?;
        tracing::debug!("callback connection accepted from {}", peer);

        // Move to a blocking task so we can use std I/O for simple HTTP
        // request parsing without pulling in a full HTTP server.
        tokio::task::spawn_blocking(move || -> Result<AuthorizationResult> {
            let std_stream = stream
                .into_std()
                .map_err(|e| SpottokenError::Listener(format!("stream conversion failed: {e}")))?;
            std_stream
                .set_nonblocking(false)
                .map_err(|e| SpottokenError::Listener(format!("stream mode change failed: {e}")))?;

            let mut write_stream = std_stream
                .try_clone()
                .map_err(|e| SpottokenError::Listener(format!("stream clone failed: {e}")))?;

            let reader = BufReader::new(std_stream);
            let mut request_line = String::new();

            for line in reader.lines() {
                let line = line.map_err(|e| {
                    SpottokenError::Listener(format!("failed to read callback request: {e}"))
                })?;
                // HTTP headers end at the first empty line.
                if line.is_empty() {
                    break;
                }
                if request_line.is_empty() {
                    request_line = line;
                }
            }

            // Request line looks like "GET /callback?code=...&state=... HTTP/1.1".
            let path = request_line.split_whitespace().nth(1).unwrap_or("/");
            let query_string = path.split_once('?').map(|x| x.1).unwrap_or("");
            let params = parse_query(query_string);

            let result = if let Some(code) = params.get("code") {
                respond(&mut write_stream, "200 OK", "text/html", SUCCESS_PAGE);
                Ok(AuthorizationResult::Granted {
                    code: code.clone(),
                    state: params.get("state").cloned(),
                })
            } else if let Some(error) = params.get("error") {
                respond(&mut write_stream, "400 Bad Request", "text/plain", FAILURE_PAGE);
                Ok(AuthorizationResult::Denied {
                    error: error.clone(),
                })
            } else {
                respond(&mut write_stream, "400 Bad Request", "text/plain", FAILURE_PAGE);
                Err(SpottokenError::Authorization(
                    "callback carried neither code nor error".to_string(),
                )
                .into())
            };

            result
        })
        .await
        .map_err(|e| SpottokenError::Listener(format!("callback task panicked: {e}")))?
    }
}

/// Writes a minimal HTTP/1.1 response and closes the connection.
///
/// Write errors are ignored; the browser side of the exchange is purely
/// cosmetic and the captured result has already been decided.
fn respond(stream: &mut std::net::TcpStream, status: &str, content_type: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

// ---------------------------------------------------------------------------
// Query string parsing
// ---------------------------------------------------------------------------

/// Parses a URL query string into a key-value map.
///
/// Values are percent-decoded.  Duplicate keys are overwritten by the last
/// occurrence.
pub(crate) fn parse_query(query: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for pair in query.split('&') {
        let mut iter = pair.splitn(2, '=');
        let key = iter.next().unwrap_or("").to_string();
        let value = iter.next().unwrap_or("");
        if !key.is_empty() {
            map.insert(key, decode_component(value));
        }
    }
    map
}

/// Performs minimal percent-decoding of a URL query parameter value.
///
/// Converts `+` to space and `%XX` sequences to the corresponding byte.
/// Decoding happens at the byte level so multi-byte UTF-8 sequences
/// (e.g. `%C3%A9`) survive; invalid sequences are replaced rather than
/// mangled.
fn decode_component(s: &str) -> String {
    let mut out = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'+' {
            out.push(b' ');
            i += 1;
        } else if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
            out.push(bytes[i]);
            i += 1;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_query
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_query_with_code_and_state() {
        let map = parse_query("code=abc123&state=xyz789");
        assert_eq!(map.get("code"), Some(&"abc123".to_string()));
        assert_eq!(map.get("state"), Some(&"xyz789".to_string()));
    }

    #[test]
    fn test_parse_query_empty_returns_empty_map() {
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn test_parse_query_single_param() {
        let map = parse_query("error=access_denied");
        assert_eq!(map.get("error"), Some(&"access_denied".to_string()));
    }

    #[test]
    fn test_parse_query_decodes_plus_as_space() {
        let map = parse_query("scope=user-read-private+user-library-read");
        assert_eq!(
            map.get("scope"),
            Some(&"user-read-private user-library-read".to_string())
        );
    }

    #[test]
    fn test_parse_query_decodes_percent_encoding() {
        let map = parse_query("state=a%20b");
        assert_eq!(map.get("state"), Some(&"a b".to_string()));
    }

    #[test]
    fn test_parse_query_last_duplicate_wins() {
        let map = parse_query("code=first&code=second");
        assert_eq!(map.get("code"), Some(&"second".to_string()));
    }

    // -----------------------------------------------------------------------
    // decode_component
    // -----------------------------------------------------------------------

    #[test]
    fn test_decode_component_plain_string_unchanged() {
        assert_eq!(decode_component("hello"), "hello");
    }

    #[test]
    fn test_decode_component_hex_sequence() {
        assert_eq!(decode_component("a%2Fb"), "a/b");
    }

    #[test]
    fn test_decode_component_incomplete_percent_passes_through() {
        // A lone '%' without two hex digits should pass through safely.
        let result = decode_component("%z");
        assert!(!result.is_empty());
    }

    #[test]
    fn test_decode_component_multibyte_utf8_sequence() {
        // %C3%A9 is the UTF-8 encoding of 'é'; the two bytes must be
        // reassembled, not decoded to two separate chars.
        assert_eq!(decode_component("caf%C3%A9"), "café");
    }

    // -----------------------------------------------------------------------
    // bind()
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_bind_ephemeral_port_reports_redirect_uri() {
        let listener = CallbackListener::bind(0).await.expect("bind must succeed");
        let port = listener.port();
        assert_ne!(port, 0, "OS must assign a concrete port");
        assert_eq!(
            listener.redirect_uri(),
            format!("http://127.0.0.1:{port}/callback")
        );
    }

    #[tokio::test]
    async fn test_listener_is_debug() {
        // Result combinators like unwrap_err need the Ok type to be Debug.
        let listener = CallbackListener::bind(0).await.expect("bind must succeed");
        let repr = format!("{listener:?}");
        assert!(repr.contains("CallbackListener"), "unexpected repr: {repr}");
    }

    #[tokio::test]
    async fn test_bind_same_port_twice_fails() {
        let first = CallbackListener::bind(0).await.expect("first bind");
        let port = first.port();

        let second = CallbackListener::bind(port).await;
        assert!(second.is_err(), "second bind on the same port must fail");
        let msg = second.unwrap_err().to_string();
        assert!(
            msg.contains(&format!("{port}")),
            "error should name the port: {msg}"
        );
    }
}
