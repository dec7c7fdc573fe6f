//! Best-effort system clipboard access
//!
//! Clipboard copies are a convenience, never a requirement: on headless
//! machines (no display server) `arboard` cannot connect and the copy is
//! skipped with a warning.  The flow keeps going either way because the
//! value has already been printed to the console.

use crate::error::{Result, SpottokenError};

/// Copies `text` to the system clipboard.
///
/// # Errors
///
/// Returns [`SpottokenError::Clipboard`] when the clipboard is unavailable
/// or the write fails.
pub fn copy(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| SpottokenError::Clipboard(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| SpottokenError::Clipboard(format!("clipboard write failed: {e}")))?;
    Ok(())
}

/// Copies `text` to the clipboard, logging instead of failing.
///
/// Returns `true` when the copy succeeded, so callers can decide whether to
/// print the "copied to clipboard" hint.  `label` names the value in the
/// warning (e.g. "authorization URL", "access token").
pub fn copy_best_effort(label: &str, text: &str) -> bool {
    match copy(text) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("could not copy {} to clipboard: {}", label, e);
            false
        }
    }
}
