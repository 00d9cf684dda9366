//! Shared utilities for the StayMate client crates.
//!
//! - **`persist`**: crash-safe file persistence (temp + rename), owner-only
//!   mode for the credential file
//! - **`redact`**: removal of bearer tokens and JWTs from text bound for logs
//! - **`terminal`**: escape-sequence stripping for server-supplied text

pub mod persist;
pub mod redact;
pub mod terminal;

pub use persist::{persist_secret_file, recover_bak_file};
pub use redact::redact_credentials;
pub use terminal::sanitize_terminal_text;

/// Redact credentials, then strip terminal controls. For untrusted text that
/// is about to be printed.
#[must_use]
pub fn sanitize_display_text(input: &str) -> String {
    let redacted = redact_credentials(input);
    sanitize_terminal_text(&redacted).into_owned()
}
