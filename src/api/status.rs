//! Error discrimination for bodies and stream lines.
//!
//! An error envelope embedded in the body wins over the transport status, so
//! a failure reported inside a 200 response is still a failure. A failing
//! status with no embedded code is turned into an envelope carrying that
//! status and whatever message the body had.

use reqwest::StatusCode;

use crate::error::{ErrorResponse, Result};

/// Decide between success and failure for an already decoded envelope.
pub fn discriminate(status: StatusCode, envelope: ErrorResponse) -> std::result::Result<(), ErrorResponse> {
    if envelope.is_failure() {
        return Err(envelope);
    }

    if status.as_u16() >= 400 {
        return Err(ErrorResponse::new(i32::from(status.as_u16()), envelope.message));
    }

    Ok(())
}

/// A body with nothing but whitespace carries no document
pub fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Check a raw body or stream line against the transport status.
///
/// An empty body decodes as an empty envelope. Anything else that is not a
/// JSON object is a decode failure, reported ahead of the status check.
pub fn check(status: StatusCode, body: &[u8]) -> Result<()> {
    let envelope = if is_blank(body) {
        ErrorResponse::default()
    } else {
        serde_json::from_slice(body)?
    };

    if envelope.is_failure() || status.as_u16() >= 400 {
        tracing::debug!(status = status.as_u16(), code = envelope.code, "server reported failure");
    }

    discriminate(status, envelope)?;
    Ok(())
}
