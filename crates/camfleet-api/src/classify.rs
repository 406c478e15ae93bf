// API error classification
//
// Pure mapping from a transport error to a user-facing display string.
// Lives next to the error type so every consumer (session guard, stores,
// CLI) surfaces failures with the same wording. Classification never
// mutates session state -- it only reads the error and logs it.

use tracing::error;

use crate::error::Error;

/// Fixed message for a network-layer failure where no response arrived.
const NETWORK_FAILED: &str = "Network connection failed; check your network settings";

/// Fixed message when the request was sent but the server never answered.
const SERVER_UNREACHABLE: &str = "Unable to reach the server; check your network connection";

/// Map an API failure to a user-facing message.
///
/// Precedence:
/// 1. network-layer failure (no response received) -- fixed connectivity message;
/// 2. response with a recognized status code -- fixed message per code.
///    401 maps to the **empty string**: expired sessions are handled by the
///    navigation/session guard pair, and a second prompt here would duplicate it;
/// 3. response with an unrecognized status code -- generic message with the code;
/// 4. anything else -- the caller-supplied `default` message.
///
/// The raw error is logged for diagnostics regardless of classification.
pub fn user_message(err: &Error, default: &str) -> String {
    error!(error = %err, "API error");

    match err {
        // Login rejections already carry the server's own wording.
        Error::Authentication { message } => message.clone(),

        Error::SessionExpired => String::new(),

        Error::Api { status, .. } => status_message(*status),

        Error::Transport(e) => {
            if e.is_connect() || e.is_timeout() {
                return NETWORK_FAILED.to_owned();
            }
            if let Some(status) = e.status() {
                return status_message(status.as_u16());
            }
            if e.is_request() {
                // The request went out but no response came back.
                return SERVER_UNREACHABLE.to_owned();
            }
            default.to_owned()
        }

        Error::InvalidUrl(_) | Error::Deserialization { .. } => default.to_owned(),
    }
}

/// Fixed per-status message table.
fn status_message(status: u16) -> String {
    match status {
        400 => "Invalid request parameters".to_owned(),
        // Handled by the navigation guard; empty to avoid a duplicate prompt.
        401 => String::new(),
        403 => "Access denied: insufficient permissions".to_owned(),
        404 => "The requested resource was not found".to_owned(),
        408 => "Request timed out; please try again later".to_owned(),
        409 => "Resource conflict".to_owned(),
        500 => "Internal server error".to_owned(),
        502 => "Bad gateway".to_owned(),
        503 => "Service temporarily unavailable".to_owned(),
        504 => "Gateway timeout".to_owned(),
        other => format!("Request failed (HTTP {other})"),
    }
}
