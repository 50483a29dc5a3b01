//! Internal error helpers for mapping HTTP/reqwest errors to [`TransportError`].

use olla_types::TransportError;

use crate::wire::WireError;

/// Map a non-200 HTTP status to a [`TransportError`].
///
/// The server usually explains itself with `{"error": "..."}`; that message is
/// kept as the body when present, otherwise the raw body is kept.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> TransportError {
    let body = serde_json::from_str::<WireError>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string());
    TransportError::Status {
        status: status.as_u16(),
        body,
    }
}

/// Map a [`reqwest::Error`] raised while sending a request.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(Box::new(err))
    } else {
        TransportError::Request(Box::new(err))
    }
}

/// Map a [`reqwest::Error`] raised while reading a response body.
pub(crate) fn map_body_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(Box::new(err))
    } else {
        TransportError::Read(Box::new(err))
    }
}
