//! Error types for form building and fetch calls.
//!
//! # Design
//! One variant per failure class a caller can act on. `InvalidArgument` is
//! always raised before any I/O happens, `Transport` covers the exchange
//! itself, and everything after a response arrives is either `HttpError`
//! (non-2xx) or a decode failure.

use std::fmt;

/// Errors returned by `create_form_data` conversions and `FetchClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// A form, data mapping, method, or body did not have an acceptable shape.
    InvalidArgument(String),

    /// The underlying network call failed (DNS, refused connection, aborted).
    Transport(String),

    /// The exchange completed but the server returned a non-2xx status.
    HttpError { status: u16 },

    /// The response body could not be decoded under the requested or
    /// inferred kind, or the kind itself was not recognized.
    DecodeError(String),

    /// The response body was already taken by an earlier decode.
    BodyConsumed,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            FetchError::Transport(msg) => write!(f, "transport error: {msg}"),
            FetchError::HttpError { status } => write!(f, "HTTP ERROR: {status}"),
            FetchError::DecodeError(msg) => write!(f, "decode error: {msg}"),
            FetchError::BodyConsumed => write!(f, "response body already consumed"),
        }
    }
}

impl std::error::Error for FetchError {}
