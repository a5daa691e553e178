//! Form-bodied HTTP requests with automatic response decoding.
//!
//! # Overview
//! Two helpers: `create_form_data` assembles a multipart payload from a form
//! and/or a key/value mapping, and `FetchClient::fetch` sends a request with
//! that payload and decodes the response as JSON, binary, or text, either as
//! asked or by trial.
//!
//! # Design
//! - `FetchClient` is stateless; it builds `HttpRequest` values and parses
//!   `HttpResponse` values. The exchange itself goes through a `Transport`
//!   (host-does-IO), so request building and decoding test without a network.
//! - Argument shapes are typed. Runtime shape checks only exist on the
//!   JSON-facing `FetchOptions` path.
//! - Response bodies are single-shot (`ResponseBody`), and auto-detection is
//!   an explicit ordered list of attempts with tagged outcomes.

pub mod client;
pub mod decode;
pub mod error;
pub mod form;
pub mod http;
pub mod options;
pub mod transport;
pub mod types;

pub use client::{FetchClient, FetchRequest};
pub use decode::{DecodeAttempt, ResponseBody};
pub use error::FetchError;
pub use form::{create_form_data, DataMap, FilePart, Form, FormData, FormField, FormValue};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::FetchOptions;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use types::{Blob, Decoded, KindHint, ResponseKind};
