//! Response body decoding.
//!
//! # Design
//! `ResponseBody` owns the body bytes until the first decode takes them;
//! any later decode fails with `FetchError::BodyConsumed`.
//!
//! Auto-detection runs an ordered list of attempts (JSON, binary, text) over
//! the same bytes. Each attempt reports `Decoded`, `Empty` (not applicable,
//! try the next one) or `Failed` (stop with that error). Only `Empty` falls
//! through.

use bytes::Bytes;
use serde_json::Value;

use crate::error::FetchError;
use crate::http::HttpResponse;
use crate::types::{Blob, Decoded, ResponseKind};

/// Outcome of one decode attempt during auto-detection.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeAttempt {
    Decoded(Decoded),
    Empty,
    Failed(FetchError),
}

type Attempt = fn(&Bytes, Option<&str>) -> DecodeAttempt;

const AUTO_ATTEMPTS: [(ResponseKind, Attempt); 3] = [
    (ResponseKind::Json, try_json),
    (ResponseKind::Blob, try_blob),
    (ResponseKind::Text, try_text),
];

/// A response body that can be decoded once.
#[derive(Debug)]
pub struct ResponseBody {
    bytes: Option<Bytes>,
    content_type: Option<String>,
}

impl ResponseBody {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            content_type,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.bytes.is_none()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn take(&mut self) -> Result<Bytes, FetchError> {
        self.bytes.take().ok_or(FetchError::BodyConsumed)
    }

    pub fn json(&mut self) -> Result<Value, FetchError> {
        let bytes = self.take()?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::DecodeError(e.to_string()))
    }

    pub fn blob(&mut self) -> Result<Blob, FetchError> {
        let bytes = self.take()?;
        Ok(Blob {
            bytes,
            mime_type: self.content_type.clone(),
        })
    }

    /// Invalid UTF-8 sequences are replaced, never rejected.
    pub fn text(&mut self) -> Result<String, FetchError> {
        let bytes = self.take()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Runs the auto-detection attempts in order and returns the first
    /// decoded value.
    pub fn auto(&mut self) -> Result<Decoded, FetchError> {
        let bytes = self.take()?;
        let content_type = self.content_type.as_deref();
        for (kind, attempt) in AUTO_ATTEMPTS {
            match attempt(&bytes, content_type) {
                DecodeAttempt::Decoded(decoded) => {
                    tracing::debug!(kind = %kind, "detected response kind");
                    return Ok(decoded);
                }
                DecodeAttempt::Empty => continue,
                DecodeAttempt::Failed(err) => return Err(err),
            }
        }
        Err(FetchError::DecodeError(
            "Failed to detect data type".to_string(),
        ))
    }

    pub fn decode(&mut self, kind: ResponseKind) -> Result<Decoded, FetchError> {
        match kind {
            ResponseKind::Auto => self.auto(),
            ResponseKind::Json => self.json().map(Decoded::Json),
            ResponseKind::Blob => self.blob().map(Decoded::Blob),
            ResponseKind::Text => self.text().map(Decoded::Text),
        }
    }
}

impl From<HttpResponse> for ResponseBody {
    fn from(response: HttpResponse) -> Self {
        let content_type = response.content_type().map(str::to_string);
        Self::new(response.body, content_type)
    }
}

fn try_json(bytes: &Bytes, content_type: Option<&str>) -> DecodeAttempt {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return DecodeAttempt::Empty;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => DecodeAttempt::Decoded(Decoded::Json(value)),
        Err(e) if content_type.is_some_and(is_json_type) => {
            DecodeAttempt::Failed(FetchError::DecodeError(e.to_string()))
        }
        Err(_) => DecodeAttempt::Empty,
    }
}

fn try_blob(bytes: &Bytes, content_type: Option<&str>) -> DecodeAttempt {
    if bytes.is_empty() {
        return DecodeAttempt::Empty;
    }
    let binary = std::str::from_utf8(bytes).is_err()
        || content_type.is_some_and(|ct| !is_textual_type(ct));
    if binary {
        DecodeAttempt::Decoded(Decoded::Blob(Blob {
            bytes: bytes.clone(),
            mime_type: content_type.map(str::to_string),
        }))
    } else {
        DecodeAttempt::Empty
    }
}

fn try_text(bytes: &Bytes, _content_type: Option<&str>) -> DecodeAttempt {
    if bytes.is_empty() {
        return DecodeAttempt::Empty;
    }
    DecodeAttempt::Decoded(Decoded::Text(String::from_utf8_lossy(bytes).into_owned()))
}

/// Media type without parameters, lowercased.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json_type(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == "application/json" || essence.ends_with("+json")
}

fn is_textual_type(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence.starts_with("text/")
        || essence.ends_with("+xml")
        || is_json_type(&essence)
        || matches!(
            essence.as_str(),
            "application/xml" | "application/javascript" | "application/x-www-form-urlencoded"
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(bytes: &'static [u8], content_type: Option<&str>) -> ResponseBody {
        ResponseBody::new(bytes, content_type.map(str::to_string))
    }

    #[test]
    fn json_kind_decodes_object() {
        let mut body = body(br#"{"x":1}"#, Some("application/json"));
        let decoded = body.decode(ResponseKind::Json).unwrap();
        assert_eq!(decoded, Decoded::Json(json!({"x": 1})));
    }

    #[test]
    fn json_kind_fails_on_text() {
        let mut body = body(b"hello", Some("text/plain"));
        let err = body.decode(ResponseKind::Json).unwrap_err();
        assert!(matches!(err, FetchError::DecodeError(_)));
    }

    #[test]
    fn second_decode_reports_consumed_body() {
        let mut body = body(b"hello", None);
        body.text().unwrap();
        assert!(body.is_consumed());
        assert_eq!(body.json().unwrap_err(), FetchError::BodyConsumed);
        assert_eq!(body.auto().unwrap_err(), FetchError::BodyConsumed);
    }

    #[test]
    fn auto_prefers_json() {
        let mut body = body(b"[1,2]", Some("text/plain"));
        assert_eq!(body.auto().unwrap(), Decoded::Json(json!([1, 2])));
    }

    #[test]
    fn auto_falls_back_to_text() {
        let mut body = body(b"hello world", Some("text/plain; charset=utf-8"));
        assert_eq!(body.auto().unwrap(), Decoded::Text("hello world".to_string()));
    }

    #[test]
    fn auto_picks_blob_for_invalid_utf8() {
        let mut body = body(b"\xff\x00\xfe", None);
        let decoded = body.auto().unwrap();
        assert_eq!(decoded.as_blob().map(Blob::len), Some(3));
    }

    #[test]
    fn auto_picks_blob_for_binary_content_type() {
        let mut body = body(b"PK", Some("application/octet-stream"));
        let blob = body.auto().unwrap();
        assert_eq!(
            blob.as_blob().and_then(|b| b.mime_type.as_deref()),
            Some("application/octet-stream")
        );
    }

    #[test]
    fn auto_fails_on_empty_body() {
        let mut body = body(b"", None);
        let err = body.auto().unwrap_err();
        assert_eq!(
            err,
            FetchError::DecodeError("Failed to detect data type".to_string())
        );
    }

    #[test]
    fn auto_stops_on_malformed_declared_json() {
        let mut body = body(br#"{"x":"#, Some("application/problem+json"));
        let err = body.auto().unwrap_err();
        assert!(matches!(err, FetchError::DecodeError(ref msg) if msg != "Failed to detect data type"));
    }

    #[test]
    fn text_replaces_invalid_utf8() {
        let mut body = body(b"a\xffb", None);
        assert_eq!(body.text().unwrap(), "a\u{fffd}b");
    }

    #[test]
    fn attempts_report_empty_when_not_applicable() {
        let text = Bytes::from_static(b"plain");
        assert_eq!(try_json(&text, Some("text/plain")), DecodeAttempt::Empty);
        assert_eq!(try_blob(&text, Some("text/plain")), DecodeAttempt::Empty);
        assert_eq!(try_text(&Bytes::new(), None), DecodeAttempt::Empty);
    }

    #[test]
    fn content_type_classification() {
        assert!(is_json_type("Application/JSON; charset=utf-8"));
        assert!(is_json_type("application/vnd.api+json"));
        assert!(is_textual_type("text/html"));
        assert!(is_textual_type("image/svg+xml"));
        assert!(!is_textual_type("image/png"));
    }
}
