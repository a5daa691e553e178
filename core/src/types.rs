//! Response kinds and decoded values.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde_json::Value;

use crate::error::FetchError;

/// How a response body should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Try JSON, then binary, then text.
    #[default]
    Auto,
    Json,
    Blob,
    Text,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Auto => "auto",
            ResponseKind::Json => "json",
            ResponseKind::Blob => "blob",
            ResponseKind::Text => "text",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ResponseKind::Auto),
            "json" => Ok(ResponseKind::Json),
            "blob" => Ok(ResponseKind::Blob),
            "text" => Ok(ResponseKind::Text),
            other => Err(FetchError::DecodeError(format!(
                "Data type {other} couldn't be decoded"
            ))),
        }
    }
}

/// The requested kind as given by the caller.
///
/// Names that do not match a `ResponseKind` are kept as-is and only fail
/// once the response is decoded, after the exchange and status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindHint {
    Known(ResponseKind),
    Unknown(String),
}

impl KindHint {
    pub fn from_name(name: &str) -> Self {
        match name.parse() {
            Ok(kind) => KindHint::Known(kind),
            Err(_) => KindHint::Unknown(name.to_string()),
        }
    }

    pub fn resolve(&self) -> Result<ResponseKind, FetchError> {
        match self {
            KindHint::Known(kind) => Ok(*kind),
            KindHint::Unknown(name) => name.parse(),
        }
    }
}

impl Default for KindHint {
    fn default() -> Self {
        KindHint::Known(ResponseKind::Auto)
    }
}

impl From<ResponseKind> for KindHint {
    fn from(kind: ResponseKind) -> Self {
        KindHint::Known(kind)
    }
}

impl fmt::Display for KindHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindHint::Known(kind) => f.write_str(kind.as_str()),
            KindHint::Unknown(name) => f.write_str(name),
        }
    }
}

/// Raw response bytes together with the declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    pub mime_type: Option<String>,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Json(Value),
    Blob(Blob),
    Text(String),
}

impl Decoded {
    /// The kind this value was decoded as.
    pub fn kind(&self) -> ResponseKind {
        match self {
            Decoded::Json(_) => ResponseKind::Json,
            Decoded::Blob(_) => ResponseKind::Blob,
            Decoded::Text(_) => ResponseKind::Text,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Decoded::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Decoded::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Decoded::Blob(blob) => Some(blob),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_parse() {
        for kind in [
            ResponseKind::Auto,
            ResponseKind::Json,
            ResponseKind::Blob,
            ResponseKind::Text,
        ] {
            assert_eq!(kind.as_str().parse::<ResponseKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_names_itself_in_error() {
        let err = "bogus".parse::<ResponseKind>().unwrap_err();
        assert!(matches!(err, FetchError::DecodeError(ref msg) if msg.contains("bogus")));
    }

    #[test]
    fn unknown_hint_fails_only_when_resolved() {
        let hint = KindHint::from_name("bogus");
        assert_eq!(hint, KindHint::Unknown("bogus".to_string()));
        assert_eq!(hint.to_string(), "bogus");
        let err = hint.resolve().unwrap_err();
        assert!(matches!(err, FetchError::DecodeError(ref msg) if msg.contains("bogus")));
    }

    #[test]
    fn known_hint_resolves() {
        assert_eq!(KindHint::from_name("blob").resolve().unwrap(), ResponseKind::Blob);
        assert_eq!(KindHint::default().resolve().unwrap(), ResponseKind::Auto);
    }

    #[test]
    fn decoded_reports_its_kind() {
        assert_eq!(Decoded::Text("a".to_string()).kind(), ResponseKind::Text);
        assert_eq!(Decoded::Json(Value::Null).kind(), ResponseKind::Json);
    }
}
