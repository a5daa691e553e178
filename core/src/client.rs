//! Request runner: body resolution, status check, and response decoding.
//!
//! # Design
//! `FetchClient` holds only an optional `base_url` and carries no mutable
//! state between calls. `build_request` turns a `FetchRequest` into an
//! `HttpRequest` and `parse_response` turns an `HttpResponse` into a
//! `Decoded` value; neither touches the network. `fetch` runs the two around
//! a single `Transport::send`, which is the only suspension point of a call.

use serde::de::DeserializeOwned;

use crate::decode::ResponseBody;
use crate::error::FetchError;
use crate::form::{create_form_data, DataMap, Form, FormData};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::FetchOptions;
use crate::transport::Transport;
use crate::types::{Decoded, KindHint, ResponseKind};

/// Everything one fetch call needs.
///
/// A ready-built `form_data` is sent as-is; otherwise the body is built from
/// `form` and `data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchRequest {
    pub path: String,
    pub method: Option<HttpMethod>,
    pub form_data: Option<FormData>,
    pub form: Option<Form>,
    pub data: Option<DataMap>,
    pub data_type: Option<KindHint>,
}

impl FetchRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn form_data(mut self, form_data: FormData) -> Self {
        self.form_data = Some(form_data);
        self
    }

    pub fn form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }

    pub fn data(mut self, data: DataMap) -> Self {
        self.data = Some(data);
        self
    }

    pub fn data_type(mut self, data_type: impl Into<KindHint>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }
}

/// Stateless runner for form-bodied HTTP requests.
#[derive(Debug, Clone, Default)]
pub struct FetchClient {
    base_url: Option<String>,
}

impl FetchClient {
    /// Relative request paths are resolved against `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.trim_end_matches('/').to_string()),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Absolute URLs pass through untouched.
    pub fn resolve_path(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) if !path.contains("://") => {
                format!("{base}/{}", path.trim_start_matches('/'))
            }
            _ => path.to_string(),
        }
    }

    pub fn build_request(&self, request: FetchRequest) -> Result<HttpRequest, FetchError> {
        let method = request.method.unwrap_or_default();
        let body = match request.form_data {
            Some(form_data) => form_data,
            None => create_form_data(request.form.as_ref(), request.data.as_ref()),
        };
        let body = if method.allows_body() {
            Some(body)
        } else if body.is_empty() {
            None
        } else {
            return Err(FetchError::InvalidArgument(format!(
                "Request with {method} method cannot have body"
            )));
        };

        Ok(HttpRequest {
            method,
            path: self.resolve_path(&request.path),
            headers: Vec::new(),
            body,
        })
    }

    /// Checks the status first, so a non-2xx response is reported as
    /// `HttpError` even when the kind hint is not recognized.
    pub fn parse_response(
        &self,
        response: HttpResponse,
        kind: impl Into<KindHint>,
    ) -> Result<Decoded, FetchError> {
        check_status(&response)?;
        let kind = kind.into().resolve()?;
        ResponseBody::from(response).decode(kind)
    }

    pub async fn fetch<T>(&self, transport: &T, request: FetchRequest) -> Result<Decoded, FetchError>
    where
        T: Transport + ?Sized,
    {
        let kind = request.data_type.clone().unwrap_or_default();
        let request = self.build_request(request)?;
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            entries = request.body.as_ref().map_or(0, FormData::len),
            "sending request"
        );

        let response = transport.send(request).await?;
        tracing::debug!(status = response.status, kind = %kind, "received response");

        self.parse_response(response, kind)
    }

    /// Same as `fetch`, starting from the loosely typed options object.
    pub async fn fetch_options<T>(
        &self,
        transport: &T,
        options: FetchOptions,
    ) -> Result<Decoded, FetchError>
    where
        T: Transport + ?Sized,
    {
        let request = FetchRequest::try_from(options)?;
        self.fetch(transport, request).await
    }

    /// Fetches with the JSON kind forced and deserializes the result.
    pub async fn fetch_json<T, D>(&self, transport: &T, request: FetchRequest) -> Result<D, FetchError>
    where
        T: Transport + ?Sized,
        D: DeserializeOwned,
    {
        let value = match self
            .fetch(transport, request.data_type(ResponseKind::Json))
            .await?
        {
            Decoded::Json(value) => value,
            other => {
                return Err(FetchError::DecodeError(format!(
                    "expected json, decoded {}",
                    other.kind()
                )))
            }
        };
        serde_json::from_value(value).map_err(|e| FetchError::DecodeError(e.to_string()))
    }
}

fn check_status(response: &HttpResponse) -> Result<(), FetchError> {
    if response.ok() {
        return Ok(());
    }
    tracing::warn!(status = response.status, "request failed");
    Err(FetchError::HttpError {
        status: response.status,
    })
}
