//! The network seam.
//!
//! `FetchClient` never performs I/O itself; a `Transport` takes the plain
//! `HttpRequest` it built and returns the plain `HttpResponse` it parses.
//! `ReqwestTransport` is the stock implementation; tests and hosts with
//! their own HTTP stack can supply another.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP exchange.
///
/// Implementations return `FetchError::Transport` when the exchange itself
/// fails. Non-2xx responses are returned as data, never as errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use async_trait::async_trait;
    use reqwest::multipart::{Form, Part};

    use super::Transport;
    use crate::error::FetchError;
    use crate::form::{FormData, FormValue};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// `Transport` backed by a `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
            let mut builder = self
                .client
                .request(to_reqwest_method(request.method), &request.path);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.multipart(to_multipart(body)?);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    let value = value.to_str().ok()?;
                    Some((name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    fn to_multipart(form_data: FormData) -> Result<Form, FetchError> {
        let mut form = Form::new();
        for (name, value) in form_data.into_entries() {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File(file) => {
                    let mut part = Part::bytes(file.bytes.to_vec());
                    if let Some(file_name) = file.file_name {
                        part = part.file_name(file_name);
                    }
                    if let Some(mime_type) = file.mime_type {
                        part = part.mime_str(&mime_type).map_err(|e| {
                            FetchError::InvalidArgument(format!(
                                "Invalid MIME type '{mime_type}': {e}"
                            ))
                        })?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }

}
