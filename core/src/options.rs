//! Loosely typed request options.
//!
//! `FetchOptions` mirrors the `{ path, method, formData, form, data, dataType }`
//! options object callers pass around as JSON. Converting it into a
//! `FetchRequest` is where runtime shape checks happen. Falsy values
//! (`null`, `false`, `0`, `""`) count as not given. A `dataType` name that
//! is not recognized is carried along and only fails at decode time.

use serde::Deserialize;
use serde_json::Value;

use crate::client::FetchRequest;
use crate::error::FetchError;
use crate::form::{is_absent, DataMap, Form, FormData};
use crate::types::KindHint;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOptions {
    pub path: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub form_data: Option<Value>,
    #[serde(default)]
    pub form: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub data_type: Option<String>,
}

impl FetchOptions {
    pub fn from_json(value: Value) -> Result<Self, FetchError> {
        serde_json::from_value(value).map_err(|e| FetchError::InvalidArgument(e.to_string()))
    }
}

impl TryFrom<FetchOptions> for FetchRequest {
    type Error = FetchError;

    fn try_from(options: FetchOptions) -> Result<Self, Self::Error> {
        let mut request = FetchRequest::new(options.path);
        if let Some(method) = options.method.filter(|m| !m.is_empty()) {
            request = request.method(method.parse()?);
        }
        if let Some(form_data) = options.form_data.filter(|v| !is_absent(v)) {
            request = request.form_data(FormData::try_from(form_data)?);
        }
        if let Some(form) = options.form.filter(|v| !is_absent(v)) {
            request = request.form(Form::try_from(form)?);
        }
        if let Some(data) = options.data.filter(|v| !is_absent(v)) {
            request = request.data(DataMap::try_from(data)?);
        }
        if let Some(data_type) = options.data_type.filter(|k| !k.is_empty()) {
            request = request.data_type(KindHint::from_name(&data_type));
        }
        Ok(request)
    }
}
