//! Multipart payload assembly.
//!
//! # Design
//! `FormData` is an ordered multiset of named entries, the same model a
//! browser form submission uses. `create_form_data` seeds it from a `Form`
//! (the fields of a form element, in document order) and then appends every
//! entry of a `DataMap`. Both sources are typed, so the only runtime shape
//! checks live in the `TryFrom<serde_json::Value>` conversions used by the
//! dynamic options entry point.

use bytes::Bytes;
use serde_json::Value;

use crate::error::FetchError;

/// Binary content attached to a form entry, e.g. a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl FilePart {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// The value of a single form entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File(_) => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        FormValue::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        FormValue::Text(text)
    }
}

impl From<FilePart> for FormValue {
    fn from(part: FilePart) -> Self {
        FormValue::File(part)
    }
}

/// A named control inside a `Form`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
    pub disabled: bool,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
            disabled: false,
        }
    }

    pub fn file(name: impl Into<String>, part: FilePart) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File(part),
            disabled: false,
        }
    }

    /// Disabled controls are not submitted.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// The field controls of a form element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<FormField>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(FormField::text(name, value))
    }

    pub fn file(self, name: impl Into<String>, part: FilePart) -> Self {
        self.push(FormField::file(name, part))
    }

    pub fn push(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Entries this form contributes to a submission: enabled fields that
    /// carry a name.
    fn submittable(&self) -> impl Iterator<Item = &FormField> {
        self.fields
            .iter()
            .filter(|field| !field.disabled && !field.name.is_empty())
    }
}

impl TryFrom<Value> for Form {
    type Error = FetchError;

    /// Accepts an object (one text field per entry) or an array of
    /// `{"name": .., "value": .., "disabled"?: bool}` objects.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            value if is_absent(&value) => Ok(Form::new()),
            Value::Object(map) => Ok(map.into_iter().fold(Form::new(), |form, (name, value)| {
                form.field(name, scalar_to_text(&value))
            })),
            Value::Array(items) => {
                items
                    .into_iter()
                    .try_fold(Form::new(), |form, item| -> Result<Form, FetchError> {
                        let field = field_from_json(item).ok_or_else(invalid_form)?;
                        Ok(form.push(field))
                    })
            }
            _ => Err(invalid_form()),
        }
    }
}

fn field_from_json(item: Value) -> Option<FormField> {
    let Value::Object(map) = item else {
        return None;
    };
    let name = map.get("name")?.as_str()?;
    let value = map.get("value").map(scalar_to_text).unwrap_or_default();
    let field = FormField::text(name, value);
    match map.get("disabled") {
        Some(Value::Bool(true)) => Some(field.disabled()),
        Some(Value::Bool(false)) | None => Some(field),
        Some(_) => None,
    }
}

fn invalid_form() -> FetchError {
    FetchError::InvalidArgument("Invalid data type for form".to_string())
}

/// An insertion-ordered key/value mapping appended after the form entries.
///
/// Keys are unique: inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataMap {
    entries: Vec<(String, String)>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = DataMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl TryFrom<Value> for DataMap {
    type Error = FetchError;

    /// Objects keep their key order; arrays use each index as the key.
    /// Both already have unique keys, so entries are pushed directly.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let entries = match value {
            value if is_absent(&value) => Vec::new(),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), scalar_to_text(value)))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), scalar_to_text(value)))
                .collect(),
            _ => {
                return Err(FetchError::InvalidArgument(
                    "Invalid data type for data".to_string(),
                ))
            }
        };
        Ok(DataMap { entries })
    }
}

/// `null`, `false`, `0` and `""` stand for a source that was not given.
pub(crate) fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Text form of a JSON value as it is sent in a form entry.
fn scalar_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// A multipart payload: ordered, duplicate names allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry after the existing ones. Never replaces.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn get_all(&self, name: &str) -> Vec<&FormValue> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn entries(&self) -> &[(String, FormValue)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, FormValue)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Value> for FormData {
    type Error = FetchError;

    /// Accepts an object (one entry per key) or a list of `[name, value]`
    /// pairs, which may repeat a name.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut form_data = FormData::new();
        match value {
            value if is_absent(&value) => {}
            Value::Object(map) => {
                for (name, value) in map {
                    form_data.append(name, scalar_to_text(&value));
                }
            }
            Value::Array(items) => {
                for item in items {
                    let (name, value) = pair_from_json(&item).ok_or_else(invalid_form_data)?;
                    form_data.append(name, value);
                }
            }
            _ => return Err(invalid_form_data()),
        }
        Ok(form_data)
    }
}

fn pair_from_json(item: &Value) -> Option<(String, String)> {
    match item.as_array()?.as_slice() {
        [Value::String(name), value] => Some((name.clone(), scalar_to_text(value))),
        _ => None,
    }
}

fn invalid_form_data() -> FetchError {
    FetchError::InvalidArgument("Invalid data type for formData".to_string())
}

impl From<&Form> for FormData {
    fn from(form: &Form) -> Self {
        let mut form_data = FormData::new();
        for field in form.submittable() {
            form_data.append(field.name.clone(), field.value.clone());
        }
        form_data
    }
}

/// Builds a payload from the form's entries followed by the mapping's.
///
/// With neither source the payload is empty.
pub fn create_form_data(form: Option<&Form>, data: Option<&DataMap>) -> FormData {
    let mut form_data = form.map(FormData::from).unwrap_or_default();
    if let Some(data) = data {
        for (key, value) in data.iter() {
            form_data.append(key, value);
        }
    }
    form_data
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(form_data: &FormData) -> Vec<(&str, &str)> {
        form_data
            .entries()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_text().unwrap()))
            .collect()
    }

    #[test]
    fn no_sources_yield_empty_payload() {
        let form_data = create_form_data(None, None);
        assert!(form_data.is_empty());
        assert_eq!(form_data.len(), 0);
    }

    #[test]
    fn form_entries_come_before_data_entries() {
        let form = Form::new().field("a", "1");
        let data = DataMap::new().with("b", 2);
        let form_data = create_form_data(Some(&form), Some(&data));
        assert_eq!(texts(&form_data), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn duplicate_names_are_kept() {
        let form = Form::new().field("tag", "x");
        let data = DataMap::new().with("tag", "y");
        let form_data = create_form_data(Some(&form), Some(&data));
        assert_eq!(form_data.get_all("tag").len(), 2);
        assert_eq!(form_data.get("tag").and_then(FormValue::as_text), Some("x"));
    }

    #[test]
    fn disabled_and_unnamed_fields_are_skipped() {
        let form = Form::new()
            .push(FormField::text("hidden", "1").disabled())
            .field("", "anonymous")
            .field("kept", "yes");
        let form_data = create_form_data(Some(&form), None);
        assert_eq!(texts(&form_data), vec![("kept", "yes")]);
    }

    #[test]
    fn file_fields_are_copied() {
        let part = FilePart::new(&b"\x00\x01"[..])
            .file_name("a.bin")
            .mime_type("application/octet-stream");
        let form = Form::new().file("upload", part.clone());
        let form_data = create_form_data(Some(&form), None);
        assert_eq!(form_data.get("upload"), Some(&FormValue::File(part)));
    }

    #[test]
    fn data_map_keeps_insertion_order_and_replaces_in_place() {
        let data = DataMap::new().with("z", 1).with("a", 2).with("z", 3);
        let pairs: Vec<_> = data.iter().collect();
        assert_eq!(pairs, vec![("z", "3"), ("a", "2")]);
    }

    #[test]
    fn data_map_from_json_object_keeps_document_order() {
        let data = DataMap::try_from(json!({"b": 2, "a": "x", "c": true})).unwrap();
        let pairs: Vec<_> = data.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "x"), ("c", "true")]);
    }

    #[test]
    fn data_map_from_array_uses_indices_as_keys() {
        let data = DataMap::try_from(json!([1, 2])).unwrap();
        let pairs: Vec<_> = data.iter().collect();
        assert_eq!(pairs, vec![("0", "1"), ("1", "2")]);
    }

    #[test]
    fn data_map_rejects_scalars() {
        let err = DataMap::try_from(json!("not an object")).unwrap_err();
        assert_eq!(
            err,
            FetchError::InvalidArgument("Invalid data type for data".to_string())
        );
        assert!(DataMap::try_from(json!(42)).is_err());
    }

    #[test]
    fn data_map_from_falsy_values_is_empty() {
        for value in [Value::Null, json!(false), json!(0), json!(0.0), json!("")] {
            assert!(DataMap::try_from(value).unwrap().is_empty());
        }
        assert!(Form::try_from(json!(false)).unwrap().fields().is_empty());
    }

    #[test]
    fn truthy_scalars_are_still_rejected() {
        assert!(DataMap::try_from(json!(true)).is_err());
        assert!(DataMap::try_from(json!(-1)).is_err());
        assert!(Form::try_from(json!("x")).is_err());
    }

    #[test]
    fn large_array_data_keeps_every_index() {
        let items: Vec<u32> = (0..10_000).collect();
        let data = DataMap::try_from(json!(items)).unwrap();
        assert_eq!(data.len(), 10_000);
        assert_eq!(data.get("9999"), Some("9999"));
    }

    #[test]
    fn form_data_from_object_and_pairs() {
        let form_data = FormData::try_from(json!({"only": "this", "n": 1})).unwrap();
        assert_eq!(texts(&form_data), vec![("only", "this"), ("n", "1")]);

        let form_data = FormData::try_from(json!([["tag", "x"], ["tag", "y"]])).unwrap();
        assert_eq!(texts(&form_data), vec![("tag", "x"), ("tag", "y")]);
    }

    #[test]
    fn form_data_rejects_bad_shapes() {
        let err = FormData::try_from(json!("nope")).unwrap_err();
        assert_eq!(
            err,
            FetchError::InvalidArgument("Invalid data type for formData".to_string())
        );
        assert!(FormData::try_from(json!([["only-name"]])).is_err());
        assert!(FormData::try_from(json!([[1, "x"]])).is_err());
        assert!(FormData::try_from(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn nested_values_are_sent_as_json_text() {
        let data = DataMap::try_from(json!({"list": [1, 2], "none": null})).unwrap();
        assert_eq!(data.get("list"), Some("[1,2]"));
        assert_eq!(data.get("none"), Some("null"));
    }

    #[test]
    fn form_rejects_scalars() {
        let err = Form::try_from(json!("not an object")).unwrap_err();
        assert_eq!(
            err,
            FetchError::InvalidArgument("Invalid data type for form".to_string())
        );
    }

    #[test]
    fn form_from_field_list() {
        let form = Form::try_from(json!([
            {"name": "a", "value": 1},
            {"name": "b", "value": "x", "disabled": true},
        ]))
        .unwrap();
        assert_eq!(form.fields().len(), 2);
        assert!(form.fields()[1].disabled);
        let form_data = FormData::from(&form);
        assert_eq!(texts(&form_data), vec![("a", "1")]);
    }

    #[test]
    fn form_rejects_malformed_field_list() {
        assert!(Form::try_from(json!([{"value": 1}])).is_err());
        assert!(Form::try_from(json!([3])).is_err());
        assert!(Form::try_from(json!([{"name": "a", "disabled": "yes"}])).is_err());
    }
}
