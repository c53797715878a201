//! Dialog parameters sent to the UI process.
//!
//! The UI receives display strings as positional arguments and the caller's
//! portal options as a JSON object, so it can pick whatever it understands.

use std::collections::HashMap;

use serde_json::{Map, Number, Value as Json};
use zbus::zvariant::{OwnedValue, Value};

use crate::error::BridgeError;

/// Parameters of an `AccessDialog` confirmation prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationPrompt {
    pub token: String,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub options: Map<String, Json>,
}

impl ConfirmationPrompt {
    pub fn new(
        token: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        body: impl Into<String>,
        options: &HashMap<String, OwnedValue>,
    ) -> Self {
        Self {
            token: token.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            body: body.into(),
            options: options_to_json(options),
        }
    }

    pub fn options_json(&self) -> Result<String, BridgeError> {
        encode_options(&self.options)
    }
}

/// Parameters of an `OpenFile` picker.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePickerPrompt {
    pub token: String,
    pub title: String,
    pub options: Map<String, Json>,
}

impl FilePickerPrompt {
    pub fn new(
        token: impl Into<String>,
        title: impl Into<String>,
        options: &HashMap<String, OwnedValue>,
    ) -> Self {
        Self {
            token: token.into(),
            title: title.into(),
            options: options_to_json(options),
        }
    }

    pub fn options_json(&self) -> Result<String, BridgeError> {
        encode_options(&self.options)
    }
}

fn encode_options(options: &Map<String, Json>) -> Result<String, BridgeError> {
    serde_json::to_string(options)
        .map_err(|err| BridgeError::DispatchFailed(format!("Failed to encode options: {err}")))
}

/// Converts a portal `a{sv}` options map into a JSON object.
pub fn options_to_json(options: &HashMap<String, OwnedValue>) -> Map<String, Json> {
    options
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(value)))
        .collect()
}

/// Converts a D-Bus value into JSON. File descriptors become `null`.
pub fn value_to_json(value: &Value<'_>) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::U8(n) => Json::from(*n),
        Value::I16(n) => Json::from(*n),
        Value::U16(n) => Json::from(*n),
        Value::I32(n) => Json::from(*n),
        Value::U32(n) => Json::from(*n),
        Value::I64(n) => Json::from(*n),
        Value::U64(n) => Json::from(*n),
        Value::F64(n) => Number::from_f64(*n).map(Json::Number).unwrap_or(Json::Null),
        Value::Str(s) => Json::from(s.as_str()),
        Value::Signature(s) => Json::from(s.as_str()),
        Value::ObjectPath(p) => Json::from(p.as_str()),
        Value::Value(inner) => value_to_json(inner),
        Value::Array(array) => Json::Array(array.inner().iter().map(value_to_json).collect()),
        Value::Structure(structure) => {
            Json::Array(structure.fields().iter().map(value_to_json).collect())
        }
        Value::Dict(dict) => Json::Object(
            dict.iter()
                .map(|(key, value)| (json_key(key), value_to_json(value)))
                .collect(),
        ),
        _ => Json::Null,
    }
}

fn json_key(key: &Value<'_>) -> String {
    match key {
        Value::Str(s) => s.to_string(),
        other => value_to_json(other).to_string(),
    }
}
