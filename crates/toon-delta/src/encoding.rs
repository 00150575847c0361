//! The two serializations being compared, behind one trait.
//!
//! - [`JsonEncoder`] — the baseline: compact JSON, keys in encounter order
//! - [`ToonEncoder`](crate::toon::ToonEncoder) — the compact alternative

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{DeltaError, Result};
use crate::toon::ToonEncoder;

/// Which format a serialization (or a selection) is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormatLabel {
    Toon,
    Json,
}

impl FormatLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatLabel::Toon => "TOON",
            FormatLabel::Json => "JSON",
        }
    }
}

impl fmt::Display for FormatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic serializer for a decoded JSON value.
///
/// Implementations must be pure: the same value always yields the same text.
pub trait ValueEncoder: Send + Sync {
    fn label(&self) -> FormatLabel;
    fn encode(&self, value: &Value) -> Result<String>;
}

/// Baseline encoder: standard JSON with no insignificant whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl ValueEncoder for JsonEncoder {
    fn label(&self) -> FormatLabel {
        FormatLabel::Json
    }

    fn encode(&self, value: &Value) -> Result<String> {
        serde_json::to_string(value).map_err(|err| DeltaError::Encode {
            format: FormatLabel::Json,
            message: err.to_string(),
        })
    }
}

impl ValueEncoder for ToonEncoder {
    fn label(&self) -> FormatLabel {
        FormatLabel::Toon
    }

    fn encode(&self, value: &Value) -> Result<String> {
        Ok(self.encode_value(value))
    }
}

/// Serialize `value` as compact JSON.
pub fn encode_json(value: &Value) -> Result<String> {
    JsonEncoder.encode(value)
}

/// Serialize `value` as TOON with default options.
pub fn encode_toon(value: &Value) -> String {
    ToonEncoder::default().encode_value(value)
}
