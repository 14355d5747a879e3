//! Contract for best-effort extractors that run outside the deterministic
//! core, such as a remote text-generation service.
//!
//! Their output is untrusted: it is shape-checked before use and any failure
//! falls back to the deterministic record, then to the tree view.

use log::warn;
use serde_json::Value;

use crate::core::record_builder::RecordBuilder;
use crate::error::{AlternateExtractionError, MalformedXmlError};
use crate::UniversalRecord;

pub trait AlternateExtractor {
    /// Produce a record-shaped JSON value from raw document text.
    fn extract(&self, text: &str) -> Result<Value, AlternateExtractionError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Alternate(UniversalRecord),
    Deterministic(UniversalRecord),
    /// Nothing could be extracted; callers show the raw text or tree view.
    Unparsed(MalformedXmlError),
}

impl Extraction {
    pub fn record(&self) -> Option<&UniversalRecord> {
        match self {
            Extraction::Alternate(r) | Extraction::Deterministic(r) => Some(r),
            Extraction::Unparsed(_) => None,
        }
    }
}

/// Accept a JSON object carrying at least a string `title`. Missing
/// collections default to empty; present ones must have the right types.
pub fn validate_shape(value: Value) -> Result<UniversalRecord, AlternateExtractionError> {
    let object = value
        .as_object()
        .ok_or_else(|| AlternateExtractionError::InvalidShape("expected a JSON object".into()))?;
    match object.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {}
        _ => {
            return Err(AlternateExtractionError::InvalidShape(
                "missing or empty string field `title`".into(),
            ))
        }
    }
    serde_json::from_value(value).map_err(|e| AlternateExtractionError::InvalidShape(e.to_string()))
}

pub fn extract_with_fallback<E: AlternateExtractor + ?Sized>(
    extractor: &E,
    text: &str,
    builder: &RecordBuilder,
) -> Extraction {
    match extractor.extract(text).and_then(validate_shape) {
        Ok(record) => return Extraction::Alternate(record),
        Err(e) => warn!("alternate extraction rejected, using deterministic path: {}", e),
    }
    match builder.extract(text) {
        Ok(record) => Extraction::Deterministic(record),
        Err(e) => Extraction::Unparsed(e),
    }
}
