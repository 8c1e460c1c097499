//! Bridges draft values and the strings a text input can hold.
//!
//! Text inputs have no notion of null, so the presentation layer works with
//! `""` where the draft holds [`FieldValue::Null`]. This module is the only
//! place that translation happens; neither the validator nor the store ever
//! sees an empty string standing in for null.

use crate::{Draft, FieldType, FieldValue, SpeciesSchema};
use std::collections::BTreeMap;

/// Input strings for every field of a draft, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    inputs: BTreeMap<String, String>,
}

impl FormValues {
    /// Renders each draft value as the string an input should display.
    pub fn from_draft(draft: &Draft) -> Self {
        let inputs = draft
            .values()
            .map(|(name, value)| (name.to_string(), display_value(value)))
            .collect();
        Self { inputs }
    }

    /// The input string for `field`, `""` when absent.
    pub fn get(&self, field: &str) -> &str {
        self.inputs.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: &str, input: impl Into<String>) {
        self.inputs.insert(field.to_string(), input.into());
    }

    /// Writes every input back into `draft` through [`parse_input`].
    ///
    /// Returns the names the draft refused (non-editable fields).
    pub fn apply_to(&self, draft: &mut Draft, schema: &SpeciesSchema) -> Vec<String> {
        let mut rejected = Vec::new();
        for (name, input) in &self.inputs {
            if !draft.set(name, parse_input(schema, name, input)) {
                rejected.push(name.clone());
            }
        }
        rejected
    }
}

/// Converts one input string to a raw draft value.
///
/// An empty input becomes null. Numeric fields parse the trimmed input as a
/// number; anything unparseable is passed through as text so validation can
/// report the wrong type. All other fields keep the input verbatim, leaving
/// trimming to the validator.
pub fn parse_input(schema: &SpeciesSchema, field: &str, input: &str) -> FieldValue {
    let field_type = schema.field(field).map(|f| f.field_type);
    match field_type {
        Some(FieldType::PositiveInteger) => {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                FieldValue::Null
            } else {
                trimmed
                    .parse::<i64>()
                    .map(FieldValue::Integer)
                    .or_else(|_| trimmed.parse::<f64>().map(FieldValue::Number))
                    .unwrap_or_else(|_| FieldValue::Text(input.to_string()))
            }
        }
        _ if input.is_empty() => FieldValue::Null,
        _ => FieldValue::Text(input.to_string()),
    }
}

/// Renders a raw value for display in a text input.
pub fn display_value(value: &FieldValue) -> String {
    value.to_text()
}
