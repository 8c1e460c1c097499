//! Declarative field schema for species records and the validator built on it.
//!
//! A [`SpeciesSchema`] is an ordered list of [`FieldDefinition`]s. Each
//! definition states the field's type, whether it may be null, and how raw
//! input is normalized before it is accepted:
//!
//! - `Text` trims surrounding whitespace; a blank value becomes null when the
//!   field is nullable and is rejected otherwise. Numbers and booleans are
//!   taken in their text form.
//! - `Select` accepts only one of the listed options, verbatim.
//! - `PositiveInteger` accepts whole numbers `>= 1`, or null.
//! - `Url` trims like `Text` and then requires an absolute, well-formed URL.
//!
//! [`SpeciesSchema::validate`] runs every rule over a [`Draft`] and returns
//! either the normalized [`SpeciesPayload`] or every failure grouped by field
//! in [`FieldErrors`]. Validation is pure, so it can run on every keystroke
//! and once more when the draft is submitted.

use crate::core::species::I64_LIMIT;
use crate::{Draft, FieldValue, Kingdom, SpeciesPayload};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const SCIENTIFIC_NAME: &str = "scientific_name";
pub const COMMON_NAME: &str = "common_name";
pub const KINGDOM: &str = "kingdom";
pub const TOTAL_POPULATION: &str = "total_population";
pub const IMAGE: &str = "image";
pub const DESCRIPTION: &str = "description";

/// Every field a draft may hold. `id` and `author` are deliberately absent.
pub const EDITABLE_FIELDS: [&str; 6] = [
    SCIENTIFIC_NAME,
    COMMON_NAME,
    KINGDOM,
    TOTAL_POPULATION,
    IMAGE,
    DESCRIPTION,
];

/// The kind of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Select,
    PositiveInteger,
    Url,
}

/// Describes a single typed field within the species schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    /// Human-readable name used in error messages.
    pub label: String,
    pub field_type: FieldType,
    pub nullable: bool,
    /// Allowed option strings; non-empty only for `select` fields.
    #[serde(default)]
    pub options: Vec<String>,
}

impl FieldDefinition {
    fn new(name: &str, label: &str, field_type: FieldType, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            nullable,
            options: Vec::new(),
        }
    }

    /// Normalizes one raw value according to this definition.
    ///
    /// Returns the canonical value, or one or more messages describing why
    /// the value was rejected.
    fn normalize(&self, value: &FieldValue) -> std::result::Result<Canonical, Vec<String>> {
        let label = &self.label;
        match (self.field_type, value) {
            (_, FieldValue::Null) => {
                if self.nullable {
                    Ok(Canonical::Null)
                } else {
                    Err(vec![format!("{label} is required")])
                }
            }

            (FieldType::Text, other) => {
                let text = other.to_text();
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    Ok(Canonical::Text(trimmed.to_string()))
                } else if self.nullable {
                    Ok(Canonical::Null)
                } else {
                    Err(vec![format!("{label} must not be empty")])
                }
            }

            (FieldType::Select, FieldValue::Text(s)) if self.options.iter().any(|o| o == s) => {
                Ok(Canonical::Text(s.clone()))
            }
            (FieldType::Select, _) => Err(vec![format!(
                "{label} must be one of: {}",
                self.options.join(", ")
            )]),

            (FieldType::PositiveInteger, FieldValue::Integer(n)) => {
                if *n >= 1 {
                    Ok(Canonical::Integer(*n))
                } else {
                    Err(vec![format!("{label} must be at least 1")])
                }
            }
            (FieldType::PositiveInteger, FieldValue::Number(n)) => {
                let mut messages = Vec::new();
                if !n.is_finite() || n.fract() != 0.0 {
                    messages.push(format!("{label} must be a whole number"));
                }
                if *n < 1.0 {
                    messages.push(format!("{label} must be at least 1"));
                }
                if n.is_finite() && *n >= I64_LIMIT {
                    messages.push(format!("{label} is too large"));
                }
                if messages.is_empty() {
                    Ok(Canonical::Integer(*n as i64))
                } else {
                    Err(messages)
                }
            }
            (FieldType::PositiveInteger, other) => Err(vec![format!(
                "{label} must be a number, got {}",
                other.type_name()
            )]),

            (FieldType::Url, FieldValue::Text(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return if self.nullable {
                        Ok(Canonical::Null)
                    } else {
                        Err(vec![format!("{label} must not be empty")])
                    };
                }
                match url::Url::parse(trimmed) {
                    Ok(_) => Ok(Canonical::Text(trimmed.to_string())),
                    Err(e) => Err(vec![format!("{label} must be a valid URL ({e})")]),
                }
            }

            (FieldType::Url, other) => Err(vec![format!(
                "{label} must be text, got {}",
                other.type_name()
            )]),
        }
    }
}

/// A field value after normalization.
#[derive(Debug, Clone, PartialEq)]
enum Canonical {
    Null,
    Text(String),
    Integer(i64),
}

/// Field-scoped validation failures, keyed by field name.
///
/// Serializes as a plain map (`{"kingdom": ["..."]}`) so the presentation
/// layer can show each message next to its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Appends one message for `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Appends several messages for `field`; an empty list still marks it.
    pub fn extend_field(&mut self, field: &str, messages: Vec<String>) {
        self.0.entry(field.to_string()).or_default().extend(messages);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages for one field; empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Clears every message for `field`.
    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    /// Names of the failing fields, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// The species field schema.
#[derive(Debug, Clone)]
pub struct SpeciesSchema {
    pub fields: Vec<FieldDefinition>,
}

impl Default for SpeciesSchema {
    fn default() -> Self {
        Self::species()
    }
}

impl SpeciesSchema {
    /// The canonical species schema.
    pub fn species() -> Self {
        let mut kingdom = FieldDefinition::new(KINGDOM, "Kingdom", FieldType::Select, false);
        kingdom.options = Kingdom::ALL.iter().map(|k| k.as_str().to_string()).collect();

        Self {
            fields: vec![
                FieldDefinition::new(SCIENTIFIC_NAME, "Scientific name", FieldType::Text, false),
                FieldDefinition::new(COMMON_NAME, "Common name", FieldType::Text, true),
                kingdom,
                FieldDefinition::new(
                    TOTAL_POPULATION,
                    "Total population",
                    FieldType::PositiveInteger,
                    true,
                ),
                FieldDefinition::new(IMAGE, "Image", FieldType::Url, true),
                FieldDefinition::new(DESCRIPTION, "Description", FieldType::Text, true),
            ],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates a single field, for live feedback while a draft is edited.
    ///
    /// Unknown field names are accepted; they are never part of a payload.
    pub fn validate_field(&self, name: &str, value: &FieldValue) -> std::result::Result<(), Vec<String>> {
        match self.field(name) {
            Some(def) => def.normalize(value).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Runs every field rule over `draft`.
    ///
    /// A field missing from the draft is validated as null.
    ///
    /// # Errors
    ///
    /// Returns [`FieldErrors`] naming every field that failed, with all of
    /// its messages. No rule stops validation of the other fields.
    pub fn validate(&self, draft: &Draft) -> std::result::Result<SpeciesPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let mut canonical: HashMap<&str, Canonical> = HashMap::new();

        for def in &self.fields {
            match def.normalize(draft.get(&def.name)) {
                Ok(value) => {
                    canonical.insert(def.name.as_str(), value);
                }
                Err(messages) => errors.extend_field(&def.name, messages),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let scientific_name = take_text(&mut canonical, SCIENTIFIC_NAME);
        let kingdom = take_text(&mut canonical, KINGDOM).and_then(|k| k.parse::<Kingdom>().ok());

        match (scientific_name, kingdom) {
            (Some(scientific_name), Some(kingdom)) => Ok(SpeciesPayload {
                scientific_name,
                common_name: take_text(&mut canonical, COMMON_NAME),
                kingdom,
                total_population: take_integer(&mut canonical, TOTAL_POPULATION),
                image: take_text(&mut canonical, IMAGE),
                description: take_text(&mut canonical, DESCRIPTION),
            }),
            (name, kingdom) => {
                // Only reachable with a schema that makes these fields nullable.
                if name.is_none() {
                    errors.push(SCIENTIFIC_NAME, "Scientific name is required");
                }
                if kingdom.is_none() {
                    errors.push(KINGDOM, "Kingdom is required");
                }
                Err(errors)
            }
        }
    }
}

fn take_text(canonical: &mut HashMap<&str, Canonical>, name: &str) -> Option<String> {
    match canonical.remove(name) {
        Some(Canonical::Text(s)) => Some(s),
        _ => None,
    }
}

fn take_integer(canonical: &mut HashMap<&str, Canonical>, name: &str) -> Option<i64> {
    match canonical.remove(name) {
        Some(Canonical::Integer(n)) => Some(n),
        _ => None,
    }
}
