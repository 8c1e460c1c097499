//! The in-memory working copy of a species' editable fields.

use crate::core::schema::{
    COMMON_NAME, DESCRIPTION, EDITABLE_FIELDS, IMAGE, KINGDOM, SCIENTIFIC_NAME, TOTAL_POPULATION,
};
use crate::{FieldErrors, FieldValue, Species, SpeciesPayload};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw field values being edited, plus the latest validation messages for them.
///
/// Only names listed in [`EDITABLE_FIELDS`] are accepted, so a draft can
/// never carry the record ID or its author into an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    values: BTreeMap<String, FieldValue>,
    #[serde(default)]
    errors: FieldErrors,
}

impl Draft {
    /// Seeds a draft from the editable fields of a stored record.
    pub fn from_species(species: &Species) -> Self {
        Self::from_payload(&species.payload())
    }

    pub fn from_payload(payload: &SpeciesPayload) -> Self {
        let mut values = BTreeMap::new();
        values.insert(SCIENTIFIC_NAME.to_string(), FieldValue::from(payload.scientific_name.as_str()));
        values.insert(COMMON_NAME.to_string(), FieldValue::from(payload.common_name.as_deref()));
        values.insert(KINGDOM.to_string(), FieldValue::from(payload.kingdom.as_str()));
        values.insert(TOTAL_POPULATION.to_string(), FieldValue::from(payload.total_population));
        values.insert(IMAGE.to_string(), FieldValue::from(payload.image.as_deref()));
        values.insert(DESCRIPTION.to_string(), FieldValue::from(payload.description.as_deref()));
        Self { values, errors: FieldErrors::default() }
    }

    /// Current raw value of `field`; null when the field has never been set.
    pub fn get(&self, field: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.values.get(field).unwrap_or(&NULL)
    }

    /// Sets a raw value. Returns `false` (and changes nothing) for names that
    /// are not editable.
    pub fn set(&mut self, field: &str, value: FieldValue) -> bool {
        if !EDITABLE_FIELDS.contains(&field) {
            return false;
        }
        self.values.insert(field.to_string(), value);
        true
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    /// Replaces the messages for a single field; an empty list clears them.
    pub fn set_field_errors(&mut self, field: &str, messages: Vec<String>) {
        self.errors.remove(field);
        if !messages.is_empty() {
            self.errors.extend_field(field, messages);
        }
    }

    /// `true` when any value differs from `snapshot`'s editable fields.
    pub fn is_dirty(&self, snapshot: &Species) -> bool {
        let seeded = Draft::from_species(snapshot);
        EDITABLE_FIELDS
            .iter()
            .any(|field| !self.get(field).same_as(seeded.get(field)))
    }
}
