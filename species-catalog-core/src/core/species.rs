//! The species record, its editable payload and the raw field values a draft holds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A raw, not-yet-validated field value as captured from user input.
///
/// Serialized untagged so a draft reads as plain JSON (`null`, `"text"`, `12`, `true`).
/// Whole JSON numbers deserialize as [`FieldValue::Integer`] so large
/// populations survive a round trip exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Integer(_) | Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
        }
    }

    /// Renders the value as text input would show it; null is `""`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < I64_LIMIT => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }

    /// Equality that treats `12` and `12.0` as the same value.
    pub fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (Self::Integer(i), Self::Number(n)) | (Self::Number(n), Self::Integer(i)) => {
                n.fract() == 0.0 && n.abs() < I64_LIMIT && *n as i64 == *i
            }
            _ => self == other,
        }
    }
}

/// 2^63; every finite whole `f64` below this in magnitude converts to `i64` exactly.
pub(crate) const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Null, Self::from)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(n: Option<i64>) -> Self {
        n.map_or(Self::Null, Self::Integer)
    }
}

/// The closed set of taxonomic kingdoms a species can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kingdom {
    Animalia,
    Plantae,
    Fungi,
    Protista,
    Archaea,
    Bacteria,
}

impl Kingdom {
    /// Every kingdom, in the order the select field lists them.
    pub const ALL: [Kingdom; 6] = [
        Kingdom::Animalia,
        Kingdom::Plantae,
        Kingdom::Fungi,
        Kingdom::Protista,
        Kingdom::Archaea,
        Kingdom::Bacteria,
    ];

    /// The Latin name, as stored and as shown in the select field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Animalia => "Animalia",
            Self::Plantae => "Plantae",
            Self::Fungi => "Fungi",
            Self::Protista => "Protista",
            Self::Archaea => "Archaea",
            Self::Bacteria => "Bacteria",
        }
    }
}

impl fmt::Display for Kingdom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kingdom {
    type Err = String;

    /// Matches the exact Latin name; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown kingdom '{s}'"))
    }
}

/// The editable subset of a species in canonical, persisted form.
///
/// Never carries the record ID or the author; those are owned by [`Species`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPayload {
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub kingdom: Kingdom,
    pub total_population: Option<i64>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// A species record as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub kingdom: Kingdom,
    pub total_population: Option<i64>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub author: String,
}

impl Species {
    /// Copies out the editable fields.
    pub fn payload(&self) -> SpeciesPayload {
        SpeciesPayload {
            scientific_name: self.scientific_name.clone(),
            common_name: self.common_name.clone(),
            kingdom: self.kingdom,
            total_population: self.total_population,
            image: self.image.clone(),
            description: self.description.clone(),
        }
    }

    /// Returns this record with its editable fields replaced by `payload`.
    ///
    /// `id` and `author` are carried over unchanged.
    pub fn with_payload(&self, payload: SpeciesPayload) -> Species {
        Species {
            id: self.id,
            scientific_name: payload.scientific_name,
            common_name: payload.common_name,
            kingdom: payload.kingdom,
            total_population: payload.total_population,
            image: payload.image,
            description: payload.description,
            author: self.author.clone(),
        }
    }

    /// `true` when `actor` is signed in and owns this record.
    pub fn is_authored_by(&self, actor: Option<&str>) -> bool {
        actor.is_some_and(|a| a == self.author)
    }
}
