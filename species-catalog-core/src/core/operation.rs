//! Audit-log operation types for catalog mutations.

use crate::SpeciesPayload;
use serde::{Deserialize, Serialize};

/// A single mutation recorded in the catalog operation log.
///
/// Every variant carries a stable `operation_id`, a wall-clock `timestamp`,
/// and the `actor` that performed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    /// A new species record was inserted.
    CreateSpecies {
        /// Stable UUID for this operation.
        operation_id: String,
        /// Unix timestamp (seconds) when the operation was created.
        timestamp: i64,
        /// Identity that performed this operation; becomes the record's author.
        actor: String,
        species_id: i64,
        payload: SpeciesPayload,
    },
    /// The editable fields of a species were replaced.
    UpdateSpecies {
        operation_id: String,
        timestamp: i64,
        actor: String,
        species_id: i64,
        /// The normalized payload as written.
        payload: SpeciesPayload,
    },
    /// A species record was removed.
    DeleteSpecies {
        operation_id: String,
        timestamp: i64,
        actor: String,
        species_id: i64,
    },
}

impl Operation {
    pub fn operation_id(&self) -> &str {
        match self {
            Self::CreateSpecies { operation_id, .. }
            | Self::UpdateSpecies { operation_id, .. }
            | Self::DeleteSpecies { operation_id, .. } => operation_id,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Self::CreateSpecies { timestamp, .. }
            | Self::UpdateSpecies { timestamp, .. }
            | Self::DeleteSpecies { timestamp, .. } => *timestamp,
        }
    }

    pub fn actor(&self) -> &str {
        match self {
            Self::CreateSpecies { actor, .. }
            | Self::UpdateSpecies { actor, .. }
            | Self::DeleteSpecies { actor, .. } => actor,
        }
    }

    pub fn species_id(&self) -> i64 {
        match self {
            Self::CreateSpecies { species_id, .. }
            | Self::UpdateSpecies { species_id, .. }
            | Self::DeleteSpecies { species_id, .. } => *species_id,
        }
    }

    /// The serde tag, also stored in the `operation_type` column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateSpecies { .. } => "CreateSpecies",
            Self::UpdateSpecies { .. } => "UpdateSpecies",
            Self::DeleteSpecies { .. } => "DeleteSpecies",
        }
    }
}
