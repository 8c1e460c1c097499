//! Core library for a species catalog's record detail and edit surface.
//!
//! The surface is driven by [`SpeciesDialog`], which loads one record into an
//! [`EditSession`] and talks to a [`SpeciesStore`] and a [`ProfileDirectory`].
//! [`Catalog`] implements both over a local SQLite file. Draft values are
//! checked by [`SpeciesSchema`] before anything is written.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    author::AuthorLookup,
    catalog::Catalog,
    dialog::{Host, RecordView, SpeciesDialog},
    draft::Draft,
    error::{CatalogError, Result},
    form::{display_value, parse_input, FormValues},
    operation::Operation,
    operation_log::{OperationLog, OperationSummary, PurgeStrategy},
    schema::{FieldDefinition, FieldErrors, FieldType, SpeciesSchema, EDITABLE_FIELDS},
    session::{
        Affordances, DeleteTicket, EditSession, Outcome, SessionError, SessionState, SubmitTicket,
        CANCEL_PROMPT, DELETE_PROMPT,
    },
    settings::{load_settings, load_settings_from, save_settings, save_settings_to, CatalogSettings},
    species::{FieldValue, Kingdom, Species, SpeciesPayload},
    storage::Storage,
    store::{ProfileDirectory, SpeciesStore},
    ui::{Confirm, Navigator, Notification, Notifier, Severity},
};
