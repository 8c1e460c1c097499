//! Internal domain modules for the species catalog core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod author;
pub mod catalog;
pub mod dialog;
pub mod draft;
pub mod error;
pub mod form;
pub mod operation;
pub mod operation_log;
pub mod schema;
pub mod session;
pub mod settings;
pub mod species;
pub mod storage;
pub mod store;
pub mod ui;

#[doc(inline)]
pub use author::AuthorLookup;
#[doc(inline)]
pub use catalog::Catalog;
#[doc(inline)]
pub use dialog::{Host, RecordView, SpeciesDialog};
#[doc(inline)]
pub use draft::Draft;
#[doc(inline)]
pub use error::{CatalogError, Result};
#[doc(inline)]
pub use form::FormValues;
#[doc(inline)]
pub use operation::Operation;
#[doc(inline)]
pub use operation_log::{OperationLog, OperationSummary, PurgeStrategy};
#[doc(inline)]
pub use schema::{FieldDefinition, FieldErrors, FieldType, SpeciesSchema};
#[doc(inline)]
pub use session::{
    Affordances, DeleteTicket, EditSession, Outcome, SessionError, SessionState, SubmitTicket,
};
#[doc(inline)]
pub use settings::CatalogSettings;
#[doc(inline)]
pub use species::{FieldValue, Kingdom, Species, SpeciesPayload};
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use store::{ProfileDirectory, SpeciesStore};
#[doc(inline)]
pub use ui::{Confirm, Navigator, Notification, Notifier, Severity};
