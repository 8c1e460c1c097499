//! The edit session state machine for a single species record.
//!
//! An [`EditSession`] owns the last server-confirmed snapshot of a record and,
//! while editing, a [`Draft`] of its editable fields. It moves between four
//! states:
//!
//! ```text
//!            start_edit              begin_submit (valid)
//!  Viewing ─────────────► Editing ─────────────────────► Submitting
//!     ▲  ◄───────────────   │  ▲ ◄──── complete_submit(Err) ──┘ │
//!     │   cancel (confirmed)│  │                                │
//!     │                     │  └─ begin_submit (invalid) ─┘     │
//!     │◄──────────────── complete_submit(Ok) ────────────────────┘
//!     │
//!     └─ begin_delete (confirmed, from Viewing or Editing) ─► Deleting
//!        complete_delete(Ok)  → Viewing, record marked deleted
//!        complete_delete(Err) → back to Viewing or Editing
//! ```
//!
//! Remote work is split in two halves. `begin_*` checks the transition and
//! returns a ticket; the caller performs the request and hands the result to
//! the matching `complete_*`. Tickets remember the mount epoch, so a response
//! that arrives after [`EditSession::unmount`] is dropped as
//! [`Outcome::Stale`]. Only one write (submit or delete) can be in flight at
//! a time.
//!
//! The session performs no I/O and emits no notifications itself; see
//! [`SpeciesDialog`](crate::SpeciesDialog) for the async driver that does.

use crate::core::author::{AuthorLookup, AuthorNameCache};
use crate::core::form::{parse_input, FormValues};
use crate::{Confirm, Draft, FieldErrors, FieldValue, Result, Species, SpeciesPayload, SpeciesSchema};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

pub const CANCEL_PROMPT: &str = "Discard your changes to this species?";
pub const DELETE_PROMPT: &str = "Delete this species? This cannot be undone.";

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// Where the session is in its edit/submit/delete lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionState {
    Viewing,
    Editing,
    Submitting,
    Deleting {
        /// Whether a draft was open when the delete started; restored on failure.
        #[serde(rename = "wasEditing")]
        was_editing: bool,
    },
}

/// Which actions the presentation layer should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    pub edit: bool,
    pub delete: bool,
    pub view_details: bool,
}

/// The result of handing a remote response to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The response was applied to the session.
    Applied,
    /// The request failed; the message is suitable for a notification.
    Failed(String),
    /// The session was torn down or reloaded since the request started.
    Stale,
}

/// A refused transition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("only the author of this species can do that")]
    NotAuthor,

    #[error("cannot {action} while {state:?}")]
    InvalidTransition { action: &'static str, state: SessionState },

    #[error("another change to this species is still in progress")]
    Busy,

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("this species has been deleted")]
    RecordDeleted,

    #[error("unknown or read-only field '{0}'")]
    UnknownField(String),

    #[error("session is no longer mounted")]
    Unmounted,
}

/// A submit that passed validation and is waiting for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    pub species_id: i64,
    /// The identity the write is made as.
    pub actor: String,
    pub payload: SpeciesPayload,
    epoch: u64,
    seq: u64,
}

/// A confirmed delete waiting for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    pub species_id: i64,
    pub actor: String,
    epoch: u64,
    seq: u64,
}

/// Edit session over one species record.
#[derive(Debug, Clone)]
pub struct EditSession {
    schema: SpeciesSchema,
    snapshot: Species,
    actor: Option<String>,
    state: SessionState,
    draft: Option<Draft>,
    epoch: u64,
    mounted: bool,
    deleted: bool,
    write_seq: u64,
    write_in_flight: Option<u64>,
    author_name: AuthorNameCache,
}

impl EditSession {
    /// Mounts a session over a freshly fetched `snapshot`, viewed by `actor`.
    pub fn new(snapshot: Species, actor: Option<String>) -> Self {
        Self::with_schema(SpeciesSchema::species(), snapshot, actor)
    }

    pub fn with_schema(schema: SpeciesSchema, snapshot: Species, actor: Option<String>) -> Self {
        Self {
            schema,
            snapshot,
            actor,
            state: SessionState::Viewing,
            draft: None,
            epoch: next_epoch(),
            mounted: true,
            deleted: false,
            write_seq: 0,
            write_in_flight: None,
            author_name: AuthorNameCache::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The last value fetched from or successfully written to the store.
    pub fn snapshot(&self) -> &Species {
        &self.snapshot
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Draft values rendered for text inputs, `None` outside edit mode.
    pub fn form_values(&self) -> Option<FormValues> {
        self.draft.as_ref().map(FormValues::from_draft)
    }

    pub fn schema(&self) -> &SpeciesSchema {
        &self.schema
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// `true` once a delete has been confirmed by the store.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// `true` while a submit or delete is waiting on the store.
    pub fn is_write_in_flight(&self) -> bool {
        self.write_in_flight.is_some()
    }

    /// Inputs are read-only unless a draft is open.
    pub fn is_read_only(&self) -> bool {
        !matches!(self.state, SessionState::Editing | SessionState::Submitting)
    }

    pub fn is_author(&self) -> bool {
        self.snapshot.is_authored_by(self.actor.as_deref())
    }

    /// Edit and delete are offered only to the record's author, and only
    /// while the record exists and no write is pending. Viewing details is
    /// always offered.
    pub fn affordances(&self) -> Affordances {
        let owner = self.is_author() && !self.deleted && self.mounted;
        let idle = self.write_in_flight.is_none();
        Affordances {
            edit: owner && idle && self.state == SessionState::Viewing,
            delete: owner
                && idle
                && matches!(self.state, SessionState::Viewing | SessionState::Editing),
            view_details: true,
        }
    }

    /// The author's display name, once resolved.
    pub fn author_display_name(&self) -> Option<&str> {
        self.author_name.get(&self.snapshot.author)
    }

    /// Route of the full-detail page for this record.
    pub fn detail_path(&self, route_prefix: &str) -> String {
        format!("{}/{}", route_prefix.trim_end_matches('/'), self.snapshot.id)
    }

    /// Opens a draft seeded from the snapshot.
    pub fn start_edit(&mut self) -> std::result::Result<(), SessionError> {
        self.ensure_owner()?;
        if self.write_in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        if self.state != SessionState::Viewing {
            return Err(self.invalid("start editing"));
        }
        self.draft = Some(Draft::from_species(&self.snapshot));
        self.state = SessionState::Editing;
        log::debug!("species {}: editing", self.snapshot.id);
        Ok(())
    }

    /// Sets one draft value and re-validates that field for live feedback.
    pub fn set_field(&mut self, field: &str, value: FieldValue) -> std::result::Result<(), SessionError> {
        if self.is_read_only() {
            return Err(self.invalid("edit fields"));
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(SessionError::InvalidTransition { action: "edit fields", state: self.state });
        };
        if !draft.set(field, value) {
            return Err(SessionError::UnknownField(field.to_string()));
        }
        let messages = self
            .schema
            .validate_field(field, draft.get(field))
            .err()
            .unwrap_or_default();
        draft.set_field_errors(field, messages);
        Ok(())
    }

    /// Sets one draft value from a text input, where `""` means null.
    pub fn set_input(&mut self, field: &str, input: &str) -> std::result::Result<(), SessionError> {
        let value = parse_input(&self.schema, field, input);
        self.set_field(field, value)
    }

    /// Asks to discard the draft. Returns `Ok(false)` when the user declines,
    /// leaving the draft and state untouched.
    ///
    /// Allowed while a submit is in flight; the submit's outcome is still
    /// applied to the snapshot when it arrives.
    pub fn cancel(&mut self, confirm: &dyn Confirm) -> std::result::Result<bool, SessionError> {
        if !matches!(self.state, SessionState::Editing | SessionState::Submitting) {
            return Err(self.invalid("cancel"));
        }
        if !confirm.confirm(CANCEL_PROMPT) {
            return Ok(false);
        }
        self.draft = None;
        self.state = SessionState::Viewing;
        log::debug!("species {}: edit cancelled", self.snapshot.id);
        Ok(true)
    }

    /// Validates the draft and, if it passes, moves to `Submitting`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Validation`] when the draft is invalid; the errors are
    /// also attached to the draft and the session stays in `Editing`.
    /// [`SessionError::Busy`] while another write is pending.
    pub fn begin_submit(&mut self) -> std::result::Result<SubmitTicket, SessionError> {
        self.ensure_mounted()?;
        if self.write_in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        if self.state != SessionState::Editing {
            return Err(self.invalid("submit"));
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(SessionError::InvalidTransition { action: "submit", state: self.state });
        };

        match self.schema.validate(draft) {
            Ok(payload) => {
                draft.set_errors(FieldErrors::default());
                self.write_seq += 1;
                self.write_in_flight = Some(self.write_seq);
                self.state = SessionState::Submitting;
                log::debug!("species {}: submitting", self.snapshot.id);
                Ok(SubmitTicket {
                    species_id: self.snapshot.id,
                    actor: self.actor.clone().unwrap_or_default(),
                    payload,
                    epoch: self.epoch,
                    seq: self.write_seq,
                })
            }
            Err(errors) => {
                log::debug!("species {}: draft rejected: {errors}", self.snapshot.id);
                draft.set_errors(errors.clone());
                Err(SessionError::Validation(errors))
            }
        }
    }

    /// Applies the store's answer to a submit.
    ///
    /// On success the stored record becomes the snapshot and the draft is
    /// closed. On failure the draft is kept and the session returns to
    /// `Editing` so the user can retry or cancel. A stored record with a
    /// different ID counts as a failure.
    pub fn complete_submit(&mut self, ticket: &SubmitTicket, result: Result<Species>) -> Outcome {
        if !self.accepts(ticket.epoch, ticket.seq) {
            log::debug!("species {}: dropping stale submit response", ticket.species_id);
            return Outcome::Stale;
        }
        self.write_in_flight = None;

        match result {
            Ok(stored) if stored.id != self.snapshot.id => {
                if self.state == SessionState::Submitting {
                    self.state = SessionState::Editing;
                }
                log::warn!(
                    "species {}: store answered the update with species {}",
                    self.snapshot.id,
                    stored.id
                );
                Outcome::Failed(format!(
                    "The store returned species {} instead of {}",
                    stored.id, self.snapshot.id
                ))
            }
            Ok(stored) => {
                self.snapshot = stored;
                if self.state == SessionState::Submitting {
                    self.draft = None;
                    self.state = SessionState::Viewing;
                }
                log::info!("species {}: update saved", self.snapshot.id);
                Outcome::Applied
            }
            Err(e) => {
                if self.state == SessionState::Submitting {
                    self.state = SessionState::Editing;
                }
                log::warn!("species {}: update failed: {e}", self.snapshot.id);
                Outcome::Failed(e.user_message())
            }
        }
    }

    /// Asks to delete the record. Returns `Ok(None)` when the user declines.
    pub fn begin_delete(
        &mut self,
        confirm: &dyn Confirm,
    ) -> std::result::Result<Option<DeleteTicket>, SessionError> {
        self.ensure_owner()?;
        if self.write_in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        let was_editing = match self.state {
            SessionState::Viewing => false,
            SessionState::Editing => true,
            SessionState::Submitting | SessionState::Deleting { .. } => {
                return Err(SessionError::Busy)
            }
        };
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(None);
        }

        self.write_seq += 1;
        self.write_in_flight = Some(self.write_seq);
        self.state = SessionState::Deleting { was_editing };
        log::debug!("species {}: deleting", self.snapshot.id);
        Ok(Some(DeleteTicket {
            species_id: self.snapshot.id,
            actor: self.actor.clone().unwrap_or_default(),
            epoch: self.epoch,
            seq: self.write_seq,
        }))
    }

    /// Applies the store's answer to a delete.
    ///
    /// Only a confirmed delete changes state: the draft is dropped, the
    /// session is forced to `Viewing` and the record is marked deleted. A
    /// failed delete restores the state it started from.
    pub fn complete_delete(&mut self, ticket: &DeleteTicket, result: Result<()>) -> Outcome {
        if !self.accepts(ticket.epoch, ticket.seq) {
            log::debug!("species {}: dropping stale delete response", ticket.species_id);
            return Outcome::Stale;
        }
        self.write_in_flight = None;
        let was_editing = matches!(self.state, SessionState::Deleting { was_editing: true });

        match result {
            Ok(()) => {
                self.draft = None;
                self.deleted = true;
                self.state = SessionState::Viewing;
                log::info!("species {}: deleted", self.snapshot.id);
                Outcome::Applied
            }
            Err(e) => {
                self.state = if was_editing && self.draft.is_some() {
                    SessionState::Editing
                } else {
                    SessionState::Viewing
                };
                log::warn!("species {}: delete failed: {e}", self.snapshot.id);
                Outcome::Failed(e.user_message())
            }
        }
    }

    /// Starts the author display-name lookup unless the name is cached or
    /// was already requested during this mount.
    pub fn begin_author_lookup(&mut self) -> Option<AuthorLookup> {
        if !self.mounted {
            return None;
        }
        self.author_name.begin(&self.snapshot.author, self.epoch)
    }

    /// Caches the directory's answer. Never touches the snapshot.
    pub fn complete_author_lookup(
        &mut self,
        lookup: &AuthorLookup,
        result: Result<Option<String>>,
    ) -> Outcome {
        if !self.mounted {
            return Outcome::Stale;
        }
        self.author_name.complete(lookup, self.epoch, result)
    }

    /// Tears the session down. Every outstanding ticket becomes stale.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.epoch = next_epoch();
        self.write_in_flight = None;
        log::debug!("species {}: unmounted", self.snapshot.id);
    }

    fn accepts(&self, epoch: u64, seq: u64) -> bool {
        self.mounted && self.epoch == epoch && self.write_in_flight == Some(seq)
    }

    fn ensure_mounted(&self) -> std::result::Result<(), SessionError> {
        if self.mounted {
            Ok(())
        } else {
            Err(SessionError::Unmounted)
        }
    }

    fn ensure_owner(&self) -> std::result::Result<(), SessionError> {
        self.ensure_mounted()?;
        if self.deleted {
            return Err(SessionError::RecordDeleted);
        }
        if !self.is_author() {
            return Err(SessionError::NotAuthor);
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition { action, state: self.state }
    }
}
