//! Async driver that connects an [`EditSession`] to its collaborators.
//!
//! [`SpeciesDialog`] is what a detail/edit surface holds for one rendered
//! record. It fetches the record, resolves the author's display name, and
//! runs submits and deletes against the store. Every remote failure is
//! caught here and turned into a [`Notification`]; nothing propagates to the
//! caller except refused transitions ([`SessionError`]).
//!
//! The dialog is single-threaded. The session lives in a `RefCell` that is
//! never borrowed across an `.await`, so several actions may be in flight at
//! once on one executor (for example under `tokio::join!`). The session
//! itself refuses a second write while one is pending and drops responses
//! that arrive after [`SpeciesDialog::unmount`] or a reload.

use crate::{
    Affordances, CatalogSettings, Confirm, Draft, EditSession, FieldValue, FormValues, Navigator,
    Notification, Notifier, Outcome, ProfileDirectory, SessionError, SessionState, Species,
    SpeciesSchema, SpeciesStore,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// The presentation-side collaborators a dialog reports to.
#[derive(Clone)]
pub struct Host {
    pub notifier: Rc<dyn Notifier>,
    pub navigator: Rc<dyn Navigator>,
    pub confirm: Rc<dyn Confirm>,
}

impl Host {
    pub fn new(
        notifier: Rc<dyn Notifier>,
        navigator: Rc<dyn Navigator>,
        confirm: Rc<dyn Confirm>,
    ) -> Self {
        Self { notifier, navigator, confirm }
    }
}

/// What the dialog currently has to show.
#[derive(Debug, Clone)]
pub enum RecordView {
    /// Nothing fetched yet, or a fetch is in flight.
    Loading,
    /// The store has no record with the requested ID.
    NotFound,
    /// The fetch failed; a notification has been shown.
    Unavailable,
    Ready(EditSession),
}

/// The detail/edit surface for one species record.
pub struct SpeciesDialog<S, D> {
    store: S,
    directory: D,
    host: Host,
    actor: Option<String>,
    schema: SpeciesSchema,
    detail_route_prefix: String,
    species_id: Cell<Option<i64>>,
    load_seq: Cell<u64>,
    mounted: Cell<bool>,
    view: RefCell<RecordView>,
}

impl<S: SpeciesStore, D: ProfileDirectory> SpeciesDialog<S, D> {
    /// Creates a dialog acting as `actor` (`None` when signed out).
    pub fn new(store: S, directory: D, host: Host, actor: Option<String>) -> Self {
        Self {
            store,
            directory,
            host,
            actor,
            schema: SpeciesSchema::species(),
            detail_route_prefix: CatalogSettings::default().detail_route_prefix,
            species_id: Cell::new(None),
            load_seq: Cell::new(0),
            mounted: Cell::new(true),
            view: RefCell::new(RecordView::Loading),
        }
    }

    pub fn with_settings(mut self, settings: &CatalogSettings) -> Self {
        self.detail_route_prefix = settings.detail_route_prefix.clone();
        self
    }

    pub fn with_schema(mut self, schema: SpeciesSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Fetches the record and then resolves its author's display name.
    pub async fn mount(&self, id: i64) {
        self.load(id).await;
        self.resolve_author().await;
    }

    /// Fetches `id` unless it is already shown. A new ID replaces the current
    /// session; responses for the old one are then dropped.
    pub async fn load(&self, id: i64) {
        if !self.mounted.get() {
            return;
        }
        let settled = matches!(*self.view.borrow(), RecordView::Ready(_) | RecordView::NotFound);
        if self.species_id.get() == Some(id) && settled {
            return;
        }
        self.fetch(id).await;
    }

    /// Fetches the current record again, discarding any open draft.
    pub async fn reload(&self) {
        if let Some(id) = self.species_id.get() {
            if self.mounted.get() {
                self.fetch(id).await;
            }
        }
    }

    async fn fetch(&self, id: i64) {
        let seq = self.load_seq.get() + 1;
        self.load_seq.set(seq);
        self.species_id.set(Some(id));
        self.view.replace(RecordView::Loading);

        let result = self.store.fetch_species(id).await;
        if !self.mounted.get() || self.load_seq.get() != seq {
            log::debug!("species {id}: dropping stale fetch response");
            return;
        }

        let view = match result {
            Ok(Some(species)) => {
                RecordView::Ready(EditSession::with_schema(self.schema.clone(), species, self.actor.clone()))
            }
            Ok(None) => RecordView::NotFound,
            Err(e) => {
                log::warn!("species {id}: fetch failed: {e}");
                self.host
                    .notifier
                    .notify(Notification::error("Could not load species", e.user_message()));
                RecordView::Unavailable
            }
        };
        self.view.replace(view);
    }

    /// Looks up the author's display name if it is not cached yet. A failure
    /// is reported but the record keeps rendering without the name.
    pub async fn resolve_author(&self) {
        let Ok(Some(lookup)) = self.with_session(|s| s.begin_author_lookup()) else {
            return;
        };
        let result = self.directory.display_name(&lookup.author).await;
        let outcome = self
            .with_session(|s| s.complete_author_lookup(&lookup, result))
            .unwrap_or(Outcome::Stale);
        if let Outcome::Failed(message) = outcome {
            self.host.notifier.notify(Notification::error("Could not load author", message));
        }
    }

    pub fn start_edit(&self) -> Result<(), SessionError> {
        self.with_session(EditSession::start_edit)?
    }

    pub fn set_field(&self, field: &str, value: FieldValue) -> Result<(), SessionError> {
        self.with_session(|s| s.set_field(field, value))?
    }

    /// Sets a field from its text input, where `""` stands for null.
    pub fn set_input(&self, field: &str, input: &str) -> Result<(), SessionError> {
        self.with_session(|s| s.set_input(field, input))?
    }

    /// Asks the user before discarding the draft. `Ok(false)` when declined.
    pub fn cancel(&self) -> Result<bool, SessionError> {
        let confirm = Rc::clone(&self.host.confirm);
        self.with_session(|s| s.cancel(confirm.as_ref()))?
    }

    /// Validates and saves the draft.
    ///
    /// A draft that fails validation never reaches the store; the field
    /// errors are attached to the draft and returned. Otherwise the store's
    /// answer is applied and announced, and the returned [`Outcome`] says
    /// how it went.
    pub async fn submit(&self) -> Result<Outcome, SessionError> {
        let ticket = self.with_session(EditSession::begin_submit)??;
        let result = self
            .store
            .update_species(ticket.species_id, &ticket.payload, &ticket.actor)
            .await;
        let outcome = self
            .with_session(|s| s.complete_submit(&ticket, result))
            .unwrap_or(Outcome::Stale);

        match &outcome {
            Outcome::Applied => {
                self.host.notifier.notify(Notification::success(
                    "Species updated",
                    format!("{} was saved.", ticket.payload.scientific_name),
                ));
                self.host.navigator.refresh();
            }
            Outcome::Failed(message) => {
                self.host
                    .notifier
                    .notify(Notification::error("Could not update species", message.clone()));
            }
            Outcome::Stale => {}
        }
        Ok(outcome)
    }

    /// Asks the user, then deletes the record. `Ok(None)` when declined.
    pub async fn delete(&self) -> Result<Option<Outcome>, SessionError> {
        let confirm = Rc::clone(&self.host.confirm);
        let Some(ticket) = self.with_session(|s| s.begin_delete(confirm.as_ref()))?? else {
            return Ok(None);
        };
        let result = self.store.delete_species(ticket.species_id, &ticket.actor).await;
        let outcome = self
            .with_session(|s| s.complete_delete(&ticket, result))
            .unwrap_or(Outcome::Stale);

        match &outcome {
            Outcome::Applied => {
                self.host
                    .notifier
                    .notify(Notification::success("Species deleted", "The species was removed."));
                self.host.navigator.refresh();
            }
            Outcome::Failed(message) => {
                self.host
                    .notifier
                    .notify(Notification::error("Could not delete species", message.clone()));
            }
            Outcome::Stale => {}
        }
        Ok(Some(outcome))
    }

    /// Navigates to the full-detail page. Always available; leaves the
    /// session untouched.
    pub fn view_details(&self) {
        if let Some(id) = self.species_id.get() {
            let path = format!("{}/{}", self.detail_route_prefix.trim_end_matches('/'), id);
            self.host.navigator.go_to(&path);
        }
    }

    /// Tears the dialog down. Responses still in flight are dropped.
    pub fn unmount(&self) {
        self.mounted.set(false);
        if let RecordView::Ready(session) = &mut *self.view.borrow_mut() {
            session.unmount();
        }
    }

    /// Runs `f` against the current view.
    pub fn with_view<R>(&self, f: impl FnOnce(&RecordView) -> R) -> R {
        f(&self.view.borrow())
    }

    pub fn is_not_found(&self) -> bool {
        self.with_view(|v| matches!(v, RecordView::NotFound))
    }

    pub fn state(&self) -> Option<SessionState> {
        self.read_session(EditSession::state)
    }

    pub fn snapshot(&self) -> Option<Species> {
        self.read_session(|s| s.snapshot().clone())
    }

    pub fn draft(&self) -> Option<Draft> {
        self.read_session(|s| s.draft().cloned()).flatten()
    }

    pub fn form_values(&self) -> Option<FormValues> {
        self.read_session(EditSession::form_values).flatten()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_session(EditSession::is_read_only).unwrap_or(true)
    }

    /// Without a loaded record only the detail link is offered.
    pub fn affordances(&self) -> Affordances {
        self.read_session(EditSession::affordances).unwrap_or(Affordances {
            edit: false,
            delete: false,
            view_details: self.species_id.get().is_some(),
        })
    }

    pub fn author_display_name(&self) -> Option<String> {
        self.read_session(|s| s.author_display_name().map(str::to_string)).flatten()
    }

    fn read_session<R>(&self, f: impl FnOnce(&EditSession) -> R) -> Option<R> {
        match &*self.view.borrow() {
            RecordView::Ready(session) => Some(f(session)),
            _ => None,
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut EditSession) -> R) -> Result<R, SessionError> {
        match &mut *self.view.borrow_mut() {
            RecordView::Ready(session) => Ok(f(session)),
            _ => Err(SessionError::Unmounted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{KINGDOM, TOTAL_POPULATION};
    use crate::{Catalog, CatalogError, Kingdom, Result, Severity, SpeciesPayload};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingUi {
        notifications: RefCell<Vec<Notification>>,
        routes: RefCell<Vec<String>>,
        refreshes: Cell<usize>,
        decline: Cell<bool>,
        prompts: RefCell<Vec<String>>,
    }

    impl RecordingUi {
        fn severities(&self) -> Vec<Severity> {
            self.notifications.borrow().iter().map(|n| n.severity).collect()
        }
    }

    impl Notifier for RecordingUi {
        fn notify(&self, notification: Notification) {
            self.notifications.borrow_mut().push(notification);
        }
    }

    impl Navigator for RecordingUi {
        fn go_to(&self, path: &str) {
            self.routes.borrow_mut().push(path.to_string());
        }

        fn refresh(&self) {
            self.refreshes.set(self.refreshes.get() + 1);
        }
    }

    impl Confirm for RecordingUi {
        fn confirm(&self, message: &str) -> bool {
            self.prompts.borrow_mut().push(message.to_string());
            !self.decline.get()
        }
    }

    /// In-memory store that records writes and can be made to fail or wait.
    #[derive(Default)]
    struct FakeStore {
        record: RefCell<Option<Species>>,
        updates: RefCell<Vec<(i64, SpeciesPayload, String)>>,
        deletes: RefCell<Vec<i64>>,
        fail_fetch: Cell<bool>,
        fail_update: Cell<bool>,
        fail_delete: Cell<bool>,
        gated: Cell<bool>,
        gate: Notify,
        names: RefCell<Vec<(String, String)>>,
        fail_names: Cell<bool>,
        name_lookups: Cell<usize>,
    }

    impl FakeStore {
        fn with(species: Species) -> Self {
            let store = Self::default();
            store.record.replace(Some(species));
            store
        }

        async fn wait_for_gate(&self) {
            if self.gated.get() {
                self.gate.notified().await;
            }
        }
    }

    impl SpeciesStore for FakeStore {
        async fn fetch_species(&self, id: i64) -> Result<Option<Species>> {
            if self.fail_fetch.get() {
                return Err(CatalogError::Remote("fetch failed".to_string()));
            }
            Ok(self.record.borrow().clone().filter(|s| s.id == id))
        }

        async fn update_species(&self, id: i64, payload: &SpeciesPayload, actor: &str) -> Result<Species> {
            self.updates.borrow_mut().push((id, payload.clone(), actor.to_string()));
            self.wait_for_gate().await;
            if self.fail_update.get() {
                return Err(CatalogError::Remote("write rejected".to_string()));
            }
            let stored = self
                .record
                .borrow()
                .as_ref()
                .map(|s| s.with_payload(payload.clone()))
                .ok_or(CatalogError::SpeciesNotFound(id))?;
            self.record.replace(Some(stored.clone()));
            Ok(stored)
        }

        async fn delete_species(&self, id: i64, _actor: &str) -> Result<()> {
            self.deletes.borrow_mut().push(id);
            self.wait_for_gate().await;
            if self.fail_delete.get() {
                return Err(CatalogError::Remote("delete rejected".to_string()));
            }
            self.record.replace(None);
            Ok(())
        }
    }

    impl ProfileDirectory for FakeStore {
        async fn display_name(&self, author: &str) -> Result<Option<String>> {
            self.name_lookups.set(self.name_lookups.get() + 1);
            if self.fail_names.get() {
                return Err(CatalogError::Remote("directory offline".to_string()));
            }
            Ok(self.names.borrow().iter().find(|(id, _)| id == author).map(|(_, n)| n.clone()))
        }
    }

    fn lion() -> Species {
        Species {
            id: 7,
            scientific_name: " Panthera leo ".to_string(),
            common_name: None,
            kingdom: Kingdom::Animalia,
            total_population: Some(20000),
            image: None,
            description: None,
            author: "u1".to_string(),
        }
    }

    fn dialog<'a>(
        store: &'a FakeStore,
        ui: &Rc<RecordingUi>,
        actor: &str,
    ) -> SpeciesDialog<&'a FakeStore, &'a FakeStore> {
        let host = Host::new(ui.clone(), ui.clone(), ui.clone());
        SpeciesDialog::new(store, store, host, Some(actor.to_string()))
    }

    #[tokio::test]
    async fn test_author_edits_population_and_submits() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        dialog.start_edit().unwrap();
        dialog.set_input(TOTAL_POPULATION, "25000").unwrap();
        let outcome = dialog.submit().await.unwrap();

        assert_eq!(outcome, Outcome::Applied);
        let updates = store.updates.borrow();
        assert_eq!(updates.len(), 1);
        let (id, payload, actor) = &updates[0];
        assert_eq!((*id, actor.as_str()), (7, "u1"));
        assert_eq!(payload.scientific_name, "Panthera leo");
        assert_eq!(payload.total_population, Some(25000));

        assert_eq!(dialog.state(), Some(SessionState::Viewing));
        assert_eq!(dialog.snapshot().unwrap().total_population, Some(25000));
        assert_eq!(dialog.draft(), None);
        assert_eq!(ui.severities(), vec![Severity::Success]);
        assert_eq!(ui.refreshes.get(), 1);
    }

    #[tokio::test]
    async fn test_non_author_can_only_view_details() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u2");
        dialog.mount(7).await;

        assert_eq!(
            dialog.affordances(),
            Affordances { edit: false, delete: false, view_details: true }
        );
        assert_eq!(dialog.start_edit(), Err(SessionError::NotAuthor));
        assert_eq!(dialog.delete().await, Err(SessionError::NotAuthor));
        assert!(ui.prompts.borrow().is_empty());

        dialog.view_details();
        assert_eq!(*ui.routes.borrow(), vec!["/species/7".to_string()]);
        assert_eq!(dialog.state(), Some(SessionState::Viewing));
    }

    #[tokio::test]
    async fn test_invalid_population_never_reaches_store() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        dialog.start_edit().unwrap();
        dialog.set_input(TOTAL_POPULATION, "-5").unwrap();
        let err = dialog.submit().await.unwrap_err();

        assert!(matches!(err, SessionError::Validation(e) if e.contains(TOTAL_POPULATION)));
        assert!(store.updates.borrow().is_empty());
        assert_eq!(dialog.state(), Some(SessionState::Editing));
        assert!(dialog.draft().unwrap().errors().contains(TOTAL_POPULATION));
        assert!(ui.notifications.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kingdom_never_reaches_store() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        dialog.start_edit().unwrap();
        dialog.set_input(KINGDOM, "Minerals").unwrap();
        let err = dialog.submit().await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(e) if e.contains(KINGDOM)));
        assert!(store.updates.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_keeps_draft_and_notifies() {
        let store = FakeStore::with(lion());
        store.fail_update.set(true);
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        dialog.start_edit().unwrap();
        dialog.set_input(TOTAL_POPULATION, "25000").unwrap();
        let outcome = dialog.submit().await.unwrap();

        assert_eq!(outcome, Outcome::Failed("write rejected".to_string()));
        assert_eq!(dialog.state(), Some(SessionState::Editing));
        assert_eq!(dialog.form_values().unwrap().get(TOTAL_POPULATION), "25000");
        assert_eq!(dialog.snapshot().unwrap(), lion());
        assert_eq!(ui.severities(), vec![Severity::Error]);
        assert_eq!(ui.refreshes.get(), 0);
    }

    #[tokio::test]
    async fn test_declined_cancel_keeps_editing() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        dialog.start_edit().unwrap();
        dialog.set_input(TOTAL_POPULATION, "3").unwrap();
        ui.decline.set(true);

        assert_eq!(dialog.cancel(), Ok(false));
        assert_eq!(dialog.state(), Some(SessionState::Editing));
        assert_eq!(dialog.form_values().unwrap().get(TOTAL_POPULATION), "3");

        ui.decline.set(false);
        assert_eq!(dialog.cancel(), Ok(true));
        assert!(dialog.is_read_only());
    }

    #[tokio::test]
    async fn test_confirmed_delete_forces_viewing_and_refreshes() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;
        dialog.start_edit().unwrap();

        let outcome = dialog.delete().await.unwrap();
        assert_eq!(outcome, Some(Outcome::Applied));
        assert_eq!(*store.deletes.borrow(), vec![7]);
        assert_eq!(dialog.state(), Some(SessionState::Viewing));
        assert_eq!(dialog.draft(), None);
        assert_eq!(ui.severities(), vec![Severity::Success]);
        assert_eq!(ui.refreshes.get(), 1);
        assert!(!dialog.affordances().edit);
    }

    #[tokio::test]
    async fn test_declined_delete_makes_no_call() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        ui.decline.set(true);
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        assert_eq!(dialog.delete().await, Ok(None));
        assert!(store.deletes.borrow().is_empty());
        assert_eq!(dialog.state(), Some(SessionState::Viewing));
    }

    #[tokio::test]
    async fn test_failed_delete_alerts_and_keeps_state() {
        let store = FakeStore::with(lion());
        store.fail_delete.set(true);
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;
        dialog.start_edit().unwrap();

        let outcome = dialog.delete().await.unwrap();
        assert!(matches!(outcome, Some(Outcome::Failed(_))));
        assert_eq!(dialog.state(), Some(SessionState::Editing));
        assert_eq!(ui.severities(), vec![Severity::Error]);
        assert_eq!(ui.refreshes.get(), 0);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let store = FakeStore::default();
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        assert!(dialog.is_not_found());
        assert!(ui.notifications.borrow().is_empty());
        assert_eq!(dialog.start_edit(), Err(SessionError::Unmounted));
        assert!(dialog.affordances().view_details);
    }

    #[tokio::test]
    async fn test_fetch_failure_notifies() {
        let store = FakeStore::with(lion());
        store.fail_fetch.set(true);
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        assert!(dialog.with_view(|v| matches!(v, RecordView::Unavailable)));
        assert_eq!(ui.severities(), vec![Severity::Error]);

        store.fail_fetch.set(false);
        dialog.load(7).await;
        assert_eq!(dialog.state(), Some(SessionState::Viewing));
    }

    #[tokio::test]
    async fn test_record_is_fetched_once_per_id() {
        let store = FakeStore::with(lion());
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.load(7).await;
        dialog.start_edit().unwrap();

        dialog.load(7).await;
        assert_eq!(dialog.state(), Some(SessionState::Editing));

        dialog.reload().await;
        assert_eq!(dialog.state(), Some(SessionState::Viewing));
    }

    #[tokio::test]
    async fn test_author_name_is_resolved_once() {
        let store = FakeStore::with(lion());
        store.names.borrow_mut().push(("u1".to_string(), "Ada".to_string()));
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u2");
        dialog.mount(7).await;
        dialog.resolve_author().await;

        assert_eq!(dialog.author_display_name().as_deref(), Some("Ada"));
        assert_eq!(store.name_lookups.get(), 1);
    }

    #[tokio::test]
    async fn test_author_lookup_failure_does_not_block_rendering() {
        let store = FakeStore::with(lion());
        store.fail_names.set(true);
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;

        assert_eq!(dialog.author_display_name(), None);
        assert_eq!(dialog.snapshot().unwrap(), lion());
        assert_eq!(ui.notifications.borrow()[0].title, "Could not load author");
        assert!(dialog.start_edit().is_ok());
    }

    #[tokio::test]
    async fn test_second_submit_is_refused_while_first_is_in_flight() {
        let store = FakeStore::with(lion());
        store.gated.set(true);
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;
        dialog.start_edit().unwrap();
        dialog.set_input(TOTAL_POPULATION, "25000").unwrap();

        let (first, second) = tokio::join!(dialog.submit(), async {
            let second = dialog.submit().await;
            assert_eq!(dialog.delete().await, Err(SessionError::Busy));
            store.gate.notify_one();
            second
        });

        assert_eq!(first, Ok(Outcome::Applied));
        assert_eq!(second, Err(SessionError::Busy));
        assert_eq!(store.updates.borrow().len(), 1);
        assert_eq!(dialog.snapshot().unwrap().total_population, Some(25000));
    }

    #[tokio::test]
    async fn test_response_after_unmount_is_ignored() {
        let store = FakeStore::with(lion());
        store.gated.set(true);
        let ui = Rc::new(RecordingUi::default());
        let dialog = dialog(&store, &ui, "u1");
        dialog.mount(7).await;
        dialog.start_edit().unwrap();
        dialog.set_input(TOTAL_POPULATION, "25000").unwrap();

        let (outcome, ()) = tokio::join!(dialog.submit(), async {
            dialog.unmount();
            store.gate.notify_one();
        });

        assert_eq!(outcome, Ok(Outcome::Stale));
        assert!(ui.notifications.borrow().is_empty());
        assert_eq!(ui.refreshes.get(), 0);
        assert_eq!(dialog.snapshot().unwrap().total_population, Some(20000));
    }

    #[tokio::test]
    async fn test_works_against_sqlite_catalog() {
        let catalog = Catalog::in_memory().unwrap();
        catalog.upsert_profile("u1", "Ada").unwrap();
        let mut draft = Draft::default();
        draft.set(crate::core::schema::SCIENTIFIC_NAME, FieldValue::from("Panthera leo"));
        draft.set(KINGDOM, FieldValue::from("Animalia"));
        let created = catalog.create_species(&draft, "u1").unwrap();

        let ui = Rc::new(RecordingUi::default());
        let host = Host::new(ui.clone(), ui.clone(), ui.clone());
        let settings = CatalogSettings {
            detail_route_prefix: "/catalog/species/".to_string(),
            ..CatalogSettings::default()
        };
        let dialog = SpeciesDialog::new(&catalog, &catalog, host, Some("u1".to_string()))
            .with_settings(&settings);
        dialog.mount(created.id).await;
        assert_eq!(dialog.author_display_name().as_deref(), Some("Ada"));

        dialog.start_edit().unwrap();
        dialog.set_input("common_name", "  Lion ").unwrap();
        assert_eq!(dialog.submit().await, Ok(Outcome::Applied));
        assert_eq!(catalog.get_species(created.id).unwrap().common_name.as_deref(), Some("Lion"));

        dialog.view_details();
        assert_eq!(*ui.routes.borrow(), vec![format!("/catalog/species/{}", created.id)]);

        assert_eq!(dialog.delete().await, Ok(Some(Outcome::Applied)));
        assert_eq!(catalog.find_species(created.id).unwrap(), None);
    }
}
