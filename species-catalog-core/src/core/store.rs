//! Contracts for the record store and the profile directory.
//!
//! Both are consumed by [`SpeciesDialog`](crate::SpeciesDialog). The store is
//! the authority on who may write: it must reject updates and deletes from an
//! actor that does not own the record, whatever the UI offered.
//! [`Catalog`](crate::Catalog) implements both traits over SQLite.

#![allow(async_fn_in_trait)]

use crate::{Result, Species, SpeciesPayload};
use std::rc::Rc;

/// Row-level access to the `species` table, keyed by record ID.
pub trait SpeciesStore {
    /// Fetches one record. `Ok(None)` means the record does not exist.
    async fn fetch_species(&self, id: i64) -> Result<Option<Species>>;

    /// Replaces the editable fields of `id` with `payload`, acting as `actor`,
    /// and returns the stored record.
    async fn update_species(&self, id: i64, payload: &SpeciesPayload, actor: &str) -> Result<Species>;

    /// Removes `id`, acting as `actor`.
    async fn delete_species(&self, id: i64, actor: &str) -> Result<()>;
}

/// Lookup of human-readable names in the identity/profile collection.
pub trait ProfileDirectory {
    /// `Ok(None)` means the author has no profile.
    async fn display_name(&self, author: &str) -> Result<Option<String>>;
}

macro_rules! forward_store {
    ($($ptr:ty),*) => {$(
        impl<T: SpeciesStore + ?Sized> SpeciesStore for $ptr {
            async fn fetch_species(&self, id: i64) -> Result<Option<Species>> {
                (**self).fetch_species(id).await
            }

            async fn update_species(&self, id: i64, payload: &SpeciesPayload, actor: &str) -> Result<Species> {
                (**self).update_species(id, payload, actor).await
            }

            async fn delete_species(&self, id: i64, actor: &str) -> Result<()> {
                (**self).delete_species(id, actor).await
            }
        }

        impl<T: ProfileDirectory + ?Sized> ProfileDirectory for $ptr {
            async fn display_name(&self, author: &str) -> Result<Option<String>> {
                (**self).display_name(author).await
            }
        }
    )*};
}

forward_store!(&T, Rc<T>);
