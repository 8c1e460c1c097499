//! High-level record operations over a species catalog SQLite database.

use crate::{
    CatalogError, CatalogSettings, Draft, Kingdom, Operation, OperationLog, OperationSummary,
    ProfileDirectory, PurgeStrategy, Result, Species, SpeciesPayload, SpeciesSchema, SpeciesStore,
    Storage,
};
use rusqlite::types::Type;
use rusqlite::OptionalExtension;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SPECIES_COLUMNS: &str =
    "id, scientific_name, common_name, kingdom, total_population, image, description, author";

/// An open species catalog backed by a SQLite database.
///
/// `Catalog` implements [`SpeciesStore`] and [`ProfileDirectory`], and is the
/// authority on ownership: updates and deletes by anyone other than a record's
/// author are rejected with [`CatalogError::NotAuthorized`]. Every mutation
/// is appended to the operation log in the same transaction.
pub struct Catalog {
    storage: Mutex<Storage>,
    operation_log: OperationLog,
    schema: SpeciesSchema,
}

impl Catalog {
    /// Creates a new catalog database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] for any SQLite failure.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_storage(Storage::create(path)?))
    }

    /// Opens an existing catalog database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCatalog`] if the file is not a catalog.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_storage(Storage::open(path)?))
    }

    /// Opens the catalog named by `settings`, creating it if the file does not exist yet.
    pub fn open_with_settings(settings: &CatalogSettings) -> Result<Self> {
        let path = Path::new(&settings.database_path);
        let catalog = if path.exists() {
            Self::open(path)?
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Self::create(path)?
        };
        Ok(catalog.with_purge_strategy(settings.purge_strategy()))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_storage(Storage::in_memory()?))
    }

    fn from_storage(storage: Storage) -> Self {
        Self {
            storage: Mutex::new(storage),
            operation_log: OperationLog::new(PurgeStrategy::LocalOnly { keep_last: 1000 }),
            schema: SpeciesSchema::species(),
        }
    }

    pub fn with_purge_strategy(mut self, strategy: PurgeStrategy) -> Self {
        self.operation_log = OperationLog::new(strategy);
        self
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| CatalogError::InvalidCatalog("catalog lock poisoned".to_string()))
    }

    /// Validates `draft` and inserts it as a new record owned by `author`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ValidationFailed`] if the draft does not pass
    /// the species schema, or [`CatalogError::Database`] for SQLite failures.
    pub fn create_species(&self, draft: &Draft, author: &str) -> Result<Species> {
        let payload = self.schema.validate(draft).map_err(CatalogError::ValidationFailed)?;
        let now = chrono::Utc::now().timestamp();

        let mut storage = self.storage()?;
        let tx = storage.connection_mut().transaction()?;
        tx.execute(
            "INSERT INTO species (scientific_name, common_name, kingdom, total_population,
                                  image, description, author, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            rusqlite::params![
                payload.scientific_name,
                payload.common_name,
                payload.kingdom.as_str(),
                payload.total_population,
                payload.image,
                payload.description,
                author,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();

        self.operation_log.log(
            &tx,
            &Operation::CreateSpecies {
                operation_id: Uuid::new_v4().to_string(),
                timestamp: now,
                actor: author.to_string(),
                species_id: id,
                payload: payload.clone(),
            },
        )?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        log::info!("created species {id} ({}) for {author}", payload.scientific_name);
        Ok(Species {
            id,
            scientific_name: payload.scientific_name,
            common_name: payload.common_name,
            kingdom: payload.kingdom,
            total_population: payload.total_population,
            image: payload.image,
            description: payload.description,
            author: author.to_string(),
        })
    }

    /// Fetches a single species by ID, or `None` if it does not exist.
    pub fn find_species(&self, id: i64) -> Result<Option<Species>> {
        let storage = self.storage()?;
        let species = storage
            .connection()
            .query_row(
                &format!("SELECT {SPECIES_COLUMNS} FROM species WHERE id = ?1"),
                [id],
                map_species_row,
            )
            .optional()?;
        Ok(species)
    }

    /// Fetches a single species by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SpeciesNotFound`] if no such record exists.
    pub fn get_species(&self, id: i64) -> Result<Species> {
        self.find_species(id)?.ok_or(CatalogError::SpeciesNotFound(id))
    }

    /// All species ordered by scientific name.
    pub fn list_species(&self) -> Result<Vec<Species>> {
        let storage = self.storage()?;
        let mut stmt = storage
            .connection()
            .prepare(&format!("SELECT {SPECIES_COLUMNS} FROM species ORDER BY scientific_name, id"))?;
        let species = stmt
            .query_map([], map_species_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(species)
    }

    /// Replaces the editable fields of `id`, refreshing `modified_at`.
    ///
    /// The record's `id` and `author` are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SpeciesNotFound`] if no record with `id`
    /// exists, [`CatalogError::NotAuthorized`] if `actor` is not its author,
    /// or [`CatalogError::Database`] for any other SQLite failure. The
    /// transaction is rolled back on any failure.
    pub fn update_species(&self, id: i64, payload: &SpeciesPayload, actor: &str) -> Result<Species> {
        let now = chrono::Utc::now().timestamp();
        {
            let mut storage = self.storage()?;
            let tx = storage.connection_mut().transaction()?;
            check_owner(&tx, id, actor)?;

            tx.execute(
                "UPDATE species SET scientific_name = ?1, common_name = ?2, kingdom = ?3,
                        total_population = ?4, image = ?5, description = ?6, modified_at = ?7
                 WHERE id = ?8",
                rusqlite::params![
                    payload.scientific_name,
                    payload.common_name,
                    payload.kingdom.as_str(),
                    payload.total_population,
                    payload.image,
                    payload.description,
                    now,
                    id,
                ],
            )?;

            self.operation_log.log(
                &tx,
                &Operation::UpdateSpecies {
                    operation_id: Uuid::new_v4().to_string(),
                    timestamp: now,
                    actor: actor.to_string(),
                    species_id: id,
                    payload: payload.clone(),
                },
            )?;
            self.operation_log.purge_if_needed(&tx)?;
            tx.commit()?;
        }

        log::info!("updated species {id} as {actor}");
        self.get_species(id)
    }

    /// Removes `id` from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SpeciesNotFound`] if no record with `id`
    /// exists, or [`CatalogError::NotAuthorized`] if `actor` is not its author.
    pub fn delete_species(&self, id: i64, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut storage = self.storage()?;
        let tx = storage.connection_mut().transaction()?;
        check_owner(&tx, id, actor)?;

        tx.execute("DELETE FROM species WHERE id = ?1", [id])?;

        self.operation_log.log(
            &tx,
            &Operation::DeleteSpecies {
                operation_id: Uuid::new_v4().to_string(),
                timestamp: now,
                actor: actor.to_string(),
                species_id: id,
            },
        )?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        log::info!("deleted species {id} as {actor}");
        Ok(())
    }

    /// Creates or renames the profile for `author`.
    pub fn upsert_profile(&self, author: &str, display_name: &str) -> Result<()> {
        let storage = self.storage()?;
        storage.connection().execute(
            "INSERT INTO profiles (id, display_name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name",
            [author, display_name],
        )?;
        Ok(())
    }

    /// The display name of `author`, or `None` without a profile.
    pub fn find_display_name(&self, author: &str) -> Result<Option<String>> {
        let storage = self.storage()?;
        let name = storage
            .connection()
            .query_row("SELECT display_name FROM profiles WHERE id = ?1", [author], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(name)
    }

    /// Logged operations, most recent first, optionally for one species.
    pub fn list_operations(&self, species_id: Option<i64>) -> Result<Vec<Operation>> {
        let storage = self.storage()?;
        self.operation_log.list(storage.connection(), species_id)
    }

    pub fn operation_summaries(&self) -> Result<Vec<OperationSummary>> {
        let storage = self.storage()?;
        self.operation_log.summaries(storage.connection())
    }
}

impl SpeciesStore for Catalog {
    async fn fetch_species(&self, id: i64) -> Result<Option<Species>> {
        self.find_species(id)
    }

    async fn update_species(&self, id: i64, payload: &SpeciesPayload, actor: &str) -> Result<Species> {
        Catalog::update_species(self, id, payload, actor)
    }

    async fn delete_species(&self, id: i64, actor: &str) -> Result<()> {
        Catalog::delete_species(self, id, actor)
    }
}

impl ProfileDirectory for Catalog {
    async fn display_name(&self, author: &str) -> Result<Option<String>> {
        self.find_display_name(author)
    }
}

/// Fails unless `id` exists and is owned by `actor`.
fn check_owner(tx: &rusqlite::Transaction, id: i64, actor: &str) -> Result<()> {
    let author: Option<String> = tx
        .query_row("SELECT author FROM species WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    match author {
        None => Err(CatalogError::SpeciesNotFound(id)),
        Some(author) if author != actor => {
            log::warn!("rejected write to species {id}: {actor} is not the author");
            Err(CatalogError::NotAuthorized(id))
        }
        Some(_) => Ok(()),
    }
}

fn map_species_row(row: &rusqlite::Row) -> rusqlite::Result<Species> {
    let kingdom_text: String = row.get(3)?;
    let kingdom = kingdom_text
        .parse::<Kingdom>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;
    Ok(Species {
        id: row.get(0)?,
        scientific_name: row.get(1)?,
        common_name: row.get(2)?,
        kingdom,
        total_population: row.get(4)?,
        image: row.get(5)?,
        description: row.get(6)?,
        author: row.get(7)?,
    })
}
