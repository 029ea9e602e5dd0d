use atlas_client::RemoteCountryDirectory;
use atlas_core::models::{Country, Person, PersonDraft};
use atlas_core::traits::{CountryDirectory, CountryStore, PersonStore};
use atlas_core::{AppError, CountryService, InMemoryStore, LocalCountryDirectory, PersonService};
use atlas_db::Database;

use crate::auth::JwtVerifier;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub countries: CountryService<Storage>,
    pub persons: PersonService<Storage, CountryLookup>,
    pub storage: Storage,
    pub verifier: JwtVerifier,
    /// Role required for country writes.
    pub admin_role: String,
}

impl AppState {
    pub fn new(
        storage: Storage,
        lookup: CountryLookup,
        verifier: JwtVerifier,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            countries: CountryService::new(storage.clone()),
            persons: PersonService::new(storage.clone(), lookup),
            storage,
            verifier,
            admin_role: admin_role.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Backing store for countries and persons.
#[derive(Clone)]
pub enum Storage {
    Postgres(Database),
    Memory(InMemoryStore),
}

impl Storage {
    pub fn kind(&self) -> &'static str {
        match self {
            Storage::Postgres(_) => "postgres",
            Storage::Memory(_) => "memory",
        }
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        match self {
            Storage::Postgres(db) => db.health_check().await,
            Storage::Memory(_) => Ok(()),
        }
    }
}

impl CountryStore for Storage {
    async fn list(&self) -> Result<Vec<Country>, AppError> {
        match self {
            Storage::Postgres(db) => db.country_repo().list().await,
            Storage::Memory(store) => CountryStore::list(store).await,
        }
    }

    async fn get(&self, name: &str) -> Result<Option<Country>, AppError> {
        match self {
            Storage::Postgres(db) => db.country_repo().get(name).await,
            Storage::Memory(store) => CountryStore::get(store, name).await,
        }
    }

    async fn insert(&self, country: &Country) -> Result<Country, AppError> {
        match self {
            Storage::Postgres(db) => db.country_repo().insert(country).await,
            Storage::Memory(store) => CountryStore::insert(store, country).await,
        }
    }

    async fn update(&self, name: &str, country: &Country) -> Result<Option<Country>, AppError> {
        match self {
            Storage::Postgres(db) => db.country_repo().update(name, country).await,
            Storage::Memory(store) => CountryStore::update(store, name, country).await,
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        match self {
            Storage::Postgres(db) => db.country_repo().delete(name).await,
            Storage::Memory(store) => CountryStore::delete(store, name).await,
        }
    }
}

impl PersonStore for Storage {
    async fn list(&self) -> Result<Vec<Person>, AppError> {
        match self {
            Storage::Postgres(db) => db.person_repo().list().await,
            Storage::Memory(store) => PersonStore::list(store).await,
        }
    }

    async fn get(&self, id: i64) -> Result<Option<Person>, AppError> {
        match self {
            Storage::Postgres(db) => db.person_repo().get(id).await,
            Storage::Memory(store) => PersonStore::get(store, id).await,
        }
    }

    async fn insert(&self, person: &PersonDraft) -> Result<Person, AppError> {
        match self {
            Storage::Postgres(db) => db.person_repo().insert(person).await,
            Storage::Memory(store) => PersonStore::insert(store, person).await,
        }
    }

    async fn update(&self, id: i64, person: &PersonDraft) -> Result<Option<Person>, AppError> {
        match self {
            Storage::Postgres(db) => db.person_repo().update(id, person).await,
            Storage::Memory(store) => PersonStore::update(store, id, person).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        match self {
            Storage::Postgres(db) => db.person_repo().delete(id).await,
            Storage::Memory(store) => PersonStore::delete(store, id).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Country lookup
// ---------------------------------------------------------------------------

/// Where person writes check that their country exists: the local store, or
/// a remote service called with the caller's bearer token.
#[derive(Clone)]
pub enum CountryLookup {
    Local(LocalCountryDirectory<Storage>),
    Remote(RemoteCountryDirectory),
}

impl CountryLookup {
    pub fn local(storage: &Storage) -> Self {
        CountryLookup::Local(LocalCountryDirectory::new(storage.clone()))
    }
}

impl CountryDirectory for CountryLookup {
    async fn country_exists(&self, name: &str, bearer: Option<&str>) -> Result<bool, AppError> {
        match self {
            CountryLookup::Local(local) => local.country_exists(name, bearer).await,
            CountryLookup::Remote(remote) => remote.country_exists(name, bearer).await,
        }
    }
}
