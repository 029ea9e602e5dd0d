use std::future::Future;

use crate::error::AppError;
use crate::models::{Country, Person, PersonDraft};

/// Persists countries, keyed by name.
pub trait CountryStore: Send + Sync + Clone {
    /// All countries, ordered by name.
    fn list(&self) -> impl Future<Output = Result<Vec<Country>, AppError>> + Send;

    fn get(&self, name: &str) -> impl Future<Output = Result<Option<Country>, AppError>> + Send;

    /// Insert a new country. Fails with `Conflict` if the name is taken.
    fn insert(&self, country: &Country) -> impl Future<Output = Result<Country, AppError>> + Send;

    /// Replace the country stored under `name`. Returns `None` if it does not exist.
    fn update(
        &self,
        name: &str,
        country: &Country,
    ) -> impl Future<Output = Result<Option<Country>, AppError>> + Send;

    /// Remove a country. Returns false if it did not exist, `Conflict` if
    /// persons still reference it.
    fn delete(&self, name: &str) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Persists persons, keyed by a store-assigned numeric id.
pub trait PersonStore: Send + Sync + Clone {
    /// All persons, ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<Person>, AppError>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<Option<Person>, AppError>> + Send;

    fn insert(&self, person: &PersonDraft) -> impl Future<Output = Result<Person, AppError>> + Send;

    fn update(
        &self,
        id: i64,
        person: &PersonDraft,
    ) -> impl Future<Output = Result<Option<Person>, AppError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Answers whether a country is known, locally or through a remote service.
pub trait CountryDirectory: Send + Sync + Clone {
    /// `bearer` is the caller's raw access token, relayed when the lookup
    /// leaves the process.
    fn country_exists(
        &self,
        name: &str,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}
