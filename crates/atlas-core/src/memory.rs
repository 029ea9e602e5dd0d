//! In-memory stores, used when no database is configured and in tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{Country, Person, PersonDraft};
use crate::traits::{CountryDirectory, CountryStore, PersonStore};

#[derive(Default)]
struct State {
    countries: BTreeMap<String, Country>,
    persons: BTreeMap<i64, Person>,
    last_person_id: i64,
}

/// Country and person store backed by ordered maps behind one lock, so
/// cross-resource checks (a country still referenced by persons) are atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CountryStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Country>, AppError> {
        let state = self.state.read().await;
        Ok(state.countries.values().cloned().collect())
    }

    async fn get(&self, name: &str) -> Result<Option<Country>, AppError> {
        let state = self.state.read().await;
        Ok(state.countries.get(name).cloned())
    }

    async fn insert(&self, country: &Country) -> Result<Country, AppError> {
        let mut state = self.state.write().await;
        if state.countries.contains_key(&country.name) {
            return Err(AppError::Conflict(format!(
                "Country already exists: {}",
                country.name
            )));
        }
        state
            .countries
            .insert(country.name.clone(), country.clone());
        Ok(country.clone())
    }

    async fn update(&self, name: &str, country: &Country) -> Result<Option<Country>, AppError> {
        let mut state = self.state.write().await;
        if !state.countries.contains_key(name) {
            return Ok(None);
        }
        if country.name != name && state.countries.contains_key(&country.name) {
            return Err(AppError::Conflict(format!(
                "Country already exists: {}",
                country.name
            )));
        }

        state.countries.remove(name);
        state
            .countries
            .insert(country.name.clone(), country.clone());

        // Renames carry their persons along.
        if country.name != name {
            for person in state.persons.values_mut() {
                if person.country == name {
                    person.country = country.name.clone();
                }
            }
        }
        Ok(Some(country.clone()))
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        if !state.countries.contains_key(name) {
            return Ok(false);
        }
        if state.persons.values().any(|p| p.country == name) {
            return Err(AppError::Conflict(format!(
                "Cannot delete country {name}: persons still reference it"
            )));
        }
        state.countries.remove(name);
        Ok(true)
    }
}

impl PersonStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Person>, AppError> {
        let state = self.state.read().await;
        Ok(state.persons.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Person>, AppError> {
        let state = self.state.read().await;
        Ok(state.persons.get(&id).cloned())
    }

    async fn insert(&self, person: &PersonDraft) -> Result<Person, AppError> {
        let mut state = self.state.write().await;
        state.last_person_id += 1;
        let person = person.clone().into_person(state.last_person_id);
        state.persons.insert(person.id, person.clone());
        Ok(person)
    }

    async fn update(&self, id: i64, person: &PersonDraft) -> Result<Option<Person>, AppError> {
        let mut state = self.state.write().await;
        match state.persons.get_mut(&id) {
            Some(existing) => {
                *existing = person.clone().into_person(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(state.persons.remove(&id).is_some())
    }
}

/// [`CountryDirectory`] answered by a local [`CountryStore`]. The bearer
/// token is not needed and ignored.
#[derive(Clone)]
pub struct LocalCountryDirectory<S: CountryStore> {
    store: S,
}

impl<S: CountryStore> LocalCountryDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: CountryStore> CountryDirectory for LocalCountryDirectory<S> {
    async fn country_exists(&self, name: &str, _bearer: Option<&str>) -> Result<bool, AppError> {
        Ok(self.store.get(name).await?.is_some())
    }
}
