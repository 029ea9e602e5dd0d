use crate::error::AppError;
use crate::models::{Country, Person, PersonDraft};
use crate::traits::{CountryDirectory, CountryStore, PersonStore};

/// Country business rules on top of a [`CountryStore`].
#[derive(Clone)]
pub struct CountryService<S: CountryStore> {
    store: S,
}

impl<S: CountryStore> CountryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get_countries(&self) -> Result<Vec<Country>, AppError> {
        let countries = self.store.list().await?;
        tracing::debug!(count = countries.len(), "Listed countries");
        Ok(countries)
    }

    pub async fn get_country(&self, name: &str) -> Result<Country, AppError> {
        self.store
            .get(name)
            .await?
            .ok_or_else(|| country_not_found(name))
    }

    pub async fn create_country(&self, country: Country) -> Result<Country, AppError> {
        country.validate()?;
        if self.store.get(&country.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Country already exists: {}",
                country.name
            )));
        }

        let created = self.store.insert(&country).await?;
        tracing::info!(country = %created.name, "Country created");
        Ok(created)
    }

    pub async fn update_country(&self, name: &str, country: Country) -> Result<Country, AppError> {
        country.validate()?;
        if country.name != name && self.store.get(&country.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Cannot rename {name}: country already exists: {}",
                country.name
            )));
        }

        let updated = self
            .store
            .update(name, &country)
            .await?
            .ok_or_else(|| country_not_found(name))?;
        tracing::info!(country = %name, "Country updated");
        Ok(updated)
    }

    pub async fn delete_country(&self, name: &str) -> Result<(), AppError> {
        if !self.store.delete(name).await? {
            return Err(country_not_found(name));
        }
        tracing::info!(country = %name, "Country deleted");
        Ok(())
    }
}

/// Person business rules. Every write checks the referenced country
/// through a [`CountryDirectory`].
///
/// The country check and the person write are two separate steps. The
/// directory may be a remote service, so no lock or transaction spans both:
/// a `delete_country` that lands between them succeeds and leaves the new
/// person pointing at a missing country. Country deletes still refuse while
/// stored persons reference the country, so this only affects writes that
/// race the delete.
#[derive(Clone)]
pub struct PersonService<P: PersonStore, D: CountryDirectory> {
    store: P,
    countries: D,
}

impl<P: PersonStore, D: CountryDirectory> PersonService<P, D> {
    pub fn new(store: P, countries: D) -> Self {
        Self { store, countries }
    }

    pub async fn get_persons(&self) -> Result<Vec<Person>, AppError> {
        let persons = self.store.list().await?;
        tracing::debug!(count = persons.len(), "Listed persons");
        Ok(persons)
    }

    pub async fn get_person(&self, id: i64) -> Result<Person, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| person_not_found(id))
    }

    pub async fn create_person(
        &self,
        person: PersonDraft,
        bearer: Option<&str>,
    ) -> Result<Person, AppError> {
        person.validate()?;
        self.require_country(&person.country, bearer).await?;

        let created = self.store.insert(&person).await?;
        tracing::info!(person_id = created.id, "Person created");
        Ok(created)
    }

    pub async fn update_person(
        &self,
        id: i64,
        person: PersonDraft,
        bearer: Option<&str>,
    ) -> Result<Person, AppError> {
        person.validate()?;
        self.require_country(&person.country, bearer).await?;

        let updated = self
            .store
            .update(id, &person)
            .await?
            .ok_or_else(|| person_not_found(id))?;
        tracing::info!(person_id = id, "Person updated");
        Ok(updated)
    }

    pub async fn delete_person(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(person_not_found(id));
        }
        tracing::info!(person_id = id, "Person deleted");
        Ok(())
    }

    async fn require_country(&self, name: &str, bearer: Option<&str>) -> Result<(), AppError> {
        if self.countries.country_exists(name, bearer).await? {
            Ok(())
        } else {
            Err(country_not_found(name))
        }
    }
}

fn country_not_found(name: &str) -> AppError {
    AppError::NotFound(format!("Country not found: {name}"))
}

fn person_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Person not found: {id}"))
}
