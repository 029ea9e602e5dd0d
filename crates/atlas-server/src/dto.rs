use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use atlas_core::models::{Country, Person, PersonDraft};

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

/// Country as sent and returned by the API.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CountryBody {
    #[schema(example = "France")]
    pub name: String,
    #[schema(example = "FR")]
    pub code: String,
    #[schema(minimum = 0)]
    pub population: Option<i64>,
}

impl From<Country> for CountryBody {
    fn from(country: Country) -> Self {
        Self {
            name: country.name,
            code: country.code,
            population: country.population,
        }
    }
}

impl From<CountryBody> for Country {
    fn from(body: CountryBody) -> Self {
        Self {
            name: body.name,
            code: body.code,
            population: body.population,
        }
    }
}

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PersonRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Name of an existing country.
    pub country: String,
}

impl From<PersonRequest> for PersonDraft {
    fn from(body: PersonRequest) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            birth_date: body.birth_date,
            country: body.country,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PersonResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub country: String,
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            first_name: person.first_name,
            last_name: person.last_name,
            email: person.email,
            birth_date: person.birth_date,
            country: person.country,
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `UP` or `DOWN`.
    pub status: &'static str,
    /// Storage backend in use: `postgres` or `memory`.
    pub storage: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
