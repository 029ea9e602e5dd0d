use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted country name, person name or country reference.
pub const MAX_NAME_LEN: usize = 255;
/// Longest accepted country code.
pub const MAX_CODE_LEN: usize = 16;
/// Longest accepted email address.
pub const MAX_EMAIL_LEN: usize = 320;

/// A country, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// Short country code (e.g. "FR")
    pub code: String,
    pub population: Option<i64>,
}

impl Country {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            population: None,
        }
    }

    pub fn with_population(mut self, population: i64) -> Self {
        self.population = Some(population);
        self
    }

    /// Check required fields. Names and codes are compared as given, so
    /// surrounding whitespace counts as blank.
    pub fn validate(&self) -> Result<(), AppError> {
        require("name", &self.name, MAX_NAME_LEN)?;
        require("code", &self.code, MAX_CODE_LEN)?;
        if let Some(population) = self.population
            && population < 0
        {
            return Err(AppError::ValidationError(format!(
                "population must not be negative (got {population})"
            )));
        }
        Ok(())
    }
}

/// A stored person. The `id` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Name of the country this person belongs to.
    pub country: String,
}

/// Person fields supplied by a caller on create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub country: String,
}

impl PersonDraft {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            birth_date: None,
            country: country.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        require("first_name", &self.first_name, MAX_NAME_LEN)?;
        require("last_name", &self.last_name, MAX_NAME_LEN)?;
        require("country", &self.country, MAX_NAME_LEN)?;
        if let Some(email) = &self.email {
            at_most("email", email, MAX_EMAIL_LEN)?;
        }
        Ok(())
    }

    pub fn into_person(self, id: i64) -> Person {
        Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            birth_date: self.birth_date,
            country: self.country,
        }
    }
}

fn require(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    at_most(field, value, max)
}

/// Lengths count characters, like the `VARCHAR(n)` columns they guard.
fn at_most(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {max} characters (got {len})"
        )));
    }
    Ok(())
}
