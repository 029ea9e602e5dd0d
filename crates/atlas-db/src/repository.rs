use atlas_core::error::AppError;
use atlas_core::models::{Country, Person, PersonDraft};
use atlas_core::traits::{CountryStore, PersonStore};
use chrono::NaiveDate;
use sqlx::{PgPool, Pool, Postgres};

/// SQLSTATE for a value longer than its `VARCHAR(n)` column.
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// Map a sqlx error. Over-long values are the caller's fault, everything
/// else is a database failure.
fn query_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some(STRING_DATA_RIGHT_TRUNCATION) =>
        {
            AppError::ValidationError(db.message().to_string())
        }
        _ => {
            tracing::debug!(error = %e, "Query failed");
            AppError::DatabaseError(e.to_string())
        }
    }
}

/// Like [`query_error`], with unique violations turned into conflicts.
fn db_error(e: sqlx::Error, conflict: impl FnOnce() -> String) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(conflict()),
        _ => query_error(e),
    }
}

/// Repository for country persistence in PostgreSQL.
#[derive(Clone)]
pub struct CountryRepository {
    pool: Pool<Postgres>,
}

impl CountryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CountryRow {
    name: String,
    code: String,
    population: Option<i64>,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Country {
            name: row.name,
            code: row.code,
            population: row.population,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PersonRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
    birth_date: Option<NaiveDate>,
    country: String,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            birth_date: row.birth_date,
            country: row.country,
        }
    }
}

impl CountryStore for CountryRepository {
    async fn list(&self) -> Result<Vec<Country>, AppError> {
        let rows = sqlx::query_as::<_, CountryRow>(
            r#"SELECT name, code, population FROM countries ORDER BY name"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        tracing::debug!(rows = rows.len(), "Fetched countries");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, name: &str) -> Result<Option<Country>, AppError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r#"SELECT name, code, population FROM countries WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, country: &Country) -> Result<Country, AppError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r#"
            INSERT INTO countries (name, code, population)
            VALUES ($1, $2, $3)
            RETURNING name, code, population
            "#,
        )
        .bind(&country.name)
        .bind(&country.code)
        .bind(country.population)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error(e, || format!("Country already exists: {}", country.name)))?;

        Ok(row.into())
    }

    async fn update(&self, name: &str, country: &Country) -> Result<Option<Country>, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error)?;

        let row = sqlx::query_as::<_, CountryRow>(
            r#"
            UPDATE countries
            SET name = $2, code = $3, population = $4
            WHERE name = $1
            RETURNING name, code, population
            "#,
        )
        .bind(name)
        .bind(&country.name)
        .bind(&country.code)
        .bind(country.population)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error(e, || format!("Country already exists: {}", country.name)))?;

        // Renames carry their persons along.
        if row.is_some() && country.name != name {
            let moved = sqlx::query(r#"UPDATE persons SET country = $2 WHERE country = $1"#)
                .bind(name)
                .bind(&country.name)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?
                .rows_affected();
            tracing::debug!(
                from = %name,
                to = %country.name,
                persons = moved,
                "Moved persons to renamed country"
            );
        }

        tx.commit()
            .await
            .map_err(query_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error)?;

        let exists = sqlx::query(r#"SELECT 1 FROM countries WHERE name = $1 FOR UPDATE"#)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?
            .is_some();
        if !exists {
            return Ok(false);
        }

        let (referenced,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM persons WHERE country = $1)"#)
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(query_error)?;
        if referenced {
            tracing::debug!(country = %name, "Delete refused, country still referenced");
            return Err(AppError::Conflict(format!(
                "Cannot delete country {name}: persons still reference it"
            )));
        }

        sqlx::query(r#"DELETE FROM countries WHERE name = $1"#)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit()
            .await
            .map_err(query_error)?;

        Ok(true)
    }
}

/// Repository for person persistence in PostgreSQL.
#[derive(Clone)]
pub struct PersonRepository {
    pool: Pool<Postgres>,
}

impl PersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PersonStore for PersonRepository {
    async fn list(&self) -> Result<Vec<Person>, AppError> {
        let rows = sqlx::query_as::<_, PersonRow>(
            r#"
            SELECT id, first_name, last_name, email, birth_date, country
            FROM persons
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        tracing::debug!(rows = rows.len(), "Fetched persons");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Person>, AppError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r#"
            SELECT id, first_name, last_name, email, birth_date, country
            FROM persons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, person: &PersonDraft) -> Result<Person, AppError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r#"
            INSERT INTO persons (first_name, last_name, email, birth_date, country)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, birth_date, country
            "#,
        )
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(&person.email)
        .bind(person.birth_date)
        .bind(&person.country)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        tracing::debug!(person_id = row.id, "Inserted person row");
        Ok(row.into())
    }

    async fn update(&self, id: i64, person: &PersonDraft) -> Result<Option<Person>, AppError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r#"
            UPDATE persons
            SET first_name = $2, last_name = $3, email = $4, birth_date = $5, country = $6
            WHERE id = $1
            RETURNING id, first_name, last_name, email, birth_date, country
            "#,
        )
        .bind(id)
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(&person.email)
        .bind(person.birth_date)
        .bind(&person.country)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM persons WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }
}
