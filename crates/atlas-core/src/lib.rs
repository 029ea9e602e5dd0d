pub mod error;
pub mod memory;
pub mod models;
pub mod principal;
pub mod service;
pub mod traits;

pub use error::AppError;
pub use memory::{InMemoryStore, LocalCountryDirectory};
pub use models::{Country, Person, PersonDraft};
pub use principal::{Authentication, Authority, BearerToken, User};
pub use service::{CountryService, PersonService};
pub use traits::{CountryDirectory, CountryStore, PersonStore};
