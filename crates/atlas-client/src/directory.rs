use atlas_core::{AppError, Country, CountryDirectory};

use crate::remote::RemoteClient;

/// [`CountryDirectory`] backed by the remote service's `GET /countries/{name}`.
///
/// 200 means the country exists and 404 that it does not; anything else
/// is an error. The caller's bearer token is relayed.
#[derive(Clone)]
pub struct RemoteCountryDirectory {
    client: RemoteClient,
}

impl RemoteCountryDirectory {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

impl CountryDirectory for RemoteCountryDirectory {
    async fn country_exists(&self, name: &str, bearer: Option<&str>) -> Result<bool, AppError> {
        let country: Option<Country> = self.client.get_json(&["countries", name], bearer).await?;
        tracing::debug!(country = %name, found = country.is_some(), "Remote country lookup");
        Ok(country.is_some())
    }
}
