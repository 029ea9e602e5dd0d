use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use atlas_core::AppError;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::tls::TlsMaterial;

/// HTTP client for the remote service.
///
/// Every request carries `Content-Type: application/json`, the configured
/// timeouts, and (when a key store is configured) a client certificate.
/// With several base URLs, requests rotate across them round-robin. The
/// caller's bearer token, if given, is relayed on the outbound request.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    urls: Arc<[Url]>,
    next: Arc<AtomicUsize>,
    timeout_secs: u64,
}

impl RemoteClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        if config.urls.is_empty() {
            return Err(AppError::ConfigError(
                "Remote client needs at least one base URL".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .user_agent(concat!("atlas/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .timeout(config.write_timeout);

        if let Some(ssl) = &config.ssl {
            builder = TlsMaterial::load(ssl)?.configure(builder);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        tracing::info!(
            urls = ?config.urls.iter().map(Url::as_str).collect::<Vec<_>>(),
            mutual_tls = config.ssl.is_some(),
            "Remote client configured"
        );

        Ok(Self {
            client,
            urls: config.urls.clone().into(),
            next: Arc::new(AtomicUsize::new(0)),
            timeout_secs: config.write_timeout.as_secs(),
        })
    }

    /// Append `segments` to the next base URL in rotation. Segments are
    /// percent-encoded, so names may contain spaces or slashes.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.urls.len();
        join(&self.urls[index], segments)
    }

    /// GET the resource and decode the JSON body. Returns `None` on 404.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        bearer: Option<&str>,
    ) -> Result<Option<T>, AppError> {
        let response = self.send(self.request(Method::GET, segments, bearer)?).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let body = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to decode response body: {e}")))?;
        Ok(Some(body))
    }

    /// GET the resource as raw text (used for `text/event-stream` endpoints).
    pub async fn get_text(
        &self,
        segments: &[&str],
        bearer: Option<&str>,
    ) -> Result<String, AppError> {
        let request = self
            .request(Method::GET, segments, bearer)?
            .header(header::ACCEPT, "text/event-stream");
        let response = ensure_success(self.send(request).await?).await?;
        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }

    /// Send `body` as JSON with `method` and decode the JSON response.
    pub async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, AppError> {
        let payload = serde_json::to_vec(body)?;
        let request = self.request(method, segments, bearer)?.body(payload);
        let response = ensure_success(self.send(request).await?).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to decode response body: {e}")))
    }

    pub async fn delete(&self, segments: &[&str], bearer: Option<&str>) -> Result<(), AppError> {
        let response = self.send(self.request(Method::DELETE, segments, bearer)?).await?;
        ensure_success(response).await?;
        Ok(())
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        bearer: Option<&str>,
    ) -> Result<RequestBuilder, AppError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, relay_token = bearer.is_some(), "Remote request");
        let request = self.client.request(method, url);
        Ok(match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;
        tracing::debug!(status = response.status().as_u16(), url = %response.url(), "Remote response");
        Ok(response)
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let detail = response.text().await.unwrap_or_default();
    let message = format!("HTTP {} for {url}", status.as_u16());
    Err(match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::BAD_REQUEST => AppError::ValidationError(format!("{message}: {detail}")),
        _ => AppError::HttpError(message),
    })
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::HttpError(format!("Base URL cannot take a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
