use atlas_core::AppError;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::Cors;
use crate::pattern::wildcard_match;

impl Cors {
    /// Build the CORS layer. A `*` entry in headers or methods mirrors the
    /// request instead of answering with a literal `*`, which browsers
    /// reject together with credentials.
    pub fn layer(&self) -> Result<CorsLayer, AppError> {
        let patterns = self.allowed_origin_pattern.clone();
        let origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|origin| patterns.iter().any(|p| wildcard_match(p, origin)))
        });

        let headers = if self.allowed_headers.iter().any(|h| h == "*") {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::list(
                self.allowed_headers
                    .iter()
                    .map(|h| {
                        HeaderName::from_bytes(h.as_bytes()).map_err(|_| {
                            AppError::ConfigError(format!("Invalid CORS header name '{h}'"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };

        let methods = if self.allowed_methods.iter().any(|m| m == "*") {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::list(
                self.allowed_methods
                    .iter()
                    .map(|m| {
                        Method::from_bytes(m.to_ascii_uppercase().as_bytes()).map_err(|_| {
                            AppError::ConfigError(format!("Invalid CORS method '{m}'"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };

        tracing::debug!(
            origins = ?self.allowed_origin_pattern,
            credentials = self.allow_credentials,
            "CORS configured"
        );

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_headers(headers)
            .allow_methods(methods)
            .allow_credentials(self.allow_credentials))
    }
}
