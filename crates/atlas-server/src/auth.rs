use std::sync::Arc;

use atlas_core::AppError;
use atlas_core::principal::{Authentication, Authority, BearerToken, User};
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::config::{JwtConfig, JwtKey};
use crate::error::ApiError;
use crate::pattern::path_matches;
use crate::state::AppState;

/// Paths reachable without a token.
pub const WHITELIST: &[&str] = &[
    "/actuator/**",
    "/v3/api-docs/**",
    "/swagger-ui.html",
    "/webjars/**",
    "/swagger-ui/**",
    "/*/v3/api-docs",
    "/swagger-config",
];

pub fn is_whitelisted(path: &str) -> bool {
    WHITELIST.iter().any(|pattern| path_matches(pattern, path))
}

// ---------------------------------------------------------------------------
// Token verification
// ---------------------------------------------------------------------------

/// Verifies bearer JWTs and turns their claims into an [`Authentication`].
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
    roles_claim: String,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Result<Self, AppError> {
        let key = match &config.key {
            JwtKey::Secret(secret) => DecodingKey::from_secret(secret.as_bytes()),
            JwtKey::PublicKeyFile(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    AppError::ConfigError(format!(
                        "Cannot read JWT public key {}: {e}",
                        path.display()
                    ))
                })?;
                public_key(config.algorithm, &pem).map_err(|e| {
                    AppError::ConfigError(format!(
                        "Invalid JWT public key {}: {e}",
                        path.display()
                    ))
                })?
            }
        };

        // Tokens must carry `exp`; `nbf` is honoured when present.
        let mut validation = Validation::new(config.algorithm);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(config.audience.as_slice());
        }

        Ok(Self {
            key,
            validation,
            roles_claim: config.roles_claim.clone(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Authentication, AppError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &self.key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid bearer token: {e}")))?;
        Ok(self.convert(token, &data.claims))
    }

    /// Claims to principal: name and email claims build the [`User`], the
    /// roles claim supplies the authorities.
    fn convert(&self, token: &str, claims: &Map<String, Value>) -> Authentication {
        let text = |name: &str| claims.get(name).and_then(Value::as_str).map(String::from);
        let user = User::new(text("given_name"), text("family_name"), text("email"));

        let time = |name: &str| {
            claims
                .get(name)
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        };
        let bearer = BearerToken::new(token, time("iat"), time("exp"));

        Authentication::new(user, bearer, roles(claims, &self.roles_claim))
    }
}

fn public_key(algorithm: Algorithm, pem: &[u8]) -> jsonwebtoken::errors::Result<DecodingKey> {
    match algorithm {
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
        _ => DecodingKey::from_rsa_pem(pem),
    }
}

/// Read the roles claim. An array yields one authority per string entry, a
/// string is split on whitespace, anything else (or nothing) yields none.
fn roles(claims: &Map<String, Value>, claim: &str) -> Vec<Authority> {
    let mut parts = claim.split('.');
    let mut value = parts.next().and_then(|first| claims.get(first));
    for part in parts {
        value = value.and_then(|v| v.get(part));
    }

    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(Authority::new)
            .collect(),
        Some(Value::String(s)) => s.split_whitespace().map(Authority::new).collect(),
        _ => Vec::new(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Malformed Authorization header".into()))?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::Unauthorized(
            "Expected Authorization: Bearer <token>".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Middleware & extractors
// ---------------------------------------------------------------------------

/// Lets whitelisted paths through; everything else needs a valid bearer
/// token, whose [`Authentication`] is stored in the request extensions.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_whitelisted(request.uri().path()) {
        return next.run(request).await;
    }

    let authentication =
        bearer_token(request.headers()).and_then(|token| state.verifier.verify(token));

    match authentication {
        Ok(authentication) => {
            tracing::debug!(
                user = %authentication.name(),
                authorities = authentication.authorities.len(),
                "Authenticated request"
            );
            request.extensions_mut().insert(authentication);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(path = %request.uri().path(), error = %err, "Rejected request");
            ApiError(err).into_response()
        }
    }
}

/// The caller's [`Authentication`], set by [`authenticate`].
pub struct Authenticated(pub Authentication);

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authentication>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".into())))
    }
}

/// An authenticated caller holding the configured admin role.
pub struct Admin(pub Authentication);

impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(authentication) = Authenticated::from_request_parts(parts, state).await?;
        if !authentication.has_role(&state.admin_role) {
            tracing::debug!(user = %authentication.name(), "Admin role missing");
            return Err(ApiError(AppError::Forbidden(format!(
                "Role {} required",
                state.admin_role
            ))));
        }
        Ok(Admin(authentication))
    }
}
