use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use atlas_client::{ClientConfig, RemoteClient, RemoteCountryDirectory};
use atlas_core::InMemoryStore;
use atlas_server::auth::JwtVerifier;
use atlas_server::config::{Cors, JwtConfig};
use atlas_server::state::{AppState, CountryLookup, Storage};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ALLOWED_ORIGIN: &str = "https://app.example.com";

fn cors() -> Cors {
    Cors {
        allow_credentials: true,
        allowed_origin_pattern: vec!["https://*.example.com".into()],
        allowed_headers: vec!["*".into()],
        allowed_methods: vec!["*".into()],
    }
}

fn build(storage: Storage, lookup: CountryLookup) -> Router {
    let verifier = JwtVerifier::new(&JwtConfig::with_secret(TEST_SECRET)).unwrap();
    let state = Arc::new(AppState::new(storage, lookup, verifier, "ADMIN"));
    atlas_server::app(state, &cors()).unwrap()
}

/// App over a fresh in-memory store, checking countries locally.
pub fn setup_test_app() -> Router {
    let storage = Storage::Memory(InMemoryStore::new());
    let lookup = CountryLookup::local(&storage);
    build(storage, lookup)
}

/// App whose person writes ask the remote service at `url` about countries.
pub fn setup_remote_app(url: &str) -> Router {
    let client = RemoteClient::new(&ClientConfig::new(url).unwrap()).unwrap();
    build(
        Storage::Memory(InMemoryStore::new()),
        CountryLookup::Remote(RemoteCountryDirectory::new(client)),
    )
}

/// Signed HS256 token for Ada Lovelace holding `roles`.
pub fn token(roles: &[&str]) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": "ada",
        "given_name": "Ada",
        "family_name": "Lovelace",
        "email": "ada@example.com",
        "roles": roles,
        "iat": now,
        "exp": now + 300,
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn admin_token() -> String {
    token(&["ADMIN"])
}

pub fn user_token() -> String {
    token(&["USER"])
}

/// Request with a bearer token and, when given, a JSON body.
pub fn request(method: &str, uri: &str, bearer: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {bearer}"));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
