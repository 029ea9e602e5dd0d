use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceExt;

use crate::common::{body_json, request, setup_remote_app, user_token};

type SeenTokens = Arc<Mutex<Vec<Option<String>>>>;

/// Remote country service: knows Japan, fails on Broken, 404 otherwise.
async fn remote_country(
    State(seen): State<SeenTokens>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push(authorization);

    match name.as_str() {
        "Japan" => axum::Json(json!({ "name": "Japan", "code": "JP", "population": null }))
            .into_response(),
        "Broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_remote() -> (String, SeenTokens) {
    let seen = SeenTokens::default();
    let app = Router::new()
        .route("/countries/{name}", get(remote_country))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

fn person(country: &str) -> serde_json::Value {
    json!({ "first_name": "Hokusai", "last_name": "Katsushika", "country": country })
}

#[tokio::test]
async fn person_create_relays_bearer_to_remote() {
    let (url, seen) = spawn_remote().await;
    let app = setup_remote_app(&url);
    let token = user_token();

    let response = app
        .oneshot(request("POST", "/persons", &token, Some(person("Japan"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["country"], "Japan");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[Some(format!("Bearer {token}"))]);
}

#[tokio::test]
async fn remote_404_means_country_not_found() {
    let (url, _seen) = spawn_remote().await;
    let app = setup_remote_app(&url);

    let response = app
        .oneshot(request("POST", "/persons", &user_token(), Some(person("Atlantis"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remote_failure_returns_502() {
    let (url, _seen) = spawn_remote().await;
    let app = setup_remote_app(&url);

    let response = app
        .oneshot(request("POST", "/persons", &user_token(), Some(person("Broken"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "upstream_error");
}
