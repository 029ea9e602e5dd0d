use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use tokio::net::TcpListener;

use atlas_client::{ClientConfig, RemoteClient};

/// One request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: String,
}

pub type Recorder = Arc<Mutex<Vec<Seen>>>;

fn record(recorder: &Recorder, method: Method, path: String, headers: &HeaderMap, body: &[u8]) {
    let header = |key: &str| {
        headers
            .get(key)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    recorder.lock().unwrap().push(Seen {
        method,
        path,
        authorization: header("authorization"),
        content_type: header("content-type"),
        accept: header("accept"),
        body: String::from_utf8_lossy(body).into_owned(),
    });
}

/// Knows France, fails on Broken, 404 for anything else.
async fn get_country(
    State(recorder): State<Recorder>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&recorder, Method::GET, format!("/countries/{name}"), &headers, b"");

    match name.as_str() {
        "France" => axum::Json(json!({ "name": "France", "code": "FR", "population": null }))
            .into_response(),
        "Broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Two `country` events.
async fn list_countries(State(recorder): State<Recorder>, headers: HeaderMap) -> impl IntoResponse {
    record(&recorder, Method::GET, "/countries".into(), &headers, b"");

    (
        [("content-type", "text/event-stream")],
        "event:country\ndata:{\"name\":\"France\",\"code\":\"FR\"}\n\n\
         event:country\ndata:{\"name\":\"Spain\",\"code\":\"ES\"}\n\n",
    )
}

/// Echoes the body back with 201. France already exists, a blank name is invalid.
async fn create_country(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    record(&recorder, Method::POST, "/countries".into(), &headers, &body);

    let country: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    match country["name"].as_str() {
        Some("France") => {
            (StatusCode::CONFLICT, "Country already exists: France").into_response()
        }
        Some(name) if name.trim().is_empty() => {
            (StatusCode::BAD_REQUEST, "name is required").into_response()
        }
        _ => (StatusCode::CREATED, axum::Json(country)).into_response(),
    }
}

async fn delete_country(
    State(recorder): State<Recorder>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&recorder, Method::DELETE, format!("/countries/{name}"), &headers, b"");

    match name.as_str() {
        "France" => StatusCode::OK,
        _ => StatusCode::NOT_FOUND,
    }
}

/// Start the upstream and return its base URL plus the request log.
pub async fn spawn_upstream() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/countries", get(list_countries).post(create_country))
        .route("/countries/{name}", get(get_country).delete(delete_country))
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), recorder)
}

pub fn client(url: &str) -> RemoteClient {
    RemoteClient::new(&ClientConfig::new(url).unwrap()).unwrap()
}
