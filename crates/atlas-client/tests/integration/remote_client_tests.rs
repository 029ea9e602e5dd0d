use reqwest::Method;
use serde_json::{Value, json};

use atlas_client::parse_event_stream;
use atlas_core::AppError;

use crate::common::{client, spawn_upstream};

#[tokio::test]
async fn send_json_posts_body_with_bearer() {
    let (url, seen) = spawn_upstream().await;
    let body = json!({ "name": "Peru", "code": "PE", "population": 34000000 });

    let created: Value = client(&url)
        .send_json(Method::POST, &["countries"], &body, Some("tok"))
        .await
        .unwrap();
    assert_eq!(created, body);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].path, "/countries");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(serde_json::from_str::<Value>(&seen[0].body).unwrap(), body);
}

#[tokio::test]
async fn send_json_maps_conflict_and_bad_request() {
    let (url, _) = spawn_upstream().await;
    let client = client(&url);

    let err = client
        .send_json::<_, Value>(Method::POST, &["countries"], &json!({ "name": "France" }), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m.contains("HTTP 409")));

    let err = client
        .send_json::<_, Value>(Method::POST, &["countries"], &json!({ "name": " " }), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(ref m) if m.contains("name is required")));
}

#[tokio::test]
async fn delete_sends_delete_and_maps_404() {
    let (url, seen) = spawn_upstream().await;
    let client = client(&url);

    client.delete(&["countries", "France"], Some("tok")).await.unwrap();
    let err = client.delete(&["countries", "Gondor"], None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::DELETE);
    assert_eq!(seen[0].path, "/countries/France");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok"));
    assert_eq!(seen[1].path, "/countries/Gondor");
}

#[tokio::test]
async fn get_text_asks_for_event_stream() {
    let (url, seen) = spawn_upstream().await;

    let body = client(&url).get_text(&["countries"], Some("tok")).await.unwrap();
    let events = parse_event_stream(&body);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.event.as_deref() == Some("country")));
    assert!(events[1].data.contains("Spain"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].path, "/countries");
    assert_eq!(seen[0].accept.as_deref(), Some("text/event-stream"));
}
