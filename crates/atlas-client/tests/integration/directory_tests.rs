use tokio::net::TcpListener;

use atlas_client::RemoteCountryDirectory;
use atlas_core::{AppError, CountryDirectory};

use crate::common::{client, spawn_upstream};

#[tokio::test]
async fn directory_relays_bearer_and_json_content_type() {
    let (url, seen) = spawn_upstream().await;
    let directory = RemoteCountryDirectory::new(client(&url));

    assert!(directory.country_exists("France", Some("abc")).await.unwrap());

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].path, "/countries/France");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer abc"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn directory_reports_missing_country() {
    let (url, seen) = spawn_upstream().await;
    let directory = RemoteCountryDirectory::new(client(&url));

    assert!(!directory.country_exists("Gondor", None).await.unwrap());
    assert_eq!(seen.lock().unwrap()[0].authorization, None);
}

#[tokio::test]
async fn directory_surfaces_server_errors() {
    let (url, _) = spawn_upstream().await;
    let directory = RemoteCountryDirectory::new(client(&url));

    let err = directory.country_exists("Broken", None).await.unwrap_err();
    assert!(matches!(err, AppError::HttpError(ref m) if m.contains("HTTP 500")));
}

#[tokio::test]
async fn unreachable_remote_is_a_network_error() {
    // Bind and drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .get_json::<serde_json::Value>(&["countries", "France"], None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NetworkError(_)));
}
