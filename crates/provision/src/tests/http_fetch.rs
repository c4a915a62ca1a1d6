//! End-to-end seed fetches against a loopback HTTP server.

use super::support::{RawServer, TestServer};
use crate::backends::{HttpSeedSource, RecordingLauncher};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use crate::provisioner::Provisioner;
use crate::seed::{ensure_seed_present, SeedTarget};
use crate::types::ProvisionState;
use seedbed_core::config::FetchConfig;
use seedbed_core::AppError;
use std::sync::Arc;
use tempfile::TempDir;

fn http_source() -> HttpSeedSource {
    HttpSeedSource::new(&FetchConfig {
        timeout_secs: 10,
        connect_timeout_secs: 2,
        max_redirects: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_two_megabyte_dump_then_start() {
    let body: Vec<u8> = b"INSERT INTO customers VALUES ('ALFKI');\n"
        .iter()
        .copied()
        .cycle()
        .take(2 * 1024 * 1024)
        .collect();
    let served = body.clone();
    let router = Router::new().route(
        "/northwind.sql",
        get(move || {
            let body = served.clone();
            async move { body }
        }),
    );
    let server = TestServer::spawn(router).await;

    let dir = TempDir::new().unwrap();
    let seed_path = dir.path().join("init/northwind.sql");
    let launcher = Arc::new(RecordingLauncher::new());
    let provisioner = Provisioner::new(
        SeedTarget::new(&seed_path, server.url("/northwind.sql")),
        dir.path().join("docker-compose.yml"),
        Arc::new(http_source()),
        launcher.clone(),
    );

    let first = provisioner.run().await.unwrap();
    assert_eq!(first.seed.bytes(), 2 * 1024 * 1024);
    assert_eq!(std::fs::read(&seed_path).unwrap(), body);
    assert_eq!(server.hits(), 1);
    assert_eq!(launcher.calls(), 1);

    let second = provisioner.run().await.unwrap();
    assert!(!second.seed.was_downloaded());
    assert_eq!(second.state, ProvisionState::ServiceRequested);
    assert_eq!(server.hits(), 1);
    assert_eq!(launcher.calls(), 2);
}

#[tokio::test]
async fn test_not_found_creates_nothing() {
    let router = Router::new().fallback(|| async { (StatusCode::NOT_FOUND, "missing") });
    let server = TestServer::spawn(router).await;
    let dir = TempDir::new().unwrap();
    let seed_path = dir.path().join("init/northwind.sql");
    let launcher = Arc::new(RecordingLauncher::new());

    let provisioner = Provisioner::new(
        SeedTarget::new(&seed_path, server.url("/northwind.sql")),
        dir.path().join("docker-compose.yml"),
        Arc::new(http_source()),
        launcher.clone(),
    );

    match provisioner.run().await {
        Err(AppError::Fetch(msg)) => assert!(msg.contains("404")),
        other => panic!("Expected Fetch error, got {:?}", other),
    }
    assert!(!seed_path.exists());
    assert_eq!(launcher.calls(), 0);
    assert_eq!(std::fs::read_dir(dir.path().join("init")).unwrap().count(), 0);
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let router = Router::new()
        .route("/old.sql", get(|| async { Redirect::permanent("/new.sql") }))
        .route("/new.sql", get(|| async { "-- moved dump" }));
    let server = TestServer::spawn(router).await;

    let dir = TempDir::new().unwrap();
    let target = SeedTarget::new(dir.path().join("seed.sql"), server.url("/old.sql"));

    let outcome = ensure_seed_present(&target, &http_source()).await.unwrap();

    assert_eq!(outcome.bytes(), 13);
    assert_eq!(std::fs::read(&target.path).unwrap(), b"-- moved dump");
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn test_redirect_loop_is_fetch_error() {
    let router = Router::new()
        .route("/a.sql", get(|| async { Redirect::temporary("/b.sql") }))
        .route("/b.sql", get(|| async { Redirect::temporary("/a.sql") }));
    let server = TestServer::spawn(router).await;

    let dir = TempDir::new().unwrap();
    let target = SeedTarget::new(dir.path().join("seed.sql"), server.url("/a.sql"));

    let result = ensure_seed_present(&target, &http_source()).await;

    assert!(matches!(result, Err(AppError::Fetch(_))));
    assert!(!target.path.exists());
}

#[tokio::test]
async fn test_truncated_body_is_discarded() {
    // Promise 1000 bytes, deliver 10, then close.
    let mut raw = b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\n".to_vec();
    raw.extend_from_slice(b"0123456789");
    let server = RawServer::spawn(raw).await;

    let dir = TempDir::new().unwrap();
    let target = SeedTarget::new(dir.path().join("seed.sql"), server.url("/seed.sql"));

    let result = ensure_seed_present(&target, &http_source()).await;

    assert!(matches!(result, Err(AppError::Fetch(_))));
    assert!(!target.path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
