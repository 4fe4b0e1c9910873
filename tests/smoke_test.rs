//! Smoke test wiring a config file and a seed file into a running router

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pawconnect_api::{ServerBuilder, ServerConfig};
use pawconnect_core::AppConfig;
use pawconnect_directory::{load_seed_file, MemoryDirectory};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const CONFIG: &str = r#"
api:
  host: 127.0.0.1
  port: 9191
  rate_limit_rps: 50
directory:
  featured_count: 1
"#;

const SEED: &str = r#"
shelters:
  - id: "a1"
    name: Goa Beach Dogs
    city: Panaji
    state: Goa
    email: hello@goabeachdogs.org
    phone: "+91 90000 22222"
    established_year: 2012
  - id: "a2"
    name: Kochi Cat Collective
    city: Kochi
    state: Kerala
    email: meow@kochicats.org
    phone: "+91 90000 33333"
"#;

fn temp_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

#[tokio::test]
async fn test_config_and_seed_startup() {
    let config_file = temp_file(CONFIG, ".yaml");
    let seed_file = temp_file(SEED, ".yaml");

    let config = AppConfig::from_config_builder(config_file.path()).expect("config loads");
    config.validate().expect("config is valid");

    let server_config = ServerConfig::from_app_config(&config).expect("server config");
    assert_eq!(server_config.bind_addr.port(), 9191);
    assert_eq!(server_config.rate_limit_rps, 50);

    let profiles = load_seed_file(seed_file.path()).expect("seed loads");
    let server = ServerBuilder::new(server_config)
        .with_directory(Arc::new(MemoryDirectory::with_profiles(profiles)))
        .build()
        .expect("server builds");
    let app = server.router();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/shelters/featured")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let listing: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(listing["total"], 2);
    assert_eq!(listing["shelters"].as_array().unwrap().len(), 1);
    assert_eq!(listing["shelters"][0]["name"], "Goa Beach Dogs");
}

#[tokio::test]
async fn test_missing_seed_file_fails() {
    assert!(load_seed_file("/nonexistent/shelters.yaml").is_err());
}
