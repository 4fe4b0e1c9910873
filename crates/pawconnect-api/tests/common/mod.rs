//! Shared helpers for the API integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use pawconnect_api::{Server, ServerBuilder, ServerConfig};
use pawconnect_directory::{builtin_seed, MemoryDirectory};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@pawconnect.in";
pub const ADMIN_PASSWORD: &str = "admin_password_123";

/// Server over the bundled sample shelters with one administrator.
pub fn seeded_server() -> Server {
    let directory = Arc::new(MemoryDirectory::with_profiles(
        builtin_seed().expect("builtin seed parses"),
    ));
    ServerBuilder::new(ServerConfig::default())
        .with_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .with_directory(directory)
        .build()
        .expect("server builds")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn call(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

/// Sends a request and decodes the JSON body; an empty body decodes to null.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = call(app, request).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn login(app: &Router, email: &str, password: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/auth/login",
            None,
            json!({ "email": email, "password": password, "role": role }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD, "administrator").await
}

pub async fn signup_donor(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/auth/signup",
            None,
            json!({
                "email": email,
                "password": "donor_password_1",
                "confirm_password": "donor_password_1",
                "first_name": "Asha",
                "last_name": "Rao",
                "city": "Pune",
                "state": "Maharashtra"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

pub fn shelter_form(email: &str, name: &str) -> Value {
    json!({
        "email": email,
        "password": "shelter_password_1",
        "confirm_password": "shelter_password_1",
        "name": name,
        "phone": "+91 90000 11111",
        "address": "12 Lake Road",
        "city": "Jaipur",
        "state": "Rajasthan",
        "postal_code": "302001",
        "description": "Rescue and rehoming for street cats",
        "established_year": 2021
    })
}

/// Registers a shelter and returns the operator token and shelter id.
pub async fn register_shelter(app: &Router, email: &str, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        post_json("/api/v1/auth/register-shelter", None, shelter_form(email, name)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["principal"]["shelterId"].as_str().unwrap().to_string(),
    )
}
