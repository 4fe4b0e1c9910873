//! Middleware for logging, CORS, rate limiting, and security headers

use crate::types::{AuditLogEntry, ErrorResponse};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, Extensions, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use metrics::{counter, histogram};
use pawconnect_core::types::Role;
use pawconnect_directory::MemoryDirectory;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Peer address recorded by `into_make_service_with_connect_info`, if any.
pub fn remote_addr(extensions: &Extensions) -> String {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// ============================================================================
// Audit Logging
// ============================================================================

pub struct AuditLogger {
    logs: Arc<DashMap<Uuid, AuditLogEntry>>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(DashMap::new()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log(
        &self,
        user: String,
        role: Role,
        action: String,
        resource: String,
        details: serde_json::Value,
        source_ip: String,
        success: bool,
    ) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            user,
            role,
            action,
            resource,
            details,
            source_ip,
            timestamp: chrono::Utc::now(),
            success,
        };

        info!(
            audit = true,
            user = %entry.user,
            role = %entry.role,
            action = %entry.action,
            resource = %entry.resource,
            success = entry.success,
            "Audit log"
        );

        self.logs.insert(entry.id, entry);
    }

    /// All entries, newest first.
    pub fn get_logs(&self) -> Vec<AuditLogEntry> {
        let mut logs: Vec<_> = self.logs.iter().map(|e| e.value().clone()).collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Request Logging Middleware
// ============================================================================

pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();
    let remote_addr = remote_addr(request.extensions());

    info!(
        method = %method,
        uri = %uri,
        version = ?version,
        remote_addr = %remote_addr,
        "Incoming request"
    );

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    counter!(
        "pawconnect_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("pawconnect_http_request_duration_seconds").record(elapsed.as_secs_f64());

    info!(
        method = %method,
        uri = %uri,
        status = status,
        duration_ms = elapsed.as_millis(),
        "Request completed"
    );

    response
}

// ============================================================================
// Rate Limiting
// ============================================================================

pub struct RateLimitState {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimitState {
    /// Global limiter; a zero rate is treated as one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let quota =
            Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<RateLimitState>>,
    request: Request,
    next: Next,
) -> Response {
    match rate_limiter.limiter.check() {
        Ok(_) => next.run(request).await,
        Err(_) => {
            warn!(
                remote_addr = %remote_addr(request.extensions()),
                "Rate limit exceeded"
            );
            counter!("pawconnect_rate_limited_total").increment(1);

            let error = ErrorResponse::new(
                "rate_limit_exceeded",
                "Too many requests. Please try again later.",
            );

            (StatusCode::TOO_MANY_REQUESTS, Json(error)).into_response()
        }
    }
}

// ============================================================================
// Security Headers Middleware
// ============================================================================

/// Headers added to every response unless the handler already set them.
fn security_headers() -> [(HeaderName, HeaderValue); 5] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        // shelter photos are hot-linked from external hosts
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'; img-src 'self' https: data:"),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=()"),
        ),
    ]
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in security_headers() {
        headers.entry(name).or_insert(value);
    }
    response
}

// ============================================================================
// CORS Configuration
// ============================================================================

/// CORS for the configured origins; an empty list allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

// ============================================================================
// Request ID Middleware
// ============================================================================

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("X-Request-ID", value);
    }

    response
}

// ============================================================================
// Timeout Middleware
// ============================================================================

pub async fn timeout_middleware(
    State(timeout): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "Request timeout");
            let error = ErrorResponse::new(
                "request_timeout",
                "Request took too long to process",
            );
            (StatusCode::REQUEST_TIMEOUT, Json(error)).into_response()
        }
    }
}

// ============================================================================
// Health and Readiness
// ============================================================================

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
    }))
}

/// Whether the server accepts traffic, plus a directory summary for `/ready`.
pub struct Readiness {
    serving: AtomicBool,
    directory: Arc<MemoryDirectory>,
}

impl Readiness {
    pub fn new(directory: Arc<MemoryDirectory>) -> Self {
        Self {
            serving: AtomicBool::new(false),
            directory,
        }
    }

    pub fn set_serving(&self, serving: bool) {
        self.serving.store(serving, Ordering::Relaxed);
    }

    pub fn is_serving(&self) -> bool {
        self.serving.load(Ordering::Relaxed)
    }
}

pub async fn readiness_check(State(readiness): State<Arc<Readiness>>) -> Response {
    if !readiness.is_serving() {
        let error = ErrorResponse::new("not_ready", "Server is starting or shutting down");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response();
    }

    let stats = readiness.directory.stats();
    Json(serde_json::json!({
        "status": "ready",
        "listedShelters": stats.published,
        "pendingApplications": stats.pending,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_logger() {
        let logger = AuditLogger::new();

        logger.log(
            "admin@pawconnect.in".to_string(),
            Role::Administrator,
            "approve_application".to_string(),
            "/api/v1/admin/applications/42/approve".to_string(),
            serde_json::json!({"shelter_id": "42"}),
            "127.0.0.1".to_string(),
            true,
        );

        let logs = logger.get_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user, "admin@pawconnect.in");
        assert_eq!(logs[0].action, "approve_application");
        assert_eq!(logs[0].role, Role::Administrator);
    }

    #[tokio::test]
    async fn test_readiness_reports_directory() {
        let directory = Arc::new(MemoryDirectory::new());
        let readiness = Arc::new(Readiness::new(directory));

        let response = readiness_check(State(readiness.clone())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        readiness.set_serving(true);
        let response = readiness_check(State(readiness)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["listedShelters"], 0);
    }

    #[tokio::test]
    async fn test_security_headers_keep_handler_values() {
        use axum::{body::Body, routing::get, Router};
        use tower::ServiceExt;

        let app = Router::new()
            .route(
                "/",
                get(|| async { ([(header::X_FRAME_OPTIONS, "SAMEORIGIN")], "ok") }),
            )
            .layer(axum::middleware::from_fn(security_headers_middleware));
        let response = app
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn test_remote_addr_without_connect_info() {
        assert_eq!(remote_addr(&Extensions::new()), "unknown");

        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo("10.0.0.7:5000".parse::<SocketAddr>().unwrap()));
        assert_eq!(remote_addr(&extensions), "10.0.0.7:5000");
    }
}
