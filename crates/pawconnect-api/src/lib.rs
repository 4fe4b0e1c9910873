//! PawConnect API - HTTP surface of the shelter directory
//!
//! This crate serves the public shelter directory, account sign-up and login,
//! shelter self-service, the administrator review queue and the role-gated
//! dashboard pages.
//!
//! # Features
//!
//! - Filterable public directory with a graceful empty state
//! - JWT sessions with argon2 password hashing
//! - Capability-based access for donors, shelter operators and administrators
//! - Redirecting page guards (`/login` when signed out, `/` when forbidden)
//! - Rate limiting, request timeouts and audit logging
//! - Prometheus metrics and an OpenAPI document
//!
//! # Example
//!
//! ```no_run
//! use pawconnect_api::{ServerBuilder, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = ServerBuilder::new(ServerConfig::default())
//!         .with_admin("admin@pawconnect.in", "secure_password")
//!         .build()?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod metrics;
pub mod middleware;
pub mod pages;
pub mod rest;
pub mod session;
pub mod types;

use anyhow::Context;
use auth::{AccountProfile, AuthConfig, AuthService};
use axum::{routing::get, Extension, Router};
use middleware::{
    cors_layer, logging_middleware, rate_limit_middleware, request_id_middleware,
    security_headers_middleware, timeout_middleware, RateLimitState, Readiness,
};
use pawconnect_core::AppConfig;
use pawconnect_directory::{DirectorySource, MemoryDirectory};
use rest::ApiState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use utoipa::OpenApi;

// ============================================================================
// Server Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,

    /// Authentication configuration
    pub auth_config: AuthConfig,

    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,

    /// Per-request deadline
    pub request_timeout: Duration,

    /// Largest accepted request body in bytes
    pub max_body_size: usize,

    /// Serve the OpenAPI document
    pub enable_swagger: bool,

    /// CORS origins; empty allows any
    pub allowed_origins: Vec<String>,

    /// Shelters on the landing page
    pub featured_count: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            auth_config: AuthConfig::default(),
            rate_limit_rps: 100,
            request_timeout: Duration::from_secs(30),
            max_body_size: 256 * 1024,
            enable_swagger: true,
            allowed_origins: Vec::new(),
            featured_count: 3,
        }
    }
}

impl ServerConfig {
    pub fn from_app_config(config: &AppConfig) -> anyhow::Result<Self> {
        let bind_addr = config
            .api
            .bind_address()
            .parse()
            .with_context(|| format!("Invalid bind address {}", config.api.bind_address()))?;

        Ok(Self {
            bind_addr,
            auth_config: AuthConfig::from(&config.auth),
            rate_limit_rps: config.api.rate_limit_rps,
            request_timeout: config.api.request_timeout(),
            max_body_size: config.api.max_body_size,
            enable_swagger: config.api.enable_swagger,
            allowed_origins: config.api.allowed_origins.clone(),
            featured_count: config.directory.featured_count,
        })
    }
}

// ============================================================================
// OpenAPI Documentation
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PawConnect API",
        version = "0.1.0",
        description = "Shelter directory, accounts and application review",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        rest::directory::list_shelters,
        rest::directory::featured_shelters,
        rest::directory::get_shelter,
        rest::directory::get_filter_options,
        rest::auth::signup,
        rest::auth::register_shelter,
        rest::auth::login,
        rest::auth::logout,
        rest::auth::current_session,
        rest::shelter::get_own_profile,
        rest::shelter::update_own_profile,
        rest::shelter::set_own_visibility,
        rest::admin::list_applications,
        rest::admin::get_application,
        rest::admin::approve_application,
        rest::admin::reject_application,
        rest::admin::get_stats,
        rest::admin::get_audit_logs,
    ),
    components(
        schemas(
            pawconnect_core::types::ShelterId,
            pawconnect_core::types::ShelterRecord,
            pawconnect_core::types::ShelterProfile,
            pawconnect_core::types::ShelterApplication,
            pawconnect_core::types::VerificationStatus,
            pawconnect_core::types::Role,
            pawconnect_core::types::Principal,
            types::ShelterListResponse,
            types::FilterOptionsResponse,
            types::LoginRequest,
            types::LoginResponse,
            types::SignupRequest,
            types::ShelterRegisterRequest,
            types::SessionResponse,
            types::NavLink,
            types::UpdateProfileRequest,
            types::PublishRequest,
            types::ApplicationListResponse,
            types::ReviewRequest,
            types::StatsResponse,
            types::PageResponse,
            types::ErrorResponse,
            types::AuditLogEntry,
        )
    ),
    tags(
        (name = "directory", description = "Public shelter directory"),
        (name = "auth", description = "Accounts and sessions"),
        (name = "shelter", description = "Shelter operator self-service"),
        (name = "admin", description = "Application review and audit log"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}

// ============================================================================
// Server Builder
// ============================================================================

pub struct ServerBuilder {
    config: ServerConfig,
    auth_service: Arc<AuthService>,
    directory: Option<Arc<MemoryDirectory>>,
    source: Option<Arc<dyn DirectorySource>>,
}

impl ServerBuilder {
    pub fn new(config: ServerConfig) -> Self {
        let auth_service = Arc::new(AuthService::new(config.auth_config.clone()));
        Self {
            config,
            auth_service,
            directory: None,
            source: None,
        }
    }

    /// Add an administrator account
    pub fn with_admin(self, email: &str, password: &str) -> Self {
        let profile = AccountProfile::Administrator {
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
        };
        match self.auth_service.create_account(email, password, profile) {
            Ok(_) => info!(email, "Created administrator account"),
            Err(e) => error!(error = %e, "Failed to create administrator account"),
        }
        self
    }

    /// Serve an existing directory, e.g. one loaded from seed data
    pub fn with_directory(mut self, directory: Arc<MemoryDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Read the public directory from another source
    pub fn with_source(mut self, source: Arc<dyn DirectorySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the server
    pub fn build(self) -> anyhow::Result<Server> {
        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(MemoryDirectory::new()));

        let mut state = ApiState::new(self.auth_service.clone(), directory.clone())
            .with_featured_count(self.config.featured_count);
        if let Some(source) = self.source {
            state = state.with_source(source);
        }

        let readiness = Arc::new(Readiness::new(directory.clone()));
        Ok(Server {
            config: self.config,
            auth_service: self.auth_service,
            directory,
            state,
            readiness,
        })
    }
}

// ============================================================================
// Server
// ============================================================================

pub struct Server {
    config: ServerConfig,
    auth_service: Arc<AuthService>,
    directory: Arc<MemoryDirectory>,
    state: ApiState,
    readiness: Arc<Readiness>,
}

impl Server {
    pub fn auth_service(&self) -> &Arc<AuthService> {
        &self.auth_service
    }

    pub fn directory(&self) -> &Arc<MemoryDirectory> {
        &self.directory
    }

    /// The complete application with every route and middleware layer.
    pub fn router(&self) -> Router {
        let mut app = Router::new()
            .merge(rest::create_rest_router(self.state.clone()))
            .merge(pages::create_page_router(self.state.clone()));

        if self.config.enable_swagger {
            let openapi = ApiDoc::openapi();
            app = app.route(
                "/api-docs/openapi.json",
                get(|| async move { axum::Json(openapi) }),
            );
        }

        let rate_limit_state = Arc::new(RateLimitState::new(self.config.rate_limit_rps));

        app.route("/health", get(middleware::health_check))
            .route(
                "/ready",
                get(middleware::readiness_check).with_state(self.readiness.clone()),
            )
            .route(
                "/metrics",
                get(crate::metrics::metrics_handler).with_state(crate::metrics::install_recorder()),
            )
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(axum::middleware::from_fn(request_id_middleware))
                    .layer(axum::middleware::from_fn(security_headers_middleware))
                    .layer(axum::middleware::from_fn_with_state(
                        self.config.request_timeout,
                        timeout_middleware,
                    ))
                    .layer(axum::middleware::from_fn_with_state(
                        rate_limit_state,
                        rate_limit_middleware,
                    ))
                    .layer(axum::middleware::from_fn(logging_middleware))
                    .layer(CompressionLayer::new())
                    .layer(RequestBodyLimitLayer::new(self.config.max_body_size))
                    .layer(cors_layer(&self.config.allowed_origins)),
            )
            .layer(Extension(self.auth_service.clone()))
            .layer(Extension(self.directory.clone()))
    }

    /// Run the server
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Starting PawConnect API server");

        let app = self.router();
        self.readiness.set_serving(true);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        info!(
            address = %local_addr,
            shelters = self.directory.len(),
            accounts = self.auth_service.account_count(),
            "Server listening"
        );
        if self.config.enable_swagger {
            info!("OpenAPI document available at /api-docs/openapi.json");
        }

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        self.readiness.set_serving(false);
        info!("Server shutdown complete");
        Ok(())
    }
}

// ============================================================================
// Graceful Shutdown
// ============================================================================

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl-C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
