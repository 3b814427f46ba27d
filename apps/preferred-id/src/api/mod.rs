//! # HTTP API Module
//!
//! FHIR-style REST surface for the `$preferred-id` operation.
//!
//! ## Endpoints
//!
//! - `GET /NamingSystem/$preferred-id?id=&type=` - Resolve a preferred id
//!   (only routed when `preferred-id` is a supported operation)
//! - `GET /metadata` - CapabilityStatement
//! - `GET /health` - Health check
//!
//! The requester's information model comes from the `fhirVersion`
//! parameter of the `Accept` header, else `server.information_model`.

mod handlers;
mod middleware;
mod types;

pub use handlers::{health_handler, metadata_handler, negotiate_model, preferred_id_handler};
pub use middleware::{create_rate_limiter, operation_trace_middleware, rate_limit_middleware};
pub use types::{FhirResponse, HealthResponse};

use crate::config::{ServerSettings, Settings};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{MethodFilter, get, on},
};
use preferred_id_core::{
    PreferredIdError, CatalogSearch, InformationModel, PREFERRED_ID_OPERATION,
    PreferredIdConformance, PreferredIdService, primitives::RESOURCE_NAME,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Requests carry no bodies; anything larger than this is refused.
const MAX_BODY_SIZE: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. Everything here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PreferredIdService>,
    /// Model assumed when a request does not name a `fhirVersion`.
    pub default_model: InformationModel,
    pub conformance: Arc<PreferredIdConformance>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSearch>, server: &ServerSettings) -> Self {
        Self {
            service: Arc::new(PreferredIdService::new(catalog)),
            default_model: server.information_model(),
            conformance: Arc::new(PreferredIdConformance::new(server.supported_operations())),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `server.cors_origins`.
///
/// - `["*"]`: any origin
/// - empty: localhost only
/// - otherwise: the listed origins; invalid entries are skipped
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
        return CorsLayer::permissive();
    }
    if origins.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }
    read_only_cors(allowed)
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:4080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:4080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    read_only_cors(origins)
}

fn read_only_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Path of the `$preferred-id` route.
#[must_use]
pub fn preferred_id_path() -> String {
    format!("/{}/{}", RESOURCE_NAME, PREFERRED_ID_OPERATION.path_segment())
}

/// HTTP method the operation descriptor registers, GET if it names none axum knows.
fn operation_method() -> MethodFilter {
    Method::from_bytes(PREFERRED_ID_OPERATION.method.as_bytes())
        .ok()
        .and_then(|method| MethodFilter::try_from(method).ok())
        .unwrap_or(MethodFilter::GET)
}

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate limiting (if enabled)
/// 5. Operation tracing - `$preferred-id` only
pub fn create_router(state: AppState, server: &ServerSettings) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metadata", get(handlers::metadata_handler));

    if server
        .supported_operations()
        .supports(PREFERRED_ID_OPERATION.name)
    {
        router = router.route(
            &preferred_id_path(),
            on(operation_method(), handlers::preferred_id_handler).layer(
                axum_middleware::from_fn(middleware::operation_trace_middleware),
            ),
        );
    } else {
        tracing::info!(
            "${} is not a supported operation, not routing it",
            PREFERRED_ID_OPERATION.name
        );
    }

    if server.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", server.rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            middleware::create_rate_limiter(server.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(&server.cors_origins))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and serve until Ctrl+C.
pub async fn run_server(
    settings: &Settings,
    catalog: Arc<dyn CatalogSearch>,
) -> Result<(), PreferredIdError> {
    let state = AppState::new(catalog, &settings.server);
    let router = create_router(state, &settings.server);
    let addr = settings.server.addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PreferredIdError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("$preferred-id server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PreferredIdError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
