//! jotter-api - HTTP API server for jotter
//!
//! Routes:
//! - `/health` liveness probe
//! - `/api/notes` action envelope for notes and quota
//! - `/place/{kind}` and `/place/{kind}/{code}` airport and city lookups
//! - `/docs` Swagger UI

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod services;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use jotter_core::{defaults, PlaceRepository};

pub use config::ServerConfig;
pub use envelope::ActionResponse;
pub use error::ApiError;
pub use services::NoteService;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
    pub places: Arc<dyn PlaceRepository>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(notes: NoteService, places: Arc<dyn PlaceRepository>) -> Self {
        Self {
            notes,
            places,
            rate_limiter: None,
        }
    }

    /// Enable the global limiter: bursts of up to `requests`, one request
    /// replenished every `period_secs`. Zero values leave limiting off.
    pub fn with_rate_limit(mut self, requests: u64, period_secs: u64) -> Self {
        let burst = u32::try_from(requests).ok().and_then(NonZeroU32::new);
        let quota = Quota::with_period(Duration::from_secs(period_secs));
        self.rate_limiter = match (quota, burst) {
            (Some(quota), Some(burst)) => {
                Some(Arc::new(RateLimiter::direct(quota.allow_burst(burst))))
            }
            _ => None,
        };
        self
    }
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jotter API",
        description = "Notes with storage quotas, and airport/city lookups"
    ),
    paths(
        health_check,
        handlers::actions::handle_action,
        handlers::places::search_places,
        handlers::places::get_place,
        handlers::places::upsert_place,
        handlers::places::delete_place,
    ),
    components(schemas(
        ActionResponse,
        jotter_core::ErrorCode,
        jotter_core::Place,
        jotter_core::PlaceKind,
        jotter_core::UpsertPlaceRequest,
        jotter_core::QuotaSnapshot,
        jotter_core::QuotaLimits,
        jotter_core::UserLimits,
        jotter_core::Tier,
        services::NoteView,
        services::AttachmentView,
    )),
    tags(
        (name = "Notes", description = "Note and quota actions"),
        (name = "Places", description = "Airport and city lookups"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

// =============================================================================
// ROUTER
// =============================================================================

/// Parse configured CORS origins, skipping values that are not valid headers.
pub fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Build the application router with all middleware.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let allowed_origins = parse_allowed_origins(&config.cors_allowed_origins);
    info!(
        origins = allowed_origins.len(),
        rate_limit = state.rate_limiter.is_some(),
        "Building router"
    );

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .route("/api/notes", any(handlers::actions::handle_action))
        .route("/place/:kind", get(handlers::places::search_places))
        .route(
            "/place/:kind/:code",
            get(handlers::places::get_place)
                .put(handlers::places::upsert_place)
                .delete(handlers::places::delete_place),
        )
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(envelope::AJAX_HEADER),
                    HeaderName::from_static(envelope::USER_ID_HEADER),
                ])
                .allow_credentials(true)
                .max_age(Duration::from_secs(defaults::CORS_MAX_AGE_SECS)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .with_state(state)
}

// =============================================================================
// RATE LIMITING MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service is up")))]
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
