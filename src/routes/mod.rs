// Route modules
pub mod chat;
pub mod credits;
pub mod users;

use crate::{
    app_state::AppState,
    middleware::logging_middleware,
    models::common::{HealthStatus, ServiceStatus},
};
use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

// Panel generation polls the provider for up to a minute, so the request
// timeout has to sit well above that.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_status))
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    let credits_routes = Router::new()
        .route("/credits/balance/{user_id}", get(credits::get_balance))
        .route("/credits/init", post(credits::init_account))
        .route("/credits/use", post(credits::use_credits))
        .route("/credits/grant", post(credits::grant_credits))
        .route("/credits/history/{user_id}", get(credits::get_history))
        .route("/credits/packages", get(credits::get_packages))
        .route("/credits/status", get(credits::credit_system_status));

    let chat_routes = Router::new()
        .route("/chat/message", post(chat::chat_message))
        .route("/chat/generate-image", post(chat::generate_image))
        .route("/chat/health", get(chat::chat_health));

    let user_routes = Router::new()
        .route("/users/create", post(users::create_user))
        .route("/users/username/{username}", get(users::check_username))
        .route(
            "/users/{uid}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    Router::new()
        .merge(credits_routes)
        .merge(chat_routes)
        .merge(user_routes)
}

/// GET /
async fn service_status() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "online",
        service: "PanelX API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        storage_backend: state.storage_backend,
        free_mode: state.credits_service.free_mode(),
    })
}
