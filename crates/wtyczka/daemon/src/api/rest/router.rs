//! API Router configuration

use super::handlers;
use super::middleware::enforce_gates;
use super::state::AppState;
use crate::config::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        // Gate checks
        .route("/check-access/contacts", get(handlers::check_contacts_access))
        .route(
            "/check-access/payment-form",
            get(handlers::check_payment_form_access),
        )
        .route("/check-access/payment", get(handlers::check_payment_access))
        .route("/verify-admin", post(handlers::verify_admin))
        // Registrations
        .route("/registrations", post(handlers::create_registration))
        .route("/registrations/:id/status", get(handlers::registration_status))
        // Contacts
        .route("/team-members", get(handlers::list_team_members))
        // Payments
        .route("/payments", post(handlers::create_payment))
        .route(
            "/data/payment/:registration_id",
            put(handlers::update_payment),
        )
        .route(
            "/data/payment/:registration_id/proof",
            get(handlers::get_payment_proof),
        );

    // Build router with middleware
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), enforce_gates))
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(TraceLayer::new_for_http());

    let router = if server.enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
