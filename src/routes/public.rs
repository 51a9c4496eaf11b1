use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in). These routes handle read-only directory access and
/// core gateway functions like registration.
///
/// Security Mandate:
/// The directory handlers must restrict results to coach roles at the
/// Repository level, so client profiles and role-unset accounts are never
/// exposed to anonymous browsing.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Endpoint for new user creation and initial profile setup. The identity
        // itself is managed by the external provider; we mirror it locally with
        // role `unset` so role selection can route the account afterwards.
        .route("/register", post(handlers::register_user))
        // GET /api/professionals?specialty=...&search=...
        // Lists coaches, supporting specialty filtering and name/bio search.
        .route("/api/professionals", get(handlers::list_professionals))
        // GET /api/professionals/{id}
        // Retrieves the detailed view of a single coach. Non-coach profiles
        // resolve to 404 at the Repository level.
        .route("/api/professionals/{id}", get(handlers::get_professional))
}
