use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Defines the API routes accessible to any user who has successfully passed the
/// authentication layer: profile self-service, the one-time role selection, and
/// consultation booking.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. This guarantees that all
/// handlers receive a validated `AuthUser` struct containing the profile key and
/// role, which is then used for all ownership checks (e.g., in `book_appointment`).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // Retrieves the currently authenticated user's profile.
        .route("/api/me", get(handlers::get_me))
        // PUT /api/me/profile
        // Partial update of the user's own profile (name, bio, specialties).
        .route("/api/me/profile", put(handlers::update_my_profile))
        // POST /api/me/role
        // The one-time role selection. Enforced one-shot at the database level;
        // a second selection returns 409.
        .route("/api/me/role", post(handlers::select_role))
        // GET /api/me/appointments
        // Lists the user's consultations, from either side of the booking.
        .route("/api/me/appointments", get(handlers::get_my_appointments))
        // POST /api/appointments
        // Books a consultation with a coach (client role required). Also links
        // the pair into `coach_client_links` for the coach's roster.
        .route("/api/appointments", post(handlers::book_appointment))
}
