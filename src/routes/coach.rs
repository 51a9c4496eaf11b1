use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Coach Router Module
///
/// Defines the API routes exclusively accessible to coach roles (nutritionist or
/// trainer). These endpoints provide roster access and consultation management.
///
/// Access Control:
/// This entire router is nested behind the authentication layer, and each
/// handler explicitly re-checks `role.is_coach()` before touching the
/// repository. The repository queries additionally predicate on the coach's own
/// id, so a coach can never act on another coach's bookings.
pub fn coach_routes() -> Router<AppState> {
    Router::new()
        // GET /api/coach/clients
        // The coach's client roster, built from `coach_client_links`.
        .route("/clients", get(handlers::get_my_clients))
        // PUT /api/coach/appointments/{id}/status
        // Confirm or cancel a consultation. Ownership is enforced in the query.
        .route(
            "/appointments/{id}/status",
            put(handlers::update_appointment_status),
        )
}
