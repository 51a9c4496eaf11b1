use crate::{AppState, pages};
use axum::{Router, routing::get};

/// Pages Router Module
///
/// The server-rendered navigational surface. None of these routes carry their
/// own auth layer: the Access Guard middleware classifies every one of them
/// against the route table (protected, auth-only, public) before a handler
/// runs, and injects the request-scoped context the shells read. Paths not
/// registered in the route table (e.g., `/about`) are public by default.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/about", get(pages::about))
        // Auth-only entry page: signed-in users are bounced to /dashboard.
        .route("/login", get(pages::login))
        // Protected pages.
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/my-clients", get(pages::my_clients))
        .route("/role-selection", get(pages::role_selection))
        .route("/find-a-pro", get(pages::find_a_pro))
        .route("/professionals/{id}", get(pages::professional))
        .route("/my-appointments", get(pages::my_appointments))
        .route("/settings", get(pages::settings))
}
