use axum::{
    Extension,
    extract::{Path, State},
    response::Html,
};
use uuid::Uuid;

use crate::{AppState, guard::RequestContext, models::Role};

/// Page Shell Module
///
/// Minimal server-rendered shells for the navigational routes the Access Guard
/// protects. Real rendering/styling lives in an external layer; these handlers
/// exist so every classified route resolves to an actual page, and they
/// demonstrate the request-scoped `RequestContext` contract: the guard resolves
/// the session exactly once and each page reads the result from the request
/// extensions instead of performing its own lookup.

// Shared skeleton so the shells stay uniform.
fn page(title: &str, body: String) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>{title}</title></head><body>{body}</body></html>"
    ))
}

fn greeting(ctx: &RequestContext) -> String {
    match &ctx.profile {
        Some(p) => format!("Signed in as {} ({})", p.full_name, p.role.as_str()),
        None => "Not signed in".to_string(),
    }
}

/// GET / — public landing page.
pub async fn index(Extension(ctx): Extension<RequestContext>) -> Html<String> {
    page(
        "Coach Portal",
        format!("<h1>Find your coach</h1><p>{}</p>", greeting(&ctx)),
    )
}

/// GET /about — public.
pub async fn about() -> Html<String> {
    page(
        "About",
        "<h1>About</h1><p>Nutrition and fitness coaching, matched to you.</p>".to_string(),
    )
}

/// GET /login — auth-only entry page; the guard bounces signed-in users to the dashboard.
pub async fn login() -> Html<String> {
    page(
        "Log in",
        "<h1>Log in</h1><form method=\"post\" action=\"/auth/login\"></form>".to_string(),
    )
}

/// GET /dashboard — the signed-in home page.
pub async fn dashboard(Extension(ctx): Extension<RequestContext>) -> Html<String> {
    let roster_link = match &ctx.profile {
        Some(p) if p.role.is_coach() => "<a href=\"/dashboard/my-clients\">My clients</a>",
        _ => "",
    };
    page(
        "Dashboard",
        format!("<h1>Dashboard</h1><p>{}</p>{roster_link}", greeting(&ctx)),
    )
}

/// GET /dashboard/my-clients — coach-only roster page.
/// The guard has already established a coach role; the repository call is the
/// same one backing the roster API.
pub async fn my_clients(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
) -> Html<String> {
    let clients = match &ctx.profile {
        Some(p) => state.repo.get_clients(p.id).await,
        None => vec![],
    };
    let items: String = clients
        .iter()
        .map(|c| format!("<li>{}</li>", c.full_name))
        .collect();
    page(
        "My clients",
        format!("<h1>My clients</h1><ul>{items}</ul>"),
    )
}

/// GET /role-selection — the one page a role-unset session is allowed to reach.
pub async fn role_selection(Extension(ctx): Extension<RequestContext>) -> Html<String> {
    let already = matches!(&ctx.profile, Some(p) if p.role != Role::Unset);
    let body = if already {
        "<p>Your role is already set.</p>".to_string()
    } else {
        "<h1>How will you use the platform?</h1>\
         <button data-role=\"client\">I'm looking for a coach</button>\
         <button data-role=\"nutritionist\">I'm a nutritionist</button>\
         <button data-role=\"trainer\">I'm a trainer</button>"
            .to_string()
    };
    page("Choose your role", body)
}

/// GET /find-a-pro — coach directory page.
pub async fn find_a_pro(State(state): State<AppState>) -> Html<String> {
    let coaches = state.repo.list_coaches(None, None).await;
    let items: String = coaches
        .iter()
        .map(|c| format!("<li><a href=\"/professionals/{}\">{}</a></li>", c.id, c.full_name))
        .collect();
    page(
        "Find a pro",
        format!("<h1>Find a pro</h1><ul>{items}</ul>"),
    )
}

/// GET /professionals/{id} — coach detail page.
pub async fn professional(State(state): State<AppState>, Path(id): Path<Uuid>) -> Html<String> {
    match state.repo.get_coach(id).await {
        Some(coach) => {
            let body = format!(
                "<h1>{}</h1><p>{}</p><p>Specialties: {}</p>",
                coach.full_name,
                coach.bio.clone().unwrap_or_default(),
                coach.specialties.join(", ")
            );
            page(&coach.full_name, body)
        }
        None => page("Not found", "<h1>No such professional</h1>".to_string()),
    }
}

/// GET /my-appointments — the signed-in user's consultations.
pub async fn my_appointments(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
) -> Html<String> {
    let appointments = match &ctx.profile {
        Some(p) if p.role.is_coach() => state.repo.get_coach_appointments(p.id).await,
        Some(p) => state.repo.get_client_appointments(p.id).await,
        None => vec![],
    };
    let items: String = appointments
        .iter()
        .map(|a| format!("<li>{} — {:?}</li>", a.scheduled_at, a.status))
        .collect();
    page(
        "My appointments",
        format!("<h1>My appointments</h1><ul>{items}</ul>"),
    )
}

/// GET /settings — account settings shell.
pub async fn settings(Extension(ctx): Extension<RequestContext>) -> Html<String> {
    page(
        "Settings",
        format!("<h1>Settings</h1><p>{}</p>", greeting(&ctx)),
    )
}
