use crate::{
    AppState,
    auth::AuthUser,
    models::{
        self, Appointment, AppointmentStatus, BookAppointmentRequest, CoachClientLink, Profile,
        RegisterRequest, Role, SelectRoleRequest, UpdateProfileRequest,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// DirectoryFilter
///
/// Accepted query parameters for the public coach directory (GET /api/professionals).
/// Used by Axum's Query extractor to safely bind HTTP query parameters.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct DirectoryFilter {
    /// Optional exact specialty filter (e.g., "weight loss").
    pub specialty: Option<String>,
    /// Optional case-insensitive search string matched against name and bio.
    pub search: Option<String>,
}

/// AuthSignupResponse
///
/// Minimal struct to deserialize the response from the external identity
/// provider's signup endpoint, capturing the newly created user's id.
#[derive(Deserialize)]
struct AuthSignupResponse {
    id: Uuid,
}

// --- Handlers ---

/// get_me
///
/// [Authenticated Route] Returns the requesting user's own profile.
#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Profile", body = Profile))
)]
pub async fn get_me(
    AuthUser { profile_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<models::Profile>, StatusCode> {
    match state.repo.get_profile(profile_id).await {
        Some(profile) => Ok(Json(profile)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// update_my_profile
///
/// [Authenticated Route] Partial update of the requesting user's own profile.
/// The profile key comes from the authenticated session, never the payload.
#[utoipa::path(
    put,
    path = "/api/me/profile",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Updated", body = Profile))
)]
pub async fn update_my_profile(
    AuthUser { profile_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<models::Profile>, StatusCode> {
    match state.repo.update_profile(profile_id, payload).await {
        Some(profile) => Ok(Json(profile)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// select_role
///
/// [Authenticated Route] The one-time role selection.
///
/// *Policy*: `unset` is not a selectable role (400). The repository refuses a
/// second selection by predicating the update on `role = 'unset'`, so repeat
/// calls surface as 409 Conflict. Once chosen, a role is read-only.
#[utoipa::path(
    post,
    path = "/api/me/role",
    request_body = SelectRoleRequest,
    responses(
        (status = 200, description = "Role set"),
        (status = 400, description = "Unset is not selectable"),
        (status = 409, description = "Role already chosen")
    )
)]
pub async fn select_role(
    AuthUser { profile_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SelectRoleRequest>,
) -> Result<StatusCode, StatusCode> {
    if payload.role == Role::Unset {
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.repo.set_role(profile_id, payload.role).await {
        true => Ok(StatusCode::OK),
        false => Err(StatusCode::CONFLICT),
    }
}

/// list_professionals
///
/// [Public Route] Lists coaches with specialty filtering and search.
///
/// *Security*: The repository restricts the result set to coach roles
/// **unconditionally**, so client and role-unset profiles never leak into the
/// public directory.
#[utoipa::path(
    get,
    path = "/api/professionals",
    params(DirectoryFilter),
    responses((status = 200, description = "Coach directory", body = [Profile]))
)]
pub async fn list_professionals(
    State(state): State<AppState>,
    Query(filter): Query<DirectoryFilter>,
) -> Json<Vec<models::Profile>> {
    let coaches = state
        .repo
        .list_coaches(filter.specialty, filter.search)
        .await;
    Json(coaches)
}

/// get_professional
///
/// [Public Route] Retrieves a single coach profile by id.
/// Profiles that are not coaches resolve to 404, indistinguishable from absent.
#[utoipa::path(
    get,
    path = "/api/professionals/{id}",
    params(("id" = Uuid, Path, description = "Coach profile ID")),
    responses((status = 200, description = "Found", body = Profile))
)]
pub async fn get_professional(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::Profile>, StatusCode> {
    match state.repo.get_coach(id).await {
        Some(coach) => Ok(Json(coach)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// get_my_appointments
///
/// [Authenticated Route] Lists the requesting user's consultations, from
/// whichever side of the booking they sit on.
#[utoipa::path(
    get,
    path = "/api/me/appointments",
    responses((status = 200, description = "My appointments", body = [Appointment]))
)]
pub async fn get_my_appointments(
    AuthUser {
        profile_id, role, ..
    }: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<models::Appointment>> {
    let appointments = if role.is_coach() {
        state.repo.get_coach_appointments(profile_id).await
    } else {
        state.repo.get_client_appointments(profile_id).await
    };
    Json(appointments)
}

/// book_appointment
///
/// [Authenticated Route] Books a consultation with a coach.
///
/// *RBAC*: only clients book; coaches and role-unset accounts get 403.
/// The target must exist and hold a coach role (404 otherwise). A successful
/// booking also links the pair in `coach_client_links` (idempotent), which is
/// what puts the client on the coach's roster.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 200, description = "Booked", body = Appointment),
        (status = 403, description = "Not a client"),
        (status = 404, description = "No such coach")
    )
)]
pub async fn book_appointment(
    AuthUser {
        profile_id, role, ..
    }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<Json<models::Appointment>, StatusCode> {
    if role != Role::Client {
        return Err(StatusCode::FORBIDDEN);
    }

    // Validate the booking target before inserting anything.
    let coach = state
        .repo
        .get_coach(payload.coach_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    let appointment = state
        .repo
        .book_appointment(profile_id, payload)
        .await
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    // Put the client on the coach's roster. Repeat bookings are a no-op here.
    state
        .repo
        .link_client(CoachClientLink {
            coach_id: coach.id,
            client_id: profile_id,
        })
        .await;

    // TODO: notify the coach by email once the mail service is wired up.

    Ok(Json(appointment))
}

/// get_my_clients
///
/// [Coach Route] The coach's client roster.
///
/// *Authorization*: Explicitly checks that the resolved role is a coach role;
/// the page-level guard enforces the same predicate for the roster page, this
/// is the API-side half of that contract.
#[utoipa::path(
    get,
    path = "/api/coach/clients",
    responses(
        (status = 200, description = "Client roster", body = [Profile]),
        (status = 403, description = "Not a coach")
    )
)]
pub async fn get_my_clients(
    AuthUser {
        profile_id, role, ..
    }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<models::Profile>>, StatusCode> {
    if !role.is_coach() {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(Json(state.repo.get_clients(profile_id).await))
}

/// update_appointment_status
///
/// [Coach Route] Confirms or cancels a consultation.
///
/// *Authorization*: coach role required, and the repository predicates the
/// update on the appointment belonging to this coach — a foreign appointment id
/// affects zero rows and surfaces as 404.
#[utoipa::path(
    put,
    path = "/api/coach/appointments/{id}/status",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = AppointmentStatus,
    responses(
        (status = 200, description = "Updated", body = Appointment),
        (status = 403, description = "Not a coach"),
        (status = 404, description = "Not found or not yours")
    )
)]
pub async fn update_appointment_status(
    AuthUser {
        profile_id, role, ..
    }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(status): Json<AppointmentStatus>,
) -> Result<Json<models::Appointment>, StatusCode> {
    if !role.is_coach() {
        return Err(StatusCode::FORBIDDEN);
    }
    match state
        .repo
        .set_appointment_status(id, profile_id, status)
        .await
    {
        Some(appointment) => Ok(Json(appointment)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// register_user
///
/// [Public Route] Handles initial user registration via the external identity
/// provider.
///
/// *Flow*: Calls the provider's signup endpoint, retrieves the canonical user id,
/// and then uses that id to create the corresponding record in the application's
/// local `public.profiles` table with role `unset`. This keeps the identity
/// provider's key and our profile key synchronized while remaining distinct.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses((status = 200, description = "Registered", body = Profile))
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<models::Profile>, StatusCode> {
    // Step 1: Call the external identity provider.
    let client = reqwest::Client::new();
    let signup_url = format!("{}/auth/v1/signup", state.config.auth_url);

    let response = client
        .post(signup_url)
        .header("apikey", &state.config.auth_api_key)
        .header("Content-Type", "application/json")
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !response.status().is_success() {
        // Provider rejected the signup (e.g., email already exists, weak password).
        return Err(StatusCode::BAD_REQUEST);
    }

    // Step 2: Extract the canonical user id from the external response.
    let auth_user = response
        .json::<AuthSignupResponse>()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Step 3: Create the mirrored profile (role unset) in our local database.
    let profile = state
        .repo
        .create_profile(auth_user.id, payload.email, payload.full_name)
        .await
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(profile))
}
