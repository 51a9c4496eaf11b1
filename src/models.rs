use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The closed set of roles a profile can hold. Every profile starts as `Unset`
/// and is moved exactly once, during role selection, to one of the concrete roles.
/// Modelling this as an enum (rather than a free-form string) makes the
/// role-gating in the Access Guard and the handlers exhaustive: a new role cannot
/// be added without the compiler pointing at every match that must handle it.
///
/// Stored in the `profiles.role` text column in lowercase form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    /// Fresh account; the user has not yet chosen how they use the platform.
    #[default]
    Unset,
    /// A client looking for coaching.
    Client,
    /// A coach specialising in nutrition plans.
    Nutritionist,
    /// A coach specialising in training programmes.
    Trainer,
}

impl Role {
    /// Whether this role identifies a coach (authorized to view client rosters).
    pub fn is_coach(&self) -> bool {
        matches!(self, Role::Nutritionist | Role::Trainer)
    }

    /// Lowercase wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unset => "unset",
            Role::Client => "client",
            Role::Nutritionist => "nutritionist",
            Role::Trainer => "trainer",
        }
    }
}

/// Profile
///
/// The application-level user record stored in the `public.profiles` table.
/// Keyed by its own `id`, deliberately distinct from `user_id` (the identity
/// provider's key found in the session JWT `sub` claim).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    // Primary key of the profile record itself.
    pub id: Uuid,
    // FK to the external identity provider's user id (JWT `sub`).
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    // The RBAC field; `unset` until role selection completes.
    pub role: Role,
    pub bio: Option<String>,
    // Free-form coaching specialties (e.g., "weight loss", "marathon prep").
    pub specialties: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CoachClientLink
///
/// A single row of the `coach_client_links` association table. Created
/// idempotently the first time a client books a coach; read by the roster page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CoachClientLink {
    // Composite PK component 1: the coach profile.
    pub coach_id: Uuid,
    // Composite PK component 2: the linked client profile.
    pub client_id: Uuid,
}

/// AppointmentStatus
///
/// Lifecycle of a booked consultation. New bookings start `Pending` and are
/// confirmed or cancelled by the coach.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// Appointment
///
/// A booked consultation between a client and a coach, from the
/// `public.appointments` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Appointment {
    pub id: Uuid,
    // FK to profiles.id (the coach being consulted).
    pub coach_id: Uuid,
    // FK to profiles.id (the client who booked).
    pub client_id: Uuid,
    #[ts(type = "string")]
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// Note: The password is only passed through to the external identity provider
/// and never persisted or logged internally by this application.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// SelectRoleRequest
///
/// Input payload for the one-time role selection (POST /api/me/role).
/// `Role::Unset` is not an acceptable selection and is rejected by the handler.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SelectRoleRequest {
    pub role: Role,
}

/// UpdateProfileRequest
///
/// Partial update payload for the authenticated user's own profile
/// (PUT /api/me/profile).
///
/// Uses `Option<T>` for all fields and `#[serde(skip_serializing_if = "Option::is_none")]`
/// to efficiently handle partial updates, ensuring only provided fields are included
/// in the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
}

/// BookAppointmentRequest
///
/// Input payload for booking a consultation with a coach (POST /api/appointments).
/// The client identity is taken from the authenticated session, never the payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BookAppointmentRequest {
    pub coach_id: Uuid,
    #[ts(type = "string")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
