use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, CoachClientLink, Profile, Role,
    UpdateProfileRequest,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the guard and the handlers to
/// interact with the data layer without knowing the specific implementation
/// (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Profiles / Auth ---
    /// Resolves the profile for an identity-provider user id (the JWT `sub`).
    ///
    /// Unlike the listing methods below, database errors are surfaced rather than
    /// swallowed: the Access Guard must be able to tell a *failed* lookup (treated
    /// as unauthenticated) apart from an *absent* profile (treated as role-unset).
    async fn get_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error>;
    async fn get_profile(&self, id: Uuid) -> Option<Profile>;
    /// Creates the mirroring profile record after external identity signup.
    /// New profiles always start with role `unset`.
    async fn create_profile(
        &self,
        user_id: Uuid,
        email: String,
        full_name: String,
    ) -> Option<Profile>;
    /// One-shot role selection: succeeds only while the stored role is still `unset`.
    /// Returns false if the profile does not exist or the role was already chosen.
    async fn set_role(&self, profile_id: Uuid, role: Role) -> bool;
    /// Partial self-service profile update. Uses COALESCE for unset fields.
    async fn update_profile(&self, profile_id: Uuid, req: UpdateProfileRequest)
    -> Option<Profile>;

    // --- Coach Directory ---
    /// Public directory listing: profiles holding a coach role, with optional
    /// exact specialty filter and case-insensitive name/bio search.
    async fn list_coaches(&self, specialty: Option<String>, search: Option<String>)
    -> Vec<Profile>;
    /// Retrieves a single profile *only* if it holds a coach role.
    async fn get_coach(&self, id: Uuid) -> Option<Profile>;

    // --- Roster ---
    /// Idempotent operation: returns true if a row was inserted, false otherwise (conflict).
    async fn link_client(&self, link: CoachClientLink) -> bool;
    /// The coach's client roster, via the `coach_client_links` association.
    async fn get_clients(&self, coach_id: Uuid) -> Vec<Profile>;

    // --- Appointments ---
    async fn book_appointment(
        &self,
        client_id: Uuid,
        req: BookAppointmentRequest,
    ) -> Option<Appointment>;
    async fn get_client_appointments(&self, client_id: Uuid) -> Vec<Appointment>;
    async fn get_coach_appointments(&self, coach_id: Uuid) -> Vec<Appointment>;
    /// Coach-Only: updates status only if `coach_id` matches the appointment's coach.
    async fn set_appointment_status(
        &self,
        id: Uuid,
        coach_id: Uuid,
        status: AppointmentStatus,
    ) -> Option<Appointment>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Shared column list; keeps the SELECTs for `Profile` rows in one place.
const PROFILE_COLUMNS: &str =
    "id, user_id, email, full_name, role, bio, specialties, created_at, updated_at";

const APPOINTMENT_COLUMNS: &str =
    "id, coach_id, client_id, scheduled_at, status, notes, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    /// get_profile_by_user
    ///
    /// Session-resolution lookup used on every guarded request. Errors propagate
    /// to the caller; the guard downgrades them to "no session".
    async fn get_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// get_profile
    ///
    /// Simple retrieval by profile key.
    async fn get_profile(&self, id: Uuid) -> Option<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_profile error: {:?}", e);
            None
        })
    }

    /// create_profile
    ///
    /// Creates the mirroring profile record in `public.profiles` after external
    /// identity signup succeeds. Role starts as 'unset' until role selection.
    async fn create_profile(
        &self,
        user_id: Uuid,
        email: String,
        full_name: String,
    ) -> Option<Profile> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (id, user_id, email, full_name, role, bio, specialties, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, 'unset', NULL, '{{}}', NOW(), NOW()) \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(new_id)
        .bind(user_id)
        .bind(email)
        .bind(full_name)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_profile error: {:?}", e);
            None
        })
    }

    /// set_role
    ///
    /// The `AND role = 'unset'` predicate makes role selection a one-shot
    /// operation at the database level: a second selection affects zero rows.
    async fn set_role(&self, profile_id: Uuid, role: Role) -> bool {
        let result =
            sqlx::query("UPDATE profiles SET role = $2, updated_at = NOW() WHERE id = $1 AND role = 'unset'")
                .bind(profile_id)
                .bind(role)
                .execute(&self.pool)
                .await;
        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("set_role error: {:?}", e);
                false
            }
        }
    }

    /// update_profile
    ///
    /// Uses the PostgreSQL `COALESCE` function to efficiently handle `Option<T>`
    /// fields, only updating a column if the corresponding field in `req` is `Some`.
    async fn update_profile(
        &self,
        profile_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Option<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles \
             SET full_name = COALESCE($2, full_name), \
                 bio = COALESCE($3, bio), \
                 specialties = COALESCE($4, specialties), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(profile_id)
        .bind(req.full_name)
        .bind(req.bio)
        .bind(req.specialties)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_profile error: {:?}", e);
            None
        })
    }

    /// list_coaches
    ///
    /// Implements flexible search/filtering using QueryBuilder for safe
    /// parameterization. The base query restricts results to coach roles, so
    /// clients and role-unset profiles never appear in the public directory.
    async fn list_coaches(
        &self,
        specialty: Option<String>,
        search: Option<String>,
    ) -> Vec<Profile> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role IN ('nutritionist', 'trainer') "
        ));

        if let Some(s) = specialty {
            builder.push(" AND ");
            builder.push_bind(s);
            builder.push(" = ANY(specialties)");
        }

        if let Some(s) = search {
            // Case-insensitive search across the name and bio fields.
            let search_pattern = format!("%{}%", s);
            builder.push(" AND (full_name ILIKE ");
            builder.push_bind(search_pattern.clone());
            builder.push(" OR bio ILIKE ");
            builder.push_bind(search_pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY full_name ASC");

        let query = builder.build_query_as::<Profile>();

        match query.fetch_all(&self.pool).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("list_coaches error: {:?}", e);
                vec![]
            }
        }
    }

    /// get_coach
    ///
    /// Retrieves a profile *only* if it holds a coach role. Used by the public
    /// detail handler and to validate booking targets.
    async fn get_coach(&self, id: Uuid) -> Option<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles \
             WHERE id = $1 AND role IN ('nutritionist', 'trainer')"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_coach error: {:?}", e);
            None
        })
    }

    /// link_client
    ///
    /// Inserts a coach/client association. Uses `ON CONFLICT DO NOTHING` to ensure
    /// **idempotency**: repeat bookings with the same coach do not duplicate the link.
    async fn link_client(&self, link: CoachClientLink) -> bool {
        let result = sqlx::query(
            "INSERT INTO coach_client_links (coach_id, client_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(link.coach_id)
        .bind(link.client_id)
        .execute(&self.pool)
        .await;
        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                // A true conflict (already linked) does not error, only database errors are caught here.
                tracing::error!("link_client error: {:?}", e);
                false
            }
        }
    }

    /// get_clients
    ///
    /// The coach's roster: every client profile linked to the coach.
    async fn get_clients(&self, coach_id: Uuid) -> Vec<Profile> {
        let query = format!(
            "SELECT p.id, p.user_id, p.email, p.full_name, p.role, p.bio, p.specialties, p.created_at, p.updated_at \
             FROM profiles p \
             JOIN coach_client_links l ON p.id = l.client_id \
             WHERE l.coach_id = $1 \
             ORDER BY p.full_name ASC"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(coach_id)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_clients error: {:?}", e);
                vec![]
            })
    }

    /// book_appointment
    ///
    /// Inserts a new consultation. All bookings start as 'pending', awaiting
    /// confirmation by the coach.
    async fn book_appointment(
        &self,
        client_id: Uuid,
        req: BookAppointmentRequest,
    ) -> Option<Appointment> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Appointment>(&format!(
            "INSERT INTO appointments (id, coach_id, client_id, scheduled_at, status, notes, created_at) \
             VALUES ($1, $2, $3, $4, 'pending', $5, NOW()) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(new_id)
        .bind(req.coach_id)
        .bind(client_id)
        .bind(req.scheduled_at)
        .bind(req.notes)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("book_appointment error: {:?}", e);
            None
        })
    }

    /// get_client_appointments
    async fn get_client_appointments(&self, client_id: Uuid) -> Vec<Appointment> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE client_id = $1 ORDER BY scheduled_at ASC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_client_appointments error: {:?}", e);
            vec![]
        })
    }

    /// get_coach_appointments
    async fn get_coach_appointments(&self, coach_id: Uuid) -> Vec<Appointment> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE coach_id = $1 ORDER BY scheduled_at ASC"
        ))
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_coach_appointments error: {:?}", e);
            vec![]
        })
    }

    /// set_appointment_status
    ///
    /// Updates the appointment lifecycle state. The `coach_id` predicate is the
    /// **Coach-Only** ownership check: a coach can only touch their own bookings.
    async fn set_appointment_status(
        &self,
        id: Uuid,
        coach_id: Uuid,
        status: AppointmentStatus,
    ) -> Option<Appointment> {
        sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments SET status = $3 WHERE id = $1 AND coach_id = $2 \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(coach_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_appointment_status error: {:?}", e);
            None
        })
    }
}
