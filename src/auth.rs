use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::Role,
    repository::RepositoryState,
};

/// Name of the cookie carrying the session JWT for page navigation.
/// API clients may alternatively present the token as a Bearer header.
pub const SESSION_COOKIE: &str = "session_token";

/// Claims
///
/// Represents the standard payload structure expected inside a session JSON Web
/// Token (JWT). These claims are signed by the identity provider's secret and
/// validated upon every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the identity provider's user id. This is the key used to
    /// resolve the profile (and its role) from the public.profiles table.
    pub sub: Uuid,
    /// Expiration Time (exp): timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers use this struct
/// to retrieve the user's profile key and verify role permissions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The profile key (public.profiles.id) — distinct from the identity provider's user id.
    pub profile_id: Uuid,
    /// The identity provider's user id (JWT `sub`).
    pub user_id: Uuid,
    /// The user's role, used for Role-Based Access Control (RBAC).
    pub role: Role,
}

/// session_token
///
/// Pulls the raw session token out of the request headers, checking the
/// Authorization Bearer header first (API clients) and falling back to the
/// session cookie (browser navigation). Returns None when neither is present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            return Some(token.to_string());
        }
    }

    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let mut pair = cookie.trim().splitn(2, '=');
            let name = pair.next()?;
            let value = pair.next()?;
            if name == SESSION_COOKIE {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// decode_session
///
/// Decodes and validates a session JWT against the configured secret.
/// Expiration validation is always active.
pub fn decode_session(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated API handler. This cleanly separates
/// authentication (extractor) from business logic (the handler).
///
/// The entire process involves:
/// 1. Dependency Resolution: accessing Repository and AppConfig from the application state.
/// 2. Local Bypass: allowing development-time access using the 'x-user-id' header.
/// 3. Token Validation: Bearer/cookie token extraction and JWT decoding.
/// 4. DB Lookup: fetching the profile's current role and existence from PostgreSQL.
///
/// Rejection: Returns StatusCode::UNAUTHORIZED (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the Repository State from the app state.
    RepositoryState: FromRef<S>,
    // Allows the extractor to pull the AppConfig (for JWT secret and Env check).
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Local Development Bypass Check
        // If the application is running in Env::Local, we allow authentication by
        // providing a known, valid identity-provider user id in the 'x-user-id'
        // header. This accelerates development but is guarded by the Env check.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        // Crucially, we verify that this id maps to an actual profile
                        // in the local development database so roles are correctly loaded.
                        if let Ok(Some(profile)) = repo.get_profile_by_user(user_id).await {
                            return Ok(AuthUser {
                                profile_id: profile.id,
                                user_id: profile.user_id,
                                role: profile.role,
                            });
                        }
                    }
                }
            }
        }
        // If Env is Production, or if the bypass failed (e.g., header was bad or the
        // profile was not found), execution falls through to the standard JWT flow.

        // 3. Token Extraction (Bearer header or session cookie)
        let token = session_token(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;

        // 4. Decode and Validate the Token
        // Any failure kind (expired, bad signature, malformed) rejects with 401.
        let claims =
            decode_session(&token, &config.jwt_secret).map_err(|_| StatusCode::UNAUTHORIZED)?;

        // 5. Database Lookup (Final Verification)
        // Check the database for the profile's existence and retrieve its current
        // role. This prevents access if the account was deleted after the token
        // was issued. A failed lookup is treated as unauthenticated.
        let profile = repo
            .get_profile_by_user(claims.sub)
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser {
            profile_id: profile.id,
            user_id: profile.user_id,
            role: profile.role,
        })
    }
}
