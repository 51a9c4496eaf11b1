use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{decode_session, session_token},
    config::Env,
    models::{Profile, Role},
};

// Redirect targets. These are the only three places the guard ever sends a
// browser; everything else passes through to the requested handler.
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const ROLE_SELECTION_PATH: &str = "/role-selection";

/// RouteClass
///
/// Static classification of a navigational path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable by anyone, any session state. The default for unmatched paths.
    Public,
    /// Requires an authenticated session.
    Protected,
    /// Entry pages (login) that authenticated users are steered away from.
    AuthOnly,
}

/// RoleRule
///
/// The required-role predicate attached to a route rule. Declarative rather
/// than ad-hoc role checks scattered through page handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRule {
    /// Any authenticated role (subject to the role-selection steering below).
    Any,
    /// Only profiles whose role is `nutritionist` or `trainer`.
    CoachOnly,
}

/// RouteRule
///
/// One entry of the route-classification table: a path prefix, its access class,
/// and the role predicate applied once a session is established.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub prefix: String,
    pub class: RouteClass,
    pub roles: RoleRule,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, class: RouteClass, roles: RoleRule) -> Self {
        Self {
            prefix: prefix.into(),
            class,
            roles,
        }
    }
}

/// GuardOutcome
///
/// The definite decision the guard produces for every request. There is no
/// error variant: all failure modes degrade to one of these two outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectTo(&'static str),
}

/// Principal
///
/// The session state the guard evaluates against the route table.
/// `Authenticated` carries only the role; the full profile travels separately
/// in the `RequestContext` so the pure decision function stays cheap to test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    /// No session, an invalid/expired token, or a failed session lookup.
    Anonymous,
    /// A verified session. A valid session whose profile row is missing
    /// resolves to `Role::Unset` and is steered to role selection.
    Authenticated(Role),
}

/// RequestContext
///
/// Request-scoped context injected by the guard on every allowed request,
/// carrying the resolved profile (if any) to downstream page handlers. This
/// replaces the hidden per-request singleton the pages would otherwise reach
/// for: the session is resolved exactly once, here.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub profile: Option<Profile>,
}

/// RouteTable
///
/// The static route-classification table. Built once at startup, shared
/// immutably across all requests (`Arc<RouteTable>` inside AppState), never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    // Prefixes excluded from classification entirely: static assets, API and
    // docs routes. Exemption avoids redirect loops on non-navigational requests.
    exempt: Vec<String>,
}

impl RouteTable {
    /// Builds a table from explicit rules and exemption prefixes.
    pub fn new(rules: Vec<RouteRule>, exempt: Vec<String>) -> Self {
        Self { rules, exempt }
    }

    /// standard
    ///
    /// The platform's route classification. The coach-only roster page sits
    /// under `/dashboard`, relying on longest-prefix matching to win over the
    /// general dashboard rule.
    pub fn standard() -> Self {
        use RouteClass::*;
        let rules = vec![
            RouteRule::new(DASHBOARD_PATH, Protected, RoleRule::Any),
            RouteRule::new("/dashboard/my-clients", Protected, RoleRule::CoachOnly),
            RouteRule::new("/settings", Protected, RoleRule::Any),
            RouteRule::new("/my-appointments", Protected, RoleRule::Any),
            RouteRule::new("/find-a-pro", Protected, RoleRule::Any),
            RouteRule::new("/professionals", Protected, RoleRule::Any),
            RouteRule::new(ROLE_SELECTION_PATH, Protected, RoleRule::Any),
            RouteRule::new(LOGIN_PATH, AuthOnly, RoleRule::Any),
        ];
        let exempt = ["/api", "/api-docs", "/swagger-ui", "/assets", "/static", "/health", "/favicon.ico"]
            .into_iter()
            .map(String::from)
            .collect();
        Self::new(rules, exempt)
    }

    /// Whether a path is exempt from classification (assets, API, docs).
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt.iter().any(|p| prefix_matches(p, path))
    }

    /// classify
    ///
    /// Longest-prefix match against the rule set, on path-segment boundaries.
    /// Returns None for unmatched paths, which are treated as public.
    pub fn classify(&self, path: &str) -> Option<&RouteRule> {
        self.rules
            .iter()
            .filter(|rule| prefix_matches(&rule.prefix, path))
            .max_by_key(|rule| rule.prefix.len())
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// prefix_matches
///
/// Prefix comparison on path-segment boundaries: `/dashboard` matches
/// `/dashboard` and `/dashboard/my-clients` but **not** `/dashboard-x`.
/// A raw starts_with here would silently widen every protected prefix.
fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// evaluate
///
/// The pure access decision: `(path, principal) -> Allow | RedirectTo`.
/// Deterministic and side-effect free, so evaluating twice on the same input
/// always yields the same outcome.
///
/// Decision order:
/// 1. Exempt paths pass through untouched.
/// 2. Unmatched paths are public: always allowed, any session state.
/// 3. Protected + no session -> login.
/// 4. Auth-only (login page) + session -> dashboard.
/// 5. Protected + session with role still unset -> role selection
///    (unless already there).
/// 6. Coach-only rule + non-coach role -> dashboard.
/// 7. Everything else is allowed.
pub fn evaluate(table: &RouteTable, path: &str, principal: &Principal) -> GuardOutcome {
    if table.is_exempt(path) {
        return GuardOutcome::Allow;
    }

    let Some(rule) = table.classify(path) else {
        // Fail-open for navigation: unclassified paths are public.
        return GuardOutcome::Allow;
    };

    match (rule.class, principal) {
        (RouteClass::Public, _) => GuardOutcome::Allow,

        (RouteClass::AuthOnly, Principal::Authenticated(_)) => {
            GuardOutcome::RedirectTo(DASHBOARD_PATH)
        }
        (RouteClass::AuthOnly, Principal::Anonymous) => GuardOutcome::Allow,

        (RouteClass::Protected, Principal::Anonymous) => GuardOutcome::RedirectTo(LOGIN_PATH),
        (RouteClass::Protected, Principal::Authenticated(role)) => {
            if *role == Role::Unset && !prefix_matches(ROLE_SELECTION_PATH, path) {
                // The account exists but has not chosen how it uses the
                // platform yet; every protected page funnels to role selection.
                GuardOutcome::RedirectTo(ROLE_SELECTION_PATH)
            } else if rule.roles == RoleRule::CoachOnly && !role.is_coach() {
                GuardOutcome::RedirectTo(DASHBOARD_PATH)
            } else {
                GuardOutcome::Allow
            }
        }
    }
}

/// resolve_principal
///
/// Performs the guard's single session lookup for the request and maps every
/// failure mode to a definite principal:
/// - no/invalid/expired token        -> Anonymous
/// - session-store lookup **error**  -> Anonymous (logged; fail-closed for
///   protected routes, fail-open for public ones)
/// - valid session, profile missing  -> Authenticated(Unset)
/// - valid session, profile found    -> Authenticated(role)
async fn resolve_principal(headers: &HeaderMap, state: &AppState) -> (Principal, Option<Profile>) {
    // Local development bypass, mirroring the AuthUser extractor. Guarded by the
    // Env check so it cannot activate in production.
    if state.config.env == Env::Local {
        if let Some(value) = headers.get("x-user-id") {
            if let Some(user_id) = value.to_str().ok().and_then(|v| Uuid::parse_str(v).ok()) {
                if let Ok(Some(profile)) = state.repo.get_profile_by_user(user_id).await {
                    let role = profile.role;
                    return (Principal::Authenticated(role), Some(profile));
                }
            }
        }
    }

    let Some(token) = session_token(headers) else {
        return (Principal::Anonymous, None);
    };

    let claims = match decode_session(&token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            // Expired or malformed tokens are routine; not worth more than debug.
            tracing::debug!("session token rejected: {:?}", e.kind());
            return (Principal::Anonymous, None);
        }
    };

    match state.repo.get_profile_by_user(claims.sub).await {
        Ok(Some(profile)) => {
            let role = profile.role;
            (Principal::Authenticated(role), Some(profile))
        }
        // Valid session, no profile row yet: treat as role-unset so the user
        // lands on role selection instead of a dead end.
        Ok(None) => (Principal::Authenticated(Role::Unset), None),
        Err(e) => {
            tracing::warn!(
                "session lookup failed, treating request as unauthenticated: {:?}",
                e
            );
            (Principal::Anonymous, None)
        }
    }
}

/// access_guard
///
/// The middleware enforcing the route-classification table over all
/// navigational routes. On `Allow` it injects the `RequestContext` and passes
/// the request through; otherwise it answers with a 303 redirect. No error ever
/// propagates past this function.
pub async fn access_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let (principal, profile) = resolve_principal(request.headers(), &state).await;

    match evaluate(&state.routes, &path, &principal) {
        GuardOutcome::Allow => {
            request.extensions_mut().insert(RequestContext { profile });
            next.run(request).await
        }
        GuardOutcome::RedirectTo(target) => {
            tracing::debug!(path = %path, target = %target, "access guard redirect");
            Redirect::to(target).into_response()
        }
    }
}
