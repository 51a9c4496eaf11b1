use coach_portal::guard::{GuardOutcome, Principal, RouteTable, evaluate};
use coach_portal::models::Role;

// The pure decision function is the heart of the access-control contract, so
// these tests exercise it directly, without a router or a database in sight.

fn table() -> RouteTable {
    RouteTable::standard()
}

const PROTECTED_PATHS: &[&str] = &[
    "/dashboard",
    "/dashboard/my-clients",
    "/settings",
    "/my-appointments",
    "/find-a-pro",
    "/professionals",
    "/role-selection",
];

#[test]
fn protected_paths_redirect_anonymous_to_login() {
    let table = table();
    for path in PROTECTED_PATHS {
        assert_eq!(
            evaluate(&table, path, &Principal::Anonymous),
            GuardOutcome::RedirectTo("/login"),
            "anonymous access to {path} must bounce to login"
        );
    }
}

#[test]
fn login_with_session_redirects_to_dashboard() {
    let table = table();
    for role in [Role::Unset, Role::Client, Role::Nutritionist, Role::Trainer] {
        assert_eq!(
            evaluate(&table, "/login", &Principal::Authenticated(role)),
            GuardOutcome::RedirectTo("/dashboard"),
            "signed-in {role:?} should be steered away from the login page"
        );
    }
}

#[test]
fn login_without_session_is_allowed() {
    assert_eq!(
        evaluate(&table(), "/login", &Principal::Anonymous),
        GuardOutcome::Allow
    );
}

#[test]
fn public_paths_allow_any_session_state() {
    let table = table();
    let principals = [
        Principal::Anonymous,
        Principal::Authenticated(Role::Unset),
        Principal::Authenticated(Role::Client),
        Principal::Authenticated(Role::Trainer),
    ];
    for path in ["/", "/about", "/pricing/annual"] {
        for principal in &principals {
            assert_eq!(
                evaluate(&table, path, principal),
                GuardOutcome::Allow,
                "public path {path} must always be reachable"
            );
        }
    }
}

#[test]
fn coach_only_page_blocks_clients() {
    // A client poking at the roster page lands back on their own dashboard.
    assert_eq!(
        evaluate(
            &table(),
            "/dashboard/my-clients",
            &Principal::Authenticated(Role::Client)
        ),
        GuardOutcome::RedirectTo("/dashboard")
    );
}

#[test]
fn coach_only_page_allows_both_coach_roles() {
    let table = table();
    for role in [Role::Nutritionist, Role::Trainer] {
        assert_eq!(
            evaluate(&table, "/dashboard/my-clients", &Principal::Authenticated(role)),
            GuardOutcome::Allow
        );
    }
}

#[test]
fn coach_only_page_redirects_anonymous_to_login() {
    // Authentication comes before authorization: no session means login, not dashboard.
    assert_eq!(
        evaluate(&table(), "/dashboard/my-clients", &Principal::Anonymous),
        GuardOutcome::RedirectTo("/login")
    );
}

#[test]
fn unset_role_is_funnelled_to_role_selection() {
    let table = table();
    for path in ["/dashboard", "/settings", "/my-appointments", "/find-a-pro"] {
        assert_eq!(
            evaluate(&table, path, &Principal::Authenticated(Role::Unset)),
            GuardOutcome::RedirectTo("/role-selection"),
            "{path} should funnel a role-unset session to role selection"
        );
    }
}

#[test]
fn role_selection_is_reachable_with_unset_role() {
    assert_eq!(
        evaluate(
            &table(),
            "/role-selection",
            &Principal::Authenticated(Role::Unset)
        ),
        GuardOutcome::Allow
    );
}

#[test]
fn prefix_matching_respects_segment_boundaries() {
    let table = table();
    // `/dashboard-x` shares a raw string prefix with `/dashboard` but is a
    // different path segment, so it must fall through to the public default.
    assert_eq!(
        evaluate(&table, "/dashboard-x", &Principal::Anonymous),
        GuardOutcome::Allow
    );
    // Nested segments under a protected prefix are still protected.
    assert_eq!(
        evaluate(&table, "/dashboard/reports/2026", &Principal::Anonymous),
        GuardOutcome::RedirectTo("/login")
    );
}

#[test]
fn api_and_infrastructure_paths_are_exempt() {
    let table = table();
    for path in [
        "/api/professionals",
        "/api/me",
        "/health",
        "/swagger-ui",
        "/api-docs/openapi.json",
        "/assets/app.css",
    ] {
        assert_eq!(
            evaluate(&table, path, &Principal::Anonymous),
            GuardOutcome::Allow,
            "{path} must be exempt from navigational classification"
        );
    }
}

#[test]
fn evaluation_is_idempotent() {
    let table = table();
    let cases = [
        ("/dashboard", Principal::Anonymous),
        ("/login", Principal::Authenticated(Role::Client)),
        ("/dashboard/my-clients", Principal::Authenticated(Role::Client)),
        ("/about", Principal::Authenticated(Role::Trainer)),
        ("/settings", Principal::Authenticated(Role::Unset)),
    ];
    for (path, principal) in cases {
        let first = evaluate(&table, path, &principal);
        let second = evaluate(&table, path, &principal);
        assert_eq!(first, second, "same input must yield the same outcome");
    }
}

#[test]
fn longest_prefix_wins_over_shorter_rules() {
    let table = table();
    // `/dashboard/my-clients` matches both the general `/dashboard` rule and
    // the coach-only rule; the longer (stricter) rule must decide.
    let rule = table.classify("/dashboard/my-clients").expect("classified");
    assert_eq!(rule.prefix, "/dashboard/my-clients");

    let rule = table.classify("/dashboard/anything-else").expect("classified");
    assert_eq!(rule.prefix, "/dashboard");
}
