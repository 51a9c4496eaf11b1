/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. The Access Guard classifies every
/// navigational request up front; on top of that, access control is applied
/// explicitly at the module level (via Axum layers), preventing accidental
/// exposure of protected endpoints.

/// API routes accessible to all users (anonymous, read-only + registration).
/// Handlers must enforce visibility (coach roles only) at the Repository level.
pub mod public;

/// API routes protected by the `AuthUser` extractor middleware.
/// Requires a validated user session.
pub mod authenticated;

/// API routes restricted exclusively to coach roles (nutritionist/trainer).
/// Implements mandatory authorization checks.
pub mod coach;

/// Server-rendered navigational routes, classified by the Access Guard.
pub mod pages;
