//! Shared numeric constants for the routing crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest scale used as a divisor when projecting client points to the board.
pub const VIEWPORT_SCALE_EPSILON: f64 = 1e-6;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for thin connector paths.
pub const HIT_SLOP_PX: f64 = 8.0;

// ── Routing ─────────────────────────────────────────────────────

/// Minimum length of the perpendicular leg leaving an anchored object.
pub const CONNECTOR_MIN_SEGMENT_SIZE: f64 = 24.0;

/// Gap kept between a detour channel and the obstacles it routes around.
pub const CONNECTOR_OBSTACLE_CLEARANCE: f64 = 16.0;

/// Rounds of blocking-region growth before the router settles for best effort.
pub const CONNECTOR_MAX_ROUTE_ATTEMPTS: usize = 3;

/// Connectors recomputed per tick once the unconditional picks are taken.
pub const CONNECTOR_ROUTE_BUDGET: usize = 12;

/// Tolerance for treating two coordinates as equal while building paths.
pub const GEOMETRY_EPSILON: f64 = 1e-6;
