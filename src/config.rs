//! Routing engine tuning, loaded from environment variables.
//!
//! Every knob has a default in [`crate::consts`]; a missing or unparsable
//! variable falls back to it.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{
    CONNECTOR_MAX_ROUTE_ATTEMPTS, CONNECTOR_MIN_SEGMENT_SIZE, CONNECTOR_OBSTACLE_CLEARANCE,
    CONNECTOR_ROUTE_BUDGET, HIT_SLOP_PX,
};
use crate::router::RouterOptions;

/// Tuning knobs for one routing engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingConfig {
    /// Connectors recomputed per tick. Unconditional picks count against it
    /// but are never cut.
    pub budget: usize,
    /// Length of the perpendicular leg leaving an anchored object.
    pub min_segment_size: f64,
    /// Gap kept between detour channels and obstacles.
    pub obstacle_clearance: f64,
    /// Rounds of blocking-region growth before settling for best effort.
    pub max_route_attempts: usize,
    /// Screen-space slop for hitting a connector path, in pixels.
    pub hit_slop_px: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            budget: CONNECTOR_ROUTE_BUDGET,
            min_segment_size: CONNECTOR_MIN_SEGMENT_SIZE,
            obstacle_clearance: CONNECTOR_OBSTACLE_CLEARANCE,
            max_route_attempts: CONNECTOR_MAX_ROUTE_ATTEMPTS,
            hit_slop_px: HIT_SLOP_PX,
        }
    }
}

impl RoutingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            budget: env_parse("CONNECTOR_ROUTE_BUDGET", CONNECTOR_ROUTE_BUDGET),
            min_segment_size: env_parse("CONNECTOR_MIN_SEGMENT_SIZE", CONNECTOR_MIN_SEGMENT_SIZE),
            obstacle_clearance: env_parse(
                "CONNECTOR_OBSTACLE_CLEARANCE",
                CONNECTOR_OBSTACLE_CLEARANCE,
            ),
            max_route_attempts: env_parse(
                "CONNECTOR_MAX_ROUTE_ATTEMPTS",
                CONNECTOR_MAX_ROUTE_ATTEMPTS,
            ),
            hit_slop_px: env_parse("CONNECTOR_HIT_SLOP_PX", HIT_SLOP_PX),
        }
    }

    /// The subset of settings the path router needs.
    #[must_use]
    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            min_segment_size: self.min_segment_size,
            obstacle_clearance: self.obstacle_clearance,
            max_route_attempts: self.max_route_attempts,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
