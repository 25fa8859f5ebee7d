//! Connector routing engine for the collaborative whiteboard.
//!
//! This crate computes the paths connectors (lines and arrows) take between
//! board objects and keeps them valid as objects move. Routes leave anchored
//! objects perpendicular to their edges, detour around other objects, and are
//! recomputed incrementally under a per-tick budget so dragging stays smooth
//! with many connectors on screen. Rendering, persistence and sync are owned
//! by the host; this crate only reads geometry snapshots and produces route
//! geometry.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::RoutingEngine`]: per-board cache, scheduler cursor and dirty set |
//! | [`router`] | Obstacle-avoiding orthogonal path computation |
//! | [`scheduler`] | Budgeted, round-robin recompute selection |
//! | [`route_cache`] | Per-connector route memo keyed by route key |
//! | [`route_key`] | Route keys and obstacle signatures |
//! | [`hit`] | Hit-testing objects and connector paths |
//! | [`connector`] | Connector endpoints and their resolution against live geometry |
//! | [`doc`] | Board objects and the in-memory object store |
//! | [`geometry`] | Points, bounds, rotated geometry and anchors |
//! | [`viewport`] | Board/client coordinate transforms |
//! | [`config`] | Environment-driven tuning |
//! | [`consts`] | Shared numeric constants |

pub mod config;
pub mod connector;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod route_cache;
pub mod route_key;
pub mod router;
pub mod scheduler;
pub mod viewport;
