//! Route cache: the last computed route per connector, keyed by the inputs it
//! was computed from.

#[cfg(test)]
#[path = "route_cache_test.rs"]
mod route_cache_test;

use std::collections::{HashMap, HashSet};

use crate::doc::ObjectId;
use crate::router::ConnectorRouteGeometry;

/// A memoized route and the key it was computed under.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCacheEntry {
    pub route_key: String,
    pub result: ConnectorRouteGeometry,
}

/// Per-connector route memo.
///
/// Entries go stale lazily: a lookup with a different key misses, and the next
/// `set` overwrites. Entries for deleted connectors only disappear through
/// [`RouteCache::cleanup`], which callers must run after deletions.
#[derive(Debug, Default)]
pub struct RouteCache {
    entries: HashMap<ObjectId, RouteCacheEntry>,
}

impl RouteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached route for `connector_id`, only if it was stored under exactly `route_key`.
    #[must_use]
    pub fn get(&self, connector_id: &ObjectId, route_key: &str) -> Option<&ConnectorRouteGeometry> {
        self.entries
            .get(connector_id)
            .filter(|entry| entry.route_key == route_key)
            .map(|entry| &entry.result)
    }

    /// Most recent route for `connector_id` regardless of key.
    ///
    /// Renderers and hit testing use this while a recompute is still pending.
    #[must_use]
    pub fn latest(&self, connector_id: &ObjectId) -> Option<&ConnectorRouteGeometry> {
        self.entries.get(connector_id).map(|entry| &entry.result)
    }

    /// Store a route, replacing whatever was cached for the connector.
    pub fn set(
        &mut self,
        connector_id: ObjectId,
        route_key: String,
        result: ConnectorRouteGeometry,
    ) {
        self.entries.insert(connector_id, RouteCacheEntry { route_key, result });
    }

    /// Drop entries for connectors not in `active`. Returns how many were removed.
    pub fn cleanup(&mut self, active: &HashSet<ObjectId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| active.contains(id));
        before - self.entries.len()
    }

    /// Drop one connector's entry, e.g. once its props stop parsing.
    pub fn remove(&mut self, connector_id: &ObjectId) -> Option<RouteCacheEntry> {
        self.entries.remove(connector_id)
    }

    #[must_use]
    pub fn contains(&self, connector_id: &ObjectId) -> bool {
        self.entries.contains_key(connector_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
