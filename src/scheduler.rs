//! Recompute scheduling: which dirty connectors get rerouted this tick.
//!
//! Connectors without any cached route, and connectors flagged urgent, are
//! always recomputed. Everything else shares a fixed per-tick budget, handed out
//! round-robin by a cursor that persists across ticks so a connector that is
//! dirty every frame still gets its turn.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use crate::doc::ObjectId;

/// One dirty connector, as seen by the scheduler for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyConnectorEntry {
    pub connector_id: ObjectId,
    /// Urgent: recompute regardless of budget.
    pub priority: bool,
    pub has_cached_route: bool,
}

impl DirtyConnectorEntry {
    fn is_unconditional(&self) -> bool {
        self.priority || !self.has_cached_route
    }
}

/// Budgeted selector with a persistent round-robin cursor.
#[derive(Debug, Default)]
pub struct RecomputeScheduler {
    cursor: usize,
}

impl RecomputeScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current round-robin cursor.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Return the cursor to its initial position.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Pick the connectors to recompute this tick.
    ///
    /// Unconditional entries come first, in input order, and are not limited by
    /// `budget`. The remaining budget goes to cached, non-urgent entries
    /// starting at the cursor; the cursor then advances by the number picked,
    /// modulo the candidate count.
    pub fn select(&mut self, entries: &[DirtyConnectorEntry], budget: usize) -> Vec<ObjectId> {
        let mut selected: Vec<ObjectId> = entries
            .iter()
            .filter(|e| e.is_unconditional())
            .map(|e| e.connector_id)
            .collect();

        let remaining = budget.saturating_sub(selected.len());
        if remaining == 0 {
            return selected;
        }

        let candidates: Vec<ObjectId> = entries
            .iter()
            .filter(|e| !e.is_unconditional())
            .map(|e| e.connector_id)
            .collect();
        if candidates.is_empty() {
            return selected;
        }

        let count = remaining.min(candidates.len());
        let start = self.cursor % candidates.len();
        selected.extend((0..count).map(|i| candidates[(start + i) % candidates.len()]));
        self.cursor = (start + count) % candidates.len();
        selected
    }
}
