//! Shared node state for the HTTP handlers.

use bondsman_registry::BondEngine;
use std::sync::Arc;
use std::time::Instant;

/// Shared state for the running node, accessible from HTTP handlers.
pub struct NodeState {
    /// The bond engine serving every request.
    pub engine: Arc<BondEngine>,
    /// When the node started.
    pub start_time: Instant,
}

impl NodeState {
    pub fn new(engine: Arc<BondEngine>) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
