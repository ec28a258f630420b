use std::time::{Duration, Instant};

/// Wall-clock and node-count deadlines, polled at every node. Either check tripping
/// raises an abort that unwinds the whole recursion (see `search::negamax`).
pub struct BudgetSupervisor {
    start_time: Instant,
    time_limit: Duration,
    node_count: u64,
    node_limit: u64, // 0 = unlimited
}

impl BudgetSupervisor {
    pub fn new(time_limit_ms: u64, node_limit: u64) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit: Duration::from_millis(time_limit_ms),
            node_count: 0,
            node_limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn record_node(&mut self) {
        self.node_count += 1;
    }

    pub fn wall_clock_expired(&self) -> bool {
        self.time_limit > Duration::ZERO && self.start_time.elapsed() > self.time_limit
    }

    pub fn node_limit_exceeded(&self) -> bool {
        self.node_limit > 0 && self.node_count > self.node_limit
    }

    pub fn should_abort(&self) -> bool {
        self.wall_clock_expired() || self.node_limit_exceeded()
    }
}
