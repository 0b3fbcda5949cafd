/// Depth and time budget for one search.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    /// Iterative deepening stops after this depth. At least 1.
    pub max_depth: u32,
    /// Wall-clock budget; `None` searches until depth or cancellation.
    pub max_time_ms: Option<u64>,
}

impl SearchLimits {
    /// Depth-only limits.
    pub fn depth(max_depth: u32) -> Self {
        Self {
            max_depth: max_depth.max(1),
            max_time_ms: None,
        }
    }

    /// Raw host-facing form: a negative `time_limit_ms` disables the
    /// time limit.
    pub fn new(max_depth: u32, time_limit_ms: i64) -> Self {
        Self {
            max_depth: max_depth.max(1),
            max_time_ms: (time_limit_ms > 0).then_some(time_limit_ms as u64),
        }
    }

    pub fn with_time(max_depth: u32, max_time_ms: u64) -> Self {
        Self {
            max_depth: max_depth.max(1),
            max_time_ms: Some(max_time_ms),
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(64)
    }
}
