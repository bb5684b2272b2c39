// Raw cumulative CPU counters

/// Point-in-time read of a container's cumulative counters.
///
/// Fields are optional because the engine may omit any of them; a missing field
/// makes the pair unusable for a rate but is never an error on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// CPU time consumed by the container since it started (ns).
    pub cpu_usage_total: Option<u64>,
    /// CPU time consumed by the whole host since boot (ns).
    pub system_cpu_usage: Option<u64>,
    /// Logical CPUs visible to the container.
    pub online_cpu_count: Option<u32>,
}

impl StatsSnapshot {
    pub fn new(cpu_usage_total: u64, system_cpu_usage: u64, online_cpu_count: u32) -> Self {
        Self {
            cpu_usage_total: Some(cpu_usage_total),
            system_cpu_usage: Some(system_cpu_usage),
            online_cpu_count: Some(online_cpu_count),
        }
    }

    /// True when the counters were never populated (e.g. zeroed precpu block on the first read).
    pub fn is_empty(&self) -> bool {
        self.cpu_usage_total.unwrap_or(0) == 0 && self.system_cpu_usage.unwrap_or(0) == 0
    }
}

/// One stats read from the engine. `previous` is absent when the engine cannot supply it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsRead {
    pub previous: Option<StatsSnapshot>,
    pub current: StatsSnapshot,
}

impl StatsRead {
    pub fn paired(previous: StatsSnapshot, current: StatsSnapshot) -> Self {
        Self {
            previous: Some(previous),
            current,
        }
    }

    pub fn current_only(current: StatsSnapshot) -> Self {
        Self {
            previous: None,
            current,
        }
    }
}
