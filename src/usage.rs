// CPU usage from two consecutive counter snapshots.
//
// Never fails: anything that prevents a real rate yields 0.0 together with the
// reason, and the caller decides how loudly to report it.

use crate::models::StatsSnapshot;

/// CPU usage in percent of one CPU; ranges up to `100 * online_cpu_count`.
pub type UsagePercent = f64;

/// Outcome of comparing two snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Both deltas positive.
    Measured(UsagePercent),
    /// Host time advanced but the container consumed none. A real zero reading,
    /// so it stays off the degraded (warning) path.
    Idle,
    /// No usable rate; reported as 0.0.
    Degraded(Degradation),
}

impl Reading {
    pub fn percent(&self) -> UsagePercent {
        match self {
            Reading::Measured(p) => *p,
            Reading::Idle | Reading::Degraded(_) => 0.0,
        }
    }

    pub fn degradation(&self) -> Option<Degradation> {
        match self {
            Reading::Degraded(d) => Some(*d),
            _ => None,
        }
    }
}

/// Why a snapshot pair could not produce a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Degradation {
    #[error("{snapshot} snapshot is missing {field}")]
    MissingField {
        snapshot: &'static str,
        field: &'static str,
    },
    #[error("system CPU delta is not positive ({0})")]
    NoSystemDelta(i128),
    #[error("container CPU delta is negative ({0})")]
    NegativeCpuDelta(i128),
    #[error("no online CPUs reported")]
    NoOnlineCpus,
}

/// Usage percent for `previous` -> `current`, 0.0 whenever it cannot be computed.
pub fn compute(previous: &StatsSnapshot, current: &StatsSnapshot) -> UsagePercent {
    assess(previous, current).percent()
}

/// Like [`compute`] but keeps the reason a reading fell back to zero.
pub fn assess(previous: &StatsSnapshot, current: &StatsSnapshot) -> Reading {
    let missing = |snapshot, field| Reading::Degraded(Degradation::MissingField { snapshot, field });

    let Some(prev_cpu) = previous.cpu_usage_total else {
        return missing("previous", "cpu_usage_total");
    };
    let Some(prev_system) = previous.system_cpu_usage else {
        return missing("previous", "system_cpu_usage");
    };
    let Some(cur_cpu) = current.cpu_usage_total else {
        return missing("current", "cpu_usage_total");
    };
    let Some(cur_system) = current.system_cpu_usage else {
        return missing("current", "system_cpu_usage");
    };
    let Some(online) = current.online_cpu_count else {
        return missing("current", "online_cpu_count");
    };

    let cpu_delta = i128::from(cur_cpu) - i128::from(prev_cpu);
    let system_delta = i128::from(cur_system) - i128::from(prev_system);

    if system_delta <= 0 {
        return Reading::Degraded(Degradation::NoSystemDelta(system_delta));
    }
    if cpu_delta < 0 {
        return Reading::Degraded(Degradation::NegativeCpuDelta(cpu_delta));
    }
    // zero cpu delta over elapsed host time is an idle container, not a failed read
    if cpu_delta == 0 {
        return Reading::Idle;
    }
    if online == 0 {
        return Reading::Degraded(Degradation::NoOnlineCpus);
    }

    Reading::Measured((cpu_delta as f64 / system_delta as f64) * f64::from(online) * 100.0)
}
