// Convert a raw Docker stats API response into a counter pair.

use crate::engine::StatsError;
use crate::models::{StatsRead, StatsSnapshot};
use bollard::models::{ContainerCpuStats, ContainerStatsResponse};

/// Extract the cpu_stats / precpu_stats pair. Exposed for unit tests.
///
/// A response without `cpu_stats` is malformed. A missing or zeroed `precpu_stats`
/// (first read after the container started) leaves `previous` empty.
pub(crate) fn process_statistics(s: &ContainerStatsResponse) -> Result<StatsRead, StatsError> {
    let cpu_stats = s
        .cpu_stats
        .as_ref()
        .ok_or_else(|| StatsError::Malformed("cpu_stats missing".into()))?;

    let current = snapshot(cpu_stats);
    let previous = s
        .precpu_stats
        .as_ref()
        .map(snapshot)
        .filter(|p| !p.is_empty());

    Ok(StatsRead { previous, current })
}

fn snapshot(cpu: &ContainerCpuStats) -> StatsSnapshot {
    let usage = cpu.cpu_usage.as_ref();
    // online_cpus is absent on some kernels; the per-CPU breakdown length is the documented fallback
    let online_cpu_count = cpu.online_cpus.or_else(|| {
        usage
            .and_then(|u| u.percpu_usage.as_ref())
            .filter(|p| !p.is_empty())
            .and_then(|p| u32::try_from(p.len()).ok())
    });

    StatsSnapshot {
        cpu_usage_total: usage.and_then(|u| u.total_usage),
        system_cpu_usage: cpu.system_cpu_usage,
        online_cpu_count,
    }
}
