// Periodic CPU sampling loop.
//
// One tick: enumerate running containers, read stats for each in turn, compute
// usage, log it and alert over the threshold. A failure for one container is
// logged against that container and the tick moves on; only a failed
// enumeration stops the loop.

use crate::alert::AlertSink;
use crate::engine::{ContainerEngine, EngineError, StatsError};
use crate::models::{AlertEvent, ContainerRef, StatsSnapshot};
use crate::usage::{self, UsagePercent};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_CPU_THRESHOLD_PERCENT: f64 = 80.0;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Upper bound on a single container's stats read.
pub const STATS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Alert when usage is strictly above this.
    pub cpu_threshold_percent: f64,
    /// Sleep between ticks.
    pub poll_interval: Duration,
    pub stats_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            cpu_threshold_percent: DEFAULT_CPU_THRESHOLD_PERCENT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            stats_timeout: STATS_TIMEOUT,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub containers: usize,
    /// (container name, usage) for every container that produced a reading.
    pub readings: Vec<(String, UsagePercent)>,
    pub alerts: usize,
    /// Names of containers whose stats could not be read.
    pub failures: Vec<String>,
    /// Containers seen for the first time with no previous counters to diff against.
    pub baselines: usize,
    /// Shutdown was requested before every container was processed.
    pub abandoned: bool,
}

enum Sample {
    Usage(UsagePercent),
    Baseline,
    Cancelled,
}

struct LastSeen {
    tick: u64,
    snapshot: StatsSnapshot,
}

pub struct Sampler<E, S> {
    engine: E,
    sink: S,
    config: SamplerConfig,
    // current snapshot per container id, used when the engine does not supply a previous one
    last_seen: HashMap<String, LastSeen>,
    tick: u64,
}

impl<E: ContainerEngine, S: AlertSink> Sampler<E, S> {
    pub fn new(engine: E, sink: S, config: SamplerConfig) -> Self {
        Self {
            engine,
            sink,
            config,
            last_seen: HashMap::new(),
            tick: 0,
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Number of containers with a remembered snapshot.
    pub fn tracked_containers(&self) -> usize {
        self.last_seen.len()
    }

    /// Tick, sleep, repeat until `cancel` fires (Ok) or enumeration fails (Err).
    #[instrument(skip_all, fields(
        threshold = self.config.cpu_threshold_percent,
        poll_interval_secs = self.config.poll_interval.as_secs()
    ))]
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), EngineError> {
        info!("Sampler running");
        while !cancel.is_cancelled() {
            match self.tick(&cancel).await {
                Ok(summary) => debug!(
                    tick = self.tick,
                    containers = summary.containers,
                    readings = summary.readings.len(),
                    alerts = summary.alerts,
                    failures = summary.failures.len(),
                    "tick complete"
                ),
                Err(e) => {
                    error!(error = %e, "Container engine connection failed; stopping monitor");
                    return Err(e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
        info!("Sampler stopped");
        Ok(())
    }

    /// One pass over all running containers.
    pub async fn tick(&mut self, cancel: &CancellationToken) -> Result<TickSummary, EngineError> {
        self.tick += 1;

        let containers = tokio::select! {
            _ = cancel.cancelled() => {
                return Ok(TickSummary { abandoned: true, ..Default::default() });
            }
            res = self.engine.list_running_containers() => res?,
        };

        let mut summary = TickSummary {
            containers: containers.len(),
            ..Default::default()
        };
        if containers.is_empty() {
            info!("No running containers.");
        }

        for container in &containers {
            if cancel.is_cancelled() {
                summary.abandoned = true;
                break;
            }
            match self.sample(container, cancel).await {
                Ok(Sample::Usage(percent)) => self.report(container, percent, &mut summary),
                Ok(Sample::Baseline) => summary.baselines += 1,
                Ok(Sample::Cancelled) => {
                    summary.abandoned = true;
                    break;
                }
                Err(e) => {
                    error!(
                        container = %container.name,
                        container_id = %container.id,
                        error = %e,
                        "Error fetching stats for container {}: {}",
                        container.name,
                        e
                    );
                    summary.failures.push(container.name.clone());
                }
            }
        }

        let running: HashSet<&str> = containers.iter().map(|c| c.id.as_str()).collect();
        self.last_seen.retain(|id, _| running.contains(id.as_str()));

        if summary.abandoned {
            debug!("Shutdown requested; tick abandoned");
        }
        Ok(summary)
    }

    async fn sample(
        &mut self,
        container: &ContainerRef,
        cancel: &CancellationToken,
    ) -> Result<Sample, StatsError> {
        let timeout = self.config.stats_timeout;
        let read = tokio::select! {
            _ = cancel.cancelled() => return Ok(Sample::Cancelled),
            res = tokio::time::timeout(timeout, self.engine.get_stats(container)) => {
                res.map_err(|_| StatsError::Timeout(timeout))??
            }
        };

        // only a snapshot from the immediately preceding tick may stand in for `previous`
        let tick = self.tick;
        let fallback = self
            .last_seen
            .insert(
                container.id.clone(),
                LastSeen {
                    tick,
                    snapshot: read.current,
                },
            )
            .filter(|last| last.tick + 1 == tick)
            .map(|last| last.snapshot);

        let Some(previous) = read.previous.or(fallback) else {
            debug!(container = %container.name, "No previous counters yet; baseline recorded");
            return Ok(Sample::Baseline);
        };

        let reading = usage::assess(&previous, &read.current);
        if let Some(reason) = reading.degradation() {
            warn!(
                container = %container.name,
                reason = %reason,
                "Could not calculate CPU usage for container {}",
                container.name
            );
        }
        Ok(Sample::Usage(reading.percent()))
    }

    fn report(&self, container: &ContainerRef, percent: UsagePercent, summary: &mut TickSummary) {
        info!(
            container = %container.name,
            usage_percent = percent,
            "Container {} CPU usage: {:.2}%",
            container.name,
            percent
        );
        summary.readings.push((container.name.clone(), percent));

        if percent > self.config.cpu_threshold_percent {
            warn!(
                container = %container.name,
                usage_percent = percent,
                threshold = self.config.cpu_threshold_percent,
                "High CPU usage: {} - {:.2}%",
                container.name,
                percent
            );
            self.sink.emit(&AlertEvent::now(container.name.clone(), percent));
            summary.alerts += 1;
        }
    }
}
