// Shared test helpers: scripted engine, recording alert sink, log capture

#![allow(dead_code)]

use async_trait::async_trait;
use cpuwatch::alert::AlertSink;
use cpuwatch::engine::{ContainerEngine, EngineError, StatsError};
use cpuwatch::models::*;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

#[derive(Debug, Clone)]
pub enum StatsBehavior {
    Read(StatsRead),
    Fail,
    Hang,
}

/// Engine whose listing and per-container stats are scripted by the test.
/// Each container's behaviors are consumed in order; the last one repeats.
#[derive(Default)]
pub struct FakeEngine {
    containers: Mutex<Vec<ContainerRef>>,
    stats: Mutex<HashMap<String, VecDeque<StatsBehavior>>>,
    fail_listing: AtomicBool,
    list_calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    cancel_after_lists: Mutex<Option<(usize, CancellationToken)>>,
    cancel_on_fetch: Mutex<Option<(String, CancellationToken)>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, id: &str, behaviors: Vec<StatsBehavior>) -> Self {
        self.containers
            .lock()
            .unwrap()
            .push(ContainerRef::new(id, id));
        self.stats
            .lock()
            .unwrap()
            .insert(id.to_string(), behaviors.into());
        self
    }

    pub fn remove_container(&self, id: &str) {
        self.containers.lock().unwrap().retain(|c| c.id != id);
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Cancel `token` once the listing has been served `n` times.
    pub fn cancel_after_lists(&self, n: usize, token: CancellationToken) {
        *self.cancel_after_lists.lock().unwrap() = Some((n, token));
    }

    /// Cancel `token` while serving stats for `id`.
    pub fn cancel_on_fetch(&self, id: &str, token: CancellationToken) {
        *self.cancel_on_fetch.lock().unwrap() = Some((id.to_string(), token));
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn next_behavior(&self, id: &str) -> StatsBehavior {
        let mut stats = self.stats.lock().unwrap();
        let queue = stats.get_mut(id).expect("unscripted container");
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().expect("empty script")
        }
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn list_running_containers(&self) -> Result<Vec<ContainerRef>, EngineError> {
        let calls = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(EngineError::new("engine unreachable"));
        }
        if let Some((n, token)) = self.cancel_after_lists.lock().unwrap().as_ref()
            && calls >= *n
        {
            token.cancel();
        }
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn get_stats(&self, container: &ContainerRef) -> Result<StatsRead, StatsError> {
        self.fetched.lock().unwrap().push(container.id.clone());
        if let Some((id, token)) = self.cancel_on_fetch.lock().unwrap().as_ref()
            && *id == container.id
        {
            token.cancel();
        }
        match self.next_behavior(&container.id) {
            StatsBehavior::Read(read) => Ok(read),
            StatsBehavior::Fail => Err(StatsError::unavailable("container vanished")),
            StatsBehavior::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AlertEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn emit(&self, event: &AlertEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// A paired read whose usage is `cpu_delta / system_delta * online * 100`.
pub fn read(cpu_delta: u64, system_delta: u64, online: u32) -> StatsBehavior {
    StatsBehavior::Read(StatsRead::paired(
        StatsSnapshot::new(1_000, 100_000, online),
        StatsSnapshot::new(1_000 + cpu_delta, 100_000 + system_delta, online),
    ))
}

/// A read carrying only the current counters.
pub fn current_only(cpu: u64, system: u64, online: u32) -> StatsBehavior {
    StatsBehavior::Read(StatsRead::current_only(StatsSnapshot::new(cpu, system, online)))
}

/// Collects (level, message) for every event while installed as the thread's default subscriber.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        use tracing_subscriber::prelude::*;
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, level: Level, text: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, msg)| *l == level && msg.contains(text))
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.lines
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}
