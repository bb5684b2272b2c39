// Alert raised when a container is over the CPU threshold

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub container_name: String,
    pub usage_percent: f64,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    pub fn now(container_name: impl Into<String>, usage_percent: f64) -> Self {
        Self {
            container_name: container_name.into(),
            usage_percent,
            timestamp: Utc::now(),
        }
    }
}
