// Alert sinks

use crate::models::AlertEvent;

/// Receives alerts synchronously at the point of detection.
pub trait AlertSink: Send + Sync {
    fn emit(&self, event: &AlertEvent);
}

/// Default sink: writes the alert to the log at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn emit(&self, event: &AlertEvent) {
        tracing::error!(
            container = %event.container_name,
            usage_percent = event.usage_percent,
            timestamp = %event.timestamp.to_rfc3339(),
            "ALERT: Container '{}' exceeded CPU threshold with {:.2}%",
            event.container_name,
            event.usage_percent
        );
    }
}

impl<S: AlertSink + ?Sized> AlertSink for std::sync::Arc<S> {
    fn emit(&self, event: &AlertEvent) {
        (**self).emit(event)
    }
}
