// Domain models

mod alert;
mod container;
mod stats;

pub use alert::AlertEvent;
pub use container::ContainerRef;
pub use stats::{StatsRead, StatsSnapshot};
