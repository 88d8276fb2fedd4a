pub mod heartbeat;
pub mod notified_state;
pub mod presence;
pub mod stream_monitor;

pub use notified_state::{NotifiedState, Transition};
pub use stream_monitor::{StreamMonitor, TickReport, DEFAULT_POLL_INTERVAL};
