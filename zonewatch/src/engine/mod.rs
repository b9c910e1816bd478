//! Monitoring engine
//!
//! - [`MonitorEngine`]: synchronous core that owns geometry, alert episodes
//!   and the simulation driver, and enforces the single-source rule.
//! - [`MonitorDaemon`]: tokio event loop that feeds the engine from the
//!   simulation tick, the live poller and the debounce deadlines.
//! - [`MonitorHandle`]: cloneable control and subscription handle.

mod config;
mod daemon;
mod monitor;

pub use config::{EngineConfig, DEFAULT_INITIAL_POSITION};
pub use daemon::{MonitorCommand, MonitorDaemon, MonitorError, MonitorHandle};
pub use monitor::{Evaluation, MonitorEngine, MonitorStatus};
