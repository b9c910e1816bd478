//! Position sources
//!
//! Samples reach the engine from one of two places:
//!
//! - **Live device**: a [`LivePoller`] polls a [`DeviceClient`] at a fixed
//!   interval with a hard timeout. Readings arrive as [`RawSample`] and are
//!   validated into [`PositionSample`].
//! - **Simulation**: the [`crate::simulation`] driver produces
//!   [`PositionSample`] values directly on its own tick.
//!
//! Exactly one of the two supplies samples at any time; the engine enforces
//! this and tracks which one is current as a [`SourceMode`].

mod client;
mod config;
mod error;
mod poller;
mod sample;

pub use client::{DeviceClient, HttpDeviceClient};
pub use config::{
    LiveSourceConfig, DEFAULT_DEVICE_ADDRESS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_REQUEST_TIMEOUT_MS,
};
pub use error::SourceError;
pub use poller::LivePoller;
pub use sample::{PositionSample, RawSample};

/// Which source currently supplies samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// No source attached.
    #[default]
    Idle,
    /// Polling a live device.
    Live,
    /// Driven by the simulation driver.
    Simulation,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Live => write!(f, "Live"),
            Self::Simulation => write!(f, "Simulation"),
        }
    }
}

/// Live device connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Handshake succeeded and polling is running.
    Connected,
    /// Not polling (never connected, failed, or superseded by a simulation).
    #[default]
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}
