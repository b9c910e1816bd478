//! Configuration for the live device source.

use std::time::Duration;

/// Default device address.
pub const DEFAULT_DEVICE_ADDRESS: &str = "192.168.1.100";

/// Default hard timeout for a single device request (ms).
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Default interval between device polls (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Path of the position endpoint on the device.
const GPS_ENDPOINT: &str = "/gps";

/// Configuration for polling a live device.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSourceConfig {
    /// Device host or URL. `http://` is assumed when no scheme is given.
    pub address: String,

    /// Hard timeout for a single request.
    pub request_timeout: Duration,

    /// Interval between polls.
    pub poll_interval: Duration,
}

impl LiveSourceConfig {
    /// Create a config for a device address with default timings.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Full URL of the position endpoint.
    pub fn endpoint_url(&self) -> String {
        let base = self.address.trim().trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{}{}", base, GPS_ENDPOINT)
        } else {
            format!("http://{}{}", base, GPS_ENDPOINT)
        }
    }
}

impl Default for LiveSourceConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_DEVICE_ADDRESS.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}
