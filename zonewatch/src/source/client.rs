//! Device client trait and HTTP implementation.
//!
//! The [`DeviceClient`] trait abstracts over how a reading is fetched so the
//! poller and the daemon can be driven by a mock in tests. [`HttpDeviceClient`]
//! fetches the JSON reading from the tracker's `/gps` endpoint via `reqwest`.

use std::future::Future;

use super::config::LiveSourceConfig;
use super::error::SourceError;
use super::sample::RawSample;

/// Trait for fetching one raw reading from a device.
pub trait DeviceClient: Send + Sync {
    /// Fetch the current reading.
    fn fetch_sample(&self) -> impl Future<Output = Result<RawSample, SourceError>> + Send;
}

/// Device client using direct HTTP requests.
pub struct HttpDeviceClient {
    /// Reusable HTTP client with connection pooling.
    http: reqwest::Client,

    /// Full URL of the position endpoint.
    url: String,
}

impl HttpDeviceClient {
    /// Create a client for the configured device.
    ///
    /// The request timeout is also applied at the HTTP layer so sockets do
    /// not outlive a cancelled poll.
    pub fn new(config: &LiveSourceConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            http,
            url: config.endpoint_url(),
        })
    }

    /// URL this client polls.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DeviceClient for HttpDeviceClient {
    async fn fetch_sample(&self) -> Result<RawSample, SourceError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let raw: RawSample =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Json(e.to_string()))?;

        tracing::trace!(url = %self.url, ?raw, "Device reading fetched");

        Ok(raw)
    }
}
