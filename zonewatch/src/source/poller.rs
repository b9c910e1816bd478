//! Live device poller.
//!
//! Holds at most one in-flight request. Issuing a new request drops the
//! previous future, which cancels it, so a slow answer can never overwrite a
//! newer one. Every request is bounded by a hard timeout and there is no
//! retry: a failure is reported to the caller, which decides whether to
//! reconnect.
//!
//! # Usage
//!
//! ```ignore
//! let mut poller = LivePoller::new(client, Duration::from_millis(3000));
//! poller.issue();
//!
//! tokio::select! {
//!     Some(result) = poller.wait(), if poller.is_in_flight() => { /* handle */ }
//!     _ = poll_interval.tick() => poller.issue(), // supersedes the old request
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use super::client::DeviceClient;
use super::error::SourceError;
use super::sample::RawSample;

/// Poller owning the single in-flight device request.
pub struct LivePoller<C: DeviceClient> {
    client: Arc<C>,
    timeout: Duration,
    in_flight: Option<BoxFuture<'static, Result<RawSample, SourceError>>>,
    requests_issued: u64,
    requests_superseded: u64,
}

impl<C: DeviceClient + 'static> LivePoller<C> {
    /// Create a poller with a hard per-request timeout.
    pub fn new(client: Arc<C>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            in_flight: None,
            requests_issued: 0,
            requests_superseded: 0,
        }
    }

    /// Start a new request, cancelling any request still in flight.
    pub fn issue(&mut self) {
        if self.in_flight.take().is_some() {
            self.requests_superseded += 1;
            tracing::debug!(
                superseded = self.requests_superseded,
                "Superseding in-flight device request"
            );
        }

        let client = Arc::clone(&self.client);
        let timeout = self.timeout;
        self.in_flight = Some(Box::pin(async move {
            fetch_with_timeout(client.as_ref(), timeout).await
        }));
        self.requests_issued += 1;
    }

    /// Returns true while a request is pending.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drop the in-flight request, if any.
    ///
    /// Returns true if a request was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.in_flight.take().is_some()
    }

    /// Wait for the in-flight request to finish.
    ///
    /// Returns `None` immediately when nothing is in flight. Dropping the
    /// returned future leaves the request pending, so this is safe to use as
    /// a `select!` branch.
    pub async fn wait(&mut self) -> Option<Result<RawSample, SourceError>> {
        let request = self.in_flight.as_mut()?;
        let result = request.await;
        self.in_flight = None;
        Some(result)
    }

    /// Connection handshake: one bounded request whose reading must carry a
    /// latitude.
    pub fn handshake(
        &self,
    ) -> impl std::future::Future<Output = Result<RawSample, SourceError>> + Send + 'static {
        let client = Arc::clone(&self.client);
        let timeout = self.timeout;
        async move {
            let raw = fetch_with_timeout(client.as_ref(), timeout).await?;
            if raw.lat.map_or(true, |lat| lat == 0.0) {
                return Err(SourceError::InvalidSample(
                    "device response carries no latitude".to_string(),
                ));
            }
            Ok(raw)
        }
    }

    /// Total requests issued.
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Requests dropped because a newer one was issued.
    pub fn requests_superseded(&self) -> u64 {
        self.requests_superseded
    }
}

async fn fetch_with_timeout<C: DeviceClient>(
    client: &C,
    timeout: Duration,
) -> Result<RawSample, SourceError> {
    match tokio::time::timeout(timeout, client.fetch_sample()).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Mock device that answers after a fixed delay with an increasing latitude.
    struct SlowDevice {
        delay: Duration,
        calls: AtomicU64,
    }

    impl SlowDevice {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                calls: AtomicU64::new(0),
            })
        }
    }

    impl DeviceClient for SlowDevice {
        async fn fetch_sample(&self) -> Result<RawSample, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            Ok(RawSample::at(n as f64, 106.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_completes() {
        let mut poller = LivePoller::new(SlowDevice::new(Duration::from_millis(100)), Duration::from_secs(3));
        poller.issue();

        let result = poller.wait().await.unwrap().unwrap();
        assert_eq!(result.lat, Some(1.0));
        assert!(!poller.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_times_out() {
        let mut poller = LivePoller::new(SlowDevice::new(Duration::from_secs(10)), Duration::from_millis(3000));
        poller.issue();

        let result = poller.wait().await.unwrap();
        assert!(matches!(result, Err(SourceError::Timeout { timeout_ms: 3000 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_request_supersedes_old() {
        let device = SlowDevice::new(Duration::from_millis(500));
        let mut poller = LivePoller::new(Arc::clone(&device), Duration::from_secs(3));

        poller.issue();
        // Let the first request start, then supersede it
        let _ = tokio::time::timeout(Duration::from_millis(100), poller.wait()).await;
        assert!(poller.is_in_flight());
        poller.issue();

        let result = poller.wait().await.unwrap().unwrap();
        assert_eq!(result.lat, Some(2.0), "only the newest request may answer");
        assert_eq!(poller.requests_issued(), 2);
        assert_eq!(poller.requests_superseded(), 1);
    }

    #[tokio::test]
    async fn test_wait_without_request() {
        let mut poller = LivePoller::new(SlowDevice::new(Duration::ZERO), Duration::from_secs(1));
        assert!(poller.wait().await.is_none());
        assert!(!poller.cancel());
    }

    struct NoFixDevice;

    impl DeviceClient for NoFixDevice {
        async fn fetch_sample(&self) -> Result<RawSample, SourceError> {
            Ok(RawSample::default())
        }
    }

    #[tokio::test]
    async fn test_handshake_requires_latitude() {
        let poller = LivePoller::new(Arc::new(NoFixDevice), Duration::from_secs(1));
        let result = poller.handshake().await;
        assert!(matches!(result, Err(SourceError::InvalidSample(_))));
    }
}
