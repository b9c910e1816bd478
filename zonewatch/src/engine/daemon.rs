//! Monitor daemon.
//!
//! Runs a [`MonitorEngine`] on a single tokio task. All state changes happen
//! inside one `select!` loop, so a source switch and the timer cancellation
//! it implies are atomic with respect to every other event.
//!
//! ```text
//!                 ┌──────────────────── MonitorDaemon::run ───────────────────┐
//! MonitorHandle ──┼─► commands ─┐                                             │
//!                 │  sim tick ──┼─► MonitorEngine ─► AlertEvent ─► AlertSink  │
//!                 │  poll tick ─┤        │                 └──► broadcast     │
//!                 │  reading ───┤        └─► PositionSample ──► broadcast     │
//!                 │  deadline ──┘                                             │
//!                 └───────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::monitor::{Evaluation, MonitorEngine, MonitorStatus};
use crate::alert::AlertEvent;
use crate::clock::MonotonicClock;
use crate::notify::{AlertNotice, AlertSink};
use crate::rules::GeometrySnapshot;
use crate::simulation::SimulationKind;
use crate::source::{DeviceClient, LivePoller, PositionSample, RawSample, SourceError, SourceMode};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const BROADCAST_CAPACITY: usize = 64;

/// Errors returned by [`MonitorHandle`].
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("monitor is not running")]
    Closed,

    #[error("device connection failed: {0}")]
    Connect(#[from] SourceError),
}

/// Requests accepted by the daemon.
#[derive(Debug)]
pub enum MonitorCommand {
    StartSimulation(SimulationKind),
    StopSimulation,
    /// Probe the device and switch to live polling on success.
    Connect {
        reply: oneshot::Sender<Result<(), SourceError>>,
    },
    Disconnect,
    UpdateGeometry(GeometrySnapshot),
    Shutdown,
}

/// Cloneable handle for controlling and observing a running daemon.
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<MonitorCommand>,
    samples: broadcast::Sender<PositionSample>,
    events: broadcast::Sender<AlertEvent>,
    status: Arc<RwLock<MonitorStatus>>,
    shutdown: CancellationToken,
}

impl MonitorHandle {
    async fn send(&self, command: MonitorCommand) -> Result<(), MonitorError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| MonitorError::Closed)
    }

    pub async fn start_simulation(&self, kind: SimulationKind) -> Result<(), MonitorError> {
        self.send(MonitorCommand::StartSimulation(kind)).await
    }

    pub async fn stop_simulation(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::StopSimulation).await
    }

    /// Connect to the live device, waiting for the handshake result.
    ///
    /// The handshake runs on the daemon task. Until it finishes, for at most
    /// the configured request timeout, no other command, tick or shutdown
    /// request is processed.
    pub async fn connect(&self) -> Result<(), MonitorError> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::Connect { reply }).await?;
        rx.await.map_err(|_| MonitorError::Closed)??;
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::Disconnect).await
    }

    pub async fn update_geometry(&self, snapshot: GeometrySnapshot) -> Result<(), MonitorError> {
        self.send(MonitorCommand::UpdateGeometry(snapshot)).await
    }

    /// Latest published status.
    pub fn status(&self) -> MonitorStatus {
        self.status.read().clone()
    }

    /// Receive every evaluated sample.
    pub fn subscribe_samples(&self) -> broadcast::Receiver<PositionSample> {
        self.samples.subscribe()
    }

    /// Receive every alert event, including clears.
    pub fn subscribe_events(&self) -> broadcast::Receiver<AlertEvent> {
        self.events.subscribe()
    }

    /// Ask the daemon to stop.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token that stops the daemon when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

/// Event loop driving a [`MonitorEngine`].
pub struct MonitorDaemon<C: DeviceClient, S: AlertSink> {
    engine: MonitorEngine,
    poller: LivePoller<C>,
    sink: S,
    recipient: Option<String>,
    commands: mpsc::Receiver<MonitorCommand>,
    samples: broadcast::Sender<PositionSample>,
    events: broadcast::Sender<AlertEvent>,
    status: Arc<RwLock<MonitorStatus>>,
    shutdown: CancellationToken,
}

impl<C: DeviceClient + 'static, S: AlertSink> MonitorDaemon<C, S> {
    /// Create a daemon and its control handle.
    pub fn new(engine: MonitorEngine, client: Arc<C>, sink: S) -> (Self, MonitorHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (samples, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        let status = Arc::new(RwLock::new(engine.status()));
        let shutdown = CancellationToken::new();
        let poller = LivePoller::new(client, engine.config().live.request_timeout);

        let handle = MonitorHandle {
            commands: command_tx,
            samples: samples.clone(),
            events: events.clone(),
            status: Arc::clone(&status),
            shutdown: shutdown.clone(),
        };

        let daemon = Self {
            engine,
            poller,
            sink,
            recipient: None,
            commands: command_rx,
            samples,
            events,
            status,
            shutdown,
        };

        (daemon, handle)
    }

    /// Address carried in every alert notice.
    pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
        self.recipient = recipient;
        self
    }

    /// Run until shutdown. Returns the final status.
    pub async fn run(mut self) -> MonitorStatus {
        let clock = MonotonicClock::new();

        let mut sim_tick = tokio::time::interval(self.engine.config().simulation.tick_interval);
        sim_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll_tick = tokio::time::interval(self.engine.config().live.poll_interval);
        poll_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            zones = self.engine.geometry().active_zone_count(),
            routes = self.engine.geometry().monitored_route_count(),
            "Monitor started"
        );

        loop {
            let deadline = self.engine.next_deadline().map(|ms| clock.instant_at(ms));
            let simulating = self.engine.is_simulating();
            let live = self.engine.mode() == SourceMode::Live;
            let in_flight = self.poller.is_in_flight();

            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,

                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    match command {
                        MonitorCommand::Shutdown => break,
                        MonitorCommand::StartSimulation(kind) => {
                            self.poller.cancel();
                            self.engine.start_simulation(kind);
                            sim_tick.reset();
                        }
                        MonitorCommand::StopSimulation => {
                            self.engine.stop_simulation();
                        }
                        MonitorCommand::Connect { reply } => {
                            let result = self.connect().await;
                            if result.is_ok() {
                                poll_tick.reset();
                            }
                            self.publish_status();
                            let _ = reply.send(result);
                        }
                        MonitorCommand::Disconnect => {
                            self.poller.cancel();
                            self.engine.disconnect_live();
                        }
                        MonitorCommand::UpdateGeometry(snapshot) => {
                            self.engine.set_geometry(snapshot);
                        }
                    }
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    let events = self.engine.poll_deadlines(clock.now_ms());
                    self.dispatch(events);
                }

                _ = sim_tick.tick(), if simulating => {
                    if let Some(evaluation) = self.engine.simulation_step(clock.now_ms()) {
                        self.publish(evaluation);
                    }
                }

                _ = poll_tick.tick(), if live => self.poller.issue(),

                Some(result) = self.poller.wait(), if live && in_flight => {
                    self.handle_reading(result, clock.now_ms());
                }
            }

            self.publish_status();
        }

        self.poller.cancel();
        self.engine.stop_simulation();
        self.engine.disconnect_live();
        self.publish_status();

        tracing::info!(
            requests = self.poller.requests_issued(),
            superseded = self.poller.requests_superseded(),
            "Monitor stopped"
        );

        self.engine.status()
    }

    async fn connect(&mut self) -> Result<(), SourceError> {
        self.poller.cancel();
        self.engine.begin_connect();
        self.publish_status();

        match self.poller.handshake().await {
            Ok(_) => {
                self.engine.connect_live();
                self.poller.issue();
                Ok(())
            }
            Err(e) => {
                self.engine.source_failed(&e);
                Err(e)
            }
        }
    }

    fn handle_reading(&mut self, result: Result<RawSample, SourceError>, now_ms: u64) {
        match result {
            Ok(raw) => match self.engine.ingest_raw(&raw, now_ms) {
                Ok(Some(evaluation)) => self.publish(evaluation),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Discarding device reading"),
            },
            Err(e) => {
                self.poller.cancel();
                self.engine.source_failed(&e);
            }
        }
    }

    fn publish(&mut self, evaluation: Evaluation) {
        self.publish_status();
        // No subscribers is fine
        let _ = self.samples.send(evaluation.sample);
        self.dispatch(evaluation.events);
    }

    fn dispatch(&mut self, events: Vec<AlertEvent>) {
        if events.is_empty() {
            return;
        }
        self.publish_status();

        for event in events {
            if let Some(notice) = AlertNotice::from_event(&event, self.recipient.as_deref()) {
                self.sink.deliver(notice);
            }
            let _ = self.events.send(event);
        }
    }

    fn publish_status(&self) {
        *self.status.write() = self.engine.status();
    }
}
