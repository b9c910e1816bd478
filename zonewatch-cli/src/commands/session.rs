//! Foreground monitoring session.
//!
//! Spawns a [`MonitorDaemon`], applies the starting command, then prints
//! samples and alerts until Ctrl+C, the optional duration elapses, or the
//! engine falls back to idle (device lost, one-shot route finished).

use std::sync::Arc;
use std::time::Duration;

use console::style;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use zonewatch::engine::{MonitorDaemon, MonitorHandle, MonitorStatus};
use zonewatch::notify::TracingSink;
use zonewatch::rules::GeometrySnapshot;
use zonewatch::simulation::SimulationKind;
use zonewatch::source::{HttpDeviceClient, SourceMode};

use super::common::{print_event, print_sample};
use crate::error::CliError;
use crate::runner::CliRunner;

/// How the session obtains samples.
#[derive(Debug, Clone, Copy)]
pub enum SessionStart {
    Live,
    Simulation(SimulationKind),
}

/// How often the session checks whether the engine went idle.
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Run a session to completion.
pub fn run(
    runner: &CliRunner,
    start: SessionStart,
    geometry: GeometrySnapshot,
    duration: Option<Duration>,
) -> Result<MonitorStatus, CliError> {
    let engine = runner.create_engine(geometry);
    let client = Arc::new(
        HttpDeviceClient::new(&engine.config().live)
            .map_err(|e| CliError::Monitor(e.into()))?,
    );
    let recipient = runner.config().alerts.recipient.clone();

    let runtime = runner.create_runtime()?;

    runtime.block_on(async move {
        let (daemon, handle) = MonitorDaemon::new(engine, client, TracingSink);
        let daemon_task = tokio::spawn(daemon.with_recipient(recipient).run());

        let shutdown = handle.shutdown_token();
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!("Shutting down...");
            shutdown.cancel();
        }) {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }

        let outcome = drive(&handle, start, duration).await;

        handle.shutdown();
        let status = match daemon_task.await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Monitor task ended abnormally");
                handle.status()
            }
        };

        outcome.map(|_| status)
    })
}

async fn drive(
    handle: &MonitorHandle,
    start: SessionStart,
    duration: Option<Duration>,
) -> Result<(), CliError> {
    let mut samples = handle.subscribe_samples();
    let mut events = handle.subscribe_events();

    match start {
        SessionStart::Live => {
            println!("Connecting to tracker...");
            handle.connect().await?;
            println!("{}", style("Connected").green().bold());
        }
        SessionStart::Simulation(kind) => {
            handle.start_simulation(kind).await?;
            println!("Simulating: {}", style(kind).cyan());
        }
    }
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = handle.shutdown_token();
    let deadline = duration.map(|d| tokio::time::Instant::now() + d);
    let mut idle_check = tokio::time::interval_at(
        tokio::time::Instant::now() + IDLE_CHECK_INTERVAL,
        IDLE_CHECK_INTERVAL,
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,

            _ = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            } => {
                info!("Session duration elapsed");
                break;
            }

            sample = samples.recv() => match sample {
                Ok(sample) => print_sample(&sample, handle.status().facts.as_ref()),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Console fell behind on samples"),
                Err(RecvError::Closed) => break,
            },

            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Console fell behind on alerts"),
                Err(RecvError::Closed) => break,
            },

            _ = idle_check.tick() => {
                if handle.status().mode == SourceMode::Idle {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Print the end-of-session summary.
pub fn print_summary(status: &MonitorStatus) {
    println!();
    println!("Session ended");
    println!("  Mode:        {}", status.mode);
    if let Some(sample) = &status.last_sample {
        println!(
            "  Last fix:    {:.6}, {:.6}",
            sample.latitude, sample.longitude
        );
    }
    if status.hardware_alarm_locked {
        println!("  {}", style("Hardware alarm was raised").red().bold());
    }
}
