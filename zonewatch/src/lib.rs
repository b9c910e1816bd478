//! ZoneWatch - geofence and route-deviation monitoring
//!
//! Watches a stream of position samples, from a live GPS tracker or a
//! built-in simulator, and raises alerts when the device leaves its safe
//! zones, stays outside too long, or strays from a confirmed route.
//!
//! # Architecture
//!
//! ```text
//! source / simulation ──► PositionSample ──► rules::evaluate ──► RuleFacts
//!                                                                   │
//!            notify::AlertSink ◄── AlertEvent ◄── alert::AlertStateMachine
//! ```
//!
//! - [`geo`]: distance and containment kernel
//! - [`rules`]: zones, routes and the per-sample evaluator
//! - [`alert`]: edge-triggered and debounced alert episodes
//! - [`source`]: live device polling
//! - [`simulation`]: synthetic samples
//! - [`engine`]: the engine and its tokio daemon
//! - [`notify`]: alert notices and sinks
//! - [`config`], [`logging`]: ambient setup

pub mod alert;
pub mod clock;
pub mod config;
pub mod engine;
pub mod geo;
pub mod logging;
pub mod notify;
pub mod rules;
pub mod simulation;
pub mod source;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
