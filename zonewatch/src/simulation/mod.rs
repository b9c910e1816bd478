//! Synthetic position sources
//!
//! The [`SimulationDriver`] stands in for a live device during demos and
//! tests. Each tick advances a progress counter and produces a sample
//! according to the [`SimulationKind`]:
//!
//! - `Static`: jitter around the start position
//! - `Intrusion`: straight-line motion at a heading and speed
//! - `Route` / `RouteOnce`: interpolation along the first monitored route
//!
//! Randomness comes from an injected [`rand::rngs::StdRng`] so runs can be
//! reproduced with a fixed seed.

mod driver;
mod state;

pub use driver::{
    interpolate_route, SimulationConfig, SimulationDriver, StepOutcome, DEFAULT_SCALE_FACTOR,
    DEFAULT_STEP, DEFAULT_STEP_SECONDS, DEFAULT_TICK_MS,
};
pub use state::{
    SimulationKind, SimulationState, DEFAULT_INTRUSION_DIRECTION_DEG, DEFAULT_INTRUSION_SPEED_KMH,
    MAX_INTRUSION_SPEED_KMH,
};
