//! Alert state machine
//!
//! Turns the per-sample [`RuleFacts`](crate::rules::RuleFacts) into
//! edge-triggered [`AlertEvent`]s:
//!
//! | Condition            | Trigger                                    | Re-arm                  |
//! |----------------------|--------------------------------------------|-------------------------|
//! | `OutOfZone`          | immediately on leaving every active zone   | entering any zone       |
//! | `StayLongOutOfZone`  | outside for the debounce delay             | entering any zone       |
//! | `RouteDeviation`     | off every monitored route for the delay    | back within the buffer  |
//!
//! Every condition emits at most one raise per episode. The device's
//! emergency button is handled separately by [`HardwareAlarmLatch`].

mod alarm;
mod machine;
mod types;

pub use alarm::{HardwareAlarmLatch, HARDWARE_ALARM_NOTE};
pub use machine::{
    AlertConfig, AlertStateMachine, DEFAULT_BUFFER_RADIUS_METERS, DEFAULT_DEBOUNCE_MS,
};
pub use types::{AlertCondition, AlertEvent, Episode};
