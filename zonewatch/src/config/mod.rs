//! User configuration
//!
//! `~/.zonewatch/config.ini` is read with `rust-ini`, overlaying defaults
//! with the values present, and mapped onto [`crate::engine::EngineConfig`].
//!
//! ```ini
//! [device]
//! address = 192.168.1.100
//!
//! [alerts]
//! debounce_ms = 5000
//! buffer_radius_m = 100
//! ```

mod edit;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use edit::{set_key, KeyUpdate};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{AlertSettings, ConfigFile, DeviceSettings, GeometrySettings, SimulationSettings};
