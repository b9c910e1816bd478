//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::process;

use zonewatch::config::ConfigFileError;
use zonewatch::engine::MonitorError;
use zonewatch::rules::GeometryFileError;
use zonewatch::source::SourceError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to load zones and routes
    Geometry(GeometryFileError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// The monitor rejected a command or the device could not be reached
    Monitor(MonitorError),
}

impl CliError {
    /// Exit the process with an error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Monitor(MonitorError::Connect(e)) = self {
            eprintln!();
            eprintln!("Could not reach the tracker. Check that:");
            eprintln!("  1. The device is powered and on the same network");
            eprintln!("  2. device.address is correct: zonewatch config get device.address");
            if matches!(e, SourceError::Timeout { .. }) {
                eprintln!("  3. device.timeout_ms is long enough for your network");
            }
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Geometry(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::Monitor(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Geometry(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Monitor(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<GeometryFileError> for CliError {
    fn from(e: GeometryFileError) -> Self {
        CliError::Geometry(e)
    }
}

impl From<MonitorError> for CliError {
    fn from(e: MonitorError) -> Self {
        CliError::Monitor(e)
    }
}
