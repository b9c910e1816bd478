//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, geometry loading and engine
//! construction to reduce duplication across command handlers.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use zonewatch::config::ConfigFile;
use zonewatch::engine::MonitorEngine;
use zonewatch::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use zonewatch::rules::GeometrySnapshot;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&default_log_dir(), default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("ZoneWatch v{}", zonewatch::VERSION);
        info!("ZoneWatch CLI: {} command", command);
    }

    /// Load zones and routes.
    ///
    /// `override_path` wins over `geometry.file` from the config. With
    /// neither set the engine starts with no zones or routes.
    pub fn load_geometry(&self, override_path: Option<&Path>) -> Result<GeometrySnapshot, CliError> {
        let path = override_path.or(self.config.geometry.file.as_deref());

        match path {
            Some(path) => {
                let snapshot = GeometrySnapshot::load_from(path)?;
                info!(
                    path = %path.display(),
                    zones = snapshot.active_zone_count(),
                    routes = snapshot.monitored_route_count(),
                    "Loaded geometry"
                );
                Ok(snapshot)
            }
            None => {
                warn!("No geometry file configured; alerts stay inert until zones are loaded");
                Ok(GeometrySnapshot::default())
            }
        }
    }

    /// Build an idle engine from the loaded configuration.
    pub fn create_engine(&self, geometry: GeometrySnapshot) -> MonitorEngine {
        MonitorEngine::new(
            self.config.to_engine_config(),
            geometry,
            StdRng::from_os_rng(),
        )
    }

    /// Build the multi-threaded runtime used by long-running commands.
    pub fn create_runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }
}
