//! `zonewatch config` subcommands.
//!
//! Keys are validated when the command line is parsed. Reads fail loudly on
//! an invalid file instead of showing defaults, and `set` only rewrites the
//! one key it was given.

use std::path::Path;

use clap::Subcommand;
use console::style;
use zonewatch::config::{config_file_path, set_key, ConfigFile, ConfigKey, KeyUpdate};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Key in section.key form (e.g. alerts.debounce_ms)
        #[arg(value_parser = parse_key)]
        key: ConfigKey,
    },

    /// Change one setting, keeping the rest of the file
    Set {
        /// Key in section.key form (e.g. alerts.debounce_ms)
        #[arg(value_parser = parse_key)]
        key: ConfigKey,

        /// New value
        value: String,
    },

    /// List every setting with its default
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Get { key } => {
            let config = ConfigFile::load_from(&path)?;
            println!("{}", display_value(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let update = set_key(&path, key, &value)?;
            print_update(key, &update);
        }
        ConfigCommands::List => {
            let config = ConfigFile::load_from(&path)?;
            println!("{}", style(path.display()).dim());
            println!();
            for line in list_lines(&config) {
                println!("{}", line);
            }
        }
        ConfigCommands::Path => print_path(&path),
    }
    Ok(())
}

fn parse_key(s: &str) -> Result<ConfigKey, String> {
    s.parse::<ConfigKey>()
        .map_err(|e| format!("{} (run 'zonewatch config list' for valid keys)", e))
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn print_update(key: ConfigKey, update: &KeyUpdate) {
    println!("Set {} = {}", key.name(), update.stored);
    if let Some(e) = &update.remaining {
        println!(
            "{} {}",
            style("Warning:").yellow().bold(),
            style(format!("{}. Other entries were left as written.", e)).yellow()
        );
    }
}

fn print_path(path: &Path) {
    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} {}", path.display(), style("(not created yet)").dim());
    }
}

/// One line per key, grouped by section. Values that differ from the
/// default carry the default alongside.
fn list_lines(config: &ConfigFile) -> Vec<String> {
    let defaults = ConfigFile::default();
    let mut lines = Vec::new();
    let mut section = "";

    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                lines.push(String::new());
            }
            section = key.section();
            lines.push(format!("[{}]", section));
        }

        let value = key.get(config);
        let default = key.get(&defaults);
        let mut line = format!("  {} = {}", key.key_name(), display_value(&value));
        if value != default {
            line.push_str(&format!(
                " {}",
                style(format!("(default: {})", display_value(&default))).dim()
            ));
        }
        lines.push(line);
    }

    lines
}
