//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use console::style;
use zonewatch::alert::AlertEvent;
use zonewatch::rules::RuleFacts;
use zonewatch::simulation::SimulationKind;
use zonewatch::source::PositionSample;

/// Simulation selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum SimulationArg {
    /// Jitter around the starting position
    Static,
    /// Move in a straight line at a fixed heading
    Intrusion,
    /// Loop along the first confirmed route
    Route,
    /// Follow the first confirmed route once, then stop
    RouteOnce,
}

impl SimulationArg {
    /// Convert to a simulation kind. Heading and speed only apply to intrusion.
    pub fn to_kind(self, direction_deg: Option<f64>, speed_kmh: Option<f64>) -> SimulationKind {
        match self {
            SimulationArg::Static => SimulationKind::Static,
            SimulationArg::Intrusion => SimulationKind::intrusion(direction_deg, speed_kmh),
            SimulationArg::Route => SimulationKind::Route,
            SimulationArg::RouteOnce => SimulationKind::RouteOnce,
        }
    }
}

/// One-word summary of rule facts for the sample line.
pub fn facts_label(facts: &RuleFacts) -> String {
    let zone = if !facts.has_active_zones {
        style("no zones").dim()
    } else if facts.inside_any_active_zone {
        style("in zone").green()
    } else {
        style("OUT OF ZONE").red().bold()
    };

    let route = if !facts.has_active_routes {
        style("no routes").dim()
    } else if facts.near_any_active_route {
        style("on route").green()
    } else {
        style("OFF ROUTE").yellow().bold()
    };

    format!("{} | {}", zone, route)
}

/// Print one position sample.
pub fn print_sample(sample: &PositionSample, facts: Option<&RuleFacts>) {
    let label = facts.map(facts_label).unwrap_or_default();
    println!(
        "  {:>11.6}, {:>11.6}  {:>5.1} km/h  {}",
        sample.latitude, sample.longitude, sample.speed_kmh, label
    );
}

/// Print one alert event.
pub fn print_event(event: &AlertEvent) {
    match event {
        AlertEvent::Raised {
            condition,
            latitude,
            longitude,
            note,
            ..
        } => {
            println!(
                "{} {} at {:.6}, {:.6}",
                style("ALERT").red().bold(),
                style(condition).bold(),
                latitude,
                longitude
            );
            if let Some(note) = note {
                println!("      {}", note);
            }
        }
        AlertEvent::HardwareAlarm {
            latitude,
            longitude,
            ..
        } => {
            println!(
                "{} {} at {:.6}, {:.6}",
                style("ALERT").red().bold(),
                style("Hardware alarm").bold(),
                latitude,
                longitude
            );
        }
        AlertEvent::Cleared { condition, .. } => {
            println!("{} {}", style("CLEAR").green().bold(), condition);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrusion_arg_uses_overrides() {
        let kind = SimulationArg::Intrusion.to_kind(Some(90.0), Some(20.0));
        assert_eq!(
            kind,
            SimulationKind::Intrusion {
                direction_deg: 90.0,
                speed_kmh: 20.0
            }
        );
    }

    #[test]
    fn test_non_intrusion_args_ignore_overrides() {
        assert_eq!(
            SimulationArg::Route.to_kind(Some(90.0), Some(20.0)),
            SimulationKind::Route
        );
        assert_eq!(
            SimulationArg::RouteOnce.to_kind(None, None),
            SimulationKind::RouteOnce
        );
    }

    #[test]
    fn test_facts_label_reports_inert_conditions() {
        let label = facts_label(&RuleFacts::default());
        assert!(label.contains("no zones"));
        assert!(label.contains("no routes"));
    }
}
