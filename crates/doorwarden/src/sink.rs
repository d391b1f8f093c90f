//! Terminal view sink.
//!
//! Renders reconciled updates as colored status lines. Counters print
//! their target value directly -- redrawing interleaved terminal lines
//! per animation frame would garble plain stdout.

use owo_colors::OwoColorize;

use doorwarden_core::{
    AvailabilityBand, ConnectionState, Counter, Element, StatusClass, UptimeInfo, ViewSink,
    availability_band,
};

/// Line-oriented `ViewSink` for the terminal.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

fn classified(value: &str, class: StatusClass) -> String {
    match class {
        StatusClass::Safe => value.green().to_string(),
        StatusClass::Warning => value.red().bold().to_string(),
    }
}

impl ViewSink for ConsoleSink {
    fn set_door_status(&self, value: &str, class: StatusClass) {
        println!("{:>12}  {}", "door".bold(), classified(value, class));
    }

    fn set_alarm_status(&self, value: &str, class: StatusClass) {
        println!("{:>12}  {}", "alarm".bold(), classified(value, class));
    }

    fn set_counter(&self, counter: Counter, value: u64) {
        println!("{:>12}  {}", counter.as_str().bold(), value.cyan());
    }

    fn set_timer(&self, seconds: u64) {
        println!("{:>12}  {}s", "timer".bold(), seconds.cyan());
    }

    fn set_uptime(&self, uptime: &UptimeInfo) {
        let availability = format!("{:.2}% available", uptime.availability_percent);
        let availability = match availability_band(uptime.availability_percent) {
            AvailabilityBand::Excellent => availability.green().to_string(),
            AvailabilityBand::Good => availability.cyan().to_string(),
            AvailabilityBand::Degraded => availability.yellow().to_string(),
            AvailabilityBand::Critical => availability.red().to_string(),
        };
        println!(
            "{:>12}  {} ({availability})",
            "uptime".bold(),
            uptime.uptime_string
        );
    }

    fn flash_updated(&self, element: Element) {
        // A line printer has nothing to flash.
        tracing::trace!(?element, "updated");
    }

    fn set_connection_badge(&self, state: ConnectionState) {
        let badge = match state {
            ConnectionState::Connected => "real-time".green().to_string(),
            ConnectionState::PollingFallback => "polling".cyan().to_string(),
            ConnectionState::Connecting => "connecting...".dimmed().to_string(),
            ConnectionState::Disconnected => "offline".red().to_string(),
        };
        println!("{:>12}  [{badge}]", "link".bold());
    }
}
