//! Command handlers.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;

use doorwarden_config::{self as config, Config};
use doorwarden_core::{
    Counter, Monitor, MonitorConfig, TlsVerification, ViewSink, classify_alarm, classify_door,
};

use crate::cli::{ConfigCommand, GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::sink::ConsoleSink;

fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let config = match &global.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };
    Ok(config)
}

/// Config file + env + CLI flag overrides, in that order.
fn build_monitor_config(global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let config = load_config(global)?;
    let mut monitor = config.monitor_config(global.url.as_deref())?;
    if global.insecure {
        monitor.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(monitor)
}

// ── watch ───────────────────────────────────────────────────────────

pub async fn watch(args: &WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut monitor_config = build_monitor_config(global)?;

    if let Some(ms) = args.poll_interval_ms {
        if ms == 0 {
            return Err(CliError::Validation {
                field: "poll-interval-ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        monitor_config.poll_interval = Duration::from_millis(ms);
    }
    if args.no_push {
        monitor_config.websocket_enabled = false;
    }

    println!(
        "watching {} (ctrl-c to stop)",
        monitor_config.url.as_str().bold()
    );

    let monitor = Monitor::new(monitor_config, Arc::new(ConsoleSink::new()));
    monitor.start().await?;

    tokio::signal::ctrl_c().await?;

    monitor.stop().await;
    println!("stopped");
    Ok(())
}

// ── status ──────────────────────────────────────────────────────────

pub async fn status(global: &GlobalOpts) -> Result<(), CliError> {
    let monitor_config = build_monitor_config(global)?;
    let snapshot = Monitor::fetch_once(&monitor_config).await?;

    let sink = ConsoleSink::new();

    match &snapshot.door_status {
        Some(value) => sink.set_door_status(value, classify_door(value)),
        None => print_unknown("door"),
    }
    match &snapshot.alarm_status {
        Some(value) => sink.set_alarm_status(value, classify_alarm(value)),
        None => print_unknown("alarm"),
    }

    if let Some(ref stats) = snapshot.statistics {
        let counters = [
            (Counter::TotalEvents, stats.total_events),
            (Counter::DoorOpenEvents, stats.door_open_events),
            (Counter::DoorCloseEvents, stats.door_close_events),
            (Counter::AlarmEvents, stats.alarm_events),
        ];
        for (counter, value) in counters {
            if let Some(value) = value {
                sink.set_counter(counter, value);
            }
        }
    }

    if let Some(timer) = snapshot.timer_set {
        sink.set_timer(timer);
    }
    if let Some(ref uptime) = snapshot.uptime {
        sink.set_uptime(uptime);
    }

    Ok(())
}

fn print_unknown(label: &str) {
    println!("{:>12}  {}", label.bold(), "unknown".dimmed());
}

// ── config ──────────────────────────────────────────────────────────

pub fn config_command(command: &ConfigCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(config::config_path);
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::Init => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(config::config_path);
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists", path.display()),
                });
            }

            let starter = Config {
                url: global.url.clone(),
                insecure: global.insecure,
                ..Config::default()
            };
            config::save_config(&starter, &path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}
