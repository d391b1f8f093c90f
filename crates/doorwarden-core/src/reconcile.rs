//! Update reconciliation.
//!
//! The [`Reconciler`] turns each [`StatusSnapshot`] into the minimal set of
//! view mutations: every present field is compared against the last value
//! applied, and only changes reach the [`ViewSink`]. Applying the same
//! snapshot twice is a no-op the second time, which is also what protects
//! the view from redundant flashes when the poll and push transports
//! deliver overlapping data.

use std::fmt;
use std::sync::Arc;

use doorwarden_api::{Statistics, StatusSnapshot, UptimeInfo};

use crate::classify::{StatusClass, classify_alarm, classify_door};
use crate::monitor::ConnectionState;

// ── View sink interface ──────────────────────────────────────────────

/// A named event counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    TotalEvents,
    DoorOpenEvents,
    DoorCloseEvents,
    AlarmEvents,
}

impl Counter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalEvents => "total_events",
            Self::DoorOpenEvents => "door_open_events",
            Self::DoorCloseEvents => "door_close_events",
            Self::AlarmEvents => "alarm_events",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A view element that can be flashed after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    DoorStatus,
    AlarmStatus,
    Timer,
    Uptime,
    Counter(Counter),
}

/// The presentation surface.
///
/// The reconciler and monitor know nothing about rendering -- a terminal,
/// a GUI, or a test recorder all plug in here. Counter updates carry only
/// the target value; animating toward it (see
/// [`CounterAnimation`](crate::animate::CounterAnimation)) and flashing the
/// element afterwards is the sink's business.
pub trait ViewSink: Send + Sync {
    fn set_door_status(&self, value: &str, class: StatusClass);
    fn set_alarm_status(&self, value: &str, class: StatusClass);
    fn set_counter(&self, counter: Counter, value: u64);
    fn set_timer(&self, seconds: u64);
    fn set_uptime(&self, uptime: &UptimeInfo);
    fn flash_updated(&self, element: Element);
    fn set_connection_badge(&self, state: ConnectionState);
}

// ── Reconciler ───────────────────────────────────────────────────────

/// Diffs snapshots against the last applied values and emits only deltas.
///
/// Each field starts out unset -- distinct from any real value -- so the
/// first snapshot to carry a field always applies it.
pub struct Reconciler {
    sink: Arc<dyn ViewSink>,
    door_status: Option<String>,
    alarm_status: Option<String>,
    counters: Statistics,
    timer_set: Option<u64>,
    uptime: Option<UptimeInfo>,
}

impl Reconciler {
    pub fn new(sink: Arc<dyn ViewSink>) -> Self {
        Self {
            sink,
            door_status: None,
            alarm_status: None,
            counters: Statistics::default(),
            timer_set: None,
            uptime: None,
        }
    }

    /// Apply one snapshot. Absent fields leave the corresponding view
    /// values untouched; unchanged fields produce no sink call.
    pub fn apply(&mut self, snapshot: &StatusSnapshot) {
        if let Some(ref door) = snapshot.door_status {
            if self.door_status.as_deref() != Some(door) {
                self.sink.set_door_status(door, classify_door(door));
                self.sink.flash_updated(Element::DoorStatus);
                self.door_status = Some(door.clone());
            }
        }

        if let Some(ref alarm) = snapshot.alarm_status {
            if self.alarm_status.as_deref() != Some(alarm) {
                self.sink.set_alarm_status(alarm, classify_alarm(alarm));
                self.sink.flash_updated(Element::AlarmStatus);
                self.alarm_status = Some(alarm.clone());
            }
        }

        if let Some(ref stats) = snapshot.statistics {
            self.apply_counter(Counter::TotalEvents, stats.total_events);
            self.apply_counter(Counter::DoorOpenEvents, stats.door_open_events);
            self.apply_counter(Counter::DoorCloseEvents, stats.door_close_events);
            self.apply_counter(Counter::AlarmEvents, stats.alarm_events);
        }

        if let Some(timer) = snapshot.timer_set {
            if self.timer_set != Some(timer) {
                self.sink.set_timer(timer);
                self.sink.flash_updated(Element::Timer);
                self.timer_set = Some(timer);
            }
        }

        if let Some(ref uptime) = snapshot.uptime {
            if self.uptime.as_ref() != Some(uptime) {
                self.sink.set_uptime(uptime);
                self.sink.flash_updated(Element::Uptime);
                self.uptime = Some(uptime.clone());
            }
        }
    }

    fn apply_counter(&mut self, counter: Counter, value: Option<u64>) {
        let Some(value) = value else { return };

        let slot = match counter {
            Counter::TotalEvents => &mut self.counters.total_events,
            Counter::DoorOpenEvents => &mut self.counters.door_open_events,
            Counter::DoorCloseEvents => &mut self.counters.door_close_events,
            Counter::AlarmEvents => &mut self.counters.alarm_events,
        };

        if *slot != Some(value) {
            *slot = Some(value);
            self.sink.set_counter(counter, value);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
