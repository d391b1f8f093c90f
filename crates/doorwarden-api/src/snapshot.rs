//! Status snapshot wire types.
//!
//! A [`StatusSnapshot`] is one discrete status payload, possibly partial:
//! every field is optional, and absence means "no new data for this field".
//! Both transports produce the same type -- the push channel delivers the
//! nested shape directly, while the poll endpoint serves counters as flat
//! top-level fields that get repackaged here.
//!
//! Decoding is deliberately lenient: payloads are parsed typed-first, and
//! when that fails the well-formed fields are salvaged from the raw JSON so
//! a single malformed field never rejects the whole update.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── StatusSnapshot ───────────────────────────────────────────────────

/// One discrete status update from the backend.
///
/// Created per update event (push message or poll response), consumed once
/// by the reconciler, then discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Door state, e.g. `"Closed"` or `"Open"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_status: Option<String>,

    /// Alarm state, e.g. `"Inactive"` or `"Active"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_status: Option<String>,

    /// Event counters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,

    /// Configured alarm timer in seconds. The poll endpoint serves this as
    /// a numeric string, push events as a number; both are accepted.
    #[serde(
        default,
        deserialize_with = "de_opt_flexible_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub timer_set: Option<u64>,

    /// Server uptime record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<UptimeInfo>,
}

/// Event counters. A missing sub-field means "no change" for that counter
/// only, so each one is optional on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_events: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_open_events: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_close_events: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_events: Option<u64>,
}

impl Statistics {
    /// `true` if no counter is present.
    pub fn is_empty(&self) -> bool {
        self.total_events.is_none()
            && self.door_open_events.is_none()
            && self.door_close_events.is_none()
            && self.alarm_events.is_none()
    }
}

/// Server uptime record.
///
/// Reconciled by structural equality -- derive `PartialEq` is the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UptimeInfo {
    /// Human-readable form, e.g. `"3d 4h 12m"`.
    pub uptime_string: String,

    #[serde(default)]
    pub days: u64,
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<u64>,

    #[serde(default)]
    pub availability_percent: f64,

    /// ISO-8601 server start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl StatusSnapshot {
    /// `true` if the snapshot carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.door_status.is_none()
            && self.alarm_status.is_none()
            && self.statistics.as_ref().is_none_or(Statistics::is_empty)
            && self.timer_set.is_none()
            && self.uptime.is_none()
    }

    /// Decode a push `new_event` payload (nested `statistics` shape).
    ///
    /// Typed deserialization first; on failure, salvage whatever fields are
    /// well-formed from the raw JSON.
    pub fn from_event_value(value: &Value) -> Self {
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::debug!(error = %e, "event payload not fully typed, salvaging fields");
                Self::salvage_nested(value)
            }
        }
    }

    /// Decode a poll response body (flat counter fields) and repackage the
    /// counters into the nested `statistics` sub-object.
    pub fn from_dashboard_value(value: &Value) -> Self {
        match serde_json::from_value::<DashboardBody>(value.clone()) {
            Ok(body) => body.into(),
            Err(e) => {
                tracing::debug!(error = %e, "poll body not fully typed, salvaging fields");
                Self::salvage_flat(value)
            }
        }
    }

    /// Per-field extraction from a nested-shape payload.
    fn salvage_nested(value: &Value) -> Self {
        Self {
            door_status: value
                .get("door_status")
                .and_then(Value::as_str)
                .map(String::from),
            alarm_status: value
                .get("alarm_status")
                .and_then(Value::as_str)
                .map(String::from),
            statistics: value.get("statistics").map(salvage_statistics),
            timer_set: value.get("timer_set").and_then(flexible_u64),
            uptime: value.get("uptime").and_then(salvage_uptime),
        }
    }

    /// Per-field extraction from a flat-shape payload, with repackaging.
    fn salvage_flat(value: &Value) -> Self {
        let statistics = Statistics {
            total_events: value.get("total_events").and_then(Value::as_u64),
            door_open_events: value.get("door_open_events").and_then(Value::as_u64),
            door_close_events: value.get("door_close_events").and_then(Value::as_u64),
            alarm_events: value.get("alarm_events").and_then(Value::as_u64),
        };
        Self {
            door_status: value
                .get("door_status")
                .and_then(Value::as_str)
                .map(String::from),
            alarm_status: value
                .get("alarm_status")
                .and_then(Value::as_str)
                .map(String::from),
            statistics: (!statistics.is_empty()).then_some(statistics),
            timer_set: value.get("timer_set").and_then(flexible_u64),
            uptime: value.get("uptime").and_then(salvage_uptime),
        }
    }
}

fn salvage_statistics(value: &Value) -> Statistics {
    Statistics {
        total_events: value.get("total_events").and_then(Value::as_u64),
        door_open_events: value.get("door_open_events").and_then(Value::as_u64),
        door_close_events: value.get("door_close_events").and_then(Value::as_u64),
        alarm_events: value.get("alarm_events").and_then(Value::as_u64),
    }
}

/// An uptime record missing its `uptime_string` is dropped wholesale --
/// "no change" beats applying a fabricated record.
fn salvage_uptime(value: &Value) -> Option<UptimeInfo> {
    serde_json::from_value(value.clone()).ok()
}

/// Accept a JSON number or a numeric string.
fn flexible_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn de_opt_flexible_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(flexible_u64))
}

// ── Poll body (flat shape) ───────────────────────────────────────────

/// Raw body of `GET /api/dashboard`. Counters are flat here, not nested --
/// the conversion below repackages them.
#[derive(Debug, Deserialize)]
struct DashboardBody {
    #[serde(default)]
    door_status: Option<String>,
    #[serde(default)]
    alarm_status: Option<String>,
    #[serde(default, deserialize_with = "de_opt_flexible_u64")]
    timer_set: Option<u64>,
    #[serde(default)]
    total_events: Option<u64>,
    #[serde(default)]
    door_open_events: Option<u64>,
    #[serde(default)]
    door_close_events: Option<u64>,
    #[serde(default)]
    alarm_events: Option<u64>,
    #[serde(default)]
    uptime: Option<UptimeInfo>,
}

impl From<DashboardBody> for StatusSnapshot {
    fn from(body: DashboardBody) -> Self {
        let statistics = Statistics {
            total_events: body.total_events,
            door_open_events: body.door_open_events,
            door_close_events: body.door_close_events,
            alarm_events: body.alarm_events,
        };
        Self {
            door_status: body.door_status,
            alarm_status: body.alarm_status,
            statistics: (!statistics.is_empty()).then_some(statistics),
            timer_set: body.timer_set,
            uptime: body.uptime,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_payload_nested_statistics() {
        let value = json!({
            "door_status": "Open",
            "statistics": { "total_events": 10 }
        });

        let snapshot = StatusSnapshot::from_event_value(&value);

        assert_eq!(snapshot.door_status.as_deref(), Some("Open"));
        let stats = snapshot.statistics.expect("statistics present");
        assert_eq!(stats.total_events, Some(10));
        assert_eq!(stats.door_open_events, None);
        assert!(snapshot.alarm_status.is_none());
        assert!(snapshot.timer_set.is_none());
        assert!(snapshot.uptime.is_none());
    }

    #[test]
    fn dashboard_body_repackages_flat_counters() {
        let value = json!({
            "door_status": "Closed",
            "alarm_status": "Inactive",
            "timer_set": "30",
            "total_events": 42,
            "door_open_events": 20,
            "door_close_events": 19,
            "alarm_events": 3,
            "success": true,
            "timestamp": "2026-08-07T10:00:00"
        });

        let snapshot = StatusSnapshot::from_dashboard_value(&value);

        assert_eq!(snapshot.door_status.as_deref(), Some("Closed"));
        assert_eq!(snapshot.timer_set, Some(30));
        let stats = snapshot.statistics.expect("statistics repackaged");
        assert_eq!(stats.total_events, Some(42));
        assert_eq!(stats.door_open_events, Some(20));
        assert_eq!(stats.door_close_events, Some(19));
        assert_eq!(stats.alarm_events, Some(3));
    }

    #[test]
    fn dashboard_body_without_counters_has_no_statistics() {
        let value = json!({ "door_status": "Closed" });

        let snapshot = StatusSnapshot::from_dashboard_value(&value);

        assert!(snapshot.statistics.is_none());
    }

    #[test]
    fn timer_set_accepts_number_and_numeric_string() {
        let as_number = StatusSnapshot::from_event_value(&json!({ "timer_set": 45 }));
        let as_string = StatusSnapshot::from_event_value(&json!({ "timer_set": "45" }));
        let as_junk = StatusSnapshot::from_event_value(&json!({ "timer_set": "soon" }));

        assert_eq!(as_number.timer_set, Some(45));
        assert_eq!(as_string.timer_set, Some(45));
        assert_eq!(as_junk.timer_set, None);
    }

    #[test]
    fn malformed_field_does_not_reject_the_rest() {
        // door_status has the wrong type; alarm_status and the counters
        // must still come through.
        let value = json!({
            "door_status": 17,
            "alarm_status": "Active",
            "statistics": { "total_events": 5, "alarm_events": "bad" }
        });

        let snapshot = StatusSnapshot::from_event_value(&value);

        assert!(snapshot.door_status.is_none());
        assert_eq!(snapshot.alarm_status.as_deref(), Some("Active"));
        let stats = snapshot.statistics.expect("statistics salvaged");
        assert_eq!(stats.total_events, Some(5));
        assert_eq!(stats.alarm_events, None);
    }

    #[test]
    fn uptime_requires_uptime_string() {
        let missing = StatusSnapshot::from_event_value(&json!({
            "uptime": { "days": 2 }
        }));
        assert!(missing.uptime.is_none());

        let present = StatusSnapshot::from_event_value(&json!({
            "uptime": {
                "uptime_string": "2d 1h 5m",
                "days": 2,
                "hours": 1,
                "minutes": 5,
                "seconds": 30,
                "availability_percent": 99.72,
                "start_time": "2026-08-05T08:55:00"
            }
        }));
        let uptime = present.uptime.expect("uptime parsed");
        assert_eq!(uptime.uptime_string, "2d 1h 5m");
        assert_eq!(uptime.days, 2);
        assert!((uptime.availability_percent - 99.72).abs() < f64::EPSILON);
        assert_eq!(uptime.start_time.as_deref(), Some("2026-08-05T08:55:00"));
    }

    #[test]
    fn uptime_structural_equality() {
        let a = UptimeInfo {
            uptime_string: "5m 2s".into(),
            minutes: 5,
            seconds: 2,
            availability_percent: 99.5,
            ..UptimeInfo::default()
        };
        let mut b = a.clone();
        assert_eq!(a, b);

        b.seconds = 3;
        assert_ne!(a, b);
    }

    #[test]
    fn empty_snapshot() {
        assert!(StatusSnapshot::default().is_empty());
        assert!(StatusSnapshot::from_event_value(&json!({})).is_empty());

        let with_door = StatusSnapshot::from_event_value(&json!({ "door_status": "Open" }));
        assert!(!with_door.is_empty());
    }
}
