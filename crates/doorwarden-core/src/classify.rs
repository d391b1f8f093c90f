//! Table-driven status classification.
//!
//! Status strings come from the backend and may grow new values over time.
//! Classification is a lookup against a safe-list, so an unrecognized
//! status fails closed to [`StatusClass::Warning`] instead of silently
//! matching nothing.

/// Visual classification of a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Safe,
    Warning,
}

/// Door statuses with a known-safe classification.
const DOOR_SAFE_STATUSES: &[&str] = &["Closed"];

/// Alarm statuses with a known-safe classification.
const ALARM_SAFE_STATUSES: &[&str] = &["Inactive"];

/// Classify a door status string. Total: every input maps to exactly one
/// class, with `"Closed"` the only safe value.
pub fn classify_door(status: &str) -> StatusClass {
    classify(DOOR_SAFE_STATUSES, status)
}

/// Classify an alarm status string. `"Inactive"` is the only safe value.
pub fn classify_alarm(status: &str) -> StatusClass {
    classify(ALARM_SAFE_STATUSES, status)
}

fn classify(safe_table: &[&str], status: &str) -> StatusClass {
    if safe_table.contains(&status) {
        StatusClass::Safe
    } else {
        StatusClass::Warning
    }
}

// ── Availability banding ─────────────────────────────────────────────

/// Quality band for the uptime availability percentage, for sink-side
/// color coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityBand {
    Excellent,
    Good,
    Degraded,
    Critical,
}

/// Band thresholds, highest first. Anything below the last threshold is
/// `Critical`.
const AVAILABILITY_BANDS: &[(f64, AvailabilityBand)] = &[
    (99.5, AvailabilityBand::Excellent),
    (99.0, AvailabilityBand::Good),
    (95.0, AvailabilityBand::Degraded),
];

/// Band for an availability percentage.
pub fn availability_band(percent: f64) -> AvailabilityBand {
    for &(threshold, band) in AVAILABILITY_BANDS {
        if percent >= threshold {
            return band;
        }
    }
    AvailabilityBand::Critical
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_classification_is_total() {
        assert_eq!(classify_door("Closed"), StatusClass::Safe);
        assert_eq!(classify_door("Open"), StatusClass::Warning);
        assert_eq!(classify_door("Ajar"), StatusClass::Warning);
        assert_eq!(classify_door(""), StatusClass::Warning);
        assert_eq!(classify_door("closed"), StatusClass::Warning);
        assert_eq!(classify_door("DOOR CLOSED"), StatusClass::Warning);
    }

    #[test]
    fn alarm_classification_fails_closed() {
        assert_eq!(classify_alarm("Inactive"), StatusClass::Safe);
        assert_eq!(classify_alarm("Active"), StatusClass::Warning);
        assert_eq!(classify_alarm("Triggered"), StatusClass::Warning);
        assert_eq!(classify_alarm(""), StatusClass::Warning);
    }

    #[test]
    fn availability_bands() {
        assert_eq!(availability_band(100.0), AvailabilityBand::Excellent);
        assert_eq!(availability_band(99.5), AvailabilityBand::Excellent);
        assert_eq!(availability_band(99.2), AvailabilityBand::Good);
        assert_eq!(availability_band(97.0), AvailabilityBand::Degraded);
        assert_eq!(availability_band(80.0), AvailabilityBand::Critical);
        assert_eq!(availability_band(0.0), AvailabilityBand::Critical);
    }
}
