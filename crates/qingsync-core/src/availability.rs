// ── Freshness / availability evaluation ──
//
// Pure decision over device + attribute + clock. Devices self-report a
// cadence; tolerating a small integer multiple of missed reports absorbs
// normal jitter and retries before a reading is declared stale.

use chrono::{DateTime, Utc};

use crate::model::Device;

/// How many missed report intervals to tolerate before a reading is
/// considered stale.
pub const MAX_DELAY_MULTIPLIER: i64 = 3;

/// Decide whether a device attribute should be treated as available.
///
/// Rules, in order:
/// 1. The `timestamp` attribute is available whenever present -- it is
///    the clock-sync signal itself.
/// 2. If the most recent poll attempt failed, everything is unavailable:
///    push-only data does not stand alone while the canonical pull path
///    is broken.
/// 3. An absent attribute, or one whose value cannot be read, is
///    unavailable.
/// 4. Otherwise the reading is available while
///    `now - last_report <= MAX_DELAY_MULTIPLIER * report_interval`.
pub fn is_available(
    device: &Device,
    attribute: &str,
    now: DateTime<Utc>,
    last_poll_ok: bool,
) -> bool {
    if attribute == "timestamp" {
        return device.last_report_epoch().is_some();
    }

    if !last_poll_ok {
        return false;
    }

    let Some(property) = device.property(attribute) else {
        return false;
    };
    if property.display_value().is_none() {
        return false;
    }

    let Some(last_report) = device.last_report_epoch() else {
        return false;
    };

    let delta = now.timestamp() - last_report;
    let max_delay = MAX_DELAY_MULTIPLIER * device.report_interval_secs;
    if delta > max_delay {
        tracing::info!(
            mac = %device.mac,
            delta_secs = delta,
            max_delay_secs = max_delay,
            "device silent past its report cadence, marking stale"
        );
        return false;
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceMac, Property};
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;

    fn device_reporting_at(epoch: i64, report_interval_secs: i64) -> Device {
        let mut data = HashMap::new();
        data.insert(
            "timestamp".to_owned(),
            Property::new("timestamp", Some(json!(epoch)), 0),
        );
        data.insert(
            "temperature".to_owned(),
            Property::new("temperature", Some(json!(21.5)), 0),
        );
        data.insert(
            "battery".to_owned(),
            Property::new("battery", Some(serde_json::Value::Null), 0),
        );
        Device {
            mac: DeviceMac::new("AABBCCDDEEFF"),
            name: "test".into(),
            product_en_name: None,
            version: None,
            offline: false,
            report_interval_secs,
            collect_interval_secs: report_interval_secs,
            data,
        }
    }

    fn at(epoch: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(epoch, 0).unwrap()
    }

    #[test]
    fn boundary_at_three_report_intervals() {
        let device = device_reporting_at(1_000_000, 60);
        // delta == 180: still available
        assert!(is_available(&device, "temperature", at(1_000_180), true));
        // delta == 181: stale
        assert!(!is_available(&device, "temperature", at(1_000_181), true));
    }

    #[test]
    fn poll_failure_blankets_everything() {
        let device = device_reporting_at(1_000_000, 60);
        assert!(!is_available(&device, "temperature", at(1_000_001), false));
    }

    #[test]
    fn timestamp_attribute_survives_poll_failure() {
        let device = device_reporting_at(1_000_000, 60);
        assert!(is_available(&device, "timestamp", at(1_000_001), false));
        // Even far past the cadence bound.
        assert!(is_available(&device, "timestamp", at(2_000_000), true));
    }

    #[test]
    fn missing_attribute_is_unavailable() {
        let device = device_reporting_at(1_000_000, 60);
        assert!(!is_available(&device, "co2", at(1_000_001), true));
    }

    #[test]
    fn null_value_is_unavailable() {
        let device = device_reporting_at(1_000_000, 60);
        assert!(!is_available(&device, "battery", at(1_000_001), true));
    }

    #[test]
    fn missing_timestamp_makes_readings_unavailable() {
        let mut device = device_reporting_at(1_000_000, 60);
        device.data.remove("timestamp");
        assert!(!is_available(&device, "temperature", at(1_000_001), true));
        assert!(!is_available(&device, "timestamp", at(1_000_001), true));
    }
}
