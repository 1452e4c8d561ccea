// ── Device domain type ──

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use qingsync_api::types::DeviceRecord;

use super::mac::DeviceMac;
use super::property::Property;

/// Report cadence assumed when the cloud omits the device setting block.
/// Matches the cloud's documented default push interval.
pub const DEFAULT_REPORT_INTERVAL_SECS: i64 = 7200;

/// Sampling cadence assumed when the cloud omits the device setting block.
pub const DEFAULT_COLLECT_INTERVAL_SECS: i64 = 3600;

/// One physical sensor unit and its latest reading per attribute.
///
/// Identity and metadata are pull-owned: a full refresh rebuilds the
/// whole Device, while push ingestion only ever replaces entries of the
/// `data` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub mac: DeviceMac,
    pub name: String,
    pub product_en_name: Option<String>,
    pub version: Option<String>,
    /// Offline flag as reported by the cloud, distinct from local
    /// freshness evaluation.
    pub offline: bool,
    /// Device-configured push cadence, seconds.
    pub report_interval_secs: i64,
    /// Device-configured sampling cadence, seconds.
    pub collect_interval_secs: i64,
    /// Latest reading per attribute name.
    pub data: HashMap<String, Property>,
}

impl Device {
    /// Exact-key attribute lookup.
    ///
    /// `None` means "this device has never reported this attribute" --
    /// a legitimate state, not an error.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.data.get(name)
    }

    /// Epoch seconds of the device's last report, if it sent one.
    pub fn last_report_epoch(&self) -> Option<i64> {
        self.property("timestamp").and_then(Property::epoch_seconds)
    }
}

impl From<DeviceRecord> for Device {
    fn from(record: DeviceRecord) -> Self {
        let info = record.info;
        let (report_interval_secs, collect_interval_secs) = info
            .setting
            .as_ref()
            .map_or(
                (DEFAULT_REPORT_INTERVAL_SECS, DEFAULT_COLLECT_INTERVAL_SECS),
                |s| {
                    (
                        s.report_interval.unwrap_or(DEFAULT_REPORT_INTERVAL_SECS),
                        s.collect_interval.unwrap_or(DEFAULT_COLLECT_INTERVAL_SECS),
                    )
                },
            );

        let data = record
            .data
            .into_iter()
            .map(|(name, frame)| {
                let prop = Property::from_frame(name.clone(), &frame);
                (name, prop)
            })
            .collect();

        Self {
            mac: DeviceMac::new(&info.mac),
            name: info.name,
            product_en_name: info.product.and_then(|p| p.en_name),
            version: info.version,
            offline: info.status.is_some_and(|s| s.offline),
            report_interval_secs,
            collect_interval_secs,
            data,
        }
    }
}
