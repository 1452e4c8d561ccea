// Wire types for the Qingping cloud API and the data-push channel.
//
// These structs mirror the JSON the cloud actually sends. They are
// deliberately tolerant: unknown fields are ignored and optional fields
// default, so a firmware or API revision that adds data never breaks
// ingestion. Conversion to domain types happens in qingsync-core.

use std::collections::HashMap;

use serde::Deserialize;

// ── Device listing (GET /v1/apis/devices) ────────────────────────────

/// Response envelope of the device-list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// One device entry: descriptive `info` plus the latest reading per
/// attribute in `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    pub info: DeviceInfo,
    #[serde(default)]
    pub data: HashMap<String, PropertyFrame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    /// Bare hex MAC, the sole device identity across pull and push.
    pub mac: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    #[serde(default)]
    pub setting: Option<DeviceSetting>,
    #[serde(default)]
    pub product: Option<ProductInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatus {
    #[serde(default)]
    pub offline: bool,
}

/// Device-configured cadences, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSetting {
    #[serde(default)]
    pub report_interval: Option<i64>,
    #[serde(default)]
    pub collect_interval: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub en_name: Option<String>,
}

/// One attribute reading: raw scalar plus a status code (0 = normal).
///
/// `value` stays a raw `serde_json::Value` because the transport is
/// inconsistent about numeric types -- some firmwares send numbers as
/// strings. Coercion is a presentation concern, handled downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyFrame {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub status: i64,
}

// ── Data push (inbound webhook payload) ──────────────────────────────

/// Envelope of an asynchronous data-push message.
///
/// Shape: `{"payload": {"info": {"mac": ...}, "data": [{attr: frame}, ...]}}`.
/// `data` may carry multiple time-ordered frames per message; frame
/// selection policy lives in qingsync-core, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct PushMessage {
    pub payload: PushPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub info: Option<PushInfo>,
    #[serde(default)]
    pub data: Vec<HashMap<String, PropertyFrame>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushInfo {
    #[serde(default)]
    pub mac: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn device_record_tolerates_extra_and_missing_fields() {
        let raw = serde_json::json!({
            "info": {
                "mac": "AABBCCDDEEFF",
                "name": "Office",
                "some_future_field": {"nested": true},
            },
            "data": {
                "temperature": {"value": 21.5, "status": 0},
                "battery": {"value": "87"},
            }
        });
        let record: DeviceRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.info.mac, "AABBCCDDEEFF");
        assert!(record.info.setting.is_none());
        assert_eq!(record.data.len(), 2);
        assert_eq!(record.data["battery"].status, 0);
    }

    #[test]
    fn push_message_parses_multi_frame_payload() {
        let raw = serde_json::json!({
            "payload": {
                "info": {"mac": "AABBCCDDEEFF"},
                "data": [
                    {"temperature": {"value": 21.5, "status": 0}},
                    {"temperature": {"value": 20.9, "status": 0}},
                ]
            }
        });
        let msg: PushMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.payload.info.unwrap().mac.as_deref(), Some("AABBCCDDEEFF"));
        assert_eq!(msg.payload.data.len(), 2);
    }

    #[test]
    fn push_message_without_info_still_parses() {
        let raw = serde_json::json!({"payload": {"data": []}});
        let msg: PushMessage = serde_json::from_value(raw).unwrap();
        assert!(msg.payload.info.is_none());
        assert!(msg.payload.data.is_empty());
    }
}
