// ── Property value container and attribute vocabulary ──
//
// One Property is one named reading: raw scalar + status code. The raw
// value stays transport-shaped (the cloud sometimes sends numbers as
// strings); presentation is a pure function of the attribute name via
// the static table below. New attributes are additions to the table,
// not new code paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use qingsync_api::types::PropertyFrame;

// ── Attribute metadata table ────────────────────────────────────────

/// Presentation classification of a sensor attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SensorClass {
    Temperature,
    Humidity,
    AtmosphericPressure,
    Battery,
    CarbonDioxide,
    Pm25,
    Pm10,
    VolatileOrganicCompounds,
    SignalStrength,
    Timestamp,
}

/// How a raw value should be coerced for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
}

/// Static presentation metadata for one attribute name.
#[derive(Debug)]
pub struct AttributeMeta {
    pub name: &'static str,
    pub title: &'static str,
    pub unit: Option<&'static str>,
    pub class: Option<SensorClass>,
    pub kind: ValueKind,
}

/// The closed attribute vocabulary reported by Qingping devices.
///
/// Attributes absent from this table are carried through the store
/// untouched but degrade to "no display mapping".
pub const ATTRIBUTES: &[AttributeMeta] = &[
    AttributeMeta {
        name: "timestamp",
        title: "Last Report",
        unit: None,
        class: Some(SensorClass::Timestamp),
        kind: ValueKind::Integer,
    },
    AttributeMeta {
        name: "battery",
        title: "Battery",
        unit: Some("%"),
        class: Some(SensorClass::Battery),
        kind: ValueKind::Integer,
    },
    AttributeMeta {
        name: "signal",
        title: "Signal",
        unit: Some("dBm"),
        class: Some(SensorClass::SignalStrength),
        kind: ValueKind::Integer,
    },
    AttributeMeta {
        name: "temperature",
        title: "Temperature",
        unit: Some("°C"),
        class: Some(SensorClass::Temperature),
        kind: ValueKind::Float,
    },
    AttributeMeta {
        name: "humidity",
        title: "Humidity",
        unit: Some("%"),
        class: Some(SensorClass::Humidity),
        kind: ValueKind::Float,
    },
    AttributeMeta {
        name: "pressure",
        title: "Pressure",
        unit: Some("hPa"),
        class: Some(SensorClass::AtmosphericPressure),
        kind: ValueKind::Float,
    },
    AttributeMeta {
        name: "co2",
        title: "Carbon Dioxide",
        unit: Some("ppm"),
        class: Some(SensorClass::CarbonDioxide),
        kind: ValueKind::Integer,
    },
    AttributeMeta {
        name: "pm25",
        title: "PM2.5",
        unit: Some("µg/m³"),
        class: Some(SensorClass::Pm25),
        kind: ValueKind::Integer,
    },
    AttributeMeta {
        name: "pm10",
        title: "PM10",
        unit: Some("µg/m³"),
        class: Some(SensorClass::Pm10),
        kind: ValueKind::Integer,
    },
    AttributeMeta {
        name: "tvoc",
        title: "TVOC",
        unit: Some("ppb"),
        class: Some(SensorClass::VolatileOrganicCompounds),
        kind: ValueKind::Integer,
    },
];

/// Look up presentation metadata for an attribute name.
pub fn attribute_meta(name: &str) -> Option<&'static AttributeMeta> {
    ATTRIBUTES.iter().find(|m| m.name == name)
}

// ── Display value ───────────────────────────────────────────────────

/// A raw value coerced for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Int(i64),
    Float(f64),
}

impl DisplayValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => {
                #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
                {
                    v as f64
                }
            }
            Self::Float(v) => v,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

// ── Property ────────────────────────────────────────────────────────

/// One named reading reported by a device.
///
/// Immutable once constructed; a newer reading for the same attribute
/// supersedes the whole Property rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Raw scalar as received -- numeric or string, transport-dependent.
    pub value: Option<serde_json::Value>,
    /// Status code from the device; 0 is normal.
    pub status: i64,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Option<serde_json::Value>, status: i64) -> Self {
        Self {
            name: name.into(),
            value,
            status,
        }
    }

    /// Build from a wire frame, keyed by attribute name.
    pub fn from_frame(name: impl Into<String>, frame: &PropertyFrame) -> Self {
        Self::new(name, frame.value.clone(), frame.status)
    }

    /// Coerce the raw value for presentation.
    ///
    /// `None` is not an error: it is the "no reading / unavailable"
    /// resting state consumers must branch on. Covers a missing raw
    /// value and a value that fails numeric coercion.
    pub fn display_value(&self) -> Option<DisplayValue> {
        let raw = self.value.as_ref()?;
        let kind = attribute_meta(&self.name).map(|m| m.kind);
        coerce(raw, kind)
    }

    /// Unit of measurement, or `None` for unmapped attributes.
    pub fn unit(&self) -> Option<&'static str> {
        attribute_meta(&self.name).and_then(|m| m.unit)
    }

    /// Presentation class, or `None` for unmapped attributes.
    pub fn class(&self) -> Option<SensorClass> {
        attribute_meta(&self.name).and_then(|m| m.class)
    }

    /// Human-readable title, or `None` for unmapped attributes.
    pub fn title(&self) -> Option<&'static str> {
        attribute_meta(&self.name).map(|m| m.title)
    }

    /// The value as epoch seconds, for the `timestamp` attribute.
    pub fn epoch_seconds(&self) -> Option<i64> {
        match self.display_value()? {
            DisplayValue::Int(v) => Some(v),
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            DisplayValue::Float(v) => Some(v as i64),
        }
    }
}

/// Numeric coercion: integers stay integral, floats stay floating,
/// number-bearing strings are parsed. Unmapped attributes take whichever
/// numeric shape the raw value already has.
fn coerce(raw: &serde_json::Value, kind: Option<ValueKind>) -> Option<DisplayValue> {
    match raw {
        serde_json::Value::Number(n) => match kind {
            Some(ValueKind::Integer) => n
                .as_i64()
                .map(DisplayValue::Int)
                .or_else(|| n.as_f64().map(DisplayValue::Float)),
            Some(ValueKind::Float) => n.as_f64().map(DisplayValue::Float),
            None => n
                .as_i64()
                .map(DisplayValue::Int)
                .or_else(|| n.as_f64().map(DisplayValue::Float)),
        },
        serde_json::Value::String(s) => match kind {
            Some(ValueKind::Float) => s.trim().parse::<f64>().ok().map(DisplayValue::Float),
            _ => s
                .trim()
                .parse::<i64>()
                .ok()
                .map(DisplayValue::Int)
                .or_else(|| s.trim().parse::<f64>().ok().map(DisplayValue::Float)),
        },
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_attribute_has_full_mapping() {
        let prop = Property::new("temperature", Some(json!(21.5)), 0);
        assert_eq!(prop.display_value(), Some(DisplayValue::Float(21.5)));
        assert_eq!(prop.unit(), Some("°C"));
        assert_eq!(prop.class(), Some(SensorClass::Temperature));
        assert_eq!(prop.title(), Some("Temperature"));
    }

    #[test]
    fn unknown_attribute_degrades_to_no_mapping() {
        let prop = Property::new("frobnication", Some(json!(3)), 0);
        assert_eq!(prop.unit(), None);
        assert_eq!(prop.class(), None);
        assert_eq!(prop.title(), None);
        // The value itself still coerces.
        assert_eq!(prop.display_value(), Some(DisplayValue::Int(3)));
    }

    #[test]
    fn missing_value_is_none_not_error() {
        let prop = Property::new("temperature", None, 0);
        assert_eq!(prop.display_value(), None);
    }

    #[test]
    fn number_as_string_is_parsed() {
        let prop = Property::new("battery", Some(json!("87")), 0);
        assert_eq!(prop.display_value(), Some(DisplayValue::Int(87)));

        let prop = Property::new("temperature", Some(json!("21.5")), 0);
        assert_eq!(prop.display_value(), Some(DisplayValue::Float(21.5)));
    }

    #[test]
    fn uncoercible_value_is_none() {
        let prop = Property::new("temperature", Some(json!("warm-ish")), 0);
        assert_eq!(prop.display_value(), None);

        let prop = Property::new("temperature", Some(json!({"nested": 1})), 0);
        assert_eq!(prop.display_value(), None);
    }

    #[test]
    fn integer_attribute_keeps_integral_shape() {
        let prop = Property::new("co2", Some(json!(1240)), 0);
        assert_eq!(prop.display_value(), Some(DisplayValue::Int(1240)));
    }

    #[test]
    fn timestamp_epoch_seconds() {
        let prop = Property::new("timestamp", Some(json!(1_579_602_600)), 0);
        assert_eq!(prop.epoch_seconds(), Some(1_579_602_600));
    }
}
