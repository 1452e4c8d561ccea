// ── Domain model ──

mod device;
mod mac;
mod property;

pub use device::{DEFAULT_COLLECT_INTERVAL_SECS, DEFAULT_REPORT_INTERVAL_SECS, Device};
pub use mac::DeviceMac;
pub use property::{ATTRIBUTES, AttributeMeta, DisplayValue, Property, SensorClass, ValueKind, attribute_meta};
