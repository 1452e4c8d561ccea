// ── Device identity ──
//
// The MAC address is the sole device identity across both ingestion
// paths. The cloud sends it as bare uppercase hex; push messages and
// operators may use colons, dashes, or lowercase. Normalizing here keeps
// pull and push lookups agreeing without case games at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Device MAC, normalized to bare uppercase hex (`AABBCCDDEEFF`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceMac(String);

impl DeviceMac {
    /// Create a normalized MAC from any common format.
    /// Accepts bare hex, colon-separated, or dash-separated.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized: String = raw
            .as_ref()
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .collect::<String>()
            .to_uppercase();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Colon-separated display form (`AA:BB:CC:DD:EE:FF`).
    pub fn formatted(&self) -> String {
        self.0
            .as_bytes()
            .chunks(2)
            .map(|pair| std::str::from_utf8(pair).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for DeviceMac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceMac {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
