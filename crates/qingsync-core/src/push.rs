// ── Push ingestion ──
//
// The transport layer (webhook receiver, test harness) hands in an
// opaque JSON document; this module validates its shape, extracts the
// device identity and attribute frames, and patches the store through
// the same notification path the poll engine uses.

use thiserror::Error;
use tracing::debug;

use qingsync_api::types::PushMessage;

use crate::coordinator::{Coordinator, SyncEvent};
use crate::model::{DeviceMac, Property};

/// Rejected-input errors for the push channel.
///
/// A rejection is fully isolated to the one message: the store is never
/// touched and ingestion continues. Distinct from "unknown device",
/// which is an expected race, not an error (see [`PushOutcome`]).
#[derive(Debug, Error)]
pub enum PushError {
    #[error("push message is missing the device identifier")]
    MissingDeviceId,

    #[error("push message carries no data frames")]
    NoDataFrames,

    #[error("malformed push message: {0}")]
    Malformed(String),
}

/// Result of a successfully validated push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The update was applied to the matching device.
    Applied {
        mac: DeviceMac,
        attributes: Vec<String>,
    },
    /// No device with this MAC is known; the update was dropped.
    /// Expected when a push races device provisioning -- the next poll
    /// cycle reconciles.
    UnknownDevice { mac: DeviceMac },
}

impl Coordinator {
    /// Ingest one asynchronous push message.
    ///
    /// Exactly one data frame is applied: the first in the list. The
    /// cloud may batch several time-ordered frames into one message;
    /// later frames are skipped (and counted in the debug log) rather
    /// than reordered by their embedded timestamps.
    ///
    /// Synchronous and non-blocking -- safe to call from any context.
    pub fn ingest_push(&self, raw: &serde_json::Value) -> Result<PushOutcome, PushError> {
        let message: PushMessage =
            serde_json::from_value(raw.clone()).map_err(|e| PushError::Malformed(e.to_string()))?;

        let mac = message
            .payload
            .info
            .and_then(|i| i.mac)
            .map(DeviceMac::new)
            .filter(|m| !m.is_empty())
            .ok_or(PushError::MissingDeviceId)?;

        let mut frames = message.payload.data.into_iter();
        let frame = frames.next().ok_or(PushError::NoDataFrames)?;
        if frame.is_empty() {
            return Err(PushError::NoDataFrames);
        }
        let skipped = frames.len();
        if skipped > 0 {
            debug!(mac = %mac, skipped, "push message carried extra frames, applying first only");
        }

        let updates: Vec<Property> = frame
            .into_iter()
            .map(|(name, f)| Property::from_frame(name, &f))
            .collect();
        let attributes: Vec<String> = updates.iter().map(|p| p.name.clone()).collect();

        if self.store().apply_partial_update(&mac, updates) {
            self.broadcast(SyncEvent::DeviceUpdated {
                mac: mac.clone(),
                attributes: attributes.clone(),
            });
            Ok(PushOutcome::Applied { mac, attributes })
        } else {
            Ok(PushOutcome::UnknownDevice { mac })
        }
    }
}
