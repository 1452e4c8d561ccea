// ── Synchronization store ──
//
// Single shared-mutable owner of all device state. Both ingestion paths
// (full poll refresh, partial push update) funnel through here, and both
// publish the same "state changed" signal: a new snapshot Arc on the
// watch channel. Readers borrow an immutable snapshot and can never
// observe a torn write; mutation happens only inside the channel's
// modify closures, which also makes a racing replace/patch last-writer-wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::model::{Device, DeviceMac, Property};

/// The complete set of devices known at a point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Opaque label for the upstream controller (the API base URL).
    pub controller_name: String,
    pub devices: Vec<Arc<Device>>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            controller_name: String::new(),
            devices: Vec::new(),
        }
    }

    /// Resolve a device by its MAC. Absent is a legitimate outcome
    /// (e.g. a push racing device provisioning), not an error.
    pub fn find(&self, mac: &DeviceMac) -> Option<Arc<Device>> {
        self.devices.iter().find(|d| d.mac == *mac).cloned()
    }
}

/// Reactive store holding the current device snapshot.
pub struct DeviceStore {
    snapshot: watch::Sender<Arc<Snapshot>>,
    /// Outcome of the most recent poll attempt. Push ingestion never
    /// touches this -- only the refresh engine does.
    poll_ok: watch::Sender<bool>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        let (poll_ok, _) = watch::channel(true);
        let (last_refresh, _) = watch::channel(None);
        Self {
            snapshot,
            poll_ok,
            last_refresh,
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Atomically swap the entire device list.
    ///
    /// Observable as a single transition: readers see either the old
    /// snapshot or the new one, never a mix. Also records poll success.
    pub fn replace_snapshot(&self, controller_name: impl Into<String>, devices: Vec<Device>) {
        let next = Arc::new(Snapshot {
            controller_name: controller_name.into(),
            devices: devices.into_iter().map(Arc::new).collect(),
        });
        self.snapshot.send_replace(next);
        self.poll_ok.send_replace(true);
        self.last_refresh.send_replace(Some(Utc::now()));
    }

    /// Record a failed poll attempt. The previous snapshot is retained
    /// unchanged; push ingestion keeps operating on stale-but-valid data.
    pub fn mark_refresh_failed(&self) {
        self.poll_ok.send_replace(false);
    }

    /// Merge a set of fresh properties into one device's `data` map.
    ///
    /// All-or-nothing per device: the updated device is rebuilt off to
    /// the side and swapped in as a whole, so a concurrent reader never
    /// sees half the update set applied. Attributes not mentioned are
    /// left untouched. Returns `false` (update dropped, logged) when no
    /// device matches -- subscribers are not notified in that case.
    pub fn apply_partial_update(&self, mac: &DeviceMac, updates: Vec<Property>) -> bool {
        let mut applied = false;
        self.snapshot.send_if_modified(|snap| {
            let Some(idx) = snap.devices.iter().position(|d| d.mac == *mac) else {
                debug!(mac = %mac, "dropping partial update for unknown device");
                return false;
            };

            let mut devices = snap.devices.clone();
            let mut device = (*devices[idx]).clone();
            for prop in updates {
                device.data.insert(prop.name.clone(), prop);
            }
            devices[idx] = Arc::new(device);

            *snap = Arc::new(Snapshot {
                controller_name: snap.controller_name.clone(),
                devices,
            });
            applied = true;
            true
        });
        applied
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current snapshot (cheap Arc clone).
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn find_device_by_mac(&self, mac: &DeviceMac) -> Option<Arc<Device>> {
        self.snapshot.borrow().find(mac)
    }

    pub fn device_count(&self) -> usize {
        self.snapshot.borrow().devices.len()
    }

    /// Whether the most recent poll attempt succeeded.
    pub fn last_poll_ok(&self) -> bool {
        *self.poll_ok.borrow()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to snapshot changes. A new value is published after
    /// every successful replace or partial update, regardless of origin.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    /// Subscribe to poll-health transitions.
    pub fn subscribe_poll_health(&self) -> watch::Receiver<bool> {
        self.poll_ok.subscribe()
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}
