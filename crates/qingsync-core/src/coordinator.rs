// ── Synchronization coordinator ──
//
// Owns the poll path: authenticates against the cloud, runs the periodic
// full refresh, and publishes a unified event stream that push ingestion
// (push.rs) feeds into as well. One Coordinator per logical integration
// instance, handed by reference to consumers -- no process-wide registry.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use qingsync_api::{CloudClient, Credentials, DEFAULT_API_URL, DEFAULT_AUTH_URL, TransportConfig};

use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::model::{Device, DeviceMac};
use crate::store::{DeviceStore, Snapshot};

const EVENT_CHANNEL_SIZE: usize = 256;

// ── SyncEvent ────────────────────────────────────────────────────────

/// Notification emitted after every store transition (and after every
/// failed poll attempt). Consumers re-pull their displayed values from
/// the store; push- and poll-origin updates are indistinguishable here
/// except by variant.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A poll cycle replaced the snapshot.
    Refreshed { device_count: usize },
    /// A poll cycle failed; the previous snapshot is still in place.
    RefreshFailed { reason: String },
    /// A push update patched one device's attributes.
    DeviceUpdated {
        mac: DeviceMac,
        attributes: Vec<String>,
    },
}

// ── Coordinator ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Manages the poll
/// lifecycle and exposes the store plus the event stream.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: SyncConfig,
    client: CloudClient,
    store: Arc<DeviceStore>,
    event_tx: broadcast::Sender<SyncEvent>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator from configuration. Does NOT touch the
    /// network -- call [`start()`](Self::start) or
    /// [`refresh()`](Self::refresh).
    pub fn new(config: SyncConfig) -> Result<Self, CoreError> {
        let api_url = config
            .api_url
            .as_ref()
            .map_or(DEFAULT_API_URL.to_owned(), ToString::to_string);
        let auth_url = config
            .auth_url
            .as_ref()
            .map_or(DEFAULT_AUTH_URL.to_owned(), ToString::to_string);

        let transport = TransportConfig::with_timeout(config.timeout);
        let credentials = Credentials::new(config.app_key.clone(), config.app_secret.clone());
        let client = CloudClient::with_endpoints(credentials, &transport, &api_url, &auth_url)
            .map_err(CoreError::from)?;

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                store: Arc::new(DeviceStore::new()),
                event_tx,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.inner.store
    }

    /// Subscribe to the unified event stream.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Subscribe to snapshot changes (delegates to the store).
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.store.subscribe()
    }

    pub(crate) fn broadcast(&self, event: SyncEvent) {
        let _ = self.inner.event_tx.send(event);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the first refresh and spawn the periodic poll task.
    ///
    /// The first refresh must succeed: the engine does not come up
    /// without one good snapshot. Subsequent failures are reported to
    /// subscribers and never stop the loop.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.refresh().await?;

        let interval = self.inner.config.effective_poll_interval();
        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(poll_task(coordinator, interval, cancel));
        self.inner.task_handles.lock().await.push(handle);

        info!(poll_interval_secs = interval.as_secs(), "synchronization started");
        Ok(())
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("synchronization stopped");
    }

    // ── Poll path ────────────────────────────────────────────────────

    /// Run one full poll cycle: authenticate, fetch the device list,
    /// and atomically replace the snapshot.
    ///
    /// On failure the previous snapshot is retained, the failure is
    /// broadcast as [`SyncEvent::RefreshFailed`], and the error is
    /// returned for callers that need it (the poll loop only logs it).
    pub async fn refresh(&self) -> Result<(), CoreError> {
        match self.fetch_devices().await {
            Ok(devices) => {
                let count = devices.len();
                self.inner
                    .store
                    .replace_snapshot(self.inner.client.api_url().to_string(), devices);
                debug!(devices = count, "poll refresh complete");
                self.broadcast(SyncEvent::Refreshed {
                    device_count: count,
                });
                Ok(())
            }
            Err(e) => {
                self.inner.store.mark_refresh_failed();
                self.broadcast(SyncEvent::RefreshFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Authenticate and list devices, each call under a bounded timeout.
    /// A call exceeding its timeout is abandoned; no partial result is
    /// merged.
    async fn fetch_devices(&self) -> Result<Vec<Device>, CoreError> {
        let timeout = self.inner.config.timeout;
        let timeout_secs = timeout.as_secs();

        tokio::time::timeout(timeout, self.inner.client.connect())
            .await
            .map_err(|_| CoreError::Timeout { timeout_secs })??;

        let list = tokio::time::timeout(timeout, self.inner.client.list_devices())
            .await
            .map_err(|_| CoreError::Timeout { timeout_secs })??;

        Ok(list.devices.into_iter().map(Device::from).collect())
    }
}

// ── Background poll loop ─────────────────────────────────────────────

async fn poll_task(coordinator: Coordinator, period: std::time::Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
