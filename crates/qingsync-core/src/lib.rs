//! Device-state synchronization between the Qingping cloud
//! (`qingsync-api`) and consumers (CLI, embedding applications).
//!
//! Everything with real invariants lives here:
//!
//! - **[`Coordinator`]** — Facade managing the poll lifecycle:
//!   [`start()`](Coordinator::start) authenticates, takes an initial
//!   snapshot, then runs the periodic refresh; failures are surfaced to
//!   subscribers and never fatal to the loop. Push messages enter via
//!   [`ingest_push()`](Coordinator::ingest_push) and converge on the
//!   same store and notification path.
//!
//! - **[`DeviceStore`]** — Reactive storage holding the current device
//!   [`Snapshot`] in a `watch` channel. Wholesale replacement (poll) and
//!   per-device partial updates (push) are both atomic with respect to
//!   readers.
//!
//! - **Domain model** ([`model`]) — [`Device`], [`Property`], and
//!   [`DeviceMac`], with a closed attribute table driving presentation
//!   (unit, class, title, value coercion).
//!
//! - **[`is_available`]** — Pure freshness evaluation over device +
//!   attribute + clock, tolerating [`MAX_DELAY_MULTIPLIER`] missed
//!   report intervals.

pub mod availability;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod push;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use availability::{MAX_DELAY_MULTIPLIER, is_available};
pub use config::{
    API_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS, SyncConfig,
};
pub use coordinator::{Coordinator, SyncEvent};
pub use error::CoreError;
pub use push::{PushError, PushOutcome};
pub use store::{DeviceStore, Snapshot};

pub use model::{Device, DeviceMac, DisplayValue, Property, SensorClass};
