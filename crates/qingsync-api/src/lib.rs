//! Async client for the Qingping IoT developer cloud.
//!
//! This crate is the transport boundary of the qingsync workspace:
//!
//! - **[`CloudClient`]** — OAuth2 client-credentials authentication
//!   ([`connect()`](CloudClient::connect)) and device listing
//!   ([`list_devices()`](CloudClient::list_devices)), each bounded by the
//!   transport timeout.
//! - **Wire types** ([`types`]) — tolerant serde structs for the device
//!   list and the inbound data-push envelope. Policy (frame selection,
//!   merge semantics) lives in `qingsync-core`.
//! - **[`Error`]** — transport/auth/API failure taxonomy with
//!   [`is_transient()`](Error::is_transient) for retry decisions.

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::{AccessToken, Credentials};
pub use client::{CloudClient, DEFAULT_API_URL, DEFAULT_AUTH_URL};
pub use error::Error;
pub use transport::TransportConfig;
