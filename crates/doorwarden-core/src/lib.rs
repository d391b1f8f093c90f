//! Real-time update reconciliation and transport fallback.
//!
//! This crate owns the state machine between a dashboard backend and a
//! presentation surface:
//!
//! - **[`Monitor`]** — transport selector. Keeps exactly one delivery mode
//!   active (WebSocket push when available, HTTP polling otherwise),
//!   counts failed handshakes, and falls back to polling permanently once
//!   the retry budget is spent. Lifecycle is explicit:
//!   [`start()`](Monitor::start) / [`stop()`](Monitor::stop), with every
//!   background loop guarded by a cancellation token.
//!
//! - **[`Reconciler`]** — converts each [`StatusSnapshot`] into the
//!   minimal set of [`ViewSink`] mutations. Absent fields are "no change";
//!   unchanged fields produce no call; applying a snapshot twice is a
//!   no-op the second time.
//!
//! - **[`ViewSink`]** — the presentation seam. Any rendering surface
//!   (terminal, GUI, test recorder) implements it; the reconciler stays
//!   free of rendering concerns.
//!
//! - **[`SequencingPolicy`]** — pluggable admission of snapshots across
//!   the two unordered transports (see [`sequence`]).

pub mod animate;
pub mod classify;
pub mod config;
pub mod error;
pub mod monitor;
pub mod reconcile;
pub mod sequence;

// ── Primary re-exports ──────────────────────────────────────────────
pub use animate::CounterAnimation;
pub use classify::{AvailabilityBand, StatusClass, availability_band, classify_alarm, classify_door};
pub use config::{MonitorConfig, TlsVerification};
pub use error::CoreError;
pub use monitor::{ConnectionState, Monitor, TransportStatus};
pub use reconcile::{Counter, Element, Reconciler, ViewSink};
pub use sequence::{AdmitAll, SequencingPolicy, Source};

// Wire types are part of this crate's public API surface.
pub use doorwarden_api::{Statistics, StatusSnapshot, UptimeInfo};
