//! # siwes-tracker
//!
//! The operation gates of the SIWES placement tracker:
//!
//! - [`PresenceValidator`] — geofenced GPS presence submissions
//! - [`LogbookManager`]    — daily entries with creation fingerprints and
//!   the same-day update window
//! - [`ReviewGate`]        — write-once weekly reviews and the atomic
//!   week lock
//! - [`InspectionGate`]    — the one-time terminal inspection
//! - [`AdminDesk`]         — verification, assignment, and the trail
//!
//! Every gate is constructed over the trait seams in `siwes-core` plus a
//! [`TrackerConfig`], takes an authenticated `ActorContext` per call, and
//! records audit events through a fire-and-forget `AuditSink` — rejections
//! included.

pub mod admin;
pub mod config;
pub mod inspection;
pub mod logbook;
pub mod presence;
pub mod review;

pub use admin::AdminDesk;
pub use config::TrackerConfig;
pub use inspection::InspectionGate;
pub use logbook::LogbookManager;
pub use presence::PresenceValidator;
pub use review::ReviewGate;
