//! # siwes-core
//!
//! The trust seams of the SIWES tracker, plus its two pure primitives.
//!
//! This crate provides:
//! - The trait seams the operation gates are written against (`Clock`,
//!   `AuditSink`, `AuditStore`, `IdentityRepository`, entity stores)
//! - The geofence evaluator (haversine distance vs. allowed radius)
//! - The content fingerprint (canonical-JSON SHA-256 creation digests)
//! - The role-keyed `IdentityDirectory`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use siwes_core::{geofence, fingerprint::fingerprint, traits::Clock};
//! ```

pub mod clock;
pub mod directory;
pub mod fingerprint;
pub mod geofence;
pub mod traits;

pub use clock::{ManualClock, SystemClock};
pub use directory::IdentityDirectory;
pub use fingerprint::fingerprint;
pub use geofence::{evaluate, validate_point, GeofenceCheck, EARTH_RADIUS_METERS};
