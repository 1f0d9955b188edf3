//! # siwes-audit
//!
//! Best-effort, append-only audit trail recording for the SIWES tracker.
//!
//! ## Overview
//!
//! Every security-relevant attempt — completed or rejected — produces one
//! `AuditEvent`. The `BestEffortRecorder` queues events to a worker thread
//! and swallows persistence failures: the trail is forensic, never a
//! participant in the primary operation's outcome.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use siwes_audit::{BestEffortRecorder, InMemoryAuditStore};
//! use siwes_core::traits::AuditSink;
//!
//! let store = Arc::new(InMemoryAuditStore::new());
//! let recorder = BestEffortRecorder::new(store.clone());
//! recorder.record(event);
//! ```

pub mod memory;
pub mod recorder;

pub use memory::InMemoryAuditStore;
pub use recorder::BestEffortRecorder;

// ── Tests ─────────────────────────────────────────────────────────────────────
