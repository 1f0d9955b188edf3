//! # siwes-store
//!
//! In-memory reference implementation of the SIWES tracker store traits.
//!
//! One `MemoryStore` implements every entity store seam; cloning shares the
//! underlying tables. Used by the gate tests and the demo binary; real
//! deployments put a relational database behind the same traits.

pub mod memory;

pub use memory::MemoryStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
