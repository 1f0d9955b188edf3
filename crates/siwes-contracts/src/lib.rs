//! # siwes-contracts
//!
//! Shared types, identifiers, and error contracts for the SIWES tracker.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod audit;
pub mod error;
pub mod identity;
pub mod records;
