//! Error types for the SIWES tracker core.
//!
//! All fallible operations return `TrackResult<T>`. Variants carry enough
//! context to produce actionable audit entries and operator logs.

use thiserror::Error;

/// The unified error type for the SIWES tracker.
#[derive(Debug, Error)]
pub enum TrackError {
    /// A required field is missing or malformed. Rejected before any state
    /// change and never audited — nothing security-relevant was attempted.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// A required assignment (student→location or supervisor→student) does
    /// not exist.
    #[error("not assigned: {reason}")]
    NotAssigned { reason: String },

    /// The student's assigned location record is missing from the store.
    #[error("assigned location not found")]
    LocationNotFound,

    /// The student has no configured SIWES start date, so no week number
    /// can be derived.
    #[error("SIWES start date not set")]
    StartDateMissing,

    /// The referenced presence record is missing, belongs to another
    /// student, or does not have VALID status.
    #[error("invalid presence reference: {reason}")]
    InvalidPresence { reason: String },

    /// The log entry for this date is locked and can never be modified.
    #[error("entry is locked and cannot be modified")]
    EntryLocked,

    /// Weekly reviews may only be submitted on the designated review day.
    #[error("reviews can only be submitted on {expected}")]
    WrongDay { expected: String },

    /// A weekly review already exists for this (student, week) pair.
    #[error("week already reviewed and locked")]
    AlreadyReviewed,

    /// The SIWES period has not ended, so no final inspection may be filed.
    #[error("SIWES period has not ended")]
    PeriodNotEnded,

    /// A final inspection already exists for this student.
    #[error("final inspection already completed")]
    AlreadyInspected,

    /// The supervisor assignment already exists for this pair.
    #[error("assignment already exists")]
    AssignmentExists,

    /// The supervisor must be verified before performing this action.
    #[error("supervisor must be verified")]
    SupervisorNotVerified,

    /// A referenced entity does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The underlying store failed. Surfaced generically; the caller sees
    /// no partial state for multi-row operations.
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the SIWES tracker crates.
pub type TrackResult<T> = Result<T, TrackError>;
