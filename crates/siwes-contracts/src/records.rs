//! Placement records: locations, presence logs, logbook entries, reviews,
//! inspections, and supervisor assignments.
//!
//! All of these are owned by the persistent store. The tracker re-reads
//! whatever state it needs before mutating and holds no authoritative
//! in-memory copies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{StudentId, SupervisorId};

/// Identifier of a company location (geofence reference point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub uuid::Uuid);

/// Identifier of a presence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresenceId(pub uuid::Uuid);

/// Identifier of a logbook entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub uuid::Uuid);

/// Identifier of a weekly review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub uuid::Uuid);

/// Identifier of a final inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InspectionId(pub uuid::Uuid);

macro_rules! impl_new_id {
    ($($id:ident),+) => {
        $(
            impl $id {
                /// Create a new, unique id.
                pub fn new() -> Self {
                    Self(uuid::Uuid::new_v4())
                }
            }

            impl Default for $id {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl std::fmt::Display for $id {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    self.0.fmt(f)
                }
            }
        )+
    };
}

impl_new_id!(LocationId, PresenceId, EntryId, ReviewId, InspectionId);

/// A work-site reference point with its allowed geofence radius.
///
/// Owned by an administrative collaborator; read-only to the tracker once
/// assigned to a presence check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub company_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub allowed_radius_meters: f64,
}

/// Default geofence radius when a location does not specify one.
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;

/// Outcome of a geofenced presence submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceStatus {
    Valid,
    Invalid,
}

/// One GPS presence submission. Created exactly once, never mutated;
/// each student accumulates an append-only history of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub id: PresenceId,
    pub student_id: StudentId,
    pub latitude: f64,
    pub longitude: f64,
    /// Great-circle distance to the assigned location, rounded to the
    /// nearest whole metre for auditability. The validity comparison uses
    /// the unrounded value.
    pub distance_meters: i64,
    pub status: PresenceStatus,
    pub recorded_at: DateTime<Utc>,
}

/// Lifecycle state of a logbook entry.
///
/// `Locked` is terminal: it is only ever applied by the weekly review gate
/// and no call path can undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Open,
    Locked,
}

/// A daily logbook entry. At most one exists per (student, entry_date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub student_id: StudentId,
    /// Always the server date at submission time — never client-supplied,
    /// so backdating is impossible by construction.
    pub entry_date: NaiveDate,
    /// Derived from the student's SIWES start date, floored to 1.
    pub week_number: u32,
    pub activity_description: String,
    /// Optional reference to a VALID presence record, coupling the entry
    /// to a validated on-site submission.
    pub presence_log_id: Option<PresenceId>,
    /// SHA-256 creation fingerprint (see `siwes_core::fingerprint`).
    pub content_hash: String,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

/// A supervisor's weekly sign-off. Write-once per (student, week); its
/// creation locks every entry of that week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub id: ReviewId,
    pub student_id: StudentId,
    pub week_number: u32,
    pub industry_supervisor_id: SupervisorId,
    pub comment: String,
    pub review_hash: String,
    pub reviewed_at: DateTime<Utc>,
}

/// Compliance outcome of the terminal inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Partial,
}

/// The one-time terminal inspection record for a student, only creatable
/// after the program end-date has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalInspection {
    pub id: InspectionId,
    pub student_id: StudentId,
    pub institution_supervisor_id: SupervisorId,
    pub inspection_notes: String,
    pub compliance_status: ComplianceStatus,
    pub inspection_hash: String,
    pub inspected_at: DateTime<Utc>,
}

/// An active supervisor-to-student assignment. Unique per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub student_id: StudentId,
    pub industry_supervisor_id: SupervisorId,
    pub assigned_at: DateTime<Utc>,
}
