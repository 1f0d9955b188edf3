//! Trust-seam trait definitions for the SIWES tracker.
//!
//! The operation gates in `siwes-tracker` are written entirely against
//! these traits:
//!
//! - `Clock`         — wall-clock source (pinned in tests)
//! - `AuditSink`     — best-effort, infallible audit recording
//! - `AuditStore`    — the fallible persistence behind the sink
//! - entity stores   — durable relational state with per-row atomicity
//!
//! The store contract assumes a single-writer-per-row external transaction
//! model: gates re-read whatever state they need before mutating and never
//! hold authoritative in-memory copies. The one multi-row transactional
//! boundary is `ReviewStore::commit_review`.

use chrono::{DateTime, NaiveDate, Utc};

use siwes_contracts::{
    audit::AuditEvent,
    error::TrackResult,
    identity::{ActorId, IdentityRecord, Student, StudentId, Supervisor, SupervisorId},
    records::{
        Assignment, FinalInspection, Location, LocationId, LogEntry, PresenceId,
        PresenceRecord, WeeklyReview,
    },
};

/// Source of "now" for every gate.
///
/// All date and day-of-week decisions (entry dates, week numbers, the
/// Friday review gate, the end-of-period inspection gate) go through this
/// trait so tests can pin the calendar.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// The current server date. Derived from `now()` by default.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Best-effort audit recording.
///
/// `record` is infallible by contract: a failure to persist the event must
/// never surface to the caller, never block the primary operation, and is
/// only reported to the operational log. Implementations swallow their own
/// errors.
pub trait AuditSink: Send + Sync {
    /// Record one event, fire-and-forget.
    fn record(&self, event: AuditEvent);
}

/// The fallible persistence layer behind an `AuditSink`.
///
/// Append-only: events written here are never modified or deleted. The
/// operation gates never read this store; `recent` exists solely for the
/// administrative trail listing.
pub trait AuditStore: Send + Sync {
    /// Append one event to the trail.
    fn append(&self, event: &AuditEvent) -> TrackResult<()>;

    /// A newest-first page of the trail.
    fn recent(&self, limit: usize, offset: usize) -> TrackResult<Vec<AuditEvent>>;
}

/// Uniform per-role identity lookup.
///
/// One implementation exists per role; all expose the same contract, so
/// call sites resolve actors through an
/// [`IdentityDirectory`](crate::directory::IdentityDirectory) instead of
/// branching on role to pick a table.
pub trait IdentityRepository: Send + Sync {
    /// Find the identity record for `id`, if this role has one.
    fn find(&self, id: &ActorId) -> TrackResult<Option<IdentityRecord>>;

    /// Whether `id` exists under this role.
    fn exists(&self, id: &ActorId) -> TrackResult<bool> {
        Ok(self.find(id)?.is_some())
    }
}

/// Student profile reads and the administrative location assignment.
pub trait StudentStore: Send + Sync {
    fn find_student(&self, id: &StudentId) -> TrackResult<Option<Student>>;

    /// Point the student at a work-site geofence. Returns the updated
    /// student or `NotFound`.
    fn set_student_location(
        &self,
        id: &StudentId,
        location: LocationId,
    ) -> TrackResult<Student>;
}

/// Read-only access to work-site reference points.
pub trait LocationStore: Send + Sync {
    fn find_location(&self, id: &LocationId) -> TrackResult<Option<Location>>;
}

/// Append-only presence history.
pub trait PresenceStore: Send + Sync {
    /// Persist one presence record. Records are never mutated afterward.
    fn insert_presence(&self, record: PresenceRecord) -> TrackResult<PresenceRecord>;

    fn find_presence(&self, id: &PresenceId) -> TrackResult<Option<PresenceRecord>>;

    /// The most recent records for a student, newest first, at most `limit`.
    fn recent_presence(
        &self,
        student: &StudentId,
        limit: usize,
    ) -> TrackResult<Vec<PresenceRecord>>;
}

/// Daily logbook entries, unique per (student, entry_date).
pub trait LogbookStore: Send + Sync {
    fn find_entry_by_date(
        &self,
        student: &StudentId,
        date: NaiveDate,
    ) -> TrackResult<Option<LogEntry>>;

    /// Insert a new entry. The (student, entry_date) pair must be free.
    fn insert_entry(&self, entry: LogEntry) -> TrackResult<LogEntry>;

    /// Replace an existing entry by id. Returns `NotFound` if it vanished.
    ///
    /// Callers enforce the lock state before calling; the store only
    /// persists.
    fn update_entry(&self, entry: LogEntry) -> TrackResult<LogEntry>;

    /// All of a student's entries, newest entry_date first.
    fn entries_for_student(&self, student: &StudentId) -> TrackResult<Vec<LogEntry>>;
}

/// Write-once weekly reviews and the atomic week lock.
pub trait ReviewStore: Send + Sync {
    fn find_review(
        &self,
        student: &StudentId,
        week_number: u32,
    ) -> TrackResult<Option<WeeklyReview>>;

    /// Persist the review AND transition every log entry of
    /// (student, week) to LOCKED, as one atomic unit: both happen or
    /// neither does.
    ///
    /// Uniqueness is enforced here as well — a concurrent duplicate for the
    /// same (student, week) must lose with `AlreadyReviewed`. Returns the
    /// number of entries locked.
    fn commit_review(&self, review: WeeklyReview) -> TrackResult<u64>;
}

/// Supervisor records and the administrative verification flag.
pub trait SupervisorStore: Send + Sync {
    fn find_supervisor(&self, id: &SupervisorId) -> TrackResult<Option<Supervisor>>;

    /// Mark a supervisor verified. Returns the updated record or `NotFound`.
    fn mark_supervisor_verified(&self, id: &SupervisorId) -> TrackResult<Supervisor>;
}

/// Active supervisor-to-student assignments, unique per pair.
pub trait AssignmentStore: Send + Sync {
    fn is_assigned(
        &self,
        student: &StudentId,
        supervisor: &SupervisorId,
    ) -> TrackResult<bool>;

    /// Insert an assignment; a duplicate pair is `AssignmentExists`.
    fn insert_assignment(&self, assignment: Assignment) -> TrackResult<Assignment>;
}

/// Write-once terminal inspections, at most one per student.
pub trait InspectionStore: Send + Sync {
    fn find_inspection(&self, student: &StudentId) -> TrackResult<Option<FinalInspection>>;

    /// Insert the inspection; a second one for the same student is
    /// `AlreadyInspected`.
    fn insert_inspection(&self, inspection: FinalInspection) -> TrackResult<FinalInspection>;
}
