//! In-memory implementation of every store trait.
//!
//! All tables live behind one `Mutex`, which serializes logical operations
//! per store and makes the multi-row review-and-lock commit trivially
//! atomic: the lock is held across the review insert and the entry
//! transitions, so concurrent duplicates resolve to exactly one committed
//! review.
//!
//! This is the reference store for tests and the demo; a production
//! deployment supplies a relational store behind the same traits.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use siwes_contracts::{
    error::{TrackError, TrackResult},
    identity::{
        ActorId, IdentityRecord, Role, Student, StudentId, Supervisor, SupervisorId,
        SupervisorKind,
    },
    records::{
        Assignment, FinalInspection, Location, LocationId, LogEntry, EntryStatus,
        PresenceId, PresenceRecord, WeeklyReview,
    },
};
use siwes_core::{
    directory::IdentityDirectory,
    traits::{
        AssignmentStore, IdentityRepository, InspectionStore, LocationStore, LogbookStore,
        PresenceStore, ReviewStore, StudentStore, SupervisorStore,
    },
};

// ── Tables ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tables {
    students: HashMap<StudentId, Student>,
    locations: HashMap<LocationId, Location>,
    supervisors: HashMap<SupervisorId, Supervisor>,
    admins: HashSet<ActorId>,
    presence: Vec<PresenceRecord>,
    entries: Vec<LogEntry>,
    reviews: Vec<WeeklyReview>,
    inspections: Vec<FinalInspection>,
    assignments: Vec<Assignment>,
}

/// The in-memory reference store.
///
/// Cloning is cheap and shares the underlying tables, so one store can be
/// handed to every gate as each of its trait facets.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> TrackResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|e| TrackError::Storage {
            reason: format!("store lock poisoned: {e}"),
        })
    }

    // ── Seeding (admin collaborator stand-ins for tests and demos) ────────────

    /// Insert or replace a student row.
    pub fn put_student(&self, student: Student) {
        let mut t = self.tables.lock().expect("store lock poisoned");
        t.students.insert(student.id, student);
    }

    /// Insert or replace a location row.
    pub fn put_location(&self, location: Location) {
        let mut t = self.tables.lock().expect("store lock poisoned");
        t.locations.insert(location.id, location);
    }

    /// Insert or replace a supervisor row.
    pub fn put_supervisor(&self, supervisor: Supervisor) {
        let mut t = self.tables.lock().expect("store lock poisoned");
        t.supervisors.insert(supervisor.id, supervisor);
    }

    /// Register an administrator identity.
    pub fn put_admin(&self, id: ActorId) {
        let mut t = self.tables.lock().expect("store lock poisoned");
        t.admins.insert(id);
    }

    /// Build the role-keyed identity directory over this store's tables.
    pub fn identity_directory(&self) -> IdentityDirectory {
        IdentityDirectory::new()
            .register(Role::Student, Arc::new(StudentIdentities(self.clone())))
            .register(
                Role::IndustrySupervisor,
                Arc::new(SupervisorIdentities {
                    store: self.clone(),
                    kind: SupervisorKind::Industry,
                }),
            )
            .register(
                Role::InstitutionSupervisor,
                Arc::new(SupervisorIdentities {
                    store: self.clone(),
                    kind: SupervisorKind::Institution,
                }),
            )
            .register(Role::Admin, Arc::new(AdminIdentities(self.clone())))
    }
}

// ── Entity store impls ────────────────────────────────────────────────────────

impl StudentStore for MemoryStore {
    fn find_student(&self, id: &StudentId) -> TrackResult<Option<Student>> {
        Ok(self.lock()?.students.get(id).cloned())
    }

    fn set_student_location(
        &self,
        id: &StudentId,
        location: LocationId,
    ) -> TrackResult<Student> {
        let mut t = self.lock()?;
        let student = t.students.get_mut(id).ok_or_else(|| TrackError::NotFound {
            resource: "student".to_string(),
        })?;
        student.location_id = Some(location);
        Ok(student.clone())
    }
}

impl LocationStore for MemoryStore {
    fn find_location(&self, id: &LocationId) -> TrackResult<Option<Location>> {
        Ok(self.lock()?.locations.get(id).cloned())
    }
}

impl PresenceStore for MemoryStore {
    fn insert_presence(&self, record: PresenceRecord) -> TrackResult<PresenceRecord> {
        let mut t = self.lock()?;
        t.presence.push(record.clone());
        Ok(record)
    }

    fn find_presence(&self, id: &PresenceId) -> TrackResult<Option<PresenceRecord>> {
        Ok(self.lock()?.presence.iter().find(|p| &p.id == id).cloned())
    }

    fn recent_presence(
        &self,
        student: &StudentId,
        limit: usize,
    ) -> TrackResult<Vec<PresenceRecord>> {
        let t = self.lock()?;
        let mut records: Vec<PresenceRecord> = t
            .presence
            .iter()
            .filter(|p| &p.student_id == student)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records.truncate(limit);
        Ok(records)
    }
}

impl LogbookStore for MemoryStore {
    fn find_entry_by_date(
        &self,
        student: &StudentId,
        date: NaiveDate,
    ) -> TrackResult<Option<LogEntry>> {
        Ok(self
            .lock()?
            .entries
            .iter()
            .find(|e| &e.student_id == student && e.entry_date == date)
            .cloned())
    }

    fn insert_entry(&self, entry: LogEntry) -> TrackResult<LogEntry> {
        let mut t = self.lock()?;
        // Uniqueness constraint on (student_id, entry_date).
        if t.entries
            .iter()
            .any(|e| e.student_id == entry.student_id && e.entry_date == entry.entry_date)
        {
            return Err(TrackError::Storage {
                reason: "duplicate log entry for (student, entry_date)".to_string(),
            });
        }
        t.entries.push(entry.clone());
        Ok(entry)
    }

    fn update_entry(&self, entry: LogEntry) -> TrackResult<LogEntry> {
        let mut t = self.lock()?;
        let slot = t
            .entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| TrackError::NotFound { resource: "log entry".to_string() })?;
        *slot = entry.clone();
        Ok(entry)
    }

    fn entries_for_student(&self, student: &StudentId) -> TrackResult<Vec<LogEntry>> {
        let t = self.lock()?;
        let mut entries: Vec<LogEntry> = t
            .entries
            .iter()
            .filter(|e| &e.student_id == student)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        Ok(entries)
    }
}

impl ReviewStore for MemoryStore {
    fn find_review(
        &self,
        student: &StudentId,
        week_number: u32,
    ) -> TrackResult<Option<WeeklyReview>> {
        Ok(self
            .lock()?
            .reviews
            .iter()
            .find(|r| &r.student_id == student && r.week_number == week_number)
            .cloned())
    }

    fn commit_review(&self, review: WeeklyReview) -> TrackResult<u64> {
        // One guard held across the uniqueness check, the insert, and the
        // bulk lock: all-or-nothing, and concurrent duplicates serialize so
        // only the first commits.
        let mut t = self.lock()?;
        if t.reviews
            .iter()
            .any(|r| r.student_id == review.student_id && r.week_number == review.week_number)
        {
            return Err(TrackError::AlreadyReviewed);
        }

        let student_id = review.student_id;
        let week_number = review.week_number;
        t.reviews.push(review);

        let mut locked = 0u64;
        for entry in t
            .entries
            .iter_mut()
            .filter(|e| e.student_id == student_id && e.week_number == week_number)
        {
            entry.status = EntryStatus::Locked;
            locked += 1;
        }
        Ok(locked)
    }
}

impl SupervisorStore for MemoryStore {
    fn find_supervisor(&self, id: &SupervisorId) -> TrackResult<Option<Supervisor>> {
        Ok(self.lock()?.supervisors.get(id).cloned())
    }

    fn mark_supervisor_verified(&self, id: &SupervisorId) -> TrackResult<Supervisor> {
        let mut t = self.lock()?;
        let supervisor = t.supervisors.get_mut(id).ok_or_else(|| TrackError::NotFound {
            resource: "supervisor".to_string(),
        })?;
        supervisor.verified = true;
        Ok(supervisor.clone())
    }
}

impl AssignmentStore for MemoryStore {
    fn is_assigned(
        &self,
        student: &StudentId,
        supervisor: &SupervisorId,
    ) -> TrackResult<bool> {
        Ok(self.lock()?.assignments.iter().any(|a| {
            &a.student_id == student && &a.industry_supervisor_id == supervisor
        }))
    }

    fn insert_assignment(&self, assignment: Assignment) -> TrackResult<Assignment> {
        let mut t = self.lock()?;
        if t.assignments.iter().any(|a| {
            a.student_id == assignment.student_id
                && a.industry_supervisor_id == assignment.industry_supervisor_id
        }) {
            return Err(TrackError::AssignmentExists);
        }
        t.assignments.push(assignment.clone());
        Ok(assignment)
    }
}

impl InspectionStore for MemoryStore {
    fn find_inspection(&self, student: &StudentId) -> TrackResult<Option<FinalInspection>> {
        Ok(self
            .lock()?
            .inspections
            .iter()
            .find(|i| &i.student_id == student)
            .cloned())
    }

    fn insert_inspection(&self, inspection: FinalInspection) -> TrackResult<FinalInspection> {
        let mut t = self.lock()?;
        if t.inspections.iter().any(|i| i.student_id == inspection.student_id) {
            return Err(TrackError::AlreadyInspected);
        }
        t.inspections.push(inspection.clone());
        Ok(inspection)
    }
}

// ── Identity repositories ─────────────────────────────────────────────────────

/// Student identities, backed by the students table.
struct StudentIdentities(MemoryStore);

impl IdentityRepository for StudentIdentities {
    fn find(&self, id: &ActorId) -> TrackResult<Option<IdentityRecord>> {
        let t = self.0.lock()?;
        Ok(t.students.get(&StudentId(id.0)).map(|s| IdentityRecord {
            id: *id,
            role: Role::Student,
            display_name: s.full_name.clone(),
            verified: true,
        }))
    }
}

/// Supervisor identities of one kind, backed by the supervisors table.
struct SupervisorIdentities {
    store: MemoryStore,
    kind: SupervisorKind,
}

impl IdentityRepository for SupervisorIdentities {
    fn find(&self, id: &ActorId) -> TrackResult<Option<IdentityRecord>> {
        let t = self.store.lock()?;
        Ok(t.supervisors
            .get(&SupervisorId(id.0))
            .filter(|s| s.kind == self.kind)
            .map(|s| IdentityRecord {
                id: *id,
                role: self.kind.role(),
                display_name: s.full_name.clone(),
                verified: s.verified,
            }))
    }
}

/// Administrator identities.
struct AdminIdentities(MemoryStore);

impl IdentityRepository for AdminIdentities {
    fn find(&self, id: &ActorId) -> TrackResult<Option<IdentityRecord>> {
        let t = self.0.lock()?;
        Ok(t.admins.contains(id).then(|| IdentityRecord {
            id: *id,
            role: Role::Admin,
            display_name: "administrator".to_string(),
            verified: true,
        }))
    }
}
