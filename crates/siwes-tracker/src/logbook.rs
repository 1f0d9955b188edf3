//! The logbook lifecycle manager.
//!
//! One entry per student per calendar day, dated by the server clock so
//! backdating is impossible by construction. An entry referencing a
//! presence record couples the logbook to validated on-site presence: the
//! reference must belong to the submitting student and have VALID status.
//! OPEN entries are freely editable by their owner; LOCKED entries are
//! immutable for every future call regardless of actor.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use siwes_contracts::{
    audit::{AuditAction, AuditEvent},
    error::{TrackError, TrackResult},
    identity::{ActorContext, StudentId},
    records::{EntryId, EntryStatus, LogEntry, PresenceId, PresenceStatus},
};
use siwes_core::{
    fingerprint::fingerprint,
    traits::{AuditSink, Clock, LogbookStore, PresenceStore, StudentStore},
};

/// Derive the placement week for an entry date.
///
/// `floor((entry_date − start_date) / 7 days) + 1`, floored to a minimum
/// of 1 — an entry dated before the start date still lands in week 1.
pub fn derive_week_number(start_date: NaiveDate, entry_date: NaiveDate) -> u32 {
    let days = (entry_date - start_date).num_days();
    if days < 0 {
        return 1;
    }
    (days / 7 + 1) as u32
}

/// Hashed payload for a freshly created entry.
#[derive(Serialize)]
struct EntryCreatePayload<'a> {
    student_id: StudentId,
    entry_date: NaiveDate,
    week_number: u32,
    activity_description: &'a str,
    timestamp: DateTime<Utc>,
}

/// Hashed payload for an update to an OPEN entry.
///
/// Deliberately omits the week number — the fingerprint covers exactly the
/// fields an update can change, plus identity and time.
#[derive(Serialize)]
struct EntryUpdatePayload<'a> {
    student_id: StudentId,
    entry_date: NaiveDate,
    activity_description: &'a str,
    timestamp: DateTime<Utc>,
}

/// Create-or-update gate for daily logbook entries.
pub struct LogbookManager {
    students: Arc<dyn StudentStore>,
    presence: Arc<dyn PresenceStore>,
    entries: Arc<dyn LogbookStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl LogbookManager {
    pub fn new(
        students: Arc<dyn StudentStore>,
        presence: Arc<dyn PresenceStore>,
        entries: Arc<dyn LogbookStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { students, presence, entries, audit, clock }
    }

    /// Submit today's activity.
    ///
    /// # Pipeline
    ///
    /// 1. Non-empty description; the entry date is always the server date.
    /// 2. Derive the week number from the student's SIWES start date —
    ///    `StartDateMissing` when unset.
    /// 3. A supplied presence reference must belong to this student and be
    ///    VALID — `InvalidPresence` otherwise, audited.
    /// 4. An existing entry for today: LOCKED fails with `EntryLocked`
    ///    (audited, no mutation); OPEN is updated in place with a fresh
    ///    content hash, audited as an update.
    /// 5. Otherwise a new OPEN entry is created, audited as a create.
    pub fn submit_entry(
        &self,
        actor: &ActorContext,
        activity_description: &str,
        presence_log_id: Option<PresenceId>,
    ) -> TrackResult<LogEntry> {
        if activity_description.trim().is_empty() {
            return Err(TrackError::Validation {
                reason: "activity description required".to_string(),
            });
        }

        let student_id = actor.student_id();
        let entry_date = self.clock.today();

        let start_date = self
            .students
            .find_student(&student_id)?
            .and_then(|s| s.siwes_start_date)
            .ok_or(TrackError::StartDateMissing)?;
        let week_number = derive_week_number(start_date, entry_date);

        if let Some(presence_id) = presence_log_id {
            self.check_presence(actor, &student_id, &presence_id)?;
        }

        if let Some(existing) = self.entries.find_entry_by_date(&student_id, entry_date)? {
            if existing.status == EntryStatus::Locked {
                self.audit.record(AuditEvent::attempt(
                    actor,
                    AuditAction::LogbookEditAttempt,
                    "log_entry",
                    false,
                    self.clock.now(),
                ));
                return Err(TrackError::EntryLocked);
            }

            let content_hash = fingerprint(&EntryUpdatePayload {
                student_id,
                entry_date,
                activity_description,
                timestamp: self.clock.now(),
            })?;

            let updated = self.entries.update_entry(LogEntry {
                activity_description: activity_description.to_string(),
                presence_log_id,
                content_hash,
                ..existing
            })?;

            self.audit.record(AuditEvent::attempt(
                actor,
                AuditAction::LogbookUpdate,
                format!("log_entry_{}", updated.id),
                true,
                self.clock.now(),
            ));

            info!(student_id = %student_id, entry_id = %updated.id, "log entry updated");
            return Ok(updated);
        }

        let content_hash = fingerprint(&EntryCreatePayload {
            student_id,
            entry_date,
            week_number,
            activity_description,
            timestamp: self.clock.now(),
        })?;

        let entry = self.entries.insert_entry(LogEntry {
            id: EntryId::new(),
            student_id,
            entry_date,
            week_number,
            activity_description: activity_description.to_string(),
            presence_log_id,
            content_hash,
            status: EntryStatus::Open,
            created_at: self.clock.now(),
        })?;

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::LogbookCreate,
            format!("log_entry_{}", entry.id),
            true,
            self.clock.now(),
        ));

        info!(
            student_id = %student_id,
            entry_id = %entry.id,
            week = week_number,
            "log entry created"
        );
        Ok(entry)
    }

    /// The student's own entries, newest entry date first.
    pub fn list_entries(&self, actor: &ActorContext) -> TrackResult<Vec<LogEntry>> {
        self.entries.entries_for_student(&actor.student_id())
    }

    /// Enforce that a presence reference belongs to `student_id` and is
    /// VALID. Rejections are audited.
    fn check_presence(
        &self,
        actor: &ActorContext,
        student_id: &StudentId,
        presence_id: &PresenceId,
    ) -> TrackResult<()> {
        let found = self
            .presence
            .find_presence(presence_id)?
            .filter(|p| &p.student_id == student_id);

        let reason = match found {
            None => "presence record does not exist for this student",
            Some(p) if p.status != PresenceStatus::Valid => {
                "presence must be VALID to attach to a log entry"
            }
            Some(_) => {
                debug!(student_id = %student_id, presence_id = %presence_id, "presence reference accepted");
                return Ok(());
            }
        };

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::LogbookAttempt,
            "log_entry",
            false,
            self.clock.now(),
        ));
        Err(TrackError::InvalidPresence { reason: reason.to_string() })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use siwes_audit::{BestEffortRecorder, InMemoryAuditStore};
    use siwes_contracts::{
        identity::{ActorContext, Role, Student, StudentId},
        records::{PresenceRecord, PresenceStatus},
    };
    use siwes_core::ManualClock;
    use siwes_store::MemoryStore;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct Fixture {
        manager: LogbookManager,
        store: MemoryStore,
        audit_store: Arc<InMemoryAuditStore>,
        recorder: Arc<BestEffortRecorder>,
        clock: Arc<ManualClock>,
        student_id: StudentId,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let audit_store = Arc::new(InMemoryAuditStore::new());
        let recorder = Arc::new(BestEffortRecorder::new(audit_store.clone()));
        let clock = Arc::new(ManualClock::on_date(date(2024, 1, 15)));

        let student_id = StudentId::new();
        store.put_student(Student {
            id: student_id,
            matric_number: "ENG/2020/031".to_string(),
            full_name: "Amina Bello".to_string(),
            location_id: None,
            siwes_start_date: Some(date(2024, 1, 1)),
            siwes_end_date: Some(date(2024, 6, 28)),
        });

        let manager = LogbookManager::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            recorder.clone(),
            clock.clone(),
        );

        Fixture { manager, store, audit_store, recorder, clock, student_id }
    }

    fn actor(student_id: StudentId) -> ActorContext {
        ActorContext::new(student_id.into(), Role::Student)
    }

    fn valid_presence(fx: &Fixture, student_id: StudentId) -> PresenceRecord {
        fx.store
            .insert_presence(PresenceRecord {
                id: siwes_contracts::records::PresenceId::new(),
                student_id,
                latitude: 0.0,
                longitude: 0.0,
                distance_meters: 12,
                status: PresenceStatus::Valid,
                recorded_at: fx.clock.now(),
            })
            .unwrap()
    }

    // ── Week derivation ───────────────────────────────────────────────────────

    /// Start 2024-01-01, entry 2024-01-15: week 3.
    #[test]
    fn week_number_fifteen_days_in_is_three() {
        assert_eq!(derive_week_number(date(2024, 1, 1), date(2024, 1, 15)), 3);
    }

    #[test]
    fn week_number_boundaries() {
        let start = date(2024, 1, 1);
        assert_eq!(derive_week_number(start, start), 1);
        assert_eq!(derive_week_number(start, date(2024, 1, 7)), 1);
        assert_eq!(derive_week_number(start, date(2024, 1, 8)), 2);
        // Before the start date clamps to week 1.
        assert_eq!(derive_week_number(start, date(2023, 12, 25)), 1);
    }

    // ── Create path ───────────────────────────────────────────────────────────

    #[test]
    fn creates_open_entry_with_server_date() {
        let fx = fixture();
        let entry = fx
            .manager
            .submit_entry(&actor(fx.student_id), "installed conduit runs", None)
            .unwrap();

        assert_eq!(entry.entry_date, date(2024, 1, 15));
        assert_eq!(entry.week_number, 3);
        assert_eq!(entry.status, EntryStatus::Open);
        assert_eq!(entry.content_hash.len(), 64);

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::LogbookCreate);
        assert!(trail[0].success);
    }

    #[test]
    fn empty_description_rejected_without_audit() {
        let fx = fixture();
        let result = fx.manager.submit_entry(&actor(fx.student_id), "   ", None);
        assert!(matches!(result, Err(TrackError::Validation { .. })));

        fx.recorder.flush();
        assert!(fx.audit_store.is_empty());
    }

    #[test]
    fn missing_start_date_rejected() {
        let fx = fixture();
        let sid = StudentId::new();
        fx.store.put_student(Student {
            id: sid,
            matric_number: "ENG/2020/052".to_string(),
            full_name: "Ngozi Ude".to_string(),
            location_id: None,
            siwes_start_date: None,
            siwes_end_date: None,
        });

        let result = fx.manager.submit_entry(&actor(sid), "something", None);
        assert!(matches!(result, Err(TrackError::StartDateMissing)));
    }

    // ── Presence coupling ─────────────────────────────────────────────────────

    #[test]
    fn valid_presence_reference_accepted() {
        let fx = fixture();
        let presence = valid_presence(&fx, fx.student_id);

        let entry = fx
            .manager
            .submit_entry(&actor(fx.student_id), "site survey", Some(presence.id))
            .unwrap();
        assert_eq!(entry.presence_log_id, Some(presence.id));
    }

    /// An INVALID presence record always fails with InvalidPresence and no
    /// entry is created.
    #[test]
    fn invalid_presence_reference_rejected() {
        let fx = fixture();
        let presence = fx
            .store
            .insert_presence(PresenceRecord {
                id: siwes_contracts::records::PresenceId::new(),
                student_id: fx.student_id,
                latitude: 1.0,
                longitude: 1.0,
                distance_meters: 900,
                status: PresenceStatus::Invalid,
                recorded_at: fx.clock.now(),
            })
            .unwrap();

        let result =
            fx.manager
                .submit_entry(&actor(fx.student_id), "site survey", Some(presence.id));
        assert!(matches!(result, Err(TrackError::InvalidPresence { .. })));

        assert!(fx.manager.list_entries(&actor(fx.student_id)).unwrap().is_empty());

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::LogbookAttempt);
        assert!(!trail[0].success);
    }

    /// Someone else's presence record is as invalid as a missing one.
    #[test]
    fn foreign_presence_reference_rejected() {
        let fx = fixture();
        let other = StudentId::new();
        let presence = valid_presence(&fx, other);

        let result =
            fx.manager
                .submit_entry(&actor(fx.student_id), "site survey", Some(presence.id));
        assert!(matches!(result, Err(TrackError::InvalidPresence { .. })));
    }

    // ── Upsert semantics ──────────────────────────────────────────────────────

    /// Re-submitting on the same date updates the OPEN entry in place —
    /// never a second row.
    #[test]
    fn same_day_resubmission_updates_open_entry() {
        let fx = fixture();
        let who = actor(fx.student_id);

        let first = fx.manager.submit_entry(&who, "morning: cable trays", None).unwrap();
        fx.clock.set(fx.clock.now() + chrono::Duration::hours(6));
        let second = fx.manager.submit_entry(&who, "afternoon: terminations", None).unwrap();

        assert_eq!(first.id, second.id, "update must reuse the existing row");
        assert_eq!(second.activity_description, "afternoon: terminations");
        assert_ne!(first.content_hash, second.content_hash, "hash recomputed on edit");

        let entries = fx.manager.list_entries(&who).unwrap();
        assert_eq!(entries.len(), 1, "one entry per (student, date)");

        fx.recorder.flush();
        let actions: Vec<_> = fx.audit_store.all().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::LogbookCreate, AuditAction::LogbookUpdate]);
    }

    /// A new day means a new entry.
    #[test]
    fn next_day_creates_new_entry() {
        let fx = fixture();
        let who = actor(fx.student_id);

        fx.manager.submit_entry(&who, "day one", None).unwrap();
        fx.clock.advance_days(1);
        fx.manager.submit_entry(&who, "day two", None).unwrap();

        let entries = fx.manager.list_entries(&who).unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first.
        assert_eq!(entries[0].activity_description, "day two");
    }

    /// A locked entry rejects every edit, and the rejection is audited.
    #[test]
    fn locked_entry_never_updates() {
        let fx = fixture();
        let who = actor(fx.student_id);

        let entry = fx.manager.submit_entry(&who, "original text", None).unwrap();

        // Lock it the way the review gate would.
        fx.store
            .update_entry(LogEntry { status: EntryStatus::Locked, ..entry.clone() })
            .unwrap();

        let result = fx.manager.submit_entry(&who, "tampered text", None);
        assert!(matches!(result, Err(TrackError::EntryLocked)));

        // Content untouched.
        let entries = fx.manager.list_entries(&who).unwrap();
        assert_eq!(entries[0].activity_description, "original text");
        assert_eq!(entries[0].content_hash, entry.content_hash);

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail.last().unwrap().action, AuditAction::LogbookEditAttempt);
        assert!(!trail.last().unwrap().success);
    }
}
