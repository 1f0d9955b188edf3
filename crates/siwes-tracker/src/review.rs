//! The weekly review and lock gate.
//!
//! A supervisor closes out one week of a student's logbook: the review is
//! write-once per (student, week), accepted only on the designated review
//! day, and its commit locks every entry of that week in the same atomic
//! store operation. Locked entries never unlock.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::info;

use siwes_contracts::{
    audit::{AuditAction, AuditEvent},
    error::{TrackError, TrackResult},
    identity::{ActorContext, Role, StudentId, SupervisorId},
    records::{LogEntry, ReviewId, WeeklyReview},
};
use siwes_core::{
    directory::IdentityDirectory,
    fingerprint::fingerprint,
    traits::{AssignmentStore, AuditSink, Clock, LogbookStore, ReviewStore},
};

use crate::config::TrackerConfig;

/// Hashed payload for a weekly review.
#[derive(Serialize)]
struct ReviewPayload<'a> {
    student_id: StudentId,
    week_number: u32,
    supervisor_id: SupervisorId,
    comment: &'a str,
    timestamp: DateTime<Utc>,
}

/// Supervisor-facing gate over weekly reviews and the bulk lock.
pub struct ReviewGate {
    identities: IdentityDirectory,
    assignments: Arc<dyn AssignmentStore>,
    reviews: Arc<dyn ReviewStore>,
    entries: Arc<dyn LogbookStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
}

impl ReviewGate {
    pub fn new(
        identities: IdentityDirectory,
        assignments: Arc<dyn AssignmentStore>,
        reviews: Arc<dyn ReviewStore>,
        entries: Arc<dyn LogbookStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        config: TrackerConfig,
    ) -> Self {
        Self { identities, assignments, reviews, entries, audit, clock, config }
    }

    /// Submit the weekly review for (student, week) and lock that week.
    ///
    /// # Pipeline
    ///
    /// 1. `Validation` for a zero week number or empty comment.
    /// 2. The acting industry supervisor must exist and be verified.
    /// 3. `WrongDay` unless today is the configured review day — audited.
    /// 4. `NotAssigned` without an active supervisor-to-student assignment
    ///    — audited as unauthorized access.
    /// 5. `AlreadyReviewed` if the week was reviewed before — audited.
    /// 6. Commit the review and the bulk lock as one atomic store call;
    ///    a concurrent duplicate loses with `AlreadyReviewed`.
    pub fn submit_review(
        &self,
        actor: &ActorContext,
        student_id: StudentId,
        week_number: u32,
        comment: &str,
    ) -> TrackResult<WeeklyReview> {
        if week_number == 0 {
            return Err(TrackError::Validation {
                reason: "week number must be at least 1".to_string(),
            });
        }
        if comment.trim().is_empty() {
            return Err(TrackError::Validation {
                reason: "review comment required".to_string(),
            });
        }

        let supervisor_id = self.require_verified_supervisor(actor)?;

        let today = self.clock.today();
        if today.weekday() != self.config.review_day {
            self.audit.record(AuditEvent::attempt(
                actor,
                AuditAction::ReviewAttempt,
                "weekly_review",
                false,
                self.clock.now(),
            ));
            return Err(TrackError::WrongDay {
                expected: weekday_name(self.config.review_day).to_string(),
            });
        }

        if !self.assignments.is_assigned(&student_id, &supervisor_id)? {
            self.audit.record(AuditEvent::attempt(
                actor,
                AuditAction::UnauthorizedAccess,
                format!("student_{student_id}"),
                false,
                self.clock.now(),
            ));
            return Err(TrackError::NotAssigned {
                reason: "supervisor is not assigned to this student".to_string(),
            });
        }

        if self.reviews.find_review(&student_id, week_number)?.is_some() {
            return Err(self.reject_duplicate(actor));
        }

        let reviewed_at = self.clock.now();
        let review_hash = fingerprint(&ReviewPayload {
            student_id,
            week_number,
            supervisor_id,
            comment,
            timestamp: reviewed_at,
        })?;

        let review = WeeklyReview {
            id: ReviewId::new(),
            student_id,
            week_number,
            industry_supervisor_id: supervisor_id,
            comment: comment.to_string(),
            review_hash,
            reviewed_at,
        };

        // The store holds review insert and bulk lock together: both
        // happen or neither does. A concurrent duplicate surfaces here.
        let locked = match self.reviews.commit_review(review.clone()) {
            Ok(locked) => locked,
            Err(TrackError::AlreadyReviewed) => return Err(self.reject_duplicate(actor)),
            Err(e) => return Err(e),
        };

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::WeeklyReview,
            format!("week_{week_number}"),
            true,
            self.clock.now(),
        ));

        info!(
            student_id = %student_id,
            week = week_number,
            locked_entries = locked,
            "week reviewed and locked"
        );
        Ok(review)
    }

    /// A student's entries as seen by their assigned supervisor.
    ///
    /// An unassigned supervisor is rejected with `NotAssigned` and the
    /// access attempt is audited.
    pub fn student_entries(
        &self,
        actor: &ActorContext,
        student_id: StudentId,
    ) -> TrackResult<Vec<LogEntry>> {
        let supervisor_id = self.require_verified_supervisor(actor)?;

        if !self.assignments.is_assigned(&student_id, &supervisor_id)? {
            self.audit.record(AuditEvent::attempt(
                actor,
                AuditAction::UnauthorizedAccess,
                format!("student_{student_id}"),
                false,
                self.clock.now(),
            ));
            return Err(TrackError::NotAssigned {
                reason: "supervisor is not assigned to this student".to_string(),
            });
        }

        self.entries.entries_for_student(&student_id)
    }

    /// Resolve the acting industry supervisor through the identity
    /// directory and enforce the verification flag.
    fn require_verified_supervisor(&self, actor: &ActorContext) -> TrackResult<SupervisorId> {
        let record = self
            .identities
            .find(Role::IndustrySupervisor, &actor.actor_id)?
            .ok_or_else(|| TrackError::NotFound {
                resource: "industry supervisor".to_string(),
            })?;
        if !record.verified {
            return Err(TrackError::SupervisorNotVerified);
        }
        Ok(actor.supervisor_id())
    }

    fn reject_duplicate(&self, actor: &ActorContext) -> TrackError {
        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::ReviewEditAttempt,
            "weekly_review",
            false,
            self.clock.now(),
        ));
        TrackError::AlreadyReviewed
    }
}

fn weekday_name(day: chrono::Weekday) -> &'static str {
    match day {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use siwes_audit::{BestEffortRecorder, InMemoryAuditStore};
    use siwes_contracts::{
        identity::{
            ActorContext, Student, Supervisor, SupervisorKind,
        },
        records::{Assignment, EntryId, EntryStatus},
    };
    use siwes_core::ManualClock;
    use siwes_store::MemoryStore;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct Fixture {
        gate: ReviewGate,
        store: MemoryStore,
        audit_store: Arc<InMemoryAuditStore>,
        recorder: Arc<BestEffortRecorder>,
        clock: Arc<ManualClock>,
        student_id: StudentId,
        supervisor_id: SupervisorId,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2024-01-19 was a Friday.
    const FRIDAY: (i32, u32, u32) = (2024, 1, 19);

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let audit_store = Arc::new(InMemoryAuditStore::new());
        let recorder = Arc::new(BestEffortRecorder::new(audit_store.clone()));
        let clock = Arc::new(ManualClock::on_date(date(FRIDAY.0, FRIDAY.1, FRIDAY.2)));

        let student_id = StudentId::new();
        store.put_student(Student {
            id: student_id,
            matric_number: "ENG/2020/031".to_string(),
            full_name: "Amina Bello".to_string(),
            location_id: None,
            siwes_start_date: Some(date(2024, 1, 1)),
            siwes_end_date: Some(date(2024, 6, 28)),
        });

        let supervisor_id = SupervisorId::new();
        store.put_supervisor(Supervisor {
            id: supervisor_id,
            full_name: "Mr. Okafor".to_string(),
            kind: SupervisorKind::Industry,
            verified: true,
        });
        store
            .insert_assignment(Assignment {
                student_id,
                industry_supervisor_id: supervisor_id,
                assigned_at: clock.now(),
            })
            .unwrap();

        let gate = ReviewGate::new(
            store.identity_directory(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            recorder.clone(),
            clock.clone(),
            TrackerConfig::default(),
        );

        Fixture { gate, store, audit_store, recorder, clock, student_id, supervisor_id }
    }

    fn supervisor_actor(fx: &Fixture) -> ActorContext {
        ActorContext::supervisor(fx.supervisor_id.into(), SupervisorKind::Industry, true)
    }

    fn seed_entry(fx: &Fixture, day: (i32, u32, u32), week: u32) {
        fx.store
            .insert_entry(LogEntry {
                id: EntryId::new(),
                student_id: fx.student_id,
                entry_date: date(day.0, day.1, day.2),
                week_number: week,
                activity_description: "panel wiring".to_string(),
                presence_log_id: None,
                content_hash: "0".repeat(64),
                status: EntryStatus::Open,
                created_at: fx.clock.now(),
            })
            .unwrap();
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    /// A Friday review locks every entry of the week atomically with the
    /// review insert.
    #[test]
    fn friday_review_locks_the_week() {
        let fx = fixture();
        seed_entry(&fx, (2024, 1, 15), 3);
        seed_entry(&fx, (2024, 1, 16), 3);
        seed_entry(&fx, (2024, 1, 8), 2);

        let review = fx
            .gate
            .submit_review(&supervisor_actor(&fx), fx.student_id, 3, "solid week")
            .unwrap();
        assert_eq!(review.week_number, 3);
        assert_eq!(review.review_hash.len(), 64);

        let entries = fx.store.entries_for_student(&fx.student_id).unwrap();
        for e in &entries {
            let expected = if e.week_number == 3 {
                EntryStatus::Locked
            } else {
                EntryStatus::Open
            };
            assert_eq!(e.status, expected);
        }

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::WeeklyReview);
        assert!(trail[0].success);
    }

    /// A non-Friday submission is rejected with WrongDay, creates no
    /// review, and records one failed audit event.
    #[test]
    fn non_friday_rejected_with_audit() {
        let fx = fixture();
        seed_entry(&fx, (2024, 1, 15), 3);
        fx.clock.set_date(date(2024, 1, 17)); // Wednesday

        let result =
            fx.gate
                .submit_review(&supervisor_actor(&fx), fx.student_id, 3, "too eager");
        match result {
            Err(TrackError::WrongDay { expected }) => assert_eq!(expected, "Friday"),
            other => panic!("expected WrongDay, got {other:?}"),
        }

        assert!(fx.store.find_review(&fx.student_id, 3).unwrap().is_none());

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::ReviewAttempt);
        assert!(!trail[0].success);

        // Entries stay open.
        let entries = fx.store.entries_for_student(&fx.student_id).unwrap();
        assert!(entries.iter().all(|e| e.status == EntryStatus::Open));
    }

    /// A second review of the same week fails with AlreadyReviewed and
    /// leaves entries in their prior state.
    #[test]
    fn second_review_rejected() {
        let fx = fixture();
        seed_entry(&fx, (2024, 1, 15), 3);
        let who = supervisor_actor(&fx);

        fx.gate.submit_review(&who, fx.student_id, 3, "first").unwrap();
        let second = fx.gate.submit_review(&who, fx.student_id, 3, "second");
        assert!(matches!(second, Err(TrackError::AlreadyReviewed)));

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail.last().unwrap().action, AuditAction::ReviewEditAttempt);
        assert!(!trail.last().unwrap().success);
    }

    /// An unassigned supervisor is rejected and the access is audited.
    #[test]
    fn unassigned_supervisor_rejected() {
        let fx = fixture();
        let stranger = SupervisorId::new();
        fx.store.put_supervisor(Supervisor {
            id: stranger,
            full_name: "Ms. Adeyemi".to_string(),
            kind: SupervisorKind::Industry,
            verified: true,
        });
        let who = ActorContext::supervisor(stranger.into(), SupervisorKind::Industry, true);

        let result = fx.gate.submit_review(&who, fx.student_id, 3, "drive-by");
        assert!(matches!(result, Err(TrackError::NotAssigned { .. })));

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail[0].action, AuditAction::UnauthorizedAccess);
    }

    /// An unverified supervisor cannot review even when assigned.
    #[test]
    fn unverified_supervisor_rejected() {
        let fx = fixture();
        let unverified = SupervisorId::new();
        fx.store.put_supervisor(Supervisor {
            id: unverified,
            full_name: "Mr. Garba".to_string(),
            kind: SupervisorKind::Industry,
            verified: false,
        });
        fx.store
            .insert_assignment(Assignment {
                student_id: fx.student_id,
                industry_supervisor_id: unverified,
                assigned_at: fx.clock.now(),
            })
            .unwrap();
        let who = ActorContext::supervisor(unverified.into(), SupervisorKind::Industry, false);

        let result = fx.gate.submit_review(&who, fx.student_id, 3, "not yet");
        assert!(matches!(result, Err(TrackError::SupervisorNotVerified)));
    }

    /// An institution supervisor's id does not resolve as an industry
    /// supervisor — the directory keeps role tables separate.
    #[test]
    fn wrong_role_does_not_resolve() {
        let fx = fixture();
        let inst = SupervisorId::new();
        fx.store.put_supervisor(Supervisor {
            id: inst,
            full_name: "Dr. Musa".to_string(),
            kind: SupervisorKind::Institution,
            verified: true,
        });
        let who = ActorContext::supervisor(inst.into(), SupervisorKind::Institution, true);

        let result = fx.gate.submit_review(&who, fx.student_id, 3, "wrong desk");
        assert!(matches!(result, Err(TrackError::NotFound { .. })));
    }

    /// Zero week number is a plain validation error, not audited.
    #[test]
    fn zero_week_rejected() {
        let fx = fixture();
        let result = fx.gate.submit_review(&supervisor_actor(&fx), fx.student_id, 0, "x");
        assert!(matches!(result, Err(TrackError::Validation { .. })));

        fx.recorder.flush();
        assert!(fx.audit_store.is_empty());
    }

    /// The assigned supervisor can list the student's entries; a stranger
    /// cannot.
    #[test]
    fn student_entries_respects_assignment() {
        let fx = fixture();
        seed_entry(&fx, (2024, 1, 15), 3);

        let entries = fx
            .gate
            .student_entries(&supervisor_actor(&fx), fx.student_id)
            .unwrap();
        assert_eq!(entries.len(), 1);

        let stranger = SupervisorId::new();
        fx.store.put_supervisor(Supervisor {
            id: stranger,
            full_name: "Ms. Adeyemi".to_string(),
            kind: SupervisorKind::Industry,
            verified: true,
        });
        let who = ActorContext::supervisor(stranger.into(), SupervisorKind::Industry, true);
        let result = fx.gate.student_entries(&who, fx.student_id);
        assert!(matches!(result, Err(TrackError::NotAssigned { .. })));
    }
}
