//! Administrative operations: supervisor verification, supervisor and
//! location assignment, and the audit trail listing.
//!
//! These are the oversight levers around the student-facing gates. Each
//! mutation records a successful audit event; rejected calls fail before
//! any state changes and are not themselves auditable actions here.

use std::sync::Arc;

use tracing::info;

use siwes_contracts::{
    audit::{AuditAction, AuditEvent},
    error::{TrackError, TrackResult},
    identity::{ActorContext, Role, Student, StudentId, Supervisor, SupervisorId},
    records::{Assignment, LocationId},
};
use siwes_core::{
    directory::IdentityDirectory,
    traits::{
        AssignmentStore, AuditSink, AuditStore, Clock, LocationStore, StudentStore,
        SupervisorStore,
    },
};

/// Admin-facing operations over supervisors, assignments, and the trail.
pub struct AdminDesk {
    identities: IdentityDirectory,
    students: Arc<dyn StudentStore>,
    locations: Arc<dyn LocationStore>,
    supervisors: Arc<dyn SupervisorStore>,
    assignments: Arc<dyn AssignmentStore>,
    trail: Arc<dyn AuditStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AdminDesk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identities: IdentityDirectory,
        students: Arc<dyn StudentStore>,
        locations: Arc<dyn LocationStore>,
        supervisors: Arc<dyn SupervisorStore>,
        assignments: Arc<dyn AssignmentStore>,
        trail: Arc<dyn AuditStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            students,
            locations,
            supervisors,
            assignments,
            trail,
            audit,
            clock,
        }
    }

    /// Mark a supervisor as verified, enabling assignment and review
    /// rights. Idempotent.
    pub fn verify_supervisor(
        &self,
        actor: &ActorContext,
        supervisor_id: SupervisorId,
    ) -> TrackResult<Supervisor> {
        self.require_admin(actor)?;

        let supervisor = self.supervisors.mark_supervisor_verified(&supervisor_id)?;

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::VerifySupervisor,
            format!("supervisor_{supervisor_id}"),
            true,
            self.clock.now(),
        ));

        info!(supervisor_id = %supervisor_id, "supervisor verified");
        Ok(supervisor)
    }

    /// Assign a verified industry supervisor to a student.
    ///
    /// `NotFound` when either party is missing, `SupervisorNotVerified`
    /// before verification, `AssignmentExists` on a duplicate pair.
    pub fn assign_supervisor(
        &self,
        actor: &ActorContext,
        student_id: StudentId,
        supervisor_id: SupervisorId,
    ) -> TrackResult<Assignment> {
        self.require_admin(actor)?;

        let supervisor = self
            .supervisors
            .find_supervisor(&supervisor_id)?
            .ok_or_else(|| TrackError::NotFound {
                resource: "supervisor".to_string(),
            })?;
        if !supervisor.verified {
            return Err(TrackError::SupervisorNotVerified);
        }

        self.students
            .find_student(&student_id)?
            .ok_or_else(|| TrackError::NotFound {
                resource: "student".to_string(),
            })?;

        let assignment = self.assignments.insert_assignment(Assignment {
            student_id,
            industry_supervisor_id: supervisor_id,
            assigned_at: self.clock.now(),
        })?;

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::AssignSupervisor,
            format!("student_{student_id}"),
            true,
            self.clock.now(),
        ));

        info!(
            student_id = %student_id,
            supervisor_id = %supervisor_id,
            "supervisor assigned"
        );
        Ok(assignment)
    }

    /// Point a student at a work-site geofence.
    pub fn assign_location(
        &self,
        actor: &ActorContext,
        student_id: StudentId,
        location_id: LocationId,
    ) -> TrackResult<Student> {
        self.require_admin(actor)?;

        if self.locations.find_location(&location_id)?.is_none() {
            return Err(TrackError::LocationNotFound);
        }

        let student = self.students.set_student_location(&student_id, location_id)?;

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::AssignLocation,
            format!("student_{student_id}"),
            true,
            self.clock.now(),
        ));

        info!(student_id = %student_id, location_id = %location_id, "location assigned");
        Ok(student)
    }

    /// A newest-first page of the audit trail.
    pub fn audit_trail(
        &self,
        actor: &ActorContext,
        limit: usize,
        offset: usize,
    ) -> TrackResult<Vec<AuditEvent>> {
        self.require_admin(actor)?;
        self.trail.recent(limit, offset)
    }

    fn require_admin(&self, actor: &ActorContext) -> TrackResult<()> {
        if !self.identities.exists(Role::Admin, &actor.actor_id)? {
            return Err(TrackError::NotFound {
                resource: "administrator".to_string(),
            });
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use siwes_audit::{BestEffortRecorder, InMemoryAuditStore};
    use siwes_contracts::{
        identity::{ActorId, SupervisorKind},
        records::Location,
    };
    use siwes_core::SystemClock;
    use siwes_store::MemoryStore;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct Fixture {
        desk: AdminDesk,
        store: MemoryStore,
        audit_store: Arc<InMemoryAuditStore>,
        recorder: Arc<BestEffortRecorder>,
        admin_id: ActorId,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let audit_store = Arc::new(InMemoryAuditStore::new());
        let recorder = Arc::new(BestEffortRecorder::new(audit_store.clone()));

        let admin_id = ActorId(uuid::Uuid::new_v4());
        store.put_admin(admin_id);

        let desk = AdminDesk::new(
            store.identity_directory(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            audit_store.clone(),
            recorder.clone(),
            Arc::new(SystemClock),
        );

        Fixture { desk, store, audit_store, recorder, admin_id }
    }

    fn admin(fx: &Fixture) -> ActorContext {
        ActorContext::new(fx.admin_id, Role::Admin)
    }

    fn seed_supervisor(fx: &Fixture, verified: bool) -> SupervisorId {
        let id = SupervisorId::new();
        fx.store.put_supervisor(Supervisor {
            id,
            full_name: "Mr. Okafor".to_string(),
            kind: SupervisorKind::Industry,
            verified,
        });
        id
    }

    fn seed_student(fx: &Fixture) -> StudentId {
        let id = StudentId::new();
        fx.store.put_student(Student {
            id,
            matric_number: "ENG/2020/031".to_string(),
            full_name: "Amina Bello".to_string(),
            location_id: None,
            siwes_start_date: None,
            siwes_end_date: None,
        });
        id
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    /// Verification flips the flag and records one audit event.
    #[test]
    fn verify_supervisor_flips_flag() {
        let fx = fixture();
        let sup = seed_supervisor(&fx, false);

        let updated = fx.desk.verify_supervisor(&admin(&fx), sup).unwrap();
        assert!(updated.verified);

        fx.recorder.flush();
        let trail = fx.audit_store.all();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::VerifySupervisor);
        assert!(trail[0].success);
    }

    /// An unverified supervisor cannot be assigned.
    #[test]
    fn unverified_supervisor_cannot_be_assigned() {
        let fx = fixture();
        let sup = seed_supervisor(&fx, false);
        let student = seed_student(&fx);

        let result = fx.desk.assign_supervisor(&admin(&fx), student, sup);
        assert!(matches!(result, Err(TrackError::SupervisorNotVerified)));
    }

    /// Assigning twice fails with AssignmentExists; the first assignment
    /// stands.
    #[test]
    fn duplicate_assignment_rejected() {
        let fx = fixture();
        let sup = seed_supervisor(&fx, true);
        let student = seed_student(&fx);
        let who = admin(&fx);

        fx.desk.assign_supervisor(&who, student, sup).unwrap();
        let second = fx.desk.assign_supervisor(&who, student, sup);
        assert!(matches!(second, Err(TrackError::AssignmentExists)));

        assert!(fx.store.is_assigned(&student, &sup).unwrap());
    }

    /// Location assignment validates the location row first.
    #[test]
    fn assign_location_requires_existing_location() {
        let fx = fixture();
        let student = seed_student(&fx);

        let missing = fx.desk.assign_location(&admin(&fx), student, LocationId::new());
        assert!(matches!(missing, Err(TrackError::LocationNotFound)));

        let location_id = LocationId::new();
        fx.store.put_location(Location {
            id: location_id,
            company_name: "Delta Fabrication Ltd".to_string(),
            latitude: 6.5244,
            longitude: 3.3792,
            allowed_radius_meters: 100.0,
        });

        let updated = fx.desk.assign_location(&admin(&fx), student, location_id).unwrap();
        assert_eq!(updated.location_id, Some(location_id));
    }

    /// Non-admin actors are rejected from every desk operation.
    #[test]
    fn non_admin_rejected() {
        let fx = fixture();
        let sup = seed_supervisor(&fx, false);
        let outsider = ActorContext::new(ActorId(uuid::Uuid::new_v4()), Role::Admin);

        let result = fx.desk.verify_supervisor(&outsider, sup);
        assert!(matches!(result, Err(TrackError::NotFound { .. })));

        let trail = fx.desk.audit_trail(&outsider, 10, 0);
        assert!(matches!(trail, Err(TrackError::NotFound { .. })));
    }

    /// The trail listing pages newest first.
    #[test]
    fn audit_trail_pages_newest_first() {
        let fx = fixture();
        let who = admin(&fx);
        let s1 = seed_supervisor(&fx, false);
        let s2 = seed_supervisor(&fx, false);
        fx.desk.verify_supervisor(&who, s1).unwrap();
        fx.desk.verify_supervisor(&who, s2).unwrap();

        fx.recorder.flush();
        let page = fx.desk.audit_trail(&who, 1, 0).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].resource, format!("supervisor_{s2}"));

        let next = fx.desk.audit_trail(&who, 1, 1).unwrap();
        assert_eq!(next[0].resource, format!("supervisor_{s1}"));
    }
}
