//! The final inspection gate.
//!
//! An institution supervisor certifies a student's placement exactly once,
//! and only after the program end date has passed. The record is terminal:
//! there is no update path and no second inspection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use siwes_contracts::{
    audit::{AuditAction, AuditEvent},
    error::{TrackError, TrackResult},
    identity::{ActorContext, Role, StudentId, SupervisorId},
    records::{ComplianceStatus, FinalInspection, InspectionId},
};
use siwes_core::{
    directory::IdentityDirectory,
    fingerprint::fingerprint,
    traits::{AuditSink, Clock, InspectionStore, StudentStore},
};

/// Hashed payload for a final inspection.
#[derive(Serialize)]
struct InspectionPayload<'a> {
    student_id: StudentId,
    supervisor_id: SupervisorId,
    inspection_notes: &'a str,
    compliance_status: ComplianceStatus,
    timestamp: DateTime<Utc>,
}

/// Institution-supervisor-facing gate over the terminal inspection.
pub struct InspectionGate {
    identities: IdentityDirectory,
    students: Arc<dyn StudentStore>,
    inspections: Arc<dyn InspectionStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl InspectionGate {
    pub fn new(
        identities: IdentityDirectory,
        students: Arc<dyn StudentStore>,
        inspections: Arc<dyn InspectionStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { identities, students, inspections, audit, clock }
    }

    /// Record the one-time terminal inspection for `student_id`.
    ///
    /// # Pipeline
    ///
    /// 1. `Validation` for empty notes.
    /// 2. The acting institution supervisor must exist and be verified.
    /// 3. The student must exist; `PeriodNotEnded` unless their end date is
    ///    set and has passed — audited.
    /// 4. `AlreadyInspected` if an inspection exists — audited; the write
    ///    path enforces the same uniqueness for concurrent callers.
    pub fn submit_inspection(
        &self,
        actor: &ActorContext,
        student_id: StudentId,
        inspection_notes: &str,
        compliance_status: ComplianceStatus,
    ) -> TrackResult<FinalInspection> {
        if inspection_notes.trim().is_empty() {
            return Err(TrackError::Validation {
                reason: "inspection notes required".to_string(),
            });
        }

        let record = self
            .identities
            .find(Role::InstitutionSupervisor, &actor.actor_id)?
            .ok_or_else(|| TrackError::NotFound {
                resource: "institution supervisor".to_string(),
            })?;
        if !record.verified {
            return Err(TrackError::SupervisorNotVerified);
        }
        let supervisor_id = actor.supervisor_id();

        let student = self
            .students
            .find_student(&student_id)?
            .ok_or_else(|| TrackError::NotFound {
                resource: "student".to_string(),
            })?;

        // Inspection opens the day the placement ends, not the day after.
        let ended = student
            .siwes_end_date
            .is_some_and(|end| self.clock.today() >= end);
        if !ended {
            self.audit.record(AuditEvent::attempt(
                actor,
                AuditAction::InspectionAttempt,
                format!("student_{student_id}"),
                false,
                self.clock.now(),
            ));
            return Err(TrackError::PeriodNotEnded);
        }

        if self.inspections.find_inspection(&student_id)?.is_some() {
            return Err(self.reject_duplicate(actor, student_id));
        }

        let inspected_at = self.clock.now();
        let inspection_hash = fingerprint(&InspectionPayload {
            student_id,
            supervisor_id,
            inspection_notes,
            compliance_status,
            timestamp: inspected_at,
        })?;

        let inspection = match self.inspections.insert_inspection(FinalInspection {
            id: InspectionId::new(),
            student_id,
            institution_supervisor_id: supervisor_id,
            inspection_notes: inspection_notes.to_string(),
            compliance_status,
            inspection_hash,
            inspected_at,
        }) {
            Ok(inspection) => inspection,
            Err(TrackError::AlreadyInspected) => {
                return Err(self.reject_duplicate(actor, student_id))
            }
            Err(e) => return Err(e),
        };

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::FinalInspection,
            format!("student_{student_id}"),
            true,
            self.clock.now(),
        ));

        info!(
            student_id = %student_id,
            inspection_id = %inspection.id,
            status = ?compliance_status,
            "final inspection recorded"
        );
        Ok(inspection)
    }

    fn reject_duplicate(&self, actor: &ActorContext, student_id: StudentId) -> TrackError {
        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::InspectionEditAttempt,
            format!("student_{student_id}"),
            false,
            self.clock.now(),
        ));
        TrackError::AlreadyInspected
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
