//! The presence validator.
//!
//! One submission moves through a single terminal transition:
//! SUBMITTED → VALID | INVALID. Every submission — valid or not — produces
//! exactly one new `PresenceRecord` and exactly one audit event, and the
//! record is never mutated afterward.

use std::sync::Arc;

use tracing::{debug, info};

use siwes_contracts::{
    audit::{AuditAction, AuditEvent},
    error::{TrackError, TrackResult},
    identity::ActorContext,
    records::{PresenceId, PresenceRecord, PresenceStatus},
};
use siwes_core::{
    geofence,
    traits::{AuditSink, Clock, LocationStore, PresenceStore, StudentStore},
};

use crate::config::TrackerConfig;

/// Validates GPS presence submissions against the student's assigned
/// geofence and appends to their presence history.
pub struct PresenceValidator {
    students: Arc<dyn StudentStore>,
    locations: Arc<dyn LocationStore>,
    presence: Arc<dyn PresenceStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
}

impl PresenceValidator {
    pub fn new(
        students: Arc<dyn StudentStore>,
        locations: Arc<dyn LocationStore>,
        presence: Arc<dyn PresenceStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        config: TrackerConfig,
    ) -> Self {
        Self { students, locations, presence, audit, clock, config }
    }

    /// Submit a GPS coordinate for validation.
    ///
    /// # Pipeline
    ///
    /// 1. Reject non-finite or out-of-range coordinates (`Validation`,
    ///    not audited — nothing was attempted against a resource yet).
    /// 2. Resolve the student's assigned location — `NotAssigned` when none
    ///    is set, `LocationNotFound` when the row is missing; both are
    ///    audited failures.
    /// 3. Evaluate the geofence (boundary inclusive).
    /// 4. Persist a new record with the rounded distance and derived
    ///    status.
    /// 5. Audit the outcome with `success = (status == Valid)`.
    pub fn submit_presence(
        &self,
        actor: &ActorContext,
        latitude: f64,
        longitude: f64,
    ) -> TrackResult<PresenceRecord> {
        geofence::validate_point(latitude, longitude)?;

        let student_id = actor.student_id();

        let student = self
            .students
            .find_student(&student_id)?
            .ok_or_else(|| TrackError::NotFound {
                resource: "student".to_string(),
            })?;
        let Some(location_id) = student.location_id else {
            self.audit.record(AuditEvent::attempt(
                actor,
                AuditAction::PresenceAttempt,
                "presence_log",
                false,
                self.clock.now(),
            ));
            return Err(TrackError::NotAssigned {
                reason: "student not assigned to a location".to_string(),
            });
        };

        let Some(location) = self.locations.find_location(&location_id)? else {
            self.audit.record(AuditEvent::attempt(
                actor,
                AuditAction::PresenceAttempt,
                "presence_log",
                false,
                self.clock.now(),
            ));
            return Err(TrackError::LocationNotFound);
        };

        let check = geofence::evaluate(
            latitude,
            longitude,
            location.latitude,
            location.longitude,
            location.allowed_radius_meters,
        )?;

        let status = if check.within {
            PresenceStatus::Valid
        } else {
            PresenceStatus::Invalid
        };

        debug!(
            student_id = %student_id,
            distance_m = check.rounded_distance(),
            radius_m = location.allowed_radius_meters,
            ?status,
            "geofence evaluated"
        );

        let record = self.presence.insert_presence(PresenceRecord {
            id: PresenceId::new(),
            student_id,
            latitude,
            longitude,
            distance_meters: check.rounded_distance(),
            status,
            recorded_at: self.clock.now(),
        })?;

        self.audit.record(AuditEvent::attempt(
            actor,
            AuditAction::PresenceSubmission,
            format!("presence_log_{}", record.id),
            check.within,
            self.clock.now(),
        ));

        info!(
            student_id = %student_id,
            presence_id = %record.id,
            distance_m = record.distance_meters,
            ?status,
            "presence recorded"
        );

        Ok(record)
    }

    /// The student's most recent presence records, newest first, capped at
    /// the configured history limit.
    pub fn presence_history(&self, actor: &ActorContext) -> TrackResult<Vec<PresenceRecord>> {
        self.presence
            .recent_presence(&actor.student_id(), self.config.presence_history_limit)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
