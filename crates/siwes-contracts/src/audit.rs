//! Audit event types.
//!
//! One `AuditEvent` is recorded per security-relevant attempt — completed
//! or rejected. The trail is append-only and is never read back by the
//! operation gates themselves; only the admin listing pages through it.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{ActorContext, ActorId, Role};

/// The closed vocabulary of auditable actions.
///
/// Serialized in SCREAMING_SNAKE_CASE to match the action strings of the
/// surrounding system's audit tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A presence submission rejected before a record could be created.
    PresenceAttempt,
    /// A presence submission that produced a record (success mirrors the
    /// VALID/INVALID outcome).
    PresenceSubmission,
    /// A logbook submission rejected before any entry was touched.
    LogbookAttempt,
    LogbookCreate,
    LogbookUpdate,
    /// An attempt to modify a locked entry.
    LogbookEditAttempt,
    /// A review submission rejected by the day-of-week gate.
    ReviewAttempt,
    /// An attempt to re-review an already reviewed week.
    ReviewEditAttempt,
    WeeklyReview,
    /// A supervisor acted on a student they are not assigned to.
    UnauthorizedAccess,
    /// An inspection rejected because the period has not ended.
    InspectionAttempt,
    /// An attempt to re-file a completed inspection.
    InspectionEditAttempt,
    FinalInspection,
    VerifySupervisor,
    AssignSupervisor,
    AssignLocation,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the serde rename so logs and stored rows agree.
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(s.trim_matches('"'))
    }
}

/// One append-only entry in the forensic trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor_id: ActorId,
    pub actor_role: Role,
    pub action: AuditAction,
    /// The affected resource, e.g. `"presence_log_<id>"` or `"week_3"`.
    pub resource: String,
    /// `true` for completions, `false` for rejections. Both are recorded,
    /// so the trail covers denied actions as well as authorized ones.
    pub success: bool,
    pub ip_address: Option<IpAddr>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Build an event attributed to `actor`, stamped with the given time.
    ///
    /// Callers pass the clock's current time so event timestamps stay
    /// consistent with the rest of the operation.
    pub fn attempt(
        actor: &ActorContext,
        action: AuditAction,
        resource: impl Into<String>,
        success: bool,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor_id: actor.actor_id,
            actor_role: actor.role,
            action,
            resource: resource.into(),
            success,
            ip_address: actor.ip_address,
            created_at: at,
        }
    }
}
