//! Actor identity types.
//!
//! The tracker never issues credentials — an authenticated `ActorContext`
//! arrives from an external collaborator with every call. These types give
//! that context a stable shape and typed identifiers for the entities it
//! can refer to.

use std::fmt;
use std::net::IpAddr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of any authenticated actor, regardless of role.
///
/// For a student actor this is the same UUID as the student row; likewise
/// for supervisors and admins. Typed entity ids convert into it losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub uuid::Uuid);

/// Identifier of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(pub uuid::Uuid);

/// Identifier of a supervisor record (industry or institution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupervisorId(pub uuid::Uuid);

impl StudentId {
    /// Create a new, unique student id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisorId {
    /// Create a new, unique supervisor id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SupervisorId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<StudentId> for ActorId {
    fn from(id: StudentId) -> Self {
        ActorId(id.0)
    }
}

impl From<SupervisorId> for ActorId {
    fn from(id: SupervisorId) -> Self {
        ActorId(id.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for SupervisorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The role an authenticated actor holds.
///
/// Serialized in SCREAMING_SNAKE_CASE so audit records match the wire
/// vocabulary of the surrounding system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    IndustrySupervisor,
    InstitutionSupervisor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Student => "STUDENT",
            Role::IndustrySupervisor => "INDUSTRY_SUPERVISOR",
            Role::InstitutionSupervisor => "INSTITUTION_SUPERVISOR",
            Role::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

/// Which kind of supervisor a `Supervisor` record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupervisorKind {
    Industry,
    Institution,
}

impl SupervisorKind {
    /// The actor role a supervisor of this kind authenticates as.
    pub fn role(&self) -> Role {
        match self {
            SupervisorKind::Industry => Role::IndustrySupervisor,
            SupervisorKind::Institution => Role::InstitutionSupervisor,
        }
    }
}

/// The authenticated identity attached to every operation.
///
/// Produced externally by credential verification; the tracker reads it for
/// audit attribution and for the supervisor `verified` gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    pub actor_id: ActorId,
    pub role: Role,
    /// Supervisor verification status. Non-supervisor roles default to
    /// `true` — a fallback inherited from the original identity middleware,
    /// not a hardened decision.
    pub verified: bool,
    /// Source address, recorded into audit events when known.
    pub ip_address: Option<IpAddr>,
}

impl ActorContext {
    /// Build a context for a non-supervisor actor (`verified` = true).
    pub fn new(actor_id: ActorId, role: Role) -> Self {
        Self {
            actor_id,
            role,
            verified: true,
            ip_address: None,
        }
    }

    /// Build a supervisor context carrying the stored verification flag.
    pub fn supervisor(actor_id: ActorId, kind: SupervisorKind, verified: bool) -> Self {
        Self {
            actor_id,
            role: kind.role(),
            verified,
            ip_address: None,
        }
    }

    /// Attach the caller's source address.
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip_address = Some(ip);
        self
    }

    /// This actor's id viewed as a student id.
    pub fn student_id(&self) -> StudentId {
        StudentId(self.actor_id.0)
    }

    /// This actor's id viewed as a supervisor id.
    pub fn supervisor_id(&self) -> SupervisorId {
        SupervisorId(self.actor_id.0)
    }
}

/// A student enrolled in the placement program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub matric_number: String,
    pub full_name: String,
    /// The work-site geofence the student reports presence against.
    /// `None` until an administrator assigns one.
    pub location_id: Option<crate::records::LocationId>,
    pub siwes_start_date: Option<NaiveDate>,
    pub siwes_end_date: Option<NaiveDate>,
}

/// An industry or institution supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supervisor {
    pub id: SupervisorId,
    pub full_name: String,
    pub kind: SupervisorKind,
    /// Set by an administrator; unverified supervisors cannot be assigned
    /// to students or submit reviews.
    pub verified: bool,
}

/// The uniform record every role-specific identity repository returns.
///
/// One repository per role exposes the same `find`/`exists` contract, so
/// call sites never branch on role to pick a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: ActorId,
    pub role: Role,
    pub display_name: String,
    pub verified: bool,
}
