//! Role-keyed identity resolution.
//!
//! The surrounding system historically switched on the actor's role to pick
//! an identity table. Here that becomes one `IdentityRepository` per role
//! registered in an `IdentityDirectory`; every repository exposes the same
//! `find`/`exists` contract and call sites stay branch-free.

use std::collections::HashMap;
use std::sync::Arc;

use siwes_contracts::{
    error::{TrackError, TrackResult},
    identity::{ActorId, IdentityRecord, Role},
};

use crate::traits::IdentityRepository;

/// Maps each role to the repository that resolves its identities.
#[derive(Default, Clone)]
pub struct IdentityDirectory {
    repos: HashMap<Role, Arc<dyn IdentityRepository>>,
}

impl IdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the repository for `role`, replacing any previous one.
    pub fn register(mut self, role: Role, repo: Arc<dyn IdentityRepository>) -> Self {
        self.repos.insert(role, repo);
        self
    }

    /// The repository for `role`, or `NotFound` when the role was never
    /// registered.
    pub fn repo_for(&self, role: Role) -> TrackResult<&dyn IdentityRepository> {
        self.repos
            .get(&role)
            .map(|r| r.as_ref())
            .ok_or_else(|| TrackError::NotFound {
                resource: format!("identity repository for role {role}"),
            })
    }

    /// Resolve an actor through its role's repository.
    pub fn find(&self, role: Role, id: &ActorId) -> TrackResult<Option<IdentityRecord>> {
        self.repo_for(role)?.find(id)
    }

    /// Whether `id` exists under `role`.
    pub fn exists(&self, role: Role, id: &ActorId) -> TrackResult<bool> {
        self.repo_for(role)?.exists(id)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A repository over a fixed list of identities.
    struct FixedRepo {
        records: Vec<IdentityRecord>,
    }

    impl IdentityRepository for FixedRepo {
        fn find(&self, id: &ActorId) -> TrackResult<Option<IdentityRecord>> {
            Ok(self.records.iter().find(|r| &r.id == id).cloned())
        }
    }

    fn record(role: Role) -> IdentityRecord {
        IdentityRecord {
            id: ActorId(uuid::Uuid::new_v4()),
            role,
            display_name: "someone".to_string(),
            verified: true,
        }
    }

    #[test]
    fn each_role_resolves_through_its_own_repo() {
        let student = record(Role::Student);
        let supervisor = record(Role::IndustrySupervisor);

        let dir = IdentityDirectory::new()
            .register(
                Role::Student,
                Arc::new(FixedRepo { records: vec![student.clone()] }),
            )
            .register(
                Role::IndustrySupervisor,
                Arc::new(FixedRepo { records: vec![supervisor.clone()] }),
            );

        assert!(dir.exists(Role::Student, &student.id).unwrap());
        assert!(dir.exists(Role::IndustrySupervisor, &supervisor.id).unwrap());

        // Ids do not bleed across role tables.
        assert!(!dir.exists(Role::Student, &supervisor.id).unwrap());
        assert!(!dir.exists(Role::IndustrySupervisor, &student.id).unwrap());
    }

    #[test]
    fn unregistered_role_is_not_found() {
        let dir = IdentityDirectory::new();
        let result = dir.exists(Role::Admin, &ActorId(uuid::Uuid::new_v4()));
        assert!(matches!(result, Err(TrackError::NotFound { .. })));
    }
}
