//! Authorization gate: role membership plus establishment scoping.
//!
//! A [`Principal`] is the resolved caller (identity + role grants). The gate
//! never looks at the primary role; it tests the grants directly.
//!
//! Policy:
//! - `SYSTEM_ADMIN` bypasses establishment scoping.
//! - Every other role only reaches its own establishment.
//!
//! Relationship checks (parent-of-student, teacher-of-class, ...) need the
//! database and live in the repository layer; this module covers the part
//! that can be decided from the grants alone.

use serde::Serialize;

use crate::error::CoreError;
use crate::roles::{primary_role, Role};
use crate::types::DbId;

/// One role assignment held by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleGrant {
    pub role: Role,
    /// `None` only for `SYSTEM_ADMIN`.
    pub etablissement_id: Option<DbId>,
}

impl RoleGrant {
    pub fn new(role: Role, etablissement_id: Option<DbId>) -> Self {
        Self {
            role,
            etablissement_id,
        }
    }

    /// Whether this grant reaches the given establishment.
    fn covers(&self, etablissement_id: DbId) -> bool {
        self.role == Role::SystemAdmin || self.etablissement_id == Some(etablissement_id)
    }
}

/// The authenticated caller with every role grant it holds.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: DbId,
    pub grants: Vec<RoleGrant>,
}

/// The establishment range a request is allowed to read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every establishment (system administrators only).
    Global,
    Establishment(DbId),
}

impl Scope {
    /// Establishment filter for scoped queries; `None` means unfiltered.
    pub fn etablissement_id(self) -> Option<DbId> {
        match self {
            Scope::Global => None,
            Scope::Establishment(id) => Some(id),
        }
    }
}

impl Principal {
    pub fn new(user_id: DbId, grants: Vec<RoleGrant>) -> Self {
        Self { user_id, grants }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.grants.iter().any(|g| g.role == role)
    }

    pub fn is_system_admin(&self) -> bool {
        self.has_role(Role::SystemAdmin)
    }

    /// Whether the caller holds `role` for `etablissement_id`.
    pub fn has_role_in(&self, role: Role, etablissement_id: DbId) -> bool {
        self.grants
            .iter()
            .any(|g| g.role == role && g.covers(etablissement_id))
    }

    /// Distinct roles held, highest priority first.
    pub fn roles(&self) -> Vec<Role> {
        Role::BY_PRIORITY
            .into_iter()
            .filter(|r| self.has_role(*r))
            .collect()
    }

    /// UI-only convenience; never used for access decisions.
    pub fn primary_role(&self) -> Option<Role> {
        primary_role(self.grants.iter().map(|g| g.role))
    }

    /// Distinct establishments in which the caller holds `role`.
    pub fn establishments_for(&self, role: Role) -> Vec<DbId> {
        let mut ids: Vec<DbId> = self
            .grants
            .iter()
            .filter(|g| g.role == role)
            .filter_map(|g| g.etablissement_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Check that the caller holds one of `required` roles, and, when a target
/// establishment is given, that the role reaches it.
pub fn authorize(
    principal: &Principal,
    required: &[Role],
    target: Option<DbId>,
) -> Result<(), CoreError> {
    let mut matching = principal
        .grants
        .iter()
        .filter(|g| required.contains(&g.role))
        .peekable();

    if matching.peek().is_none() {
        return Err(CoreError::Forbidden(format!(
            "Requires one of roles: {}",
            role_list(required)
        )));
    }

    match target {
        None => Ok(()),
        Some(etablissement_id) => {
            if matching.any(|g| g.covers(etablissement_id)) {
                Ok(())
            } else {
                Err(CoreError::Forbidden(format!(
                    "Access to establishment {etablissement_id} denied"
                )))
            }
        }
    }
}

/// Resolve the establishment scope of a request.
///
/// With an explicit `requested` establishment the gate is applied to it.
/// Without one, a system administrator gets [`Scope::Global`] and a scoped
/// role gets its only establishment; holding the role in several
/// establishments makes the parameter mandatory.
pub fn resolve_scope(
    principal: &Principal,
    required: &[Role],
    requested: Option<DbId>,
) -> Result<Scope, CoreError> {
    authorize(principal, required, requested)?;

    if let Some(etablissement_id) = requested {
        return Ok(Scope::Establishment(etablissement_id));
    }

    if required.contains(&Role::SystemAdmin) && principal.is_system_admin() {
        return Ok(Scope::Global);
    }

    let mut establishments: Vec<DbId> = principal
        .grants
        .iter()
        .filter(|g| required.contains(&g.role))
        .filter_map(|g| g.etablissement_id)
        .collect();
    establishments.sort_unstable();
    establishments.dedup();

    match establishments.as_slice() {
        [only] => Ok(Scope::Establishment(*only)),
        [] => Err(CoreError::Forbidden(format!(
            "Requires one of roles: {}",
            role_list(required)
        ))),
        _ => Err(CoreError::Validation(
            "etablissement_id is required when holding this role in several establishments"
                .into(),
        )),
    }
}

fn role_list(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
