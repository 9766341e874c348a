//! Role vocabulary and the claims-to-capability mapping
//!
//! A principal carries exactly one role at issuance time, but tokens from
//! older deployments encode the `roles` claim as either a bare string or an
//! array. `RoleClaim` absorbs both shapes; new tokens are always issued with
//! the array shape.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Application roles. `InternalService` is never stored on a user record;
/// it only appears in service-to-service tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
    Pending,
    InternalService,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Pending => "PENDING",
            Role::InternalService => "INTERNAL_SERVICE",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            "PENDING" => Some(Role::Pending),
            "INTERNAL_SERVICE" => Some(Role::InternalService),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of the `roles` claim. Legacy tokens carry a single string,
/// current tokens carry an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

impl RoleClaim {
    fn values(&self) -> impl Iterator<Item = &str> {
        match self {
            RoleClaim::One(role) => std::slice::from_ref(role),
            RoleClaim::Many(roles) => roles.as_slice(),
        }
        .iter()
        .map(String::as_str)
    }
}

/// A role-derived authority, e.g. `ROLE_ADMIN`. Endpoints declare the
/// capability they require and check it against the request's context.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capability(String);

impl Capability {
    pub fn from_role(role: &str) -> Self {
        Capability(format!("ROLE_{role}"))
    }

    pub fn admin() -> Self {
        Capability::from_role(Role::Admin.as_str())
    }

    pub fn internal_service() -> Self {
        Capability::from_role(Role::InternalService.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare role name, without the `ROLE_` prefix.
    pub fn role_name(&self) -> &str {
        self.0.strip_prefix("ROLE_").unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pure mapping from a raw role claim to the capability set.
///
/// A missing or blank claim maps to the empty set, never an error; callers
/// decide whether an empty set is sufficient for the requested operation.
pub fn map_role_claims(claim: Option<&RoleClaim>) -> BTreeSet<Capability> {
    let Some(claim) = claim else {
        return BTreeSet::new();
    };

    claim
        .values()
        .filter(|role| !role.trim().is_empty())
        .map(Capability::from_role)
        .collect()
}

/// Per-request authenticated identity, derived from a verified token and
/// discarded when the request ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub subject: String,
    pub capabilities: BTreeSet<Capability>,
}

impl AuthContext {
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// The single role string propagated downstream in `X-auth-role`.
    /// Tokens carry exactly one role, so the first capability is the role.
    pub fn primary_role(&self) -> Option<&str> {
        self.capabilities.iter().next().map(Capability::role_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_single_string_claim() {
        let claim = RoleClaim::One("ADMIN".to_string());
        let caps = map_role_claims(Some(&claim));
        assert_eq!(caps.len(), 1);
        assert!(caps.contains(&Capability::from_role("ADMIN")));
    }

    #[test]
    fn maps_array_claim() {
        let claim = RoleClaim::Many(vec!["INTERNAL_SERVICE".to_string()]);
        let caps = map_role_claims(Some(&claim));
        assert!(caps.contains(&Capability::internal_service()));
    }

    #[test]
    fn missing_claim_maps_to_empty_set() {
        assert!(map_role_claims(None).is_empty());
    }

    #[test]
    fn blank_entries_are_skipped_not_errors() {
        let claim = RoleClaim::Many(vec!["".to_string(), "  ".to_string()]);
        assert!(map_role_claims(Some(&claim)).is_empty());

        let claim = RoleClaim::One("   ".to_string());
        assert!(map_role_claims(Some(&claim)).is_empty());
    }

    #[test]
    fn mapping_is_idempotent() {
        let claim = RoleClaim::Many(vec!["USER".to_string(), "USER".to_string()]);
        let first = map_role_claims(Some(&claim));
        let second = map_role_claims(Some(&claim));
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn capability_exposes_bare_role_name() {
        assert_eq!(Capability::from_role("ADMIN").as_str(), "ROLE_ADMIN");
        assert_eq!(Capability::from_role("ADMIN").role_name(), "ADMIN");
    }

    #[test]
    fn role_claim_accepts_both_wire_shapes() {
        let single: RoleClaim = serde_json::from_str(r#""ADMIN""#).unwrap();
        assert_eq!(single, RoleClaim::One("ADMIN".to_string()));

        let array: RoleClaim = serde_json::from_str(r#"["ADMIN"]"#).unwrap();
        assert_eq!(array, RoleClaim::Many(vec!["ADMIN".to_string()]));
    }
}
