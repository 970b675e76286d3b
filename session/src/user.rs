//! Principal and `SessionUser` records.
//!
//! DESIGN
//! ======
//! [`Principal`] is the remote authority's record; [`SessionUser`] is the
//! UI projection, built from a principal plus an optional [`RoleLookup`].
//! The projection never outlives the principal: the store drops it whenever
//! the remote source reports no principal.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Metadata embedded in the principal by the remote authority.
///
/// Every field is optional and may be stale; the role resolver wins when it
/// answers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalMetadata {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
}

/// An authenticated identity as reported by the remote session source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque identifier (numeric ids are carried as strings).
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub metadata: PrincipalMetadata,
}

impl Principal {
    /// Role carried in metadata, normalized.
    #[must_use]
    pub fn metadata_role(&self) -> Role {
        Role::normalize(self.metadata.role.as_deref())
    }
}

/// Answer from the role resolver for one principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLookup {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// UI-facing user record published by the store and written to the cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub name: String,
}

impl SessionUser {
    /// Merge a principal with an optional role lookup.
    ///
    /// Role precedence: lookup, then metadata, then [`Role::User`]. The display
    /// name prefers the lookup's full name, then metadata, then the username.
    #[must_use]
    pub fn from_principal(principal: &Principal, lookup: Option<&RoleLookup>) -> Self {
        let username = non_blank(principal.metadata.username.as_deref())
            .unwrap_or_else(|| email_local_part(&principal.email).to_owned());
        let role = lookup.map_or_else(|| principal.metadata_role(), |found| found.role);
        let name = lookup
            .and_then(|found| non_blank(found.full_name.as_deref()))
            .or_else(|| non_blank(principal.metadata.full_name.as_deref()))
            .unwrap_or_else(|| username.clone());

        Self { id: principal.id.clone(), username, email: principal.email.clone(), role, name }
    }

    /// Whether the user's role is in `allowed`.
    #[must_use]
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }

    /// Overwrite the fields present in `patch`.
    pub fn apply(&mut self, patch: SessionUserPatch) {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

/// Partial local edit of the published user (after a profile save).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionUserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
}

impl SessionUserPatch {
    /// True when the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.name.is_none() && self.role.is_none()
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

fn email_local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}
