//! User-management state: the profile table and the role change awaiting
//! confirmation.

#[cfg(test)]
#[path = "users_test.rs"]
mod users_test;

use session::Role;

use crate::net::types::Profile;

#[derive(Clone, Debug, Default)]
pub struct ProfilesState {
    pub items: Vec<Profile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProfilesState {
    pub fn loading() -> Self {
        Self { loading: true, ..Self::default() }
    }

    pub fn finish(&mut self, result: Result<Vec<Profile>, String>) {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
    }

    /// Set the role of profile `id`; returns the previous role if found.
    pub fn set_role(&mut self, id: &str, role: Role) -> Option<Role> {
        let profile = self.items.iter_mut().find(|p| p.id == id)?;
        Some(std::mem::replace(&mut profile.role, role))
    }
}

/// A role change the admin picked but has not confirmed yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRoleChange {
    pub profile_id: String,
    pub display_name: String,
    pub from: Role,
    pub to: Role,
}

impl PendingRoleChange {
    /// `None` when the selection equals the current role.
    pub fn new(profile: &Profile, to: Role) -> Option<Self> {
        (profile.role != to).then(|| Self {
            profile_id: profile.id.clone(),
            display_name: profile.display_name().to_owned(),
            from: profile.role,
            to,
        })
    }

    pub fn prompt(&self) -> String {
        format!("Change {} from {} to {}?", self.display_name, self.from.label(), self.to.label())
    }
}
