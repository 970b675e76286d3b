//! Authorization roles.
//!
//! Role strings arrive from principal metadata, the role resolver and the
//! durable cache with inconsistent case and padding (`"Admin"`, `" admin "`,
//! `"ADMIN"`). They are normalized here, once, so every later check is an
//! exact match over [`Role`].

#[cfg(test)]
#[path = "role_test.rs"]
mod role_test;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of roles the website distinguishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member; also the fallback for unknown or missing roles.
    #[default]
    User,
    /// May moderate articles.
    Officer,
    /// May moderate articles, manage roles and invite users.
    Admin,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const ALL: [Role; 3] = [Role::User, Role::Officer, Role::Admin];

    /// Parse a raw role string, ignoring ASCII case and surrounding whitespace.
    ///
    /// Returns `None` for empty or unrecognized values.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|role| trimmed.eq_ignore_ascii_case(role.as_str()))
    }

    /// Normalize an optional raw role, falling back to [`Role::User`].
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }

    /// Lowercase wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Officer => "officer",
            Self::Admin => "admin",
        }
    }

    /// Capitalized label for menus and badges.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Officer => "Officer",
            Self::Admin => "Admin",
        }
    }

    /// Whether this role may moderate article status.
    #[must_use]
    pub fn can_moderate(self) -> bool {
        matches!(self, Self::Officer | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::normalize(raw.as_deref()))
    }
}
