//! Wire DTOs for the content API and both auth backends.
//!
//! DESIGN
//! ======
//! Backend payloads are loose: ids arrive as numbers or strings, statuses and
//! roles in any case. Everything is normalized while deserializing so pages
//! only ever see closed enums.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use session::{Principal, PrincipalMetadata, Role, RoleLookup};

// =============================================================
// Articles
// =============================================================

/// Moderation status of an article.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    /// Submitted, not yet looked at. Also the fallback for unknown values.
    #[default]
    Pending,
    InReview,
    Approved,
    Published,
    Rejected,
}

impl ArticleStatus {
    /// Statuses a moderator can pick from.
    pub const MODERATION_CHOICES: [ArticleStatus; 4] =
        [ArticleStatus::Draft, ArticleStatus::InReview, ArticleStatus::Published, ArticleStatus::Rejected];

    /// Parse a raw status; `-`, `_` and spaces are interchangeable and case
    /// is ignored. Unknown or empty values become [`ArticleStatus::Pending`].
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        match normalized.as_str() {
            "draft" => Self::Draft,
            "in_review" => Self::InReview,
            "approved" => Self::Approved,
            "published" => Self::Published,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::InReview => "In Review",
            Self::Approved => "Approved",
            Self::Published => "Published",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether anonymous visitors may read the article.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Published | Self::Approved)
    }

    /// CSS modifier for the status badge.
    pub fn badge_class(self) -> &'static str {
        match self {
            Self::Published | Self::Approved => "status-badge status-badge--public",
            Self::Rejected => "status-badge status-badge--rejected",
            Self::Draft => "status-badge status-badge--draft",
            Self::Pending | Self::InReview => "status-badge status-badge--pending",
        }
    }
}

impl<'de> Deserialize<'de> for ArticleStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Pending, Self::parse))
    }
}

/// An article as returned by the content API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub id: i64,
    pub title: String,
    /// Author or field line shown under the title.
    #[serde(default)]
    pub author: String,
    /// Rendered HTML body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    /// Account that uploaded the article, when the API includes it.
    #[serde(default)]
    pub username: Option<String>,
}

impl Article {
    /// Date part of `published_date` (`2025-01-31T10:00:00` -> `2025-01-31`).
    pub fn published_day(&self) -> Option<&str> {
        let raw = self.published_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(raw.split(['T', ' ']).next().unwrap_or(raw))
    }
}

/// `POST /api/articles` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub content: String,
}

/// `PATCH /api/articles/{id}/status` body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: ArticleStatus,
}

// =============================================================
// Profiles and accounts
// =============================================================

/// A row on the user-management page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "deserialize_id_string")]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub grad_year: Option<i32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty()).unwrap_or("N/A")
    }

    /// Uppercase first letter for the avatar bubble.
    pub fn initial(&self) -> char {
        self.full_name
            .as_deref()
            .and_then(|n| n.trim().chars().next())
            .map_or('?', |c| c.to_ascii_uppercase())
    }
}

/// `PATCH /api/profiles/{id}` body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// `POST /api/auth/register` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// `PATCH /api/auth/me` body; unset fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AccountUpdate {
    /// Build an update from form fields, dropping blanks and values equal to
    /// the current ones.
    pub fn from_form(current_username: &str, current_email: &str, username: &str, email: &str, password: &str) -> Self {
        let changed = |value: &str, current: &str| {
            let value = value.trim();
            (!value.is_empty() && value != current).then(|| value.to_owned())
        };
        Self {
            username: changed(username, current_username),
            email: changed(email, current_email),
            password: (!password.is_empty()).then(|| password.to_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}

// =============================================================
// REST auth backend
// =============================================================

/// `POST /api/auth/login` and `GET /api/auth/me` response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiUser {
    #[serde(deserialize_with = "deserialize_id_string")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl ApiUser {
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            email: self.email,
            metadata: PrincipalMetadata { username: self.username, role: self.role, full_name: None },
        }
    }
}

// =============================================================
// Hosted auth backend
// =============================================================

/// User object returned by the hosted auth service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HostedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: PrincipalMetadata,
}

impl HostedUser {
    pub fn into_principal(self) -> Principal {
        Principal { id: self.id, email: self.email.unwrap_or_default(), metadata: self.user_metadata }
    }
}

/// Password-grant token response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: HostedUser,
}

/// One row of `profiles?select=role,full_name`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProfileRoleRow {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// First row with a role wins; a missing row or null role means "no answer"
/// so the caller falls back to metadata.
pub fn role_lookup_from_rows(rows: Vec<ProfileRoleRow>) -> Option<RoleLookup> {
    let row = rows.into_iter().next()?;
    let raw = row.role?;
    Some(RoleLookup { role: Role::normalize(Some(&raw)), full_name: row.full_name })
}

// =============================================================
// Helpers
// =============================================================

fn deserialize_id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) if !id.trim().is_empty() => Ok(id),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        _ => Err(D::Error::custom("expected non-empty string or number id")),
    }
}

fn deserialize_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| D::Error::custom("expected integer id")),
        serde_json::Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom("expected integer id")),
        _ => Err(D::Error::custom("expected number")),
    }
}
