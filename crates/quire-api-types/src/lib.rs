//! Request and response shapes of the admin collection endpoints.
//!
//! The backend serializes its paginator as `{ data, current_page, last_page,
//! per_page, total }` and may encode boolean columns as `0`/`1`; both are
//! accepted here so consumers only ever see typed records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Numeric primary key shared by every admin entity.
pub type EntityId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Account role as stored by the backend (single-letter codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "U")]
    User,
    #[serde(rename = "A")]
    Admin,
    #[serde(rename = "D")]
    Developer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "U",
            Role::Admin => "A",
            Role::Developer => "D",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Developer => "developer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownValue;

    /// Accepts the wire code (`U`, `A`, `D`) or the long label, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "u" | "user" => Ok(Role::User),
            "a" | "admin" => Ok(Role::Admin),
            "d" | "developer" => Ok(Role::Developer),
            _ => Err(UnknownValue::new("role", value)),
        }
    }
}

/// Moderation state of comments and posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(ApprovalStatus::Approved),
            "pending" => Ok(ApprovalStatus::Pending),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(UnknownValue::new("approval status", value)),
        }
    }
}

/// Minimal author projection embedded in comments and posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
}

/// Minimal post projection embedded in comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: EntityId,
    pub content: String,
    #[serde(deserialize_with = "flag")]
    pub approved: bool,
    #[serde(default)]
    pub user: Option<AuthorRef>,
    #[serde(default)]
    pub post: Option<PostRef>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub approval_status: ApprovalStatus,
    #[serde(default, deserialize_with = "flag")]
    pub published: bool,
    #[serde(default)]
    pub user: Option<AuthorRef>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// One server-paginated slice of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePayload<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// Body of `{resource}.update-role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(value) => Ok(value != 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_codes_and_labels() {
        assert_eq!("A".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("developer".parse::<Role>(), Ok(Role::Developer));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn comment_accepts_integer_flags_and_nested_refs() {
        let json = r#"{
            "id": 7,
            "content": "Nice write-up",
            "approved": 0,
            "user": {"id": 3, "name": "Ada"},
            "post": {"title": "Ownership"},
            "created_at": "2024-03-01T10:00:00.000000Z",
            "updated_at": "2024-03-01T10:00:00.000000Z"
        }"#;
        let comment: CommentRecord = serde_json::from_str(json).expect("comment");
        assert!(!comment.approved);
        assert_eq!(comment.user.map(|u| u.name).as_deref(), Some("Ada"));
        assert_eq!(comment.post.map(|p| p.title).as_deref(), Some("Ownership"));
        assert!(comment.created_at.is_some());
    }

    #[test]
    fn page_payload_decodes_paginator_shape() {
        let json = r#"{
            "data": [{"id": 1, "name": "Ada", "email": "ada@example.com", "role": "D"}],
            "current_page": 2,
            "last_page": 5,
            "per_page": 1,
            "total": 5,
            "links": []
        }"#;
        let page: PagePayload<UserRecord> = serde_json::from_str(json).expect("page");
        assert_eq!(page.current_page, 2);
        assert_eq!(page.data[0].role, Role::Developer);
        assert_eq!(page.data[0].created_at, None);
    }

    #[test]
    fn role_update_serializes_code() {
        let body = serde_json::to_string(&RoleUpdateRequest { role: Role::Admin }).expect("json");
        assert_eq!(body, r#"{"role":"A"}"#);
    }
}
