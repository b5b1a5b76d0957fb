//! Entity descriptions the curator is generic over.
//!
//! Each admin screen curates one record type from `quire-api-types`; the
//! [`Curatable`] impls below name which fields are searchable, which enum is
//! the categorical filter axis, and which mutations the backend accepts.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use time::OffsetDateTime;

pub use quire_api_types::{CommentRecord, PostRecord, UserRecord};

use super::{
    error::DomainError,
    types::{ApprovalStatus, EntityId, MutationAction, Resource, Role},
};

const LABEL_MAX_CHARS: usize = 48;

pub trait Curatable: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync {
    const RESOURCE: Resource;

    /// Value of the categorical filter axis (role, approval status).
    type Category: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync;

    fn id(&self) -> EntityId;

    /// Short human-readable name used in toasts and batch reports.
    fn label(&self) -> String;

    /// Text fields matched by the search box.
    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> Self::Category;

    fn created_at(&self) -> Option<OffsetDateTime>;

    fn supports(action: MutationAction) -> bool;

    fn parse_category(value: &str) -> Result<Self::Category, DomainError>;

    /// Case-insensitive substring match; `needle` must already be lowercase.
    fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .search_fields()
                .into_iter()
                .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Curatable for UserRecord {
    const RESOURCE: Resource = Resource::Users;
    type Category = Role;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn category(&self) -> Role {
        self.role
    }

    fn created_at(&self) -> Option<OffsetDateTime> {
        self.created_at
    }

    fn supports(action: MutationAction) -> bool {
        matches!(action, MutationAction::Delete | MutationAction::SetRole(_))
    }

    fn parse_category(value: &str) -> Result<Role, DomainError> {
        value
            .parse()
            .map_err(|_| DomainError::unknown_category(Self::RESOURCE, value))
    }
}

impl Curatable for CommentRecord {
    const RESOURCE: Resource = Resource::Comments;
    type Category = ApprovalStatus;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        truncate_label(&self.content)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.content.as_str()];
        if let Some(user) = &self.user {
            fields.push(user.name.as_str());
        }
        if let Some(post) = &self.post {
            fields.push(post.title.as_str());
        }
        fields
    }

    fn category(&self) -> ApprovalStatus {
        if self.approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        }
    }

    fn created_at(&self) -> Option<OffsetDateTime> {
        self.created_at
    }

    fn supports(action: MutationAction) -> bool {
        !matches!(action, MutationAction::SetRole(_))
    }

    /// Comments only carry an approval flag, so `rejected` is not a filter value.
    fn parse_category(value: &str) -> Result<ApprovalStatus, DomainError> {
        match value.parse() {
            Ok(status @ (ApprovalStatus::Approved | ApprovalStatus::Pending)) => Ok(status),
            _ => Err(DomainError::unknown_category(Self::RESOURCE, value)),
        }
    }
}

impl Curatable for PostRecord {
    const RESOURCE: Resource = Resource::Posts;
    type Category = ApprovalStatus;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        truncate_label(&self.title)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.slug.as_str()];
        if let Some(user) = &self.user {
            fields.push(user.name.as_str());
        }
        fields
    }

    fn category(&self) -> ApprovalStatus {
        self.approval_status
    }

    fn created_at(&self) -> Option<OffsetDateTime> {
        self.created_at
    }

    fn supports(action: MutationAction) -> bool {
        !matches!(action, MutationAction::SetRole(_))
    }

    fn parse_category(value: &str) -> Result<ApprovalStatus, DomainError> {
        value
            .parse()
            .map_err(|_| DomainError::unknown_category(Self::RESOURCE, value))
    }
}

fn truncate_label(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= LABEL_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut label: String = trimmed.chars().take(LABEL_MAX_CHARS).collect();
    label.push('…');
    label
}

#[cfg(test)]
mod tests {
    use quire_api_types::AuthorRef;

    use super::*;

    fn comment(id: EntityId, content: &str, approved: bool) -> CommentRecord {
        CommentRecord {
            id,
            content: content.to_string(),
            approved,
            user: Some(AuthorRef {
                id: None,
                name: "Grace Hopper".to_string(),
            }),
            post: None,
            created_at: None,
        }
    }

    #[test]
    fn search_covers_nested_author_name() {
        let c = comment(1, "Great post", false);
        assert!(c.matches_search("hopper"));
        assert!(c.matches_search("great"));
        assert!(!c.matches_search("rust"));
    }

    #[test]
    fn comment_category_follows_flag() {
        assert_eq!(comment(1, "x", true).category(), ApprovalStatus::Approved);
        assert_eq!(comment(2, "x", false).category(), ApprovalStatus::Pending);
    }

    #[test]
    fn comments_reject_rejected_filter() {
        assert!(CommentRecord::parse_category("pending").is_ok());
        assert!(CommentRecord::parse_category("rejected").is_err());
        assert!(PostRecord::parse_category("rejected").is_ok());
    }

    #[test]
    fn users_only_support_delete_and_role_updates() {
        assert!(UserRecord::supports(MutationAction::SetRole(Role::Admin)));
        assert!(UserRecord::supports(MutationAction::Delete));
        assert!(!UserRecord::supports(MutationAction::Approve));
        assert!(!CommentRecord::supports(MutationAction::SetRole(Role::User)));
    }

    #[test]
    fn long_labels_are_truncated() {
        let text = "a".repeat(60);
        let label = truncate_label(&text);
        assert_eq!(label.chars().count(), LABEL_MAX_CHARS + 1);
        assert!(label.ends_with('…'));
    }
}
