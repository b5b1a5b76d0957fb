//! Shared domain enumerations for admin resources and their mutations.

use std::fmt;

pub use quire_api_types::{ApprovalStatus, EntityId, Role};

/// Admin collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Comments,
    Posts,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Comments => "comments",
            Resource::Posts => "posts",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Resource::Users => "user",
            Resource::Comments => "comment",
            Resource::Posts => "post",
        }
    }

    /// `"1 comment"`, `"3 comments"`.
    pub fn count_label(self, count: usize) -> String {
        if count == 1 {
            format!("1 {}", self.singular())
        } else {
            format!("{count} {}", self.as_str())
        }
    }

    /// Fully-qualified route name, e.g. `comments.approve`.
    pub fn route_name(self, route: RouteName) -> String {
        format!("{}.{}", self.as_str(), route.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named server endpoints the curator talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Index,
    Approve,
    Reject,
    Destroy,
    UpdateRole,
}

impl RouteName {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteName::Index => "index",
            RouteName::Approve => "approve",
            RouteName::Reject => "reject",
            RouteName::Destroy => "destroy",
            RouteName::UpdateRole => "update-role",
        }
    }
}

/// Mutation applied to a single entity; batches apply one per selected id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationAction {
    Approve,
    Reject,
    Delete,
    SetRole(Role),
}

impl MutationAction {
    pub fn route(self) -> RouteName {
        match self {
            MutationAction::Approve => RouteName::Approve,
            MutationAction::Reject => RouteName::Reject,
            MutationAction::Delete => RouteName::Destroy,
            MutationAction::SetRole(_) => RouteName::UpdateRole,
        }
    }

    /// Stable identifier used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            MutationAction::Approve => "approve",
            MutationAction::Reject => "reject",
            MutationAction::Delete => "delete",
            MutationAction::SetRole(_) => "set_role",
        }
    }

    pub fn label(self) -> String {
        match self {
            MutationAction::Approve => "Approve".to_string(),
            MutationAction::Reject => "Reject".to_string(),
            MutationAction::Delete => "Delete".to_string(),
            MutationAction::SetRole(role) => format!("Set role to {}", role.label()),
        }
    }

    /// Lowercase verb for failure messages, e.g. `"Failed to approve comment"`.
    pub fn verb(self) -> &'static str {
        match self {
            MutationAction::Approve => "approve",
            MutationAction::Reject => "reject",
            MutationAction::Delete => "delete",
            MutationAction::SetRole(_) => "update",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            MutationAction::Approve => "approved",
            MutationAction::Reject => "rejected",
            MutationAction::Delete => "deleted",
            MutationAction::SetRole(_) => "updated",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationAction::SetRole(role) => write!(f, "set_role({role})"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_names_follow_resource_dot_route() {
        assert_eq!(
            Resource::Comments.route_name(MutationAction::Approve.route()),
            "comments.approve"
        );
        assert_eq!(
            Resource::Users.route_name(MutationAction::SetRole(Role::Admin).route()),
            "users.update-role"
        );
        assert_eq!(
            Resource::Posts.route_name(MutationAction::Delete.route()),
            "posts.destroy"
        );
    }

    #[test]
    fn count_label_pluralizes() {
        assert_eq!(Resource::Posts.count_label(1), "1 post");
        assert_eq!(Resource::Posts.count_label(0), "0 posts");
        assert_eq!(Resource::Users.count_label(4), "4 users");
    }
}
