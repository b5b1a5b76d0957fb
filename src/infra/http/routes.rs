//! Route-name → HTTP request mapping for the admin endpoints.

use reqwest::Method;

use crate::domain::types::{EntityId, MutationAction, Resource, RouteName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
}

/// Resolves route names against a path prefix such as `admin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    prefix: String,
}

impl RouteTable {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn index(&self, resource: Resource) -> Endpoint {
        Endpoint {
            method: Method::GET,
            path: self.collection_path(resource),
        }
    }

    pub fn mutation(&self, resource: Resource, id: EntityId, action: MutationAction) -> Endpoint {
        let member = format!("{}/{id}", self.collection_path(resource));
        match action.route() {
            RouteName::Approve => Endpoint {
                method: Method::POST,
                path: format!("{member}/approve"),
            },
            RouteName::Reject => Endpoint {
                method: Method::POST,
                path: format!("{member}/reject"),
            },
            RouteName::Destroy => Endpoint {
                method: Method::DELETE,
                path: member,
            },
            RouteName::UpdateRole => Endpoint {
                method: Method::PATCH,
                path: format!("{member}/role"),
            },
            RouteName::Index => self.index(resource),
        }
    }

    fn collection_path(&self, resource: Resource) -> String {
        if self.prefix.is_empty() {
            resource.as_str().to_string()
        } else {
            format!("{}/{}", self.prefix, resource.as_str())
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new("admin")
    }
}
