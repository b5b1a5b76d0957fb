use thiserror::Error;

use crate::{
    domain::{
        error::DomainError,
        types::{EntityId, MutationAction, Resource},
    },
    infra::http::GatewayError,
};

#[derive(Debug, Error)]
pub enum CuratorError {
    #[error("{} `{id}` is not on the current page", .resource.singular())]
    UnknownEntity { resource: Resource, id: EntityId },
    #[error("{} is not available for {resource}", .action.label())]
    UnsupportedAction {
        resource: Resource,
        action: MutationAction,
    },
    #[error("select at least one {}", .resource.singular())]
    EmptySelection { resource: Resource },
    #[error("every requested {} is already being processed", .resource.singular())]
    AlreadyInFlight {
        resource: Resource,
        ids: Vec<EntityId>,
    },
    #[error("invalid {resource} page payload: {message}")]
    Payload { resource: Resource, message: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl CuratorError {
    pub fn payload(resource: Resource, message: impl Into<String>) -> Self {
        Self::Payload {
            resource,
            message: message.into(),
        }
    }
}
