use thiserror::Error;

use super::types::Resource;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown {resource} filter value `{value}`")]
    UnknownCategory { resource: Resource, value: String },
}

impl DomainError {
    pub fn unknown_category(resource: Resource, value: impl Into<String>) -> Self {
        Self::UnknownCategory {
            resource,
            value: value.into(),
        }
    }
}
