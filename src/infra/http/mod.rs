//! HTTP boundary to the backend's admin endpoints.

mod client;
pub mod error;
pub mod routes;

pub use client::AdminClient;
pub use error::GatewayError;
pub use routes::{Endpoint, RouteTable};

use async_trait::async_trait;

use crate::domain::types::{EntityId, MutationAction, Resource};

/// Remote operations the curator needs from the backend.
#[async_trait]
pub trait AdminGateway: Send + Sync {
    /// Apply one mutation to one entity. Any 2xx counts as success.
    async fn mutate(
        &self,
        resource: Resource,
        id: EntityId,
        action: MutationAction,
    ) -> Result<(), GatewayError>;

    /// Fetch one page of a collection as the raw paginator document.
    async fn fetch_page(
        &self,
        resource: Resource,
        page: u32,
    ) -> Result<serde_json::Value, GatewayError>;
}
