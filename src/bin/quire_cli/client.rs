#![deny(clippy::all, clippy::pedantic)]

use std::time::Duration;

use quire::{
    application::{
        curator::{CollectionCurator, DispatchPolicy},
        error::CuratorError,
        toasts::ToastQueue,
    },
    config::{LoadError, Settings},
    domain::entities::Curatable,
    infra::{
        error::InfraError,
        http::{AdminClient, GatewayError},
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("site URL is required (use --site, QUIRE_SITE_URL or client.base_url)")]
    MissingSite,
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Telemetry(#[from] InfraError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Curator(#[from] CuratorError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Everything a handler needs to reach the backend.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub gateway: AdminClient,
    pub policy: DispatchPolicy,
    pub toast_ttl: Duration,
}

impl Ctx {
    pub fn from_settings(settings: &Settings) -> Result<Self, CliError> {
        let site = settings
            .client
            .base_url
            .as_ref()
            .ok_or(CliError::MissingSite)?;
        let gateway = AdminClient::from_settings(site.as_str(), &settings.client)?;

        Ok(Self {
            gateway,
            policy: DispatchPolicy::from(&settings.dispatch),
            toast_ttl: settings.toasts.ttl,
        })
    }

    /// Load page `page` of `E`'s collection into a fresh curator.
    pub async fn curator<E: Curatable>(&self, page: u32) -> Result<CollectionCurator<E>, CliError> {
        let toasts = ToastQueue::new(self.toast_ttl);
        let curator = CollectionCurator::load(&self.gateway, page, self.policy, toasts).await?;
        Ok(curator)
    }
}
