use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, Url,
    header::{ACCEPT, HeaderValue},
};
use tracing::debug;

use crate::{
    config::ClientSettings,
    domain::types::{EntityId, MutationAction, Resource},
};
use quire_api_types::RoleUpdateRequest;

use super::{
    AdminGateway,
    error::GatewayError,
    routes::{Endpoint, RouteTable},
};

/// reqwest-backed [`AdminGateway`] talking to the backend's admin routes.
#[derive(Clone, Debug)]
pub struct AdminClient {
    client: Client,
    base: Url,
    routes: RouteTable,
    token: Option<String>,
}

impl AdminClient {
    pub fn new(
        site: &str,
        routes: RouteTable,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut base = Url::parse(site)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base,
            routes,
            token,
        })
    }

    pub fn from_settings(site: &str, settings: &ClientSettings) -> Result<Self, GatewayError> {
        Self::new(
            site,
            RouteTable::new(&settings.path_prefix),
            settings.api_token.clone(),
            settings.timeout,
        )
    }

    pub fn user_agent() -> &'static str {
        concat!("quire-cli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base.join(path).map_err(GatewayError::Url)
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        query: Option<&[(&str, String)]>,
        body: Option<serde_json::Value>,
    ) -> Result<Response, GatewayError> {
        let mut url = self.url(&endpoint.path)?;
        if let Some(q) = query {
            url.set_query(None);
            let mut qp = url.query_pairs_mut();
            for (k, v) in q {
                qp.append_pair(k, v);
            }
        }

        debug!(method = %endpoint.method, url = %url, "admin request");

        let mut req = self
            .client
            .request(endpoint.method.clone(), url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        Ok(req.send().await?)
    }

    async fn handle(resp: Response) -> Result<Vec<u8>, GatewayError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            return Err(GatewayError::rejected(status.as_u16(), text));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AdminGateway for AdminClient {
    async fn mutate(
        &self,
        resource: Resource,
        id: EntityId,
        action: MutationAction,
    ) -> Result<(), GatewayError> {
        let endpoint = self.routes.mutation(resource, id, action);
        let body = match action {
            MutationAction::SetRole(role) => Some(
                serde_json::to_value(RoleUpdateRequest { role })
                    .map_err(|e| GatewayError::Decode(e.to_string()))?,
            ),
            _ => None,
        };
        let resp = self.send(&endpoint, None, body).await?;
        Self::handle(resp).await.map(|_| ())
    }

    async fn fetch_page(
        &self,
        resource: Resource,
        page: u32,
    ) -> Result<serde_json::Value, GatewayError> {
        let endpoint = self.routes.index(resource);
        let query = [("page", page.to_string())];
        let resp = self.send(&endpoint, Some(&query), None).await?;
        let bytes = Self::handle(resp).await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
