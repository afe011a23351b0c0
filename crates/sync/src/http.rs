//! REST client for the hotspot persistence endpoints.
//!
//! | Operation | Request |
//! |---|---|
//! | list | `GET {base}/containers/{cid}/hotspots` |
//! | create | `POST {base}/containers/{cid}/hotspots` |
//! | update | `PUT {base}/containers/{cid}/hotspots/{sid}` |
//! | delete | `DELETE {base}/containers/{cid}/hotspots/{sid}` |
//! | transition | `POST {base}/containers/{cid}/status` |
//!
//! Successful JSON responses use the `{ "data": ... }` envelope.

use std::time::Duration;

use async_trait::async_trait;
use hotspot_core::types::DbId;
use reqwest::StatusCode;

use crate::adapter::{BackendSyncAdapter, SyncError};
use crate::wire::{ContainerStatus, DataResponse, HotspotPayload, ServerHotspot, StatusTransition};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP adapter for one backend.
pub struct HttpSyncAdapter {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl HttpSyncAdapter {
    /// Create an adapter with its own connection pool.
    ///
    /// * `api_url` - Base URL, e.g. `https://api.example.com/v1`.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create an adapter reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_url,
            api_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn hotspots_url(&self, container_id: DbId) -> String {
        format!("{}/containers/{container_id}/hotspots", self.api_url)
    }

    fn hotspot_url(&self, container_id: DbId, server_id: DbId) -> String {
        format!("{}/{server_id}", self.hotspots_url(container_id))
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. A 404 on an
    /// individual hotspot becomes [`SyncError::NotFound`].
    async fn ensure_success(
        response: reqwest::Response,
        not_found: Option<(DbId, DbId)>,
    ) -> Result<reqwest::Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let (StatusCode::NOT_FOUND, Some((container_id, server_id))) = (status, not_found) {
            return Err(SyncError::NotFound {
                container_id,
                server_id,
            });
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(SyncError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_data<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        let response = Self::ensure_success(response, None).await?;
        Ok(response.json::<DataResponse<T>>().await?.data)
    }
}

#[async_trait]
impl BackendSyncAdapter for HttpSyncAdapter {
    async fn list(&self, container_id: DbId) -> Result<Vec<ServerHotspot>, SyncError> {
        let response = self
            .request(reqwest::Method::GET, self.hotspots_url(container_id))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    async fn create(
        &self,
        container_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<ServerHotspot, SyncError> {
        let response = self
            .request(reqwest::Method::POST, self.hotspots_url(container_id))
            .json(payload)
            .send()
            .await?;
        let created: ServerHotspot = Self::parse_data(response).await?;
        tracing::debug!(container_id, server_id = created.id, "Hotspot created on backend");
        Ok(created)
    }

    async fn update(
        &self,
        container_id: DbId,
        server_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<(), SyncError> {
        let response = self
            .request(reqwest::Method::PUT, self.hotspot_url(container_id, server_id))
            .json(payload)
            .send()
            .await?;
        Self::ensure_success(response, Some((container_id, server_id))).await?;
        Ok(())
    }

    async fn delete(&self, container_id: DbId, server_id: DbId) -> Result<(), SyncError> {
        let response = self
            .request(reqwest::Method::DELETE, self.hotspot_url(container_id, server_id))
            .send()
            .await?;
        Self::ensure_success(response, Some((container_id, server_id))).await?;
        Ok(())
    }

    async fn transition_container(
        &self,
        container_id: DbId,
        from: ContainerStatus,
        to: ContainerStatus,
    ) -> Result<(), SyncError> {
        let response = self
            .request(
                reqwest::Method::POST,
                format!("{}/containers/{container_id}/status", self.api_url),
            )
            .json(&StatusTransition { from, to })
            .send()
            .await?;
        Self::ensure_success(response, None).await?;
        Ok(())
    }
}
