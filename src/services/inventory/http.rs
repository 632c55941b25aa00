use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::json;

use super::InventoryService;
use crate::config::AppConfig;
use crate::errors::InventoryError;
use crate::models::FlightSegment;

pub struct HttpInventoryClient {
    base_url: Url,
    timeout: Duration,
    forward_idempotency_key: bool,
    client: reqwest::Client,
}

impl HttpInventoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("invalid inventory service url: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("inventory service url cannot carry a path: {base_url}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build inventory HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            forward_idempotency_key: false,
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::new(&config.inventory_service_url, config.inventory_timeout)?
            .with_idempotency_keys(config.forward_idempotency_key))
    }

    pub fn with_idempotency_keys(mut self, enabled: bool) -> Self {
        self.forward_idempotency_key = enabled;
        self
    }

    /// `{base}/segments/{id}[/{action}]`. The id is pushed as a single
    /// percent-encoded path segment, so `/`, `?` and `#` stay part of it.
    fn segment_url(&self, segment_id: &str, action: Option<&str>) -> Result<Url, InventoryError> {
        if segment_id.is_empty() || segment_id == "." || segment_id == ".." {
            return Err(InventoryError::NotFound);
        }

        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                InventoryError::Unavailable(format!("inventory url cannot carry a path: {}", self.base_url))
            })?;
            path.pop_if_empty().push("segments").push(segment_id);
            if let Some(action) = action {
                path.push(action);
            }
        }
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> InventoryError {
        if err.is_timeout() {
            InventoryError::Timeout(self.timeout)
        } else {
            InventoryError::Unavailable(err.to_string())
        }
    }

    async fn adjust_seats(
        &self,
        segment_id: &str,
        action: &str,
        count: u32,
        idempotency_key: &str,
    ) -> Result<(), InventoryError> {
        let url = self.segment_url(segment_id, Some(action))?;
        let mut request = self.client.post(url).json(&json!({ "count": count }));
        if self.forward_idempotency_key {
            request = request.header("Idempotency-Key", idempotency_key);
        }

        let resp = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(InventoryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl InventoryService for HttpInventoryClient {
    async fn get_segment(&self, segment_id: &str) -> Result<FlightSegment, InventoryError> {
        let resp = self
            .client
            .get(self.segment_url(segment_id, None)?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InventoryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<FlightSegment>()
            .await
            .map_err(|e| InventoryError::Unavailable(format!("invalid segment payload: {e}")))
    }

    async fn reserve(
        &self,
        segment_id: &str,
        count: u32,
        idempotency_key: &str,
    ) -> Result<(), InventoryError> {
        self.adjust_seats(segment_id, "reserve", count, idempotency_key)
            .await
    }

    async fn release(
        &self,
        segment_id: &str,
        count: u32,
        idempotency_key: &str,
    ) -> Result<(), InventoryError> {
        self.adjust_seats(segment_id, "release", count, idempotency_key)
            .await
    }
}
