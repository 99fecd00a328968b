use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::domain::category::CategoryNode;
use crate::domain::order::{MilestoneDates, Order};
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, RetryConfig};

/// Record store backed by the admin REST API.
///
/// Reads are retried on transient failures; writes go out exactly once.
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    retry: RetryConfig,
    metrics: Option<Arc<Metrics>>,
}

impl HttpRecordStore {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn observe(&self, operation: &str, started: Instant, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_store_request(operation, started.elapsed().as_secs_f64(), success);
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T, StoreError> {
        let url = self.url(path);

        retry_on_transient(&self.retry, operation, |attempt| {
            let url = url.clone();
            async move {
                if attempt > 1 {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_retry_attempt(operation, attempt);
                    }
                }

                let started = Instant::now();
                tracing::debug!(operation, url = %url, attempt, "GET");

                let result = match self.client.get(&url).send().await {
                    Ok(response) => match check_status(response, &url).await {
                        Ok(response) => decode(response).await,
                        Err(e) => Err(e),
                    },
                    Err(e) => Err(StoreError::Transport(e.to_string())),
                };

                self.observe(operation, started, result.is_ok());
                result
            }
        })
        .await
    }

    async fn send_write(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<(), StoreError> {
        let started = Instant::now();
        tracing::debug!(operation, url = %url, "Sending write");

        let result = match request.send().await {
            Ok(response) => check_status(response, url).await.map(|_| ()),
            Err(e) => Err(StoreError::Transport(e.to_string())),
        };

        self.observe(operation, started, result.is_ok());

        if let Err(ref error) = result {
            tracing::error!(operation, url = %url, error = %error, "Write failed");
        }
        result
    }
}

async fn check_status(response: Response, url: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(url.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(StoreError::Unavailable(body));
    }

    Err(StoreError::Rejected {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_order(&self, id: Uuid) -> Result<Order, StoreError> {
        self.get_json("fetch_order", &format!("orders/{id}")).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.get_json("list_orders", "orders").await
    }

    async fn update_order_status(&self, order_id: Uuid, status_id: Uuid) -> Result<(), StoreError> {
        let url = self.url(&format!("orders/{order_id}/status/{status_id}"));
        self.send_write("update_order_status", self.client.put(&url), &url)
            .await
    }

    async fn update_order_timeline(
        &self,
        order_id: Uuid,
        dates: &MilestoneDates,
    ) -> Result<(), StoreError> {
        let url = self.url(&format!("orders/{order_id}/dates"));
        self.send_write("update_order_timeline", self.client.put(&url).json(dates), &url)
            .await
    }

    async fn fetch_category_forest(&self) -> Result<Vec<CategoryNode>, StoreError> {
        self.get_json("fetch_category_forest", "categories").await
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        let url = self.url(&format!("categories/{id}"));
        self.send_write("delete_category", self.client.delete(&url), &url)
            .await
    }
}
