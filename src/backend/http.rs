use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::models::{NewProduct, Order, Product, Statistics};
use crate::{DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};

use super::{BackendError, ProductBackend};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, serde::Serialize)]
struct CreateOrderBody {
    product_id: i64,
    quantity: i64,
}

/// HTTP client for the products/orders service. No internal retries: the
/// pipeline makes at most two sequential backend calls per request and the
/// caller decides what a failure means.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!("HttpBackend created for {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn from_env() -> Result<Self, BackendError> {
        let base_url = std::env::var("PRILAVOK_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let timeout_secs = std::env::var("PRILAVOK_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(&base_url, timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-success statuses to the backend error taxonomy, surfacing
    /// the service's `detail` message when one is present.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.detail)
            .unwrap_or_else(|_| status.to_string());

        debug!("backend returned {}: {}", status, detail);
        match status.as_u16() {
            404 => Err(BackendError::NotFound(detail)),
            400 | 422 => Err(BackendError::InvalidArgument(detail)),
            409 => Err(BackendError::Conflict(detail)),
            _ => Err(BackendError::Unavailable(format!("{}: {}", status, detail))),
        }
    }
}

#[async_trait]
impl ProductBackend for HttpBackend {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, BackendError> {
        let mut request = self.client.get(self.url("/products"));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get_product(&self, product_id: i64) -> Result<Product, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/products/{}", product_id)))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product, BackendError> {
        let response = self
            .client
            .post(self.url("/products"))
            .json(&product)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn get_statistics(&self) -> Result<Statistics, BackendError> {
        let response = self.client.get(self.url("/statistics")).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn create_order(&self, product_id: i64, quantity: i64) -> Result<Order, BackendError> {
        let body = CreateOrderBody {
            product_id,
            quantity,
        };
        let response = self
            .client
            .post(self.url("/orders"))
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation_strips_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/", 30).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/products/1"), "http://localhost:8000/products/1");
    }

    #[test]
    fn test_backend_from_env_defaults() {
        let backend = HttpBackend::from_env();
        assert!(backend.is_ok());
    }
}
