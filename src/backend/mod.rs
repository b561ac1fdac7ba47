pub mod cache;
pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::error::AgentError;
use crate::core::models::{NewProduct, Order, Product, Statistics};

pub use cache::{CacheError, CacheFactory, CacheStats, CacheStore, CachedBackend, LruStore};
pub use http::HttpBackend;
pub use memory::MemoryBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<BackendError> for AgentError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(msg) => AgentError::NotFound(msg),
            BackendError::InvalidArgument(msg) => AgentError::Validation(msg),
            BackendError::Conflict(msg) => AgentError::Conflict(msg),
            BackendError::Unavailable(msg) => AgentError::Backend(msg),
            BackendError::Http(e) => AgentError::Http(e),
            BackendError::Json(e) => AgentError::Serialization(e),
        }
    }
}

/// Product/order backend collaborator consumed by the act stage. Reads are
/// cacheable; `add_product` is not idempotent and always creates a fresh
/// entity.
#[async_trait]
pub trait ProductBackend: Send + Sync {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, BackendError>;

    async fn get_product(&self, product_id: i64) -> Result<Product, BackendError>;

    async fn add_product(&self, product: NewProduct) -> Result<Product, BackendError>;

    async fn get_statistics(&self) -> Result<Statistics, BackendError>;

    async fn create_order(&self, product_id: i64, quantity: i64) -> Result<Order, BackendError>;
}

#[async_trait]
impl<B: ProductBackend + ?Sized> ProductBackend for Arc<B> {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, BackendError> {
        (**self).list_products(category).await
    }

    async fn get_product(&self, product_id: i64) -> Result<Product, BackendError> {
        (**self).get_product(product_id).await
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product, BackendError> {
        (**self).add_product(product).await
    }

    async fn get_statistics(&self) -> Result<Statistics, BackendError> {
        (**self).get_statistics().await
    }

    async fn create_order(&self, product_id: i64, quantity: i64) -> Result<Order, BackendError> {
        (**self).create_order(product_id, quantity).await
    }
}
