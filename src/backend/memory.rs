use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::core::models::{NewProduct, Order, Product, Statistics};

use super::{BackendError, ProductBackend};

/// In-process backend with the same contract and validation messages as the
/// real store. Used by tests and local runs without a backend service.
pub struct MemoryBackend {
    products: RwLock<Vec<Product>>,
    orders: RwLock<Vec<Order>>,
    next_product_id: AtomicI64,
    next_order_id: AtomicI64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(Vec::new()),
            orders: RwLock::new(Vec::new()),
            next_product_id: AtomicI64::new(1),
            next_order_id: AtomicI64::new(1),
        }
    }

    /// Backend pre-filled with the demo catalog.
    pub fn seeded() -> Self {
        let backend = Self::new();
        {
            let mut products = backend.products.write();
            let defaults = [
                ("Ноутбук", 50000.0, "Электроника", true),
                ("Наушники", 7000.0, "Электроника", true),
                ("Кофе", 1200.0, "Продукты", false),
            ];
            for (name, price, category, in_stock) in defaults {
                let id = backend.next_product_id.fetch_add(1, Ordering::Relaxed);
                products.push(Product {
                    id,
                    name: name.to_string(),
                    price,
                    category: category.to_string(),
                    in_stock,
                });
            }
        }
        backend
    }

    fn find_product(&self, product_id: i64) -> Result<Product, BackendError> {
        self.products
            .read()
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| {
                BackendError::NotFound(format!("Product with id={} not found", product_id))
            })
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductBackend for MemoryBackend {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, BackendError> {
        let products = self.products.read();
        match category {
            None => Ok(products.clone()),
            Some(category) => {
                let wanted = category.trim().to_lowercase();
                Ok(products
                    .iter()
                    .filter(|p| p.category.to_lowercase() == wanted)
                    .cloned()
                    .collect())
            }
        }
    }

    async fn get_product(&self, product_id: i64) -> Result<Product, BackendError> {
        self.find_product(product_id)
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product, BackendError> {
        let name = product.name.trim();
        let category = product.category.trim();

        if name.is_empty() {
            return Err(BackendError::InvalidArgument(
                "Product name must be non-empty".to_string(),
            ));
        }
        if product.price < 0.0 {
            return Err(BackendError::InvalidArgument(
                "Product price must be >= 0".to_string(),
            ));
        }
        if category.is_empty() {
            return Err(BackendError::InvalidArgument(
                "Product category must be non-empty".to_string(),
            ));
        }

        let created = Product {
            id: self.next_product_id.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            price: product.price,
            category: category.to_string(),
            in_stock: product.in_stock,
        };
        self.products.write().push(created.clone());
        Ok(created)
    }

    async fn get_statistics(&self) -> Result<Statistics, BackendError> {
        let products = self.products.read();
        let count = products.len() as u64;
        let avg_price = if products.is_empty() {
            0.0
        } else {
            products.iter().map(|p| p.price).sum::<f64>() / products.len() as f64
        };
        Ok(Statistics { count, avg_price })
    }

    async fn create_order(&self, product_id: i64, quantity: i64) -> Result<Order, BackendError> {
        if quantity <= 0 {
            return Err(BackendError::InvalidArgument(
                "Quantity must be > 0".to_string(),
            ));
        }

        let product = self.find_product(product_id)?;
        if !product.in_stock {
            return Err(BackendError::Conflict(format!(
                "Product id={} is out of stock",
                product_id
            )));
        }

        let order = Order {
            id: self.next_order_id.fetch_add(1, Ordering::Relaxed),
            product_id,
            product_name: product.name,
            unit_price: product.price,
            quantity,
            total_price: product.price * quantity as f64,
            created_at: Utc::now(),
        };
        self.orders.write().push(order.clone());
        Ok(order)
    }
}
