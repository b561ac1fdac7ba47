use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::models::{NewProduct, Order, Product, Statistics};

use super::{BackendError, ProductBackend};

const LIST_KEY_PREFIX: &str = "products:list:";
const GET_KEY_PREFIX: &str = "products:get:";
const STATS_KEY: &str = "products:stats";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),
}

/// Key/value store behind the cache-aside layer. Implementations may be
/// remote and may fail; the wrapper absorbs every error.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    fn del(&self, key: &str) -> Result<(), CacheError>;

    fn del_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}

pub type CacheFactory = Box<dyn Fn() -> Result<Arc<dyn CacheStore>, CacheError> + Send + Sync>;

#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-process LRU store with per-entry expiry.
pub struct LruStore {
    entries: Mutex<LruCache<String, (Value, Instant)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LruStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.lock().len(),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl CacheStore for LruStore {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut entries = self.entries.lock();
        if let Some((value, expires_at)) = entries.get(key) {
            if Instant::now() < *expires_at {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(value.clone()));
            }
            entries.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .lock()
            .put(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    fn del(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().pop(key);
        Ok(())
    }

    fn del_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock();
        let matching: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in matching {
            entries.pop(&key);
        }
        Ok(())
    }
}

struct StoreState {
    checked: bool,
    store: Option<Arc<dyn CacheStore>>,
}

/// Cache-aside wrapper around a product backend: read-through on list/get/
/// stats, invalidate-on-write for add-product. The store is built lazily at
/// most once; if construction or any operation fails the wrapper logs and
/// falls through to the backend, so a cache malfunction can never change
/// the outcome of a request.
pub struct CachedBackend<B> {
    inner: B,
    factory: CacheFactory,
    state: Mutex<StoreState>,
    ttl: Duration,
}

impl<B: ProductBackend> CachedBackend<B> {
    pub fn new(inner: B, factory: CacheFactory, ttl: Duration) -> Self {
        Self {
            inner,
            factory,
            state: Mutex::new(StoreState {
                checked: false,
                store: None,
            }),
            ttl,
        }
    }

    /// Wrap with an already-constructed store.
    pub fn with_store(inner: B, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self::new(inner, Box::new(move || Ok(store.clone())), ttl)
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn store(&self) -> Option<Arc<dyn CacheStore>> {
        let mut state = self.state.lock();
        if !state.checked {
            state.checked = true;
            match (self.factory)() {
                Ok(store) => {
                    info!("cache store ready");
                    state.store = Some(store);
                }
                Err(e) => {
                    warn!("cache unavailable, continuing without cache: {}", e);
                }
            }
        }
        state.store.clone()
    }

    fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store()?;
        match store.get(key) {
            Ok(Some(value)) => serde_json::from_value(value).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("cache_get_failed key={}: {}", key, e);
                None
            }
        }
    }

    fn cache_set(&self, key: &str, value: Value) {
        if let Some(store) = self.store() {
            if let Err(e) = store.set(key, value, self.ttl) {
                warn!("cache_set_failed key={}: {}", key, e);
            }
        }
    }

    fn cache_del(&self, key: &str) {
        if let Some(store) = self.store() {
            if let Err(e) = store.del(key) {
                warn!("cache_del_failed key={}: {}", key, e);
            }
        }
    }

    fn cache_del_prefix(&self, prefix: &str) {
        if let Some(store) = self.store() {
            if let Err(e) = store.del_prefix(prefix) {
                warn!("cache_del_prefix_failed prefix={}: {}", prefix, e);
            }
        }
    }

    fn list_key(category: Option<&str>) -> String {
        let suffix = category
            .map(|c| c.trim().to_lowercase())
            .unwrap_or_else(|| "all".to_string());
        format!("{}{}", LIST_KEY_PREFIX, suffix)
    }
}

#[async_trait]
impl<B: ProductBackend> ProductBackend for CachedBackend<B> {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, BackendError> {
        let key = Self::list_key(category);

        if let Some(cached) = self.cache_get::<Vec<Product>>(&key) {
            debug!("list_products cache_hit=true key={}", key);
            return Ok(cached);
        }

        let products = self.inner.list_products(category).await?;
        if let Ok(value) = serde_json::to_value(&products) {
            self.cache_set(&key, value);
        }
        debug!("list_products cache_hit=false key={}", key);
        Ok(products)
    }

    async fn get_product(&self, product_id: i64) -> Result<Product, BackendError> {
        let key = format!("{}{}", GET_KEY_PREFIX, product_id);

        if let Some(cached) = self.cache_get::<Product>(&key) {
            debug!("get_product cache_hit=true key={}", key);
            return Ok(cached);
        }

        let product = self.inner.get_product(product_id).await?;
        if let Ok(value) = serde_json::to_value(&product) {
            self.cache_set(&key, value);
        }
        debug!("get_product cache_hit=false key={}", key);
        Ok(product)
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product, BackendError> {
        let created = self.inner.add_product(product).await?;

        // the catalog changed: derived reads must not serve stale data
        self.cache_del(STATS_KEY);
        self.cache_del_prefix(LIST_KEY_PREFIX);

        if let Ok(value) = serde_json::to_value(&created) {
            self.cache_set(&format!("{}{}", GET_KEY_PREFIX, created.id), value);
        }
        debug!("add_product cache_invalidate=true id={}", created.id);
        Ok(created)
    }

    async fn get_statistics(&self) -> Result<Statistics, BackendError> {
        if let Some(cached) = self.cache_get::<Statistics>(STATS_KEY) {
            debug!("get_statistics cache_hit=true");
            return Ok(cached);
        }

        let stats = self.inner.get_statistics().await?;
        if let Ok(value) = serde_json::to_value(&stats) {
            self.cache_set(STATS_KEY, value);
        }
        debug!("get_statistics cache_hit=false");
        Ok(stats)
    }

    async fn create_order(&self, product_id: i64, quantity: i64) -> Result<Order, BackendError> {
        self.inner.create_order(product_id, quantity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use serde_json::json;

    struct FailStore;

    impl CacheStore for FailStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        fn del(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        fn del_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".to_string()))
        }
    }

    fn cached(ttl_secs: u64) -> (CachedBackend<MemoryBackend>, Arc<LruStore>) {
        let store = Arc::new(LruStore::new(64));
        let backend = CachedBackend::with_store(
            MemoryBackend::seeded(),
            store.clone(),
            Duration::from_secs(ttl_secs),
        );
        (backend, store)
    }

    #[test]
    fn test_lru_store_ttl_expiry() {
        let store = LruStore::new(4);
        store
            .set("k", json!(1), Duration::from_secs(0))
            .unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", json!(2), Duration::from_secs(60)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_lru_store_del_prefix() {
        let store = LruStore::new(8);
        let ttl = Duration::from_secs(60);
        store.set("products:list:all", json!([]), ttl).unwrap();
        store.set("products:list:еда", json!([]), ttl).unwrap();
        store.set("products:stats", json!({}), ttl).unwrap();

        store.del_prefix("products:list:").unwrap();
        assert_eq!(store.get("products:list:all").unwrap(), None);
        assert_eq!(store.get("products:list:еда").unwrap(), None);
        assert!(store.get("products:stats").unwrap().is_some());
    }

    #[test]
    fn test_list_key_normalized() {
        assert_eq!(
            CachedBackend::<MemoryBackend>::list_key(None),
            "products:list:all"
        );
        assert_eq!(
            CachedBackend::<MemoryBackend>::list_key(Some(" Электроника ")),
            "products:list:электроника"
        );
    }

    #[tokio::test]
    async fn test_read_through_hits_on_second_read() {
        let (backend, store) = cached(60);

        backend.list_products(None).await.unwrap();
        backend.list_products(None).await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_add_invalidates_list_and_stats() {
        let (backend, _store) = cached(60);

        // populate both cached reads
        assert_eq!(backend.list_products(None).await.unwrap().len(), 3);
        assert_eq!(backend.get_statistics().await.unwrap().count, 3);

        let created = backend
            .add_product(NewProduct::new("Мышка", 1500.0, "Электроника"))
            .await
            .unwrap();

        // both must miss and observe the new product
        assert_eq!(backend.list_products(None).await.unwrap().len(), 4);
        assert_eq!(backend.get_statistics().await.unwrap().count, 4);

        // the created entity was pre-populated by id
        let fetched = backend.get_product(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_failing_store_is_fail_open() {
        let backend = CachedBackend::with_store(
            MemoryBackend::seeded(),
            Arc::new(FailStore),
            Duration::from_secs(60),
        );

        assert_eq!(backend.list_products(None).await.unwrap().len(), 3);
        backend
            .add_product(NewProduct::new("Чай", 300.0, "Продукты"))
            .await
            .unwrap();
        assert_eq!(backend.list_products(None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_factory_failure_degrades_permanently() {
        let backend = CachedBackend::new(
            MemoryBackend::seeded(),
            Box::new(|| Err(CacheError::Unavailable("no cache configured".to_string()))),
            Duration::from_secs(60),
        );

        // factory is only consulted once; every call falls through
        assert_eq!(backend.list_products(None).await.unwrap().len(), 3);
        assert_eq!(backend.get_statistics().await.unwrap().count, 3);
        assert!(backend.state.lock().checked);
        assert!(backend.state.lock().store.is_none());
    }
}
