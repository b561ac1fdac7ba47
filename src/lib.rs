#![allow(dead_code)]

pub mod agent;
pub mod backend;
pub mod core;

pub use agent::{Agent, AgentResponse, Intent, IntentKind};
pub use backend::{BackendError, CachedBackend, HttpBackend, MemoryBackend, ProductBackend};
pub use crate::core::config::AgentConfig;
pub use crate::core::error::{AgentError, Result};
pub use crate::core::models::{NewProduct, Order, Product, Statistics};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CACHE_TTL: u64 = 60;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
