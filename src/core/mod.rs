pub mod config;
pub mod error;
pub mod models;

pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use models::{NewProduct, Order, Product, Statistics};
