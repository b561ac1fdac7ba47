use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::backend::ProductBackend;
use crate::core::error::AgentError;
use crate::core::models::{NewProduct, Order, Product, Statistics};

use super::extractor::extract_intent;
use super::format;
use super::intent::Intent;
use super::normalizer::normalize_query;
use super::resolver;

/// What the act stage produced on success.
#[derive(Debug, Clone)]
pub enum ActResult {
    Products(Vec<Product>),
    Statistics(Statistics),
    Created(Product),
    Discount {
        product: Product,
        percent: f64,
        discounted_price: f64,
    },
    Order(Order),
    NoAction,
}

/// Act stage output: success and failure are mutually exclusive by
/// construction, so the format stage cannot observe both.
#[derive(Debug, Clone)]
pub enum ActOutput {
    Success(ActResult),
    Failure(String),
}

#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub answer: String,
    pub intent: String,
    pub params: Map<String, Value>,
}

pub fn calc_discount(price: f64, percent: f64) -> Result<f64, AgentError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(AgentError::Validation(
            "percent must be in [0, 100]".to_string(),
        ));
    }
    Ok(price * (1.0 - percent / 100.0))
}

/// Linear analyze -> act -> format pipeline over one backend handle. One
/// pass per query, no loops, no retries; `run` never fails.
pub struct Agent<B> {
    backend: B,
}

impl<B: ProductBackend> Agent<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Normalize the raw query and extract the intent.
    pub fn analyze(&self, query: &str) -> Intent {
        let normalized = normalize_query(query);
        let intent = extract_intent(&normalized);
        debug!("analyze: '{}' -> {:?}", normalized, intent.kind());
        intent
    }

    /// Dispatch the intent to exactly one backend capability. Category
    /// intents fetch the live category set first and resolve the requested
    /// category before the primary call; list-by-category writes the
    /// resolved name back into the intent. Backend failures are reduced to
    /// a string here and never escape.
    pub async fn act(&self, intent: Intent) -> (Intent, ActOutput) {
        match intent {
            Intent::ListProducts => {
                let output = self
                    .backend
                    .list_products(None)
                    .await
                    .map(ActResult::Products)
                    .map_err(AgentError::from);
                (Intent::ListProducts, to_output(output))
            }

            Intent::ListByCategory { category } => match self.backend.list_products(None).await {
                Ok(all) => {
                    let (filtered, resolved) = resolver::filter_by_category(&all, &category);
                    (
                        Intent::ListByCategory { category: resolved },
                        ActOutput::Success(ActResult::Products(filtered)),
                    )
                }
                Err(e) => {
                    warn!("list_by_category failed: {}", e);
                    (
                        Intent::ListByCategory { category },
                        ActOutput::Failure(AgentError::from(e).to_string()),
                    )
                }
            },

            Intent::GetStatistics => {
                let output = self
                    .backend
                    .get_statistics()
                    .await
                    .map(ActResult::Statistics)
                    .map_err(AgentError::from);
                (Intent::GetStatistics, to_output(output))
            }

            Intent::AddProduct {
                name,
                price,
                category,
                in_stock,
            } => {
                let output = self.add_product(&name, price, &category, in_stock).await;
                (
                    Intent::AddProduct {
                        name,
                        price,
                        category,
                        in_stock,
                    },
                    to_output(output),
                )
            }

            Intent::DiscountById {
                percent,
                product_id,
            } => {
                let output = self.discount_by_id(product_id, percent).await;
                (
                    Intent::DiscountById {
                        percent,
                        product_id,
                    },
                    to_output(output),
                )
            }

            Intent::CreateOrder {
                product_id,
                quantity,
            } => {
                let output = self
                    .backend
                    .create_order(product_id, quantity)
                    .await
                    .map(ActResult::Order)
                    .map_err(AgentError::from);
                (
                    Intent::CreateOrder {
                        product_id,
                        quantity,
                    },
                    to_output(output),
                )
            }

            Intent::Help => (Intent::Help, ActOutput::Success(ActResult::NoAction)),
        }
    }

    async fn add_product(
        &self,
        name: &str,
        price: f64,
        category: &str,
        in_stock: bool,
    ) -> Result<ActResult, AgentError> {
        // match the requested category against what already exists, so
        // "electronics"/"электр" lands in "Электроника" instead of forking
        // a new category
        let all = self.backend.list_products(None).await?;
        let known = resolver::known_categories(&all);
        let resolved = resolver::resolve_category(category, &known);

        let created = self
            .backend
            .add_product(NewProduct {
                name: name.to_string(),
                price,
                category: resolved,
                in_stock,
            })
            .await?;
        Ok(ActResult::Created(created))
    }

    async fn discount_by_id(&self, product_id: i64, percent: u32) -> Result<ActResult, AgentError> {
        let product = self.backend.get_product(product_id).await?;
        let percent = f64::from(percent);
        let discounted_price = calc_discount(product.price, percent)?;
        Ok(ActResult::Discount {
            product,
            percent,
            discounted_price,
        })
    }

    /// Public contract: always returns a well-formed answer, whatever the
    /// input.
    pub async fn run(&self, query: &str) -> AgentResponse {
        let intent = self.analyze(query);
        let (intent, output) = self.act(intent).await;
        let answer = format::render(&intent, &output);

        let kind: &'static str = intent.kind().into();
        info!("agent_done intent={}", kind);

        AgentResponse {
            answer,
            intent: kind.to_string(),
            params: intent.params(),
        }
    }
}

fn to_output(result: Result<ActResult, AgentError>) -> ActOutput {
    match result {
        Ok(value) => ActOutput::Success(value),
        Err(e) => {
            warn!("act failed: {}", e);
            ActOutput::Failure(e.to_string())
        }
    }
}
