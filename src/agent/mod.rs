pub mod extractor;
pub mod format;
pub mod intent;
pub mod normalizer;
pub mod pipeline;
pub mod resolver;

pub use extractor::extract_intent;
pub use intent::{Intent, IntentKind};
pub use normalizer::normalize_query;
pub use pipeline::{ActOutput, ActResult, Agent, AgentResponse, calc_discount};
pub use resolver::{filter_by_category, resolve_category};
