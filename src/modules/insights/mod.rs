pub mod model;
pub mod provider;

pub use model::{summarize, Insight, InsightPriority, ItemSummary};
pub use provider::{gather_insights, InsightError, InsightProvider, LocalAdvisor};
