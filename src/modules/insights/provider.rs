use lazy_static::lazy_static;
use log::warn;

use super::model::{Insight, InsightPriority, ItemSummary};

/// Errors a provider can surface. All of them are recovered by substituting
/// the fallback insights.
#[derive(Debug)]
pub enum InsightError {
    Unavailable(String),
    MalformedResponse(String),
}

impl std::fmt::Display for InsightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightError::Unavailable(msg) => write!(f, "Insight provider unavailable: {}", msg),
            InsightError::MalformedResponse(msg) => {
                write!(f, "Malformed insight response: {}", msg)
            }
        }
    }
}

/// Seam for anything that can turn item summaries into insight JSON.
/// A remote generative model sits behind this trait in deployments that
/// have one; `LocalAdvisor` covers everything else.
pub trait InsightProvider {
    /// Produce a JSON array of `{title, description, priority}` objects
    fn analyze(&self, items: &[ItemSummary]) -> Result<String, InsightError>;
}

lazy_static! {
    static ref FALLBACK_INSIGHTS: Vec<Insight> = vec![
        Insight {
            title: "Stock tip".to_string(),
            description: "Keep a reserve of staples so work never stops for a refill."
                .to_string(),
            priority: InsightPriority::Medium,
        },
        Insight {
            title: "Review thresholds".to_string(),
            description: "Revisit minimum-stock levels for your most-used materials."
                .to_string(),
            priority: InsightPriority::Low,
        },
    ];
}

/// The fixed list substituted whenever a provider fails
pub fn fallback_insights() -> Vec<Insight> {
    FALLBACK_INSIGHTS.clone()
}

/// Parse a provider response into insights
pub fn parse_insights(raw: &str) -> Result<Vec<Insight>, InsightError> {
    serde_json::from_str(raw).map_err(|e| InsightError::MalformedResponse(e.to_string()))
}

/// Ask a provider for insights; any failure substitutes the fallback list
pub fn gather_insights(provider: &dyn InsightProvider, items: &[ItemSummary]) -> Vec<Insight> {
    let raw = match provider.analyze(items) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Insight provider failed, using fallback: {}", e);
            return fallback_insights();
        }
    };
    match parse_insights(&raw) {
        Ok(insights) => insights,
        Err(e) => {
            warn!("Insight response unreadable, using fallback: {}", e);
            fallback_insights()
        }
    }
}

/// Offline provider deriving insights from the summaries themselves
pub struct LocalAdvisor;

impl InsightProvider for LocalAdvisor {
    fn analyze(&self, items: &[ItemSummary]) -> Result<String, InsightError> {
        let mut insights = Vec::new();

        let exhausted: Vec<&str> = items
            .iter()
            .filter(|i| i.quantity == 0)
            .map(|i| i.name.as_str())
            .collect();
        if !exhausted.is_empty() {
            insights.push(Insight {
                title: "Out of stock".to_string(),
                description: format!("Restock now: {}.", exhausted.join(", ")),
                priority: InsightPriority::High,
            });
        }

        let scarce: Vec<&str> = items
            .iter()
            .filter(|i| i.quantity > 0 && i.quantity <= 2)
            .map(|i| i.name.as_str())
            .collect();
        if !scarce.is_empty() {
            insights.push(Insight {
                title: "Running low".to_string(),
                description: format!("Only a couple left of: {}.", scarce.join(", ")),
                priority: InsightPriority::Medium,
            });
        }

        if insights.is_empty() && !items.is_empty() {
            insights.push(Insight {
                title: "Healthy stock".to_string(),
                description: format!(
                    "All {} catalogued materials have comfortable quantities.",
                    items.len()
                ),
                priority: InsightPriority::Low,
            });
        }

        serde_json::to_string(&insights).map_err(|e| InsightError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::inventory::model::Category;

    struct BrokenProvider;
    impl InsightProvider for BrokenProvider {
        fn analyze(&self, _items: &[ItemSummary]) -> Result<String, InsightError> {
            Err(InsightError::Unavailable("no network".to_string()))
        }
    }

    struct GarbageProvider;
    impl InsightProvider for GarbageProvider {
        fn analyze(&self, _items: &[ItemSummary]) -> Result<String, InsightError> {
            Ok("this is not json".to_string())
        }
    }

    fn summary(name: &str, quantity: u32) -> ItemSummary {
        ItemSummary {
            name: name.to_string(),
            quantity,
            category: Category::Other,
        }
    }

    #[test]
    fn test_provider_failure_substitutes_fallback() {
        let insights = gather_insights(&BrokenProvider, &[summary("Pens", 3)]);
        assert_eq!(insights, fallback_insights());
        assert!(!insights.is_empty());
    }

    #[test]
    fn test_unparseable_response_substitutes_fallback() {
        let insights = gather_insights(&GarbageProvider, &[summary("Pens", 3)]);
        assert_eq!(insights, fallback_insights());
    }

    #[test]
    fn test_parse_valid_payload() {
        let raw = r#"[{"title":"t","description":"d","priority":"high"}]"#;
        let insights = parse_insights(raw).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].priority, InsightPriority::High);
    }

    #[test]
    fn test_local_advisor_flags_exhausted_items() {
        let insights = gather_insights(
            &LocalAdvisor,
            &[summary("Staples", 0), summary("Pens", 10)],
        );
        assert!(insights
            .iter()
            .any(|i| i.priority == InsightPriority::High && i.description.contains("Staples")));
    }

    #[test]
    fn test_local_advisor_healthy_stock() {
        let insights = gather_insights(&LocalAdvisor, &[summary("Pens", 10)]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].priority, InsightPriority::Low);
    }
}
