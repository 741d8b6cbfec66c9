//! In-memory implementations of the content type use cases.
//!
//! All services share one [`GraphStore`] so created entities are visible
//! across content types (a created comparison can be referenced by a
//! smart review section, a created paper by a literature list entry).

pub mod comparisons;
pub mod datasets;
pub mod literature_lists;
pub mod papers;
pub mod research_fields;
pub mod rosetta_stone;
pub mod smart_reviews;
pub mod store;
pub mod templates;
mod things;

use std::sync::Arc;

pub use comparisons::ComparisonService;
pub use datasets::DatasetService;
pub use literature_lists::LiteratureListService;
pub use papers::{ContributionService, PaperService};
pub use research_fields::ResearchFieldHierarchyService;
pub use rosetta_stone::RosettaStoneStatementService;
pub use smart_reviews::SmartReviewService;
pub use store::GraphStore;
pub use templates::TemplateInstanceService;

use crate::config::Config;

/// All content type services wired to one shared store.
pub struct Services {
    pub store: Arc<GraphStore>,
    pub papers: Arc<PaperService>,
    pub contributions: Arc<ContributionService>,
    pub comparisons: Arc<ComparisonService>,
    pub literature_lists: Arc<LiteratureListService>,
    pub smart_reviews: Arc<SmartReviewService>,
    pub rosetta_stone: Arc<RosettaStoneStatementService>,
    pub templates: Arc<TemplateInstanceService>,
    pub datasets: Arc<DatasetService>,
    pub research_fields: Arc<ResearchFieldHierarchyService>,
}

impl Services {
    /// Build the service set over a fresh store.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_store(Arc::new(GraphStore::new()), config)
    }

    /// Build the service set over an existing (possibly seeded) store.
    #[must_use]
    pub fn with_store(store: Arc<GraphStore>, config: &Config) -> Self {
        Self {
            papers: Arc::new(PaperService::new(Arc::clone(&store))),
            contributions: Arc::new(ContributionService::new(Arc::clone(&store))),
            comparisons: Arc::new(ComparisonService::new(Arc::clone(&store))),
            literature_lists: Arc::new(LiteratureListService::new(
                Arc::clone(&store),
                config.published_cache_ttl,
                config.published_cache_max_size,
            )),
            smart_reviews: Arc::new(SmartReviewService::new(
                Arc::clone(&store),
                config.published_cache_ttl,
                config.published_cache_max_size,
            )),
            rosetta_stone: Arc::new(RosettaStoneStatementService::new(Arc::clone(&store))),
            templates: Arc::new(TemplateInstanceService::new(Arc::clone(&store))),
            datasets: Arc::new(DatasetService::new(Arc::clone(&store))),
            research_fields: Arc::new(ResearchFieldHierarchyService::new(Arc::clone(&store))),
            store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThingId;
    use crate::usecases::{ComparisonUseCases, SmartReviewUseCases};
    use serde_json::json;

    #[tokio::test]
    async fn services_share_one_store() {
        use crate::models::ContributorId;

        let services = Services::new(&Config::for_testing());
        services.store.seed_research_field("R11", "Computer Science", None).await;

        let request = serde_json::from_value(json!({
            "title": "Shared store comparison",
            "description": "Comparison visible to other services",
            "research_fields": ["R11"],
            "contributions": []
        }))
        .unwrap();
        let comparison_id =
            services.comparisons.create(ContributorId::UNKNOWN, request).await.unwrap();

        let review = serde_json::from_value(json!({
            "title": "Review referencing the comparison",
            "research_fields": ["R11"],
            "sections": [{
                "type": "comparison",
                "heading": "The comparison",
                "comparison": comparison_id
            }]
        }))
        .unwrap();
        let review_id =
            services.smart_reviews.create(ContributorId::UNKNOWN, review).await.unwrap();
        assert_ne!(review_id, ThingId::new("R0").unwrap());
    }
}
