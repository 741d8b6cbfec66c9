//! In-memory benchmark and dataset lookup service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::models::{BenchmarkSummary, Dataset, LabeledObject, Page, PageRequest, ThingId};
use crate::usecases::DatasetUseCases;

use super::store::GraphStore;

pub struct DatasetService {
    store: Arc<GraphStore>,
}

impl DatasetService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DatasetUseCases for DatasetService {
    async fn find_datasets_by_research_problem(
        &self,
        problem_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<Dataset>> {
        let inner = self.store.read().await;
        if !inner.research_problems.contains_key(problem_id) {
            return Err(ApiError::ResearchProblemNotFound(problem_id.clone()));
        }
        let datasets = inner.problem_datasets.get(problem_id).cloned().unwrap_or_default();
        Ok(Page::from_vec(datasets, page))
    }

    async fn find_research_problems_by_dataset(
        &self,
        dataset_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<LabeledObject>> {
        let inner = self.store.read().await;
        let problems = inner
            .dataset_problems
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| ApiError::DatasetNotFound(dataset_id.clone()))?;
        Ok(Page::from_vec(problems, page))
    }

    async fn summaries_by_research_field(
        &self,
        research_field_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<BenchmarkSummary>> {
        let inner = self.store.read().await;
        if !inner.is_research_field(research_field_id) {
            return Err(ApiError::ResearchFieldNotFound(research_field_id.clone()));
        }
        let summaries = inner
            .benchmarks
            .iter()
            .filter(|(field, _)| field == research_field_id)
            .map(|(_, summary)| summary.clone())
            .collect();
        Ok(Page::from_vec(summaries, page))
    }

    async fn summaries(&self, page: PageRequest) -> ApiResult<Page<BenchmarkSummary>> {
        let inner = self.store.read().await;
        let summaries = inner.benchmarks.iter().map(|(_, summary)| summary.clone()).collect();
        Ok(Page::from_vec(summaries, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(id: &str, label: &str) -> Dataset {
        Dataset {
            id: ThingId::new(id).unwrap(),
            label: label.to_string(),
            total_papers: 3,
            total_models: 2,
            total_codes: 1,
        }
    }

    fn summary(problem_id: &str, label: &str) -> BenchmarkSummary {
        BenchmarkSummary {
            research_problem: LabeledObject {
                id: ThingId::new(problem_id).unwrap(),
                label: label.to_string(),
            },
            research_fields: vec![],
            total_papers: 5,
            total_datasets: 2,
            total_codes: 4,
        }
    }

    async fn seeded() -> DatasetService {
        let store = Arc::new(GraphStore::new());
        store.seed_research_field("R11", "Machine Learning", None).await;
        store
            .seed_research_problem(
                "R456",
                "Question Answering",
                vec![dataset("R789", "SQuAD"), dataset("R790", "HotpotQA")],
            )
            .await;
        store.seed_benchmark("R11", summary("R456", "Question Answering")).await;
        DatasetService::new(store)
    }

    #[tokio::test]
    async fn datasets_by_problem() {
        let service = seeded().await;
        let problem = ThingId::new("R456").unwrap();
        let page = service
            .find_datasets_by_research_problem(&problem, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[0].label, "SQuAD");
    }

    #[tokio::test]
    async fn unknown_problem_is_an_error() {
        let service = seeded().await;
        let problem = ThingId::new("R404").unwrap();
        let result =
            service.find_datasets_by_research_problem(&problem, PageRequest::default()).await;
        assert!(matches!(result, Err(ApiError::ResearchProblemNotFound(_))));
    }

    #[tokio::test]
    async fn problems_by_dataset() {
        let service = seeded().await;
        let dataset = ThingId::new("R789").unwrap();
        let page = service
            .find_research_problems_by_dataset(&dataset, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].label, "Question Answering");
    }

    #[tokio::test]
    async fn summaries_scoped_to_field() {
        let service = seeded().await;
        let field = ThingId::new("R11").unwrap();
        let scoped =
            service.summaries_by_research_field(&field, PageRequest::default()).await.unwrap();
        assert_eq!(scoped.page.total_elements, 1);

        let all = service.summaries(PageRequest::default()).await.unwrap();
        assert_eq!(all.page.total_elements, 1);

        let missing = ThingId::new("R404").unwrap();
        let result = service.summaries_by_research_field(&missing, PageRequest::default()).await;
        assert!(matches!(result, Err(ApiError::ResearchFieldNotFound(_))));
    }
}
