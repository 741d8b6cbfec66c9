//! In-memory smart review service.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ContributorId, HeadVersion, LabeledObject, Page, PageRequest, PublishedContent,
    PublishedVersion, ResourceReference, SmartReview, SmartReviewSection, ThingId, VersionInfo,
    Visibility,
};
use crate::usecases::commands::{
    CreateSmartReviewRequest, PublishContentRequest, SmartReviewSectionRequest,
    UpdateSmartReviewRequest,
};
use crate::usecases::filters::ContentFilters;
use crate::usecases::SmartReviewUseCases;

use super::store::{now, GraphStore, StoreInner};

pub struct SmartReviewService {
    store: Arc<GraphStore>,
    published_cache: Cache<(ThingId, ThingId), PublishedContent>,
}

impl SmartReviewService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>, cache_ttl: Duration, cache_max_size: u64) -> Self {
        let published_cache = Cache::builder()
            .max_capacity(cache_max_size)
            .time_to_live(cache_ttl.max(Duration::from_millis(1)))
            .build();
        Self { store, published_cache }
    }

    fn resource_reference(inner: &StoreInner, id: &ThingId) -> ApiResult<ResourceReference> {
        inner
            .resources
            .get(id)
            .map(|resource| ResourceReference {
                id: resource.id.clone(),
                label: resource.label.clone(),
                classes: resource.classes.clone(),
            })
            .ok_or_else(|| ApiError::ResourceNotFound(id.clone()))
    }

    fn resolve_section(
        store: &GraphStore,
        inner: &StoreInner,
        request: &SmartReviewSectionRequest,
    ) -> ApiResult<SmartReviewSection> {
        let id = store.next_id("R");
        match request {
            SmartReviewSectionRequest::Comparison { heading, comparison } => {
                let comparison = comparison
                    .as_ref()
                    .map(|comparison_id| {
                        inner
                            .comparisons
                            .get(comparison_id)
                            .map(|found| ResourceReference {
                                id: found.id.clone(),
                                label: found.title.clone(),
                                classes: vec![ThingId::new("Comparison").expect("valid thing id")],
                            })
                            .ok_or_else(|| ApiError::ComparisonNotFound(comparison_id.clone()))
                    })
                    .transpose()?;
                Ok(SmartReviewSection::Comparison { id, heading: heading.clone(), comparison })
            }
            SmartReviewSectionRequest::Visualization { heading, visualization } => {
                let visualization = visualization
                    .as_ref()
                    .map(|v| Self::resource_reference(inner, v))
                    .transpose()?;
                Ok(SmartReviewSection::Visualization {
                    id,
                    heading: heading.clone(),
                    visualization,
                })
            }
            SmartReviewSectionRequest::Resource { heading, resource } => {
                let resource =
                    resource.as_ref().map(|r| Self::resource_reference(inner, r)).transpose()?;
                Ok(SmartReviewSection::Resource { id, heading: heading.clone(), resource })
            }
            SmartReviewSectionRequest::Predicate { heading, predicate } => {
                let predicate = predicate
                    .as_ref()
                    .map(|p| {
                        inner
                            .predicates
                            .get(p)
                            .map(|record| LabeledObject { id: p.clone(), label: record.label.clone() })
                            .ok_or_else(|| ApiError::ResourceNotFound(p.clone()))
                    })
                    .transpose()?;
                Ok(SmartReviewSection::Predicate { id, heading: heading.clone(), predicate })
            }
            SmartReviewSectionRequest::Ontology { heading, entities, predicates } => {
                let entities = entities
                    .iter()
                    .map(|entity| {
                        inner
                            .thing_reference(entity)
                            .ok_or_else(|| ApiError::ResourceNotFound(entity.clone()))
                    })
                    .collect::<ApiResult<Vec<_>>>()?;
                let predicates = predicates
                    .iter()
                    .map(|p| {
                        inner
                            .predicates
                            .get(p)
                            .map(|record| LabeledObject { id: p.clone(), label: record.label.clone() })
                            .ok_or_else(|| ApiError::ResourceNotFound(p.clone()))
                    })
                    .collect::<ApiResult<Vec<_>>>()?;
                Ok(SmartReviewSection::Ontology { id, heading: heading.clone(), entities, predicates })
            }
            SmartReviewSectionRequest::Text { heading, classes, text } => {
                Ok(SmartReviewSection::Text {
                    id,
                    heading: heading.clone(),
                    classes: classes.iter().cloned().collect(),
                    text: text.clone(),
                })
            }
        }
    }

    fn resolve_research_fields(
        inner: &StoreInner,
        ids: &[ThingId],
    ) -> ApiResult<Vec<LabeledObject>> {
        ids.iter()
            .map(|id| {
                if inner.is_research_field(id) {
                    Ok(inner.labeled(id).unwrap_or_else(|| LabeledObject {
                        id: id.clone(),
                        label: id.to_string(),
                    }))
                } else {
                    Err(ApiError::ResearchFieldNotFound(id.clone()))
                }
            })
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn acknowledge(review: &mut SmartReview, contributor: ContributorId) {
        review.acknowledgements.entry(contributor).or_insert(0.0);
        let share = 1.0 / review.acknowledgements.len() as f64;
        for value in review.acknowledgements.values_mut() {
            *value = share;
        }
    }

    fn matches(inner: &StoreInner, review: &SmartReview, filters: &ContentFilters) -> bool {
        let visible = filters
            .visibility
            .map_or(review.visibility != Visibility::Deleted, |filter| {
                filter.matches(review.visibility)
            });
        if !visible {
            return false;
        }
        if let Some(title) = &filters.title {
            let matched = if filters.exact {
                review.title.eq_ignore_ascii_case(title)
            } else {
                review.title.to_lowercase().contains(&title.to_lowercase())
            };
            if !matched {
                return false;
            }
        }
        if filters.created_by.is_some_and(|creator| review.created_by != creator) {
            return false;
        }
        if filters.created_at_start.is_some_and(|start| review.created_at < start) {
            return false;
        }
        if filters.created_at_end.is_some_and(|end| review.created_at > end) {
            return false;
        }
        if let Some(observatory) = filters.observatory_id {
            if !review.observatories.contains(&observatory) {
                return false;
            }
        }
        if let Some(organization) = filters.organization_id {
            if !review.organizations.contains(&organization) {
                return false;
            }
        }
        if let Some(field) = &filters.research_field {
            let accepted = if filters.include_subfields {
                inner.subfields_closure(field)
            } else {
                std::iter::once(field.clone()).collect()
            };
            if !review.research_fields.iter().any(|f| accepted.contains(&f.id)) {
                return false;
            }
        }
        if let Some(sdg) = &filters.sdg {
            if !review.sdgs.iter().any(|s| &s.id == sdg) {
                return false;
            }
        }
        if let Some(published) = filters.published {
            if review.versions.published.is_empty() == published {
                return false;
            }
        }
        true
    }

    fn referenced_ids(sections: &[SmartReviewSection]) -> BTreeSet<ThingId> {
        let mut ids = BTreeSet::new();
        for section in sections {
            match section {
                SmartReviewSection::Comparison { comparison, .. } => {
                    ids.extend(comparison.iter().map(|c| c.id.clone()));
                }
                SmartReviewSection::Visualization { visualization, .. } => {
                    ids.extend(visualization.iter().map(|v| v.id.clone()));
                }
                SmartReviewSection::Resource { resource, .. } => {
                    ids.extend(resource.iter().map(|r| r.id.clone()));
                }
                SmartReviewSection::Ontology { entities, .. } => {
                    ids.extend(entities.iter().filter_map(|e| e.id().cloned()));
                }
                SmartReviewSection::Predicate { .. } | SmartReviewSection::Text { .. } => {}
            }
        }
        ids
    }
}

#[async_trait]
impl SmartReviewUseCases for SmartReviewService {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<SmartReview> {
        let inner = self.store.read().await;
        inner
            .smart_reviews
            .get(id)
            .or_else(|| inner.published_review_versions.get(id))
            .cloned()
            .ok_or_else(|| ApiError::SmartReviewNotFound(id.clone()))
    }

    async fn find_all(
        &self,
        filters: &ContentFilters,
        page: PageRequest,
    ) -> ApiResult<Page<SmartReview>> {
        let inner = self.store.read().await;
        let reviews = inner
            .smart_reviews
            .values()
            .filter(|review| Self::matches(&inner, review, filters))
            .cloned()
            .collect();
        Ok(Page::from_vec(reviews, page))
    }

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateSmartReviewRequest,
    ) -> ApiResult<ThingId> {
        if request.title.trim().is_empty() {
            return Err(ApiError::validation("title", "Title must not be blank."));
        }
        if request.observatories.len() > 1 {
            return Err(ApiError::OnlyOneObservatoryAllowed);
        }
        if request.organizations.len() > 1 {
            return Err(ApiError::OnlyOneOrganizationAllowed);
        }
        let mut inner = self.store.write().await;
        let research_fields = Self::resolve_research_fields(&inner, &request.research_fields)?;
        let sections = request
            .sections
            .iter()
            .map(|section| Self::resolve_section(&self.store, &inner, section))
            .collect::<ApiResult<Vec<_>>>()?;
        let sdgs = request
            .sdgs
            .iter()
            .map(|id| LabeledObject {
                id: id.clone(),
                label: inner.label_of(id).unwrap_or_else(|| id.to_string()),
            })
            .collect();

        let id = self.store.next_id("R");
        let created_at = now();
        let mut review = SmartReview {
            id: id.clone(),
            title: request.title.clone(),
            research_fields,
            identifiers: crate::models::IdentifierMap::new(),
            authors: request.authors,
            versions: VersionInfo {
                head: HeadVersion {
                    id: id.clone(),
                    label: request.title,
                    created_at,
                    created_by: contributor,
                },
                published: vec![],
            },
            sdgs,
            observatories: request.observatories,
            organizations: request.organizations,
            extraction_method: request.extraction_method,
            created_at,
            created_by: contributor,
            visibility: Visibility::Default,
            unlisted_by: None,
            published: false,
            sections,
            references: request.references,
            acknowledgements: std::collections::BTreeMap::new(),
            json_class: "smart-review".to_string(),
        };
        Self::acknowledge(&mut review, contributor);
        inner.smart_reviews.insert(id.clone(), review);
        tracing::info!(smart_review_id = %id, "smart review created");
        Ok(id)
    }

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateSmartReviewRequest,
    ) -> ApiResult<()> {
        if request.observatories.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneObservatoryAllowed);
        }
        if request.organizations.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneOrganizationAllowed);
        }
        let mut inner = self.store.write().await;
        if !inner.smart_reviews.contains_key(id) {
            return Err(ApiError::SmartReviewNotFound(id.clone()));
        }
        let research_fields = request
            .research_fields
            .as_deref()
            .map(|fields| Self::resolve_research_fields(&inner, fields))
            .transpose()?;
        let sections = request
            .sections
            .as_deref()
            .map(|sections| {
                sections
                    .iter()
                    .map(|section| Self::resolve_section(&self.store, &inner, section))
                    .collect::<ApiResult<Vec<_>>>()
            })
            .transpose()?;
        let sdgs = request.sdgs.as_ref().map(|ids| {
            ids.iter()
                .map(|sdg| LabeledObject {
                    id: sdg.clone(),
                    label: inner.label_of(sdg).unwrap_or_else(|| sdg.to_string()),
                })
                .collect()
        });

        let review = inner
            .smart_reviews
            .get_mut(id)
            .ok_or_else(|| ApiError::SmartReviewNotFound(id.clone()))?;
        if let Some(title) = request.title {
            review.title = title.clone();
            review.versions.head.label = title;
        }
        if let Some(fields) = research_fields {
            review.research_fields = fields;
        }
        if let Some(authors) = request.authors {
            review.authors = authors;
        }
        if let Some(sdgs) = sdgs {
            review.sdgs = sdgs;
        }
        if let Some(observatories) = request.observatories {
            review.observatories = observatories;
        }
        if let Some(organizations) = request.organizations {
            review.organizations = organizations;
        }
        if let Some(sections) = sections {
            review.sections = sections;
        }
        if let Some(references) = request.references {
            review.references = references;
        }
        if let Some(visibility) = request.visibility {
            review.visibility = visibility;
            review.unlisted_by = (visibility == Visibility::Unlisted).then_some(contributor);
        }
        Self::acknowledge(review, contributor);
        Ok(())
    }

    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishContentRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        let review =
            inner.smart_reviews.get(id).ok_or_else(|| ApiError::SmartReviewNotFound(id.clone()))?;
        let label = review.title.clone();
        let referenced = Self::referenced_ids(&review.sections);
        let version_id = self.store.next_id("R");
        let version = PublishedVersion {
            id: version_id.clone(),
            label,
            created_at: now(),
            created_by: contributor,
            changelog: Some(request.changelog),
        };
        // Freeze the review state under the version id; later edits to
        // the head must not show through the published version.
        let snapshot = inner.smart_reviews.get_mut(id).map(|review| {
            review.versions.published.insert(0, version);
            let mut snapshot = review.clone();
            snapshot.id = version_id.clone();
            snapshot.published = true;
            snapshot
        });
        if let Some(snapshot) = snapshot {
            inner.published_review_versions.insert(version_id.clone(), snapshot);
        }
        inner.published_contents.entry(id.clone()).or_default().extend(referenced);
        tracing::info!(smart_review_id = %id, version_id = %version_id, "smart review published");
        Ok(version_id)
    }

    async fn create_section(
        &self,
        contributor: ContributorId,
        review_id: &ThingId,
        index: Option<usize>,
        request: SmartReviewSectionRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        if !inner.smart_reviews.contains_key(review_id) {
            return Err(ApiError::SmartReviewNotFound(review_id.clone()));
        }
        let section = Self::resolve_section(&self.store, &inner, &request)?;
        let section_id = section.id().clone();
        let review = inner
            .smart_reviews
            .get_mut(review_id)
            .ok_or_else(|| ApiError::SmartReviewNotFound(review_id.clone()))?;
        match index {
            Some(index) if index < review.sections.len() => review.sections.insert(index, section),
            _ => review.sections.push(section),
        }
        Self::acknowledge(review, contributor);
        Ok(section_id)
    }

    async fn update_section(
        &self,
        contributor: ContributorId,
        review_id: &ThingId,
        section_id: &ThingId,
        request: SmartReviewSectionRequest,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        if !inner.smart_reviews.contains_key(review_id) {
            return Err(ApiError::SmartReviewNotFound(review_id.clone()));
        }
        let replacement = Self::resolve_section(&self.store, &inner, &request)?;
        let review = inner
            .smart_reviews
            .get_mut(review_id)
            .ok_or_else(|| ApiError::SmartReviewNotFound(review_id.clone()))?;
        let position = review
            .sections
            .iter()
            .position(|section| section.id() == section_id)
            .ok_or_else(|| ApiError::SmartReviewSectionNotFound(section_id.clone()))?;
        review.sections[position] = with_id(replacement, section_id.clone());
        Self::acknowledge(review, contributor);
        Ok(())
    }

    async fn delete_section(
        &self,
        contributor: ContributorId,
        review_id: &ThingId,
        section_id: &ThingId,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        let review = inner
            .smart_reviews
            .get_mut(review_id)
            .ok_or_else(|| ApiError::SmartReviewNotFound(review_id.clone()))?;
        let before = review.sections.len();
        review.sections.retain(|section| section.id() != section_id);
        if review.sections.len() == before {
            return Err(ApiError::SmartReviewSectionNotFound(section_id.clone()));
        }
        Self::acknowledge(review, contributor);
        Ok(())
    }

    async fn find_published_content(
        &self,
        review_id: &ThingId,
        content_id: &ThingId,
    ) -> ApiResult<PublishedContent> {
        let key = (review_id.clone(), content_id.clone());
        if let Some(content) = self.published_cache.get(&key).await {
            return Ok(content);
        }
        let inner = self.store.read().await;
        if !inner.smart_reviews.contains_key(review_id) {
            return Err(ApiError::SmartReviewNotFound(review_id.clone()));
        }
        let referenced = inner
            .published_contents
            .get(review_id)
            .is_some_and(|ids| ids.contains(content_id));
        if !referenced {
            return Err(ApiError::PublishedContentNotFound(content_id.clone()));
        }
        let content = if let Some(paper) = inner.papers.get(content_id) {
            PublishedContent::Paper(Box::new(paper.clone()))
        } else if let Some(resource) = inner.resources.get(content_id) {
            PublishedContent::Resource(resource.clone())
        } else {
            return Err(ApiError::PublishedContentNotFound(content_id.clone()));
        };
        drop(inner);
        self.published_cache.insert(key, content.clone()).await;
        Ok(content)
    }
}

/// Replace a freshly resolved section's id with the stored one.
fn with_id(section: SmartReviewSection, id: ThingId) -> SmartReviewSection {
    match section {
        SmartReviewSection::Comparison { heading, comparison, .. } => {
            SmartReviewSection::Comparison { id, heading, comparison }
        }
        SmartReviewSection::Visualization { heading, visualization, .. } => {
            SmartReviewSection::Visualization { id, heading, visualization }
        }
        SmartReviewSection::Resource { heading, resource, .. } => {
            SmartReviewSection::Resource { id, heading, resource }
        }
        SmartReviewSection::Predicate { heading, predicate, .. } => {
            SmartReviewSection::Predicate { id, heading, predicate }
        }
        SmartReviewSection::Ontology { heading, entities, predicates, .. } => {
            SmartReviewSection::Ontology { id, heading, entities, predicates }
        }
        SmartReviewSection::Text { heading, classes, text, .. } => {
            SmartReviewSection::Text { id, heading, classes, text }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> SmartReviewService {
        let store = Arc::new(GraphStore::new());
        store.seed_research_field("R12", "Computer Science", None).await;
        store.seed_predicate("P1", "predicate label").await;
        store.seed_resource("R100", "ontology entity", &[]).await;
        SmartReviewService::new(store, Duration::from_secs(60), 100)
    }

    fn create_request(title: &str) -> CreateSmartReviewRequest {
        serde_json::from_value(json!({
            "title": title,
            "research_fields": ["R12"],
            "sections": [
                { "type": "text", "heading": "Introduction", "text": "intro" },
                {
                    "type": "ontology",
                    "heading": "Ontology",
                    "entities": ["R100"],
                    "predicates": ["P1"]
                }
            ],
            "references": ["@misc{R1234,title={Title}}"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_resolves_sections() {
        let service = seeded().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example Review"))
            .await
            .unwrap();
        let review = service.find_by_id(&id).await.unwrap();
        assert_eq!(review.sections.len(), 2);
        assert_eq!(review.references.len(), 1);
        match &review.sections[1] {
            SmartReviewSection::Ontology { entities, predicates, .. } => {
                assert_eq!(entities.len(), 1);
                assert_eq!(predicates[0].label, "predicate label");
            }
            _ => panic!("expected ontology section"),
        }
    }

    #[tokio::test]
    async fn unknown_comparison_in_section_is_rejected() {
        let service = seeded().await;
        let mut request = create_request("Example Review");
        request.sections.push(
            serde_json::from_value(json!({
                "type": "comparison", "heading": "Comparison", "comparison": "R404"
            }))
            .unwrap(),
        );
        let result = service.create(ContributorId::UNKNOWN, request).await;
        assert!(matches!(result, Err(ApiError::ComparisonNotFound(_))));
    }

    #[tokio::test]
    async fn publish_exposes_ontology_entities() {
        let service = seeded().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example Review"))
            .await
            .unwrap();
        service
            .publish(
                ContributorId::UNKNOWN,
                &id,
                PublishContentRequest { changelog: "initial".to_string() },
            )
            .await
            .unwrap();
        let entity = ThingId::new("R100").unwrap();
        let content = service.find_published_content(&id, &entity).await.unwrap();
        assert!(matches!(content, PublishedContent::Resource(_)));
    }

    #[tokio::test]
    async fn published_version_is_frozen() {
        let service = seeded().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example Review"))
            .await
            .unwrap();
        let version_id = service
            .publish(
                ContributorId::UNKNOWN,
                &id,
                PublishContentRequest { changelog: "initial".to_string() },
            )
            .await
            .unwrap();

        service
            .update(
                ContributorId::UNKNOWN,
                &id,
                serde_json::from_value(json!({ "title": "Renamed", "sections": [] })).unwrap(),
            )
            .await
            .unwrap();

        let head = service.find_by_id(&id).await.unwrap();
        assert_eq!(head.title, "Renamed");
        assert!(head.sections.is_empty());

        let frozen = service.find_by_id(&version_id).await.unwrap();
        assert_eq!(frozen.id, version_id);
        assert_eq!(frozen.title, "Example Review");
        assert_eq!(frozen.sections.len(), 2);
        assert!(frozen.published);
    }
}
