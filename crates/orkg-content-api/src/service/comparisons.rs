//! In-memory comparison service, including related resources and figures.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Comparison, ComparisonRelatedFigure, ComparisonRelatedResource, ContributorId, LabeledObject,
    Page, PageRequest, PublicationInfo, PublishedVersion, ThingId, Visibility,
};
use crate::usecases::commands::{
    CreateComparisonRelatedFigureRequest, CreateComparisonRelatedResourceRequest,
    CreateComparisonRequest, PublishComparisonRequest, UpdateComparisonRequest,
};
use crate::usecases::filters::ContentFilters;
use crate::usecases::ComparisonUseCases;

use super::store::{now, GraphStore, StoreInner};

pub struct ComparisonService {
    store: Arc<GraphStore>,
}

impl ComparisonService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
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

    fn resolve_contributions(
        inner: &StoreInner,
        ids: &[ThingId],
    ) -> ApiResult<Vec<LabeledObject>> {
        ids.iter()
            .map(|id| {
                inner
                    .contributions
                    .get(id)
                    .map(|contribution| LabeledObject {
                        id: id.clone(),
                        label: contribution.label.clone(),
                    })
                    .ok_or_else(|| ApiError::ContributionNotFound(id.clone()))
            })
            .collect()
    }

    fn resolve_sdgs(inner: &StoreInner, ids: &std::collections::BTreeSet<ThingId>) -> Vec<LabeledObject> {
        ids.iter()
            .map(|id| LabeledObject {
                id: id.clone(),
                label: inner.label_of(id).unwrap_or_else(|| id.to_string()),
            })
            .collect()
    }

    fn matches(inner: &StoreInner, comparison: &Comparison, filters: &ContentFilters) -> bool {
        let visible = filters
            .visibility
            .map_or(comparison.visibility != Visibility::Deleted, |filter| {
                filter.matches(comparison.visibility)
            });
        if !visible {
            return false;
        }
        if let Some(title) = &filters.title {
            let matched = if filters.exact {
                comparison.title.eq_ignore_ascii_case(title)
            } else {
                comparison.title.to_lowercase().contains(&title.to_lowercase())
            };
            if !matched {
                return false;
            }
        }
        if filters.created_by.is_some_and(|creator| comparison.created_by != creator) {
            return false;
        }
        if filters.created_at_start.is_some_and(|start| comparison.created_at < start) {
            return false;
        }
        if filters.created_at_end.is_some_and(|end| comparison.created_at > end) {
            return false;
        }
        if let Some(observatory) = filters.observatory_id {
            if !comparison.observatories.contains(&observatory) {
                return false;
            }
        }
        if let Some(organization) = filters.organization_id {
            if !comparison.organizations.contains(&organization) {
                return false;
            }
        }
        if let Some(field) = &filters.research_field {
            let accepted = if filters.include_subfields {
                inner.subfields_closure(field)
            } else {
                std::iter::once(field.clone()).collect()
            };
            if !comparison.research_fields.iter().any(|f| accepted.contains(&f.id)) {
                return false;
            }
        }
        if let Some(sdg) = &filters.sdg {
            if !comparison.sdgs.iter().any(|s| &s.id == sdg) {
                return false;
            }
        }
        if let Some(published) = filters.published {
            if comparison.versions.is_empty() == published {
                return false;
            }
        }
        true
    }

    async fn require_comparison(&self, id: &ThingId) -> ApiResult<()> {
        if self.store.read().await.comparisons.contains_key(id) {
            Ok(())
        } else {
            Err(ApiError::ComparisonNotFound(id.clone()))
        }
    }
}

#[async_trait]
impl ComparisonUseCases for ComparisonService {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<Comparison> {
        let inner = self.store.read().await;
        inner
            .comparisons
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::ComparisonNotFound(id.clone()))
    }

    async fn find_all(
        &self,
        filters: &ContentFilters,
        page: PageRequest,
    ) -> ApiResult<Page<Comparison>> {
        let inner = self.store.read().await;
        let comparisons = inner
            .comparisons
            .values()
            .filter(|comparison| Self::matches(&inner, comparison, filters))
            .cloned()
            .collect();
        Ok(Page::from_vec(comparisons, page))
    }

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateComparisonRequest,
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
        let contributions = Self::resolve_contributions(&inner, &request.contributions)?;
        let sdgs = Self::resolve_sdgs(&inner, &request.sdgs);

        let id = self.store.next_id("R");
        let comparison = Comparison {
            id: id.clone(),
            title: request.title,
            description: Some(request.description),
            research_fields,
            identifiers: crate::models::IdentifierMap::new(),
            publication_info: PublicationInfo::default(),
            authors: request.authors,
            sdgs,
            contributions,
            visualizations: vec![],
            related_figures: vec![],
            related_resources: vec![],
            references: request.references,
            observatories: request.observatories,
            organizations: request.organizations,
            extraction_method: request.extraction_method,
            created_at: now(),
            created_by: contributor,
            versions: vec![],
            is_anonymized: request.is_anonymized,
            visibility: Visibility::Default,
            unlisted_by: None,
            json_class: "comparison".to_string(),
        };
        inner.comparisons.insert(id.clone(), comparison);
        tracing::info!(comparison_id = %id, "comparison created");
        Ok(id)
    }

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateComparisonRequest,
    ) -> ApiResult<()> {
        if request.observatories.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneObservatoryAllowed);
        }
        if request.organizations.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneOrganizationAllowed);
        }
        let mut inner = self.store.write().await;
        if !inner.comparisons.contains_key(id) {
            return Err(ApiError::ComparisonNotFound(id.clone()));
        }
        let research_fields = request
            .research_fields
            .as_deref()
            .map(|fields| Self::resolve_research_fields(&inner, fields))
            .transpose()?;
        let contributions = request
            .contributions
            .as_deref()
            .map(|ids| Self::resolve_contributions(&inner, ids))
            .transpose()?;
        let sdgs = request.sdgs.as_ref().map(|ids| Self::resolve_sdgs(&inner, ids));

        let comparison =
            inner.comparisons.get_mut(id).ok_or_else(|| ApiError::ComparisonNotFound(id.clone()))?;
        if let Some(title) = request.title {
            comparison.title = title;
        }
        if let Some(description) = request.description {
            comparison.description = Some(description);
        }
        if let Some(fields) = research_fields {
            comparison.research_fields = fields;
        }
        if let Some(authors) = request.authors {
            comparison.authors = authors;
        }
        if let Some(sdgs) = sdgs {
            comparison.sdgs = sdgs;
        }
        if let Some(contributions) = contributions {
            comparison.contributions = contributions;
        }
        if let Some(references) = request.references {
            comparison.references = references;
        }
        if let Some(observatories) = request.observatories {
            comparison.observatories = observatories;
        }
        if let Some(organizations) = request.organizations {
            comparison.organizations = organizations;
        }
        if let Some(is_anonymized) = request.is_anonymized {
            comparison.is_anonymized = is_anonymized;
        }
        if let Some(visibility) = request.visibility {
            comparison.visibility = visibility;
            comparison.unlisted_by =
                (visibility == Visibility::Unlisted).then_some(contributor);
        }
        Ok(())
    }

    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishComparisonRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        let comparison =
            inner.comparisons.get(id).ok_or_else(|| ApiError::ComparisonNotFound(id.clone()))?;
        if comparison.contributions.len() < 2 {
            return Err(ApiError::RequiresAtLeastTwoContributions);
        }
        let label = comparison.title.clone();
        let version_id = self.store.next_id("R");
        let version = PublishedVersion {
            id: version_id.clone(),
            label,
            created_at: now(),
            created_by: contributor,
            changelog: Some(request.description),
        };
        if let Some(comparison) = inner.comparisons.get_mut(id) {
            comparison.versions.insert(0, version);
        }
        tracing::info!(comparison_id = %id, version_id = %version_id, "comparison published");
        Ok(version_id)
    }

    async fn find_related_resource(
        &self,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<ComparisonRelatedResource> {
        self.require_comparison(comparison_id).await?;
        let inner = self.store.read().await;
        inner
            .related_resources
            .get(id)
            .filter(|(owner, _)| owner == comparison_id)
            .map(|(_, resource)| resource.clone())
            .ok_or_else(|| ApiError::ComparisonRelatedResourceNotFound(id.clone()))
    }

    async fn find_all_related_resources(
        &self,
        comparison_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ComparisonRelatedResource>> {
        self.require_comparison(comparison_id).await?;
        let inner = self.store.read().await;
        let resources = inner
            .related_resources
            .values()
            .filter(|(owner, _)| owner == comparison_id)
            .map(|(_, resource)| resource.clone())
            .collect();
        Ok(Page::from_vec(resources, page))
    }

    async fn create_related_resource(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        request: CreateComparisonRelatedResourceRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        if !inner.comparisons.contains_key(comparison_id) {
            return Err(ApiError::ComparisonNotFound(comparison_id.clone()));
        }
        let id = self.store.next_id("R");
        let resource = ComparisonRelatedResource {
            id: id.clone(),
            label: request.label.clone(),
            image: request.image,
            url: request.url,
            description: request.description,
            created_at: now(),
            created_by: contributor,
        };
        inner.related_resources.insert(id.clone(), (comparison_id.clone(), resource));
        if let Some(comparison) = inner.comparisons.get_mut(comparison_id) {
            comparison
                .related_resources
                .push(LabeledObject { id: id.clone(), label: request.label });
        }
        Ok(id)
    }

    async fn update_related_resource(
        &self,
        _contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
        request: CreateComparisonRelatedResourceRequest,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        if !inner.comparisons.contains_key(comparison_id) {
            return Err(ApiError::ComparisonNotFound(comparison_id.clone()));
        }
        let (owner, resource) = inner
            .related_resources
            .get_mut(id)
            .ok_or_else(|| ApiError::ComparisonRelatedResourceNotFound(id.clone()))?;
        if owner != comparison_id {
            return Err(ApiError::ComparisonRelatedResourceNotFound(id.clone()));
        }
        resource.label = request.label.clone();
        resource.image = request.image;
        resource.url = request.url;
        resource.description = request.description;
        if let Some(comparison) = inner.comparisons.get_mut(comparison_id) {
            if let Some(entry) = comparison.related_resources.iter_mut().find(|e| &e.id == id) {
                entry.label = request.label;
            }
        }
        Ok(())
    }

    async fn delete_related_resource(
        &self,
        _contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        if !inner.comparisons.contains_key(comparison_id) {
            return Err(ApiError::ComparisonNotFound(comparison_id.clone()));
        }
        let removed = inner
            .related_resources
            .get(id)
            .is_some_and(|(owner, _)| owner == comparison_id);
        if !removed {
            return Err(ApiError::ComparisonRelatedResourceNotFound(id.clone()));
        }
        inner.related_resources.remove(id);
        if let Some(comparison) = inner.comparisons.get_mut(comparison_id) {
            comparison.related_resources.retain(|entry| &entry.id != id);
        }
        Ok(())
    }

    async fn find_related_figure(
        &self,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<ComparisonRelatedFigure> {
        self.require_comparison(comparison_id).await?;
        let inner = self.store.read().await;
        inner
            .related_figures
            .get(id)
            .filter(|(owner, _)| owner == comparison_id)
            .map(|(_, figure)| figure.clone())
            .ok_or_else(|| ApiError::ComparisonRelatedFigureNotFound(id.clone()))
    }

    async fn find_all_related_figures(
        &self,
        comparison_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ComparisonRelatedFigure>> {
        self.require_comparison(comparison_id).await?;
        let inner = self.store.read().await;
        let figures = inner
            .related_figures
            .values()
            .filter(|(owner, _)| owner == comparison_id)
            .map(|(_, figure)| figure.clone())
            .collect();
        Ok(Page::from_vec(figures, page))
    }

    async fn create_related_figure(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        request: CreateComparisonRelatedFigureRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        if !inner.comparisons.contains_key(comparison_id) {
            return Err(ApiError::ComparisonNotFound(comparison_id.clone()));
        }
        let id = self.store.next_id("R");
        let figure = ComparisonRelatedFigure {
            id: id.clone(),
            label: request.label.clone(),
            image: request.image,
            description: request.description,
            created_at: now(),
            created_by: contributor,
        };
        inner.related_figures.insert(id.clone(), (comparison_id.clone(), figure));
        if let Some(comparison) = inner.comparisons.get_mut(comparison_id) {
            comparison.related_figures.push(LabeledObject { id: id.clone(), label: request.label });
        }
        Ok(id)
    }

    async fn update_related_figure(
        &self,
        _contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
        request: CreateComparisonRelatedFigureRequest,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        if !inner.comparisons.contains_key(comparison_id) {
            return Err(ApiError::ComparisonNotFound(comparison_id.clone()));
        }
        let (owner, figure) = inner
            .related_figures
            .get_mut(id)
            .ok_or_else(|| ApiError::ComparisonRelatedFigureNotFound(id.clone()))?;
        if owner != comparison_id {
            return Err(ApiError::ComparisonRelatedFigureNotFound(id.clone()));
        }
        figure.label = request.label.clone();
        figure.image = request.image;
        figure.description = request.description;
        if let Some(comparison) = inner.comparisons.get_mut(comparison_id) {
            if let Some(entry) = comparison.related_figures.iter_mut().find(|e| &e.id == id) {
                entry.label = request.label;
            }
        }
        Ok(())
    }

    async fn delete_related_figure(
        &self,
        _contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        if !inner.comparisons.contains_key(comparison_id) {
            return Err(ApiError::ComparisonNotFound(comparison_id.clone()));
        }
        let removed =
            inner.related_figures.get(id).is_some_and(|(owner, _)| owner == comparison_id);
        if !removed {
            return Err(ApiError::ComparisonRelatedFigureNotFound(id.clone()));
        }
        inner.related_figures.remove(id);
        if let Some(comparison) = inner.comparisons.get_mut(comparison_id) {
            comparison.related_figures.retain(|entry| &entry.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded_service() -> ComparisonService {
        let store = Arc::new(GraphStore::new());
        store.seed_research_field("R12", "Computer Science", None).await;
        ComparisonService::new(store)
    }

    fn create_request(title: &str, contributions: Vec<&str>) -> CreateComparisonRequest {
        serde_json::from_value(json!({
            "title": title,
            "description": "comparison description",
            "research_fields": ["R12"],
            "contributions": contributions,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_find_comparison() {
        let service = seeded_service().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example Comparison", vec![]))
            .await
            .unwrap();
        let comparison = service.find_by_id(&id).await.unwrap();
        assert_eq!(comparison.title, "Example Comparison");
        assert!(comparison.versions.is_empty());
    }

    #[tokio::test]
    async fn unknown_contribution_is_rejected() {
        let service = seeded_service().await;
        let result = service
            .create(ContributorId::UNKNOWN, create_request("Example Comparison", vec!["R999"]))
            .await;
        assert!(matches!(result, Err(ApiError::ContributionNotFound(_))));
    }

    #[tokio::test]
    async fn publish_requires_two_contributions() {
        let service = seeded_service().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example Comparison", vec![]))
            .await
            .unwrap();
        let result = service
            .publish(
                ContributorId::UNKNOWN,
                &id,
                PublishComparisonRequest { description: "initial".to_string() },
            )
            .await;
        assert!(matches!(result, Err(ApiError::RequiresAtLeastTwoContributions)));
    }

    #[tokio::test]
    async fn related_resource_lifecycle() {
        let service = seeded_service().await;
        let comparison_id = service
            .create(ContributorId::UNKNOWN, create_request("Example Comparison", vec![]))
            .await
            .unwrap();
        let request: CreateComparisonRelatedResourceRequest = serde_json::from_value(json!({
            "label": "Related resource",
            "url": "https://orkg.org/resource/R1563"
        }))
        .unwrap();
        let id = service
            .create_related_resource(ContributorId::UNKNOWN, &comparison_id, request)
            .await
            .unwrap();

        let resource = service.find_related_resource(&comparison_id, &id).await.unwrap();
        assert_eq!(resource.label, "Related resource");

        service
            .delete_related_resource(ContributorId::UNKNOWN, &comparison_id, &id)
            .await
            .unwrap();
        let result = service.find_related_resource(&comparison_id, &id).await;
        assert!(matches!(result, Err(ApiError::ComparisonRelatedResourceNotFound(_))));
    }
}
