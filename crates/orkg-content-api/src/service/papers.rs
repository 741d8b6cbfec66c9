//! In-memory paper and contribution services.

use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Contribution, ContributorId, LabeledObject, Page, PageRequest, Paper, PaperWithStatementCount,
    PublicationInfo, PublishedVersion, ResourceReference, ThingId, Visibility,
};
use crate::usecases::commands::{
    CreateContributionRequest, CreatePaperRequest, PublishPaperRequest, UpdatePaperRequest,
};
use crate::usecases::filters::PaperFilters;
use crate::usecases::{ContributionUseCases, PaperUseCases};

use super::store::{now, GraphStore, StoreInner};
use super::things;

static DOI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("valid regex"));

pub struct PaperService {
    store: Arc<GraphStore>,
}

impl PaperService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    fn validate_doi(identifiers: &crate::models::IdentifierMap) -> ApiResult<Option<String>> {
        let Some(doi) = identifiers.get("doi").and_then(|values| values.first()) else {
            return Ok(None);
        };
        if DOI_PATTERN.is_match(doi) {
            Ok(Some(doi.clone()))
        } else {
            Err(ApiError::InvalidDoi(doi.clone()))
        }
    }

    fn validate_publication_info(info: Option<&PublicationInfo>) -> ApiResult<()> {
        if let Some(month) = info.and_then(|info| info.published_month) {
            if !(1..=12).contains(&month) {
                return Err(ApiError::InvalidMonth(i64::from(month)));
            }
        }
        Ok(())
    }

    fn resolve_research_fields(
        inner: &StoreInner,
        ids: &[ThingId],
    ) -> ApiResult<Vec<LabeledObject>> {
        if ids.is_empty() {
            return Err(ApiError::validation(
                "research_fields",
                "At least one research field is required.",
            ));
        }
        if ids.len() > 1 {
            return Err(ApiError::OnlyOneResearchFieldAllowed);
        }
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

    fn resolve_sdgs(
        inner: &StoreInner,
        ids: impl IntoIterator<Item = ThingId>,
    ) -> Vec<LabeledObject> {
        ids.into_iter()
            .map(|id| {
                let label = inner.label_of(&id).unwrap_or_else(|| id.to_string());
                LabeledObject { id, label }
            })
            .collect()
    }

    fn resolve_mentionings(
        inner: &StoreInner,
        ids: impl IntoIterator<Item = ThingId>,
    ) -> ApiResult<Vec<ResourceReference>> {
        ids.into_iter()
            .map(|id| {
                if let Some(paper) = inner.papers.get(&id) {
                    return Ok(ResourceReference {
                        id,
                        label: paper.title.clone(),
                        classes: vec![ThingId::new("Paper").expect("valid thing id")],
                    });
                }
                inner
                    .resources
                    .get(&id)
                    .map(|resource| ResourceReference {
                        id: resource.id.clone(),
                        label: resource.label.clone(),
                        classes: resource.classes.clone(),
                    })
                    .ok_or(ApiError::ResourceNotFound(id))
            })
            .collect()
    }

    fn check_duplicates(
        inner: &StoreInner,
        doi: Option<&str>,
        title: &str,
        exclude: Option<&ThingId>,
    ) -> ApiResult<()> {
        for paper in inner.papers.values() {
            if exclude == Some(&paper.id) {
                continue;
            }
            if let (Some(doi), Some(existing)) = (doi, paper.doi()) {
                if doi.eq_ignore_ascii_case(existing) {
                    return Err(ApiError::PaperAlreadyExistsWithDoi(doi.to_string()));
                }
            }
            if paper.title.trim().eq_ignore_ascii_case(title.trim()) {
                return Err(ApiError::PaperAlreadyExistsWithTitle(title.to_string()));
            }
        }
        Ok(())
    }

    fn record_contributor(inner: &mut StoreInner, paper_id: &ThingId, contributor: ContributorId) {
        let contributors = inner.paper_contributors.entry(paper_id.clone()).or_default();
        if !contributors.contains(&contributor) {
            contributors.push(contributor);
        }
    }

    fn matches(inner: &StoreInner, paper: &Paper, filters: &PaperFilters) -> bool {
        let visible = filters
            .visibility
            .map_or(paper.visibility != Visibility::Deleted, |filter| {
                filter.matches(paper.visibility)
            });
        if !visible {
            return false;
        }
        if let Some(title) = &filters.title {
            let matched = if filters.exact {
                paper.title.eq_ignore_ascii_case(title)
            } else {
                paper.title.to_lowercase().contains(&title.to_lowercase())
            };
            if !matched {
                return false;
            }
        }
        if let Some(doi) = &filters.doi {
            if !paper.doi().is_some_and(|existing| existing.eq_ignore_ascii_case(doi)) {
                return false;
            }
        }
        if let Some(prefix) = &filters.doi_prefix {
            if !paper.doi().is_some_and(|existing| existing.starts_with(prefix.as_str())) {
                return false;
            }
        }
        if filters.verified.is_some_and(|verified| paper.verified != verified) {
            return false;
        }
        if filters.created_by.is_some_and(|creator| paper.created_by != creator) {
            return false;
        }
        if filters.created_at_start.is_some_and(|start| paper.created_at < start) {
            return false;
        }
        if filters.created_at_end.is_some_and(|end| paper.created_at > end) {
            return false;
        }
        if let Some(observatory) = filters.observatory_id {
            if !paper.observatories.contains(&observatory) {
                return false;
            }
        }
        if let Some(organization) = filters.organization_id {
            if !paper.organizations.contains(&organization) {
                return false;
            }
        }
        if let Some(field) = &filters.research_field {
            let accepted = if filters.include_subfields {
                inner.subfields_closure(field)
            } else {
                std::iter::once(field.clone()).collect()
            };
            if !paper.research_fields.iter().any(|f| accepted.contains(&f.id)) {
                return false;
            }
        }
        if let Some(sdg) = &filters.sdg {
            if !paper.sdgs.iter().any(|s| &s.id == sdg) {
                return false;
            }
        }
        if let Some(mentioned) = &filters.mentionings {
            if !paper.mentionings.iter().any(|m| &m.id == mentioned) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl PaperUseCases for PaperService {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<Paper> {
        let inner = self.store.read().await;
        inner.papers.get(id).cloned().ok_or_else(|| ApiError::PaperNotFound(id.clone()))
    }

    async fn find_all(&self, filters: &PaperFilters, page: PageRequest) -> ApiResult<Page<Paper>> {
        let inner = self.store.read().await;
        let papers = inner
            .papers
            .values()
            .filter(|paper| Self::matches(&inner, paper, filters))
            .cloned()
            .collect();
        Ok(Page::from_vec(papers, page))
    }

    async fn find_by_doi(&self, doi: &str) -> ApiResult<Paper> {
        let inner = self.store.read().await;
        inner
            .papers
            .values()
            .find(|paper| paper.doi().is_some_and(|existing| existing.eq_ignore_ascii_case(doi)))
            .cloned()
            .ok_or_else(|| ApiError::PaperNotFoundByDoi(doi.to_string()))
    }

    async fn find_by_title(&self, title: &str) -> ApiResult<Paper> {
        let inner = self.store.read().await;
        inner
            .papers
            .values()
            .find(|paper| paper.title.eq_ignore_ascii_case(title))
            .cloned()
            .ok_or_else(|| ApiError::PaperNotFoundByTitle(title.to_string()))
    }

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreatePaperRequest,
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
        Self::validate_publication_info(request.publication_info.as_ref())?;
        let doi = Self::validate_doi(&request.identifiers)?;

        let mut inner = self.store.write().await;
        let research_fields = Self::resolve_research_fields(&inner, &request.research_fields)?;
        Self::check_duplicates(&inner, doi.as_deref(), &request.title, None)?;
        let mentionings =
            Self::resolve_mentionings(&inner, request.mentionings.iter().cloned())?;
        let sdgs = Self::resolve_sdgs(&inner, request.sdgs.iter().cloned());

        let mut contributions = Vec::new();
        let mut statement_count = 0;
        if let Some(contents) = &request.contents {
            let definitions: Vec<_> = contents.contributions.iter().collect();
            things::validate(&inner, &contents.things, &definitions)?;
            let mapping =
                things::materialize(&self.store, &mut inner, &contents.things, contributor);
            for definition in &contents.contributions {
                let (id, count) = things::create_contribution(
                    &self.store,
                    &mut inner,
                    definition,
                    &mapping,
                    contributor,
                    request.extraction_method,
                )?;
                contributions.push(LabeledObject { id, label: definition.label.clone() });
                statement_count += count;
            }
        }

        let id = self.store.next_id("R");
        let paper = Paper {
            id: id.clone(),
            title: request.title,
            research_fields,
            identifiers: request.identifiers,
            publication_info: request.publication_info.unwrap_or_default(),
            authors: request.authors,
            contributions,
            sdgs,
            mentionings,
            observatories: request.observatories,
            organizations: request.organizations,
            extraction_method: request.extraction_method,
            created_at: now(),
            created_by: contributor,
            verified: false,
            visibility: Visibility::Default,
            modifiable: true,
            unlisted_by: None,
            json_class: "paper".to_string(),
        };
        inner.papers.insert(id.clone(), paper);
        inner.paper_statement_counts.insert(id.clone(), statement_count);
        Self::record_contributor(&mut inner, &id, contributor);
        tracing::info!(paper_id = %id, "paper created");
        Ok(id)
    }

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdatePaperRequest,
    ) -> ApiResult<()> {
        if request.observatories.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneObservatoryAllowed);
        }
        if request.organizations.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneOrganizationAllowed);
        }
        Self::validate_publication_info(request.publication_info.as_ref())?;

        let mut inner = self.store.write().await;
        let paper =
            inner.papers.get(id).cloned().ok_or_else(|| ApiError::PaperNotFound(id.clone()))?;
        if !paper.modifiable {
            return Err(ApiError::Forbidden);
        }

        let research_fields = request
            .research_fields
            .as_deref()
            .map(|fields| Self::resolve_research_fields(&inner, fields))
            .transpose()?;
        let doi = request
            .identifiers
            .as_ref()
            .map(Self::validate_doi)
            .transpose()?
            .flatten();
        if request.title.is_some() || doi.is_some() {
            let title = request.title.as_deref().unwrap_or(&paper.title);
            Self::check_duplicates(&inner, doi.as_deref(), title, Some(id))?;
        }
        let mentionings = request
            .mentionings
            .as_ref()
            .map(|ids| Self::resolve_mentionings(&inner, ids.iter().cloned()))
            .transpose()?;
        let sdgs = request
            .sdgs
            .as_ref()
            .map(|ids| Self::resolve_sdgs(&inner, ids.iter().cloned()));

        let paper = inner.papers.get_mut(id).ok_or_else(|| ApiError::PaperNotFound(id.clone()))?;
        if let Some(title) = request.title {
            paper.title = title;
        }
        if let Some(fields) = research_fields {
            paper.research_fields = fields;
        }
        if let Some(identifiers) = request.identifiers {
            paper.identifiers = identifiers;
        }
        if let Some(info) = request.publication_info {
            paper.publication_info = info;
        }
        if let Some(authors) = request.authors {
            paper.authors = authors;
        }
        if let Some(sdgs) = sdgs {
            paper.sdgs = sdgs;
        }
        if let Some(mentionings) = mentionings {
            paper.mentionings = mentionings;
        }
        if let Some(observatories) = request.observatories {
            paper.observatories = observatories;
        }
        if let Some(organizations) = request.organizations {
            paper.organizations = organizations;
        }
        if let Some(verified) = request.verified {
            paper.verified = verified;
        }
        if let Some(visibility) = request.visibility {
            paper.visibility = visibility;
            paper.unlisted_by =
                (visibility == Visibility::Unlisted).then_some(contributor);
        }
        Self::record_contributor(&mut inner, id, contributor);
        Ok(())
    }

    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishPaperRequest,
    ) -> ApiResult<ThingId> {
        if request.subject.trim().is_empty() {
            return Err(ApiError::validation("subject", "Subject must not be blank."));
        }
        let mut inner = self.store.write().await;
        let title = inner
            .papers
            .get(id)
            .map(|paper| paper.title.clone())
            .ok_or_else(|| ApiError::PaperNotFound(id.clone()))?;
        let version_id = self.store.next_id("R");
        inner.paper_versions.entry(id.clone()).or_default().push(PublishedVersion {
            id: version_id.clone(),
            label: title,
            created_at: now(),
            created_by: contributor,
            changelog: Some(request.description),
        });
        tracing::info!(paper_id = %id, version_id = %version_id, "paper published");
        Ok(version_id)
    }

    async fn find_all_contributors(
        &self,
        id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ContributorId>> {
        let inner = self.store.read().await;
        if !inner.papers.contains_key(id) {
            return Err(ApiError::PaperNotFound(id.clone()));
        }
        let contributors = inner.paper_contributors.get(id).cloned().unwrap_or_default();
        Ok(Page::from_vec(contributors, page))
    }

    async fn statement_counts(
        &self,
        page: PageRequest,
    ) -> ApiResult<Page<PaperWithStatementCount>> {
        let inner = self.store.read().await;
        let counts = inner
            .papers
            .values()
            .map(|paper| PaperWithStatementCount {
                id: paper.id.clone(),
                title: paper.title.clone(),
                count: inner.paper_statement_counts.get(&paper.id).copied().unwrap_or_default(),
            })
            .collect();
        Ok(Page::from_vec(counts, page))
    }
}

pub struct ContributionService {
    store: Arc<GraphStore>,
}

impl ContributionService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ContributionUseCases for ContributionService {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<Contribution> {
        let inner = self.store.read().await;
        inner
            .contributions
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::ContributionNotFound(id.clone()))
    }

    async fn find_all(&self, page: PageRequest) -> ApiResult<Page<Contribution>> {
        let inner = self.store.read().await;
        Ok(Page::from_vec(inner.contributions.values().cloned().collect(), page))
    }

    async fn create(
        &self,
        contributor: ContributorId,
        paper_id: &ThingId,
        request: CreateContributionRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        if !inner.papers.contains_key(paper_id) {
            return Err(ApiError::PaperNotFound(paper_id.clone()));
        }
        things::validate(&inner, &request.things, &[&request.contribution])?;
        let mapping = things::materialize(&self.store, &mut inner, &request.things, contributor);
        let (id, count) = things::create_contribution(
            &self.store,
            &mut inner,
            &request.contribution,
            &mapping,
            contributor,
            request.extraction_method,
        )?;
        let label = request.contribution.label.clone();
        if let Some(paper) = inner.papers.get_mut(paper_id) {
            paper.contributions.push(LabeledObject { id: id.clone(), label });
        }
        *inner.paper_statement_counts.entry(paper_id.clone()).or_default() += count;
        let contributors = inner.paper_contributors.entry(paper_id.clone()).or_default();
        if !contributors.contains(&contributor) {
            contributors.push(contributor);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request(title: &str) -> CreatePaperRequest {
        CreatePaperRequest {
            title: title.to_string(),
            research_fields: vec![ThingId::new("R12").unwrap()],
            identifiers: crate::models::IdentifierMap::new(),
            publication_info: None,
            authors: vec![],
            sdgs: std::collections::BTreeSet::new(),
            mentionings: std::collections::BTreeSet::new(),
            observatories: vec![],
            organizations: vec![],
            contents: None,
            extraction_method: crate::models::ExtractionMethod::Unknown,
        }
    }

    async fn service_with_field() -> PaperService {
        let store = Arc::new(GraphStore::new());
        store.seed_research_field("R12", "Computer Science", None).await;
        PaperService::new(store)
    }

    #[tokio::test]
    async fn create_and_find_paper() {
        let service = service_with_field().await;
        let id = service
            .create(ContributorId::UNKNOWN, base_request("Example Paper"))
            .await
            .unwrap();
        let paper = service.find_by_id(&id).await.unwrap();
        assert_eq!(paper.title, "Example Paper");
        assert_eq!(paper.research_fields[0].label, "Computer Science");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let service = service_with_field().await;
        let result = service.create(ContributorId::UNKNOWN, base_request("  ")).await;
        assert!(matches!(result, Err(ApiError::Validation { .. })));
    }

    #[tokio::test]
    async fn invalid_doi_is_rejected() {
        let service = service_with_field().await;
        let mut request = base_request("Example Paper");
        request.identifiers.insert("doi".to_string(), vec!["not a doi".to_string()]);
        let result = service.create(ContributorId::UNKNOWN, request).await;
        assert!(matches!(result, Err(ApiError::InvalidDoi(_))));
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let service = service_with_field().await;
        service
            .create(ContributorId::UNKNOWN, base_request("Example Paper"))
            .await
            .unwrap();
        let result = service.create(ContributorId::UNKNOWN, base_request("example paper")).await;
        assert!(matches!(result, Err(ApiError::PaperAlreadyExistsWithTitle(_))));
    }

    #[tokio::test]
    async fn more_than_one_research_field_is_rejected() {
        let service = service_with_field().await;
        let mut request = base_request("Example Paper");
        request.research_fields.push(ThingId::new("R13").unwrap());
        let result = service.create(ContributorId::UNKNOWN, request).await;
        assert!(matches!(result, Err(ApiError::OnlyOneResearchFieldAllowed)));
    }

    #[tokio::test]
    async fn invalid_month_is_rejected() {
        let service = service_with_field().await;
        let mut request = base_request("Example Paper");
        request.publication_info = Some(PublicationInfo {
            published_month: Some(13),
            ..PublicationInfo::default()
        });
        let result = service.create(ContributorId::UNKNOWN, request).await;
        assert!(matches!(result, Err(ApiError::InvalidMonth(13))));
    }

    #[tokio::test]
    async fn unknown_research_field_is_rejected() {
        let store = Arc::new(GraphStore::new());
        let service = PaperService::new(store);
        let result = service.create(ContributorId::UNKNOWN, base_request("Example Paper")).await;
        assert!(matches!(result, Err(ApiError::ResearchFieldNotFound(_))));
    }

    #[tokio::test]
    async fn title_filter_matches_substring() {
        let service = service_with_field().await;
        service
            .create(ContributorId::UNKNOWN, base_request("Deep Learning Survey"))
            .await
            .unwrap();
        service.create(ContributorId::UNKNOWN, base_request("Graph Databases")).await.unwrap();

        let filters =
            PaperFilters { title: Some("learning".to_string()), ..PaperFilters::default() };
        let page = service.find_all(&filters, PageRequest::default()).await.unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].title, "Deep Learning Survey");
    }

    #[tokio::test]
    async fn contribution_updates_statement_counts() {
        let store = Arc::new(GraphStore::new());
        store.seed_research_field("R12", "Computer Science", None).await;
        store.seed_predicate("P32", "has research problem").await;
        store.seed_resource("R3003", "Problem", &[]).await;
        let papers = PaperService::new(Arc::clone(&store));
        let contributions = ContributionService::new(store);

        let paper_id =
            papers.create(ContributorId::UNKNOWN, base_request("Example Paper")).await.unwrap();
        let request: CreateContributionRequest = serde_json::from_value(serde_json::json!({
            "contribution": {
                "label": "Contribution 1",
                "statements": { "P32": [{ "id": "R3003" }] }
            }
        }))
        .unwrap();
        let id = contributions
            .create(ContributorId::UNKNOWN, &paper_id, request)
            .await
            .unwrap();

        let paper = papers.find_by_id(&paper_id).await.unwrap();
        assert_eq!(paper.contributions, vec![LabeledObject {
            id,
            label: "Contribution 1".to_string()
        }]);
        let counts = papers.statement_counts(PageRequest::default()).await.unwrap();
        assert_eq!(counts.content[0].count, 1);
    }
}
