//! In-memory literature list service.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ContributorId, HeadVersion, LabeledObject, ListSectionEntry, LiteratureList,
    LiteratureListSection, Page, PageRequest, PublishedContent, PublishedVersion,
    ResourceReference, ThingId, VersionInfo, Visibility,
};
use crate::usecases::commands::{
    CreateLiteratureListRequest, ListSectionEntryRequest, LiteratureListSectionRequest,
    PublishContentRequest, UpdateLiteratureListRequest,
};
use crate::usecases::filters::ContentFilters;
use crate::usecases::LiteratureListUseCases;

use super::store::{now, GraphStore, StoreInner};

pub struct LiteratureListService {
    store: Arc<GraphStore>,
    /// (list id, content id) to resolved published content.
    published_cache: Cache<(ThingId, ThingId), PublishedContent>,
}

impl LiteratureListService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>, cache_ttl: Duration, cache_max_size: u64) -> Self {
        let published_cache = Cache::builder()
            .max_capacity(cache_max_size)
            .time_to_live(cache_ttl.max(Duration::from_millis(1)))
            .build();
        Self { store, published_cache }
    }

    fn resolve_entry(
        inner: &StoreInner,
        request: &ListSectionEntryRequest,
    ) -> ApiResult<ListSectionEntry> {
        let value = if let Some(paper) = inner.papers.get(&request.id) {
            ResourceReference {
                id: request.id.clone(),
                label: paper.title.clone(),
                classes: vec![ThingId::new("Paper").expect("valid thing id")],
            }
        } else if let Some(resource) = inner.resources.get(&request.id) {
            ResourceReference {
                id: resource.id.clone(),
                label: resource.label.clone(),
                classes: resource.classes.clone(),
            }
        } else {
            return Err(ApiError::ResourceNotFound(request.id.clone()));
        };
        Ok(ListSectionEntry { value, description: request.description.clone() })
    }

    fn resolve_section(
        store: &GraphStore,
        inner: &StoreInner,
        request: &LiteratureListSectionRequest,
    ) -> ApiResult<LiteratureListSection> {
        let id = store.next_id("R");
        match request {
            LiteratureListSectionRequest::List { entries } => {
                let entries = entries
                    .iter()
                    .map(|entry| Self::resolve_entry(inner, entry))
                    .collect::<ApiResult<Vec<_>>>()?;
                Ok(LiteratureListSection::List { id, entries })
            }
            LiteratureListSectionRequest::Text { heading, heading_size, text } => {
                if !(1..=6).contains(heading_size) {
                    return Err(ApiError::validation(
                        "heading_size",
                        "Heading size must be in range [1..6].",
                    ));
                }
                Ok(LiteratureListSection::Text {
                    id,
                    heading: heading.clone(),
                    heading_size: *heading_size,
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
    fn acknowledge(list: &mut LiteratureList, contributor: ContributorId) {
        list.acknowledgements.entry(contributor).or_insert(0.0);
        let share = 1.0 / list.acknowledgements.len() as f64;
        for value in list.acknowledgements.values_mut() {
            *value = share;
        }
    }

    fn matches(inner: &StoreInner, list: &LiteratureList, filters: &ContentFilters) -> bool {
        let visible = filters
            .visibility
            .map_or(list.visibility != Visibility::Deleted, |filter| {
                filter.matches(list.visibility)
            });
        if !visible {
            return false;
        }
        if let Some(title) = &filters.title {
            let matched = if filters.exact {
                list.title.eq_ignore_ascii_case(title)
            } else {
                list.title.to_lowercase().contains(&title.to_lowercase())
            };
            if !matched {
                return false;
            }
        }
        if filters.created_by.is_some_and(|creator| list.created_by != creator) {
            return false;
        }
        if filters.created_at_start.is_some_and(|start| list.created_at < start) {
            return false;
        }
        if filters.created_at_end.is_some_and(|end| list.created_at > end) {
            return false;
        }
        if let Some(observatory) = filters.observatory_id {
            if !list.observatories.contains(&observatory) {
                return false;
            }
        }
        if let Some(organization) = filters.organization_id {
            if !list.organizations.contains(&organization) {
                return false;
            }
        }
        if let Some(field) = &filters.research_field {
            let accepted = if filters.include_subfields {
                inner.subfields_closure(field)
            } else {
                std::iter::once(field.clone()).collect()
            };
            if !list.research_fields.iter().any(|f| accepted.contains(&f.id)) {
                return false;
            }
        }
        if let Some(sdg) = &filters.sdg {
            if !list.sdgs.iter().any(|s| &s.id == sdg) {
                return false;
            }
        }
        if let Some(published) = filters.published {
            if list.versions.published.is_empty() == published {
                return false;
            }
        }
        true
    }

    /// Thing ids referenced by the given sections.
    fn referenced_ids(sections: &[LiteratureListSection]) -> BTreeSet<ThingId> {
        sections
            .iter()
            .filter_map(|section| match section {
                LiteratureListSection::List { entries, .. } => {
                    Some(entries.iter().map(|entry| entry.value.id.clone()))
                }
                LiteratureListSection::Text { .. } => None,
            })
            .flatten()
            .collect()
    }
}

#[async_trait]
impl LiteratureListUseCases for LiteratureListService {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<LiteratureList> {
        let inner = self.store.read().await;
        inner
            .literature_lists
            .get(id)
            .or_else(|| inner.published_list_versions.get(id))
            .cloned()
            .ok_or_else(|| ApiError::LiteratureListNotFound(id.clone()))
    }

    async fn find_all(
        &self,
        filters: &ContentFilters,
        page: PageRequest,
    ) -> ApiResult<Page<LiteratureList>> {
        let inner = self.store.read().await;
        let lists = inner
            .literature_lists
            .values()
            .filter(|list| Self::matches(&inner, list, filters))
            .cloned()
            .collect();
        Ok(Page::from_vec(lists, page))
    }

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateLiteratureListRequest,
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
        let mut list = LiteratureList {
            id: id.clone(),
            title: request.title.clone(),
            research_fields,
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
            acknowledgements: std::collections::BTreeMap::new(),
            json_class: "literature-list".to_string(),
        };
        Self::acknowledge(&mut list, contributor);
        inner.literature_lists.insert(id.clone(), list);
        tracing::info!(literature_list_id = %id, "literature list created");
        Ok(id)
    }

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateLiteratureListRequest,
    ) -> ApiResult<()> {
        if request.observatories.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneObservatoryAllowed);
        }
        if request.organizations.as_ref().is_some_and(|o| o.len() > 1) {
            return Err(ApiError::OnlyOneOrganizationAllowed);
        }
        let mut inner = self.store.write().await;
        if !inner.literature_lists.contains_key(id) {
            return Err(ApiError::LiteratureListNotFound(id.clone()));
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

        let list = inner
            .literature_lists
            .get_mut(id)
            .ok_or_else(|| ApiError::LiteratureListNotFound(id.clone()))?;
        if let Some(title) = request.title {
            list.title = title.clone();
            list.versions.head.label = title;
        }
        if let Some(fields) = research_fields {
            list.research_fields = fields;
        }
        if let Some(authors) = request.authors {
            list.authors = authors;
        }
        if let Some(sdgs) = sdgs {
            list.sdgs = sdgs;
        }
        if let Some(observatories) = request.observatories {
            list.observatories = observatories;
        }
        if let Some(organizations) = request.organizations {
            list.organizations = organizations;
        }
        if let Some(sections) = sections {
            list.sections = sections;
        }
        if let Some(visibility) = request.visibility {
            list.visibility = visibility;
            list.unlisted_by = (visibility == Visibility::Unlisted).then_some(contributor);
        }
        Self::acknowledge(list, contributor);
        Ok(())
    }

    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishContentRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        let list = inner
            .literature_lists
            .get(id)
            .ok_or_else(|| ApiError::LiteratureListNotFound(id.clone()))?;
        let label = list.title.clone();
        let referenced = Self::referenced_ids(&list.sections);
        let version_id = self.store.next_id("R");
        let version = PublishedVersion {
            id: version_id.clone(),
            label,
            created_at: now(),
            created_by: contributor,
            changelog: Some(request.changelog),
        };
        // Freeze the list state under the version id; later edits to the
        // head must not show through the published version.
        let snapshot = inner.literature_lists.get_mut(id).map(|list| {
            list.versions.published.insert(0, version);
            let mut snapshot = list.clone();
            snapshot.id = version_id.clone();
            snapshot.published = true;
            snapshot
        });
        if let Some(snapshot) = snapshot {
            inner.published_list_versions.insert(version_id.clone(), snapshot);
        }
        inner.published_contents.entry(id.clone()).or_default().extend(referenced);
        tracing::info!(literature_list_id = %id, version_id = %version_id, "literature list published");
        Ok(version_id)
    }

    async fn create_section(
        &self,
        contributor: ContributorId,
        list_id: &ThingId,
        index: Option<usize>,
        request: LiteratureListSectionRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        if !inner.literature_lists.contains_key(list_id) {
            return Err(ApiError::LiteratureListNotFound(list_id.clone()));
        }
        let section = Self::resolve_section(&self.store, &inner, &request)?;
        let section_id = section.id().clone();
        let list = inner
            .literature_lists
            .get_mut(list_id)
            .ok_or_else(|| ApiError::LiteratureListNotFound(list_id.clone()))?;
        match index {
            Some(index) if index < list.sections.len() => list.sections.insert(index, section),
            _ => list.sections.push(section),
        }
        Self::acknowledge(list, contributor);
        Ok(section_id)
    }

    async fn update_section(
        &self,
        contributor: ContributorId,
        list_id: &ThingId,
        section_id: &ThingId,
        request: LiteratureListSectionRequest,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        if !inner.literature_lists.contains_key(list_id) {
            return Err(ApiError::LiteratureListNotFound(list_id.clone()));
        }
        let replacement = Self::resolve_section(&self.store, &inner, &request)?;
        let list = inner
            .literature_lists
            .get_mut(list_id)
            .ok_or_else(|| ApiError::LiteratureListNotFound(list_id.clone()))?;
        let position = list
            .sections
            .iter()
            .position(|section| section.id() == section_id)
            .ok_or_else(|| ApiError::LiteratureListSectionNotFound(section_id.clone()))?;
        // The stored section keeps its id; only the payload is replaced.
        let replacement = match replacement {
            LiteratureListSection::List { entries, .. } => {
                LiteratureListSection::List { id: section_id.clone(), entries }
            }
            LiteratureListSection::Text { heading, heading_size, text, .. } => {
                LiteratureListSection::Text {
                    id: section_id.clone(),
                    heading,
                    heading_size,
                    text,
                }
            }
        };
        list.sections[position] = replacement;
        Self::acknowledge(list, contributor);
        Ok(())
    }

    async fn delete_section(
        &self,
        contributor: ContributorId,
        list_id: &ThingId,
        section_id: &ThingId,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        let list = inner
            .literature_lists
            .get_mut(list_id)
            .ok_or_else(|| ApiError::LiteratureListNotFound(list_id.clone()))?;
        let before = list.sections.len();
        list.sections.retain(|section| section.id() != section_id);
        if list.sections.len() == before {
            return Err(ApiError::LiteratureListSectionNotFound(section_id.clone()));
        }
        Self::acknowledge(list, contributor);
        Ok(())
    }

    async fn find_published_content(
        &self,
        list_id: &ThingId,
        content_id: &ThingId,
    ) -> ApiResult<PublishedContent> {
        let key = (list_id.clone(), content_id.clone());
        if let Some(content) = self.published_cache.get(&key).await {
            return Ok(content);
        }
        let inner = self.store.read().await;
        if !inner.literature_lists.contains_key(list_id) {
            return Err(ApiError::LiteratureListNotFound(list_id.clone()));
        }
        let referenced = inner
            .published_contents
            .get(list_id)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> (Arc<GraphStore>, LiteratureListService) {
        let store = Arc::new(GraphStore::new());
        store.seed_research_field("R12", "Computer Science", None).await;
        store.seed_resource("R6416", "Paper entry", &["Paper"]).await;
        let service =
            LiteratureListService::new(Arc::clone(&store), Duration::from_secs(60), 100);
        (store, service)
    }

    fn create_request(title: &str) -> CreateLiteratureListRequest {
        serde_json::from_value(json!({
            "title": title,
            "research_fields": ["R12"],
            "sections": [
                { "type": "text", "heading": "Introduction", "heading_size": 2, "text": "intro" },
                { "type": "list", "entries": [{ "id": "R6416" }] }
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_resolves_sections() {
        let (_, service) = seeded().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example List"))
            .await
            .unwrap();
        let list = service.find_by_id(&id).await.unwrap();
        assert_eq!(list.sections.len(), 2);
        assert_eq!(list.acknowledgements[&ContributorId::UNKNOWN], 1.0);
        match &list.sections[1] {
            LiteratureListSection::List { entries, .. } => {
                assert_eq!(entries[0].value.label, "Paper entry");
            }
            LiteratureListSection::Text { .. } => panic!("expected list section"),
        }
    }

    #[tokio::test]
    async fn unknown_entry_is_rejected() {
        let (_, service) = seeded().await;
        let mut request = create_request("Example List");
        request.sections.push(LiteratureListSectionRequest::List {
            entries: vec![ListSectionEntryRequest {
                id: ThingId::new("R404").unwrap(),
                description: None,
            }],
        });
        let result = service.create(ContributorId::UNKNOWN, request).await;
        assert!(matches!(result, Err(ApiError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn publish_exposes_referenced_contents() {
        let (_, service) = seeded().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example List"))
            .await
            .unwrap();
        let entry = ThingId::new("R6416").unwrap();

        let before = service.find_published_content(&id, &entry).await;
        assert!(matches!(before, Err(ApiError::PublishedContentNotFound(_))));

        service
            .publish(
                ContributorId::UNKNOWN,
                &id,
                PublishContentRequest { changelog: "initial version".to_string() },
            )
            .await
            .unwrap();
        let content = service.find_published_content(&id, &entry).await.unwrap();
        assert!(matches!(content, PublishedContent::Resource(_)));

        let list = service.find_by_id(&id).await.unwrap();
        assert_eq!(list.versions.published.len(), 1);
    }

    #[tokio::test]
    async fn published_version_is_frozen() {
        let (_, service) = seeded().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example List"))
            .await
            .unwrap();
        let version_id = service
            .publish(
                ContributorId::UNKNOWN,
                &id,
                PublishContentRequest { changelog: "initial version".to_string() },
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
        assert_eq!(frozen.title, "Example List");
        assert_eq!(frozen.sections.len(), 2);
        assert!(frozen.published);
    }

    #[tokio::test]
    async fn section_lifecycle() {
        let (_, service) = seeded().await;
        let id = service
            .create(ContributorId::UNKNOWN, create_request("Example List"))
            .await
            .unwrap();
        let section_id = service
            .create_section(
                ContributorId::UNKNOWN,
                &id,
                Some(0),
                serde_json::from_value(json!({
                    "type": "text", "heading": "Prelude", "heading_size": 1, "text": "first"
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let list = service.find_by_id(&id).await.unwrap();
        assert_eq!(list.sections[0].id(), &section_id);

        service.delete_section(ContributorId::UNKNOWN, &id, &section_id).await.unwrap();
        let result = service
            .update_section(
                ContributorId::UNKNOWN,
                &id,
                &section_id,
                serde_json::from_value(json!({
                    "type": "text", "heading": "Prelude", "heading_size": 1, "text": "first"
                }))
                .unwrap(),
            )
            .await;
        assert!(matches!(result, Err(ApiError::LiteratureListSectionNotFound(_))));
    }
}
