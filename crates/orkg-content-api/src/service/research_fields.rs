//! In-memory research field hierarchy service.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Page, PageRequest, Resource, ResearchFieldHierarchyEntry, ResearchFieldWithChildCount, ThingId,
};
use crate::usecases::ResearchFieldHierarchyUseCases;

use super::store::{GraphStore, StoreInner};

pub struct ResearchFieldHierarchyService {
    store: Arc<GraphStore>,
}

impl ResearchFieldHierarchyService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    fn require_field(inner: &StoreInner, id: &ThingId) -> ApiResult<()> {
        if inner.is_research_field(id) {
            Ok(())
        } else {
            Err(ApiError::ResearchFieldNotFound(id.clone()))
        }
    }

    fn field_resource(inner: &StoreInner, id: &ThingId) -> Option<Resource> {
        inner.resources.get(id).cloned()
    }

    fn child_count(inner: &StoreInner, id: &ThingId) -> u64 {
        inner
            .research_field_children
            .get(id)
            .map(|children| children.len() as u64)
            .unwrap_or_default()
    }

    /// All fields reachable from `id` by walking parent links upwards,
    /// including `id` itself.
    fn ancestors_closure(inner: &StoreInner, id: &ThingId) -> BTreeSet<ThingId> {
        let mut closure = BTreeSet::new();
        let mut queue = vec![id.clone()];
        while let Some(current) = queue.pop() {
            if !closure.insert(current.clone()) {
                continue;
            }
            if let Some(parents) = inner.research_field_parents.get(&current) {
                queue.extend(parents.iter().cloned());
            }
        }
        closure
    }

    fn is_root(inner: &StoreInner, id: &ThingId) -> bool {
        inner.research_field_parents.get(id).is_none_or(BTreeSet::is_empty)
    }
}

#[async_trait]
impl ResearchFieldHierarchyUseCases for ResearchFieldHierarchyService {
    async fn find_children(
        &self,
        id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ResearchFieldWithChildCount>> {
        let inner = self.store.read().await;
        Self::require_field(&inner, id)?;
        let children = inner
            .research_field_children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|child| {
                Self::field_resource(&inner, child).map(|resource| ResearchFieldWithChildCount {
                    child_count: Self::child_count(&inner, &resource.id),
                    resource,
                })
            })
            .collect();
        Ok(Page::from_vec(children, page))
    }

    async fn find_parents(&self, id: &ThingId, page: PageRequest) -> ApiResult<Page<Resource>> {
        let inner = self.store.read().await;
        Self::require_field(&inner, id)?;
        let parents = inner
            .research_field_parents
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|parent| Self::field_resource(&inner, parent))
            .collect();
        Ok(Page::from_vec(parents, page))
    }

    async fn find_roots(&self, id: &ThingId, page: PageRequest) -> ApiResult<Page<Resource>> {
        let inner = self.store.read().await;
        Self::require_field(&inner, id)?;
        let roots = Self::ancestors_closure(&inner, id)
            .iter()
            .filter(|field| Self::is_root(&inner, field))
            .filter_map(|field| Self::field_resource(&inner, field))
            .collect();
        Ok(Page::from_vec(roots, page))
    }

    async fn find_all_roots(&self, page: PageRequest) -> ApiResult<Page<Resource>> {
        let inner = self.store.read().await;
        let roots = inner
            .resources
            .values()
            .filter(|resource| {
                inner.is_research_field(&resource.id) && Self::is_root(&inner, &resource.id)
            })
            .cloned()
            .collect();
        Ok(Page::from_vec(roots, page))
    }

    async fn find_hierarchy(
        &self,
        id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ResearchFieldHierarchyEntry>> {
        let inner = self.store.read().await;
        Self::require_field(&inner, id)?;
        let entries = Self::ancestors_closure(&inner, id)
            .iter()
            .filter_map(|field| {
                Self::field_resource(&inner, field).map(|resource| ResearchFieldHierarchyEntry {
                    parent_ids: inner
                        .research_field_parents
                        .get(&resource.id)
                        .map(|parents| parents.iter().cloned().collect())
                        .unwrap_or_default(),
                    resource,
                })
            })
            .collect();
        Ok(Page::from_vec(entries, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> ResearchFieldHierarchyService {
        let store = Arc::new(GraphStore::new());
        store.seed_research_field("R1", "Science", None).await;
        store.seed_research_field("R2", "Engineering", None).await;
        store.seed_research_field("R11", "Computer Science", Some("R1")).await;
        store.seed_research_field("R111", "Databases", Some("R11")).await;
        // Interdisciplinary field with two parents.
        store.seed_research_field("R21", "Software Engineering", Some("R2")).await;
        let mut inner = store.write().await;
        let field = ThingId::new("R21").unwrap();
        let parent = ThingId::new("R11").unwrap();
        inner.research_field_parents.get_mut(&field).unwrap().insert(parent.clone());
        inner.research_field_children.get_mut(&parent).unwrap().insert(field);
        drop(inner);
        ResearchFieldHierarchyService::new(store)
    }

    fn id(raw: &str) -> ThingId {
        ThingId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn children_carry_child_counts() {
        let service = seeded().await;
        let page = service.find_children(&id("R1"), PageRequest::default()).await.unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].resource.id, id("R11"));
        assert_eq!(page.content[0].child_count, 2);
    }

    #[tokio::test]
    async fn parents_of_interdisciplinary_field() {
        let service = seeded().await;
        let page = service.find_parents(&id("R21"), PageRequest::default()).await.unwrap();
        let parents: Vec<_> = page.content.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(parents, vec!["R11", "R2"]);
    }

    #[tokio::test]
    async fn roots_walk_all_parent_chains() {
        let service = seeded().await;
        let page = service.find_roots(&id("R21"), PageRequest::default()).await.unwrap();
        let roots: Vec<_> = page.content.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(roots, vec!["R1", "R2"]);
    }

    #[tokio::test]
    async fn all_roots_excludes_subfields() {
        let service = seeded().await;
        let page = service.find_all_roots(PageRequest::default()).await.unwrap();
        let roots: Vec<_> = page.content.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(roots, vec!["R1", "R2"]);
    }

    #[tokio::test]
    async fn hierarchy_lists_ancestors_with_parent_ids() {
        let service = seeded().await;
        let page = service.find_hierarchy(&id("R111"), PageRequest::default()).await.unwrap();
        assert_eq!(page.content.len(), 3);
        let entry = page.content.iter().find(|e| e.resource.id == id("R11")).unwrap();
        assert_eq!(entry.parent_ids, vec![id("R1")]);
    }

    #[tokio::test]
    async fn unknown_field_is_an_error() {
        let service = seeded().await;
        let result = service.find_children(&id("R404"), PageRequest::default()).await;
        assert!(matches!(result, Err(ApiError::ResearchFieldNotFound(_))));
    }
}
