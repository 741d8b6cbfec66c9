//! In-memory rosetta-stone statement service.
//!
//! Statements are append-only: every update creates a new version and
//! the statement id keeps resolving to the latest one. Soft deletion
//! records who deleted the statement and when; hard deletion is a
//! curator operation guarded against dangling context references.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Certainty, ContributorId, ExtractionMethod, ObservatoryId, OrganizationId, Page, PageRequest,
    RosettaStoneStatement, Template, ThingId, ThingReference, Visibility,
};
use crate::usecases::commands::{
    CreateRosettaStoneStatementRequest, UpdateRosettaStoneStatementRequest,
};
use crate::usecases::filters::RosettaStoneStatementFilters;
use crate::usecases::RosettaStoneStatementUseCases;

use super::store::{now, GraphStore, StoreInner};

pub struct RosettaStoneStatementService {
    store: Arc<GraphStore>,
}

struct VersionInput {
    subjects: Vec<ThingId>,
    objects: Vec<Vec<ThingId>>,
    certainty: Certainty,
    negated: bool,
    observatories: Vec<ObservatoryId>,
    organizations: Vec<OrganizationId>,
    extraction_method: ExtractionMethod,
}

impl RosettaStoneStatementService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    fn resolve_thing(inner: &StoreInner, id: &ThingId) -> ApiResult<ThingReference> {
        if inner.rosetta_statements.contains_key(id) || inner.rosetta_versions.contains_key(id) {
            return Err(ApiError::NestedRosettaStoneStatement(id.clone()));
        }
        inner
            .thing_reference(id)
            .ok_or_else(|| ApiError::ResourceNotFound(id.clone()))
    }

    fn resolve_positions(
        inner: &StoreInner,
        subjects: &[ThingId],
        objects: &[Vec<ThingId>],
    ) -> ApiResult<(Vec<ThingReference>, Vec<Vec<ThingReference>>)> {
        if subjects.is_empty() {
            return Err(ApiError::validation("subjects", "Subjects must not be empty."));
        }
        let subjects = subjects
            .iter()
            .map(|id| Self::resolve_thing(inner, id))
            .collect::<ApiResult<Vec<_>>>()?;
        let objects = objects
            .iter()
            .map(|position| {
                position
                    .iter()
                    .map(|id| Self::resolve_thing(inner, id))
                    .collect::<ApiResult<Vec<_>>>()
            })
            .collect::<ApiResult<Vec<_>>>()?;
        Ok((subjects, objects))
    }

    /// Render the statement label from the template's format string.
    /// `{0}` stands for the subjects, `{n}` for object position `n - 1`.
    fn format_label(
        template: &Template,
        subjects: &[ThingReference],
        objects: &[Vec<ThingReference>],
    ) -> String {
        let join = |things: &[ThingReference]| {
            things.iter().map(ThingReference::label).collect::<Vec<_>>().join(", ")
        };
        match &template.formatted_label {
            Some(format) => {
                let mut label = format.replace("{0}", &join(subjects));
                for (position, things) in objects.iter().enumerate() {
                    label = label.replace(&format!("{{{}}}", position + 1), &join(things));
                }
                label
            }
            None => {
                let mut parts = vec![join(subjects), template.label.clone()];
                parts.extend(objects.iter().map(|things| join(things)));
                parts.retain(|part| !part.is_empty());
                parts.join(" ")
            }
        }
    }

    fn statement_id<'a>(inner: &'a StoreInner, id: &'a ThingId) -> Option<&'a ThingId> {
        if inner.rosetta_statements.contains_key(id) {
            Some(id)
        } else {
            inner.rosetta_versions.get(id)
        }
    }

    fn matches(statement: &RosettaStoneStatement, filters: &RosettaStoneStatementFilters) -> bool {
        let visible = filters
            .visibility
            .map_or(statement.visibility != Visibility::Deleted && !statement.is_deleted(), |f| {
                f.matches(statement.visibility)
            });
        if !visible {
            return false;
        }
        if filters.context.as_ref().is_some_and(|context| statement.context.as_ref() != Some(context)) {
            return false;
        }
        if filters.template_id.as_ref().is_some_and(|template| &statement.template_id != template) {
            return false;
        }
        if filters.created_by.is_some_and(|creator| statement.created_by != creator) {
            return false;
        }
        if filters.created_at_start.is_some_and(|start| statement.created_at < start) {
            return false;
        }
        if filters.created_at_end.is_some_and(|end| statement.created_at > end) {
            return false;
        }
        if let Some(observatory) = filters.observatory_id {
            if !statement.observatories.contains(&observatory) {
                return false;
            }
        }
        if let Some(organization) = filters.organization_id {
            if !statement.organizations.contains(&organization) {
                return false;
            }
        }
        true
    }

    fn build_version(
        inner: &StoreInner,
        template: &Template,
        statement_id: ThingId,
        version_id: ThingId,
        context: Option<ThingId>,
        contributor: ContributorId,
        input: VersionInput,
    ) -> ApiResult<RosettaStoneStatement> {
        let (subjects, objects) =
            Self::resolve_positions(inner, &input.subjects, &input.objects)?;
        if input.observatories.len() > 1 {
            return Err(ApiError::OnlyOneObservatoryAllowed);
        }
        if input.organizations.len() > 1 {
            return Err(ApiError::OnlyOneOrganizationAllowed);
        }
        let formatted_label = Self::format_label(template, &subjects, &objects);
        Ok(RosettaStoneStatement {
            id: statement_id,
            context,
            template_id: template.id.clone(),
            class_id: template.target_class.id.clone(),
            version_id: version_id.clone(),
            latest_version_id: version_id,
            formatted_label,
            subjects,
            objects,
            created_at: now(),
            created_by: contributor,
            certainty: input.certainty,
            negated: input.negated,
            observatories: input.observatories,
            organizations: input.organizations,
            extraction_method: input.extraction_method,
            visibility: Visibility::Default,
            unlisted_by: None,
            modifiable: true,
            deleted_by: None,
            deleted_at: None,
        })
    }
}

#[async_trait]
impl RosettaStoneStatementUseCases for RosettaStoneStatementService {
    async fn find_by_id(&self, id: &ThingId, curator: bool) -> ApiResult<RosettaStoneStatement> {
        let inner = self.store.read().await;
        let statement_id = Self::statement_id(&inner, id)
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        let versions = inner
            .rosetta_statements
            .get(statement_id)
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        // Soft-deleted statements stay readable for curators only.
        if !curator && versions.last().is_some_and(RosettaStoneStatement::is_deleted) {
            return Err(ApiError::RosettaStoneStatementNotFound(id.clone()));
        }
        let version = if statement_id == id {
            versions.last()
        } else {
            versions.iter().find(|version| &version.version_id == id)
        };
        version
            .cloned()
            .ok_or_else(|| ApiError::RosettaStoneStatementVersionNotFound(id.clone()))
    }

    async fn find_all(
        &self,
        filters: &RosettaStoneStatementFilters,
        page: PageRequest,
    ) -> ApiResult<Page<RosettaStoneStatement>> {
        let inner = self.store.read().await;
        let statements = inner
            .rosetta_statements
            .values()
            .filter_map(|versions| versions.last())
            .filter(|statement| Self::matches(statement, filters))
            .cloned()
            .collect();
        Ok(Page::from_vec(statements, page))
    }

    async fn find_all_versions(
        &self,
        id: &ThingId,
        curator: bool,
    ) -> ApiResult<Vec<RosettaStoneStatement>> {
        let inner = self.store.read().await;
        let statement_id = Self::statement_id(&inner, id)
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        let versions = inner.rosetta_statements.get(statement_id).cloned().unwrap_or_default();
        if !curator && versions.last().is_some_and(RosettaStoneStatement::is_deleted) {
            return Err(ApiError::RosettaStoneStatementNotFound(id.clone()));
        }
        Ok(versions)
    }

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateRosettaStoneStatementRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        let template = inner
            .templates
            .get(&request.template_id)
            .cloned()
            .ok_or_else(|| ApiError::TemplateNotFound(request.template_id.clone()))?;
        if let Some(context) = &request.context {
            let known = inner.resources.contains_key(context)
                || inner.rosetta_statements.contains_key(context)
                || inner.rosetta_versions.contains_key(context);
            if !known {
                return Err(ApiError::ResourceNotFound(context.clone()));
            }
        }
        let statement_id = self.store.next_id("R");
        let version_id = self.store.next_id("R");
        let statement = Self::build_version(
            &inner,
            &template,
            statement_id.clone(),
            version_id,
            request.context,
            contributor,
            VersionInput {
                subjects: request.subjects,
                objects: request.objects,
                certainty: request.certainty,
                negated: request.negated,
                observatories: request.observatories,
                organizations: request.organizations,
                extraction_method: request.extraction_method,
            },
        )?;
        inner.rosetta_versions.insert(statement.version_id.clone(), statement_id.clone());
        inner.rosetta_statements.insert(statement_id.clone(), vec![statement]);
        tracing::info!(statement_id = %statement_id, "rosetta stone statement created");
        Ok(statement_id)
    }

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateRosettaStoneStatementRequest,
    ) -> ApiResult<ThingId> {
        let mut inner = self.store.write().await;
        let statement_id = Self::statement_id(&inner, id)
            .cloned()
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        let latest = inner
            .rosetta_statements
            .get(&statement_id)
            .and_then(|versions| versions.last())
            .cloned()
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        if latest.is_deleted() || !latest.modifiable {
            return Err(ApiError::Forbidden);
        }
        let template = inner
            .templates
            .get(&latest.template_id)
            .cloned()
            .ok_or_else(|| ApiError::TemplateNotFound(latest.template_id.clone()))?;
        let version_id = self.store.next_id("R");
        let statement = Self::build_version(
            &inner,
            &template,
            statement_id.clone(),
            version_id.clone(),
            latest.context,
            contributor,
            VersionInput {
                subjects: request.subjects,
                objects: request.objects,
                certainty: request.certainty,
                negated: request.negated,
                observatories: request.observatories,
                organizations: request.organizations,
                extraction_method: request.extraction_method,
            },
        )?;
        inner.rosetta_versions.insert(version_id.clone(), statement_id.clone());
        if let Some(versions) = inner.rosetta_statements.get_mut(&statement_id) {
            for version in versions.iter_mut() {
                version.latest_version_id = version_id.clone();
            }
            versions.push(statement);
        }
        Ok(version_id)
    }

    async fn soft_delete(&self, contributor: ContributorId, id: &ThingId) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        let statement_id = Self::statement_id(&inner, id)
            .cloned()
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        let versions = inner
            .rosetta_statements
            .get_mut(&statement_id)
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        let deleted_at = now();
        for version in versions.iter_mut() {
            version.deleted_by = Some(contributor);
            version.deleted_at = Some(deleted_at);
            version.modifiable = false;
        }
        Ok(())
    }

    async fn delete(
        &self,
        _contributor: ContributorId,
        id: &ThingId,
        curator: bool,
    ) -> ApiResult<()> {
        if !curator {
            return Err(ApiError::Forbidden);
        }
        let mut inner = self.store.write().await;
        let statement_id = Self::statement_id(&inner, id)
            .cloned()
            .ok_or_else(|| ApiError::RosettaStoneStatementNotFound(id.clone()))?;
        let claimed = inner
            .rosetta_statements
            .iter()
            .filter(|(other, _)| **other != statement_id)
            .flat_map(|(_, versions)| versions)
            .any(|version| version.context.as_ref() == Some(&statement_id));
        if claimed {
            return Err(ApiError::CannotDeleteClaimedStatement(statement_id));
        }
        if let Some(versions) = inner.rosetta_statements.remove(&statement_id) {
            for version in &versions {
                inner.rosetta_versions.remove(&version.version_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassReference, TemplateRelations};
    use serde_json::json;

    fn template() -> Template {
        Template {
            id: ThingId::new("R456").unwrap(),
            label: "speed comparison".to_string(),
            description: None,
            formatted_label: Some("{0} runs faster than {1}".to_string()),
            target_class: ClassReference {
                id: ThingId::new("C123").unwrap(),
                label: "SpeedComparison".to_string(),
                uri: None,
            },
            relations: TemplateRelations::default(),
            properties: vec![],
            is_closed: true,
            created_at: "2023-10-06T12:34:21+02:00".parse().unwrap(),
            created_by: ContributorId::UNKNOWN,
            observatories: vec![],
            organizations: vec![],
            extraction_method: ExtractionMethod::Unknown,
            visibility: Visibility::Default,
            unlisted_by: None,
            json_class: "template".to_string(),
        }
    }

    async fn seeded() -> RosettaStoneStatementService {
        let store = Arc::new(GraphStore::new());
        store.seed_template(template()).await;
        store.seed_resource("R100", "the hare", &[]).await;
        store.seed_resource("R200", "the tortoise", &[]).await;
        RosettaStoneStatementService::new(store)
    }

    fn create_request() -> CreateRosettaStoneStatementRequest {
        serde_json::from_value(json!({
            "template_id": "R456",
            "subjects": ["R100"],
            "objects": [["R200"]],
            "certainty": "HIGH",
            "negated": false
        }))
        .unwrap()
    }

    fn update_request() -> UpdateRosettaStoneStatementRequest {
        serde_json::from_value(json!({
            "subjects": ["R200"],
            "objects": [["R100"]],
            "certainty": "MODERATE",
            "negated": true
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_formats_label_from_template() {
        let service = seeded().await;
        let id = service.create(ContributorId::UNKNOWN, create_request()).await.unwrap();
        let statement = service.find_by_id(&id, false).await.unwrap();
        assert_eq!(statement.formatted_label, "the hare runs faster than the tortoise");
        assert!(statement.is_latest());
    }

    #[tokio::test]
    async fn update_appends_version() {
        let service = seeded().await;
        let id = service.create(ContributorId::UNKNOWN, create_request()).await.unwrap();
        let version_id =
            service.update(ContributorId::UNKNOWN, &id, update_request()).await.unwrap();

        let versions = service.find_all_versions(&id, false).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].latest_version_id, version_id);
        assert!(!versions[0].is_latest());

        let latest = service.find_by_id(&id, false).await.unwrap();
        assert_eq!(latest.version_id, version_id);
        assert!(latest.negated);

        let first_version = versions[0].version_id.clone();
        let old = service.find_by_id(&first_version, false).await.unwrap();
        assert!(!old.negated);
    }

    #[tokio::test]
    async fn soft_deleted_statement_is_not_modifiable() {
        let service = seeded().await;
        let id = service.create(ContributorId::UNKNOWN, create_request()).await.unwrap();
        service.soft_delete(ContributorId::UNKNOWN, &id).await.unwrap();

        let statement = service.find_by_id(&id, true).await.unwrap();
        assert!(statement.is_deleted());
        let result = service.update(ContributorId::UNKNOWN, &id, update_request()).await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[tokio::test]
    async fn soft_deleted_statement_is_hidden_from_non_curators() {
        let service = seeded().await;
        let id = service.create(ContributorId::UNKNOWN, create_request()).await.unwrap();
        service.soft_delete(ContributorId::UNKNOWN, &id).await.unwrap();

        let result = service.find_by_id(&id, false).await;
        assert!(matches!(result, Err(ApiError::RosettaStoneStatementNotFound(_))));
        let result = service.find_all_versions(&id, false).await;
        assert!(matches!(result, Err(ApiError::RosettaStoneStatementNotFound(_))));

        let versions = service.find_all_versions(&id, true).await.unwrap();
        assert!(versions.iter().all(RosettaStoneStatement::is_deleted));
    }

    #[tokio::test]
    async fn hard_delete_requires_curator() {
        let service = seeded().await;
        let id = service.create(ContributorId::UNKNOWN, create_request()).await.unwrap();
        let denied = service.delete(ContributorId::UNKNOWN, &id, false).await;
        assert!(matches!(denied, Err(ApiError::Forbidden)));

        service.delete(ContributorId::UNKNOWN, &id, true).await.unwrap();
        let result = service.find_by_id(&id, true).await;
        assert!(matches!(result, Err(ApiError::RosettaStoneStatementNotFound(_))));
    }

    #[tokio::test]
    async fn context_referenced_statement_cannot_be_hard_deleted() {
        let service = seeded().await;
        let id = service.create(ContributorId::UNKNOWN, create_request()).await.unwrap();
        let mut second = create_request();
        second.context = Some(id.clone());
        service.create(ContributorId::UNKNOWN, second).await.unwrap();

        let result = service.delete(ContributorId::UNKNOWN, &id, true).await;
        assert!(matches!(result, Err(ApiError::CannotDeleteClaimedStatement(_))));
    }

    #[tokio::test]
    async fn statement_cannot_be_object_of_statement() {
        let service = seeded().await;
        let id = service.create(ContributorId::UNKNOWN, create_request()).await.unwrap();
        let mut second = create_request();
        second.objects = vec![vec![id]];
        let result = service.create(ContributorId::UNKNOWN, second).await;
        assert!(matches!(result, Err(ApiError::NestedRosettaStoneStatement(_))));
    }
}
