//! In-memory template instance service.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ContributorId, EmbeddedStatement, Page, PageRequest, Template, TemplateInstance,
    TemplateProperty, ThingId,
};
use crate::usecases::commands::UpdateTemplateInstanceRequest;
use crate::usecases::TemplateInstanceUseCases;

use super::store::{now, GraphStore, LiteralRecord, StatementRecord, StoreInner};

pub struct TemplateInstanceService {
    store: Arc<GraphStore>,
}

impl TemplateInstanceService {
    #[must_use]
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    fn applicable_template(
        inner: &StoreInner,
        template_id: &ThingId,
        resource_id: &ThingId,
    ) -> ApiResult<Template> {
        let template = inner
            .templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| ApiError::TemplateNotFound(template_id.clone()))?;
        let resource = inner
            .resources
            .get(resource_id)
            .ok_or_else(|| ApiError::ResourceNotFound(resource_id.clone()))?;
        if !resource.classes.contains(&template.target_class.id) {
            return Err(ApiError::TemplateNotApplicable {
                template_id: template_id.clone(),
                resource_id: resource_id.clone(),
            });
        }
        Ok(template)
    }

    fn build_instance(
        inner: &StoreInner,
        template: &Template,
        resource_id: &ThingId,
    ) -> ApiResult<TemplateInstance> {
        let root = inner
            .resources
            .get(resource_id)
            .cloned()
            .ok_or_else(|| ApiError::ResourceNotFound(resource_id.clone()))?;
        let empty = BTreeMap::new();
        let all = inner.statements.get(resource_id).unwrap_or(&empty);
        let mut statements = BTreeMap::new();
        let mut visited = BTreeSet::from([resource_id.clone()]);
        for property in &template.properties {
            let path = &property.base().path.id;
            let embedded = all
                .get(path)
                .map(|records| {
                    records
                        .iter()
                        .map(|record| Self::embed(inner, record, &mut visited))
                        .collect()
                })
                .unwrap_or_default();
            statements.insert(path.clone(), embedded);
        }
        Ok(TemplateInstance { root, statements })
    }

    /// Inline a statement object, recursing into resource substatements.
    fn embed(
        inner: &StoreInner,
        record: &StatementRecord,
        visited: &mut BTreeSet<ThingId>,
    ) -> EmbeddedStatement {
        let mut statements = BTreeMap::new();
        if let Some(id) = record.object.id() {
            if visited.insert(id.clone()) {
                if let Some(substatements) = inner.statements.get(id) {
                    for (predicate, records) in substatements {
                        let embedded = records
                            .iter()
                            .map(|nested| Self::embed(inner, nested, visited))
                            .collect();
                        statements.insert(predicate.clone(), embedded);
                    }
                }
            }
        }
        EmbeddedStatement {
            thing: record.object.clone(),
            created_at: record.created_at,
            created_by: record.created_by,
            statements,
        }
    }

    /// Resolve a statement value to a thing id. Temp ids (`#`-prefixed)
    /// are minted as literals into `staged`; nothing is stored until the
    /// whole request validates.
    fn resolve_value(
        store: &GraphStore,
        inner: &StoreInner,
        request: &UpdateTemplateInstanceRequest,
        staged: &mut BTreeMap<ThingId, LiteralRecord>,
        value: &str,
    ) -> ApiResult<ThingId> {
        if value.starts_with('#') {
            let definition = request
                .literals
                .get(value)
                .ok_or_else(|| ApiError::ThingNotDefined(value.to_string()))?;
            let id = store.next_id("L");
            staged.insert(
                id.clone(),
                LiteralRecord {
                    label: definition.label.clone(),
                    datatype: definition.data_type.clone(),
                },
            );
            return Ok(id);
        }
        let id = ThingId::new(value).map_err(|_| ApiError::ThingNotDefined(value.to_string()))?;
        if inner.thing_reference(&id).is_some() {
            Ok(id)
        } else {
            Err(ApiError::ResourceNotFound(id))
        }
    }

    fn check_property(
        inner: &StoreInner,
        staged: &BTreeMap<ThingId, LiteralRecord>,
        property: &TemplateProperty,
        values: &[ThingId],
    ) -> ApiResult<()> {
        let literal_of = |value: &ThingId| staged.get(value).or_else(|| inner.literals.get(value));
        let base = property.base();
        let count = u32::try_from(values.len()).unwrap_or(u32::MAX);
        if base.min_count.is_some_and(|min| count < min) {
            return Err(ApiError::validation(
                base.path.id.to_string(),
                format!("Missing statement for predicate \"{}\".", base.path.id),
            ));
        }
        if base.max_count.is_some_and(|max| max > 0 && count > max) {
            return Err(ApiError::validation(
                base.path.id.to_string(),
                format!("Too many statements for predicate \"{}\".", base.path.id),
            ));
        }
        for value in values {
            match property {
                TemplateProperty::Untyped { .. } => {}
                TemplateProperty::StringLiteral { pattern, .. } => {
                    let literal = literal_of(value).ok_or_else(|| {
                        ApiError::validation(
                            base.path.id.to_string(),
                            format!("Object \"{value}\" must be a literal."),
                        )
                    })?;
                    if let Some(pattern) = pattern {
                        let regex = Regex::new(pattern).map_err(|_| {
                            ApiError::validation(
                                base.path.id.to_string(),
                                format!("Invalid pattern \"{pattern}\"."),
                            )
                        })?;
                        if !regex.is_match(&literal.label) {
                            return Err(ApiError::validation(
                                base.path.id.to_string(),
                                format!(
                                    "Label \"{}\" does not match pattern \"{pattern}\".",
                                    literal.label
                                ),
                            ));
                        }
                    }
                }
                TemplateProperty::NumberLiteral { min_inclusive, max_inclusive, .. } => {
                    let literal = literal_of(value).ok_or_else(|| {
                        ApiError::validation(
                            base.path.id.to_string(),
                            format!("Object \"{value}\" must be a literal."),
                        )
                    })?;
                    let number: f64 = literal.label.parse().map_err(|_| {
                        ApiError::validation(
                            base.path.id.to_string(),
                            format!("Label \"{}\" is not a valid number.", literal.label),
                        )
                    })?;
                    if min_inclusive.is_some_and(|min| number < min)
                        || max_inclusive.is_some_and(|max| number > max)
                    {
                        return Err(ApiError::validation(
                            base.path.id.to_string(),
                            format!("Number \"{number}\" is out of range."),
                        ));
                    }
                }
                TemplateProperty::OtherLiteral { .. } => {
                    if literal_of(value).is_none() {
                        return Err(ApiError::validation(
                            base.path.id.to_string(),
                            format!("Object \"{value}\" must be a literal."),
                        ));
                    }
                }
                TemplateProperty::Resource { class, .. } => {
                    let resource = inner.resources.get(value).ok_or_else(|| {
                        ApiError::validation(
                            base.path.id.to_string(),
                            format!("Object \"{value}\" must be a resource."),
                        )
                    })?;
                    if !resource.classes.contains(&class.id) {
                        return Err(ApiError::validation(
                            base.path.id.to_string(),
                            format!(
                                "Object \"{value}\" must be an instance of class \"{}\".",
                                class.id
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateInstanceUseCases for TemplateInstanceService {
    async fn find_by_id(
        &self,
        template_id: &ThingId,
        resource_id: &ThingId,
    ) -> ApiResult<TemplateInstance> {
        let inner = self.store.read().await;
        let template = Self::applicable_template(&inner, template_id, resource_id)?;
        Self::build_instance(&inner, &template, resource_id)
    }

    async fn find_all(
        &self,
        template_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<TemplateInstance>> {
        let inner = self.store.read().await;
        let template = inner
            .templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| ApiError::TemplateNotFound(template_id.clone()))?;
        let instances = inner
            .resources
            .values()
            .filter(|resource| resource.classes.contains(&template.target_class.id))
            .map(|resource| Self::build_instance(&inner, &template, &resource.id))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(Page::from_vec(instances, page))
    }

    async fn update(
        &self,
        contributor: ContributorId,
        template_id: &ThingId,
        resource_id: &ThingId,
        request: UpdateTemplateInstanceRequest,
    ) -> ApiResult<()> {
        let mut inner = self.store.write().await;
        let template = Self::applicable_template(&inner, template_id, resource_id)?;

        let paths: BTreeSet<&ThingId> =
            template.properties.iter().map(|property| &property.base().path.id).collect();
        if template.is_closed {
            if let Some(unknown) = request.statements.keys().find(|key| !paths.contains(key)) {
                tracing::debug!(template_id = %template_id, predicate = %unknown, "predicate outside closed template");
                return Err(ApiError::TemplateClosed(template_id.clone()));
            }
        }

        let mut staged: BTreeMap<ThingId, LiteralRecord> = BTreeMap::new();
        let mut resolved: BTreeMap<ThingId, Vec<ThingId>> = BTreeMap::new();
        for (predicate, values) in &request.statements {
            let ids = values
                .iter()
                .map(|value| Self::resolve_value(&self.store, &inner, &request, &mut staged, value))
                .collect::<ApiResult<Vec<_>>>()?;
            resolved.insert(predicate.clone(), ids);
        }
        for property in &template.properties {
            let path = &property.base().path.id;
            let empty = vec![];
            let values = resolved.get(path).unwrap_or(&empty);
            Self::check_property(&inner, &staged, property, values)?;
        }
        // All checks passed; only now do the staged literals enter the graph.
        inner.literals.extend(staged);

        let created_at = now();
        let mut records: BTreeMap<ThingId, Vec<StatementRecord>> = BTreeMap::new();
        for (predicate, ids) in &resolved {
            let statements = ids
                .iter()
                .map(|id| {
                    inner
                        .thing_reference(id)
                        .map(|object| StatementRecord { object, created_at, created_by: contributor })
                        .ok_or_else(|| ApiError::ResourceNotFound(id.clone()))
                })
                .collect::<ApiResult<Vec<_>>>()?;
            records.insert(predicate.clone(), statements);
        }
        let subject = inner.statements.entry(resource_id.clone()).or_default();
        for (predicate, statements) in records {
            subject.insert(predicate, statements);
        }
        Ok(())
    }
}
