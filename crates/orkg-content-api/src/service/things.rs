//! Temp-id resolution and statement-tree materialization.
//!
//! Create requests may define resources, literals, predicates and lists
//! inline, keyed by `#`-prefixed temp ids, and reference them from
//! contribution statement trees. This module validates those references
//! and turns definitions into stored graph entities.

use std::collections::BTreeMap;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Contribution, ContributorId, ExtractionMethod, ThingId, Visibility,
};
use crate::usecases::commands::{ContributionDefinition, StatementObject, ThingDefinitions};

use super::store::{now, GraphStore, LiteralRecord, PredicateRecord, StatementRecord, StoreInner};

/// Validate temp ids and statement references of a create request.
///
/// Every definition key must carry the `#` prefix, no temp id may be
/// defined twice, and every id a statement refers to must either be
/// defined by the request or already exist in the graph.
pub fn validate(
    inner: &StoreInner,
    things: &ThingDefinitions,
    contributions: &[&ContributionDefinition],
) -> ApiResult<()> {
    for temp_id in things.ids() {
        if !temp_id.starts_with('#') {
            return Err(ApiError::InvalidTempId(temp_id.to_string()));
        }
    }
    let duplicates = things.duplicate_ids();
    if !duplicates.is_empty() {
        return Err(ApiError::DuplicateTempIds(duplicates));
    }
    for contribution in contributions {
        if contribution.statements.is_empty() {
            return Err(ApiError::validation(
                "statements",
                "Contribution statements must not be empty.",
            ));
        }
        validate_statements(inner, things, &contribution.statements)?;
    }
    Ok(())
}

fn validate_statements(
    inner: &StoreInner,
    things: &ThingDefinitions,
    statements: &BTreeMap<String, Vec<StatementObject>>,
) -> ApiResult<()> {
    for (predicate, objects) in statements {
        validate_reference(inner, things, predicate)?;
        for object in objects {
            validate_reference(inner, things, &object.id)?;
            if let Some(nested) = &object.statements {
                validate_statements(inner, things, nested)?;
            }
        }
    }
    Ok(())
}

fn validate_reference(inner: &StoreInner, things: &ThingDefinitions, id: &str) -> ApiResult<()> {
    if id.starts_with('#') {
        if things.defines(id) {
            return Ok(());
        }
        return Err(ApiError::ThingNotDefined(id.to_string()));
    }
    let thing_id =
        ThingId::new(id).map_err(|_| ApiError::ThingNotDefined(id.to_string()))?;
    let exists = inner.thing_reference(&thing_id).is_some()
        || inner.papers.contains_key(&thing_id)
        || inner.contributions.contains_key(&thing_id);
    if exists { Ok(()) } else { Err(ApiError::ThingNotDefined(id.to_string())) }
}

/// Create the things a request defines, returning temp id to real id.
pub fn materialize(
    store: &GraphStore,
    inner: &mut StoreInner,
    things: &ThingDefinitions,
    contributor: ContributorId,
) -> BTreeMap<String, ThingId> {
    let mut mapping = BTreeMap::new();
    for (temp_id, definition) in &things.resources {
        let id = store.next_id("R");
        inner.resources.insert(
            id.clone(),
            plain_resource(id.clone(), &definition.label, definition.classes.iter(), contributor),
        );
        mapping.insert(temp_id.clone(), id);
    }
    for (temp_id, definition) in &things.literals {
        let id = store.next_id("L");
        inner.literals.insert(
            id.clone(),
            LiteralRecord {
                label: definition.label.clone(),
                datatype: definition.data_type.clone(),
            },
        );
        mapping.insert(temp_id.clone(), id);
    }
    for (temp_id, definition) in &things.predicates {
        let id = store.next_id("P");
        inner.predicates.insert(
            id.clone(),
            PredicateRecord {
                label: definition.label.clone(),
                description: definition.description.clone(),
            },
        );
        mapping.insert(temp_id.clone(), id);
    }
    for (temp_id, definition) in &things.lists {
        let id = store.next_id("R");
        let list_class = ThingId::new("List").expect("valid thing id");
        inner.resources.insert(
            id.clone(),
            plain_resource(id.clone(), &definition.label, std::iter::once(&list_class), contributor),
        );
        mapping.insert(temp_id.clone(), id);
    }
    mapping
}

fn plain_resource<'a>(
    id: ThingId,
    label: &str,
    classes: impl Iterator<Item = &'a ThingId>,
    contributor: ContributorId,
) -> crate::models::Resource {
    crate::models::Resource {
        id,
        label: label.to_string(),
        classes: classes.cloned().collect(),
        created_at: now(),
        created_by: contributor,
        observatories: vec![],
        organizations: vec![],
        extraction_method: ExtractionMethod::Unknown,
        visibility: Visibility::Default,
        unlisted_by: None,
    }
}

/// Create a contribution together with its statement tree.
///
/// Returns the contribution id and the number of statements created.
/// Call [`validate`] and [`materialize`] first; unresolved references
/// are treated as defects here.
pub fn create_contribution(
    store: &GraphStore,
    inner: &mut StoreInner,
    definition: &ContributionDefinition,
    mapping: &BTreeMap<String, ThingId>,
    contributor: ContributorId,
    extraction_method: ExtractionMethod,
) -> ApiResult<(ThingId, u64)> {
    let id = store.next_id("R");
    let mut properties: BTreeMap<ThingId, Vec<ThingId>> = BTreeMap::new();
    let mut count = 0;
    for (predicate_key, objects) in &definition.statements {
        let predicate = resolve(mapping, predicate_key)?;
        for object in objects {
            let object_id = resolve(mapping, &object.id)?;
            record_statement(inner, &id, &predicate, &object_id, contributor)?;
            count += 1;
            properties.entry(predicate.clone()).or_default().push(object_id.clone());
            if let Some(nested) = &object.statements {
                count += create_nested(store, inner, &object_id, nested, mapping, contributor)?;
            }
        }
    }
    let contribution = Contribution {
        id: id.clone(),
        label: definition.label.clone(),
        classes: definition.classes.iter().cloned().collect(),
        properties,
        extraction_method,
        created_at: now(),
        created_by: contributor,
        visibility: Visibility::Default,
        unlisted_by: None,
    };
    inner.contributions.insert(id.clone(), contribution);
    Ok((id, count))
}

fn create_nested(
    store: &GraphStore,
    inner: &mut StoreInner,
    subject: &ThingId,
    statements: &BTreeMap<String, Vec<StatementObject>>,
    mapping: &BTreeMap<String, ThingId>,
    contributor: ContributorId,
) -> ApiResult<u64> {
    let mut count = 0;
    for (predicate_key, objects) in statements {
        let predicate = resolve(mapping, predicate_key)?;
        for object in objects {
            let object_id = resolve(mapping, &object.id)?;
            record_statement(inner, subject, &predicate, &object_id, contributor)?;
            count += 1;
            if let Some(nested) = &object.statements {
                count += create_nested(store, inner, &object_id, nested, mapping, contributor)?;
            }
        }
    }
    Ok(count)
}

fn resolve(mapping: &BTreeMap<String, ThingId>, key: &str) -> ApiResult<ThingId> {
    if key.starts_with('#') {
        return mapping
            .get(key)
            .cloned()
            .ok_or_else(|| ApiError::ThingNotDefined(key.to_string()));
    }
    ThingId::new(key).map_err(|_| ApiError::ThingNotDefined(key.to_string()))
}

fn record_statement(
    inner: &mut StoreInner,
    subject: &ThingId,
    predicate: &ThingId,
    object_id: &ThingId,
    contributor: ContributorId,
) -> ApiResult<()> {
    let object = inner
        .thing_reference(object_id)
        .ok_or_else(|| ApiError::ThingNotDefined(object_id.to_string()))?;
    inner
        .statements
        .entry(subject.clone())
        .or_default()
        .entry(predicate.clone())
        .or_default()
        .push(StatementRecord { object, created_at: now(), created_by: contributor });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::commands::ResourceDefinition;
    use std::collections::BTreeSet;

    fn definitions_with_resource(temp_id: &str) -> ThingDefinitions {
        let mut things = ThingDefinitions::default();
        things.resources.insert(
            temp_id.to_string(),
            ResourceDefinition { label: "MOTO".to_string(), classes: BTreeSet::new() },
        );
        things
    }

    #[tokio::test]
    async fn rejects_temp_id_without_prefix() {
        let store = GraphStore::new();
        let inner = store.read().await;
        let things = definitions_with_resource("temp1");
        let result = validate(&inner, &things, &[]);
        assert!(matches!(result, Err(ApiError::InvalidTempId(id)) if id == "temp1"));
    }

    #[tokio::test]
    async fn rejects_undefined_statement_object() {
        let store = GraphStore::new();
        store.seed_predicate("P32", "has research problem").await;
        let inner = store.read().await;
        let contribution = ContributionDefinition {
            label: "Contribution 1".to_string(),
            classes: BTreeSet::new(),
            statements: BTreeMap::from([(
                "P32".to_string(),
                vec![StatementObject { id: "#missing".to_string(), statements: None }],
            )]),
        };
        let result = validate(&inner, &ThingDefinitions::default(), &[&contribution]);
        assert!(matches!(result, Err(ApiError::ThingNotDefined(id)) if id == "#missing"));
    }

    #[tokio::test]
    async fn materializes_and_links_statements() {
        let store = GraphStore::new();
        store.seed_predicate("P32", "has research problem").await;
        let things = definitions_with_resource("#temp1");
        let contribution = ContributionDefinition {
            label: "Contribution 1".to_string(),
            classes: BTreeSet::new(),
            statements: BTreeMap::from([(
                "P32".to_string(),
                vec![StatementObject { id: "#temp1".to_string(), statements: None }],
            )]),
        };

        let mut inner = store.write().await;
        validate(&inner, &things, &[&contribution]).unwrap();
        let mapping = materialize(&store, &mut inner, &things, ContributorId::UNKNOWN);
        let (id, count) = create_contribution(
            &store,
            &mut inner,
            &contribution,
            &mapping,
            ContributorId::UNKNOWN,
            ExtractionMethod::Manual,
        )
        .unwrap();

        assert_eq!(count, 1);
        let stored = &inner.contributions[&id];
        let predicate = ThingId::new("P32").unwrap();
        assert_eq!(stored.properties[&predicate], vec![mapping["#temp1"].clone()]);
        assert!(inner.statements.contains_key(&id));
    }
}
