//! In-memory graph store backing the content-type services.
//!
//! One `RwLock`ed state bag shared by all services, plus an atomic id
//! generator. Seeding helpers populate the graph entities the API does
//! not create itself (research fields, templates, datasets, classes).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::Url;

use crate::models::{
    BenchmarkSummary, ClassReference, Comparison, ComparisonRelatedFigure,
    ComparisonRelatedResource, Contribution, ContributorId, Dataset, ExtractionMethod,
    LabeledObject, LiteratureList, Paper, PublishedVersion, Resource, RosettaStoneStatement,
    SmartReview, Template, ThingId, ThingReference, Timestamp, Visibility,
};

/// Class id marking research field resources.
pub const RESEARCH_FIELD_CLASS: &str = "ResearchField";

/// Current time in the wire timestamp type.
#[must_use]
pub fn now() -> Timestamp {
    chrono::Utc::now().fixed_offset()
}

/// A stored literal value.
#[derive(Debug, Clone)]
pub struct LiteralRecord {
    pub label: String,
    pub datatype: String,
}

/// A stored predicate.
#[derive(Debug, Clone)]
pub struct PredicateRecord {
    pub label: String,
    pub description: Option<String>,
}

/// A stored class.
#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub label: String,
    pub uri: Option<Url>,
}

/// A single subject-predicate-object statement with its provenance.
#[derive(Debug, Clone)]
pub struct StatementRecord {
    pub object: ThingReference,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
}

/// Mutable state of the graph, behind [`GraphStore`]'s lock.
#[derive(Debug, Default)]
pub struct StoreInner {
    pub papers: BTreeMap<ThingId, Paper>,
    pub paper_contributors: BTreeMap<ThingId, Vec<ContributorId>>,
    pub paper_statement_counts: BTreeMap<ThingId, u64>,
    pub paper_versions: BTreeMap<ThingId, Vec<PublishedVersion>>,
    pub contributions: BTreeMap<ThingId, Contribution>,
    pub comparisons: BTreeMap<ThingId, Comparison>,
    /// Related resource id to owning comparison and payload.
    pub related_resources: BTreeMap<ThingId, (ThingId, ComparisonRelatedResource)>,
    pub related_figures: BTreeMap<ThingId, (ThingId, ComparisonRelatedFigure)>,
    pub literature_lists: BTreeMap<ThingId, LiteratureList>,
    pub smart_reviews: BTreeMap<ThingId, SmartReview>,
    /// Version id to the frozen list state captured when publishing.
    pub published_list_versions: BTreeMap<ThingId, LiteratureList>,
    /// Version id to the frozen review state captured when publishing.
    pub published_review_versions: BTreeMap<ThingId, SmartReview>,
    /// Container id to ids of things referenced by its published versions.
    pub published_contents: BTreeMap<ThingId, BTreeSet<ThingId>>,
    /// Statement id to its versions, oldest first.
    pub rosetta_statements: BTreeMap<ThingId, Vec<RosettaStoneStatement>>,
    /// Version id to the statement it belongs to.
    pub rosetta_versions: BTreeMap<ThingId, ThingId>,
    pub templates: BTreeMap<ThingId, Template>,
    pub resources: BTreeMap<ThingId, Resource>,
    pub literals: BTreeMap<ThingId, LiteralRecord>,
    pub predicates: BTreeMap<ThingId, PredicateRecord>,
    pub classes: BTreeMap<ThingId, ClassRecord>,
    /// Subject id to predicate id to statements.
    pub statements: BTreeMap<ThingId, BTreeMap<ThingId, Vec<StatementRecord>>>,
    pub research_field_parents: BTreeMap<ThingId, BTreeSet<ThingId>>,
    pub research_field_children: BTreeMap<ThingId, BTreeSet<ThingId>>,
    pub research_problems: BTreeMap<ThingId, String>,
    pub problem_datasets: BTreeMap<ThingId, Vec<Dataset>>,
    pub dataset_problems: BTreeMap<ThingId, Vec<LabeledObject>>,
    /// Research field id to benchmark summaries within that field.
    pub benchmarks: Vec<(ThingId, BenchmarkSummary)>,
}

impl StoreInner {
    /// Resolve any known thing id to a typed reference.
    #[must_use]
    pub fn thing_reference(&self, id: &ThingId) -> Option<ThingReference> {
        if let Some(resource) = self.resources.get(id) {
            return Some(ThingReference::ResourceRef {
                id: resource.id.clone(),
                label: resource.label.clone(),
                classes: resource.classes.clone(),
            });
        }
        if let Some(literal) = self.literals.get(id) {
            return Some(ThingReference::LiteralRef {
                label: literal.label.clone(),
                datatype: literal.datatype.clone(),
            });
        }
        if let Some(predicate) = self.predicates.get(id) {
            return Some(ThingReference::PredicateRef {
                id: id.clone(),
                label: predicate.label.clone(),
            });
        }
        if let Some(class) = self.classes.get(id) {
            return Some(ThingReference::ClassRef {
                id: id.clone(),
                label: class.label.clone(),
                uri: class.uri.clone(),
            });
        }
        None
    }

    /// Resolve an id to its label, falling back across entity kinds.
    #[must_use]
    pub fn label_of(&self, id: &ThingId) -> Option<String> {
        self.resources
            .get(id)
            .map(|resource| resource.label.clone())
            .or_else(|| self.predicates.get(id).map(|predicate| predicate.label.clone()))
            .or_else(|| self.classes.get(id).map(|class| class.label.clone()))
            .or_else(|| self.literals.get(id).map(|literal| literal.label.clone()))
            .or_else(|| self.research_problems.get(id).cloned())
    }

    /// Id/label pair of a labeled graph entity.
    #[must_use]
    pub fn labeled(&self, id: &ThingId) -> Option<LabeledObject> {
        self.label_of(id).map(|label| LabeledObject { id: id.clone(), label })
    }

    /// Whether the resource exists and carries the research field class.
    #[must_use]
    pub fn is_research_field(&self, id: &ThingId) -> bool {
        self.resources
            .get(id)
            .is_some_and(|resource| resource.classes.iter().any(|c| c.as_str() == RESEARCH_FIELD_CLASS))
    }

    /// The field itself plus all transitive subfields.
    #[must_use]
    pub fn subfields_closure(&self, id: &ThingId) -> BTreeSet<ThingId> {
        let mut closure = BTreeSet::new();
        let mut queue = vec![id.clone()];
        while let Some(current) = queue.pop() {
            if !closure.insert(current.clone()) {
                continue;
            }
            if let Some(children) = self.research_field_children.get(&current) {
                queue.extend(children.iter().cloned());
            }
        }
        closure
    }
}

/// Shared graph state plus a monotonic id generator.
#[derive(Debug)]
pub struct GraphStore {
    inner: RwLock<StoreInner>,
    counter: AtomicU64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            // Seeded ids use small numbers; generated ids start well above.
            counter: AtomicU64::new(100_000),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().await
    }

    /// Mint a fresh id with the given prefix (`R`, `L`, `P`, `C`).
    #[must_use]
    pub fn next_id(&self, prefix: &str) -> ThingId {
        let number = self.counter.fetch_add(1, Ordering::Relaxed);
        ThingId::new(format!("{prefix}{number}")).expect("valid thing id")
    }

    /// Seed a plain resource.
    pub async fn seed_resource(&self, id: &str, label: &str, classes: &[&str]) -> ThingId {
        let id = ThingId::new(id).expect("valid thing id");
        let resource = Resource {
            id: id.clone(),
            label: label.to_string(),
            classes: classes
                .iter()
                .map(|class| ThingId::new(*class).expect("valid thing id"))
                .collect(),
            created_at: now(),
            created_by: ContributorId::UNKNOWN,
            observatories: vec![],
            organizations: vec![],
            extraction_method: ExtractionMethod::Unknown,
            visibility: Visibility::Default,
            unlisted_by: None,
        };
        self.write().await.resources.insert(id.clone(), resource);
        id
    }

    /// Seed a research field resource, optionally under a parent field.
    pub async fn seed_research_field(&self, id: &str, label: &str, parent: Option<&str>) -> ThingId {
        let id = self.seed_resource(id, label, &[RESEARCH_FIELD_CLASS]).await;
        if let Some(parent) = parent {
            let parent = ThingId::new(parent).expect("valid thing id");
            let mut inner = self.write().await;
            inner
                .research_field_parents
                .entry(id.clone())
                .or_default()
                .insert(parent.clone());
            inner.research_field_children.entry(parent).or_default().insert(id.clone());
        }
        id
    }

    /// Seed a predicate.
    pub async fn seed_predicate(&self, id: &str, label: &str) -> ThingId {
        let id = ThingId::new(id).expect("valid thing id");
        self.write().await.predicates.insert(
            id.clone(),
            PredicateRecord { label: label.to_string(), description: None },
        );
        id
    }

    /// Seed a class.
    pub async fn seed_class(&self, id: &str, label: &str) -> ThingId {
        let id = ThingId::new(id).expect("valid thing id");
        self.write()
            .await
            .classes
            .insert(id.clone(), ClassRecord { label: label.to_string(), uri: None });
        id
    }

    /// Seed a literal.
    pub async fn seed_literal(&self, id: &str, label: &str, datatype: &str) -> ThingId {
        let id = ThingId::new(id).expect("valid thing id");
        self.write().await.literals.insert(
            id.clone(),
            LiteralRecord { label: label.to_string(), datatype: datatype.to_string() },
        );
        id
    }

    /// Seed a template. The target class is registered as a class so
    /// instances can reference it.
    pub async fn seed_template(&self, template: Template) {
        let mut inner = self.write().await;
        inner.classes.entry(template.target_class.id.clone()).or_insert_with(|| ClassRecord {
            label: template.target_class.label.clone(),
            uri: template.target_class.uri.clone(),
        });
        inner.templates.insert(template.id.clone(), template);
    }

    /// Seed a research problem with its datasets.
    pub async fn seed_research_problem(&self, id: &str, label: &str, datasets: Vec<Dataset>) {
        let id = ThingId::new(id).expect("valid thing id");
        let mut inner = self.write().await;
        let problem = LabeledObject { id: id.clone(), label: label.to_string() };
        for dataset in &datasets {
            inner
                .dataset_problems
                .entry(dataset.id.clone())
                .or_default()
                .push(problem.clone());
        }
        inner.research_problems.insert(id.clone(), label.to_string());
        inner.problem_datasets.insert(id, datasets);
    }

    /// Seed a benchmark summary within a research field.
    pub async fn seed_benchmark(&self, research_field: &str, summary: BenchmarkSummary) {
        let field = ThingId::new(research_field).expect("valid thing id");
        let mut inner = self.write().await;
        inner
            .research_problems
            .entry(summary.research_problem.id.clone())
            .or_insert_with(|| summary.research_problem.label.clone());
        inner.benchmarks.push((field, summary));
    }

    /// Record the target class of a class reference, used when seeding
    /// resources against templates in tests.
    pub async fn seed_class_reference(&self, class: &ClassReference) {
        self.write().await.classes.entry(class.id.clone()).or_insert_with(|| ClassRecord {
            label: class.label.clone(),
            uri: class.uri.clone(),
        });
    }

    /// Append a statement to the graph.
    pub async fn seed_statement(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        object: ThingReference,
        created_by: ContributorId,
    ) {
        let mut inner = self.write().await;
        inner
            .statements
            .entry(subject.clone())
            .or_default()
            .entry(predicate.clone())
            .or_default()
            .push(StatementRecord { object, created_at: now(), created_by });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn id_generation_is_monotonic() {
        let store = GraphStore::new();
        let first = store.next_id("R");
        let second = store.next_id("R");
        assert_ne!(first, second);
        assert!(first.as_str().starts_with('R'));
    }

    #[tokio::test]
    async fn subfields_closure_is_transitive() {
        let store = GraphStore::new();
        store.seed_research_field("R1", "Science", None).await;
        store.seed_research_field("R2", "Computer Science", Some("R1")).await;
        store.seed_research_field("R3", "Databases", Some("R2")).await;

        let inner = store.read().await;
        let root = ThingId::new("R1").unwrap();
        let closure = inner.subfields_closure(&root);
        assert_eq!(closure.len(), 3);
        assert!(closure.contains(&ThingId::new("R3").unwrap()));
        assert!(inner.is_research_field(&root));
    }

    #[tokio::test]
    async fn thing_reference_resolution() {
        let store = GraphStore::new();
        store.seed_resource("R1", "resource", &[]).await;
        store.seed_literal("L1", "42", "xsd:integer").await;

        let inner = store.read().await;
        let reference = inner.thing_reference(&ThingId::new("L1").unwrap()).unwrap();
        assert!(matches!(reference, ThingReference::LiteralRef { .. }));
        assert!(inner.thing_reference(&ThingId::new("R404").unwrap()).is_none());
    }
}
