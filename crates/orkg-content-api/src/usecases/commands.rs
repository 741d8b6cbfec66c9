//! Request payloads accepted by the use-case ports.
//!
//! These are the wire shapes of create/update/publish requests. Handlers
//! deserialize them straight from JSON bodies; the acting contributor is
//! passed alongside, extracted from the `X-Contributor-Id` header.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{
    Author, Certainty, ExtractionMethod, IdentifierMap, ObservatoryId, OrganizationId,
    PublicationInfo, ThingId, Visibility,
};

/// A resource to be created as part of a request, keyed by temp id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub label: String,
    #[serde(default)]
    pub classes: BTreeSet<ThingId>,
}

/// A literal to be created as part of a request, keyed by temp id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralDefinition {
    pub label: String,
    #[serde(default = "default_literal_datatype")]
    pub data_type: String,
}

fn default_literal_datatype() -> String {
    "xsd:string".to_string()
}

/// A predicate to be created as part of a request, keyed by temp id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredicateDefinition {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An ordered list to be created as part of a request, keyed by temp id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDefinition {
    pub label: String,
    #[serde(default)]
    pub elements: Vec<String>,
}

/// Things defined inline by a create request. Map keys are temp ids
/// (`#`-prefixed) that statements may refer to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThingDefinitions {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDefinition>,
    #[serde(default)]
    pub literals: BTreeMap<String, LiteralDefinition>,
    #[serde(default)]
    pub predicates: BTreeMap<String, PredicateDefinition>,
    #[serde(default)]
    pub lists: BTreeMap<String, ListDefinition>,
}

impl ThingDefinitions {
    /// Whether the given temp id is defined by any of the maps.
    #[must_use]
    pub fn defines(&self, temp_id: &str) -> bool {
        self.resources.contains_key(temp_id)
            || self.literals.contains_key(temp_id)
            || self.predicates.contains_key(temp_id)
            || self.lists.contains_key(temp_id)
    }

    /// Temp ids defined more than once across the maps.
    #[must_use]
    pub fn duplicate_ids(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for key in self
            .resources
            .keys()
            .chain(self.literals.keys())
            .chain(self.predicates.keys())
            .chain(self.lists.keys())
        {
            *counts.entry(key.clone()).or_default() += 1;
        }
        counts.retain(|_, count| *count > 1);
        counts
    }

    /// All temp ids defined, in map order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.resources
            .keys()
            .chain(self.literals.keys())
            .chain(self.predicates.keys())
            .chain(self.lists.keys())
            .map(String::as_str)
    }
}

/// An object of a contribution statement. The id is either an existing
/// thing id or a temp id defined by the surrounding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementObject {
    pub id: String,
    /// Statements about this object, keyed by predicate id or temp id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<BTreeMap<String, Vec<StatementObject>>>,
}

/// A contribution with its statement tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionDefinition {
    pub label: String,
    #[serde(default)]
    pub classes: BTreeSet<ThingId>,
    /// Statements about the contribution, keyed by predicate id or temp id.
    #[serde(default)]
    pub statements: BTreeMap<String, Vec<StatementObject>>,
}

/// Inline graph content of a paper create request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperContents {
    #[serde(flatten)]
    pub things: ThingDefinitions,
    #[serde(default)]
    pub contributions: Vec<ContributionDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaperRequest {
    pub title: String,
    #[serde(default)]
    pub research_fields: Vec<ThingId>,
    #[serde(default)]
    pub identifiers: IdentifierMap,
    #[serde(default)]
    pub publication_info: Option<PublicationInfo>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub sdgs: BTreeSet<ThingId>,
    #[serde(default)]
    pub mentionings: BTreeSet<ThingId>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    #[serde(default)]
    pub contents: Option<PaperContents>,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePaperRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub research_fields: Option<Vec<ThingId>>,
    #[serde(default)]
    pub identifiers: Option<IdentifierMap>,
    #[serde(default)]
    pub publication_info: Option<PublicationInfo>,
    #[serde(default)]
    pub authors: Option<Vec<Author>>,
    #[serde(default)]
    pub sdgs: Option<BTreeSet<ThingId>>,
    #[serde(default)]
    pub mentionings: Option<BTreeSet<ThingId>>,
    #[serde(default)]
    pub observatories: Option<Vec<ObservatoryId>>,
    #[serde(default)]
    pub organizations: Option<Vec<OrganizationId>>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

/// Payload of `POST /api/papers/{id}/publish`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishPaperRequest {
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub authors: Vec<Author>,
}

/// Payload of `POST /api/papers/{id}/contributions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContributionRequest {
    #[serde(flatten)]
    pub things: ThingDefinitions,
    pub contribution: ContributionDefinition,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComparisonRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub research_fields: Vec<ThingId>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub sdgs: BTreeSet<ThingId>,
    #[serde(default)]
    pub contributions: Vec<ThingId>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    #[serde(default)]
    pub is_anonymized: bool,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateComparisonRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub research_fields: Option<Vec<ThingId>>,
    #[serde(default)]
    pub authors: Option<Vec<Author>>,
    #[serde(default)]
    pub sdgs: Option<BTreeSet<ThingId>>,
    #[serde(default)]
    pub contributions: Option<Vec<ThingId>>,
    #[serde(default)]
    pub references: Option<Vec<String>>,
    #[serde(default)]
    pub observatories: Option<Vec<ObservatoryId>>,
    #[serde(default)]
    pub organizations: Option<Vec<OrganizationId>>,
    #[serde(default)]
    pub is_anonymized: Option<bool>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

/// Payload of `POST /api/comparisons/{id}/publish`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishComparisonRequest {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComparisonRelatedResourceRequest {
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComparisonRelatedFigureRequest {
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Section payload of literature list create/update requests. The same
/// shape is used when creating or replacing a single section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiteratureListSectionRequest {
    List {
        #[serde(default)]
        entries: Vec<ListSectionEntryRequest>,
    },
    Text {
        heading: String,
        heading_size: u8,
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSectionEntryRequest {
    pub id: ThingId,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLiteratureListRequest {
    pub title: String,
    #[serde(default)]
    pub research_fields: Vec<ThingId>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub sdgs: BTreeSet<ThingId>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    #[serde(default)]
    pub sections: Vec<LiteratureListSectionRequest>,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLiteratureListRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub research_fields: Option<Vec<ThingId>>,
    #[serde(default)]
    pub authors: Option<Vec<Author>>,
    #[serde(default)]
    pub sdgs: Option<BTreeSet<ThingId>>,
    #[serde(default)]
    pub observatories: Option<Vec<ObservatoryId>>,
    #[serde(default)]
    pub organizations: Option<Vec<OrganizationId>>,
    #[serde(default)]
    pub sections: Option<Vec<LiteratureListSectionRequest>>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

/// Payload of literature list and smart review publish requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishContentRequest {
    pub changelog: String,
}

/// Section payload of smart review create/update requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SmartReviewSectionRequest {
    Comparison {
        heading: String,
        #[serde(default)]
        comparison: Option<ThingId>,
    },
    Visualization {
        heading: String,
        #[serde(default)]
        visualization: Option<ThingId>,
    },
    Resource {
        heading: String,
        #[serde(default)]
        resource: Option<ThingId>,
    },
    #[serde(rename = "property")]
    Predicate {
        heading: String,
        #[serde(default)]
        predicate: Option<ThingId>,
    },
    Ontology {
        heading: String,
        #[serde(default)]
        entities: Vec<ThingId>,
        #[serde(default)]
        predicates: Vec<ThingId>,
    },
    Text {
        heading: String,
        #[serde(default)]
        classes: BTreeSet<ThingId>,
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSmartReviewRequest {
    pub title: String,
    #[serde(default)]
    pub research_fields: Vec<ThingId>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub sdgs: BTreeSet<ThingId>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    #[serde(default)]
    pub sections: Vec<SmartReviewSectionRequest>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSmartReviewRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub research_fields: Option<Vec<ThingId>>,
    #[serde(default)]
    pub authors: Option<Vec<Author>>,
    #[serde(default)]
    pub sdgs: Option<BTreeSet<ThingId>>,
    #[serde(default)]
    pub observatories: Option<Vec<ObservatoryId>>,
    #[serde(default)]
    pub organizations: Option<Vec<OrganizationId>>,
    #[serde(default)]
    pub sections: Option<Vec<SmartReviewSectionRequest>>,
    #[serde(default)]
    pub references: Option<Vec<String>>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRosettaStoneStatementRequest {
    pub template_id: ThingId,
    #[serde(default)]
    pub context: Option<ThingId>,
    pub subjects: Vec<ThingId>,
    pub objects: Vec<Vec<ThingId>>,
    pub certainty: Certainty,
    pub negated: bool,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

/// Payload of `POST /api/rosetta-stone/statements/{id}`. Updating a
/// statement appends a new version; the template is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRosettaStoneStatementRequest {
    pub subjects: Vec<ThingId>,
    pub objects: Vec<Vec<ThingId>>,
    pub certainty: Certainty,
    pub negated: bool,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

/// Payload of `PUT /api/templates/{template_id}/instances/{id}`.
///
/// Statement objects are either existing thing ids or temp ids resolved
/// against the `literals` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplateInstanceRequest {
    #[serde(default)]
    pub statements: BTreeMap<ThingId, Vec<String>>,
    #[serde(default)]
    pub literals: BTreeMap<String, LiteralDefinition>,
}
