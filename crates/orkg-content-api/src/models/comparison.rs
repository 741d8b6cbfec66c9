//! Comparison representations, including related resources and figures.

use serde::{Deserialize, Serialize};

use super::common::{
    Author, ContributorId, ExtractionMethod, IdentifierMap, LabeledObject, ObservatoryId,
    OrganizationId, PublicationInfo, ThingId, Timestamp, Visibility,
};

fn comparison_class() -> String {
    "comparison".to_string()
}

/// A comparison of paper contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub id: ThingId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub research_fields: Vec<LabeledObject>,
    #[serde(default)]
    pub identifiers: IdentifierMap,
    pub publication_info: PublicationInfo,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub sdgs: Vec<LabeledObject>,
    #[serde(default)]
    pub contributions: Vec<LabeledObject>,
    #[serde(default)]
    pub visualizations: Vec<LabeledObject>,
    #[serde(default)]
    pub related_figures: Vec<LabeledObject>,
    #[serde(default)]
    pub related_resources: Vec<LabeledObject>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    pub extraction_method: ExtractionMethod,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    /// Published versions, newest first.
    #[serde(default)]
    pub versions: Vec<PublishedVersion>,
    pub is_anonymized: bool,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_by: Option<ContributorId>,
    #[serde(rename = "_class", default = "comparison_class")]
    pub json_class: String,
}

/// A snapshot created by publishing a versioned content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedVersion {
    pub id: ThingId,
    pub label: String,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    #[serde(default)]
    pub changelog: Option<String>,
}

/// Version info of literature lists and smart reviews: the live head
/// plus all published snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub head: HeadVersion,
    #[serde(default)]
    pub published: Vec<PublishedVersion>,
}

/// The unpublished head version of a versioned content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadVersion {
    pub id: ThingId,
    pub label: String,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
}

/// A resource related to a comparison (e.g. an external website).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRelatedResource {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
}

/// A figure attached to a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRelatedFigure {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
}
