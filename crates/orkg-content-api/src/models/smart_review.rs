//! Smart review representations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::common::{
    Author, ContributorId, ExtractionMethod, IdentifierMap, LabeledObject, ObservatoryId,
    OrganizationId, ResourceReference, ThingId, ThingReference, Timestamp, Visibility,
};
use super::comparison::VersionInfo;

fn smart_review_class() -> String {
    "smart-review".to_string()
}

/// A living literature review built from graph-backed sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartReview {
    pub id: ThingId,
    pub title: String,
    pub research_fields: Vec<LabeledObject>,
    #[serde(default)]
    pub identifiers: IdentifierMap,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub versions: VersionInfo,
    #[serde(default)]
    pub sdgs: Vec<LabeledObject>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    pub extraction_method: ExtractionMethod,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_by: Option<ContributorId>,
    pub published: bool,
    #[serde(default)]
    pub sections: Vec<SmartReviewSection>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub acknowledgements: BTreeMap<ContributorId, f64>,
    #[serde(rename = "_class", default = "smart_review_class")]
    pub json_class: String,
}

/// Section of a smart review, discriminated by `type`.
///
/// The `property` wire name for predicate sections is historical.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SmartReviewSection {
    Comparison {
        id: ThingId,
        heading: String,
        #[serde(default)]
        comparison: Option<ResourceReference>,
    },
    Visualization {
        id: ThingId,
        heading: String,
        #[serde(default)]
        visualization: Option<ResourceReference>,
    },
    Resource {
        id: ThingId,
        heading: String,
        #[serde(default)]
        resource: Option<ResourceReference>,
    },
    #[serde(rename = "property")]
    Predicate {
        id: ThingId,
        heading: String,
        #[serde(default)]
        predicate: Option<LabeledObject>,
    },
    Ontology {
        id: ThingId,
        heading: String,
        #[serde(default)]
        entities: Vec<ThingReference>,
        #[serde(default)]
        predicates: Vec<LabeledObject>,
    },
    Text {
        id: ThingId,
        heading: String,
        #[serde(default)]
        classes: Vec<ThingId>,
        text: String,
    },
}

impl SmartReviewSection {
    /// Id of the section resource.
    #[must_use]
    pub fn id(&self) -> &ThingId {
        match self {
            Self::Comparison { id, .. }
            | Self::Visualization { id, .. }
            | Self::Resource { id, .. }
            | Self::Predicate { id, .. }
            | Self::Ontology { id, .. }
            | Self::Text { id, .. } => id,
        }
    }

    /// Heading shown above the section.
    #[must_use]
    pub fn heading(&self) -> &str {
        match self {
            Self::Comparison { heading, .. }
            | Self::Visualization { heading, .. }
            | Self::Resource { heading, .. }
            | Self::Predicate { heading, .. }
            | Self::Ontology { heading, .. }
            | Self::Text { heading, .. } => heading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_section_uses_property_tag() {
        let json = r#"{
            "type": "property",
            "id": "R456471",
            "heading": "predicate section heading",
            "predicate": {"id": "P1", "label": "predicate label"}
        }"#;
        let section: SmartReviewSection = serde_json::from_str(json).unwrap();
        assert!(matches!(section, SmartReviewSection::Predicate { .. }));
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["type"], "property");
    }

    #[test]
    fn ontology_section_entities() {
        let json = r#"{
            "type": "ontology",
            "id": "R456481",
            "heading": "ontology section heading",
            "entities": [{"_class": "resource_ref", "id": "R1", "label": "entity"}],
            "predicates": [{"id": "P1", "label": "predicate"}]
        }"#;
        let section: SmartReviewSection = serde_json::from_str(json).unwrap();
        match &section {
            SmartReviewSection::Ontology { entities, predicates, .. } => {
                assert_eq!(entities.len(), 1);
                assert_eq!(predicates.len(), 1);
            }
            _ => panic!("expected ontology section"),
        }
        assert_eq!(section.heading(), "ontology section heading");
    }
}
