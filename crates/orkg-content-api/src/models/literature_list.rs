//! Literature list representations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::common::{
    Author, ContributorId, ExtractionMethod, LabeledObject, ObservatoryId, OrganizationId,
    ResourceReference, ThingId, Timestamp, Visibility,
};
use super::comparison::VersionInfo;

fn literature_list_class() -> String {
    "literature-list".to_string()
}

/// A curated list of scholarly works, made of text and list sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteratureList {
    pub id: ThingId,
    pub title: String,
    pub research_fields: Vec<LabeledObject>,
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
    pub sections: Vec<LiteratureListSection>,
    /// Contributor id to share of statements contributed.
    #[serde(default)]
    pub acknowledgements: BTreeMap<ContributorId, f64>,
    #[serde(rename = "_class", default = "literature_list_class")]
    pub json_class: String,
}

/// Section of a literature list, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiteratureListSection {
    List { id: ThingId, entries: Vec<ListSectionEntry> },
    Text { id: ThingId, heading: String, heading_size: u8, text: String },
}

impl LiteratureListSection {
    /// Id of the section resource.
    #[must_use]
    pub fn id(&self) -> &ThingId {
        match self {
            Self::List { id, .. } | Self::Text { id, .. } => id,
        }
    }
}

/// A thing referenced by a published literature list or smart review
/// version, as returned by the published-contents endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishedContent {
    Paper(Box<super::paper::Paper>),
    Resource(super::template::Resource),
}

/// An entry of a list section: a referenced work plus an optional note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSectionEntry {
    pub value: ResourceReference,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_use_type_tag() {
        let json = r#"{
            "type": "text",
            "id": "R154686",
            "heading": "Heading",
            "heading_size": 2,
            "text": "text section contents"
        }"#;
        let section: LiteratureListSection = serde_json::from_str(json).unwrap();
        assert_eq!(section.id().as_str(), "R154686");
        assert!(matches!(section, LiteratureListSection::Text { heading_size: 2, .. }));

        let json = r#"{
            "type": "list",
            "id": "R456351",
            "entries": [{
                "value": {"id": "R154687", "label": "Paper", "classes": ["Paper"]},
                "description": "entry description"
            }]
        }"#;
        let section: LiteratureListSection = serde_json::from_str(json).unwrap();
        match section {
            LiteratureListSection::List { entries, .. } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].value.id.as_str(), "R154687");
            }
            LiteratureListSection::Text { .. } => panic!("expected list section"),
        }
    }
}
