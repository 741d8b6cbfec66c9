//! Paper and contribution representations.

use serde::{Deserialize, Serialize};

use super::common::{
    Author, ContributorId, ExtractionMethod, IdentifierMap, LabeledObject, ObservatoryId,
    OrganizationId, PublicationInfo, ResourceReference, ThingId, Timestamp, Visibility,
};

fn paper_class() -> String {
    "paper".to_string()
}

/// A scholarly paper as exposed by the content-types API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub id: ThingId,
    pub title: String,
    pub research_fields: Vec<LabeledObject>,
    #[serde(default)]
    pub identifiers: IdentifierMap,
    pub publication_info: PublicationInfo,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub contributions: Vec<LabeledObject>,
    #[serde(default)]
    pub sdgs: Vec<LabeledObject>,
    #[serde(default)]
    pub mentionings: Vec<ResourceReference>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    pub extraction_method: ExtractionMethod,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    pub verified: bool,
    pub visibility: Visibility,
    pub modifiable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_by: Option<ContributorId>,
    #[serde(rename = "_class", default = "paper_class")]
    pub json_class: String,
}

impl Paper {
    /// The DOI of the paper, if one is recorded.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.identifiers.get("doi").and_then(|values| values.first()).map(String::as_str)
    }
}

/// A single contribution of a paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub classes: Vec<ThingId>,
    /// Predicate id to object ids, the statement skeleton of the contribution.
    #[serde(default)]
    pub properties: std::collections::BTreeMap<ThingId, Vec<ThingId>>,
    pub extraction_method: ExtractionMethod,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_by: Option<ContributorId>,
}

/// Row of the `/api/papers/statement-counts` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperWithStatementCount {
    pub id: ThingId,
    pub title: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::PageRequest;
    use crate::models::Page;

    fn minimal_paper() -> Paper {
        Paper {
            id: ThingId::new("R8186").unwrap(),
            title: "Dummy Paper Title".to_string(),
            research_fields: vec![LabeledObject {
                id: ThingId::new("R456").unwrap(),
                label: "Research Field 1".to_string(),
            }],
            identifiers: IdentifierMap::from([(
                "doi".to_string(),
                vec!["10.1000/182".to_string()],
            )]),
            publication_info: PublicationInfo::default(),
            authors: vec![],
            contributions: vec![],
            sdgs: vec![],
            mentionings: vec![],
            observatories: vec![],
            organizations: vec![],
            extraction_method: ExtractionMethod::Unknown,
            created_at: "2023-04-12T16:05:05+02:00".parse().unwrap(),
            created_by: ContributorId::UNKNOWN,
            verified: false,
            visibility: Visibility::Default,
            modifiable: true,
            unlisted_by: None,
            json_class: paper_class(),
        }
    }

    #[test]
    fn paper_serializes_with_class_discriminator() {
        let value = serde_json::to_value(minimal_paper()).unwrap();
        assert_eq!(value["_class"], "paper");
        assert_eq!(value["identifiers"]["doi"][0], "10.1000/182");
        assert_eq!(value["visibility"], "DEFAULT");
        assert!(value.get("unlisted_by").is_none());
    }

    #[test]
    fn paper_doi_accessor() {
        assert_eq!(minimal_paper().doi(), Some("10.1000/182"));
    }

    #[test]
    fn paper_page_envelope() {
        let page = Page::from_vec(vec![minimal_paper()], PageRequest::default());
        let value = serde_json::to_value(page).unwrap();
        assert_eq!(value["page"]["total_elements"], 1);
        assert_eq!(value["content"][0]["title"], "Dummy Paper Title");
    }
}
