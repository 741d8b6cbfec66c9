//! Research field hierarchy representations.

use serde::{Deserialize, Serialize};

use super::common::ThingId;
use super::template::Resource;

/// A research field together with the number of direct subfields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchFieldWithChildCount {
    pub resource: Resource,
    pub child_count: u64,
}

/// A research field and the ids of its direct parents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchFieldHierarchyEntry {
    pub resource: Resource,
    #[serde(default)]
    pub parent_ids: Vec<ThingId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::{ContributorId, ExtractionMethod, Visibility};

    fn field(id: &str) -> Resource {
        Resource {
            id: ThingId::new(id).unwrap(),
            label: format!("field {id}"),
            classes: vec![ThingId::new("ResearchField").unwrap()],
            created_at: "2023-01-24T10:27:00+01:00".parse().unwrap(),
            created_by: ContributorId::UNKNOWN,
            observatories: vec![],
            organizations: vec![],
            extraction_method: ExtractionMethod::Unknown,
            visibility: Visibility::Default,
            unlisted_by: None,
        }
    }

    #[test]
    fn hierarchy_entry_serializes_parent_ids() {
        let entry = ResearchFieldHierarchyEntry {
            resource: field("R14"),
            parent_ids: vec![ThingId::new("R11").unwrap()],
        };
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["resource"]["id"], "R14");
        assert_eq!(value["parent_ids"][0], "R11");
    }

    #[test]
    fn child_count_wire_name() {
        let entry = ResearchFieldWithChildCount { resource: field("R14"), child_count: 3 };
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["child_count"], 3);
    }
}
