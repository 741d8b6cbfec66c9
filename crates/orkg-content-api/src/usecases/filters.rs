//! Query-string filters accepted by the listing endpoints.

use serde::Deserialize;

use crate::models::{
    ContributorId, ObservatoryId, OrganizationId, PageRequest, ThingId, Timestamp,
    VisibilityFilter,
};

/// Filters shared by comparison, literature list and smart review listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentFilters {
    pub title: Option<String>,
    #[serde(default)]
    pub exact: bool,
    pub visibility: Option<VisibilityFilter>,
    pub created_by: Option<ContributorId>,
    pub created_at_start: Option<Timestamp>,
    pub created_at_end: Option<Timestamp>,
    pub observatory_id: Option<ObservatoryId>,
    pub organization_id: Option<OrganizationId>,
    pub research_field: Option<ThingId>,
    #[serde(default)]
    pub include_subfields: bool,
    pub sdg: Option<ThingId>,
    pub published: Option<bool>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl ContentFilters {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

/// Filters of `GET /api/papers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperFilters {
    pub title: Option<String>,
    #[serde(default)]
    pub exact: bool,
    pub doi: Option<String>,
    pub doi_prefix: Option<String>,
    pub visibility: Option<VisibilityFilter>,
    pub verified: Option<bool>,
    pub created_by: Option<ContributorId>,
    pub created_at_start: Option<Timestamp>,
    pub created_at_end: Option<Timestamp>,
    pub observatory_id: Option<ObservatoryId>,
    pub organization_id: Option<OrganizationId>,
    pub research_field: Option<ThingId>,
    #[serde(default)]
    pub include_subfields: bool,
    pub sdg: Option<ThingId>,
    pub mentionings: Option<ThingId>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PaperFilters {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

/// Filters of `GET /api/rosetta-stone/statements`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosettaStoneStatementFilters {
    pub context: Option<ThingId>,
    pub template_id: Option<ThingId>,
    pub visibility: Option<VisibilityFilter>,
    pub created_by: Option<ContributorId>,
    pub created_at_start: Option<Timestamp>,
    pub created_at_end: Option<Timestamp>,
    pub observatory_id: Option<ObservatoryId>,
    pub organization_id: Option<OrganizationId>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl RosettaStoneStatementFilters {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}
