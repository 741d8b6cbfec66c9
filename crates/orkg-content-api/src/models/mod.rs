//! Wire representations of the content-types API.
//!
//! All models serialize with snake_case field names; optional fields
//! use `#[serde(default)]` so partial documents deserialize cleanly.
//! Polymorphic shapes (sections, thing references, template properties)
//! are internally tagged enums matching the `type`/`_class`
//! discriminators of the JSON contract.

mod common;
mod comparison;
mod dataset;
mod literature_list;
mod paper;
mod research_field;
mod rosetta_stone;
mod smart_review;
mod template;

pub use common::{
    Author, Certainty, ContributorId, ExtractionMethod, IdentifierMap, InvalidThingId,
    LabeledObject, ObservatoryId, OrganizationId, Page, PageMetadata, PageRequest,
    PublicationInfo, ResourceReference, ThingId, ThingReference, Timestamp, Visibility,
    VisibilityFilter,
};
pub use comparison::{
    Comparison, ComparisonRelatedFigure, ComparisonRelatedResource, HeadVersion,
    PublishedVersion, VersionInfo,
};
pub use dataset::{BenchmarkSummary, Dataset};
pub use literature_list::{
    ListSectionEntry, LiteratureList, LiteratureListSection, PublishedContent,
};
pub use paper::{Contribution, Paper, PaperWithStatementCount};
pub use research_field::{ResearchFieldHierarchyEntry, ResearchFieldWithChildCount};
pub use rosetta_stone::RosettaStoneStatement;
pub use smart_review::{SmartReview, SmartReviewSection};
pub use template::{
    ClassReference, EmbeddedStatement, Resource, Template, TemplateInstance, TemplateProperty,
    TemplatePropertyBase, TemplateRelations,
};
