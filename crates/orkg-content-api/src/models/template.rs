//! Template and template instance representations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::common::{
    ContributorId, ExtractionMethod, LabeledObject, ObservatoryId, OrganizationId, ThingId,
    ThingReference, Timestamp, Visibility,
};

fn template_class() -> String {
    "template".to_string()
}

/// A template constraining instances of its target class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub formatted_label: Option<String>,
    pub target_class: ClassReference,
    pub relations: TemplateRelations,
    pub properties: Vec<TemplateProperty>,
    pub is_closed: bool,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    pub extraction_method: ExtractionMethod,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_by: Option<ContributorId>,
    #[serde(rename = "_class", default = "template_class")]
    pub json_class: String,
}

/// A class reference with an optional ontology URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReference {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub uri: Option<Url>,
}

/// Research fields, problems and predicate a template relates to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRelations {
    #[serde(default)]
    pub research_fields: Vec<LabeledObject>,
    #[serde(default)]
    pub research_problems: Vec<LabeledObject>,
    #[serde(default)]
    pub predicate: Option<LabeledObject>,
}

/// Shape constraint of a template, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateProperty {
    Untyped {
        #[serde(flatten)]
        base: TemplatePropertyBase,
    },
    StringLiteral {
        #[serde(flatten)]
        base: TemplatePropertyBase,
        #[serde(default)]
        pattern: Option<String>,
        datatype: ClassReference,
    },
    NumberLiteral {
        #[serde(flatten)]
        base: TemplatePropertyBase,
        #[serde(default)]
        min_inclusive: Option<f64>,
        #[serde(default)]
        max_inclusive: Option<f64>,
        datatype: ClassReference,
    },
    OtherLiteral {
        #[serde(flatten)]
        base: TemplatePropertyBase,
        datatype: ClassReference,
    },
    Resource {
        #[serde(flatten)]
        base: TemplatePropertyBase,
        class: LabeledObject,
    },
}

impl TemplateProperty {
    /// Shared fields of the property.
    #[must_use]
    pub fn base(&self) -> &TemplatePropertyBase {
        match self {
            Self::Untyped { base }
            | Self::StringLiteral { base, .. }
            | Self::NumberLiteral { base, .. }
            | Self::OtherLiteral { base, .. }
            | Self::Resource { base, .. } => base,
        }
    }
}

/// Fields common to every template property kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePropertyBase {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub order: u64,
    #[serde(default)]
    pub min_count: Option<u32>,
    #[serde(default)]
    pub max_count: Option<u32>,
    /// Predicate the property constrains.
    pub path: LabeledObject,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
}

/// A plain graph resource, the root of a template instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub classes: Vec<ThingId>,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    pub extraction_method: ExtractionMethod,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_by: Option<ContributorId>,
}

/// A resource viewed through the lens of a template: the root plus the
/// statements selected by the template properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInstance {
    pub root: Resource,
    /// Predicate id to statements about the root via that predicate.
    pub statements: BTreeMap<ThingId, Vec<EmbeddedStatement>>,
}

/// Statement embedded in a template instance, possibly nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedStatement {
    pub thing: ThingReference,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    #[serde(default)]
    pub statements: BTreeMap<ThingId, Vec<EmbeddedStatement>>,
}
