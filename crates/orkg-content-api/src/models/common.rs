//! Shared value types used by every content type representation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Identifier of a graph entity (resource, predicate, class or literal).
///
/// Thing ids are opaque strings such as `R123` or `P32`. They must be
/// non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThingId(String);

impl ThingId {
    /// Create a thing id, validating the raw value.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidThingId> {
        let value = value.into();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(InvalidThingId(value));
        }
        Ok(Self(value))
    }

    /// The raw string form of the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raised when a string cannot be used as a thing id.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid thing id: {0:?}")]
pub struct InvalidThingId(pub String);

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ThingId {
    type Err = InvalidThingId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ThingId {
    type Error = InvalidThingId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ThingId> for String {
    fn from(id: ThingId) -> Self {
        id.0
    }
}

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Identifier of a contributor (user account).
    ContributorId
}

uuid_id! {
    /// Identifier of an observatory.
    ObservatoryId
}

uuid_id! {
    /// Identifier of an organization.
    OrganizationId
}

impl ContributorId {
    /// The anonymous contributor, used when no user is authenticated.
    pub const UNKNOWN: Self = Self(Uuid::nil());
}

/// Visibility state of a content type entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Default,
    Featured,
    Unlisted,
    Deleted,
}

/// Visibility filter accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityFilter {
    AllListed,
    Unlisted,
    Featured,
    NonFeatured,
    Deleted,
}

impl VisibilityFilter {
    /// Whether an entity with the given visibility passes this filter.
    #[must_use]
    pub fn matches(self, visibility: Visibility) -> bool {
        match self {
            Self::AllListed => {
                matches!(visibility, Visibility::Default | Visibility::Featured)
            }
            Self::Unlisted => visibility == Visibility::Unlisted,
            Self::Featured => visibility == Visibility::Featured,
            Self::NonFeatured => visibility == Visibility::Default,
            Self::Deleted => visibility == Visibility::Deleted,
        }
    }
}

/// How the content entered the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMethod {
    #[default]
    Unknown,
    Manual,
    Automatic,
}

/// Certainty attached to a rosetta-stone statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Certainty {
    Low,
    Moderate,
    High,
}

/// An author of a paper, comparison, literature list or smart review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Resource id, when the author exists in the graph.
    #[serde(default)]
    pub id: Option<ThingId>,

    pub name: String,

    /// Identifier name (e.g. "orcid") to values.
    #[serde(default)]
    pub identifiers: IdentifierMap,

    #[serde(default)]
    pub homepage: Option<Url>,
}

/// Identifier map attached to papers, comparisons and authors.
pub type IdentifierMap = std::collections::BTreeMap<String, Vec<String>>;

/// Venue and date information of a publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationInfo {
    #[serde(default)]
    pub published_month: Option<u8>,

    #[serde(default)]
    pub published_year: Option<i64>,

    #[serde(default)]
    pub published_in: Option<LabeledObject>,

    #[serde(default)]
    pub url: Option<Url>,
}

/// An id/label pair pointing at another graph entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledObject {
    pub id: ThingId,
    pub label: String,
}

/// A resource reference carrying its classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub classes: Vec<ThingId>,
}

/// Reference to any kind of graph entity, discriminated by `_class`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename_all = "snake_case")]
pub enum ThingReference {
    ResourceRef {
        id: ThingId,
        label: String,
        #[serde(default)]
        classes: Vec<ThingId>,
    },
    PredicateRef {
        id: ThingId,
        label: String,
    },
    ClassRef {
        id: ThingId,
        label: String,
        #[serde(default)]
        uri: Option<Url>,
    },
    LiteralRef {
        label: String,
        datatype: String,
    },
}

impl ThingReference {
    /// The referenced id; literals are anonymous.
    #[must_use]
    pub fn id(&self) -> Option<&ThingId> {
        match self {
            Self::ResourceRef { id, .. }
            | Self::PredicateRef { id, .. }
            | Self::ClassRef { id, .. } => Some(id),
            Self::LiteralRef { .. } => None,
        }
    }

    /// The human readable label of the referenced thing.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::ResourceRef { label, .. }
            | Self::PredicateRef { label, .. }
            | Self::ClassRef { label, .. }
            | Self::LiteralRef { label, .. } => label,
        }
    }
}

/// Timestamp type used on all wire representations.
pub type Timestamp = DateTime<FixedOffset>;

/// A page of results with the reduced page metadata projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageMetadata,
}

/// Metadata block of a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Zero-based page index.
    pub number: usize,
    /// Requested page size.
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Build a page by slicing a fully materialized, already filtered list.
    #[must_use]
    pub fn from_vec(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(request.size).max(1);
        // The page index is caller-controlled and unclamped; an offset
        // past usize::MAX is simply past the end.
        let content = match request.page.checked_mul(request.size) {
            Some(offset) => items.into_iter().skip(offset).take(request.size).collect(),
            None => Vec::new(),
        };
        Self {
            content,
            page: PageMetadata {
                number: request.page,
                size: request.size,
                total_elements,
                total_pages,
            },
        }
    }

    /// Map page content while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { content: self.content.into_iter().map(f).collect(), page: self.page }
    }
}

/// Pagination parameters, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: usize,
    /// Page size, always in `1..=MAX_PAGE_SIZE`.
    pub size: usize,
}

impl PageRequest {
    /// Default page size when the `size` query parameter is absent.
    pub const DEFAULT_SIZE: usize = 25;

    /// Upper bound for the `size` query parameter.
    pub const MAX_SIZE: usize = 2500;

    /// Build a request from raw query values, clamping the size.
    #[must_use]
    pub fn new(page: Option<usize>, size: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(Self::DEFAULT_SIZE).clamp(1, Self::MAX_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}
