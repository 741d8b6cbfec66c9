//! Domain errors and their translation to RFC 9457 problem responses.
//!
//! Every service error maps to a stable `orkg:problem:*` type URI, an
//! HTTP status and a problem-detail body carrying error specific
//! properties (`paper_id`, `temp_id`, ...). The `instance` field is
//! filled in by the [`crate::http`] layer, which knows the request path.

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};

use crate::models::ThingId;

/// Media type of problem-detail responses.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Errors surfaced by the content-types services.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Paper \"{0}\" not found.")]
    PaperNotFound(ThingId),

    #[error("Paper with DOI \"{0}\" not found.")]
    PaperNotFoundByDoi(String),

    #[error("Paper with title \"{0}\" not found.")]
    PaperNotFoundByTitle(String),

    #[error("Paper with DOI \"{0}\" already exists.")]
    PaperAlreadyExistsWithDoi(String),

    #[error("Paper with title \"{0}\" already exists.")]
    PaperAlreadyExistsWithTitle(String),

    #[error("Contribution \"{0}\" not found.")]
    ContributionNotFound(ThingId),

    #[error("Comparison \"{0}\" not found.")]
    ComparisonNotFound(ThingId),

    #[error("Comparison related resource \"{0}\" not found.")]
    ComparisonRelatedResourceNotFound(ThingId),

    #[error("Comparison related figure \"{0}\" not found.")]
    ComparisonRelatedFigureNotFound(ThingId),

    #[error("Literature list \"{0}\" not found.")]
    LiteratureListNotFound(ThingId),

    #[error("Literature list section \"{0}\" not found.")]
    LiteratureListSectionNotFound(ThingId),

    #[error("Smart review \"{0}\" not found.")]
    SmartReviewNotFound(ThingId),

    #[error("Smart review section \"{0}\" not found.")]
    SmartReviewSectionNotFound(ThingId),

    #[error("Published content \"{0}\" not found.")]
    PublishedContentNotFound(ThingId),

    #[error("Rosetta stone statement \"{0}\" not found.")]
    RosettaStoneStatementNotFound(ThingId),

    #[error("Rosetta stone statement version \"{0}\" not found.")]
    RosettaStoneStatementVersionNotFound(ThingId),

    #[error("Template \"{0}\" not found.")]
    TemplateNotFound(ThingId),

    #[error("Resource \"{0}\" not found.")]
    ResourceNotFound(ThingId),

    #[error("Dataset \"{0}\" not found.")]
    DatasetNotFound(ThingId),

    #[error("Research field \"{0}\" not found.")]
    ResearchFieldNotFound(ThingId),

    #[error("Research problem \"{0}\" not found.")]
    ResearchProblemNotFound(ThingId),

    #[error("Author \"{0}\" not found.")]
    AuthorNotFound(ThingId),

    #[error(
        "The value passed as query parameter \"doi\" is not a valid DOI. The value sent was: {0}"
    )]
    InvalidDoi(String),

    #[error("Invalid month \"{0}\". Must be in range [1..12].")]
    InvalidMonth(i64),

    #[error("Invalid temp id \"{0}\". Requires \"#\" as prefix.")]
    InvalidTempId(String),

    #[error("Thing \"{0}\" not defined.")]
    ThingNotDefined(String),

    #[error("Duplicate temp ids: {}.", format_duplicates(.0))]
    DuplicateTempIds(BTreeMap<String, usize>),

    #[error("Only one research field is allowed.")]
    OnlyOneResearchFieldAllowed,

    #[error("Only one organization is allowed.")]
    OnlyOneOrganizationAllowed,

    #[error("Only one observatory is allowed.")]
    OnlyOneObservatoryAllowed,

    #[error("At least two contributions are required.")]
    RequiresAtLeastTwoContributions,

    #[error(
        "Template \"{template_id}\" cannot be applied to resource \"{resource_id}\" because the target resource is not an instance of the template target class."
    )]
    TemplateNotApplicable { template_id: ThingId, resource_id: ThingId },

    #[error("Template \"{0}\" is closed.")]
    TemplateClosed(ThingId),

    #[error("Invalid smart review section type \"{0}\".")]
    InvalidSmartReviewSectionType(String),

    #[error("Rosetta stone statement \"{0}\" must not be used as an object of another rosetta stone statement.")]
    NestedRosettaStoneStatement(ThingId),

    #[error("Unable to delete rosetta stone statement \"{0}\" because it is used as context of another statement.")]
    CannotDeleteClaimedStatement(ThingId),

    #[error("Access denied.")]
    Forbidden,

    #[error("Service unavailable.")]
    ServiceUnavailable,

    #[error("{message}")]
    Validation { field: String, message: String },
}

fn format_duplicates(duplicates: &BTreeMap<String, usize>) -> String {
    duplicates
        .iter()
        .map(|(id, count)| format!("{id}={count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    /// Create a field-level validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// HTTP status the error translates to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PaperNotFound(_)
            | Self::PaperNotFoundByDoi(_)
            | Self::PaperNotFoundByTitle(_)
            | Self::ContributionNotFound(_)
            | Self::ComparisonNotFound(_)
            | Self::ComparisonRelatedResourceNotFound(_)
            | Self::ComparisonRelatedFigureNotFound(_)
            | Self::LiteratureListNotFound(_)
            | Self::LiteratureListSectionNotFound(_)
            | Self::SmartReviewNotFound(_)
            | Self::SmartReviewSectionNotFound(_)
            | Self::PublishedContentNotFound(_)
            | Self::RosettaStoneStatementNotFound(_)
            | Self::RosettaStoneStatementVersionNotFound(_)
            | Self::TemplateNotFound(_)
            | Self::ResourceNotFound(_)
            | Self::DatasetNotFound(_)
            | Self::ResearchFieldNotFound(_)
            | Self::ResearchProblemNotFound(_)
            | Self::AuthorNotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable problem type URI of the error.
    #[must_use]
    pub fn problem_type(&self) -> &'static str {
        match self {
            Self::PaperNotFound(_) | Self::PaperNotFoundByDoi(_) | Self::PaperNotFoundByTitle(_) => {
                "orkg:problem:paper_not_found"
            }
            Self::PaperAlreadyExistsWithDoi(_) | Self::PaperAlreadyExistsWithTitle(_) => {
                "orkg:problem:paper_already_exists"
            }
            Self::ContributionNotFound(_) => "orkg:problem:contribution_not_found",
            Self::ComparisonNotFound(_) => "orkg:problem:comparison_not_found",
            Self::ComparisonRelatedResourceNotFound(_) => {
                "orkg:problem:comparison_related_resource_not_found"
            }
            Self::ComparisonRelatedFigureNotFound(_) => {
                "orkg:problem:comparison_related_figure_not_found"
            }
            Self::LiteratureListNotFound(_) => "orkg:problem:literature_list_not_found",
            Self::LiteratureListSectionNotFound(_) => {
                "orkg:problem:literature_list_section_not_found"
            }
            Self::SmartReviewNotFound(_) => "orkg:problem:smart_review_not_found",
            Self::SmartReviewSectionNotFound(_) => "orkg:problem:smart_review_section_not_found",
            Self::PublishedContentNotFound(_) => "orkg:problem:published_content_not_found",
            Self::RosettaStoneStatementNotFound(_) => {
                "orkg:problem:rosetta_stone_statement_not_found"
            }
            Self::RosettaStoneStatementVersionNotFound(_) => {
                "orkg:problem:rosetta_stone_statement_version_not_found"
            }
            Self::TemplateNotFound(_) => "orkg:problem:template_not_found",
            Self::ResourceNotFound(_) => "orkg:problem:resource_not_found",
            Self::DatasetNotFound(_) => "orkg:problem:dataset_not_found",
            Self::ResearchFieldNotFound(_) => "orkg:problem:research_field_not_found",
            Self::ResearchProblemNotFound(_) => "orkg:problem:research_problem_not_found",
            Self::AuthorNotFound(_) => "orkg:problem:author_not_found",
            Self::InvalidDoi(_) => "orkg:problem:invalid_doi",
            Self::InvalidMonth(_) => "orkg:problem:invalid_month",
            Self::InvalidTempId(_) => "orkg:problem:invalid_temp_id",
            Self::ThingNotDefined(_) => "orkg:problem:thing_not_defined",
            Self::DuplicateTempIds(_) => "orkg:problem:duplicate_temp_ids",
            Self::OnlyOneResearchFieldAllowed => "orkg:problem:only_one_research_field_allowed",
            Self::OnlyOneOrganizationAllowed => "orkg:problem:only_one_organization_allowed",
            Self::OnlyOneObservatoryAllowed => "orkg:problem:only_one_observatory_allowed",
            Self::RequiresAtLeastTwoContributions => {
                "orkg:problem:requires_at_least_two_contributions"
            }
            Self::TemplateNotApplicable { .. } => "orkg:problem:template_not_applicable",
            Self::TemplateClosed(_) => "orkg:problem:template_closed",
            Self::InvalidSmartReviewSectionType(_) => {
                "orkg:problem:invalid_smart_review_section_type"
            }
            Self::NestedRosettaStoneStatement(_) => {
                "orkg:problem:nested_rosetta_stone_statement"
            }
            Self::CannotDeleteClaimedStatement(_) => {
                "orkg:problem:cannot_delete_claimed_statement"
            }
            Self::Forbidden => "orkg:problem:access_denied",
            Self::ServiceUnavailable => "orkg:problem:service_unavailable",
            Self::Validation { .. } => "orkg:problem:invalid_argument",
        }
    }

    /// Error specific properties included in the problem body.
    #[must_use]
    pub fn properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut put = |key: &str, value: Value| {
            properties.insert(key.to_string(), value);
        };
        match self {
            Self::PaperNotFound(id) => put("paper_id", json!(id)),
            Self::PaperNotFoundByDoi(doi) | Self::PaperAlreadyExistsWithDoi(doi) => {
                put("paper_doi", json!(doi));
            }
            Self::PaperNotFoundByTitle(title) | Self::PaperAlreadyExistsWithTitle(title) => {
                put("paper_title", json!(title));
            }
            Self::ContributionNotFound(id) => put("contribution_id", json!(id)),
            Self::ComparisonNotFound(id) => put("comparison_id", json!(id)),
            Self::ComparisonRelatedResourceNotFound(id) => {
                put("comparison_related_resource_id", json!(id));
            }
            Self::ComparisonRelatedFigureNotFound(id) => {
                put("comparison_related_figure_id", json!(id));
            }
            Self::LiteratureListNotFound(id) => put("literature_list_id", json!(id)),
            Self::LiteratureListSectionNotFound(id) => {
                put("literature_list_section_id", json!(id));
            }
            Self::SmartReviewNotFound(id) => put("smart_review_id", json!(id)),
            Self::SmartReviewSectionNotFound(id) => put("smart_review_section_id", json!(id)),
            Self::PublishedContentNotFound(id) => put("content_id", json!(id)),
            Self::RosettaStoneStatementNotFound(id)
            | Self::NestedRosettaStoneStatement(id)
            | Self::CannotDeleteClaimedStatement(id) => {
                put("rosetta_stone_statement_id", json!(id));
            }
            Self::RosettaStoneStatementVersionNotFound(id) => {
                put("rosetta_stone_statement_version_id", json!(id));
            }
            Self::TemplateNotFound(id) | Self::TemplateClosed(id) => {
                put("template_id", json!(id));
            }
            Self::ResourceNotFound(id) => put("resource_id", json!(id)),
            Self::DatasetNotFound(id) => put("dataset_id", json!(id)),
            Self::ResearchFieldNotFound(id) => put("research_field_id", json!(id)),
            Self::ResearchProblemNotFound(id) => put("research_problem_id", json!(id)),
            Self::AuthorNotFound(id) => put("author_id", json!(id)),
            Self::InvalidDoi(doi) => put("doi", json!(doi)),
            Self::InvalidMonth(month) => put("month", json!(month)),
            Self::InvalidTempId(id) => put("temp_id", json!(id)),
            Self::ThingNotDefined(id) => put("thing_id", json!(id)),
            Self::DuplicateTempIds(duplicates) => put("duplicate_temp_ids", json!(duplicates)),
            Self::TemplateNotApplicable { template_id, resource_id } => {
                put("template_id", json!(template_id));
                put("resource_id", json!(resource_id));
            }
            Self::InvalidSmartReviewSectionType(kind) => {
                put("smart_review_section_type", json!(kind));
            }
            Self::Validation { field, .. } => put("field", json!(field)),
            _ => {}
        }
        properties
    }

    /// The full problem-detail body, without the `instance` field.
    #[must_use]
    pub fn to_problem(&self) -> Value {
        let status = self.status();
        let mut body = Map::new();
        body.insert("type".to_string(), json!(self.problem_type()));
        body.insert(
            "title".to_string(),
            json!(status.canonical_reason().unwrap_or("Unknown")),
        );
        body.insert("status".to_string(), json!(status.as_u16()));
        body.insert("detail".to_string(), json!(self.to_string()));
        body.append(&mut self.properties());
        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (
            status,
            [(header::CONTENT_TYPE, PROBLEM_JSON)],
            self.to_problem().to_string(),
        )
            .into_response()
    }
}

/// Result alias for service and handler operations.
pub type ApiResult<T> = Result<T, ApiError>;
