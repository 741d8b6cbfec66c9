//! Input ports of the content-types domain.
//!
//! One trait per content type. The HTTP layer depends only on these
//! traits; [`crate::service`] provides the in-memory implementations.

pub mod commands;
pub mod filters;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{
    BenchmarkSummary, Comparison, ComparisonRelatedFigure, ComparisonRelatedResource,
    Contribution, ContributorId, Dataset, LabeledObject, LiteratureList, Page, PageRequest, Paper,
    PaperWithStatementCount, PublishedContent, ResearchFieldHierarchyEntry,
    ResearchFieldWithChildCount, Resource, RosettaStoneStatement, SmartReview, TemplateInstance,
    ThingId,
};

use commands::{
    CreateComparisonRelatedFigureRequest, CreateComparisonRelatedResourceRequest,
    CreateComparisonRequest, CreateContributionRequest, CreateLiteratureListRequest,
    CreatePaperRequest, CreateRosettaStoneStatementRequest, CreateSmartReviewRequest,
    LiteratureListSectionRequest, PublishComparisonRequest, PublishContentRequest,
    PublishPaperRequest, SmartReviewSectionRequest, UpdateComparisonRequest,
    UpdateLiteratureListRequest, UpdatePaperRequest, UpdateRosettaStoneStatementRequest,
    UpdateSmartReviewRequest, UpdateTemplateInstanceRequest,
};
use filters::{ContentFilters, PaperFilters, RosettaStoneStatementFilters};

#[async_trait]
pub trait PaperUseCases: Send + Sync {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<Paper>;

    async fn find_all(&self, filters: &PaperFilters, page: PageRequest) -> ApiResult<Page<Paper>>;

    /// Look up a paper by (normalized) DOI.
    async fn find_by_doi(&self, doi: &str) -> ApiResult<Paper>;

    /// Look up a paper by exact title, case insensitive.
    async fn find_by_title(&self, title: &str) -> ApiResult<Paper>;

    /// Create a paper, returning the id of the new resource.
    async fn create(
        &self,
        contributor: ContributorId,
        request: CreatePaperRequest,
    ) -> ApiResult<ThingId>;

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdatePaperRequest,
    ) -> ApiResult<()>;

    /// Publish a snapshot of the paper, returning the snapshot id.
    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishPaperRequest,
    ) -> ApiResult<ThingId>;

    async fn find_all_contributors(
        &self,
        id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ContributorId>>;

    async fn statement_counts(
        &self,
        page: PageRequest,
    ) -> ApiResult<Page<PaperWithStatementCount>>;
}

#[async_trait]
pub trait ContributionUseCases: Send + Sync {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<Contribution>;

    async fn find_all(&self, page: PageRequest) -> ApiResult<Page<Contribution>>;

    /// Attach a new contribution to an existing paper.
    async fn create(
        &self,
        contributor: ContributorId,
        paper_id: &ThingId,
        request: CreateContributionRequest,
    ) -> ApiResult<ThingId>;
}

#[async_trait]
pub trait ComparisonUseCases: Send + Sync {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<Comparison>;

    async fn find_all(
        &self,
        filters: &ContentFilters,
        page: PageRequest,
    ) -> ApiResult<Page<Comparison>>;

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateComparisonRequest,
    ) -> ApiResult<ThingId>;

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateComparisonRequest,
    ) -> ApiResult<()>;

    /// Publish the comparison, returning the id of the published version.
    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishComparisonRequest,
    ) -> ApiResult<ThingId>;

    async fn find_related_resource(
        &self,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<ComparisonRelatedResource>;

    async fn find_all_related_resources(
        &self,
        comparison_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ComparisonRelatedResource>>;

    async fn create_related_resource(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        request: CreateComparisonRelatedResourceRequest,
    ) -> ApiResult<ThingId>;

    async fn update_related_resource(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
        request: CreateComparisonRelatedResourceRequest,
    ) -> ApiResult<()>;

    async fn delete_related_resource(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<()>;

    async fn find_related_figure(
        &self,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<ComparisonRelatedFigure>;

    async fn find_all_related_figures(
        &self,
        comparison_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ComparisonRelatedFigure>>;

    async fn create_related_figure(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        request: CreateComparisonRelatedFigureRequest,
    ) -> ApiResult<ThingId>;

    async fn update_related_figure(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
        request: CreateComparisonRelatedFigureRequest,
    ) -> ApiResult<()>;

    async fn delete_related_figure(
        &self,
        contributor: ContributorId,
        comparison_id: &ThingId,
        id: &ThingId,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait LiteratureListUseCases: Send + Sync {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<LiteratureList>;

    async fn find_all(
        &self,
        filters: &ContentFilters,
        page: PageRequest,
    ) -> ApiResult<Page<LiteratureList>>;

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateLiteratureListRequest,
    ) -> ApiResult<ThingId>;

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateLiteratureListRequest,
    ) -> ApiResult<()>;

    /// Publish the list, freezing its current sections into a version.
    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishContentRequest,
    ) -> ApiResult<ThingId>;

    /// Create a section, appended or inserted at `index` when given.
    async fn create_section(
        &self,
        contributor: ContributorId,
        list_id: &ThingId,
        index: Option<usize>,
        request: LiteratureListSectionRequest,
    ) -> ApiResult<ThingId>;

    async fn update_section(
        &self,
        contributor: ContributorId,
        list_id: &ThingId,
        section_id: &ThingId,
        request: LiteratureListSectionRequest,
    ) -> ApiResult<()>;

    async fn delete_section(
        &self,
        contributor: ContributorId,
        list_id: &ThingId,
        section_id: &ThingId,
    ) -> ApiResult<()>;

    /// Look up a thing referenced by a published version of the list.
    async fn find_published_content(
        &self,
        list_id: &ThingId,
        content_id: &ThingId,
    ) -> ApiResult<PublishedContent>;
}

#[async_trait]
pub trait SmartReviewUseCases: Send + Sync {
    async fn find_by_id(&self, id: &ThingId) -> ApiResult<SmartReview>;

    async fn find_all(
        &self,
        filters: &ContentFilters,
        page: PageRequest,
    ) -> ApiResult<Page<SmartReview>>;

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateSmartReviewRequest,
    ) -> ApiResult<ThingId>;

    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateSmartReviewRequest,
    ) -> ApiResult<()>;

    async fn publish(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: PublishContentRequest,
    ) -> ApiResult<ThingId>;

    async fn create_section(
        &self,
        contributor: ContributorId,
        review_id: &ThingId,
        index: Option<usize>,
        request: SmartReviewSectionRequest,
    ) -> ApiResult<ThingId>;

    async fn update_section(
        &self,
        contributor: ContributorId,
        review_id: &ThingId,
        section_id: &ThingId,
        request: SmartReviewSectionRequest,
    ) -> ApiResult<()>;

    async fn delete_section(
        &self,
        contributor: ContributorId,
        review_id: &ThingId,
        section_id: &ThingId,
    ) -> ApiResult<()>;

    async fn find_published_content(
        &self,
        review_id: &ThingId,
        content_id: &ThingId,
    ) -> ApiResult<PublishedContent>;
}

#[async_trait]
pub trait RosettaStoneStatementUseCases: Send + Sync {
    /// Resolve a statement by its id or any of its version ids.
    /// Soft-deleted statements resolve for curators only.
    async fn find_by_id(&self, id: &ThingId, curator: bool) -> ApiResult<RosettaStoneStatement>;

    async fn find_all(
        &self,
        filters: &RosettaStoneStatementFilters,
        page: PageRequest,
    ) -> ApiResult<Page<RosettaStoneStatement>>;

    /// All versions of a statement, oldest first.
    async fn find_all_versions(
        &self,
        id: &ThingId,
        curator: bool,
    ) -> ApiResult<Vec<RosettaStoneStatement>>;

    async fn create(
        &self,
        contributor: ContributorId,
        request: CreateRosettaStoneStatementRequest,
    ) -> ApiResult<ThingId>;

    /// Append a new version, returning its id.
    async fn update(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        request: UpdateRosettaStoneStatementRequest,
    ) -> ApiResult<ThingId>;

    /// Mark the latest version deleted without removing any data.
    async fn soft_delete(&self, contributor: ContributorId, id: &ThingId) -> ApiResult<()>;

    /// Remove the statement and all its versions. Curator only.
    async fn delete(
        &self,
        contributor: ContributorId,
        id: &ThingId,
        curator: bool,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait TemplateInstanceUseCases: Send + Sync {
    async fn find_by_id(
        &self,
        template_id: &ThingId,
        resource_id: &ThingId,
    ) -> ApiResult<TemplateInstance>;

    async fn find_all(
        &self,
        template_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<TemplateInstance>>;

    /// Apply the template to a resource, creating or replacing the
    /// statement values described by the template properties.
    async fn update(
        &self,
        contributor: ContributorId,
        template_id: &ThingId,
        resource_id: &ThingId,
        request: UpdateTemplateInstanceRequest,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait DatasetUseCases: Send + Sync {
    async fn find_datasets_by_research_problem(
        &self,
        problem_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<Dataset>>;

    async fn find_research_problems_by_dataset(
        &self,
        dataset_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<LabeledObject>>;

    async fn summaries_by_research_field(
        &self,
        research_field_id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<BenchmarkSummary>>;

    async fn summaries(&self, page: PageRequest) -> ApiResult<Page<BenchmarkSummary>>;
}

#[async_trait]
pub trait ResearchFieldHierarchyUseCases: Send + Sync {
    async fn find_children(
        &self,
        id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ResearchFieldWithChildCount>>;

    async fn find_parents(&self, id: &ThingId, page: PageRequest) -> ApiResult<Page<Resource>>;

    /// Root fields of the subtree containing `id`.
    async fn find_roots(&self, id: &ThingId, page: PageRequest) -> ApiResult<Page<Resource>>;

    async fn find_all_roots(&self, page: PageRequest) -> ApiResult<Page<Resource>>;

    /// The chain of fields from the roots down to `id`, with parent ids.
    async fn find_hierarchy(
        &self,
        id: &ThingId,
        page: PageRequest,
    ) -> ApiResult<Page<ResearchFieldHierarchyEntry>>;
}
