//! Rosetta-stone statement representations.

use serde::{Deserialize, Serialize};

use super::common::{
    Certainty, ContributorId, ExtractionMethod, ObservatoryId, OrganizationId, ThingId,
    ThingReference, Timestamp, Visibility,
};

/// One version of a rosetta-stone statement.
///
/// Statements are versioned: updates append a new version and the
/// statement id always resolves to the latest one. Soft deletion keeps
/// the version history but marks the statement deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosettaStoneStatement {
    pub id: ThingId,
    /// Resource the statement is recorded in the context of, if any.
    #[serde(default)]
    pub context: Option<ThingId>,
    pub template_id: ThingId,
    pub class_id: ThingId,
    /// Id of this version.
    pub version_id: ThingId,
    pub latest_version_id: ThingId,
    pub formatted_label: String,
    pub subjects: Vec<ThingReference>,
    /// One list of objects per template object position.
    pub objects: Vec<Vec<ThingReference>>,
    pub created_at: Timestamp,
    pub created_by: ContributorId,
    pub certainty: Certainty,
    pub negated: bool,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    pub extraction_method: ExtractionMethod,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_by: Option<ContributorId>,
    pub modifiable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<ContributorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
}

impl RosettaStoneStatement {
    /// Whether this statement has been soft deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether this version is the latest one.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.version_id == self.latest_version_id
    }
}
