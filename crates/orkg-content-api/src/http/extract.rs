//! Request extractors for the acting contributor and curator role.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::models::ContributorId;

/// Header identifying the acting contributor on mutating endpoints.
pub const CONTRIBUTOR_HEADER: &str = "X-Contributor-Id";

/// Header granting curator privileges when set to `true`.
pub const CURATOR_HEADER: &str = "X-Curator";

/// The contributor performing a request.
///
/// Absent header means the anonymous contributor; a malformed uuid is
/// rejected as a validation error.
#[derive(Debug, Clone, Copy)]
pub struct Contributor(pub ContributorId);

impl<S: Send + Sync> FromRequestParts<S> for Contributor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(CONTRIBUTOR_HEADER) else {
            return Ok(Self(ContributorId::UNKNOWN));
        };
        value
            .to_str()
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Self)
            .ok_or_else(|| {
                ApiError::validation(
                    "X-Contributor-Id",
                    "Header \"X-Contributor-Id\" must be a valid UUID.",
                )
            })
    }
}

/// Whether the request carries curator privileges.
#[derive(Debug, Clone, Copy)]
pub struct Curator(pub bool);

impl<S: Send + Sync> FromRequestParts<S> for Curator {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let curator = parts
            .headers
            .get(CURATOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        Ok(Self(curator))
    }
}
