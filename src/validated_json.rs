//! Axum extractor that deserialises and validates JSON

use crate::error::DashboardError;

use async_trait::async_trait;
use axum::{
    body::HttpBody,
    extract::{rejection::JsonRejection, FromRequest, Json},
    http::Request,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// An axum extractor based on the Json extractor that also performs validation using the validator
/// crate.
///
/// Used for [FilterMap](crate::models::FilterMap) request bodies, whose field names are checked
/// before they reach a query. A request without a body extracts `T::default()`, so posting
/// nothing to `/v1/apply` clears every filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    B: HttpBody + Send + 'static,
{
    type Rejection = DashboardError;

    /// Extract a `ValidatedJson` from a `Request`.
    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        if req.body().size_hint().exact() == Some(0) {
            return Ok(ValidatedJson(T::default()));
        }
        let Json(value) = Json::<T>::from_request(req, state).await?;
        if let Err(errors) = value.validate() {
            tracing::debug!(%errors, "rejected request data");
            return Err(errors.into());
        }
        Ok(ValidatedJson(value))
    }
}
