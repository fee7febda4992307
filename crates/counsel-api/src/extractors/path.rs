//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use counsel_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Debug, Deserialize)]
struct RawConsultationPath {
    id: String,
}

/// `{id}` segment of the consultation routes
#[derive(Debug, Clone, Copy)]
pub struct ConsultationPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for ConsultationPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<RawConsultationPath>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        let id = Snowflake::parse(&raw.id)
            .map_err(|_| ApiError::invalid_path("Invalid consultation id format"))?;
        Ok(ConsultationPath(id))
    }
}
