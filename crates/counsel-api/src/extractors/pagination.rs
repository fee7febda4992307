//! Pagination extractors
//!
//! Page-number paging from the query string. Out-of-range values are
//! clamped by [`PageRequest`] rather than rejected.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use counsel_core::PageRequest;
use counsel_service::dto::{ListConsultationsQuery, PageQuery};

use crate::response::ApiError;

/// `?page=&page_size=`
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub PageRequest);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(Pagination(params.page_request()))
    }
}

/// `?status=&page=&page_size=` for the consultation listing
#[derive(Debug, Clone, Default)]
pub struct ConsultationFilter(pub ListConsultationsQuery);

#[async_trait]
impl<S> FromRequestParts<S> for ConsultationFilter
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ListConsultationsQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(ConsultationFilter(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use counsel_core::ConsultationStatus;

    fn parts(uri: &str) -> Parts {
        let (parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_default_pagination() {
        let mut parts = parts("/consultations/1/messages");
        let Pagination(page) = Pagination::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(page, PageRequest::default());
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let mut parts = parts("/consultations/1/messages?page=0&page_size=5000");
        let Pagination(page) = Pagination::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, PageRequest::MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_non_numeric_page_rejected() {
        let mut parts = parts("/consultations?page=two");
        let err = Pagination::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY_PARAMETER");
    }

    #[tokio::test]
    async fn test_status_filter() {
        let mut parts = parts("/consultations?status=in_progress&page=2");
        let ConsultationFilter(query) = ConsultationFilter::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(query.status, Some(ConsultationStatus::InProgress));
        assert_eq!(query.page_request().page, 2);
    }

    #[tokio::test]
    async fn test_unknown_status_rejected() {
        let mut parts = parts("/consultations?status=archived");
        assert!(ConsultationFilter::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }
}
