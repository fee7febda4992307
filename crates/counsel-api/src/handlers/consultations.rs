//! Consultation handlers
//!
//! Lifecycle endpoints. Every transition responds with the updated
//! consultation.

use axum::{extract::State, Json};
use counsel_service::{
    ApiResponse, AssignLawyerRequest, ConsultationResponse, ConsultationService,
    ConsultationStatsResponse, CreateConsultationRequest, DeclineConsultationRequest,
    PaginatedResponse, RespondConsultationRequest,
};

use crate::extractors::{
    AuthUser, ConsultationFilter, ConsultationPath, OptionalValidatedJson, Pagination,
    ValidatedJson,
};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

type ConsultationJson = Json<ApiResponse<ConsultationResponse>>;

fn wrap(consultation: ConsultationResponse) -> ConsultationJson {
    Json(ApiResponse::new(consultation))
}

/// Open a new consultation
///
/// POST /consultations
pub async fn request_consultation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateConsultationRequest>,
) -> ApiResult<Created<ConsultationJson>> {
    let service = ConsultationService::new(state.service_context());
    let consultation = service.request(&auth.actor, request).await?;
    Ok(Created(wrap(consultation)))
}

/// Consultations visible to the caller
///
/// GET /consultations
pub async fn list_consultations(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationFilter(query): ConsultationFilter,
) -> ApiResult<Json<PaginatedResponse<ConsultationResponse>>> {
    let service = ConsultationService::new(state.service_context());
    Ok(Json(service.list(&auth.actor, query).await?))
}

/// Open consultations no lawyer has taken yet
///
/// GET /consultations/available
pub async fn list_available(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<ConsultationResponse>>> {
    let service = ConsultationService::new(state.service_context());
    Ok(Json(service.list_available(&auth.actor, page).await?))
}

/// GET /consultations/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<ConsultationStatsResponse>>> {
    let service = ConsultationService::new(state.service_context());
    let stats = service.stats(&auth.actor).await?;
    Ok(Json(ApiResponse::new(stats)))
}

/// GET /consultations/{id}
pub async fn get_consultation(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    Ok(wrap(service.get(&auth.actor, id).await?))
}

/// POST /consultations/{id}/claim
pub async fn claim(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    Ok(wrap(service.claim(&auth.actor, id).await?))
}

/// POST /consultations/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    Ok(wrap(service.accept(&auth.actor, id).await?))
}

/// Decline with an optional reason; the body may be omitted
///
/// POST /consultations/{id}/decline
pub async fn decline(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
    OptionalValidatedJson(request): OptionalValidatedJson<DeclineConsultationRequest>,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    let consultation = service
        .decline(&auth.actor, id, request.unwrap_or_default())
        .await?;
    Ok(wrap(consultation))
}

/// POST /consultations/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    Ok(wrap(service.complete(&auth.actor, id).await?))
}

/// POST /consultations/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    Ok(wrap(service.cancel(&auth.actor, id).await?))
}

/// Admin assignment of a lawyer
///
/// PUT /consultations/{id}/assign
pub async fn assign(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
    ValidatedJson(request): ValidatedJson<AssignLawyerRequest>,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    Ok(wrap(service.assign(&auth.actor, id, request).await?))
}

/// Written answer and internal notes from the bound lawyer
///
/// PATCH /consultations/{id}
pub async fn respond(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
    ValidatedJson(request): ValidatedJson<RespondConsultationRequest>,
) -> ApiResult<ConsultationJson> {
    let service = ConsultationService::new(state.service_context());
    Ok(wrap(service.respond(&auth.actor, id, request).await?))
}
