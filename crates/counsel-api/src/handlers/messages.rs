//! Message handlers
//!
//! Thread endpoints nested under a consultation.

use axum::{extract::State, Json};
use counsel_service::{
    ApiResponse, MarkReadResponse, MessageResponse, MessageService, PaginatedResponse,
    SendMessageRequest,
};

use crate::extractors::{AuthUser, ConsultationPath, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /consultations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    Ok(Json(service.list_messages(&auth.actor, id, page).await?))
}

/// Post into the thread. Replaying an idempotency key returns the stored
/// message with the same 201.
///
/// POST /consultations/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<ApiResponse<MessageResponse>>>> {
    let service = MessageService::new(state.service_context());
    let message = service.send(&auth.actor, id, request).await?;
    Ok(Created(Json(ApiResponse::new(message))))
}

/// PUT /consultations/{id}/messages/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ConsultationPath(id): ConsultationPath,
) -> ApiResult<Json<ApiResponse<MarkReadResponse>>> {
    let service = MessageService::new(state.service_context());
    let receipt = service.mark_read(&auth.actor, id).await?;
    Ok(Json(ApiResponse::new(receipt)))
}
