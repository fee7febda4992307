//! API integration tests
//!
//! Each test spawns its own server over an in-memory store, so no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use futures::future::join_all;
use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer,
};
use counsel_core::{ChatStatus, ConsultationStatus, SenderRole};
use reqwest::StatusCode;
use serde_json::json;

async fn server() -> TestServer {
    TestServer::start().await.expect("Failed to start server")
}

/// Create a consultation as the default customer
async fn request_consultation(server: &TestServer) -> ConsultationView {
    let token = server.token_for(&customer());
    let response = server
        .post_auth("/api/v1/consultations", &token, &CreateConsultation::unique())
        .await
        .unwrap();
    let body: Data<ConsultationView> = assert_json(response, StatusCode::CREATED).await.unwrap();
    body.data
}

/// Claim as the default lawyer
async fn claim(server: &TestServer, c: &ConsultationView) {
    let response = server
        .post_empty(
            &format!("/api/v1/consultations/{}/claim", c.id),
            &server.token_for(&lawyer()),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

/// Claimed and accepted by the default lawyer
async fn active_consultation(server: &TestServer) -> ConsultationView {
    let c = request_consultation(server).await;
    let token = server.token_for(&lawyer());
    for action in ["claim", "accept"] {
        let response = server
            .post_empty(&format!("/api/v1/consultations/{}/{action}", c.id), &token)
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }
    get_consultation(server, &customer(), c.id).await
}

async fn get_consultation(
    server: &TestServer,
    who: &counsel_core::Participant,
    id: counsel_core::Snowflake,
) -> ConsultationView {
    let response = server
        .get_auth(&format!("/api/v1/consultations/{id}"), &server.token_for(who))
        .await
        .unwrap();
    let body: Data<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    body.data
}

async fn send(
    server: &TestServer,
    who: &counsel_core::Participant,
    id: counsel_core::Snowflake,
    message: &SendMessage,
) -> reqwest::Response {
    server
        .post_auth(
            &format!("/api/v1/consultations/{id}/messages"),
            &server.token_for(who),
            message,
        )
        .await
        .unwrap()
}

// ============================================================================
// Health & Auth
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = server().await;
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready_lists_memory_probe() {
    let server = server().await;
    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["memory"], "healthy");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = server().await;
    let response = server.get("/api/v1/consultations").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTH");
}

#[tokio::test]
async fn test_forged_token_is_unauthorized() {
    let server = server().await;
    let response = server
        .get_auth("/api/v1/consultations", "not.a.jwt")
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_TOKEN");
}

// ============================================================================
// Consultation lifecycle
// ============================================================================

#[tokio::test]
async fn test_request_claim_accept_chat_complete() {
    let server = server().await;
    let c = request_consultation(&server).await;
    assert_eq!(c.status, ConsultationStatus::Pending);
    assert_eq!(c.chat_status, ChatStatus::WaitingAcceptance);
    assert!(c.lawyer.is_none());
    assert_eq!(c.customer.id, CUSTOMER_ID);

    let lawyer_token = server.token_for(&lawyer());
    let response = server
        .post_empty(&format!("/api/v1/consultations/{}/claim", c.id), &lawyer_token)
        .await
        .unwrap();
    let claimed: Data<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(claimed.data.status, ConsultationStatus::Assigned);
    assert_eq!(claimed.data.lawyer.as_ref().map(|l| l.id), Some(LAWYER_ID));

    let response = server
        .post_empty(&format!("/api/v1/consultations/{}/accept", c.id), &lawyer_token)
        .await
        .unwrap();
    let accepted: Data<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(accepted.data.chat_status, ChatStatus::Active);

    let response = send(&server, &lawyer(), c.id, &SendMessage::text("Please send the lease")).await;
    assert_status(response, StatusCode::CREATED).await.unwrap();
    let c_now = get_consultation(&server, &customer(), c.id).await;
    assert_eq!(c_now.status, ConsultationStatus::InProgress);
    assert_eq!(c_now.customer_unread_count, 1);

    let response = server
        .post_empty(&format!("/api/v1/consultations/{}/complete", c.id), &lawyer_token)
        .await
        .unwrap();
    let done: Data<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(done.data.status, ConsultationStatus::Completed);
    assert_eq!(done.data.chat_status, ChatStatus::Closed);

    let response = send(&server, &customer(), c.id, &SendMessage::text("One more thing")).await;
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "CHAT_NOT_ACTIVE");
}

#[tokio::test]
async fn test_concurrent_claims_have_one_winner() {
    let server = server().await;
    let c = request_consultation(&server).await;
    let path = format!("/api/v1/consultations/{}/claim", c.id);

    let tokens = [server.token_for(&lawyer()), server.token_for(&other_lawyer())];
    let statuses = join_all(tokens.iter().map(|token| async {
        server.post_empty(&path, token).await.unwrap().status()
    }))
    .await;

    let winners = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let losers = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!((winners, losers), (1, 1), "statuses: {statuses:?}");
}

#[tokio::test]
async fn test_customer_cannot_claim() {
    let server = server().await;
    let c = request_consultation(&server).await;
    let response = server
        .post_empty(
            &format!("/api/v1/consultations/{}/claim", c.id),
            &server.token_for(&customer()),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "ROLE_NOT_ALLOWED");
}

#[tokio::test]
async fn test_decline_with_reason_posts_system_message() {
    let server = server().await;
    let c = request_consultation(&server).await;
    claim(&server, &c).await;
    let response = server
        .post_auth(
            &format!("/api/v1/consultations/{}/decline", c.id),
            &server.token_for(&lawyer()),
            &json!({ "reason": "Conflict of interest" }),
        )
        .await
        .unwrap();
    let declined: Data<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(declined.data.status, ConsultationStatus::Cancelled);
    assert_eq!(declined.data.decline_reason.as_deref(), Some("Conflict of interest"));

    let response = server
        .get_auth(
            &format!("/api/v1/consultations/{}/messages", c.id),
            &server.token_for(&customer()),
        )
        .await
        .unwrap();
    let thread: Paginated<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(thread.data.len(), 1);
    assert_eq!(thread.data[0].sender.role, SenderRole::System);
    assert!(thread.data[0].sender.id.is_none());
    assert!(thread.data[0].content.contains("Conflict of interest"));
}

#[tokio::test]
async fn test_decline_without_body() {
    let server = server().await;
    let c = request_consultation(&server).await;
    claim(&server, &c).await;
    let response = server
        .post_empty(
            &format!("/api/v1/consultations/{}/decline", c.id),
            &server.token_for(&lawyer()),
        )
        .await
        .unwrap();
    let declined: Data<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(declined.data.decline_reason.is_none());
}

#[tokio::test]
async fn test_unclaimed_request_cannot_be_declined() {
    let server = server().await;
    let c = request_consultation(&server).await;
    let response = server
        .post_empty(
            &format!("/api/v1/consultations/{}/decline", c.id),
            &server.token_for(&other_lawyer()),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_BOUND_LAWYER");

    let still_open = get_consultation(&server, &customer(), c.id).await;
    assert_eq!(still_open.status, ConsultationStatus::Pending);
    claim(&server, &c).await;
}

#[tokio::test]
async fn test_cancel_is_idempotent_but_not_after_complete() {
    let server = server().await;
    let customer_token = server.token_for(&customer());

    let c = request_consultation(&server).await;
    let path = format!("/api/v1/consultations/{}/cancel", c.id);
    let first: Data<ConsultationView> =
        assert_json(server.post_empty(&path, &customer_token).await.unwrap(), StatusCode::OK)
            .await
            .unwrap();
    let second: Data<ConsultationView> =
        assert_json(server.post_empty(&path, &customer_token).await.unwrap(), StatusCode::OK)
            .await
            .unwrap();
    assert_eq!(first.data.status, ConsultationStatus::Cancelled);
    assert_eq!(first.data.version, second.data.version);

    let c = active_consultation(&server).await;
    let response = server
        .post_empty(
            &format!("/api/v1/consultations/{}/complete", c.id),
            &server.token_for(&lawyer()),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    let response = server
        .post_empty(&format!("/api/v1/consultations/{}/cancel", c.id), &customer_token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_preferred_lawyer_binds_on_request() {
    let server = server().await;
    let request = CreateConsultation {
        preferred_lawyer_id: Some(LAWYER_ID),
        ..CreateConsultation::unique()
    };
    let response = server
        .post_auth("/api/v1/consultations", &server.token_for(&customer()), &request)
        .await
        .unwrap();
    let c: Data<ConsultationView> = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(c.data.lawyer.as_ref().map(|l| l.id), Some(LAWYER_ID));

    let response = server
        .post_empty(
            &format!("/api/v1/consultations/{}/accept", c.data.id),
            &server.token_for(&other_lawyer()),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_BOUND_LAWYER");
}

#[tokio::test]
async fn test_admin_assigns_lawyer() {
    let server = server().await;
    let c = request_consultation(&server).await;
    let response = server
        .put_auth(
            &format!("/api/v1/consultations/{}/assign", c.id),
            &server.token_for(&admin()),
            &json!({ "lawyer_id": OTHER_LAWYER_ID.to_string() }),
        )
        .await
        .unwrap();
    let assigned: Data<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(assigned.data.lawyer.as_ref().map(|l| l.id), Some(OTHER_LAWYER_ID));
    assert_eq!(assigned.data.status, ConsultationStatus::Assigned);
}

#[tokio::test]
async fn test_respond_requires_content() {
    let server = server().await;
    let c = active_consultation(&server).await;
    let path = format!("/api/v1/consultations/{}", c.id);
    let token = server.token_for(&lawyer());

    let response = server.patch_auth(&path, &token, &json!({})).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");

    let response = server
        .patch_auth(&path, &token, &json!({ "response": "You are entitled to the deposit." }))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Validation & visibility
// ============================================================================

#[tokio::test]
async fn test_invalid_body_has_field_details() {
    let server = server().await;
    let response = server
        .post_auth(
            "/api/v1/consultations",
            &server.token_for(&customer()),
            &json!({ "subject": "", "description": "Missing subject" }),
        )
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["subject"].is_array());
}

#[tokio::test]
async fn test_unknown_consultation_is_not_found() {
    let server = server().await;
    let response = server
        .get_auth("/api/v1/consultations/987654321", &server.token_for(&admin()))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_CONSULTATION");
}

#[tokio::test]
async fn test_other_customer_cannot_see_consultation() {
    let server = server().await;
    let c = request_consultation(&server).await;
    let response = server
        .get_auth(
            &format!("/api/v1/consultations/{}", c.id),
            &server.token_for(&other_customer()),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get_auth("/api/v1/consultations", &server.token_for(&other_customer()))
        .await
        .unwrap();
    let page: Paginated<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_available_listing_and_stats() {
    let server = server().await;
    let open = request_consultation(&server).await;
    let _taken = active_consultation(&server).await;

    let response = server
        .get_auth("/api/v1/consultations/available", &server.token_for(&other_lawyer()))
        .await
        .unwrap();
    let page: Paginated<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, open.id);

    let response = server
        .get_auth("/api/v1/consultations/available", &server.token_for(&customer()))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .get_auth("/api/v1/consultations/stats", &server.token_for(&customer()))
        .await
        .unwrap();
    let stats: Data<StatsView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(stats.data.total, 2);
    assert_eq!(stats.data.pending, 1);
}

#[tokio::test]
async fn test_status_filter() {
    let server = server().await;
    request_consultation(&server).await;
    active_consultation(&server).await;

    let response = server
        .get_auth(
            "/api/v1/consultations?status=pending",
            &server.token_for(&customer()),
        )
        .await
        .unwrap();
    let page: Paginated<ConsultationView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.pagination.total, 1);
    assert!(page.data.iter().all(|c| c.status == ConsultationStatus::Pending));
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_idempotent_send_returns_same_message() {
    let server = server().await;
    let c = active_consultation(&server).await;
    let message = SendMessage {
        idempotency_key: Some("client-msg-1".into()),
        ..SendMessage::text("Here is the lease")
    };

    let first: Data<MessageView> =
        assert_json(send(&server, &customer(), c.id, &message).await, StatusCode::CREATED)
            .await
            .unwrap();
    let again: Data<MessageView> =
        assert_json(send(&server, &customer(), c.id, &message).await, StatusCode::CREATED)
            .await
            .unwrap();
    assert_eq!(first.data.id, again.data.id);

    let c_now = get_consultation(&server, &lawyer(), c.id).await;
    assert_eq!(c_now.lawyer_unread_count, 1);
}

#[tokio::test]
async fn test_non_participant_cannot_send() {
    let server = server().await;
    let c = active_consultation(&server).await;
    let response = send(&server, &admin(), c.id, &SendMessage::text("Checking in")).await;
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_PARTICIPANT");
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let server = server().await;
    let c = active_consultation(&server).await;
    let response = send(&server, &customer(), c.id, &SendMessage::text("   ")).await;
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_message_pagination_and_order() {
    let server = server().await;
    let c = active_consultation(&server).await;
    for n in 1..=5 {
        let response = send(&server, &customer(), c.id, &SendMessage::text(&format!("part {n}"))).await;
        assert_status(response, StatusCode::CREATED).await.unwrap();
    }

    let token = server.token_for(&lawyer());
    let response = server
        .get_auth(
            &format!("/api/v1/consultations/{}/messages?page=2&page_size=2", c.id),
            &token,
        )
        .await
        .unwrap();
    let page: Paginated<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.pagination.current, 2);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.pages, 3);
    assert_eq!(page.pagination.page_size, 2);
    assert_eq!(page.data[0].content, "part 3");
    assert!(page.data[0].id < page.data[1].id);
    assert!(page.data.iter().all(|m| m.consultation_id == c.id));
}

#[tokio::test]
async fn test_mark_read_resets_counter() {
    let server = server().await;
    let c = active_consultation(&server).await;
    for text in ["Lease attached", "And the deposit receipt"] {
        let response = send(&server, &customer(), c.id, &SendMessage::text(text)).await;
        assert_status(response, StatusCode::CREATED).await.unwrap();
    }
    assert_eq!(get_consultation(&server, &lawyer(), c.id).await.lawyer_unread_count, 2);

    let path = format!("/api/v1/consultations/{}/messages/read", c.id);
    let token = server.token_for(&lawyer());
    for _ in 0..2 {
        let response = server.put_empty(&path, &token).await.unwrap();
        let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
        assert_eq!(body["data"]["unread_count"], 0);
        assert_eq!(body["data"]["reader_role"], "lawyer");
    }

    let response = server
        .get_auth(&format!("/api/v1/consultations/{}/messages", c.id), &token)
        .await
        .unwrap();
    let thread: Paginated<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(thread
        .data
        .iter()
        .filter(|m| m.sender.role == SenderRole::Customer)
        .all(|m| m.is_read));
}
