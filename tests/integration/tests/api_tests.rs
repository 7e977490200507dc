//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Upstream providers are mocked per test server.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::{Duration, Utc};
use integration_tests::{
    assert_json, assert_status, check_test_env, company_billing, fixtures::*, message_status,
    queue_status, TestServer, PRO_PRICE,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Outbound Message Tests
// ============================================================================

#[tokio::test]
async fn test_send_text_requires_auth() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server
        .post(
            "/api/v1/messages/text",
            &json!({"conversation_id": uuid::Uuid::new_v4(), "text": "oi"}),
        )
        .await
        .unwrap();

    let body: Value = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn test_send_text() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "agent").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    Mock::given(method("POST"))
        .and(path("/send/text"))
        .and(header(
            "authorization",
            format!("Bearer {}", tenant.instance_token).as_str(),
        ))
        .and(body_partial_json(
            json!({"number": tenant.contact_phone, "text": "Olá, tudo bem?"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageid": "WA-OUT-1"})))
        .expect(1)
        .mount(&server.upstream)
        .await;

    let response = server
        .post_auth(
            "/api/v1/messages/text",
            &token,
            &json!({"conversation_id": tenant.conversation_id, "text": "Olá, tudo bem?"}),
        )
        .await
        .unwrap();

    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"]["status"], "sent");
    assert_eq!(body["message"]["direction"], "outbound");
    assert_eq!(body["message"]["provider_message_id"], "WA-OUT-1");
    assert_eq!(body["message"]["sender_id"], tenant.user_id.to_string());

    let id = body["message"]["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(message_status(server.pool(), id).await.unwrap(), "sent");
}

#[tokio::test]
async fn test_send_text_reply_uses_provider_id() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "agent").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();
    let quoted = tenant
        .insert_inbound(server.pool(), tenant.conversation_id, "preço?", Utc::now())
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/send/text"))
        .and(body_partial_json(json!({"replyid": format!("WA-{}", quoted.simple())})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "WA-OUT-2"})))
        .expect(1)
        .mount(&server.upstream)
        .await;

    let response = server
        .post_auth(
            "/api/v1/messages/text",
            &token,
            &json!({
                "conversation_id": tenant.conversation_id,
                "text": "R$ 99",
                "reply_to_message_id": quoted
            }),
        )
        .await
        .unwrap();

    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"]["reply_to_id"], quoted.to_string());
}

#[tokio::test]
async fn test_send_text_other_company_conversation() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "owner").await.unwrap();
    let other = Tenant::seed(server.pool(), "owner").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    let response = server
        .post_auth(
            "/api/v1/messages/text",
            &token,
            &json!({"conversation_id": other.conversation_id, "text": "oi"}),
        )
        .await
        .unwrap();

    let body: Value = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body["code"], "UNKNOWN_CONVERSATION");
}

#[tokio::test]
async fn test_send_text_disconnected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "agent").await.unwrap();
    tenant
        .set_connection_status(server.pool(), "disconnected")
        .await
        .unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    let response = server
        .post_auth(
            "/api/v1/messages/text",
            &token,
            &json!({"conversation_id": tenant.conversation_id, "text": "oi"}),
        )
        .await
        .unwrap();

    let body: Value = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(body["code"], "CONNECTION_NOT_CONNECTED");
}

#[tokio::test]
async fn test_send_text_empty_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "agent").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    let response = server
        .post_auth(
            "/api/v1/messages/text",
            &token,
            &json!({"conversation_id": tenant.conversation_id, "text": ""}),
        )
        .await
        .unwrap();

    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_send_text_gateway_failure_records_failed_message() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "agent").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    Mock::given(method("POST"))
        .and(path("/send/text"))
        .respond_with(ResponseTemplate::new(500).set_body_string("instance offline"))
        .mount(&server.upstream)
        .await;

    let response = server
        .post_auth(
            "/api/v1/messages/text",
            &token,
            &json!({"conversation_id": tenant.conversation_id, "text": "oi"}),
        )
        .await
        .unwrap();

    let body: Value = assert_json(response, StatusCode::BAD_GATEWAY).await.unwrap();
    assert_eq!(body["code"], "GATEWAY_ERROR");

    let statuses: Vec<String> =
        sqlx::query_scalar("SELECT status FROM messages WHERE conversation_id = $1")
            .bind(tenant.conversation_id)
            .fetch_all(server.pool())
            .await
            .unwrap();
    assert_eq!(statuses, vec!["failed".to_string()]);
}

#[tokio::test]
async fn test_send_image() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "admin").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    Mock::given(method("POST"))
        .and(path_regex(format!(
            "^/storage/v1/object/chat-media/{}/{}/.+\\.png$",
            tenant.company_id, tenant.connection_id
        )))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "ok"})))
        .expect(1)
        .mount(&server.upstream)
        .await;

    Mock::given(method("POST"))
        .and(path("/send/media"))
        .and(body_partial_json(json!({"type": "image", "text": "Catálogo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageid": "WA-IMG-1"})))
        .expect(1)
        .mount(&server.upstream)
        .await;

    let response = server
        .post_auth(
            "/api/v1/messages/image",
            &token,
            &json!({
                "conversation_id": tenant.conversation_id,
                "file_base64": format!("data:image/png;base64,{}", png_base64()),
                "mime_type": "image/png",
                "caption": "  Catálogo  "
            }),
        )
        .await
        .unwrap();

    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"]["message_type"], "image");
    assert_eq!(body["message"]["status"], "sent");
    assert_eq!(body["message"]["content"], "Catálogo");
    let media_url = body["message"]["media_url"].as_str().unwrap();
    assert!(media_url.starts_with(&format!(
        "{}/storage/v1/object/public/chat-media/",
        server.upstream.uri()
    )));
}

#[tokio::test]
async fn test_send_audio_wrong_mime() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "agent").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    let response = server
        .post_auth(
            "/api/v1/messages/audio",
            &token,
            &json!({
                "conversation_id": tenant.conversation_id,
                "file_base64": png_base64(),
                "mime_type": "image/png"
            }),
        )
        .await
        .unwrap();

    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Stripe Webhook Tests
// ============================================================================

#[tokio::test]
async fn test_stripe_checkout_applies_plan() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "owner").await.unwrap();
    let customer = format!("cus_{}", uuid::Uuid::new_v4().simple());

    let event = stripe_event(
        "checkout.session.completed",
        json!({
            "client_reference_id": tenant.company_id.to_string(),
            "customer": customer,
            "subscription": "sub_integration",
            "metadata": {"price_id": PRO_PRICE}
        }),
    );
    let (payload, signature) = signed_event(&event).unwrap();

    let response = server.post_webhook(&payload, Some(&signature)).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["received"], true);
    assert!(body.get("duplicate").is_none());

    let (plan, status, stored_customer, max_connections) =
        company_billing(server.pool(), tenant.company_id).await.unwrap();
    assert_eq!(plan, "pro");
    assert_eq!(status, "active");
    assert_eq!(stored_customer.as_deref(), Some(customer.as_str()));
    assert_eq!(max_connections, 5);

    // Stripe retries deliver the same event id
    let response = server.post_webhook(&payload, Some(&signature)).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["duplicate"], true);
}

#[tokio::test]
async fn test_stripe_payment_failed_marks_past_due() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "owner").await.unwrap();
    let customer = format!("cus_{}", uuid::Uuid::new_v4().simple());

    let checkout = stripe_event(
        "checkout.session.completed",
        json!({"client_reference_id": tenant.company_id.to_string(), "customer": customer}),
    );
    let (payload, signature) = signed_event(&checkout).unwrap();
    let response = server.post_webhook(&payload, Some(&signature)).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let failed = stripe_event("invoice.payment_failed", json!({"customer": customer}));
    let (payload, signature) = signed_event(&failed).unwrap();
    let response = server.post_webhook(&payload, Some(&signature)).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let (_, status, _, _) = company_billing(server.pool(), tenant.company_id)
        .await
        .unwrap();
    assert_eq!(status, "past_due");
}

#[tokio::test]
async fn test_stripe_rejects_bad_signature() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let event = stripe_event("invoice.payment_succeeded", json!({"customer": "cus_x"}));
    let (payload, _) = signed_event(&event).unwrap();

    let response = server
        .post_webhook(&payload, Some("t=1,v1=deadbeef"))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["code"], "INVALID_SIGNATURE");

    let response = server.post_webhook(&payload, None).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Follow-up Tests
// ============================================================================

#[tokio::test]
async fn test_process_follow_ups_requires_permission() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tenant = Tenant::seed(server.pool(), "agent").await.unwrap();
    let token = server.user_token(tenant.user_id).unwrap();

    let response = server
        .post_auth("/api/v1/follow-ups/process", &token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// The queue is global, so every follow-up scenario shares this one test
#[tokio::test]
async fn test_process_follow_ups() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let pool = server.pool();
    let tenant = Tenant::seed(pool, "owner").await.unwrap();
    let sequence = Sequence::seed(pool, &tenant).await.unwrap();

    let quiet = tenant.conversation_id;
    let replied = tenant.add_conversation(pool).await.unwrap();
    let quiet_item = sequence.enqueue(pool, &tenant, quiet).await.unwrap();
    let replied_item = sequence.enqueue(pool, &tenant, replied).await.unwrap();
    tenant
        .insert_inbound(pool, replied, "já resolvi", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/send/text"))
        .and(body_partial_json(json!({
            "number": tenant.contact_phone,
            "text": "Oi Maria, posso ajudar?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageid": "WA-FU-1"})))
        .expect(1)
        .mount(&server.upstream)
        .await;

    let token = server.service_token().unwrap();
    let response = server
        .post_auth("/api/v1/follow-ups/process", &token, &json!({}))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["claimed"].as_u64().unwrap() >= 2);

    assert_eq!(queue_status(pool, quiet_item).await.unwrap(), "sent");
    assert_eq!(queue_status(pool, replied_item).await.unwrap(), "cancelled");

    let (next_status, next_at): (String, chrono::DateTime<Utc>) = sqlx::query_as(
        "SELECT status, scheduled_at FROM followup_queue \
         WHERE conversation_id = $1 AND step_id = $2",
    )
    .bind(quiet)
    .bind(sequence.second_step)
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(next_status, "pending");
    assert!(next_at > Utc::now() + Duration::minutes(55));

    let sent: Vec<String> = sqlx::query_scalar(
        "SELECT content FROM messages WHERE conversation_id = $1 AND direction = 'outbound'",
    )
    .bind(quiet)
    .fetch_all(pool)
    .await
    .unwrap();
    assert_eq!(sent, vec!["Oi Maria, posso ajudar?".to_string()]);
}
