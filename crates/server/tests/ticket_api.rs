//! Integration tests for the ticket API.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use triage_core::ClassificationError;

#[tokio::test]
async fn test_create_ticket_returns_pending() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "subject": "Cannot log in",
                "description": "Password reset email never arrives"
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["status"], "PENDING");
    assert_eq!(response.body["subject"], "Cannot log in");
    assert_eq!(response.body["category"], serde_json::Value::Null);
    assert_eq!(response.body["priority"], serde_json::Value::Null);
    assert!(response.body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(response.body["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn test_create_ticket_blank_subject_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({ "subject": "   ", "description": "something broke" }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("subject"));
}

#[tokio::test]
async fn test_create_ticket_blank_description_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({ "subject": "Help", "description": "" }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_ticket_oversized_subject_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({ "subject": "x".repeat(501), "description": "too long" }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_create_ticket_oversized_description_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({ "subject": "Help", "description": "x".repeat(5001) }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_ticket_returns_404() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .get("/api/v1/tickets/550e8400-e29b-41d4-a716-446655440000")
        .await;

    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_tickets_with_status_filter() {
    let fixture = TestFixture::new().await;

    for i in 0..3 {
        let response = fixture
            .post(
                "/api/v1/tickets",
                json!({
                    "subject": format!("Issue {}", i),
                    "description": "details"
                }),
            )
            .await;
        assert_status!(response, StatusCode::CREATED);
    }

    let response = fixture.get("/api/v1/tickets?status=PENDING").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 3);
    assert_eq!(response.body["tickets"].as_array().unwrap().len(), 3);

    let response = fixture.get("/api/v1/tickets?status=CLASSIFIED").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 0);
}

#[tokio::test]
async fn test_list_tickets_unknown_status_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/tickets?status=BOGUS").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("BOGUS"));
}

#[tokio::test]
async fn test_list_tickets_pagination() {
    let fixture = TestFixture::new().await;

    for i in 0..5 {
        fixture
            .post(
                "/api/v1/tickets",
                json!({
                    "subject": format!("Issue {}", i),
                    "description": "details"
                }),
            )
            .await;
    }

    let response = fixture.get("/api/v1/tickets?limit=2&offset=0").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["tickets"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["total"], 5);
    assert_eq!(response.body["limit"], 2);

    let response = fixture.get("/api/v1/tickets?limit=2&offset=4").await;
    assert_eq!(response.body["tickets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ticket_classified_end_to_end() {
    let fixture = TestFixture::started().await;
    fixture.classifier.set_result(fixtures::billing_urgent());

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "subject": "Charged twice this month",
                "description": "My card shows two identical charges"
            }),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    let ticket_id = response.body["id"].as_str().unwrap().to_string();

    let ticket = fixture.wait_for_status(&ticket_id, "CLASSIFIED").await;
    assert_eq!(ticket["category"], "BILLING");
    assert_eq!(ticket["priority"], "URGENT");
    assert_eq!(ticket["sentiment"], 1);
    assert_eq!(ticket["errorMessage"], serde_json::Value::Null);

    fixture.orchestrator.stop().await;
}

#[tokio::test]
async fn test_failed_classification_reported() {
    let fixture = TestFixture::started().await;
    fixture.classifier.queue_error(ClassificationError::Api {
        status: 429,
        message: "quota exceeded".to_string(),
    });

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "subject": "App crashes on startup",
                "description": "Crash loop after the latest update"
            }),
        )
        .await;
    let ticket_id = response.body["id"].as_str().unwrap().to_string();

    let ticket = fixture.wait_for_status(&ticket_id, "FAILED").await;
    assert!(ticket["errorMessage"]
        .as_str()
        .unwrap()
        .contains("quota exceeded"));

    fixture.orchestrator.stop().await;
}

#[tokio::test]
async fn test_stats_endpoint_consistent() {
    let fixture = TestFixture::started().await;
    fixture.classifier.set_result(fixtures::bug_high());

    for i in 0..4 {
        fixture
            .post(
                "/api/v1/tickets",
                json!({
                    "subject": format!("Bug report {}", i),
                    "description": "Something is off"
                }),
            )
            .await;
    }

    // Wait until everything drains through the workers
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let response = fixture.get("/api/v1/tickets/stats").await;
        assert_status!(response, StatusCode::OK);
        if response.body["byStatus"]["CLASSIFIED"] == 4 {
            assert_eq!(response.body["totalTickets"], 4);
            assert_eq!(response.body["byCategory"]["BUG"], 4);
            assert_eq!(response.body["byPriority"]["HIGH"], 4);
            // Zero-filled variants stay present
            assert_eq!(response.body["byStatus"]["PENDING"], 0);
            break;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("tickets did not classify in time: {}", response.body);
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    fixture.orchestrator.stop().await;
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let fixture = TestFixture::new().await;

    fixture
        .post(
            "/api/v1/tickets",
            json!({ "subject": "Metrics check", "description": "details" }),
        )
        .await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/metrics")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(fixture.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("triage_tickets_created_total"));
    assert!(text.contains("triage_tickets_by_status"));
    assert!(text.contains("triage_orchestrator_running"));
}

#[tokio::test]
async fn test_config_endpoint_redacts_api_key() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["gemini"]["api_key_configured"], true);
    assert!(!response.body.to_string().contains("test-key"));
}
