//! API tests with mocked hosting and generation services.
//!
//! These tests run the full router in-process against a JSON store in a
//! temporary directory.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestConfig, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["schedule"]["utc_offset_minutes"], 480);
    assert!(!response.text.contains("bearer_token\""));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[fixtures::work_item("a.mp4")]);

    let response = fixture.get("/api/v1/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("skyforge_items_by_stage"));
}

// =============================================================================
// Items
// =============================================================================

#[tokio::test]
async fn test_list_get_and_delete_items() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[fixtures::work_item("a.mp4"), fixtures::work_item("b.mp4")]);

    let response = fixture.get("/api/v1/items").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["items"][1]["file_name"], "b.mp4");

    let response = fixture.get("/api/v1/items/a.mp4").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Title of a.mp4");

    let response = fixture.delete("/api/v1/items/a.mp4").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(fixture.stored().len(), 1);
    // The media file is kept.
    assert!(fixture.media_dir().join("a.mp4").exists());

    let response = fixture.delete("/api/v1/items/a.mp4").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"].as_str().unwrap().contains("a.mp4"));
}

#[tokio::test]
async fn test_status_reports_backlog() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[fixtures::work_item("a.mp4"), fixtures::work_item("gone.mp4")]);
    std::fs::remove_file(fixture.media_dir().join("gone.mp4")).unwrap();

    let response = fixture.get("/api/v1/status").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["pending_count"], 2);
    assert_eq!(response.body["automatic"][0]["file_status"], "Available");
    assert_eq!(response.body["automatic"][1]["file_status"], "Missing");
    assert!(response.body["next_slot_local"].is_string());
}

// =============================================================================
// Scheduling
// =============================================================================

#[tokio::test]
async fn test_batch_run_with_limit_and_date() {
    let fixture = TestFixture::new().await;
    fixture.seed(&["a.mp4", "b.mp4", "c.mp4"].map(fixtures::work_item));

    let response = fixture
        .post("/api/v1/schedule/run", json!({ "limit": 2, "date": "2030-01-01" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["processed"], 2);
    assert_eq!(response.body["items"][0]["outcome"], "uploaded");
    assert_eq!(response.body["items"][0]["file_name"], "a.mp4");

    let stored = fixture.stored();
    assert!(stored[0].uploaded && stored[1].uploaded);
    assert!(!stored[2].uploaded);
    assert_eq!(fixture.hosting.upload_count().await, 2);
    assert_eq!(fixture.archiver.recorded_archives().await.len(), 2);
}

#[tokio::test]
async fn test_batch_run_without_body_uses_default_limit() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[fixtures::work_item("a.mp4")]);

    let response = fixture.post_empty("/api/v1/schedule/run").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["limit"], 10);
    assert_eq!(response.body["processed"], 1);
}

#[tokio::test]
async fn test_batch_run_without_hosting_is_unavailable() {
    let fixture = TestFixture::with_config(TestConfig::bare()).await;
    fixture.seed(&[fixtures::work_item("a.mp4")]);

    let response = fixture.post_empty("/api/v1/schedule/run").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!fixture.stored()[0].uploaded);
}

#[tokio::test]
async fn test_manual_schedule() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[fixtures::work_item("a.mp4")]);

    let response = fixture
        .post(
            "/api/v1/schedule/manual",
            json!({
                "file_name": "a.mp4",
                "publish_at": "2030-05-01T20:30",
                "count_in_baseline": false
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["publish_at"], "2030-05-01T12:30:00Z");

    let stored = &fixture.stored()[0];
    assert!(stored.uploaded);
    assert!(stored.is_manual);
    assert!(stored.ignore_calc);
}

#[tokio::test]
async fn test_manual_schedule_rejects_bad_time() {
    let fixture = TestFixture::new().await;
    fixture.seed(&[fixtures::work_item("a.mp4")]);

    let response = fixture
        .post(
            "/api/v1/schedule/manual",
            json!({ "file_name": "a.mp4", "publish_at": "next friday" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.hosting.upload_count().await, 0);
}

#[tokio::test]
async fn test_manual_schedule_unknown_item() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/schedule/manual",
            json!({ "file_name": "nope.mp4", "publish_at": "2030-05-01 20:30" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_schedule_uploaded_item_is_conflict() {
    let fixture = TestFixture::new().await;
    let done = fixtures::uploaded_item("done.mp4", "2030-04-01T00:00:00Z".parse().unwrap());
    fixture.seed(&[done.clone()]);

    let response = fixture
        .post(
            "/api/v1/schedule/manual",
            json!({ "file_name": "done.mp4", "publish_at": "2030-05-01 20:30" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    let stored = &fixture.stored()[0];
    assert!(stored.uploaded);
    assert!(!stored.is_manual);
    assert_eq!(stored.publish_at, done.publish_at);
    assert_eq!(fixture.hosting.upload_count().await, 0);
}

// =============================================================================
// Generation
// =============================================================================

#[tokio::test]
async fn test_submit_and_poll() {
    let fixture = TestFixture::new().await;
    let prompt = "A paper boat S2_1_2_3";

    let response = fixture
        .post(
            "/api/v1/generation/submit",
            json!({
                "prompt": prompt,
                "metadata": { "file_name": "boat.mp4", "unique_id": "S2_1_2_3", "title": "Boat" }
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["task_id"], "task_1");
    assert_eq!(response.body["file_name"], "boat.mp4");
    assert_eq!(fixture.stored()[0].title, "Boat");

    fixture
        .generation
        .set_pending(vec!["task_1".to_string()])
        .await;
    let response = fixture
        .get("/api/v1/generation/poll?task_id=task_1&prompt=boat")
        .await;
    assert_eq!(response.body["status"], "running");

    fixture.generation.set_pending(vec![]).await;
    let url = fixtures::artifact_url("boat-key");
    fixture
        .generation
        .set_feed(vec![fixtures::completion("r1", "other", Some("task_1"), Some(&url))])
        .await;
    let response = fixture
        .get("/api/v1/generation/poll?task_id=task_1&prompt=boat")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "done");
    assert_eq!(response.body["tier"], "exact");
    assert_eq!(response.body["urls"][0], url.as_str());
}

#[tokio::test]
async fn test_submit_requires_prompt() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/generation/submit", json!({ "prompt": "  " }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_poll_with_empty_feed_is_not_found() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/generation/poll?task_id=task_9").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_and_sync() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/generation/download",
            json!({ "url": fixtures::artifact_url("k1") }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["file_name"], "gen_k1.mp4");
    assert_eq!(response.body["status"], "downloaded");
    assert!(fixture.media_dir().join("gen_k1.mp4").exists());

    fixture
        .generation
        .set_feed(vec![
            fixtures::completion("r1", "S2_7_7_7 river", None, Some(&fixtures::artifact_url("k2"))),
            fixtures::completion("r2", "plain", None, Some(&fixtures::artifact_url("k3"))),
        ])
        .await;
    let response = fixture.post_empty("/api/v1/generation/sync").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["added"], 2);

    let names: Vec<String> = fixture
        .stored()
        .into_iter()
        .map(|v| v.file_name)
        .collect();
    assert_eq!(names, vec!["S2_7_7_7.mp4", "gen_k3.mp4"]);
}

#[tokio::test]
async fn test_download_metadata_only() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/generation/download",
            json!({ "metadata": { "file_name": "later.mp4", "title": "Later" } }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "metadata_only");
    assert_eq!(fixture.stored()[0].file_name, "later.mp4");
    assert!(fixture.fetcher.recorded_fetches().await.is_empty());
}

#[tokio::test]
async fn test_download_rejects_escaping_file_name() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/generation/download",
            json!({ "url": fixtures::artifact_url("k1"), "file_name": "../escaped.mp4" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(fixture.fetcher.recorded_fetches().await.is_empty());
    assert!(fixture.stored().is_empty());
}

#[tokio::test]
async fn test_generation_routes_without_service() {
    let fixture = TestFixture::with_config(TestConfig::bare()).await;
    let response = fixture.post_empty("/api/v1/generation/sync").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}
