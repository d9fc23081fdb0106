//! End-to-end pipeline tests against a mocked remote service.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pitch_inference::GeminiClient;
use pitch_pipeline::{DetectionPipeline, PipelineConfig, PipelineError};
use pitch_upload::{FilesClient, PollConfig};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn fast_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.poll = PollConfig::default()
        .with_initial_interval(Duration::from_millis(5))
        .with_max_interval(Duration::from_millis(10))
        .with_deadline(Duration::from_secs(2));
    config.retry_base_delay = Duration::from_millis(1);
    config.upload_max_retries = 1;
    config.poll_max_retries = 0;
    config
}

fn pipeline_against(server: &MockServer, config: PipelineConfig) -> DetectionPipeline {
    let files = FilesClient::new("test-key").with_base_url(server.uri());
    let model = GeminiClient::new("test-key").with_base_url(server.uri());
    DetectionPipeline::new(files, model, config)
}

fn finalize_body(state: &str) -> serde_json::Value {
    json!({
        "file": {
            "name": "files/match-1",
            "uri": "https://files.example/match-1",
            "mimeType": "video/mp4",
            "state": state
        }
    })
}

fn status_body(state: &str) -> serde_json::Value {
    json!({
        "name": "files/match-1",
        "uri": "https://files.example/match-1",
        "mimeType": "video/mp4",
        "state": state
    })
}

fn candidate_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

async fn mount_upload(server: &MockServer, finalize_state: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", &*format!("{}/upload-session", server.uri())),
        )
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(finalize_body(finalize_state)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_video_flow_uploads_polls_infers_and_cleans_up() {
    let server = MockServer::start().await;
    mount_upload(&server, "PROCESSING").await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PROCESSING")))
        .up_to_n_times(5)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("ACTIVE")))
        .mount(&server)
        .await;

    // The reply wraps its JSON in prose and a fenced block, as real model
    // output tends to.
    let reply = "Here you go:\n```json\n{\"players\":[{\"id\":1,\"x\":10,\"y\":10,\"width\":8,\"height\":18,\"confidence\":0.9,\"team\":\"home\"}]}\n```";
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_text(reply)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // A tiny chunk size forces several sequential PUTs.
    let files = FilesClient::new("test-key")
        .with_base_url(server.uri())
        .with_chunk_size(4);
    let model = GeminiClient::new("test-key").with_base_url(server.uri());
    let pipeline = DetectionPipeline::new(files, model, fast_config());

    let result = pipeline
        .detect_players_in_video(b"fake video bytes", "match.mp4", "video/mp4")
        .await
        .unwrap();

    assert!(!result.degraded);
    assert_eq!(result.detections.len(), 1);
    let d = &result.detections[0];
    assert_eq!(d.jersey_number, "1");
    assert!(d.is_valid());

    let requests = server.received_requests().await.unwrap();
    let chunk_puts = requests
        .iter()
        .filter(|r| r.url.path() == "/upload-session")
        .count();
    assert_eq!(chunk_puts, 4); // 16 bytes in chunks of 4
}

#[tokio::test]
async fn exhausted_inference_degrades_to_fallback() {
    let server = MockServer::start().await;
    mount_upload(&server, "ACTIVE").await;

    // 3 retries beyond the first attempt
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server, fast_config());
    let result = pipeline
        .detect_players_in_video(b"fake video bytes", "match.mp4", "video/mp4")
        .await
        .unwrap();

    assert!(result.degraded);
    assert!(!result.detections.is_empty());
    for d in &result.detections {
        assert!(d.is_valid());
    }
}

#[tokio::test]
async fn disabled_fallback_propagates_the_inference_error() {
    let server = MockServer::start().await;
    mount_upload(&server, "ACTIVE").await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = fast_config();
    config.fallback_enabled = false;
    let pipeline = pipeline_against(&server, config);

    let err = pipeline
        .detect_players_in_video(b"fake video bytes", "match.mp4", "video/mp4")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Inference(_)));
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let server = MockServer::start().await;
    mount_upload(&server, "ACTIVE").await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = fast_config();
    config.fallback_enabled = false;
    let pipeline = pipeline_against(&server, config);

    let err = pipeline
        .detect_players_in_video(b"fake video bytes", "match.mp4", "video/mp4")
        .await
        .unwrap_err();
    assert_eq!(err.probable_cause(), "expired credential");
}

#[tokio::test]
async fn failed_remote_processing_cleans_up_the_handle() {
    let server = MockServer::start().await;
    mount_upload(&server, "PROCESSING").await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("FAILED")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/match-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server, fast_config());
    let err = pipeline
        .detect_players_in_video(b"fake video bytes", "match.mp4", "video/mp4")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Upload(_)));
    assert_eq!(err.probable_cause(), "remote processing failure");
}

#[tokio::test]
async fn oversized_payload_never_reaches_the_network() {
    let server = MockServer::start().await;
    mount_upload(&server, "ACTIVE").await;

    let pipeline = pipeline_against(&server, fast_config());
    // Declared size comes from the slice length, so an empty slice trips
    // the validator instead.
    let err = pipeline
        .detect_players_in_video(b"", "match.mp4", "video/mp4")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Upload(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
