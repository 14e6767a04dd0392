//! Exercises `PredictionClient` against a mock HTTP server, covering the
//! status-code-to-error mapping and the batch submit/poll round trip
//! (spec §4.5, §6 wire protocol).

use chem_prediction::models::BatchPredictionRequest;
use chem_prediction::{PredictionClient, PredictionClientConfig, PredictionError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PredictionClient {
    PredictionClient::new(PredictionClientConfig::new(server.uri(), "test-api-key"))
}

#[tokio::test]
async fn submit_batch_prediction_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predictions/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "batch_id": "11111111-1111-1111-1111-111111111111",
            "status": "processing",
            "job_id": "22222222-2222-2222-2222-222222222222",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = BatchPredictionRequest { molecule_ids: vec![uuid::Uuid::new_v4()],
                                            properties: vec!["logp".to_string()],
                                            model_name: None,
                                            model_version: None,
                                            options: None };
    let response = client.submit_batch_prediction(request).await.unwrap();
    assert_eq!(response.status, "processing");
    assert_eq!(response.job_id.as_deref(), Some("22222222-2222-2222-2222-222222222222"));
}

#[tokio::test]
async fn batch_status_checks_current_state() {
    let server = MockServer::start().await;
    let job_id = uuid::Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/predictions/batch/{job_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "batch_id": job_id.to_string(),
            "status": "completed",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let status = client.get_batch_prediction_status(job_id).await.unwrap();
    assert_eq!(status.status, "completed");
}

#[tokio::test]
async fn rate_limited_status_maps_to_typed_error() {
    let server = MockServer::start().await;
    let job_id = uuid::Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/predictions/batch/{job_id}")))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_batch_prediction_status(job_id).await.unwrap_err();
    assert!(matches!(err, PredictionError::RateLimited));
}

#[tokio::test]
async fn missing_job_maps_to_not_found_error() {
    let server = MockServer::start().await;
    let job_id = uuid::Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/predictions/{job_id}/status")))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such job"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_prediction_status(&job_id.to_string()).await.unwrap_err();
    assert!(matches!(err, PredictionError::PredictionJobNotFound(_)));
}

#[tokio::test]
async fn tripped_breaker_fails_fast_with_service_unavailable() {
    // A port nothing listens on, so every attempt hits a real connection
    // failure rather than a mocked response.
    let dead_url = "http://127.0.0.1:1";
    let mut config = PredictionClientConfig::new(dead_url, "test-api-key");
    config.max_retries = 0;
    config.circuit_fail_max = 1;
    let client = PredictionClient::new(config);

    let job_id = uuid::Uuid::new_v4();
    let first = client.get_batch_prediction_status(job_id).await.unwrap_err();
    assert!(matches!(first, PredictionError::ConnectionFailed(_)));

    // The first failure already tripped the breaker (fail_max == 1): the
    // next call must fail fast without attempting a network request.
    let second = client.get_batch_prediction_status(job_id).await.unwrap_err();
    assert!(matches!(second, PredictionError::ServiceUnavailable));
    assert!(second.is_transient());
}
