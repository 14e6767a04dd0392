//! `PredictionClient`: the typed HTTP client to the external AI Engine
//! (spec §4.5, §6 wire protocol), grounded on
//! `original_source/integrations/ai_engine/client.py`'s `AIEngineClient`.

use std::time::Duration;

use chem_domain::constants::{is_predictable, MAX_PREDICTION_BATCH_SIZE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::circuit_breaker::CircuitBreaker;
use crate::error::PredictionError;
use crate::models::{
    AiModelInfo, AiModelsEnvelope, BatchPredictionRequest, BatchPredictionResponse, PredictionJobStatus, PredictionRequest,
    PredictionResponse,
};

pub const DEFAULT_TIMEOUT_S: u64 = 30;
pub const DEFAULT_HEALTH_TIMEOUT_S: u64 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_FACTOR_S: f64 = 0.5;
pub const DEFAULT_POLL_INTERVAL_S: u64 = 5;
pub const DEFAULT_MAX_WAIT_S: u64 = 300;
pub const DEFAULT_CIRCUIT_FAIL_MAX: u32 = 5;
pub const DEFAULT_CIRCUIT_RESET_S: u64 = 60;

#[derive(Debug, Clone)]
pub struct PredictionClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff_factor_s: f64,
    pub circuit_fail_max: u32,
    pub circuit_reset: Duration,
}

impl PredictionClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { base_url: base_url.into(),
               api_key: api_key.into(),
               timeout: Duration::from_secs(DEFAULT_TIMEOUT_S),
               max_retries: DEFAULT_MAX_RETRIES,
               retry_backoff_factor_s: DEFAULT_RETRY_BACKOFF_FACTOR_S,
               circuit_fail_max: DEFAULT_CIRCUIT_FAIL_MAX,
               circuit_reset: Duration::from_secs(DEFAULT_CIRCUIT_RESET_S) }
    }
}

pub struct PredictionClient {
    http: reqwest::Client,
    config: PredictionClientConfig,
    breaker: CircuitBreaker,
}

impl PredictionClient {
    pub fn new(config: PredictionClientConfig) -> Self {
        let breaker = CircuitBreaker::new(config.circuit_fail_max, config.circuit_reset);
        let http = reqwest::Client::builder().timeout(config.timeout).build().expect("reqwest client builds");
        Self { http, config, breaker }
    }

    fn validate_properties(&self, properties: &[String]) -> Result<(), PredictionError> {
        if properties.is_empty() {
            return Err(PredictionError::InvalidPredictionParameters("properties list cannot be empty".into()));
        }
        for prop in properties {
            if !is_predictable(prop) {
                return Err(PredictionError::UnsupportedProperty(prop.clone()));
            }
        }
        Ok(())
    }

    pub async fn predict_properties(&self, request: PredictionRequest) -> Result<PredictionResponse, PredictionError> {
        if request.smiles.is_empty() {
            return Err(PredictionError::InvalidPredictionParameters("smiles list cannot be empty".into()));
        }
        self.validate_properties(&request.properties)?;
        if request.smiles.len() > MAX_PREDICTION_BATCH_SIZE {
            return Err(PredictionError::BatchSizeExceeded { batch_size: request.smiles.len(),
                                                              max_batch_size: MAX_PREDICTION_BATCH_SIZE });
        }
        self.call(Method::POST, "/predictions", Some(&request), None).await
    }

    pub async fn get_prediction_status(&self, job_id: &str) -> Result<PredictionJobStatus, PredictionError> {
        validate_job_id(job_id)?;
        self.call(Method::GET, &format!("/predictions/{job_id}/status"), None::<&()>, None).await
    }

    pub async fn get_prediction_results(&self, job_id: &str) -> Result<PredictionResponse, PredictionError> {
        validate_job_id(job_id)?;
        self.call(Method::GET, &format!("/predictions/{job_id}/results"), None::<&()>, None).await
    }

    /// Polls `get_prediction_status` until the job completes, fails, or
    /// `max_wait` elapses (spec §4.5 `wait_for_completion`).
    pub async fn wait_for_completion(&self,
                                      job_id: &str,
                                      max_wait: Duration,
                                      poll_interval: Duration)
                                      -> Result<PredictionResponse, PredictionError> {
        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            let status = self.get_prediction_status(job_id).await?;
            match status.status.as_str() {
                "completed" => return self.get_prediction_results(job_id).await,
                "failed" => return Err(PredictionError::JobFailed(job_id.to_string())),
                _ => {}
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(PredictionError::WaitTimeout(job_id.to_string(), max_wait.as_secs()));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    pub async fn submit_batch_prediction(&self,
                                          request: BatchPredictionRequest)
                                          -> Result<BatchPredictionResponse, PredictionError> {
        if request.molecule_ids.is_empty() {
            return Err(PredictionError::InvalidPredictionParameters("molecule_ids list cannot be empty".into()));
        }
        self.validate_properties(&request.properties)?;
        if request.molecule_ids.len() > MAX_PREDICTION_BATCH_SIZE {
            return Err(PredictionError::BatchSizeExceeded { batch_size: request.molecule_ids.len(),
                                                              max_batch_size: MAX_PREDICTION_BATCH_SIZE });
        }
        self.call(Method::POST, "/predictions/batch", Some(&request), None).await
    }

    pub async fn get_batch_prediction_status(&self, batch_id: Uuid) -> Result<BatchPredictionResponse, PredictionError> {
        self.call(Method::GET, &format!("/predictions/batch/{batch_id}"), None::<&()>, None).await
    }

    pub async fn get_available_models(&self) -> Result<Vec<AiModelInfo>, PredictionError> {
        let envelope: AiModelsEnvelope = self.call(Method::GET, "/models", None::<&()>, None).await?;
        Ok(envelope.models)
    }

    pub async fn get_model_info(&self, model_name: &str, model_version: Option<&str>) -> Result<AiModelInfo, PredictionError> {
        let path = match model_version {
            Some(version) => format!("/models/{model_name}/versions/{version}"),
            None => format!("/models/{model_name}"),
        };
        self.call(Method::GET, &path, None::<&()>, None).await
    }

    /// `health_check` uses a short fixed timeout and never propagates an
    /// error: connectivity problems simply read as unhealthy.
    pub async fn health_check(&self) -> bool {
        let url = self.url("/health");
        match self.http.get(url).timeout(Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_S)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::warn!("AI Engine health check failed: {e}");
                false
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Issues one logical request: circuit-breaker gated, retried on
    /// connection failure with exponential backoff, HTTP status mapped to
    /// `PredictionError` (spec §4.5 error mapping table).
    async fn call<B: Serialize + ?Sized, R: DeserializeOwned>(&self,
                                                               method: Method,
                                                               path: &str,
                                                               body: Option<&B>,
                                                               timeout_override: Option<Duration>)
                                                               -> Result<R, PredictionError> {
        self.breaker.before_call()?;
        match self.call_with_retries(method, path, body, timeout_override).await {
            Ok(value) => {
                self.breaker.on_success();
                Ok(value)
            }
            Err(e) => {
                self.breaker.on_failure();
                Err(e)
            }
        }
    }

    async fn call_with_retries<B: Serialize + ?Sized, R: DeserializeOwned>(&self,
                                                                            method: Method,
                                                                            path: &str,
                                                                            body: Option<&B>,
                                                                            timeout_override: Option<Duration>)
                                                                            -> Result<R, PredictionError> {
        let url = self.url(path);
        let mut retry_count = 0u32;
        loop {
            let mut builder = self.http.request(method.clone(), &url).header("X-API-Key", &self.config.api_key);
            if let Some(timeout) = timeout_override {
                builder = builder.timeout(timeout);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(response) => return self.handle_response(response).await,
                Err(e) if e.is_timeout() => {
                    return Err(PredictionError::Timeout(self.config.timeout.as_secs()));
                }
                Err(e) if e.is_connect() => {
                    retry_count += 1;
                    if retry_count > self.config.max_retries {
                        return Err(PredictionError::ConnectionFailed(e.to_string()));
                    }
                    let wait = self.config.retry_backoff_factor_s * 2f64.powi(retry_count as i32 - 1);
                    log::warn!("connection error calling AI Engine, retrying in {wait:.2}s (attempt {retry_count}/{})",
                               self.config.max_retries);
                    tokio::time::sleep(Duration::from_secs_f64(wait)).await;
                }
                Err(e) => return Err(PredictionError::ConnectionFailed(e.to_string())),
            }
        }
    }

    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R, PredictionError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;
            return serde_json::from_slice(&bytes).map_err(|e| PredictionError::MalformedResponse(e.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_error_status(status, body))
    }
}

fn map_error_status(status: StatusCode, body: String) -> PredictionError {
    PredictionError::from_status(status.as_u16(), body)
}

fn validate_job_id(job_id: &str) -> Result<(), PredictionError> {
    Uuid::parse_str(job_id).map(|_| ())
                           .map_err(|_| PredictionError::InvalidPredictionParameters(format!("invalid job id '{job_id}'")))
}
