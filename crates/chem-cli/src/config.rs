//! Process-wide configuration (spec §6), extending `chem_persistence::DbConfig`
//! with the AI Engine and ingestion limits an operator may override in `.env`.
//! Grounded on the `AppConfig { database: DatabaseConfig }` + `static CONFIG:
//! Lazy<AppConfig>` nesting pattern in `chem-gl-chemflow`'s own `src/config.rs`.

use std::env;
use std::time::Duration;

use chem_domain::constants::{
    BATCH_INSERT_SIZE, MAX_CSV_SIZE_MB, MAX_ROWS, PREDICTION_MAX_WAIT_S, PREDICTION_POLL_INTERVAL_S,
};
use chem_persistence::DbConfig;
use chem_prediction::client::{DEFAULT_CIRCUIT_FAIL_MAX, DEFAULT_CIRCUIT_RESET_S, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_S};
use chem_prediction::PredictionClientConfig;
use once_cell::sync::Lazy;

pub struct IngestionConfig {
    pub max_csv_size_mb: u64,
    pub max_rows: usize,
    pub batch_insert_size: usize,
}

pub struct AiEngineConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_s: u64,
    pub max_retries: u32,
    pub circuit_threshold: u32,
    pub circuit_reset_s: u64,
    pub poll_interval_s: u64,
    pub max_wait_s: u64,
}

pub struct AppConfig {
    pub database: DbConfig,
    pub ingestion: IngestionConfig,
    pub ai_engine: AiEngineConfig,
}

pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

impl AppConfig {
    fn from_env() -> Self {
        let database = DbConfig::from_env();
        let ingestion = IngestionConfig { max_csv_size_mb: env_u64("MAX_CSV_SIZE_MB", MAX_CSV_SIZE_MB),
                                           max_rows: env_usize("MAX_ROWS", MAX_ROWS),
                                           batch_insert_size: env_usize("BATCH_INSERT_SIZE", BATCH_INSERT_SIZE) };
        let ai_engine =
            AiEngineConfig { url: env::var("AI_ENGINE_URL").unwrap_or_else(|_| "http://localhost:9000".to_string()),
                              api_key: env::var("AI_ENGINE_API_KEY").unwrap_or_default(),
                              timeout_s: env_u64("AI_ENGINE_TIMEOUT_S", DEFAULT_TIMEOUT_S),
                              max_retries: env_u32("AI_ENGINE_MAX_RETRIES", DEFAULT_MAX_RETRIES),
                              circuit_threshold: env_u32("AI_ENGINE_CIRCUIT_THRESHOLD", DEFAULT_CIRCUIT_FAIL_MAX),
                              circuit_reset_s: env_u64("AI_ENGINE_CIRCUIT_RESET_S", DEFAULT_CIRCUIT_RESET_S),
                              poll_interval_s: env_u64("POLL_INTERVAL_S", PREDICTION_POLL_INTERVAL_S),
                              max_wait_s: env_u64("MAX_WAIT_S", PREDICTION_MAX_WAIT_S) };
        AppConfig { database, ingestion, ai_engine }
    }

    pub fn prediction_client_config(&self) -> PredictionClientConfig {
        let mut config = PredictionClientConfig::new(self.ai_engine.url.clone(), self.ai_engine.api_key.clone());
        config.timeout = Duration::from_secs(self.ai_engine.timeout_s);
        config.max_retries = self.ai_engine.max_retries;
        config.circuit_fail_max = self.ai_engine.circuit_threshold;
        config.circuit_reset = Duration::from_secs(self.ai_engine.circuit_reset_s);
        config
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
