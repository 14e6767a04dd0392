//! Wire types for the external prediction service (spec §4.5, §6 wire
//! protocol), grounded on
//! `original_source/integrations/ai_engine/models.py`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MODEL_NAME: &str = "molecule_property_predictor";
pub const DEFAULT_MODEL_VERSION: &str = "v1.0";

#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub smiles: Vec<String>,
    pub properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchPredictionRequest {
    pub molecule_ids: Vec<Uuid>,
    pub properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyPrediction {
    pub value: serde_json::Value,
    pub confidence: f64,
    pub units: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoleculePrediction {
    pub smiles: String,
    pub properties: HashMap<String, PropertyPrediction>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub job_id: String,
    pub status: String,
    #[serde(default)]
    pub results: Option<Vec<MoleculePrediction>>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionJobStatus {
    pub job_id: String,
    pub status: String,
    pub total_molecules: u64,
    pub completed_molecules: u64,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchPredictionResponse {
    pub batch_id: String,
    pub status: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiModelInfo {
    pub name: String,
    pub version: String,
    pub supported_properties: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AiModelsEnvelope {
    #[serde(default)]
    pub models: Vec<AiModelInfo>,
}
