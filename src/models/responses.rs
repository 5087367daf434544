use serde::{Deserialize, Serialize, Serializer};
use crate::models::domain::{FeatureImportance, PredictionResult};

/// Response for the gestational diabetes endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GdmPredictionResponse {
    #[serde(rename = "GDM_Prediction")]
    pub prediction: u8,
    #[serde(rename = "Probability")]
    pub probability: f64,
    #[serde(rename = "Precautions")]
    pub precautions: Vec<String>,
}

impl From<PredictionResult> for GdmPredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.label.as_u8(),
            probability: result.probability,
            precautions: result.precautions,
        }
    }
}

/// Response for the child outcome endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChildPredictionResponse {
    #[serde(rename = "Child_OutcomePrediction")]
    pub prediction: u8,
    #[serde(rename = "Probability")]
    pub probability: f64,
    #[serde(rename = "Precautions")]
    pub precautions: Vec<String>,
    /// Emitted as a JSON object whose keys follow descending importance
    #[serde(rename = "TopFeatureImportances", serialize_with = "serialize_importances")]
    pub top_feature_importances: Vec<FeatureImportance>,
}

impl From<PredictionResult> for ChildPredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.label.as_u8(),
            probability: result.probability,
            precautions: result.precautions,
            top_feature_importances: result.top_features.unwrap_or_default(),
        }
    }
}

fn serialize_importances<S>(importances: &[FeatureImportance], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(importances.iter().map(|f| (f.name.as_str(), f.score)))
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response for rejected prediction requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Body returned when a static asset cannot be served
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetErrorResponse {
    pub error: String,
}
