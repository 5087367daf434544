//! Maternal Risk - prediction service for gestational diabetes and child outcomes
//!
//! Clinical feature records are normalized into the fixed feature order each
//! model was trained on, scored by a LightGBM classifier and returned with a
//! label, a probability and advisory precautions.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize, PredictionService, Classifier, Schema, CHILD_SCHEMA, GDM_SCHEMA};
pub use crate::models::{Domain, Label, FeatureVector, PredictionResult, RawInputRecord};
pub use crate::services::{LgbModel, ModelStore};
