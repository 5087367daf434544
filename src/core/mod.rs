// Core prediction pipeline exports
pub mod normalizer;
pub mod precautions;
pub mod predictor;
pub mod schema;

pub use normalizer::{normalize, ValidationError};
pub use precautions::{resolve, resolve_raw, LookupError, PrecautionCatalog, PRECAUTIONS};
pub use predictor::{
    label_for, top_feature_importances, Classifier, ImportanceType, InferenceError, PredictionError,
    PredictionService, DECISION_THRESHOLD, TOP_FEATURES,
};
pub use schema::{CodeTable, FieldKind, FieldSpec, Schema, CHILD_SCHEMA, GDM_SCHEMA};
