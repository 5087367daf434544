// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Domain, Label, FeatureVector, FeatureImportance, PredictionResult};
pub use requests::RawInputRecord;
pub use responses::{GdmPredictionResponse, ChildPredictionResponse, HealthResponse, ErrorResponse, AssetErrorResponse};
