use std::sync::Arc;
use thiserror::Error;
use crate::core::normalizer::{normalize, ValidationError};
use crate::core::precautions::{self, LookupError};
use crate::core::schema::Schema;
use crate::models::{Domain, FeatureImportance, Label, PredictionResult, RawInputRecord};

/// Scores strictly above this are labelled positive
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Number of features reported for the child outcome model
pub const TOP_FEATURES: usize = 5;

/// Which statistic a feature importance is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportanceType {
    /// Number of splits using the feature
    Split,
    /// Total gain of splits using the feature
    Gain,
}

/// Errors raised by a classifier while scoring a row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("feature vector has {actual} values but the model expects {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("model produced an invalid probability: {0}")]
    InvalidScore(f64),
}

/// A pre-trained binary classifier
pub trait Classifier: Send + Sync {
    /// Number of input features the model was trained on
    fn num_features(&self) -> usize;

    /// Probability of the positive class for one row
    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Per-feature importance, indexed by feature position
    fn feature_importance(&self, kind: ImportanceType) -> Vec<f64>;
}

/// Any failure between receiving a record and producing a result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Map a probability to a label with a strict `>` comparison
pub fn label_for(score: f64) -> Label {
    if score > DECISION_THRESHOLD {
        Label::Positive
    } else {
        Label::Negative
    }
}

/// Pair the `k` largest importances with their feature names
///
/// Ordering is descending by score; ties keep the lower feature index first.
/// Importances are matched to names by position. Entries without a name and
/// non-finite scores are dropped.
pub fn top_feature_importances(importances: &[f64], names: &[&str], k: usize) -> Vec<FeatureImportance> {
    let mut indices: Vec<usize> = (0..importances.len()).collect();
    indices.retain(|&idx| importances[idx].is_finite());
    indices.sort_by(|&a, &b| importances[b].total_cmp(&importances[a]));

    indices
        .into_iter()
        .filter_map(|idx| {
            names.get(idx).map(|name| FeatureImportance {
                name: name.to_string(),
                score: importances[idx],
            })
        })
        .take(k)
        .collect()
}

/// Runs records through normalization, inference and precaution lookup
///
/// Holds both models behind `Arc` so a single service is shared by every
/// worker without locking.
pub struct PredictionService {
    gdm_model: Arc<dyn Classifier>,
    child_model: Arc<dyn Classifier>,
    child_top_features: Vec<FeatureImportance>,
}

impl PredictionService {
    pub fn new(gdm_model: Arc<dyn Classifier>, child_model: Arc<dyn Classifier>) -> Self {
        let names: Vec<&str> = Schema::for_domain(Domain::ChildOutcome).feature_names().collect();
        let importances = child_model.feature_importance(ImportanceType::Gain);
        if importances.len() != names.len() {
            tracing::warn!(
                "Child model reports {} importances for {} feature names",
                importances.len(),
                names.len()
            );
        }
        let child_top_features = top_feature_importances(&importances, &names, TOP_FEATURES);

        Self {
            gdm_model,
            child_model,
            child_top_features,
        }
    }

    /// Gestational diabetes prediction for a maternal record
    pub fn predict_gdm(&self, record: &RawInputRecord) -> Result<PredictionResult, PredictionError> {
        self.predict(Domain::Maternal, record)
    }

    /// Child outcome prediction, including top feature importances
    pub fn predict_child(&self, record: &RawInputRecord) -> Result<PredictionResult, PredictionError> {
        self.predict(Domain::ChildOutcome, record)
    }

    pub fn predict(&self, domain: Domain, record: &RawInputRecord) -> Result<PredictionResult, PredictionError> {
        let schema = Schema::for_domain(domain);
        let features = normalize(record, schema)?;

        let probability = self.model(domain).predict_proba(features.as_slice())?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::InvalidScore(probability).into());
        }

        let label = label_for(probability);
        let precautions = precautions::resolve(domain, label)?
            .iter()
            .map(|p| p.to_string())
            .collect();

        let top_features = match domain {
            Domain::ChildOutcome => Some(self.child_top_features.clone()),
            Domain::Maternal => None,
        };

        Ok(PredictionResult {
            domain,
            label,
            probability,
            precautions,
            top_features,
        })
    }

    pub fn model(&self, domain: Domain) -> &dyn Classifier {
        match domain {
            Domain::Maternal => self.gdm_model.as_ref(),
            Domain::ChildOutcome => self.child_model.as_ref(),
        }
    }
}
