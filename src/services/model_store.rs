use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use crate::config::ModelSettings;
use crate::core::{Classifier, Schema};
use crate::models::Domain;
use crate::services::lightgbm::{LgbModel, ParseError};

/// Errors that can occur while loading model artifacts
#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("failed to load {domain} model from {}: {source}", .path.display())]
    Load {
        domain: Domain,
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Both trained models, loaded once at startup
pub struct ModelStore {
    pub gdm: Arc<LgbModel>,
    pub child: Arc<LgbModel>,
}

impl ModelStore {
    /// Load both models from the configured directory
    pub fn load(settings: &ModelSettings) -> Result<Self, ModelStoreError> {
        let dir = Path::new(&settings.dir);
        let gdm = load_model(Domain::Maternal, &dir.join(&settings.gdm_file))?;
        let child = load_model(Domain::ChildOutcome, &dir.join(&settings.child_file))?;

        Ok(Self {
            gdm: Arc::new(gdm),
            child: Arc::new(child),
        })
    }

    pub fn gdm_classifier(&self) -> Arc<dyn Classifier> {
        self.gdm.clone()
    }

    pub fn child_classifier(&self) -> Arc<dyn Classifier> {
        self.child.clone()
    }
}

fn load_model(domain: Domain, path: &Path) -> Result<LgbModel, ModelStoreError> {
    let model = LgbModel::from_file(path).map_err(|source| ModelStoreError::Load {
        domain,
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        "Loaded {} model from {} ({} trees, {} features)",
        domain,
        path.display(),
        model.num_trees(),
        model.num_features()
    );

    let schema = Schema::for_domain(domain);
    if model.num_features() != schema.len() {
        tracing::warn!(
            "{} model expects {} features but the schema produces {}; predictions will be rejected",
            domain,
            model.num_features(),
            schema.len()
        );
    }

    if !model.feature_names.is_empty() {
        let mismatched: Vec<_> = model
            .feature_names
            .iter()
            .zip(schema.feature_names())
            .filter(|(trained, expected)| trained.as_str() != *expected)
            .map(|(trained, expected)| format!("{} != {}", trained, expected))
            .collect();
        if !mismatched.is_empty() {
            tracing::warn!("{} model feature names differ from the schema: {:?}", domain, mismatched);
        }
    }

    Ok(model)
}
