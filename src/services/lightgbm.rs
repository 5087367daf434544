//! LightGBM text model loading and single-row inference.
//!
//! Reads the line-based format written by `Booster.save_model()` and
//! evaluates binary classifiers the way LightGBM does: raw tree outputs are
//! summed and passed through the objective's sigmoid.

use std::collections::HashMap;
use std::iter::Peekable;
use std::path::Path;
use std::str::Lines;
use thiserror::Error;
use crate::core::{Classifier, ImportanceType, InferenceError};

/// Values this close to zero count as zero for `missing_type=Zero` splits
const ZERO_THRESHOLD: f64 = 1e-35;

/// Error type for LightGBM model parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("array size mismatch for {field}: expected {expected}, got {actual}")]
    ArraySizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid tree {tree}: {message}")]
    InvalidTree { tree: usize, message: String },

    #[error("unsupported model: {0}")]
    Unsupported(String),
}

/// Missing value handling encoded in bits 2-3 of `decision_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingType {
    #[default]
    None,
    Zero,
    NaN,
}

/// Decoded `decision_type` bitfield
///
/// Bit 0 marks a categorical split, bit 1 sends missing values left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionType {
    pub is_categorical: bool,
    pub default_left: bool,
    pub missing_type: MissingType,
}

impl DecisionType {
    pub fn from_i8(value: i8) -> Self {
        let v = value as u8;
        let missing_type = match (v >> 2) & 3 {
            1 => MissingType::Zero,
            2 => MissingType::NaN,
            _ => MissingType::None,
        };
        DecisionType {
            is_categorical: (v & 1) != 0,
            default_left: (v & 2) != 0,
            missing_type,
        }
    }
}

/// Objective the model was trained with
#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    Binary { sigmoid: f64 },
    CrossEntropy,
    Other(String),
}

impl Objective {
    /// Parse an objective line such as `binary sigmoid:1`
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        match parts.next().unwrap_or("") {
            "binary" => {
                let sigmoid = parts
                    .find_map(|p| p.strip_prefix("sigmoid:").and_then(|v| v.parse::<f64>().ok()))
                    .unwrap_or(1.0);
                Objective::Binary { sigmoid }
            }
            "cross_entropy" | "xentropy" => Objective::CrossEntropy,
            _ => Objective::Other(s.to_string()),
        }
    }

    fn sigmoid_scale(&self) -> Option<f64> {
        match self {
            Objective::Binary { sigmoid } => Some(*sigmoid),
            Objective::CrossEntropy => Some(1.0),
            Objective::Other(_) => None,
        }
    }
}

/// One decision tree
#[derive(Debug, Clone, Default)]
pub struct LgbTree {
    pub num_leaves: usize,
    pub split_feature: Vec<usize>,
    pub split_gain: Vec<f64>,
    pub threshold: Vec<f64>,
    pub decision_type: Vec<DecisionType>,
    pub left_child: Vec<i32>,
    pub right_child: Vec<i32>,
    pub leaf_value: Vec<f64>,
    pub cat_boundaries: Vec<usize>,
    pub cat_threshold: Vec<u32>,
}

impl LgbTree {
    /// Raw output of this tree for one row
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.num_leaves <= 1 {
            return self.leaf_value.first().copied().unwrap_or(0.0);
        }

        let mut node: i32 = 0;
        while node >= 0 {
            let idx = node as usize;
            node = if self.goes_left(idx, features) {
                self.left_child[idx]
            } else {
                self.right_child[idx]
            };
        }

        self.leaf_value[!node as usize]
    }

    fn goes_left(&self, node: usize, features: &[f64]) -> bool {
        let value = features.get(self.split_feature[node]).copied().unwrap_or(f64::NAN);
        let decision = self.decision_type[node];

        if decision.is_categorical {
            self.categorical_decision(node, value, decision)
        } else {
            numerical_decision(value, self.threshold[node], decision)
        }
    }

    fn categorical_decision(&self, node: usize, value: f64, decision: DecisionType) -> bool {
        let value = if value.is_nan() {
            if decision.missing_type == MissingType::NaN {
                return false;
            }
            0.0
        } else {
            value
        };

        if value < 0.0 {
            return false;
        }

        let category = value as usize;
        let cat_idx = self.threshold[node] as usize;
        let (start, end) = match (self.cat_boundaries.get(cat_idx), self.cat_boundaries.get(cat_idx + 1)) {
            (Some(&start), Some(&end)) => (start, end),
            _ => return false,
        };
        let bitset = self.cat_threshold.get(start..end).unwrap_or(&[]);

        let word = category / 32;
        bitset
            .get(word)
            .map(|bits| (bits >> (category % 32)) & 1 == 1)
            .unwrap_or(false)
    }

    fn validate(&self, tree: usize, num_features: usize) -> Result<(), ParseError> {
        let invalid = |message: String| ParseError::InvalidTree { tree, message };

        if self.num_leaves <= 1 {
            return Ok(());
        }

        let num_splits = self.num_leaves - 1;
        for node in 0..num_splits {
            if self.split_feature[node] >= num_features {
                return Err(invalid(format!(
                    "node {} splits on feature {} but the model has {} features",
                    node, self.split_feature[node], num_features
                )));
            }
            for child in [self.left_child[node], self.right_child[node]] {
                // LightGBM numbers internal nodes in pre-order, so children follow parents
                let in_range = if child >= 0 {
                    (child as usize) > node && (child as usize) < num_splits
                } else {
                    (!child as usize) < self.num_leaves
                };
                if !in_range {
                    return Err(invalid(format!("node {} has invalid child index {}", node, child)));
                }
            }
            if self.decision_type[node].is_categorical
                && self.threshold[node] as usize + 1 >= self.cat_boundaries.len()
            {
                return Err(invalid(format!("node {} references a missing category set", node)));
            }
        }
        Ok(())
    }
}

fn numerical_decision(value: f64, threshold: f64, decision: DecisionType) -> bool {
    let value = if value.is_nan() && decision.missing_type != MissingType::NaN {
        0.0
    } else {
        value
    };

    let is_missing = match decision.missing_type {
        MissingType::Zero => value.abs() <= ZERO_THRESHOLD,
        MissingType::NaN => value.is_nan(),
        MissingType::None => false,
    };

    if is_missing {
        decision.default_left
    } else {
        value <= threshold
    }
}

/// A parsed LightGBM binary classifier
#[derive(Debug, Clone)]
pub struct LgbModel {
    pub version: String,
    pub max_feature_idx: usize,
    pub objective: Objective,
    pub average_output: bool,
    pub feature_names: Vec<String>,
    pub trees: Vec<LgbTree>,
}

impl LgbModel {
    /// Load a model from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_string(&content)
    }

    /// Parse a model from its text representation
    pub fn from_string(content: &str) -> Result<Self, ParseError> {
        let mut lines = content.lines().peekable();
        let header = parse_header(&mut lines)?;

        let num_class: usize = parse_required(&header, "num_class")?;
        let trees_per_iteration: usize = parse_optional(&header, "num_tree_per_iteration")?.unwrap_or(num_class);
        if num_class != 1 || trees_per_iteration != 1 {
            return Err(ParseError::Unsupported(format!(
                "expected a single-output model, got num_class={} num_tree_per_iteration={}",
                num_class, trees_per_iteration
            )));
        }

        let objective = header
            .get("objective")
            .map(|o| Objective::parse(o))
            .ok_or(ParseError::MissingField("objective"))?;
        if objective.sigmoid_scale().is_none() {
            return Err(ParseError::Unsupported(format!("objective {:?} is not a binary classifier", objective)));
        }

        let max_feature_idx: usize = parse_required(&header, "max_feature_idx")?;

        let mut trees = Vec::new();
        while let Some(line) = lines.next() {
            if line.starts_with("Tree=") {
                let tree = parse_tree(&mut lines)?;
                tree.validate(trees.len(), max_feature_idx + 1)?;
                trees.push(tree);
            } else if line == "end of trees" {
                break;
            }
        }

        if trees.is_empty() {
            return Err(ParseError::Unsupported("model contains no trees".to_string()));
        }

        Ok(LgbModel {
            version: header.get("version").cloned().unwrap_or_default(),
            max_feature_idx,
            objective,
            average_output: header.contains_key("average_output"),
            feature_names: header
                .get("feature_names")
                .map(|names| names.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            trees,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Sum of tree outputs before the sigmoid
    pub fn predict_raw(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        if self.average_output {
            sum / self.trees.len() as f64
        } else {
            sum
        }
    }
}

impl Classifier for LgbModel {
    fn num_features(&self) -> usize {
        self.max_feature_idx + 1
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let expected = self.num_features();
        if features.len() != expected {
            return Err(InferenceError::FeatureCountMismatch {
                expected,
                actual: features.len(),
            });
        }

        let scale = self.objective.sigmoid_scale().unwrap_or(1.0);
        let raw = self.predict_raw(features);
        Ok(1.0 / (1.0 + (-scale * raw).exp()))
    }

    fn feature_importance(&self, kind: ImportanceType) -> Vec<f64> {
        let mut importances = vec![0.0; self.num_features()];
        for tree in &self.trees {
            for (node, &feature) in tree.split_feature.iter().enumerate() {
                let gain = tree.split_gain.get(node).copied().unwrap_or(0.0);
                if !(gain > 0.0 && gain.is_finite()) {
                    continue;
                }
                if let Some(slot) = importances.get_mut(feature) {
                    *slot += match kind {
                        ImportanceType::Split => 1.0,
                        ImportanceType::Gain => gain,
                    };
                }
            }
        }
        importances
    }
}

// ----------------------------------------------------------------------------
// Parsing helpers
// ----------------------------------------------------------------------------

/// Collect key=value pairs until the first tree
fn parse_header(lines: &mut Peekable<Lines>) -> Result<HashMap<String, String>, ParseError> {
    let mut kv = HashMap::new();

    while let Some(line) = lines.peek() {
        if line.starts_with("Tree=") {
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            kv.insert(key.to_string(), value.to_string());
        } else if line.trim() == "average_output" {
            kv.insert("average_output".to_string(), String::new());
        }
        lines.next();
    }

    Ok(kv)
}

/// Parse one `Tree=` block; the `Tree=N` line has already been consumed
fn parse_tree(lines: &mut Peekable<Lines>) -> Result<LgbTree, ParseError> {
    let mut kv = HashMap::new();

    while let Some(line) = lines.peek() {
        if line.is_empty() || line.starts_with("Tree=") || line.starts_with("end of trees") {
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            kv.insert(key.to_string(), value.to_string());
        }
        lines.next();
    }

    let is_linear: i32 = parse_optional(&kv, "is_linear")?.unwrap_or(0);
    if is_linear != 0 {
        return Err(ParseError::Unsupported("linear trees".to_string()));
    }

    let num_leaves: usize = parse_required(&kv, "num_leaves")?;
    let leaf_value = parse_array::<f64>(&kv, "leaf_value")?;

    if num_leaves <= 1 {
        return Ok(LgbTree {
            num_leaves,
            leaf_value: if leaf_value.is_empty() { vec![0.0] } else { leaf_value },
            ..LgbTree::default()
        });
    }

    let num_splits = num_leaves - 1;
    let split_feature = parse_array::<usize>(&kv, "split_feature")?;
    let threshold = parse_array::<f64>(&kv, "threshold")?;
    let left_child = parse_array::<i32>(&kv, "left_child")?;
    let right_child = parse_array::<i32>(&kv, "right_child")?;

    validate_array_size("split_feature", &split_feature, num_splits)?;
    validate_array_size("threshold", &threshold, num_splits)?;
    validate_array_size("left_child", &left_child, num_splits)?;
    validate_array_size("right_child", &right_child, num_splits)?;
    validate_array_size("leaf_value", &leaf_value, num_leaves)?;

    let split_gain = if kv.contains_key("split_gain") {
        parse_array::<f64>(&kv, "split_gain")?
    } else {
        vec![0.0; num_splits]
    };

    let decision_type = if kv.contains_key("decision_type") {
        parse_array::<i8>(&kv, "decision_type")?
            .into_iter()
            .map(DecisionType::from_i8)
            .collect()
    } else {
        vec![DecisionType::default(); num_splits]
    };
    validate_array_size("decision_type", &decision_type, num_splits)?;

    let num_cat: usize = parse_optional(&kv, "num_cat")?.unwrap_or(0);
    let (cat_boundaries, cat_threshold) = if num_cat > 0 {
        let boundaries = parse_array::<usize>(&kv, "cat_boundaries")?;
        validate_array_size("cat_boundaries", &boundaries, num_cat + 1)?;
        (boundaries, parse_array::<u32>(&kv, "cat_threshold")?)
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(LgbTree {
        num_leaves,
        split_feature,
        split_gain,
        threshold,
        decision_type,
        left_child,
        right_child,
        leaf_value,
        cat_boundaries,
        cat_threshold,
    })
}

fn parse_required<T: std::str::FromStr>(kv: &HashMap<String, String>, field: &'static str) -> Result<T, ParseError> {
    parse_optional(kv, field)?.ok_or(ParseError::MissingField(field))
}

fn parse_optional<T: std::str::FromStr>(kv: &HashMap<String, String>, field: &'static str) -> Result<Option<T>, ParseError> {
    kv.get(field)
        .map(|v| {
            v.trim().parse().map_err(|_| ParseError::InvalidValue {
                field,
                message: format!("cannot parse {:?}", v),
            })
        })
        .transpose()
}

/// Whitespace-separated array; absent keys are reported as missing
fn parse_array<T: std::str::FromStr>(kv: &HashMap<String, String>, field: &'static str) -> Result<Vec<T>, ParseError> {
    let raw = kv.get(field).ok_or(ParseError::MissingField(field))?;
    raw.split_whitespace()
        .map(|v| {
            v.parse().map_err(|_| ParseError::InvalidValue {
                field,
                message: format!("invalid element: {}", v),
            })
        })
        .collect()
}

fn validate_array_size<T>(field: &'static str, arr: &[T], expected: usize) -> Result<(), ParseError> {
    if arr.len() != expected {
        return Err(ParseError::ArraySizeMismatch {
            field,
            expected,
            actual: arr.len(),
        });
    }
    Ok(())
}
