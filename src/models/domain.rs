use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which model, schema and precaution set a request is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Gestational diabetes risk for the mother
    Maternal,
    /// Adverse outcome risk for the child
    ChildOutcome,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Maternal => "maternal",
            Domain::ChildOutcome => "child_outcome",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses domain names from untyped input, used by `precautions::resolve_raw`.
/// Accepts `maternal`/`gdm` and `child_outcome`/`child`, case-insensitively.
impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maternal" | "gdm" => Ok(Domain::Maternal),
            "child_outcome" | "child" => Ok(Domain::ChildOutcome),
            other => Err(other.to_string()),
        }
    }
}

/// Binary classification output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    /// 0, low risk
    Negative,
    /// 1, high risk
    Positive,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(format!("label must be 0 or 1, got {}", other)),
        }
    }
}

/// Ordered numeric encoding of a raw record
///
/// Length and order always match the schema the vector was produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

/// A feature name paired with its model-reported importance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub score: f64,
}

/// Outcome of a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub domain: Domain,
    pub label: Label,
    pub probability: f64,
    pub precautions: Vec<String>,
    /// Child outcome only; ordered by descending score, at most five entries
    pub top_features: Option<Vec<FeatureImportance>>,
}
