use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely-typed feature record as it arrives on the wire
///
/// Values are left as raw JSON; coercion to the model's numeric types is the
/// normalizer's job so that type problems surface as validation errors
/// naming the offending field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputRecord {
    fields: Map<String, Value>,
}

impl RawInputRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of this record with one field removed
    pub fn without(&self, field: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.remove(field);
        Self { fields }
    }

    /// Copy of this record with one field replaced
    pub fn with(&self, field: &str, value: Value) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(field.to_string(), value);
        Self { fields }
    }
}
