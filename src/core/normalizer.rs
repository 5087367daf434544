use serde_json::Value;
use thiserror::Error;
use crate::core::schema::{FieldKind, Schema};
use crate::models::{FeatureVector, RawInputRecord};

/// Errors raised while turning a raw record into a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("field {field} must be {expected}, got {found}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("field {field} must be an integer, got {value}")]
    NotAnInteger { field: &'static str, value: f64 },
}

/// Encode a raw record into the fixed-order vector expected by `schema`
///
/// Fields not named by the schema are ignored.
pub fn normalize(record: &RawInputRecord, schema: &Schema) -> Result<FeatureVector, ValidationError> {
    let mut values = Vec::with_capacity(schema.len());

    for field in schema.fields {
        let raw = record
            .get(field.name)
            .ok_or(ValidationError::MissingField { field: field.name })?;

        let value = match field.kind {
            FieldKind::Float => coerce_float(field.name, raw)?,
            FieldKind::Integer => coerce_integer(field.name, raw)?,
            FieldKind::Categorical(table) => match raw {
                Value::String(s) => {
                    if table.lookup(s).is_none() {
                        tracing::debug!(
                            "Unseen category {:?} for {}, using fallback code {}",
                            s,
                            field.name,
                            table.fallback
                        );
                    }
                    table.encode(s) as f64
                }
                other => return Err(invalid_type(field.name, field.kind.expected(), other)),
            },
        };

        values.push(value);
    }

    Ok(FeatureVector::new(values))
}

fn coerce_float(field: &'static str, raw: &Value) -> Result<f64, ValidationError> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(invalid_type(field, "a number", raw)),
    }
}

fn coerce_integer(field: &'static str, raw: &Value) -> Result<f64, ValidationError> {
    if let Value::Number(n) = raw {
        if let Some(i) = n.as_i64() {
            return Ok(i as f64);
        }
    }

    let value = coerce_float(field, raw).map_err(|_| invalid_type(field, "an integer", raw))?;
    if value.fract() != 0.0 {
        return Err(ValidationError::NotAnInteger { field, value });
    }
    Ok(value)
}

fn invalid_type(field: &'static str, expected: &'static str, found: &Value) -> ValidationError {
    let found = match found {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    };
    ValidationError::InvalidType { field, expected, found }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ETHNICITY, GDM_SCHEMA};
    use serde_json::json;

    fn gdm_record() -> RawInputRecord {
        RawInputRecord::from_value(json!({
            "AgeAtStartOfSpell": 30,
            "WeightMeasured": 70,
            "Height": 165,
            "BodyMassIndexAtBooking": 25.7,
            "Obese": "No",
            "Ethnicity": "White",
            "Glucoselevelblood": 5.4
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_gdm_order() {
        let vector = normalize(&gdm_record(), &GDM_SCHEMA).unwrap();
        assert_eq!(vector.as_slice(), &[30.0, 70.0, 165.0, 25.7, 0.0, 0.0, 5.4]);
    }

    #[test]
    fn test_normalize_ignores_extra_fields() {
        let record = gdm_record().with("Comment", json!("first visit"));
        assert_eq!(normalize(&record, &GDM_SCHEMA).unwrap().len(), 7);
    }

    #[test]
    fn test_missing_field() {
        let err = normalize(&gdm_record().without("Height"), &GDM_SCHEMA).unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "Height" });
        assert_eq!(err.to_string(), "missing required field: Height");
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let record = gdm_record().with("Glucoselevelblood", json!(" 6.1 "));
        let vector = normalize(&record, &GDM_SCHEMA).unwrap();
        assert_eq!(vector.as_slice()[6], 6.1);
    }

    #[test]
    fn test_non_numeric_string_is_rejected() {
        let record = gdm_record().with("WeightMeasured", json!("heavy"));
        let err = normalize(&record, &GDM_SCHEMA).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { field: "WeightMeasured", .. }));
        assert!(err.to_string().contains("\"heavy\""));
    }

    #[test]
    fn test_null_is_rejected() {
        let record = gdm_record().with("Height", Value::Null);
        let err = normalize(&record, &GDM_SCHEMA).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { field: "Height", .. }));
    }

    #[test]
    fn test_categorical_requires_string() {
        let record = gdm_record().with("Ethnicity", json!(3));
        let err = normalize(&record, &GDM_SCHEMA).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { field: "Ethnicity", expected: "a string", .. }));
    }

    #[test]
    fn test_unseen_category_uses_fallback() {
        let record = gdm_record().with("Ethnicity", json!("Unknown-XYZ"));
        let vector = normalize(&record, &GDM_SCHEMA).unwrap();
        assert_eq!(vector.as_slice()[5], ETHNICITY.fallback as f64);
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(coerce_integer("Parity", &json!(2)), Ok(2.0));
        assert_eq!(coerce_integer("Parity", &json!(2.0)), Ok(2.0));
        assert_eq!(coerce_integer("Parity", &json!("3")), Ok(3.0));
        assert_eq!(
            coerce_integer("Parity", &json!(2.5)),
            Err(ValidationError::NotAnInteger { field: "Parity", value: 2.5 })
        );
        assert!(matches!(
            coerce_integer("Parity", &json!("two")),
            Err(ValidationError::InvalidType { expected: "an integer", .. })
        ));
    }

    #[test]
    fn test_float_rejects_non_finite_strings() {
        assert!(coerce_float("Height", &json!("NaN")).is_err());
        assert!(coerce_float("Height", &json!("inf")).is_err());
        assert_eq!(coerce_float("Height", &json!(true)), Ok(1.0));
    }
}
