//! Parameter validation against a recipe schema
//!
//! Validation always runs to completion and reports every violation it
//! finds, so a caller can fix a whole parameter set in one go.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::domain::recipe::{ParameterSchema, PropertyType};
use crate::dto::job::Parameters;

/// A single way in which parameters break a schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("'{property}' is required")]
    Missing { property: String },

    #[error("'{property}' is not a parameter of this recipe")]
    Unknown { property: String },

    #[error("'{property}' must be of type {expected} (found {found})")]
    WrongType {
        property: String,
        expected: PropertyType,
        found: &'static str,
    },

    #[error("'{property}' must be one of {allowed} (found {value})")]
    NotAllowed {
        property: String,
        allowed: String,
        value: Value,
    },

    #[error("'{property}' must be >= {minimum} (found {value})")]
    BelowMinimum {
        property: String,
        minimum: f64,
        value: f64,
    },

    #[error("'{property}' must be <= {maximum} (found {value})")]
    AboveMaximum {
        property: String,
        maximum: f64,
        value: f64,
    },

    #[error("'{property}' expects a {expected}, cannot read '{raw}'")]
    Unparsable {
        property: String,
        expected: PropertyType,
        raw: String,
    },
}

impl Violation {
    /// Name of the offending property
    pub fn property(&self) -> &str {
        match self {
            Self::Missing { property }
            | Self::Unknown { property }
            | Self::WrongType { property, .. }
            | Self::NotAllowed { property, .. }
            | Self::BelowMinimum { property, .. }
            | Self::AboveMaximum { property, .. }
            | Self::Unparsable { property, .. } => property,
        }
    }
}

/// Parameters do not conform to a recipe schema
///
/// Carries every violation found; the message lists them all.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid job parameters: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ParameterSchema {
    /// Check `parameters` against this schema
    ///
    /// Required properties must be present and non-null, every value must
    /// match its declared type and constraints, and no undeclared property
    /// may appear. A `null` optional property counts as absent.
    pub fn validate(&self, parameters: &Parameters) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        // Declared properties first, in declaration order, for stable messages.
        for (name, prop) in self.properties() {
            let value = match parameters.get(name) {
                Some(value) if !(value.is_null() && prop.kind != PropertyType::Null) => value,
                _ => {
                    if self.is_required(name) {
                        violations.push(Violation::Missing {
                            property: name.clone(),
                        });
                    }
                    continue;
                }
            };

            if !prop.kind.matches(value) {
                violations.push(Violation::WrongType {
                    property: name.clone(),
                    expected: prop.kind,
                    found: json_type_name(value),
                });
                continue;
            }

            if let Some(allowed) = &prop.allowed {
                if !allowed.contains(value) {
                    violations.push(Violation::NotAllowed {
                        property: name.clone(),
                        allowed: Value::Array(allowed.clone()).to_string(),
                        value: value.clone(),
                    });
                }
            }

            if let Some(number) = value.as_f64() {
                if let Some(minimum) = prop.minimum.filter(|min| number < *min) {
                    violations.push(Violation::BelowMinimum {
                        property: name.clone(),
                        minimum,
                        value: number,
                    });
                }
                if let Some(maximum) = prop.maximum.filter(|max| number > *max) {
                    violations.push(Violation::AboveMaximum {
                        property: name.clone(),
                        maximum,
                        value: number,
                    });
                }
            }
        }

        let mut unknown: Vec<&String> = parameters
            .keys()
            .filter(|name| self.property(name).is_none())
            .collect();
        unknown.sort();
        violations.extend(unknown.into_iter().map(|name| Violation::Unknown {
            property: name.clone(),
        }));

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Parameters made of every declared default
    pub fn defaults(&self) -> Parameters {
        self.properties()
            .iter()
            .filter_map(|(name, prop)| prop.default.clone().map(|value| (name.clone(), value)))
            .collect()
    }

    /// Turn a raw command-line value into the JSON value `name` expects
    pub fn coerce(&self, name: &str, raw: &str) -> Result<Value, ValidationError> {
        let prop = self.property(name).ok_or_else(|| {
            ValidationError::new(vec![Violation::Unknown {
                property: name.to_string(),
            }])
        })?;

        let unparsable = || {
            ValidationError::new(vec![Violation::Unparsable {
                property: name.to_string(),
                expected: prop.kind,
                raw: raw.to_string(),
            }])
        };

        let trimmed = raw.trim();
        match prop.kind {
            PropertyType::String => Ok(Value::String(raw.to_string())),
            PropertyType::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| unparsable()),
            PropertyType::Number => trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(unparsable),
            PropertyType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(unparsable()),
            },
            PropertyType::Null => match trimmed {
                "" | "null" => Ok(Value::Null),
                _ => Err(unparsable()),
            },
            PropertyType::Object | PropertyType::Array => serde_json::from_str::<Value>(trimmed)
                .ok()
                .filter(|value| prop.kind.matches(value))
                .ok_or_else(unparsable),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ParameterSchema {
        serde_json::from_value(json!({
            "type": "object",
            "properties": {
                "meshFile": { "type": "string", "format": "file" },
                "scale": { "type": "number", "default": 1.0, "minimum": 0.0 },
                "iterations": { "type": "integer", "maximum": 10 },
                "units": { "type": "string", "enum": ["mm", "cm", "m"], "default": "mm" },
                "removeNoise": { "type": "boolean" }
            },
            "required": ["meshFile", "iterations"]
        }))
        .unwrap()
    }

    fn params(value: Value) -> Parameters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_parameters() {
        let result = schema().validate(&params(json!({
            "meshFile": "bunny.obj",
            "scale": 2.5,
            "iterations": 3,
            "units": "cm"
        })));
        assert!(result.is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let err = schema()
            .validate(&params(json!({
                "scale": "big",
                "units": "inch",
                "color": "red",
                "removeNoise": 1
            })))
            .unwrap_err();

        let properties: Vec<&str> = err.violations().iter().map(Violation::property).collect();
        assert_eq!(
            properties,
            vec!["meshFile", "scale", "iterations", "units", "removeNoise", "color"]
        );

        let message = err.to_string();
        for name in ["meshFile", "scale", "iterations", "units", "removeNoise", "color"] {
            assert!(message.contains(name), "message should mention {}: {}", name, message);
        }
    }

    #[test]
    fn test_bounds() {
        let err = schema()
            .validate(&params(json!({
                "meshFile": "bunny.obj",
                "scale": -1,
                "iterations": 11
            })))
            .unwrap_err();

        assert!(matches!(err.violations()[0], Violation::BelowMinimum { .. }));
        assert!(matches!(err.violations()[1], Violation::AboveMaximum { .. }));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let err = schema()
            .validate(&params(json!({ "meshFile": null, "iterations": 1, "scale": null })))
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::Missing {
                property: "meshFile".to_string()
            }]
        );
    }

    #[test]
    fn test_defaults() {
        let defaults = schema().defaults();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults["scale"], json!(1.0));
        assert_eq!(defaults["units"], json!("mm"));
    }

    #[test]
    fn test_coerce_by_type() {
        let schema = schema();
        assert_eq!(schema.coerce("meshFile", "a.obj").unwrap(), json!("a.obj"));
        assert_eq!(schema.coerce("scale", "0.5").unwrap(), json!(0.5));
        assert_eq!(schema.coerce("iterations", " 4 ").unwrap(), json!(4));
        assert_eq!(schema.coerce("removeNoise", "yes").unwrap(), json!(true));
    }

    #[test]
    fn test_coerce_failures() {
        let schema = schema();

        let err = schema.coerce("iterations", "four").unwrap_err();
        assert!(matches!(err.violations()[0], Violation::Unparsable { .. }));

        let err = schema.coerce("color", "red").unwrap_err();
        assert!(err.to_string().contains("'color' is not a parameter"));
    }
}
