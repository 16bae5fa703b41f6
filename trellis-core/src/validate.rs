//! Rule-string validation.
//!
//! Rules are written as compact strings like `"required|string|min:3"` and
//! checked against `serde_json` data. Supported rules:
//! - `required` - field must be present, non-null, and non-empty
//! - `string`, `integer`, `boolean` - type checks
//! - `min:N` / `max:N` - string length or integer value bounds
//!
//! Fields that are absent pass every rule except `required`.

use serde_json::{Map, Value};

use crate::error::{TrellisResult, ValidationError};

/// A single parsed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    String,
    Integer,
    Boolean,
    Min(i64),
    Max(i64),
}

impl Rule {
    /// Parse a `|`-separated rule string into rules.
    pub fn parse_all(rules: &str) -> Result<Vec<Self>, ValidationError> {
        rules
            .split('|')
            .filter(|token| !token.is_empty())
            .map(Self::parse)
            .collect()
    }

    fn parse(token: &str) -> Result<Self, ValidationError> {
        let (name, argument) = match token.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (token, None),
        };

        let bound = |argument: Option<&str>| {
            argument
                .and_then(|raw| raw.parse::<i64>().ok())
                .ok_or_else(|| ValidationError::UnknownRule {
                    rule: token.to_string(),
                })
        };

        match name {
            "required" => Ok(Self::Required),
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "min" => Ok(Self::Min(bound(argument)?)),
            "max" => Ok(Self::Max(bound(argument)?)),
            _ => Err(ValidationError::UnknownRule {
                rule: token.to_string(),
            }),
        }
    }

    fn check(&self, field: &str, value: Option<&Value>) -> Result<(), ValidationError> {
        let Some(value) = value else {
            return match self {
                Self::Required => Err(ValidationError::RequiredFieldMissing {
                    field: field.to_string(),
                }),
                _ => Ok(()),
            };
        };

        match self {
            Self::Required => {
                let empty = value.is_null() || value.as_str().is_some_and(str::is_empty);
                if empty {
                    return Err(ValidationError::RequiredFieldMissing {
                        field: field.to_string(),
                    });
                }
                Ok(())
            }
            Self::String => expect_type(field, value.is_string(), "string"),
            Self::Integer => expect_type(field, value.as_i64().is_some(), "integer"),
            Self::Boolean => expect_type(field, value.is_boolean(), "boolean"),
            Self::Min(min) => {
                if measure(value).is_some_and(|size| size < *min) {
                    return Err(ValidationError::TooShort {
                        field: field.to_string(),
                        min: *min,
                    });
                }
                Ok(())
            }
            Self::Max(max) => {
                if measure(value).is_some_and(|size| size > *max) {
                    return Err(ValidationError::TooLong {
                        field: field.to_string(),
                        max: *max,
                    });
                }
                Ok(())
            }
        }
    }
}

fn expect_type(field: &str, ok: bool, expected: &str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidType {
            field: field.to_string(),
            expected: expected.to_string(),
        })
    }
}

/// The size a `min`/`max` rule measures: character count for strings, the
/// value itself for integers, element count for arrays.
fn measure(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => Some(s.chars().count() as i64),
        Value::Number(n) => n.as_i64(),
        Value::Array(items) => Some(items.len() as i64),
        _ => None,
    }
}

/// A validator instance binding data to parsed field rules.
#[derive(Debug, Clone)]
pub struct Validator {
    data: Map<String, Value>,
    rules: Vec<(String, Vec<Rule>)>,
}

impl Validator {
    /// Create a validator from a data map and `(field, rule string)` pairs.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownRule` when a rule string fails to
    /// parse.
    pub fn new(
        data: Map<String, Value>,
        rules: &[(&str, &str)],
    ) -> Result<Self, ValidationError> {
        let rules = rules
            .iter()
            .map(|(field, spec)| Ok((field.to_string(), Rule::parse_all(spec)?)))
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Self { data, rules })
    }

    /// Create a validator for a single bare value, bound to the field `value`.
    pub fn for_value(value: Value, rules: &str) -> Result<Self, ValidationError> {
        let mut data = Map::new();
        data.insert("value".to_string(), value);
        Self::new(data, &[("value", rules)])
    }

    /// All rule violations in the bound data.
    pub fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (field, rules) in &self.rules {
            for rule in rules {
                if let Err(err) = rule.check(field, self.data.get(field)) {
                    errors.push(err);
                }
            }
        }
        errors
    }

    /// Whether the bound data satisfies every rule.
    pub fn passes(&self) -> bool {
        self.errors().is_empty()
    }

    /// Consume the validator, returning the data if it validates.
    ///
    /// # Errors
    /// Returns the first rule violation.
    pub fn validate(self) -> Result<Map<String, Value>, ValidationError> {
        match self.errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}

/// Validate `data` against `(field, rule string)` pairs, returning the data.
pub fn validate(
    data: Map<String, Value>,
    rules: &[(&str, &str)],
) -> TrellisResult<Map<String, Value>> {
    Ok(Validator::new(data, rules)?.validate()?)
}

/// Whether `data` satisfies the given rules.
pub fn validated(data: &Map<String, Value>, rules: &[(&str, &str)]) -> bool {
    Validator::new(data.clone(), rules).is_ok_and(|validator| validator.passes())
}

// =============================================================================
// TESTS
// =============================================================================
