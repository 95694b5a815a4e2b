//! Attribute validators inherited from OpenAPI constraints

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A compiled `pattern` constraint, compared and serialized by its source text
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.0.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single constraint on an attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// String must not be empty
    NonEmpty,
    /// Value must be one of the listed literals
    OneOf { values: Vec<Value> },
    /// String must match the regex
    Regex { pattern: Pattern },
    /// Integer bounds (inclusive)
    IntBetween { min: Option<i64>, max: Option<i64> },
    /// Number bounds (inclusive)
    NumberBetween { min: Option<f64>, max: Option<f64> },
    /// String length bounds in characters
    LengthBetween { min: Option<u64>, max: Option<u64> },
    /// List / map size bounds
    ItemCount { min: Option<u64>, max: Option<u64> },
}

impl Validator {
    /// Check a non-null value, returning a message describing the failure
    pub fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::NonEmpty => match value.as_str() {
                Some("") => Some("must not be empty".to_string()),
                _ => None,
            },
            Self::OneOf { values } => {
                if values.contains(value) {
                    None
                } else {
                    let allowed: Vec<String> = values.iter().map(Value::to_string).collect();
                    Some(format!(
                        "value {} is not one of [{}]",
                        value,
                        allowed.join(", ")
                    ))
                }
            }
            Self::Regex { pattern } => {
                let s = value.as_str()?;
                if pattern.is_match(s) {
                    None
                } else {
                    Some(format!("value {:?} does not match pattern {}", s, pattern))
                }
            }
            Self::IntBetween { min, max } => {
                let n = value.as_i64()?;
                out_of_bounds(n, *min, *max)
            }
            Self::NumberBetween { min, max } => {
                let n = value.as_f64()?;
                out_of_bounds(n, *min, *max)
            }
            Self::LengthBetween { min, max } => {
                let len = value.as_str()?.chars().count() as u64;
                out_of_bounds(len, *min, *max).map(|m| format!("length {}", m))
            }
            Self::ItemCount { min, max } => {
                let len = match value {
                    Value::Array(items) => items.len() as u64,
                    Value::Object(map) => map.len() as u64,
                    _ => return None,
                };
                out_of_bounds(len, *min, *max).map(|m| format!("item count {}", m))
            }
        }
    }

    /// Short human-readable form used in schema listings
    pub fn describe(&self) -> String {
        match self {
            Self::NonEmpty => "non-empty".to_string(),
            Self::OneOf { values } => {
                let allowed: Vec<String> = values.iter().map(Value::to_string).collect();
                format!("one of [{}]", allowed.join(", "))
            }
            Self::Regex { pattern } => format!("matches {}", pattern),
            Self::IntBetween { min, max } => format!("in {}", range(min, max)),
            Self::NumberBetween { min, max } => format!("in {}", range(min, max)),
            Self::LengthBetween { min, max } => format!("length in {}", range(min, max)),
            Self::ItemCount { min, max } => format!("items in {}", range(min, max)),
        }
    }
}

fn out_of_bounds<T: PartialOrd + std::fmt::Display>(
    n: T,
    min: Option<T>,
    max: Option<T>,
) -> Option<String> {
    if let Some(min) = min
        && n < min
    {
        return Some(format!("{} is less than minimum {}", n, min));
    }
    if let Some(max) = max
        && n > max
    {
        return Some(format!("{} is greater than maximum {}", n, max));
    }
    None
}

fn range<T: std::fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    let lo = min.as_ref().map(T::to_string).unwrap_or_default();
    let hi = max.as_ref().map(T::to_string).unwrap_or_default();
    format!("[{}..{}]", lo, hi)
}
