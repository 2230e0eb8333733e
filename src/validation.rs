//! Request payload shape validation.
//!
//! Bodies arrive as raw bytes (authentication runs before any parsing) and are
//! checked field by field. All problems are collected and reported together in
//! the flattened `{ formErrors, fieldErrors }` shape the portal clients expect.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(name, message);
        errors
    }

    pub fn add(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(name.into())
            .or_default()
            .push(message.into());
    }
}

/// A JSON object body being validated
pub struct Payload {
    object: Map<String, Value>,
    errors: ValidationErrors,
}

impl Payload {
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| ApiError::validation_error(ValidationErrors::form("Invalid JSON body")))?;

        match value {
            Value::Object(object) => Ok(Self {
                object,
                errors: ValidationErrors::default(),
            }),
            other => Err(ApiError::validation_error(ValidationErrors::form(format!(
                "Expected object, received {}",
                type_name(&other)
            )))),
        }
    }

    /// Required string of at least `min_len` UTF-16 code units
    pub fn string(&mut self, names: &[&str], min_len: usize) -> Option<String> {
        let (key, value) = lookup(&self.object, names);
        match value {
            None => {
                self.errors.add(key, "Required");
                None
            }
            Some(Value::String(s)) => {
                if s.encode_utf16().count() < min_len {
                    self.errors.add(
                        key,
                        format!("String must contain at least {} character(s)", min_len),
                    );
                    return None;
                }
                Some(s.clone())
            }
            Some(other) => {
                self.errors
                    .add(key, format!("Expected string, received {}", type_name(other)));
                None
            }
        }
    }

    /// Optional string; absent and `null` both read as `None`
    pub fn optional_string(&mut self, names: &[&str]) -> Option<String> {
        let (key, value) = lookup(&self.object, names);
        match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.errors
                    .add(key, format!("Expected string, received {}", type_name(other)));
                None
            }
        }
    }

    pub fn uuid(&mut self, names: &[&str]) -> Option<Uuid> {
        let key = lookup(&self.object, names).0;
        let raw = self.string(names, 0)?;
        match Uuid::parse_str(&raw) {
            // Reject the braced/urn/simple forms Uuid also accepts
            Ok(id) if raw.len() == 36 => Some(id),
            _ => {
                self.errors.add(key, "Invalid uuid");
                None
            }
        }
    }

    pub fn positive_int(&mut self, names: &[&str]) -> Option<i64> {
        let (key, value) = lookup(&self.object, names);
        let number = match value {
            None => {
                self.errors.add(key, "Required");
                return None;
            }
            Some(Value::Number(n)) => n.clone(),
            Some(other) => {
                self.errors
                    .add(key, format!("Expected number, received {}", type_name(other)));
                return None;
            }
        };

        let int = match number.as_i64() {
            Some(i) => i,
            // Floats with no fractional part still count as integers
            None => match number.as_f64() {
                Some(f) if f.fract() != 0.0 => {
                    self.errors.add(key, "Expected integer, received float");
                    return None;
                }
                Some(f) if f <= 0.0 => 0,
                Some(f) if f < i64::MAX as f64 => f as i64,
                _ => {
                    self.errors.add(
                        key,
                        format!("Number must be less than or equal to {}", i64::MAX),
                    );
                    return None;
                }
            },
        };

        if int <= 0 {
            self.errors.add(key, "Number must be greater than 0");
            return None;
        }
        Some(int)
    }

    /// Fail with every collected error, or build the typed input
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ApiError> {
        if !self.errors.is_empty() {
            return Err(ApiError::validation_error(self.errors));
        }
        build().ok_or_else(|| ApiError::bad_request("invalid payload"))
    }
}

/// First present key among `names` (canonical name first, then aliases)
fn lookup<'a, 'v>(object: &'v Map<String, Value>, names: &[&'a str]) -> (&'a str, Option<&'v Value>) {
    for name in names {
        if let Some(value) = object.get(*name) {
            return (name, Some(value));
        }
    }
    (names[0], None)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
