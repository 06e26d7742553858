//! Field-scoped validation failures.
//!
//! Every rule that fails on a save adds one entry; the save aborts when any
//! entry exists. Entries keep the order in which rules ran.

use std::fmt;

use serde::Serialize;

pub const BLANK: &str = "can't be blank";
pub const NOT_POSITIVE: &str = "must be greater than 0";
pub const NOT_NUMERIC: &str = "is not a number";
pub const NOT_BOOLEAN: &str = "must be true or false";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Returns `true` if at least one rule failed for `field`.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    #[must_use]
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// ## Summary
    /// Converts the collected failures into a result carrying `value` when
    /// nothing failed.
    ///
    /// ## Errors
    /// Returns `self` if any rule failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Requires a string that is present and not only whitespace. The value
    /// is returned as given, untrimmed.
    pub fn require_text<'a>(&mut self, field: &'static str, value: Option<&'a str>) -> Option<&'a str> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                self.add(field, BLANK);
                None
            }
        }
    }

    pub fn require_flag(&mut self, field: &'static str, value: Option<bool>) -> Option<bool> {
        if value.is_none() {
            self.add(field, NOT_BOOLEAN);
        }
        value
    }

    /// Requires a foreign key to be present and greater than zero.
    pub fn require_id(&mut self, field: &'static str, value: Option<i32>) -> Option<i32> {
        match value {
            Some(id) if id > 0 => Some(id),
            Some(_) => {
                self.add(field, NOT_POSITIVE);
                None
            }
            None => {
                self.add(field, BLANK);
                None
            }
        }
    }

    /// Accepts an absent number, rejects NaN and infinities.
    pub fn optional_number(&mut self, field: &'static str, value: Option<f64>) {
        if value.is_some_and(|v| !v.is_finite()) {
            self.add(field, NOT_NUMERIC);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
