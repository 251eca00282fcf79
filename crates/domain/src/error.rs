//! Common error types used across the workspace.
//!
//! Aggregate operations report expected rule violations as a
//! [`ValidationFailure`] value, never as a panic. Infrastructure layers
//! define their own typed errors and convert into [`GardenError`] at the
//! port boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Field-keyed validation messages, ordered by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Stable error code attached to every [`ValidationFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    /// A garden-level rule was violated (including capacity).
    #[serde(rename = "Garden.ValidationFailed")]
    GardenValidationFailed,
    /// A plant field rule was violated on a plant-targeted mutation.
    #[serde(rename = "Plant.ValidationFailed")]
    PlantValidationFailed,
}

impl ErrorCode {
    /// The wire representation of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GardenValidationFailed => "Garden.ValidationFailed",
            Self::PlantValidationFailed => "Plant.ValidationFailed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure returned by aggregate operations.
///
/// The aggregate state is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ValidationFailure {
    code: ErrorCode,
    message: String,
    errors: FieldErrors,
    #[serde(skip)]
    capacity: bool,
}

impl ValidationFailure {
    /// Build a failure carrying every collected field error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            code,
            message: message.into(),
            errors,
            capacity: false,
        }
    }

    /// Build a failure reporting exactly one field.
    #[must_use]
    pub fn single(
        code: ErrorCode,
        message: impl Into<String>,
        field: &str,
        field_message: &str,
    ) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![field_message.to_string()]);
        Self::new(code, message, errors)
    }

    /// Build a capacity violation: a single field error, flagged so callers
    /// can tell it apart from basic field validation.
    #[must_use]
    pub fn capacity(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.clone()]);
        Self {
            code: ErrorCode::GardenValidationFailed,
            message,
            errors,
            capacity: true,
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Validation messages keyed by the offending field.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Whether this failure reports an exceeded surface-area budget.
    #[must_use]
    pub fn is_capacity_violation(&self) -> bool {
        self.capacity
    }

    /// Whether `field` has at least one message attached.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }
}

/// Accumulates field errors so one failure can report every violated field.
#[derive(Debug, Default)]
pub(crate) struct Violations {
    errors: FieldErrors,
}

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub(crate) fn check(&mut self, valid: bool, field: &str, message: &str) {
        if !valid {
            self.add(field, message);
        }
    }

    /// Record a violation when `value` is missing, passing it through.
    pub(crate) fn require<T>(&mut self, value: Option<T>, field: &str, message: &str) -> Option<T> {
        if value.is_none() {
            self.add(field, message);
        }
        value
    }

    /// Yield `value` when nothing was collected, otherwise a single failure
    /// carrying every recorded field.
    pub(crate) fn conclude<T>(
        self,
        code: ErrorCode,
        message: &str,
        value: Option<T>,
    ) -> Result<T, ValidationFailure> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationFailure::new(code, message, self.errors)),
        }
    }
}

/// A looked-up resource does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A concurrent write moved the version stamp of a resource; retrying the
/// whole request against freshly loaded state is safe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} was modified concurrently (expected version {expected_version})")]
pub struct ConflictError {
    pub entity: &'static str,
    pub id: String,
    pub expected_version: i64,
}

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum GardenError {
    #[error("validation failed")]
    Validation(#[from] ValidationFailure),

    #[error("resource not found")]
    NotFound(#[from] NotFoundError),

    #[error("concurrency conflict")]
    Conflict(#[from] ConflictError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("message transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("operation cancelled")]
    Cancelled,
}

impl GardenError {
    /// Whether the caller may retry the whole request unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
