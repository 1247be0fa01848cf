use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Field-level validation failures keyed by the camelCase input name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_result(self) -> Result<(), ProjectionError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ProjectionError::InvalidInput(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (field, message)) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("invalid input: {0}")]
    InvalidInput(ValidationErrors),

    #[error("not computable: {context}")]
    ArithmeticDegenerate { context: String },
}

impl ProjectionError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        ProjectionError::InvalidInput(errors)
    }

    pub fn degenerate(context: impl Into<String>) -> Self {
        ProjectionError::ArithmeticDegenerate {
            context: context.into(),
        }
    }

    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ProjectionError::InvalidInput(errors) => Some(errors),
            ProjectionError::ArithmeticDegenerate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("coastAge", "must be > currentAge");
        errors.add("coastAge", "must be < fireAge");
        errors.add("projectionYears", "must be >= 1");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("coastAge"), Some("must be > currentAge"));
    }

    #[test]
    fn validation_errors_display_is_sorted_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("projectionYears", "must be >= 1");
        errors.add("coastAge", "must be < fireAge");

        assert_eq!(
            errors.to_string(),
            "coastAge: must be < fireAge; projectionYears: must be >= 1"
        );
    }

    #[test]
    fn empty_validation_errors_convert_to_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let err = ProjectionError::invalid("startMonth", "must be between 1 and 12");
        assert!(err.field_errors().is_some_and(|f| f.contains("startMonth")));
        assert!(err.to_string().starts_with("invalid input: startMonth"));
    }
}
