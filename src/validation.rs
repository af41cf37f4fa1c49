//! Validation System - Required Flags
//!
//! Every option is required. The only rule is that its value is non-empty;
//! all offending flags are reported together.

use thiserror::Error;

use crate::schema::ConfigSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing flags: {}", .missing.join(", "))]
pub struct ValidationError {
    missing: Vec<String>,
}

impl ValidationError {
    pub fn new(missing: Vec<String>) -> Self {
        Self { missing }
    }

    /// Hyphen-prefixed flag names, in definition order
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

/// Collect `-name` for every option holding an empty value
pub fn missing_flags(schema: &ConfigSchema) -> Vec<String> {
    let mut missing = vec![];
    schema.visit_all(|name, value| {
        if value.is_empty() {
            missing.push(format!("-{}", name));
        }
    });
    missing
}

/// Check that no option is empty
pub fn validate_schema(schema: &ConfigSchema) -> Result<(), ValidationError> {
    let missing = missing_flags(schema);
    if missing.is_empty() {
        tracing::debug!(schema = schema.name(), "all flags present");
        Ok(())
    } else {
        tracing::debug!(schema = schema.name(), ?missing, "validation failed");
        Err(ValidationError::new(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_present_is_valid() {
        let mut schema = ConfigSchema::new("test");
        schema.define("a", "1", "");
        schema.define("b", "2", "");
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn test_missing_reported_together_in_order() {
        let mut schema = ConfigSchema::new("test");
        schema.define("c", "", "");
        schema.define("a", "1", "");
        schema.define("b", "", "");

        let err = validate_schema(&schema).unwrap_err();
        assert_eq!(err.missing(), ["-c", "-b"]);
        assert_eq!(err.to_string(), "missing flags: -c, -b");
    }

    #[test]
    fn test_empty_schema_is_valid() {
        assert!(missing_flags(&ConfigSchema::new("empty")).is_empty());
    }
}
