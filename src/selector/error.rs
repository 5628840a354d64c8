use thiserror::Error;

/// Everything that can go wrong inside the filter panel.
///
/// None of these are fatal to the application: configuration errors stop a
/// single panel from being built, validation errors block one submission and
/// network errors are reported and left for the user to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("invalid selector configuration: {0}")]
    Configuration(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("network error: {0}")]
    Network(String),
}

impl SelectorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_field() {
        let err = SelectorError::validation("reqId", "not a number: abc");
        assert_eq!(err.to_string(), "reqId: not a number: abc");
        assert_eq!(err.field(), Some("reqId"));
    }

    #[test]
    fn test_network_error_has_no_field() {
        let err = SelectorError::Network("connection refused".to_string());
        assert!(err.field().is_none());
        assert!(err.to_string().contains("connection refused"));
    }
}
