//! # Selector Configuration
//!
//! A strongly typed description of what a filter panel contains. Each
//! multi-select carries its display label and the name the options endpoint
//! uses for it, so the two never drift apart the way parallel maps do.
//!
//! ```json
//! {
//!   "selectors": [
//!     { "name": "status", "label": "Status", "backend_key": "status" }
//!   ],
//!   "text_fields": [ { "name": "reqId", "label": "RequestId(s)" } ],
//!   "has_time_span": true,
//!   "options_url": "RequestMonitor/getSelectionData"
//! }
//! ```

use super::error::SelectorError;
use super::state::RESERVED_STATE_KEYS;
use super::time_span::TIME_SPAN_FIELD;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One multi-select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorField {
    /// Parameter name sent to the data endpoint and key in saved state.
    pub name: String,
    /// Label shown above the list.
    pub label: String,
    /// Key of this field in the options endpoint response.
    #[serde(default)]
    pub backend_key: Option<String>,
}

impl SelectorField {
    pub fn new(name: &str, label: &str, backend_key: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            backend_key: Some(backend_key.to_string()),
        }
    }
}

/// One free-text ID/range field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFieldSpec {
    pub name: String,
    pub label: String,
}

impl TextFieldSpec {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
        }
    }
}

/// Preselect the session user in `field` for users holding
/// `required_property` but not `excluded_property`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerDefault {
    pub required_property: String,
    pub excluded_property: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default)]
    pub selectors: Vec<SelectorField>,
    #[serde(default)]
    pub text_fields: Vec<TextFieldSpec>,
    #[serde(default = "default_has_time_span")]
    pub has_time_span: bool,
    /// Path of the options endpoint, relative to the session base URL.
    #[serde(default)]
    pub options_url: Option<String>,
    #[serde(default)]
    pub owner_defaults: Vec<OwnerDefault>,
}

fn default_has_time_span() -> bool {
    true
}

impl SelectorConfig {
    /// Reject configurations the panel cannot work with.
    ///
    /// Every multi-select needs a backend key to be matched against the
    /// options response, and the options URL is required to fill them.
    pub fn validate(&self) -> Result<(), SelectorError> {
        match self.options_url.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(SelectorError::configuration(
                    "an options URL is required to fill the selectors",
                ))
            }
            Some(_) => {}
        }

        let mut seen = HashSet::new();
        for selector in &self.selectors {
            if selector.name.trim().is_empty() {
                return Err(SelectorError::configuration("selector with an empty name"));
            }
            match selector.backend_key.as_deref().map(str::trim) {
                None | Some("") => {
                    return Err(SelectorError::configuration(format!(
                        "selector '{}' has no backend field name",
                        selector.name
                    )))
                }
                Some(_) => {}
            }
            if !seen.insert(selector.name.as_str()) {
                return Err(SelectorError::configuration(format!(
                    "duplicate field name '{}'",
                    selector.name
                )));
            }
        }

        for field in &self.text_fields {
            if field.name.trim().is_empty() {
                return Err(SelectorError::configuration("text field with an empty name"));
            }
            if RESERVED_STATE_KEYS.contains(&field.name.as_str()) || field.name == TIME_SPAN_FIELD {
                return Err(SelectorError::configuration(format!(
                    "text field name '{}' is reserved",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SelectorError::configuration(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        for owner in &self.owner_defaults {
            if !self.selectors.iter().any(|s| s.name == owner.field) {
                return Err(SelectorError::configuration(format!(
                    "owner default refers to unknown selector '{}'",
                    owner.field
                )));
            }
        }

        Ok(())
    }

    pub fn options_url(&self) -> &str {
        self.options_url.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SelectorConfig {
        SelectorConfig {
            selectors: vec![SelectorField::new("status", "Status", "status")],
            text_fields: vec![TextFieldSpec::new("reqId", "RequestId(s)")],
            has_time_span: true,
            options_url: Some("RequestMonitor/getSelectionData".to_string()),
            owner_defaults: Vec::new(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_options_url() {
        let mut config = valid_config();
        config.options_url = None;
        assert!(matches!(
            config.validate(),
            Err(SelectorError::Configuration(_))
        ));

        config.options_url = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_backend_key() {
        let mut config = valid_config();
        config.selectors[0].backend_key = None;
        let err = config.validate().expect_err("missing key must fail");
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_duplicate_names_across_kinds() {
        let mut config = valid_config();
        config.text_fields.push(TextFieldSpec::new("status", "Dup"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_text_field_cannot_shadow_saved_state_keys() {
        for name in ["cmbTimeSpan", "selectors", "timeSearchPanelHidden", "timeSpan"] {
            let mut config = valid_config();
            config.text_fields.push(TextFieldSpec::new(name, "Clash"));
            let err = config.validate().expect_err("reserved name must fail");
            assert!(matches!(err, SelectorError::Configuration(_)));
            assert!(err.to_string().contains(name));
        }
    }

    #[test]
    fn test_owner_default_must_name_selector() {
        let mut config = valid_config();
        config.owner_defaults.push(OwnerDefault {
            required_property: "NormalUser".to_string(),
            excluded_property: "JobAdministrator".to_string(),
            field: "owner".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"options_url": "X/getSelectionData"}"#;
        let config: SelectorConfig = serde_json::from_str(json).expect("deserialize");
        assert!(config.has_time_span);
        assert!(config.selectors.is_empty());
        assert!(config.validate().is_ok());
    }
}
