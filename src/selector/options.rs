//! # Selection Options Endpoint
//!
//! The options endpoint answers a plain GET with one list per backend field:
//!
//! ```json
//! {
//!   "status": [["Done"], ["Failed"], ["Waiting"]],
//!   "owner":  [["alice", "Alice A."], ["bob"]]
//! }
//! ```
//!
//! Each entry is `[value]` or `[value, label]`. Values may be strings or
//! numbers; numbers are kept as their decimal text.

use super::error::SelectorError;
use super::field::SelectOption;
use crate::session::Session;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Parsed options response keyed by backend field name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionsResponse {
    pub fields: HashMap<String, Vec<SelectOption>>,
}

impl OptionsResponse {
    /// Decode the raw JSON body of the options endpoint.
    pub fn from_json(body: &Value) -> Result<Self, SelectorError> {
        let object = body
            .as_object()
            .ok_or_else(|| SelectorError::Network("options response is not an object".into()))?;

        let mut fields = HashMap::new();
        for (key, entries) in object {
            // The endpoint sometimes carries bookkeeping keys ("success", ...)
            let Some(entries) = entries.as_array() else {
                debug!(key = %key, "skipping non-list entry in options response");
                continue;
            };
            let options = entries.iter().filter_map(decode_option).collect();
            fields.insert(key.clone(), options);
        }

        Ok(Self { fields })
    }

    pub fn options_for(&self, backend_key: &str) -> Option<&[SelectOption]> {
        self.fields.get(backend_key).map(Vec::as_slice)
    }
}

fn decode_option(entry: &Value) -> Option<SelectOption> {
    match entry {
        Value::Array(items) => {
            let value = scalar_text(items.first()?)?;
            let label = items
                .get(1)
                .and_then(scalar_text)
                .unwrap_or_else(|| value.clone());
            Some(SelectOption { value, label })
        }
        // Bare scalars are accepted as `[value]`
        other => scalar_text(other).map(|value| SelectOption {
            label: value.clone(),
            value,
        }),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Anything able to produce the option lists for a panel.
#[async_trait]
pub trait OptionsSource: Send + Sync {
    async fn fetch_options(&self) -> Result<OptionsResponse, SelectorError>;
}

/// Options source backed by the remote HTTP endpoint.
#[derive(Clone)]
pub struct HttpOptionsSource {
    http: reqwest::Client,
    url: Url,
}

impl HttpOptionsSource {
    pub fn new(session: &Session, options_url: &str, timeout: Duration) -> Result<Self, SelectorError> {
        let url = session
            .endpoint(options_url)
            .map_err(|err| SelectorError::configuration(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SelectorError::configuration(format!("http client: {err}")))?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl OptionsSource for HttpOptionsSource {
    async fn fetch_options(&self) -> Result<OptionsResponse, SelectorError> {
        info!(url = %self.url, "loading selector options");

        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| SelectorError::Network(err.to_string()))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "options endpoint returned an error status");
            return Err(SelectorError::Network(format!(
                "options endpoint returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| SelectorError::Network(format!("failed to decode options: {err}")))?;

        OptionsResponse::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_value_and_label_pairs() {
        let body = json!({
            "owner": [["alice", "Alice A."], ["bob"]],
        });
        let response = OptionsResponse::from_json(&body).expect("decode");
        let owners = response.options_for("owner").expect("owner options");
        assert_eq!(owners[0], SelectOption::new("alice", "Alice A."));
        assert_eq!(owners[1], SelectOption::new("bob", "bob"));
    }

    #[test]
    fn test_numeric_values_become_text() {
        let body = json!({ "jobGroup": [[42], [7, "seven"]] });
        let response = OptionsResponse::from_json(&body).expect("decode");
        let groups = response.options_for("jobGroup").expect("groups");
        assert_eq!(groups[0].value, "42");
        assert_eq!(groups[1].label, "seven");
    }

    #[test]
    fn test_order_is_preserved() {
        let body = json!({ "status": [["Waiting"], ["Done"], ["Failed"]] });
        let response = OptionsResponse::from_json(&body).expect("decode");
        let values: Vec<&str> = response
            .options_for("status")
            .expect("status")
            .iter()
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(values, vec!["Waiting", "Done", "Failed"]);
    }

    #[test]
    fn test_non_list_keys_and_null_entries_are_skipped() {
        let body = json!({ "success": "true", "status": [[null], ["Done"]] });
        let response = OptionsResponse::from_json(&body).expect("decode");
        assert!(response.options_for("success").is_none());
        assert_eq!(response.options_for("status").expect("status").len(), 1);
    }

    #[test]
    fn test_non_object_body_is_an_error() {
        let body = json!([1, 2, 3]);
        assert!(matches!(
            OptionsResponse::from_json(&body),
            Err(SelectorError::Network(_))
        ));
    }
}
