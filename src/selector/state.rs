//! # Persisted Panel State
//!
//! The serialised form of a filter panel, kept compatible with the layout
//! the web console stores in user profiles:
//!
//! ```json
//! {
//!   "selectors": {
//!     "status": { "hidden": false, "data_selected": ["Failed"], "not_selected": false }
//!   },
//!   "reqId": "100-120",
//!   "cmbTimeSpan": 3,
//!   "calenFrom": "", "cmbTimeFrom": "",
//!   "calenTo": "", "cmbTimeTo": "",
//!   "timeSearchPanelHidden": false
//! }
//! ```
//!
//! Text field values sit at the top level under their field name.

use super::time_span::TimeSpanMode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectorState {
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, deserialize_with = "string_list")]
    pub data_selected: Vec<String>,
    #[serde(default)]
    pub not_selected: bool,
}

/// Top-level keys owned by [`PanelState`] itself. A text field with one of
/// these names would collide with them in the flattened map.
pub const RESERVED_STATE_KEYS: [&str; 7] = [
    "selectors",
    "cmbTimeSpan",
    "calenFrom",
    "cmbTimeFrom",
    "calenTo",
    "cmbTimeTo",
    "timeSearchPanelHidden",
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelState {
    /// Absent when the profile was saved without selector information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<BTreeMap<String, SelectorState>>,

    #[serde(rename = "cmbTimeSpan", default)]
    pub time_span: Option<TimeSpanMode>,
    #[serde(rename = "calenFrom", default, deserialize_with = "nullable_text")]
    pub from_date: String,
    #[serde(rename = "cmbTimeFrom", default, deserialize_with = "nullable_text")]
    pub from_time: String,
    #[serde(rename = "calenTo", default, deserialize_with = "nullable_text")]
    pub to_date: String,
    #[serde(rename = "cmbTimeTo", default, deserialize_with = "nullable_text")]
    pub to_time: String,
    #[serde(rename = "timeSearchPanelHidden", default)]
    pub time_span_hidden: bool,

    /// Text field values plus anything else found at the top level.
    #[serde(flatten)]
    pub text_fields: BTreeMap<String, Value>,
}

impl PanelState {
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.text_fields.get(name).and_then(Value::as_str)
    }

    pub fn set_text_value(&mut self, name: &str, value: &str) {
        self.text_fields
            .insert(name.to_string(), Value::String(value.to_string()));
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Accept `null`, strings and numbers in a list of selected values.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
