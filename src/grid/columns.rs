use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp layout used by the data endpoints.
const SERVER_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DISPLAY_DATETIME_FORMAT: &str = "%Y-%m-%-d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Integer,
    DateTime,
}

/// One grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub header: String,
    /// Key of the value in each result row.
    pub data_index: String,
    #[serde(default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "default_width")]
    pub width: u16,
}

fn default_width() -> u16 {
    12
}

impl ColumnSpec {
    pub fn new(header: &str, data_index: &str) -> Self {
        Self {
            header: header.to_string(),
            data_index: data_index.to_string(),
            kind: ColumnKind::Text,
            hidden: false,
            width: default_width(),
        }
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Render this column's cell for `row`.
    pub fn cell(&self, row: &Map<String, Value>) -> String {
        match row.get(&self.data_index) {
            None | Some(Value::Null) => String::new(),
            Some(value) => format_value(value, self.kind),
        }
    }
}

fn format_value(value: &Value, kind: ColumnKind) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match kind {
        ColumnKind::DateTime => NaiveDateTime::parse_from_str(&text, SERVER_DATETIME_FORMAT)
            .map(|dt| dt.format(DISPLAY_DATETIME_FORMAT).to_string())
            .unwrap_or(text),
        ColumnKind::Integer => text
            .trim()
            .parse::<i64>()
            .map(|n| n.to_string())
            .unwrap_or(text),
        ColumnKind::Text => text,
    }
}
