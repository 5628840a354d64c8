use super::range::{parse_id_ranges, RangeError};
use super::time_span::TimeSpan;
use std::collections::BTreeSet;

/// A value offered by a multi-select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiSelect {
    pub options: Vec<SelectOption>,
    pub selected: BTreeSet<String>,
    /// When set, the field filters on every option that is *not* selected.
    pub inverted: bool,
}

impl MultiSelect {
    pub fn toggle(&mut self, value: &str) {
        if !self.selected.remove(value) {
            self.selected.insert(value.to_string());
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.contains(value)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.inverted = false;
    }

    /// Values the data endpoint should filter on, in option order for
    /// inverted selections. Empty means "no constraint".
    pub fn effective_values(&self) -> Vec<String> {
        if self.selected.is_empty() {
            return Vec::new();
        }
        if self.inverted {
            self.options
                .iter()
                .filter(|o| !self.selected.contains(&o.value))
                .map(|o| o.value.clone())
                .collect()
        } else {
            self.selected.iter().cloned().collect()
        }
    }

    /// Short human summary for the sidebar.
    pub fn summary(&self) -> String {
        if self.selected.is_empty() {
            return "All".to_string();
        }
        let values: Vec<&str> = self.selected.iter().map(String::as_str).collect();
        let joined = values.join(", ");
        if self.inverted {
            format!("NOT {joined}")
        } else {
            joined
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRange {
    pub raw: String,
    /// Values from the last successful parse.
    pub parsed: Vec<u64>,
}

impl TextRange {
    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    /// Re-parse `raw`, keeping the previous values on failure.
    pub fn parse(&mut self) -> Result<&[u64], RangeError> {
        self.parsed = parse_id_ranges(&self.raw)?;
        Ok(&self.parsed)
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.parsed.clear();
    }
}

/// One user-configurable filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterField {
    MultiSelect(MultiSelect),
    TextRange(TextRange),
    TimeSpan(TimeSpan),
}

impl FilterField {
    pub fn kind(&self) -> &'static str {
        match self {
            FilterField::MultiSelect(_) => "multi-select",
            FilterField::TextRange(_) => "text",
            FilterField::TimeSpan(_) => "time span",
        }
    }

    /// Return the field to its freshly-constructed value. Option lists are
    /// kept since they belong to the endpoint, not the user.
    pub fn clear(&mut self) {
        match self {
            FilterField::MultiSelect(select) => select.clear(),
            FilterField::TextRange(text) => text.clear(),
            FilterField::TimeSpan(span) => *span = TimeSpan::default(),
        }
    }
}
