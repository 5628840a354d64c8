//! # Query Parameters
//!
//! Turns a panel snapshot into the flat parameter map consumed by the data
//! endpoint. The derivation is pure: the same fields, page size and clock
//! always give the same map.
//!
//! | Parameter | Value |
//! |-----------|-------|
//! | `limit` | page size |
//! | `startDate`, `endDate` | `YYYY-MM-DD` or empty |
//! | `startTime`, `endTime` | `HH:MM` or empty |
//! | `<selector>` | JSON array of values, omitted when nothing is selected |
//! | `<text field>` | JSON array of expanded IDs, `[]` when blank |

use super::error::SelectorError;
use super::field::FilterField;
use super::time_span::TimeSpan;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

pub type QueryParameters = BTreeMap<String, String>;

/// A named field as seen by the query builder.
pub struct FieldRef<'a> {
    pub name: &'a str,
    pub field: &'a FilterField,
}

/// Build the parameter map.
///
/// Text fields are parsed here, so any malformed range surfaces as a
/// validation error naming the field. Until options have loaded once the
/// multi-select lists carry no trustworthy values and are left out.
pub fn build_query<'a>(
    fields: impl IntoIterator<Item = FieldRef<'a>>,
    page_size: u32,
    has_options: bool,
    now: NaiveDateTime,
) -> Result<QueryParameters, SelectorError> {
    let mut params = QueryParameters::new();
    params.insert("limit".to_string(), page_size.to_string());

    let mut span = TimeSpan::default();

    for FieldRef { name, field } in fields {
        match field {
            FilterField::MultiSelect(select) => {
                if !has_options {
                    continue;
                }
                let values = select.effective_values();
                if !values.is_empty() {
                    params.insert(name.to_string(), encode(&values));
                }
            }
            FilterField::TextRange(text) => {
                let ids = super::range::parse_id_ranges(&text.raw)
                    .map_err(|err| SelectorError::validation(name, err.to_string()))?;
                params.insert(name.to_string(), encode(&ids));
            }
            FilterField::TimeSpan(time_span) => span = time_span.clone(),
        }
    }

    let resolved = span.resolve(now)?;
    params.insert("startDate".to_string(), resolved.start_date_text());
    params.insert("startTime".to_string(), resolved.start_time_text());
    params.insert("endDate".to_string(), resolved.end_date_text());
    params.insert("endTime".to_string(), resolved.end_time_text());

    Ok(params)
}

fn encode<T: serde::Serialize>(values: &[T]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}
