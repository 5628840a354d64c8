//! # Monitor Definitions
//!
//! A monitor pairs a filter panel layout with the grid it feeds. The
//! built-in Request Monitor is available without any file; other monitors
//! can be described in JSON:
//!
//! ```json
//! {
//!   "name": "RequestMonitor",
//!   "title": "Request Monitor",
//!   "data_url": "RequestMonitor/getRequestMonitorData",
//!   "selector": { "options_url": "RequestMonitor/getSelectionData", ... },
//!   "columns": [ { "header": "RequestId", "data_index": "RequestID" } ]
//! }
//! ```

use crate::grid::{ColumnKind, ColumnSpec};
use crate::selector::{OwnerDefault, SelectorConfig, SelectorField, TextFieldSpec};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorDefinition {
    /// Identifier, also used as the profile key.
    pub name: String,
    pub title: String,
    pub data_url: String,
    pub selector: SelectorConfig,
    pub columns: Vec<ColumnSpec>,
}

impl MonitorDefinition {
    /// The request monitor shipped with the console.
    pub fn request_monitor() -> Self {
        let selector = SelectorConfig {
            selectors: vec![
                SelectorField::new("requestType", "Request Type", "requestType"),
                SelectorField::new("status", "Status", "status"),
                SelectorField::new("operation", "Operation", "operation"),
                SelectorField::new("owner", "Owner", "owner"),
                SelectorField::new("ownerGroup", "Owner Group", "ownerGroup"),
            ],
            text_fields: vec![
                TextFieldSpec::new("id", "JobId(s)"),
                TextFieldSpec::new("reqId", "RequestId(s)"),
            ],
            has_time_span: true,
            options_url: Some("RequestMonitor/getSelectionData".to_string()),
            owner_defaults: vec![OwnerDefault {
                required_property: "NormalUser".to_string(),
                excluded_property: "JobAdministrator".to_string(),
                field: "owner".to_string(),
            }],
        };

        let columns = vec![
            ColumnSpec::new("RequestId", "RequestID")
                .kind(ColumnKind::Integer)
                .width(10),
            ColumnSpec::new("JobID", "JobID").kind(ColumnKind::Integer).width(10),
            ColumnSpec::new("Status", "Status").width(10),
            ColumnSpec::new("OwnerDN", "OwnerDN").width(24),
            ColumnSpec::new("RequestType", "RequestType"),
            ColumnSpec::new("Operation", "Operation"),
            ColumnSpec::new("OwnerGroup", "OwnerGroup"),
            ColumnSpec::new("RequestName", "RequestName").hidden(),
            ColumnSpec::new("Error", "Error").width(24),
            ColumnSpec::new("CreationTime [UTC]", "CreationTime")
                .kind(ColumnKind::DateTime)
                .width(16)
                .hidden(),
            ColumnSpec::new("LastUpdateTime [UTC]", "LastUpdateTime")
                .kind(ColumnKind::DateTime)
                .width(16)
                .hidden(),
        ];

        Self {
            name: "RequestMonitor".to_string(),
            title: "Request Monitor".to_string(),
            data_url: "RequestMonitor/getRequestMonitorData".to_string(),
            selector,
            columns,
        }
    }

    /// Load a monitor definition from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read monitor file: {}", path.display()))?;
        let definition: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse monitor file: {}", path.display()))?;
        definition
            .selector
            .validate()
            .with_context(|| format!("Invalid selector in monitor file: {}", path.display()))?;
        Ok(definition)
    }
}
