//! # Profile Module
//!
//! Saves and restores what a monitor looked like when it was closed: the
//! filter panel state and which grid columns were visible.
//!
//! ## Data Format
//!
//! ```json
//! {
//!   "leftMenu": {
//!     "selectors": { "status": { "hidden": false, "data_selected": ["Failed"], "not_selected": false } },
//!     "reqId": "",
//!     "cmbTimeSpan": 2,
//!     "timeSearchPanelHidden": false
//!   },
//!   "columns": { "Error": { "hidden": true } }
//! }
//! ```

mod storage;

pub use storage::{FileProfileStore, MemoryProfileStore, ProfileStore};

use crate::grid::ColumnState;
use crate::selector::PanelState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplicationProfile {
    #[serde(rename = "leftMenu")]
    pub left_menu: PanelState,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnState>,
}

impl ApplicationProfile {
    /// Load the profile saved under `key`. Unreadable profiles are logged
    /// and treated as absent.
    pub fn load(store: &dyn ProfileStore, key: &str) -> Option<Self> {
        let value = match store.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "could not read saved profile");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(key, error = %err, "ignoring malformed saved profile");
                None
            }
        }
    }

    pub fn save(&self, store: &mut dyn ProfileStore, key: &str) -> Result<()> {
        let value = serde_json::to_value(self).context("Failed to serialize profile")?;
        store.set(key, value)
    }
}
