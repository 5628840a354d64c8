//! # Selector Module
//!
//! The filter panel shown next to a monitor's data grid, and everything it
//! needs to turn user choices into query parameters.
//!
//! ## Field Kinds
//!
//! | Kind | Input | Parameter |
//! |------|-------|-----------|
//! | Multi-select | values picked from the options endpoint | JSON array, omitted when empty |
//! | Text range | `1-5,9` style ID lists | JSON array of expanded IDs |
//! | Time span | named span or custom from/to pickers | `startDate`, `startTime`, `endDate`, `endTime` |
//!
//! ## Collaborators
//!
//! - [`OptionsSource`] fills the multi-select lists
//! - [`GridLoader`] receives submitted parameters
//! - [`PanelState`] is what gets persisted between sessions

pub mod config;
pub mod error;
pub mod field;
pub mod options;
pub mod panel;
pub mod query;
pub mod range;
pub mod state;
pub mod time_span;

pub use config::{OwnerDefault, SelectorConfig, SelectorField, TextFieldSpec};
pub use error::SelectorError;
pub use field::{FilterField, MultiSelect, SelectOption, TextRange};
pub use options::{HttpOptionsSource, OptionsResponse, OptionsSource};
pub use panel::{
    FieldEntry, FilterPanel, GridLoader, Notification, OptionsOutcome, OptionsTicket,
    StateOutcome, NETWORK_FAILURE_MESSAGE,
};
pub use query::QueryParameters;
pub use range::parse_id_ranges;
pub use state::{PanelState, SelectorState};
pub use time_span::{TimeSpan, TimeSpanMode, TIME_SPAN_FIELD};
