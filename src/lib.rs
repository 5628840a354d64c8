//! # Dirac Monitor
//!
//! A terminal console for browsing DIRAC monitors: a filter panel on the
//! left builds query parameters, a paged grid on the right shows the rows
//! the data endpoint returns for them.
//!
//! ## Modules
//!
//! - [`selector`] - the filter panel and its query building
//! - [`grid`] - paged result table and its HTTP client
//! - [`monitor`] - monitor definitions (panel layout plus columns)
//! - [`profile`] - saved panel and column state between sessions
//! - [`session`] - who is logged in and where the server lives
//! - [`ui`] - terminal front end
//! - [`logging`] - rolling log file setup

pub mod grid;
pub mod logging;
pub mod monitor;
pub mod profile;
pub mod selector;
pub mod session;
pub mod ui;
