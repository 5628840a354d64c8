//! # UI Module
//!
//! Terminal front end for a monitor.
//!
//! ## Components
//!
//! - [`App`] - state shared by input handling and rendering
//! - [`mod@input`] - key bindings
//! - [`mod@render`] - drawing
//! - [`runtime`] - executes the network and disk work the app asks for
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  Request Monitor  alice@dirac_user   loading…    │
//! ├──────────────┬──────────────────────────────────┤
//! │ Filters      │ Request Monitor · page 1/3 · ... │
//! │ Status       │ RequestId  JobID  Status  ...    │
//! │   Failed     │ 1042       77     Failed  ...    │
//! │ Time Span    │ ...                              │
//! │   < Last Day │                                  │
//! ├──────────────┴──────────────────────────────────┤
//! │ key hints or the latest status message           │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! `z` hides the sidebar and gives the grid the whole body.

pub mod app;
pub mod config;
pub mod input;
pub mod render;
pub mod runtime;
pub mod theme;

pub use app::App;
pub use input::handle_key;
pub use render::render;
pub use runtime::{AppEvent, EffectRunner};
