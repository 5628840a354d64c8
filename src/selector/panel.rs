//! # Filter Panel
//!
//! The panel owns one [`FilterField`] per configured name and drives the
//! conversation with its two collaborators: the options endpoint, which
//! fills the multi-select lists, and the data grid, which receives the
//! derived [`QueryParameters`].
//!
//! ## Options lifecycle
//!
//! ```text
//! begin_options_load() ──► ticket ──► (network) ──► finish_options_load(ticket, result)
//!                                                     │
//!                                  ok ────────────────┼──► options ready, watch fires,
//!                                                     │    deferred selections applied
//!                                  err ───────────────┴──► one notification, not ready
//! ```
//!
//! Every load hands out a new ticket. Completions for an older ticket, or a
//! second completion for the same ticket, are ignored, so a slow response
//! can never overwrite a newer one and a failure is reported exactly once.
//!
//! Saved selections restored before the options arrive are parked and
//! applied when the load completes; callers that need to wait can subscribe
//! to [`FilterPanel::options_ready_signal`].

use super::config::SelectorConfig;
use super::error::SelectorError;
use super::field::{FilterField, MultiSelect, TextRange};
use super::options::{OptionsResponse, OptionsSource};
use super::query::{build_query, FieldRef, QueryParameters};
use super::state::{PanelState, SelectorState};
use super::time_span::{self, TimeSpan, TIME_SPAN_FIELD};
use crate::session::Session;
use chrono::{Local, NaiveDateTime};
use std::collections::BTreeMap;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Message shown to the user when the options endpoint cannot be reached.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Operation failed due to a network error. Please try again later!";

/// The data grid as seen by the panel.
pub trait GridLoader {
    /// Rows per page currently chosen in the grid.
    fn page_size(&self) -> u32;

    /// Replace the grid's query with `params` and reload from page 1,
    /// abandoning any load still in flight.
    fn load(&mut self, params: QueryParameters);
}

/// Identifies one options request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsTicket(u64);

impl OptionsTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// What happened when an options response was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsOutcome {
    /// The response belonged to a superseded or already settled request.
    Stale,
    /// The request failed; a notification has been queued.
    Failed,
    /// Options are loaded. `submit` asks the caller to submit the panel,
    /// either because a refresh requested it or restored state is waiting.
    Ready { submit: bool },
}

/// What the caller should do after restoring state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOutcome {
    SubmitNow,
    AwaitingOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// One field of the panel with its presentation data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub label: String,
    pub hidden: bool,
    pub field: FilterField,
    backend_key: Option<String>,
}

impl FieldEntry {
    pub fn backend_key(&self) -> Option<&str> {
        self.backend_key.as_deref()
    }
}

pub struct FilterPanel {
    config: SelectorConfig,
    session: Session,
    entries: Vec<FieldEntry>,
    options_ready: bool,
    /// Set by the first successful load and kept through later refreshes,
    /// so the option lists stay usable while a reload is in flight.
    has_options: bool,
    loading: bool,
    current_ticket: u64,
    settled_ticket: u64,
    submit_after_load: bool,
    pending_selections: Option<BTreeMap<String, SelectorState>>,
    state_restored: bool,
    owner_defaults_applied: bool,
    ready_tx: watch::Sender<bool>,
    notifications: Vec<Notification>,
    last_error: Option<SelectorError>,
}

impl FilterPanel {
    /// Build a panel from a validated configuration.
    pub fn new(config: SelectorConfig, session: Session) -> Result<Self, SelectorError> {
        config.validate()?;

        let mut entries = Vec::new();
        for selector in &config.selectors {
            entries.push(FieldEntry {
                name: selector.name.clone(),
                label: selector.label.clone(),
                hidden: false,
                field: FilterField::MultiSelect(MultiSelect::default()),
                backend_key: selector.backend_key.clone(),
            });
        }
        if config.has_time_span {
            entries.push(FieldEntry {
                name: TIME_SPAN_FIELD.to_string(),
                label: "Time Span".to_string(),
                hidden: false,
                field: FilterField::TimeSpan(TimeSpan::default()),
                backend_key: None,
            });
        }
        for text in &config.text_fields {
            entries.push(FieldEntry {
                name: text.name.clone(),
                label: text.label.clone(),
                hidden: false,
                field: FilterField::TextRange(TextRange::default()),
                backend_key: None,
            });
        }

        let (ready_tx, _) = watch::channel(false);

        debug!(fields = entries.len(), "filter panel created");

        Ok(Self {
            config,
            session,
            entries,
            options_ready: false,
            has_options: false,
            loading: false,
            current_ticket: 0,
            settled_ticket: 0,
            submit_after_load: false,
            pending_selections: None,
            state_restored: false,
            owner_defaults_applied: false,
            ready_tx,
            notifications: Vec::new(),
            last_error: None,
        })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&FieldEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut FieldEntry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    pub fn multi_select(&self, name: &str) -> Option<&MultiSelect> {
        match self.entry(name).map(|e| &e.field) {
            Some(FilterField::MultiSelect(select)) => Some(select),
            _ => None,
        }
    }

    pub fn multi_select_mut(&mut self, name: &str) -> Option<&mut MultiSelect> {
        match self.entry_mut(name).map(|e| &mut e.field) {
            Some(FilterField::MultiSelect(select)) => Some(select),
            _ => None,
        }
    }

    pub fn text_field_mut(&mut self, name: &str) -> Option<&mut TextRange> {
        match self.entry_mut(name).map(|e| &mut e.field) {
            Some(FilterField::TextRange(text)) => Some(text),
            _ => None,
        }
    }

    pub fn time_span(&self) -> Option<&TimeSpan> {
        match self.entry(TIME_SPAN_FIELD).map(|e| &e.field) {
            Some(FilterField::TimeSpan(span)) => Some(span),
            _ => None,
        }
    }

    pub fn time_span_mut(&mut self) -> Option<&mut TimeSpan> {
        match self.entry_mut(TIME_SPAN_FIELD).map(|e| &mut e.field) {
            Some(FilterField::TimeSpan(span)) => Some(span),
            _ => None,
        }
    }

    pub fn set_hidden(&mut self, name: &str, hidden: bool) {
        if let Some(entry) = self.entry_mut(name) {
            entry.hidden = hidden;
        }
    }

    pub fn toggle_hidden(&mut self, name: &str) {
        if let Some(entry) = self.entry_mut(name) {
            entry.hidden = !entry.hidden;
        }
    }

    pub fn is_options_ready(&self) -> bool {
        self.options_ready
    }

    /// True while an options request is outstanding; the UI masks the panel.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Subscribe to the "options loaded" signal.
    pub fn options_ready_signal(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }

    pub fn last_error(&self) -> Option<&SelectorError> {
        self.last_error.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Start an options request. Any earlier request is superseded.
    pub fn begin_options_load(&mut self) -> OptionsTicket {
        self.current_ticket += 1;
        self.loading = true;
        self.options_ready = false;
        self.ready_tx.send_replace(false);
        debug!(ticket = self.current_ticket, "options load started");
        OptionsTicket(self.current_ticket)
    }

    /// Deliver the result of an options request.
    pub fn finish_options_load(
        &mut self,
        ticket: OptionsTicket,
        result: Result<OptionsResponse, SelectorError>,
    ) -> OptionsOutcome {
        if ticket.0 != self.current_ticket || ticket.0 == self.settled_ticket {
            debug!(ticket = ticket.0, current = self.current_ticket, "ignoring stale options response");
            return OptionsOutcome::Stale;
        }
        self.settled_ticket = ticket.0;
        self.loading = false;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "failed to load selector options");
                self.submit_after_load = false;
                self.notifications.push(Notification {
                    title: "Notification".to_string(),
                    message: NETWORK_FAILURE_MESSAGE.to_string(),
                });
                self.last_error = Some(err);
                return OptionsOutcome::Failed;
            }
        };

        self.apply_options(&response);
        self.apply_owner_defaults();

        let mut submit = std::mem::take(&mut self.submit_after_load);
        if let Some(pending) = self.pending_selections.take() {
            self.apply_selections(&pending);
            submit = true;
        }

        self.options_ready = true;
        self.has_options = true;
        self.last_error = None;
        self.ready_tx.send_replace(true);
        info!(ticket = ticket.0, "selector options loaded");

        OptionsOutcome::Ready { submit }
    }

    /// Fetch the options from `source` and apply them.
    pub async fn load_options(&mut self, source: &dyn OptionsSource) -> OptionsOutcome {
        let ticket = self.begin_options_load();
        let result = source.fetch_options().await;
        self.finish_options_load(ticket, result)
    }

    fn apply_options(&mut self, response: &OptionsResponse) {
        for entry in &mut self.entries {
            let FilterField::MultiSelect(select) = &mut entry.field else {
                continue;
            };
            let key = entry.backend_key.as_deref().unwrap_or(&entry.name);
            match response.options_for(key) {
                Some(options) => select.options = options.to_vec(),
                None => {
                    warn!(field = %entry.name, key = %key, "options response has no entry for selector");
                    select.options.clear();
                }
            }
        }
    }

    fn apply_owner_defaults(&mut self) {
        if self.owner_defaults_applied || self.state_restored {
            return;
        }
        self.owner_defaults_applied = true;

        let username = self.session.username.clone();
        let defaults: Vec<String> = self
            .config
            .owner_defaults
            .iter()
            .filter(|d| {
                self.session.has_property(&d.required_property)
                    && !self.session.has_property(&d.excluded_property)
            })
            .map(|d| d.field.clone())
            .collect();

        for field in defaults {
            if let Some(select) = self.multi_select_mut(&field) {
                debug!(field = %field, user = %username, "preselecting session owner");
                select.selected.clear();
                select.selected.insert(username.clone());
            }
        }
    }

    fn apply_selections(&mut self, selections: &BTreeMap<String, SelectorState>) {
        for (name, saved) in selections {
            if let Some(select) = self.multi_select_mut(name) {
                select.selected = saved.data_selected.iter().cloned().collect();
                select.inverted = saved.not_selected;
            }
        }
    }

    /// Check every field that can hold invalid input.
    pub fn validate(&mut self) -> Result<(), SelectorError> {
        for entry in &mut self.entries {
            match &mut entry.field {
                FilterField::TextRange(text) => {
                    text.parse()
                        .map_err(|err| SelectorError::validation(&entry.name, err.to_string()))?;
                }
                FilterField::TimeSpan(span) => span.validate()?,
                FilterField::MultiSelect(_) => {}
            }
        }
        Ok(())
    }

    /// Derive the query parameters without touching the grid.
    pub fn query(&self, page_size: u32, now: NaiveDateTime) -> Result<QueryParameters, SelectorError> {
        let fields = self.entries.iter().map(|e| FieldRef {
            name: &e.name,
            field: &e.field,
        });
        build_query(fields, page_size, self.has_options, now)
    }

    /// Validate and push the current selection into the grid.
    pub fn submit(&mut self, grid: &mut dyn GridLoader) -> Result<QueryParameters, SelectorError> {
        self.submit_at(grid, Local::now().naive_local())
    }

    /// [`FilterPanel::submit`] against an explicit clock.
    pub fn submit_at(
        &mut self,
        grid: &mut dyn GridLoader,
        now: NaiveDateTime,
    ) -> Result<QueryParameters, SelectorError> {
        if let Err(err) = self.validate() {
            debug!(error = %err, "submit rejected");
            self.last_error = Some(err.clone());
            return Err(err);
        }
        let params = self.query(grid.page_size(), now)?;
        info!(params = params.len(), "submitting selection to grid");
        self.last_error = None;
        grid.load(params.clone());
        Ok(params)
    }

    /// Clear every field, then submit.
    pub fn reset(&mut self, grid: &mut dyn GridLoader) -> Result<QueryParameters, SelectorError> {
        self.clear_fields();
        self.submit(grid)
    }

    /// Clear every field back to its freshly constructed value.
    pub fn clear_fields(&mut self) {
        for entry in &mut self.entries {
            entry.field.clear();
            entry.hidden = false;
        }
        self.pending_selections = None;
    }

    /// Reload the option lists, optionally submitting once they arrive.
    ///
    /// With `then_submit` the fields are validated first and an invalid
    /// panel is not refreshed at all.
    pub fn refresh(&mut self, then_submit: bool) -> Result<OptionsTicket, SelectorError> {
        if then_submit {
            self.validate()?;
        }
        let ticket = self.begin_options_load();
        self.submit_after_load = then_submit;
        Ok(ticket)
    }

    /// Snapshot the panel for persistence.
    pub fn get_state(&self) -> PanelState {
        let mut state = PanelState::default();
        let mut selectors = BTreeMap::new();

        for entry in &self.entries {
            match &entry.field {
                FilterField::MultiSelect(select) => {
                    let saved = match self
                        .pending_selections
                        .as_ref()
                        .and_then(|p| p.get(&entry.name))
                    {
                        Some(pending) => SelectorState {
                            hidden: entry.hidden,
                            ..pending.clone()
                        },
                        None => SelectorState {
                            hidden: entry.hidden,
                            data_selected: select.selected.iter().cloned().collect(),
                            not_selected: select.inverted,
                        },
                    };
                    selectors.insert(entry.name.clone(), saved);
                }
                FilterField::TextRange(text) => state.set_text_value(&entry.name, &text.raw),
                FilterField::TimeSpan(span) => {
                    state.time_span = Some(span.mode);
                    state.from_date = time_span::format_date(span.from_date);
                    state.from_time = time_span::format_time(span.from_time);
                    state.to_date = time_span::format_date(span.to_date);
                    state.to_time = time_span::format_time(span.to_time);
                    state.time_span_hidden = entry.hidden;
                }
            }
        }

        state.selectors = Some(selectors);
        state
    }

    /// Restore a snapshot produced by [`FilterPanel::get_state`].
    ///
    /// Visibility, text and time values apply immediately. Selections apply
    /// once options are loaded; until then they are kept aside and reported
    /// back by `get_state`. Unknown names are ignored.
    pub fn set_state(&mut self, state: &PanelState) -> StateOutcome {
        self.state_restored = true;

        let mut parked = BTreeMap::new();
        if let Some(selectors) = &state.selectors {
            for (name, saved) in selectors {
                let Some(entry) = self.entry_mut(name) else {
                    debug!(field = %name, "ignoring unknown selector in saved state");
                    continue;
                };
                if !matches!(entry.field, FilterField::MultiSelect(_)) {
                    continue;
                }
                entry.hidden = saved.hidden;
                parked.insert(name.clone(), saved.clone());
            }
        }

        for entry in &mut self.entries {
            match &mut entry.field {
                FilterField::TextRange(text) => {
                    text.set_raw(state.text_value(&entry.name).unwrap_or_default());
                    if let Err(err) = text.parse() {
                        debug!(field = %entry.name, error = %err, "restored text does not parse");
                    }
                }
                FilterField::TimeSpan(span) => {
                    entry.hidden = state.time_span_hidden;
                    *span = restore_time_span(state);
                }
                FilterField::MultiSelect(_) => {}
            }
        }

        if state.selectors.is_none() {
            return StateOutcome::SubmitNow;
        }

        if self.options_ready {
            self.apply_selections(&parked);
            self.pending_selections = None;
            StateOutcome::SubmitNow
        } else {
            self.pending_selections = Some(parked);
            StateOutcome::AwaitingOptions
        }
    }
}

fn restore_time_span(state: &PanelState) -> TimeSpan {
    fn lenient<T>(text: &str, parse: fn(&str) -> Result<Option<T>, SelectorError>) -> Option<T> {
        // Profiles written by the web console store full ISO timestamps
        let head = text.split('T').next().unwrap_or(text);
        match parse(text).or_else(|_| parse(head)) {
            Ok(value) => value,
            Err(err) => {
                warn!(value = %text, error = %err, "dropping unreadable time picker value");
                None
            }
        }
    }

    TimeSpan {
        mode: state.time_span.unwrap_or_default(),
        from_date: lenient(&state.from_date, time_span::parse_date),
        from_time: lenient(&state.from_time, time_span::parse_time),
        to_date: lenient(&state.to_date, time_span::parse_date),
        to_time: lenient(&state.to_time, time_span::parse_time),
    }
}
