//! # Application State
//!
//! [`App`] owns the filter panel, the grid and everything the terminal
//! front end shows around them. It never performs I/O: work that needs the
//! network or the disk is queued as an [`Effect`] and picked up by the
//! runtime through [`App::take_effects`]. Results come back as
//! [`AppEvent`]s.

use crate::grid::{Grid, GridRequest};
use crate::monitor::MonitorDefinition;
use crate::profile::ApplicationProfile;
use crate::selector::time_span::{format_date, format_time, parse_date, parse_time};
use crate::selector::{
    FieldEntry, FilterField, FilterPanel, OptionsOutcome, OptionsTicket, SelectorError,
    StateOutcome,
};
use crate::session::Session;
use crate::ui::runtime::AppEvent;
use crate::ui::theme::Theme;
use tracing::{debug, info};

pub const DEFAULT_SIDEBAR_WIDTH: u16 = 36;
pub const MIN_SIDEBAR_WIDTH: u16 = 24;
pub const MAX_SIDEBAR_WIDTH: u16 = 80;
const SIDEBAR_STEP: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Selector,
    Grid,
}

/// Which end of a custom time span is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    From,
    To,
}

/// Overlay drawn above the main layout. Only one is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Value list of a multi-select field.
    OptionPicker { field: String, cursor: usize },
    /// Show/hide individual selectors.
    SelectorMenu { cursor: usize },
    /// Show/hide grid columns.
    ColumnMenu { cursor: usize },
    TextEdit { field: String, buffer: String },
    TimeEdit { target: PickerTarget, buffer: String },
    Info,
}

/// Work for the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadOptions(OptionsTicket),
    LoadGrid(GridRequest),
    SaveProfile(ApplicationProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App {
    pub monitor_name: String,
    pub title: String,
    pub panel: FilterPanel,
    pub grid: Grid,
    pub theme: Theme,
    pub focus: FocusPane,
    /// Index into [`App::visible_entries`].
    pub selector_cursor: usize,
    pub modal: Option<Modal>,
    pub status: Option<StatusMessage>,
    pub grid_maximized: bool,
    pub sidebar_width: u16,
    pub should_quit: bool,
    effects: Vec<Effect>,
}

impl App {
    pub fn new(
        monitor: MonitorDefinition,
        session: Session,
        theme: Theme,
    ) -> Result<Self, SelectorError> {
        let panel = FilterPanel::new(monitor.selector, session)?;
        Ok(Self {
            monitor_name: monitor.name,
            title: monitor.title,
            panel,
            grid: Grid::new(monitor.columns),
            theme,
            focus: FocusPane::Selector,
            selector_cursor: 0,
            modal: None,
            status: None,
            grid_maximized: false,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
            should_quit: false,
            effects: Vec::new(),
        })
    }

    /// Restore the saved profile, if any, and start loading the options.
    ///
    /// A restored panel is submitted as soon as its selections can be
    /// applied: immediately when the profile carries no selectors, after
    /// the options arrive otherwise.
    pub fn start(&mut self, profile: Option<&ApplicationProfile>) {
        let mut submit_now = false;
        if let Some(profile) = profile {
            self.grid.apply_column_state(&profile.columns);
            submit_now = self.panel.set_state(&profile.left_menu) == StateOutcome::SubmitNow;
            info!(monitor = %self.monitor_name, "restored saved profile");
        }

        let ticket = self.panel.begin_options_load();
        self.effects.push(Effect::LoadOptions(ticket));

        if submit_now {
            self.submit();
        }
    }

    /// Drain queued work, including any grid requests made since the last
    /// call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        for request in self.grid.take_requests() {
            self.effects.push(Effect::LoadGrid(request));
        }
        std::mem::take(&mut self.effects)
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::OptionsLoaded { ticket, result } => self.on_options_loaded(ticket, result),
            AppEvent::GridLoaded { seq, result } => {
                if self.grid.finish_load(seq, result) {
                    if let Some(err) = self.grid.last_error() {
                        let text = format!("Loading data failed: {err}");
                        self.set_error(text);
                    }
                }
            }
        }
    }

    fn on_options_loaded(
        &mut self,
        ticket: OptionsTicket,
        result: Result<crate::selector::OptionsResponse, SelectorError>,
    ) {
        let outcome = self.panel.finish_options_load(ticket, result);
        for notification in self.panel.take_notifications() {
            self.set_error(format!("{}: {}", notification.title, notification.message));
        }
        if let OptionsOutcome::Ready { submit: true } = outcome {
            self.submit();
        }
    }

    pub fn submit(&mut self) {
        match self.panel.submit(&mut self.grid) {
            Ok(_) => self.status = None,
            Err(err) => self.set_error(err.to_string()),
        }
    }

    pub fn reset(&mut self) {
        self.selector_cursor = 0;
        match self.panel.reset(&mut self.grid) {
            Ok(_) => self.set_info("Filters cleared"),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    pub fn refresh(&mut self, then_submit: bool) {
        match self.panel.refresh(then_submit) {
            Ok(ticket) => {
                self.effects.push(Effect::LoadOptions(ticket));
                self.set_info("Reloading selector options");
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    /// Panel and column state as it would be persisted.
    pub fn profile(&self) -> ApplicationProfile {
        ApplicationProfile {
            left_menu: self.panel.get_state(),
            columns: self.grid.column_state(),
        }
    }

    pub fn quit(&mut self) {
        let profile = self.profile();
        self.effects.push(Effect::SaveProfile(profile));
        self.should_quit = true;
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    // -- layout --

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Selector => FocusPane::Grid,
            FocusPane::Grid if self.grid_maximized => FocusPane::Grid,
            FocusPane::Grid => FocusPane::Selector,
        };
    }

    /// Give the whole body to the grid, or bring the sidebar back.
    pub fn toggle_maximize(&mut self) {
        self.grid_maximized = !self.grid_maximized;
        if self.grid_maximized {
            self.focus = FocusPane::Grid;
        }
    }

    pub fn widen_sidebar(&mut self) {
        self.sidebar_width = (self.sidebar_width + SIDEBAR_STEP).min(MAX_SIDEBAR_WIDTH);
    }

    pub fn narrow_sidebar(&mut self) {
        self.sidebar_width = self
            .sidebar_width
            .saturating_sub(SIDEBAR_STEP)
            .max(MIN_SIDEBAR_WIDTH);
    }

    pub fn toggle_info(&mut self) {
        self.modal = match self.modal {
            Some(Modal::Info) => None,
            _ => Some(Modal::Info),
        };
    }

    // -- sidebar --

    pub fn visible_entries(&self) -> Vec<&FieldEntry> {
        self.panel.entries().iter().filter(|e| !e.hidden).collect()
    }

    pub fn selected_entry(&self) -> Option<&FieldEntry> {
        self.visible_entries().get(self.selector_cursor).copied()
    }

    fn selected_name(&self) -> Option<String> {
        self.selected_entry().map(|e| e.name.clone())
    }

    pub fn next_field(&mut self) {
        let count = self.visible_entries().len();
        if count > 0 {
            self.selector_cursor = (self.selector_cursor + 1) % count;
        }
    }

    pub fn previous_field(&mut self) {
        let count = self.visible_entries().len();
        if count > 0 {
            self.selector_cursor = (self.selector_cursor + count - 1) % count;
        }
    }

    fn clamp_selector_cursor(&mut self) {
        let count = self.visible_entries().len();
        self.selector_cursor = self.selector_cursor.min(count.saturating_sub(1));
    }

    /// Open the editor matching the kind of the highlighted field.
    pub fn activate_field(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let name = entry.name.clone();
        match &entry.field {
            FilterField::MultiSelect(_) => {
                if self.panel.is_options_ready() {
                    self.modal = Some(Modal::OptionPicker {
                        field: name,
                        cursor: 0,
                    });
                } else if self.panel.is_loading() {
                    self.set_info("Options are still loading");
                } else {
                    self.set_error("Options are not available, press R to reload");
                }
            }
            FilterField::TextRange(text) => {
                self.modal = Some(Modal::TextEdit {
                    field: name,
                    buffer: text.raw.clone(),
                });
            }
            FilterField::TimeSpan(span) => {
                if span.mode == crate::selector::TimeSpanMode::Custom {
                    let buffer = picker_text(span.from_date, span.from_time);
                    self.modal = Some(Modal::TimeEdit {
                        target: PickerTarget::From,
                        buffer,
                    });
                } else {
                    self.set_info("Use Left/Right to pick a span, Manual Selection to enter dates");
                }
            }
        }
    }

    /// Step the time span mode when the time span row is highlighted.
    pub fn cycle_time_span(&mut self, forward: bool) {
        let on_time_span = matches!(
            self.selected_entry().map(|e| &e.field),
            Some(FilterField::TimeSpan(_))
        );
        if !on_time_span {
            return;
        }
        if let Some(span) = self.panel.time_span_mut() {
            span.mode = if forward {
                span.mode.next()
            } else {
                span.mode.previous()
            };
            debug!(mode = span.mode.label(), "time span changed");
        }
    }

    pub fn clear_selected_field(&mut self) {
        if let Some(name) = self.selected_name() {
            if let Some(entry) = self.panel.entry_mut(&name) {
                entry.field.clear();
            }
        }
    }

    // -- modals --

    /// Names the selector menu can show or hide.
    pub fn menu_fields(&self) -> Vec<&FieldEntry> {
        self.panel
            .entries()
            .iter()
            .filter(|e| !matches!(e.field, FilterField::TextRange(_)))
            .collect()
    }

    pub fn open_selector_menu(&mut self) {
        self.modal = Some(Modal::SelectorMenu { cursor: 0 });
    }

    pub fn open_column_menu(&mut self) {
        self.modal = Some(Modal::ColumnMenu { cursor: 0 });
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    fn modal_len(&self) -> usize {
        match &self.modal {
            Some(Modal::OptionPicker { field, .. }) => self
                .panel
                .multi_select(field)
                .map_or(0, |s| s.options.len()),
            Some(Modal::SelectorMenu { .. }) => self.menu_fields().len(),
            Some(Modal::ColumnMenu { .. }) => self.grid.columns.len(),
            _ => 0,
        }
    }

    pub fn modal_next(&mut self) {
        let len = self.modal_len();
        if let Some(cursor) = self.modal_cursor_mut() {
            if len > 0 {
                *cursor = (*cursor + 1).min(len - 1);
            }
        }
    }

    pub fn modal_previous(&mut self) {
        if let Some(cursor) = self.modal_cursor_mut() {
            *cursor = cursor.saturating_sub(1);
        }
    }

    fn modal_cursor_mut(&mut self) -> Option<&mut usize> {
        match &mut self.modal {
            Some(Modal::OptionPicker { cursor, .. })
            | Some(Modal::SelectorMenu { cursor })
            | Some(Modal::ColumnMenu { cursor }) => Some(cursor),
            _ => None,
        }
    }

    /// Space inside a list modal.
    pub fn modal_toggle(&mut self) {
        match self.modal.clone() {
            Some(Modal::OptionPicker { field, cursor }) => {
                if let Some(select) = self.panel.multi_select_mut(&field) {
                    if let Some(value) = select.options.get(cursor).map(|o| o.value.clone()) {
                        select.toggle(&value);
                    }
                }
            }
            Some(Modal::SelectorMenu { cursor }) => {
                let name = self.menu_fields().get(cursor).map(|e| e.name.clone());
                if let Some(name) = name {
                    self.panel.toggle_hidden(&name);
                    self.clamp_selector_cursor();
                }
            }
            Some(Modal::ColumnMenu { cursor }) => self.grid.toggle_column(cursor),
            _ => {}
        }
    }

    /// Flip the NOT flag of the multi-select being edited.
    pub fn toggle_inverted(&mut self) {
        if let Some(Modal::OptionPicker { field, .. }) = &self.modal {
            let field = field.clone();
            if let Some(select) = self.panel.multi_select_mut(&field) {
                select.inverted = !select.inverted;
            }
        }
    }

    pub fn clear_picker(&mut self) {
        if let Some(Modal::OptionPicker { field, .. }) = &self.modal {
            let field = field.clone();
            if let Some(select) = self.panel.multi_select_mut(&field) {
                select.clear();
            }
        }
    }

    pub fn edit_push(&mut self, c: char) {
        match &mut self.modal {
            Some(Modal::TextEdit { buffer, .. }) | Some(Modal::TimeEdit { buffer, .. }) => {
                buffer.push(c)
            }
            _ => {}
        }
    }

    pub fn edit_pop(&mut self) {
        match &mut self.modal {
            Some(Modal::TextEdit { buffer, .. }) | Some(Modal::TimeEdit { buffer, .. }) => {
                buffer.pop();
            }
            _ => {}
        }
    }

    /// Enter inside an edit modal.
    pub fn edit_commit(&mut self) {
        match self.modal.take() {
            Some(Modal::TextEdit { field, buffer }) => self.commit_text(&field, buffer),
            Some(Modal::TimeEdit { target, buffer }) => self.commit_time(target, buffer),
            other => self.modal = other,
        }
    }

    fn commit_text(&mut self, field: &str, buffer: String) {
        let Some(entry) = self.panel.entry_mut(field) else {
            return;
        };
        let label = entry.label.clone();
        if let FilterField::TextRange(text) = &mut entry.field {
            text.set_raw(buffer);
            let parsed = text.parse().map(|_| ());
            if let Err(err) = parsed {
                self.set_error(format!("{label}: {err}"));
                return;
            }
        }
        self.status = None;
    }

    fn commit_time(&mut self, target: PickerTarget, buffer: String) {
        let parsed = parse_picker(&buffer);
        let (date, time) = match parsed {
            Ok(value) => value,
            Err(err) => {
                self.set_error(err.to_string());
                self.modal = Some(Modal::TimeEdit { target, buffer });
                return;
            }
        };
        let Some(span) = self.panel.time_span_mut() else {
            return;
        };
        match target {
            PickerTarget::From => {
                span.from_date = date;
                span.from_time = time;
                let buffer = picker_text(span.to_date, span.to_time);
                self.modal = Some(Modal::TimeEdit {
                    target: PickerTarget::To,
                    buffer,
                });
            }
            PickerTarget::To => {
                span.to_date = date;
                span.to_time = time;
                self.status = None;
            }
        }
    }
}

/// `YYYY-MM-DD HH:MM`, either part may be blank.
fn picker_text(
    date: Option<chrono::NaiveDate>,
    time: Option<chrono::NaiveTime>,
) -> String {
    let date = format_date(date);
    let time = format_time(time);
    format!("{date} {time}").trim().to_string()
}

type PickerValue = (Option<chrono::NaiveDate>, Option<chrono::NaiveTime>);

fn parse_picker(text: &str) -> Result<PickerValue, SelectorError> {
    let mut parts = text.split_whitespace();
    let date = parse_date(parts.next().unwrap_or_default())?;
    let time = parse_time(parts.next().unwrap_or_default())?;
    if parts.next().is_some() {
        return Err(SelectorError::validation(
            "timeSpan",
            "expected a date and an optional time",
        ));
    }
    Ok((date, time))
}
