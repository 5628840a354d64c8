//! # Key Handling
//!
//! Maps key presses to [`App`] operations. Open modals get the key first,
//! then the global bindings, then the bindings of the focused pane.
//!
//! ## Global
//! - `q` / `Ctrl+c` - save the profile and quit
//! - `Tab` - switch between filters and grid
//! - `s` - submit the filters
//! - `r` - reset every filter and submit
//! - `R` - reload selector options
//! - `m` - show/hide selectors
//! - `c` - show/hide grid columns
//! - `z` - maximize the grid
//! - `<` / `>` - narrow/widen the sidebar
//! - `i` - info
//!
//! ## Filters
//! - `j` / `k` - move between fields
//! - `Enter` - edit the field
//! - `h` / `l` - change the time span
//! - `x` / `Delete` - clear the field
//!
//! ## Grid
//! - `j` / `k` - move between rows
//! - `n` / `p` - next/previous page
//! - `+` / `-` - bigger/smaller pages
//! - `g` - reload the current page

use crate::ui::app::{App, FocusPane, Modal};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    if app.modal.is_some() {
        handle_modal_key(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('s') => app.submit(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('R') => app.refresh(false),
        KeyCode::Char('m') => app.open_selector_menu(),
        KeyCode::Char('c') => app.open_column_menu(),
        KeyCode::Char('z') => app.toggle_maximize(),
        KeyCode::Char('<') => app.narrow_sidebar(),
        KeyCode::Char('>') => app.widen_sidebar(),
        KeyCode::Char('i') | KeyCode::Char('?') => app.toggle_info(),
        _ => match app.focus {
            FocusPane::Selector => handle_selector_key(app, key),
            FocusPane::Grid => handle_grid_key(app, key),
        },
    }
}

fn handle_selector_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.next_field(),
        KeyCode::Char('k') | KeyCode::Up => app.previous_field(),
        KeyCode::Enter => app.activate_field(),
        KeyCode::Char('h') | KeyCode::Left => app.cycle_time_span(false),
        KeyCode::Char('l') | KeyCode::Right => app.cycle_time_span(true),
        KeyCode::Char('x') | KeyCode::Delete => app.clear_selected_field(),
        _ => {}
    }
}

fn handle_grid_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.grid.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.grid.select_previous(),
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => app.grid.next_page(),
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => app.grid.previous_page(),
        KeyCode::Char('+') => app.grid.cycle_page_size(true),
        KeyCode::Char('-') => app.grid.cycle_page_size(false),
        KeyCode::Char('g') => app.grid.reload(),
        KeyCode::Esc if app.grid_maximized => app.toggle_maximize(),
        _ => {}
    }
}

fn handle_modal_key(app: &mut App, key: KeyEvent) {
    match &app.modal {
        Some(Modal::Info) => {
            if matches!(key.code, KeyCode::Char('i') | KeyCode::Char('?') | KeyCode::Esc) {
                app.close_modal();
            }
        }
        Some(Modal::OptionPicker { .. }) => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.modal_next(),
            KeyCode::Char('k') | KeyCode::Up => app.modal_previous(),
            KeyCode::Char(' ') => app.modal_toggle(),
            KeyCode::Char('!') | KeyCode::Char('n') => app.toggle_inverted(),
            KeyCode::Char('x') | KeyCode::Delete => app.clear_picker(),
            KeyCode::Enter | KeyCode::Esc => app.close_modal(),
            _ => {}
        },
        Some(Modal::SelectorMenu { .. }) | Some(Modal::ColumnMenu { .. }) => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.modal_next(),
            KeyCode::Char('k') | KeyCode::Up => app.modal_previous(),
            KeyCode::Char(' ') | KeyCode::Enter => app.modal_toggle(),
            KeyCode::Esc | KeyCode::Char('q') => app.close_modal(),
            _ => {}
        },
        Some(Modal::TextEdit { .. }) | Some(Modal::TimeEdit { .. }) => match key.code {
            KeyCode::Enter => app.edit_commit(),
            KeyCode::Esc => app.close_modal(),
            KeyCode::Backspace => app.edit_pop(),
            KeyCode::Char(c) => app.edit_push(c),
            _ => {}
        },
        None => {}
    }
}
