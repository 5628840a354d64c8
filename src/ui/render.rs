use crate::selector::time_span::{format_date, format_time};
use crate::selector::{FieldEntry, FilterField, GridLoader, TimeSpan, TimeSpanMode};
use crate::ui::app::{App, FocusPane, Modal, PickerTarget, StatusKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, main_chunks[0]);

    if app.grid_maximized {
        render_grid(frame, app, main_chunks[1]);
    } else {
        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(app.sidebar_width), Constraint::Min(0)])
            .split(main_chunks[1]);
        render_sidebar(frame, app, body_chunks[0]);
        render_grid(frame, app, body_chunks[1]);
    }

    render_footer(frame, app, main_chunks[2]);

    match &app.modal {
        Some(Modal::OptionPicker { field, cursor }) => render_option_picker(frame, app, field, *cursor),
        Some(Modal::SelectorMenu { cursor }) => render_selector_menu(frame, app, *cursor),
        Some(Modal::ColumnMenu { cursor }) => render_column_menu(frame, app, *cursor),
        Some(Modal::TextEdit { field, buffer }) => {
            let label = app.panel.entry(field).map_or(field.as_str(), |e| e.label.as_str());
            render_edit(frame, app, label, buffer, "e.g. 1-5, 9, 12");
        }
        Some(Modal::TimeEdit { target, buffer }) => {
            let label = match target {
                PickerTarget::From => "From",
                PickerTarget::To => "To",
            };
            render_edit(frame, app, label, buffer, "YYYY-MM-DD HH:MM, time optional");
        }
        Some(Modal::Info) => render_info(frame, app),
        None => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let session = app.panel.session();
    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.title),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", session.username),
            Style::default().fg(theme.fg),
        ),
    ];
    if let Some(group) = &session.group {
        spans.push(Span::styled(format!("@{group}"), Style::default().fg(theme.fg_dim)));
    }
    if app.panel.is_loading() || app.grid.is_loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(theme.secondary)));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .style(Style::default().bg(theme.bg));

    frame.render_widget(header, area);
}

fn field_summary(app: &App, entry: &FieldEntry) -> String {
    match &entry.field {
        FilterField::MultiSelect(select) => {
            if !app.panel.is_options_ready() && app.panel.is_loading() {
                "loading…".to_string()
            } else {
                select.summary()
            }
        }
        FilterField::TextRange(text) if text.raw.trim().is_empty() => "any".to_string(),
        FilterField::TextRange(text) => text.raw.clone(),
        FilterField::TimeSpan(span) => time_span_summary(span),
    }
}

fn time_span_summary(span: &TimeSpan) -> String {
    if span.mode != TimeSpanMode::Custom {
        return format!("< {} >", span.mode.label());
    }
    let from = format!("{} {}", format_date(span.from_date), format_time(span.from_time));
    let to = format!("{} {}", format_date(span.to_date), format_time(span.to_time));
    format!("< {} > {} .. {}", span.mode.label(), from.trim(), to.trim())
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == FocusPane::Selector;
    let border_color = if focused { theme.accent } else { theme.fg_dim };

    let items: Vec<ListItem> = app
        .visible_entries()
        .into_iter()
        .map(|entry| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    entry.label.clone(),
                    Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {}", field_summary(app, entry)),
                    Style::default().fg(theme.secondary),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filters ")
                .border_style(Style::default().fg(border_color)),
        )
        .style(Style::default().bg(theme.bg))
        .highlight_style(if focused {
            Style::default().bg(theme.selection_bg)
        } else {
            Style::default()
        })
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(Some(app.selector_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let grid = &app.grid;
    let focused = app.focus == FocusPane::Grid;
    let border_color = if focused { theme.accent } else { theme.fg_dim };

    let columns: Vec<_> = grid.visible_columns().collect();
    let header = Row::new(
        columns
            .iter()
            .map(|c| Cell::from(c.header.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = grid
        .rows
        .iter()
        .map(|row| Row::new(columns.iter().map(|c| Cell::from(c.cell(row))).collect::<Vec<_>>()))
        .collect();
    let widths: Vec<Constraint> = columns.iter().map(|c| Constraint::Length(c.width)).collect();

    let title = if grid.has_query() {
        format!(
            " {} · page {}/{} · {} rows · {} per page ",
            app.title,
            grid.page(),
            grid.page_count(),
            grid.total,
            grid.page_size(),
        )
    } else {
        format!(" {} · press s to search ", app.title)
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border_color)),
        )
        .style(Style::default().fg(theme.fg).bg(theme.bg))
        .row_highlight_style(Style::default().bg(theme.selection_bg));

    let mut state = TableState::default();
    if focused && !grid.rows.is_empty() {
        state.select(Some(grid.selected_row));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => theme.success,
            StatusKind::Error => theme.error,
        };
        frame.render_widget(
            Paragraph::new(status.text.as_str()).style(Style::default().fg(color)),
            area,
        );
        return;
    }

    let help_text = match (&app.modal, app.focus) {
        (Some(Modal::OptionPicker { .. }), _) => {
            "[jk] Move  [Space] Select  [n] NOT  [x] Clear  [Enter/Esc] Done"
        }
        (Some(Modal::SelectorMenu { .. }), _) | (Some(Modal::ColumnMenu { .. }), _) => {
            "[jk] Move  [Space] Show/Hide  [Esc] Close"
        }
        (Some(Modal::TextEdit { .. }), _) | (Some(Modal::TimeEdit { .. }), _) => {
            "[Enter] Apply  [Esc] Cancel"
        }
        (Some(Modal::Info), _) => "[Esc] Close",
        (None, FocusPane::Selector) => {
            "[jk] Field  [Enter] Edit  [hl] Span  [x] Clear  [s] Submit  [r] Reset  [R] Reload  [m] Selectors  [Tab] Grid  [q] Quit"
        }
        (None, FocusPane::Grid) => {
            "[jk] Row  [np] Page  [+-] Page size  [g] Reload  [c] Columns  [z] Maximize  [Tab] Filters  [q] Quit"
        }
    };

    frame.render_widget(
        Paragraph::new(help_text).style(Style::default().fg(theme.fg_dim)),
        area,
    );
}

/// Rect of `width` x `height` centered in `area`, clipped to it.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn modal_block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(app.theme.accent))
        .style(Style::default().bg(app.theme.bg).fg(app.theme.fg))
}

fn render_checklist(frame: &mut Frame, app: &App, title: String, items: Vec<(String, bool)>, cursor: usize) {
    let theme = &app.theme;
    let height = u16::try_from(items.len()).unwrap_or(u16::MAX).saturating_add(2).min(20);
    let area = centered_rect(50, height.max(3), frame.area());

    let list_items: Vec<ListItem> = items
        .into_iter()
        .map(|(label, checked)| {
            let mark = if checked { "[x] " } else { "[ ] " };
            let color = if checked { theme.secondary } else { theme.fg };
            ListItem::new(Line::from(Span::styled(
                format!("{mark}{label}"),
                Style::default().fg(color),
            )))
        })
        .collect();

    let list = List::new(list_items)
        .block(modal_block(app, title))
        .highlight_style(Style::default().bg(theme.selection_bg));
    let mut state = ListState::default().with_selected(Some(cursor));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_option_picker(frame: &mut Frame, app: &App, field: &str, cursor: usize) {
    let Some(select) = app.panel.multi_select(field) else {
        return;
    };
    let label = app.panel.entry(field).map_or(field, |e| e.label.as_str());
    let title = if select.inverted {
        format!(" {label} (NOT) ")
    } else {
        format!(" {label} ")
    };
    let items = select
        .options
        .iter()
        .map(|o| (o.label.clone(), select.is_selected(&o.value)))
        .collect();
    render_checklist(frame, app, title, items, cursor);
}

fn render_selector_menu(frame: &mut Frame, app: &App, cursor: usize) {
    let items = app
        .menu_fields()
        .into_iter()
        .map(|e| (e.label.clone(), !e.hidden))
        .collect();
    render_checklist(frame, app, " Visible selectors ".to_string(), items, cursor);
}

fn render_column_menu(frame: &mut Frame, app: &App, cursor: usize) {
    let items = app
        .grid
        .columns
        .iter()
        .map(|c| (c.header.clone(), !c.hidden))
        .collect();
    render_checklist(frame, app, " Visible columns ".to_string(), items, cursor);
}

fn render_edit(frame: &mut Frame, app: &App, label: &str, buffer: &str, hint: &str) {
    let area = centered_rect(50, 4, frame.area());
    let text = vec![
        Line::from(Span::styled(format!("{buffer}_"), Style::default().fg(app.theme.fg))),
        Line::from(Span::styled(hint.to_string(), Style::default().fg(app.theme.fg_dim))),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(modal_block(app, format!(" {label} "))),
        area,
    );
}

fn render_info(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 12, frame.area());
    let session = app.panel.session();
    let text = vec![
        Line::from(Span::styled(
            app.title.clone(),
            Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Server:     {}", session.base_url())),
        Line::from(format!("User:       {}", session.username)),
        Line::from(format!("Group:      {}", session.group.as_deref().unwrap_or("-"))),
        Line::from(format!("Properties: {}", session.properties.join(", "))),
        Line::from(""),
        Line::from(format!("Theme:      {}", app.theme.name)),
        Line::from(format!("Version:    {}", env!("CARGO_PKG_VERSION"))),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .block(modal_block(app, " Info ".to_string()))
            .wrap(Wrap { trim: true }),
        area,
    );
}
