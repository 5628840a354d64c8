//! Application state tests
//!
//! Drives [`App`] through startup, option and grid completions the way the
//! runtime would, without any network.

use dirac_monitor::grid::{GridError, GridPage};
use dirac_monitor::monitor::MonitorDefinition;
use dirac_monitor::profile::ApplicationProfile;
use dirac_monitor::selector::{
    OptionsResponse, OptionsTicket, PanelState, SelectOption, SelectorError, SelectorState,
    NETWORK_FAILURE_MESSAGE,
};
use dirac_monitor::session::Session;
use dirac_monitor::ui::app::{Effect, FocusPane, StatusKind, MAX_SIDEBAR_WIDTH, MIN_SIDEBAR_WIDTH};
use dirac_monitor::ui::theme::Theme;
use dirac_monitor::ui::{App, AppEvent};
use std::collections::{BTreeMap, HashMap};

fn create_test_app() -> App {
    let session = Session::new("https://localhost:8443/DIRAC/", "alice").unwrap();
    App::new(
        MonitorDefinition::request_monitor(),
        session,
        Theme::default_theme().clone(),
    )
    .unwrap()
}

fn options() -> OptionsResponse {
    let mut fields = HashMap::new();
    fields.insert(
        "status".to_string(),
        vec![SelectOption::new("Done", "Done"), SelectOption::new("Failed", "Failed")],
    );
    OptionsResponse { fields }
}

fn options_ticket(effects: &[Effect]) -> OptionsTicket {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::LoadOptions(ticket) => Some(*ticket),
            _ => None,
        })
        .expect("options load queued")
}

fn grid_requests(effects: &[Effect]) -> Vec<u64> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::LoadGrid(request) => Some(request.seq),
            _ => None,
        })
        .collect()
}

#[test]
fn test_start_without_profile_only_loads_options() {
    let mut app = create_test_app();
    app.start(None);
    let effects = app.take_effects();
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::LoadOptions(_)));
    assert!(app.take_effects().is_empty());
}

#[test]
fn test_restored_selections_submit_once_options_arrive() {
    let mut selectors = BTreeMap::new();
    selectors.insert(
        "status".to_string(),
        SelectorState {
            hidden: false,
            data_selected: vec!["Failed".to_string()],
            not_selected: false,
        },
    );
    let profile = ApplicationProfile {
        left_menu: PanelState {
            selectors: Some(selectors),
            ..PanelState::default()
        },
        columns: BTreeMap::new(),
    };

    let mut app = create_test_app();
    app.start(Some(&profile));
    let effects = app.take_effects();
    assert!(grid_requests(&effects).is_empty(), "must wait for options");

    let ticket = options_ticket(&effects);
    app.handle_event(AppEvent::OptionsLoaded {
        ticket,
        result: Ok(options()),
    });

    let effects = app.take_effects();
    let loads: Vec<_> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::LoadGrid(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].params["status"], r#"["Failed"]"#);
}

#[test]
fn test_profile_without_selectors_submits_immediately() {
    let mut profile = ApplicationProfile::default();
    profile.left_menu.set_text_value("reqId", "4-6");

    let mut app = create_test_app();
    app.start(Some(&profile));
    let effects = app.take_effects();
    assert_eq!(grid_requests(&effects).len(), 1);
}

#[test]
fn test_failed_options_load_shows_single_notification() {
    let mut app = create_test_app();
    app.start(None);
    let ticket = options_ticket(&app.take_effects());

    app.handle_event(AppEvent::OptionsLoaded {
        ticket,
        result: Err(SelectorError::Network("refused".to_string())),
    });

    let status = app.status.clone().expect("status shown");
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains(NETWORK_FAILURE_MESSAGE));
    assert!(app.take_effects().is_empty());
}

#[test]
fn test_stale_grid_response_is_ignored() {
    let mut app = create_test_app();
    app.start(None);
    app.take_effects();

    app.submit();
    let first = grid_requests(&app.take_effects())[0];
    app.submit();
    let second = grid_requests(&app.take_effects())[0];

    app.handle_event(AppEvent::GridLoaded {
        seq: first,
        result: Err(GridError::Http("aborted".to_string())),
    });
    assert!(app.status.is_none());
    assert!(app.grid.is_loading());

    app.handle_event(AppEvent::GridLoaded {
        seq: second,
        result: Ok(GridPage {
            rows: Vec::new(),
            total: 3,
        }),
    });
    assert_eq!(app.grid.total, 3);
    assert!(!app.grid.is_loading());
}

#[test]
fn test_grid_failure_is_reported() {
    let mut app = create_test_app();
    app.submit();
    let seq = grid_requests(&app.take_effects())[0];
    app.handle_event(AppEvent::GridLoaded {
        seq,
        result: Err(GridError::UnexpectedStatus(502)),
    });
    let status = app.status.clone().expect("status shown");
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("502"));
}

#[test]
fn test_quit_saves_profile() {
    let mut app = create_test_app();
    app.grid.toggle_column(0);
    app.quit();
    assert!(app.should_quit);

    let effects = app.take_effects();
    match &effects[..] {
        [Effect::SaveProfile(profile)] => {
            assert!(profile.columns["RequestId"].hidden);
            assert!(profile.left_menu.selectors.is_some());
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn test_refresh_queues_options_load() {
    let mut app = create_test_app();
    app.refresh(false);
    assert!(matches!(&app.take_effects()[..], [Effect::LoadOptions(_)]));
    assert!(app.panel.is_loading());
}

#[test]
fn test_maximize_moves_focus_to_grid() {
    let mut app = create_test_app();
    assert_eq!(app.focus, FocusPane::Selector);
    app.toggle_maximize();
    assert!(app.grid_maximized);
    assert_eq!(app.focus, FocusPane::Grid);
    // The sidebar is gone, so focus stays on the grid
    app.toggle_focus();
    assert_eq!(app.focus, FocusPane::Grid);
    app.toggle_maximize();
    app.toggle_focus();
    assert_eq!(app.focus, FocusPane::Selector);
}

#[test]
fn test_sidebar_width_is_clamped() {
    let mut app = create_test_app();
    for _ in 0..50 {
        app.widen_sidebar();
    }
    assert_eq!(app.sidebar_width, MAX_SIDEBAR_WIDTH);
    for _ in 0..50 {
        app.narrow_sidebar();
    }
    assert_eq!(app.sidebar_width, MIN_SIDEBAR_WIDTH);
}

#[test]
fn test_hiding_selectors_keeps_cursor_in_range() {
    let mut app = create_test_app();
    let visible = app.visible_entries().len();
    app.selector_cursor = visible - 1;

    app.open_selector_menu();
    for _ in 0..app.menu_fields().len() {
        app.modal_toggle();
        app.modal_next();
    }
    app.close_modal();

    assert!(app.selector_cursor < app.visible_entries().len());
    assert_eq!(app.visible_entries().len(), 2, "only the text fields remain");
}
