//! Profile persistence across application runs

use dirac_monitor::monitor::MonitorDefinition;
use dirac_monitor::profile::{ApplicationProfile, FileProfileStore};
use dirac_monitor::selector::{OptionsResponse, SelectOption, TimeSpanMode};
use dirac_monitor::session::Session;
use dirac_monitor::ui::app::Effect;
use dirac_monitor::ui::theme::Theme;
use dirac_monitor::ui::{App, AppEvent};
use std::collections::HashMap;
use tempfile::TempDir;

fn create_test_app() -> App {
    let session = Session::new("https://localhost:8443/DIRAC/", "alice").unwrap();
    App::new(
        MonitorDefinition::request_monitor(),
        session,
        Theme::default_theme().clone(),
    )
    .unwrap()
}

fn deliver_options(app: &mut App, effects: &[Effect]) {
    let ticket = effects
        .iter()
        .find_map(|e| match e {
            Effect::LoadOptions(ticket) => Some(*ticket),
            _ => None,
        })
        .expect("options load queued");
    let mut fields = HashMap::new();
    fields.insert(
        "status".to_string(),
        vec![
            SelectOption::new("Done", "Done"),
            SelectOption::new("Failed", "Failed"),
        ],
    );
    app.handle_event(AppEvent::OptionsLoaded {
        ticket,
        result: Ok(OptionsResponse { fields }),
    });
}

#[test]
fn test_profile_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let key = MonitorDefinition::request_monitor().name;

    // First run: make some choices and quit
    let mut app = create_test_app();
    app.start(None);
    let effects = app.take_effects();
    deliver_options(&mut app, &effects);
    app.panel.multi_select_mut("status").unwrap().toggle("Failed");
    app.panel.text_field_mut("reqId").unwrap().set_raw("12");
    app.panel.time_span_mut().unwrap().mode = TimeSpanMode::LastDay;
    app.panel.set_hidden("operation", true);
    app.grid.toggle_column(0);
    let before = app.panel.get_state();
    app.quit();

    let profile = app
        .take_effects()
        .into_iter()
        .find_map(|e| match e {
            Effect::SaveProfile(profile) => Some(profile),
            _ => None,
        })
        .expect("profile saved on quit");
    let mut store = FileProfileStore::open(temp_dir.path().to_path_buf()).unwrap();
    profile.save(&mut store, &key).unwrap();

    // Second run: the saved profile is applied and submitted
    let store = FileProfileStore::open(temp_dir.path().to_path_buf()).unwrap();
    let loaded = ApplicationProfile::load(&store, &key).expect("profile on disk");
    assert_eq!(loaded, profile);

    let mut app = create_test_app();
    app.start(Some(&loaded));
    assert_eq!(
        app.grid.visible_columns().count(),
        create_test_app().grid.visible_columns().count() - 1
    );

    let effects = app.take_effects();
    deliver_options(&mut app, &effects);
    assert_eq!(app.panel.get_state(), before);

    let loads: Vec<_> = app
        .take_effects()
        .into_iter()
        .filter_map(|e| match e {
            Effect::LoadGrid(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].params["status"], r#"["Failed"]"#);
    assert_eq!(loads[0].params["reqId"], "[12]");
}

#[test]
fn test_corrupted_profile_starts_fresh() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("RequestMonitor.json"), "{ not json").unwrap();

    let store = FileProfileStore::open(temp_dir.path().to_path_buf()).unwrap();
    assert!(ApplicationProfile::load(&store, "RequestMonitor").is_none());
}
