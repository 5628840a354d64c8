//! Filter panel behaviour through the public API
//!
//! Covers the laws the panel has to keep as a whole: state round-trips,
//! reset back to a fresh panel, option loading through an async source and
//! the parameters a submit produces.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use dirac_monitor::monitor::MonitorDefinition;
use dirac_monitor::selector::{
    FilterPanel, GridLoader, OptionsOutcome, OptionsResponse, OptionsSource, QueryParameters,
    SelectOption, SelectorError, StateOutcome, TimeSpanMode, NETWORK_FAILURE_MESSAGE,
};
use dirac_monitor::session::Session;
use std::collections::HashMap;

#[derive(Default)]
struct RecordingGrid {
    loads: Vec<QueryParameters>,
}

impl GridLoader for RecordingGrid {
    fn page_size(&self) -> u32 {
        50
    }

    fn load(&mut self, params: QueryParameters) {
        self.loads.push(params);
    }
}

struct StaticOptions;

#[async_trait]
impl OptionsSource for StaticOptions {
    async fn fetch_options(&self) -> Result<OptionsResponse, SelectorError> {
        Ok(options())
    }
}

struct FailingOptions;

#[async_trait]
impl OptionsSource for FailingOptions {
    async fn fetch_options(&self) -> Result<OptionsResponse, SelectorError> {
        Err(SelectorError::Network("connection refused".to_string()))
    }
}

fn options() -> OptionsResponse {
    let mut fields = HashMap::new();
    let list = |values: &[&str]| values.iter().map(|v| SelectOption::new(*v, *v)).collect();
    fields.insert("requestType".to_string(), list(&["transfer", "removal"]));
    fields.insert("status".to_string(), list(&["Done", "Failed", "Waiting"]));
    fields.insert("operation".to_string(), list(&["ReplicateAndRegister"]));
    fields.insert("owner".to_string(), list(&["alice", "bob"]));
    fields.insert("ownerGroup".to_string(), list(&["dirac_user"]));
    OptionsResponse { fields }
}

fn session() -> Session {
    Session::new("https://localhost:8443/DIRAC/", "alice").unwrap()
}

fn panel() -> FilterPanel {
    FilterPanel::new(MonitorDefinition::request_monitor().selector, session()).unwrap()
}

fn now() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-05-10 12:34:56", "%Y-%m-%d %H:%M:%S").unwrap()
}

#[tokio::test]
async fn test_load_options_signals_readiness() {
    let mut panel = panel();
    let mut ready = panel.options_ready_signal();
    assert!(!*ready.borrow());

    let outcome = panel.load_options(&StaticOptions).await;
    assert_eq!(outcome, OptionsOutcome::Ready { submit: false });
    assert!(panel.is_options_ready());
    assert!(ready.has_changed().unwrap());
    assert!(*ready.borrow_and_update());
    assert_eq!(panel.multi_select("status").unwrap().options.len(), 3);
}

#[tokio::test]
async fn test_failed_load_notifies_once() {
    let mut panel = panel();
    assert_eq!(panel.load_options(&FailingOptions).await, OptionsOutcome::Failed);

    let notifications = panel.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, NETWORK_FAILURE_MESSAGE);
    assert!(!panel.is_options_ready());
    assert!(panel.take_notifications().is_empty());
}

#[tokio::test]
async fn test_status_selection_reaches_grid() {
    let mut panel = panel();
    panel.load_options(&StaticOptions).await;
    panel.multi_select_mut("status").unwrap().toggle("Failed");
    panel.text_field_mut("reqId").unwrap().set_raw("3-5, 1");

    let mut grid = RecordingGrid::default();
    let params = panel.submit_at(&mut grid, now()).unwrap();

    assert_eq!(grid.loads, vec![params.clone()]);
    assert_eq!(params["status"], r#"["Failed"]"#);
    assert_eq!(params["reqId"], "[1,3,4,5]");
    assert_eq!(params["id"], "[]");
    assert_eq!(params["limit"], "50");
    assert!(!params.contains_key("owner"));
}

#[tokio::test]
async fn test_empty_selection_omits_parameter() {
    let mut panel = panel();
    panel.load_options(&StaticOptions).await;

    let params = panel.query(100, now()).unwrap();
    for name in ["requestType", "status", "operation", "owner", "ownerGroup"] {
        assert!(!params.contains_key(name), "{name} should be omitted");
    }
}

#[tokio::test]
async fn test_inverted_selection_sends_complement() {
    let mut panel = panel();
    panel.load_options(&StaticOptions).await;
    let status = panel.multi_select_mut("status").unwrap();
    status.toggle("Done");
    status.inverted = true;

    let params = panel.query(100, now()).unwrap();
    assert_eq!(params["status"], r#"["Failed","Waiting"]"#);
}

#[test]
fn test_last_week_span() {
    let mut panel = panel();
    let span = panel.time_span_mut().unwrap();
    span.mode = TimeSpanMode::LastWeek;

    let params = panel.query(100, now()).unwrap();
    assert_eq!(params["startDate"], "2024-05-03");
    assert_eq!(params["startTime"], "12:34");
    assert_eq!(params["endDate"], "2024-05-10");
    assert_eq!(params["endTime"], "12:34");
}

#[test]
fn test_invalid_range_blocks_submit() {
    let mut panel = panel();
    panel.text_field_mut("id").unwrap().set_raw("9-2");

    let mut grid = RecordingGrid::default();
    let err = panel.submit_at(&mut grid, now()).unwrap_err();
    assert_eq!(err.field(), Some("id"));
    assert!(grid.loads.is_empty());
}

#[tokio::test]
async fn test_state_roundtrip_after_load() {
    let mut source = panel();
    source.load_options(&StaticOptions).await;
    source.multi_select_mut("status").unwrap().toggle("Waiting");
    source.multi_select_mut("owner").unwrap().inverted = true;
    source.multi_select_mut("owner").unwrap().toggle("bob");
    source.text_field_mut("reqId").unwrap().set_raw("7");
    source.time_span_mut().unwrap().mode = TimeSpanMode::LastMonth;
    source.set_hidden("operation", true);
    let saved = source.get_state();

    let mut restored = panel();
    assert_eq!(restored.set_state(&saved), StateOutcome::AwaitingOptions);
    // Selections parked until the options arrive are still reported
    assert_eq!(restored.get_state(), saved);

    let outcome = restored.load_options(&StaticOptions).await;
    assert_eq!(outcome, OptionsOutcome::Ready { submit: true });
    assert_eq!(restored.get_state(), saved);
    assert_eq!(
        restored.query(100, now()).unwrap(),
        source.query(100, now()).unwrap()
    );
}

#[tokio::test]
async fn test_reset_matches_fresh_panel() {
    let fresh = {
        let mut panel = panel();
        panel.load_options(&StaticOptions).await;
        panel.get_state()
    };

    let mut panel = panel();
    panel.load_options(&StaticOptions).await;
    panel.multi_select_mut("status").unwrap().toggle("Done");
    panel.text_field_mut("id").unwrap().set_raw("1-3");
    panel.time_span_mut().unwrap().mode = TimeSpanMode::LastHour;
    panel.set_hidden("owner", true);

    let mut grid = RecordingGrid::default();
    panel.reset(&mut grid).unwrap();

    assert_eq!(panel.get_state(), fresh);
    assert_eq!(grid.loads.len(), 1);
}

#[tokio::test]
async fn test_normal_user_sees_own_requests_first() {
    let session = session().with_properties(vec!["NormalUser".to_string()]);
    let mut panel =
        FilterPanel::new(MonitorDefinition::request_monitor().selector, session).unwrap();
    panel.load_options(&StaticOptions).await;

    let params = panel.query(100, now()).unwrap();
    assert_eq!(params["owner"], r#"["alice"]"#);
}
