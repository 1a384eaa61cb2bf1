//! End-to-end flows through `App` against the in-memory store.

use fieldcall_core::constants::SEARCH_DEBOUNCE_MS;
use fieldcall_core::{StoreError, StoreOp, TargetTier};
use fieldcall_storage::mock::{MockAuth, MockStore};
use fieldcall_storage::TargetSource;
use fieldcall_test_utils::fixtures;
use fieldcall_tui::components::SettingsPane;
use fieldcall_tui::config::TuiConfig;
use fieldcall_tui::events::TuiEvent;
use fieldcall_tui::keys::Action;
use fieldcall_tui::nav::{Focus, View};
use fieldcall_tui::notifications::NotificationLevel;
use fieldcall_tui::state::App;
use fieldcall_tui::tasks::TaskRunner;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

const CONFIG: &str = r#"
api_base_url = "http://localhost:54321"
request_timeout_ms = 10000
tick_rate_ms = 250
toast_ttl_ms = 4000
persistence_path = "state.json"

[auth]
anon_key = "anon-key"

[session]
user_email = "rep@example.com"

[log]
path = "fieldcall.log"
filter = "debug"
json = false

[theme]
name = "dark"
"#;

struct Harness {
    app: App,
    events: mpsc::Receiver<TuiEvent>,
    store: MockStore,
    auth: MockAuth,
    _dir: TempDir,
}

impl Harness {
    fn new(store: MockStore) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = TuiConfig::from_toml(CONFIG).expect("config");
        config.persistence_path = dir.path().join("state.json");
        config.validate().expect("valid config");

        let auth = MockAuth::new();
        let (tx, rx) = mpsc::channel(256);
        let runner = TaskRunner::new(
            Arc::new(store.clone()),
            Arc::new(auth.clone()),
            tx,
            Duration::from_millis(SEARCH_DEBOUNCE_MS),
        );
        Self {
            app: App::new(config, runner),
            events: rx,
            store,
            auth,
            _dir: dir,
        }
    }

    fn seeded() -> Self {
        let (store, _, _) = fixtures::seeded_store();
        Self::new(store)
    }

    fn act(&mut self, action: Action) {
        self.app.handle_action(action);
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.act(Action::Input(c));
        }
    }

    /// Apply store results until nothing arrives for a full second of
    /// (paused) time, which also lets any debounce window elapse.
    async fn settle(&mut self) {
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_secs(1), self.events.recv()).await
        {
            if let TuiEvent::Data(data) = event {
                self.app.apply(data);
            }
        }
    }

    fn latest_level(&self) -> Option<NotificationLevel> {
        self.app.session.notifications.latest().map(|n| n.level)
    }

    fn latest_message(&self) -> String {
        self.app
            .session
            .notifications
            .latest()
            .map(|n| n.message.clone())
            .unwrap_or_default()
    }
}

fn request_error(op: StoreOp) -> StoreError {
    StoreError::Request {
        op,
        reason: "connection reset".to_string(),
    }
}

// ============================================================================
// Startup
// ============================================================================

#[tokio::test(start_paused = true)]
async fn start_loads_feed_and_settings() {
    let mut h = Harness::seeded();
    h.app.start();
    h.settle().await;

    assert_eq!(h.store.calls(StoreOp::QueryTargets), 2);
    assert_eq!(h.store.calls(StoreOp::GetCadenceSettings), 1);
    assert_eq!(h.store.calls(StoreOp::QueryVisits), 0);
    assert_eq!(h.app.feed.targets.len(), 5);
    assert!(!h.app.feed.loading);
    assert_eq!(h.app.settings.tiers.len(), 5);
    assert!(h.app.settings.overrides.is_empty());
}

#[tokio::test(start_paused = true)]
async fn restored_history_view_loads_history_on_start() {
    let mut h = Harness::seeded();
    let mut state = h.app.persisted();
    state.active_view = View::History;
    h.app.restore(state);
    h.app.start();
    h.settle().await;
    assert_eq!(h.store.calls(StoreOp::QueryVisits), 1);
}

// ============================================================================
// Dispensary lookup
// ============================================================================

#[tokio::test(start_paused = true)]
async fn search_waits_for_the_debounce_window() {
    let mut h = Harness::seeded();
    h.app.focus = Focus::Search;
    h.type_text("Sho");

    tokio::time::sleep(Duration::from_millis(SEARCH_DEBOUNCE_MS - 1)).await;
    assert_eq!(h.store.calls(StoreOp::QueryLocations), 0);

    h.settle().await;
    assert_eq!(h.store.calls(StoreOp::QueryLocations), 1);
    assert_eq!(h.app.lookup.results.len(), 5);
    assert!(h.app.lookup.open);
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_issues_one_search() {
    let mut h = Harness::seeded();
    h.app.focus = Focus::Search;
    for c in "Shop 3".chars() {
        h.act(Action::Input(c));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    h.settle().await;

    let queries = h.store.location_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].name_contains, "Shop 3");
    assert_eq!(h.app.lookup.results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn short_queries_never_reach_the_store() {
    let mut h = Harness::seeded();
    h.app.focus = Focus::Search;
    h.type_text("Sh");
    h.settle().await;
    assert_eq!(h.store.calls(StoreOp::QueryLocations), 0);
    assert!(!h.app.lookup.open);
}

#[tokio::test(start_paused = true)]
async fn choosing_a_result_selects_the_location() {
    let mut h = Harness::seeded();
    h.app.focus = Focus::Search;
    h.type_text("Shop 2");
    h.settle().await;
    h.act(Action::Confirm);

    let selected = h.app.recorder.location.as_ref().expect("selected");
    assert_eq!(selected.display_name, "Shop 2");
    assert_eq!(h.app.focus, Focus::Timestamp);
    assert!(!h.app.lookup.open);
}

#[tokio::test(start_paused = true)]
async fn late_target_pick_does_not_replace_typed_choice() {
    let mut h = Harness::seeded();
    h.app.start();
    h.settle().await;

    h.store.set_delay(StoreOp::GetLocation, Duration::from_secs(5));
    h.act(Action::Confirm);
    assert!(h.app.feed.is_pending());

    h.app.focus = Focus::Search;
    h.type_text("Shop 3");
    h.settle().await;
    h.act(Action::Confirm);
    assert!(!h.app.feed.is_pending());

    tokio::time::sleep(Duration::from_secs(6)).await;
    h.settle().await;

    assert_eq!(h.store.calls(StoreOp::GetLocation), 1);
    let selected = h.app.recorder.location.as_ref().expect("selected");
    assert_eq!(selected.display_name, "Shop 3");
    assert_eq!(h.app.lookup.text, "Shop 3");
    assert_eq!(h.app.focus, Focus::Timestamp);
}

// ============================================================================
// Recording visits
// ============================================================================

#[tokio::test(start_paused = true)]
async fn submit_without_location_sends_nothing() {
    let mut h = Harness::seeded();
    h.act(Action::SetNow);
    h.act(Action::Submit);
    h.settle().await;

    assert_eq!(h.store.calls(StoreOp::InsertVisit), 0);
    assert_eq!(h.latest_level(), Some(NotificationLevel::Error));
    assert!(h.latest_message().contains("dispensary"));
    assert!(!h.app.recorder.submitting);
}

#[tokio::test(start_paused = true)]
async fn recorded_visit_refreshes_history_on_next_visit_to_it() {
    let mut h = Harness::seeded();
    h.app.start();
    h.settle().await;

    let expected = h
        .app
        .feed
        .highlighted_target()
        .and_then(|t| t.location_id)
        .expect("matched target");
    h.act(Action::Confirm);
    h.settle().await;
    assert_eq!(
        h.app.recorder.location.as_ref().map(|l| l.location_id),
        Some(expected)
    );
    assert_eq!(h.app.focus, Focus::Timestamp);

    h.type_text("2026-04-19 10:00");
    h.app.focus = Focus::Purpose;
    h.act(Action::MoveRight);
    assert!(h.app.recorder.purpose.is_some());
    h.act(Action::Submit);
    h.settle().await;

    assert_eq!(h.store.visits().len(), 1);
    assert_eq!(h.store.visits()[0].location_id, expected);
    assert_eq!(h.store.visits()[0].rep_email, fixtures::REP_EMAIL);
    assert_eq!(h.latest_level(), Some(NotificationLevel::Success));
    assert_eq!(h.app.refresh_trigger, 1);
    assert_eq!(h.app.focus, Focus::Feed);
    assert!(h.app.recorder.location.is_none());
    assert!(h.app.lookup.text.is_empty());

    h.act(Action::SwitchView(1));
    h.settle().await;
    assert_eq!(h.store.calls(StoreOp::QueryVisits), 1);
    assert_eq!(h.app.history.records.len(), 1);

    h.act(Action::SwitchView(0));
    h.act(Action::SwitchView(1));
    h.settle().await;
    assert_eq!(h.store.calls(StoreOp::QueryVisits), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_insert_keeps_the_form() {
    let (store, locations, _) = fixtures::seeded_store();
    let mut h = Harness::new(store);
    h.app.recorder.location = Some(locations[0].clone());
    h.app.recorder.timestamp = "2026-04-19T10:00".to_string();
    h.app.recorder.cost = "25".to_string();
    h.app.focus = Focus::Purpose;
    h.act(Action::MoveRight);

    h.store
        .fail_next(StoreOp::InsertVisit, request_error(StoreOp::InsertVisit));
    h.act(Action::Submit);
    h.settle().await;

    assert_eq!(h.store.calls(StoreOp::InsertVisit), 1);
    assert!(h.store.visits().is_empty());
    assert_eq!(h.latest_level(), Some(NotificationLevel::Error));
    assert_eq!(h.app.refresh_trigger, 0);
    assert!(h.app.recorder.location.is_some());
    assert_eq!(h.app.recorder.cost, "25");
    assert!(!h.app.recorder.submitting);
}

// ============================================================================
// Feed
// ============================================================================

#[tokio::test(start_paused = true)]
async fn refresh_recomputes_then_reloads_the_feed() {
    let mut h = Harness::seeded();
    h.app.start();
    h.settle().await;
    let loads = h.store.calls(StoreOp::QueryTargets);

    h.act(Action::Refresh);
    h.settle().await;

    assert_eq!(h.store.calls(StoreOp::RefreshDueDates), 1);
    assert_eq!(h.store.calls(StoreOp::QueryTargets), loads + 1);
    assert_eq!(h.latest_level(), Some(NotificationLevel::Success));
    assert!(h.latest_message().contains("targets updated"));
    assert!(!h.app.feed.refreshing);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_does_not_reload() {
    let mut h = Harness::seeded();
    h.store
        .fail_next(StoreOp::RefreshDueDates, request_error(StoreOp::RefreshDueDates));
    h.act(Action::Refresh);
    h.settle().await;

    assert_eq!(h.store.calls(StoreOp::QueryTargets), 0);
    assert_eq!(h.latest_level(), Some(NotificationLevel::Error));
}

#[tokio::test(start_paused = true)]
async fn matching_links_unmatched_targets() {
    let (store, _, _) = fixtures::seeded_store();
    let location = fixtures::location("Green Leaf");
    let mut target = fixtures::target("Green Leaf", TargetTier::GrowthExpansion, 5.0);
    target.location_id = None;
    store.insert_location(location.clone());
    store.insert_target(target.clone());

    let mut h = Harness::new(store);
    h.act(Action::MatchLocations);
    h.settle().await;

    assert_eq!(
        h.store.target(target.target_id).and_then(|t| t.location_id),
        Some(location.location_id)
    );
    assert_eq!(h.latest_message(), "Matched 1 targets to dispensaries");
    assert_eq!(h.store.calls(StoreOp::QueryTargets), 1);
}

#[tokio::test(start_paused = true)]
async fn due_only_toggle_reloads_with_new_source() {
    let mut h = Harness::seeded();
    h.app.start();
    h.settle().await;
    h.act(Action::ToggleDueOnly);
    h.settle().await;

    // Seeded targets were never visited, so every one is due.
    assert_eq!(h.app.feed.targets.len(), 5);
    assert_eq!(h.app.persisted().source, h.app.feed.source);
    assert_eq!(h.store.calls(StoreOp::QueryTargets), 3);
}

#[tokio::test(start_paused = true)]
async fn slow_feed_load_does_not_overwrite_newer_source() {
    let (store, _, mut targets) = fixtures::seeded_store();
    let mut visited = targets.remove(4);
    visited.cadence.last_visit_date = Some(fixtures::today() - chrono::Duration::days(1));
    store.insert_target(visited);
    let mut h = Harness::new(store);

    h.store.set_delay(StoreOp::QueryTargets, Duration::from_secs(3));
    h.app.start();
    // Let the start-up loads reach the store before the delay is lifted.
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.store.set_delay(StoreOp::QueryTargets, Duration::ZERO);
    h.act(Action::ToggleDueOnly);

    tokio::time::sleep(Duration::from_secs(5)).await;
    h.settle().await;

    assert_eq!(h.app.feed.source, TargetSource::DueOnly);
    assert_eq!(h.app.feed.targets.len(), 4);
    assert!(h
        .app
        .feed
        .targets
        .iter()
        .all(|t| t.cadence.cadence_status.is_some_and(|s| s.needs_visit())));
    assert!(!h.app.feed.loading);
}

// ============================================================================
// Cadence settings
// ============================================================================

#[tokio::test(start_paused = true)]
async fn failed_default_save_keeps_the_draft() {
    let mut h = Harness::seeded();
    h.app.start();
    h.settle().await;
    h.act(Action::SwitchView(2));

    let before = h.app.settings.tiers[0].setting.clone();
    for _ in 0..3 {
        h.act(Action::Backspace);
    }
    h.type_text("21");

    h.store.fail_next(
        StoreOp::UpdateCadenceSetting,
        request_error(StoreOp::UpdateCadenceSetting),
    );
    h.act(Action::Submit);
    h.settle().await;

    let row = &h.app.settings.tiers[0];
    assert_eq!(row.draft, "21");
    assert_eq!(row.setting.default_cadence_days, before.default_cadence_days);
    assert!(row.is_dirty());
    assert!(!row.saving);
    assert_eq!(h.latest_level(), Some(NotificationLevel::Error));

    h.act(Action::Submit);
    h.settle().await;
    assert_eq!(h.app.settings.tiers[0].setting.default_cadence_days, 21);
    assert_eq!(
        h.store
            .setting(before.setting_id)
            .map(|s| s.default_cadence_days),
        Some(21)
    );
    assert!(!h.app.settings.tiers[0].is_dirty());
}

#[tokio::test(start_paused = true)]
async fn invalid_default_is_rejected_locally() {
    let mut h = Harness::seeded();
    h.app.start();
    h.settle().await;
    h.act(Action::SwitchView(2));
    for _ in 0..3 {
        h.act(Action::Backspace);
    }
    h.type_text("0");
    h.act(Action::Submit);
    h.settle().await;

    assert_eq!(h.store.calls(StoreOp::UpdateCadenceSetting), 0);
    assert_eq!(h.latest_level(), Some(NotificationLevel::Error));
}

#[tokio::test(start_paused = true)]
async fn removing_an_override_clears_it_and_reloads() {
    let (store, _, targets) = fixtures::seeded_store();
    let mut custom = targets[3].clone();
    custom.cadence.custom_cadence_days = Some(10);
    custom.visit_notes = Some("Owner prefers Tuesdays".to_string());
    store.insert_target(custom.clone());

    let mut h = Harness::new(store);
    h.app.start();
    h.settle().await;
    assert_eq!(h.app.settings.overrides.len(), 1);

    h.act(Action::SwitchView(2));
    h.act(Action::MoveRight);
    assert_eq!(h.app.settings.pane, SettingsPane::Overrides);
    h.act(Action::Remove);
    h.settle().await;

    let stored = h.store.target(custom.target_id).expect("target");
    assert_eq!(stored.cadence.custom_cadence_days, None);
    assert_eq!(stored.visit_notes, None);
    assert!(h.app.settings.overrides.is_empty());
    assert_eq!(h.latest_level(), Some(NotificationLevel::Success));
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test(start_paused = true)]
async fn sign_out_ends_the_session() {
    let mut h = Harness::seeded();
    h.act(Action::SignOut);
    h.settle().await;
    assert!(h.auth.is_signed_out());
    assert!(!h.app.session.is_active());
    assert!(h.app.should_quit);
}

#[tokio::test(start_paused = true)]
async fn failed_sign_out_keeps_the_session() {
    let mut h = Harness::seeded();
    h.auth.fail_next(request_error(StoreOp::SignOut));
    h.act(Action::SignOut);
    h.settle().await;
    assert!(h.app.session.is_active());
    assert!(!h.app.should_quit);
    assert_eq!(h.latest_level(), Some(NotificationLevel::Error));
}

#[tokio::test(start_paused = true)]
async fn unexpected_errors_show_a_generic_message() {
    let mut h = Harness::seeded();
    h.store.fail_next(
        StoreOp::QueryTargets,
        StoreError::Unexpected {
            op: StoreOp::QueryTargets,
            reason: "stack trace".to_string(),
        },
    );
    h.app.start();
    h.settle().await;
    let messages: Vec<String> = h
        .app
        .session
        .notifications
        .iter()
        .map(|n| n.message.clone())
        .collect();
    assert!(messages.iter().any(|m| m == "An unexpected error occurred"));
    assert!(messages.iter().all(|m| !m.contains("stack trace")));
}

#[tokio::test]
async fn persisted_state_round_trips_through_disk() {
    let mut h = Harness::seeded();
    h.act(Action::SwitchView(2));
    h.app.feed.region = Some("Portland Metro".to_string());
    let state = h.app.persisted();

    let path = h.app.config.persistence_path.clone();
    fieldcall_tui::persistence::save(&path, &state).expect("save");
    let loaded = fieldcall_tui::persistence::load(&path)
        .expect("load")
        .expect("state present");
    assert_eq!(loaded, state);
    assert_eq!(loaded.active_view, View::CadenceSettings);
}
