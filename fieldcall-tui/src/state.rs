//! Application state: screens, focus, and the glue between key actions,
//! components, and background store calls.

use crate::components::{
    CadenceSettingsEditor, DispensaryLookup, LookupAction, SettingsPane, TargetFeed, VisitHistory,
    VisitRecorder,
};
use crate::config::TuiConfig;
use crate::events::{DataEvent, OverrideChange};
use crate::keys::Action;
use crate::nav::{Focus, View};
use crate::persistence::PersistedState;
use crate::session::Session;
use crate::tasks::TaskRunner;
use crate::theme::Theme;
use chrono::{DateTime, Local, Utc};

pub struct App {
    pub config: TuiConfig,
    pub theme: Theme,
    pub session: Session,
    pub active_view: View,
    pub focus: Focus,

    pub lookup: DispensaryLookup,
    pub feed: TargetFeed,
    pub recorder: VisitRecorder,
    pub history: VisitHistory,
    pub settings: CadenceSettingsEditor,

    /// Bumped after every recorded visit; history reloads when it moves.
    pub refresh_trigger: u64,
    pub show_help: bool,
    pub should_quit: bool,

    runner: TaskRunner,
}

impl App {
    pub fn new(config: TuiConfig, runner: TaskRunner) -> Self {
        let theme = Theme::from_name(&config.theme.name).unwrap_or_else(Theme::dark);
        let session = Session::new(config.session.user_email.trim());
        Self {
            config,
            theme,
            session,
            active_view: View::NewVisit,
            focus: Focus::Feed,
            lookup: DispensaryLookup::new(),
            feed: TargetFeed::new(),
            recorder: VisitRecorder::new(),
            history: VisitHistory::new(),
            settings: CadenceSettingsEditor::new(),
            refresh_trigger: 0,
            show_help: false,
            should_quit: false,
            runner,
        }
    }

    pub fn restore(&mut self, state: PersistedState) {
        self.active_view = state.active_view;
        self.feed.tab = state.feed_tab;
        self.feed.region = state.region;
        self.feed.source = state.source;
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
            feed_tab: self.feed.tab,
            region: self.feed.region.clone(),
            source: self.feed.source,
        }
    }

    /// Initial loads for the feed, the cadence settings, and the active screen.
    pub fn start(&mut self) {
        tracing::info!(user = %self.session.user_email, "Session started");
        self.load_feed();
        self.load_settings();
        if self.active_view == View::History {
            self.load_history();
        }
    }

    /// How long a toast stays on screen.
    pub fn toast_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.config.toast_ttl_ms).unwrap_or(i64::MAX))
    }

    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        let ttl = self.toast_ttl();
        self.session.notifications.prune(now, ttl);
    }

    pub fn switch_view(&mut self, view: View) {
        self.active_view = view;
        self.lookup.close();
        if view == View::History && self.history.needs_reload(self.refresh_trigger) {
            self.load_history();
        }
    }

    // ========================================================================
    // Loads
    // ========================================================================

    fn load_feed(&mut self) {
        let (generation, query) = self.feed.begin_load();
        self.runner.load_targets(generation, query);
    }

    fn load_settings(&mut self) {
        self.settings.begin_load_settings();
        self.runner.load_cadence_settings();
        self.load_overrides();
    }

    fn load_overrides(&mut self) {
        self.settings.begin_load_overrides();
        self.runner.load_overrides();
    }

    fn load_history(&mut self) {
        let (generation, query) = self
            .history
            .begin_load(self.refresh_trigger, &self.session.user_email);
        self.runner.load_history(generation, query);
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::SignOut => {
                self.runner.sign_out();
                return;
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                return;
            }
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.switch_view(view);
                }
                return;
            }
            _ => {}
        }

        match self.active_view {
            View::NewVisit => self.handle_visit_action(action),
            View::History => self.handle_history_action(action),
            View::CadenceSettings => self.handle_settings_action(action),
        }
    }

    fn handle_visit_action(&mut self, action: Action) {
        match action {
            Action::NextField | Action::PrevField => {
                if self.focus == Focus::Search {
                    self.lookup.close();
                }
                self.focus = if action == Action::NextField {
                    self.focus.next()
                } else {
                    self.focus.previous()
                };
            }
            Action::Refresh => {
                if self.feed.begin_refresh() {
                    self.runner.refresh_due_dates();
                }
            }
            Action::MatchLocations => {
                if self.feed.begin_match() {
                    self.runner.match_locations();
                }
            }
            Action::ToggleDueOnly => {
                let (generation, query) = self.feed.toggle_source();
                self.runner.load_targets(generation, query);
            }
            Action::CycleRegion => self.feed.cycle_region(),
            Action::SetNow => self.recorder.set_now(Local::now()),
            Action::Submit => self.submit_visit(),
            _ => match self.focus {
                Focus::Feed => self.handle_feed_action(action),
                Focus::Search => self.handle_search_action(action),
                Focus::Purpose => self.handle_purpose_action(action),
                Focus::Timestamp | Focus::Samples | Focus::Cost | Focus::Notes => {
                    self.handle_text_action(action)
                }
            },
        }
    }

    fn handle_feed_action(&mut self, action: Action) {
        match action {
            Action::MoveUp => self.feed.move_highlight(-1),
            Action::MoveDown => self.feed.move_highlight(1),
            Action::MoveLeft => self.feed.previous_tab(),
            Action::MoveRight => self.feed.next_tab(),
            Action::Confirm => {
                if let Some((target_id, location_id)) = self.feed.begin_select(&mut self.session) {
                    self.runner.resolve_target_location(target_id, location_id);
                }
            }
            _ => {}
        }
    }

    fn handle_search_action(&mut self, action: Action) {
        let input = match action {
            Action::Input(c) => self.lookup.push_char(c),
            Action::Backspace => self.lookup.backspace(),
            Action::MoveUp => return self.lookup.move_highlight(-1),
            Action::MoveDown => return self.lookup.move_highlight(1),
            Action::Cancel => return self.lookup.close(),
            Action::Confirm => {
                if let Some(location) = self.lookup.select_highlighted() {
                    self.feed.cancel_select();
                    self.runner.cancel_search();
                    self.recorder.set_location(Some(location));
                    self.focus = Focus::Timestamp;
                }
                return;
            }
            _ => return,
        };
        // Typing a dispensary by hand supersedes a target still opening.
        self.feed.cancel_select();
        if input.deselect {
            self.recorder.set_location(None);
        }
        match input.action {
            LookupAction::Clear => self.runner.cancel_search(),
            LookupAction::Search { seq, query } => self.runner.search_locations(seq, query),
        }
    }

    fn handle_purpose_action(&mut self, action: Action) {
        match action {
            Action::MoveRight | Action::MoveDown | Action::Confirm | Action::Input(' ') => {
                self.recorder.cycle_purpose(true)
            }
            Action::MoveLeft | Action::MoveUp => self.recorder.cycle_purpose(false),
            _ => {}
        }
    }

    fn handle_text_action(&mut self, action: Action) {
        let Some(field) = self.recorder.field_mut(self.focus) else {
            return;
        };
        match action {
            Action::Input(c) => field.push(c),
            Action::Backspace => {
                field.pop();
            }
            Action::Confirm => {
                if self.focus == Focus::Notes {
                    self.submit_visit();
                } else {
                    self.focus = self.focus.next();
                }
            }
            _ => {}
        }
    }

    fn submit_visit(&mut self) {
        if let Some(visit) = self.recorder.begin_submit(&mut self.session, &Local) {
            tracing::info!(location_id = %visit.location_id, purpose = %visit.purpose, "Submitting visit");
            self.runner.insert_visit(visit);
        }
    }

    fn handle_history_action(&mut self, action: Action) {
        match action {
            Action::MoveUp => self.history.move_highlight(-1),
            Action::MoveDown => self.history.move_highlight(1),
            Action::Refresh => self.load_history(),
            _ => {}
        }
    }

    fn handle_settings_action(&mut self, action: Action) {
        match action {
            Action::MoveUp => self.settings.move_highlight(-1),
            Action::MoveDown => self.settings.move_highlight(1),
            Action::MoveLeft | Action::MoveRight => self.settings.switch_pane(),
            Action::NextField | Action::PrevField => self.settings.next_field(),
            Action::Input(c) => {
                if let Some(draft) = self.settings.active_draft_mut() {
                    draft.push(c);
                }
            }
            Action::Backspace => {
                if let Some(draft) = self.settings.active_draft_mut() {
                    draft.pop();
                }
            }
            Action::Cancel => self.settings.revert_active(),
            Action::Confirm | Action::Submit => self.save_settings_row(),
            Action::Remove => {
                if self.settings.pane == SettingsPane::Overrides {
                    let index = self.settings.override_highlight;
                    if let Some((target_id, update)) = self.settings.begin_remove_override(index) {
                        self.runner
                            .save_override(target_id, OverrideChange::Removed, update);
                    }
                }
            }
            Action::Refresh => self.load_settings(),
            _ => {}
        }
    }

    fn save_settings_row(&mut self) {
        match self.settings.pane {
            SettingsPane::TierDefaults => {
                let index = self.settings.tier_highlight;
                if let Some((setting_id, update)) =
                    self.settings
                        .begin_save_default(index, Utc::now(), &mut self.session)
                {
                    self.runner.save_cadence_setting(setting_id, update);
                }
            }
            SettingsPane::Overrides => {
                let index = self.settings.override_highlight;
                if let Some((target_id, update)) =
                    self.settings.begin_save_override(index, &mut self.session)
                {
                    self.runner
                        .save_override(target_id, OverrideChange::Saved, update);
                }
            }
        }
    }

    // ========================================================================
    // Results
    // ========================================================================

    pub fn apply(&mut self, event: DataEvent) {
        match event {
            DataEvent::LocationsFound { seq, result } => {
                self.lookup.apply_results(seq, result, &mut self.session);
            }
            DataEvent::TargetsLoaded { generation, result } => {
                self.feed.finish_load(generation, result, &mut self.session);
            }
            DataEvent::DueDatesRefreshed(result) => {
                if self.feed.finish_refresh(result, &mut self.session) {
                    self.load_feed();
                }
            }
            DataEvent::LocationsMatched(result) => {
                if self.feed.finish_match(result, &mut self.session) {
                    self.load_feed();
                }
            }
            DataEvent::TargetLocationResolved { target_id, result } => {
                if let Some(location) = self.feed.finish_select(target_id, result, &mut self.session) {
                    self.runner.cancel_search();
                    self.lookup.show_selection(&location);
                    self.recorder.set_location(Some(location));
                    self.focus = Focus::Timestamp;
                }
            }
            DataEvent::VisitRecorded(result) => {
                if self.recorder.finish_submit(result, &mut self.session) {
                    self.lookup.clear();
                    self.refresh_trigger += 1;
                    self.focus = Focus::Feed;
                    if self.active_view == View::History {
                        self.load_history();
                    }
                }
            }
            DataEvent::HistoryLoaded { generation, result } => {
                self.history.finish_load(generation, result, &mut self.session);
            }
            DataEvent::CadenceSettingsLoaded(result) => {
                self.settings.finish_settings(result, &mut self.session);
            }
            DataEvent::OverridesLoaded(result) => {
                self.settings.finish_overrides(result, &mut self.session);
            }
            DataEvent::CadenceSettingSaved {
                setting_id,
                days,
                result,
            } => {
                self.settings
                    .finish_save_default(setting_id, days, result, &mut self.session);
            }
            DataEvent::OverrideSaved {
                target_id,
                change,
                result,
            } => {
                if self
                    .settings
                    .finish_override(target_id, change, result, &mut self.session)
                {
                    self.load_overrides();
                }
            }
            DataEvent::SignedOut(result) => match result {
                Ok(()) => {
                    tracing::info!(user = %self.session.user_email, "Session ended");
                    self.session.end();
                    self.should_quit = true;
                }
                Err(err) => self.session.store_error("Sign out failed", &err),
            },
        }
    }
}
