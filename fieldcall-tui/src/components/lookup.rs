//! Dispensary lookup: type-ahead search over location names.

use super::step_index;
use crate::session::Session;
use fieldcall_core::constants::SEARCH_MIN_CHARS;
use fieldcall_core::{Location, LocationId, StoreError};

/// What the caller should do after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupAction {
    /// Too short to search: cancel any pending search.
    Clear,
    /// Schedule a debounced search tagged with `seq`.
    Search { seq: u64, query: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupInput {
    pub action: LookupAction,
    /// The edit discarded a previous selection.
    pub deselect: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DispensaryLookup {
    pub text: String,
    pub results: Vec<Location>,
    pub open: bool,
    pub loading: bool,
    pub highlighted: usize,
    seq: u64,
    selected: Option<LocationId>,
}

impl DispensaryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn selected(&self) -> Option<LocationId> {
        self.selected
    }

    pub fn push_char(&mut self, c: char) -> LookupInput {
        let mut text = std::mem::take(&mut self.text);
        text.push(c);
        self.set_text(text)
    }

    pub fn backspace(&mut self) -> LookupInput {
        let mut text = std::mem::take(&mut self.text);
        text.pop();
        self.set_text(text)
    }

    /// Replace the query text. Every edit bumps the sequence so results of
    /// earlier queries are discarded when they arrive.
    pub fn set_text(&mut self, text: String) -> LookupInput {
        self.text = text;
        self.seq += 1;
        let deselect = self.selected.take().is_some();
        let query = self.text.trim();
        if query.chars().count() < SEARCH_MIN_CHARS {
            self.results.clear();
            self.open = false;
            self.loading = false;
            self.highlighted = 0;
            return LookupInput {
                action: LookupAction::Clear,
                deselect,
            };
        }
        self.loading = true;
        LookupInput {
            action: LookupAction::Search {
                seq: self.seq,
                query: query.to_string(),
            },
            deselect,
        }
    }

    /// Apply search results. Returns `false` when they were stale.
    pub fn apply_results(
        &mut self,
        seq: u64,
        result: Result<Vec<Location>, StoreError>,
        session: &mut Session,
    ) -> bool {
        if seq != self.seq {
            tracing::debug!(seq, current = self.seq, "Dropping stale location results");
            return false;
        }
        self.loading = false;
        match result {
            Ok(locations) => {
                self.results = locations;
                self.highlighted = 0;
                self.open = true;
            }
            Err(err) => session.store_error("Dispensary search failed", &err),
        }
        true
    }

    pub fn move_highlight(&mut self, delta: isize) {
        self.highlighted = step_index(self.highlighted, delta, self.results.len());
    }

    pub fn highlighted_location(&self) -> Option<&Location> {
        if !self.open {
            return None;
        }
        self.results.get(self.highlighted)
    }

    /// Select the highlighted result and close the list.
    pub fn select_highlighted(&mut self) -> Option<Location> {
        let location = self.highlighted_location()?.clone();
        self.show_selection(&location);
        Some(location)
    }

    /// Show a location chosen elsewhere (e.g. from the target feed).
    pub fn show_selection(&mut self, location: &Location) {
        self.text = location.display_name.clone();
        self.seq += 1;
        self.selected = Some(location.location_id);
        self.results.clear();
        self.open = false;
        self.loading = false;
        self.highlighted = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn clear(&mut self) {
        let seq = self.seq + 1;
        *self = Self::default();
        self.seq = seq;
    }
}
