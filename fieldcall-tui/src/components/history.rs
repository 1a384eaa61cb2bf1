//! Visit history for the signed-in rep.

use super::step_index;
use crate::session::Session;
use fieldcall_core::{StoreError, VisitRecord};
use fieldcall_storage::VisitQuery;

#[derive(Debug, Clone, Default)]
pub struct VisitHistory {
    pub records: Vec<VisitRecord>,
    pub loading: bool,
    pub highlighted: usize,
    seen_trigger: Option<u64>,
    generation: u64,
}

impl VisitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the list predates the current refresh trigger.
    pub fn needs_reload(&self, trigger: u64) -> bool {
        self.seen_trigger != Some(trigger)
    }

    /// Start a load. Only the result of the latest generation is applied.
    pub fn begin_load(&mut self, trigger: u64, rep_email: &str) -> (u64, VisitQuery) {
        self.generation += 1;
        self.loading = true;
        self.seen_trigger = Some(trigger);
        (self.generation, VisitQuery::for_rep(rep_email))
    }

    pub fn finish_load(
        &mut self,
        generation: u64,
        result: Result<Vec<VisitRecord>, StoreError>,
        session: &mut Session,
    ) {
        if generation != self.generation {
            return;
        }
        self.loading = false;
        match result {
            Ok(records) => {
                self.records = records;
                self.highlighted = self.highlighted.min(self.records.len().saturating_sub(1));
            }
            Err(err) => session.store_error("Failed to load visit history", &err),
        }
    }

    pub fn move_highlight(&mut self, delta: isize) {
        self.highlighted = step_index(self.highlighted, delta, self.records.len());
    }

    pub fn highlighted_record(&self) -> Option<&VisitRecord> {
        self.records.get(self.highlighted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcall_core::StoreOp;
    use fieldcall_test_utils::fixtures;

    #[test]
    fn test_reload_tracks_trigger() {
        let mut history = VisitHistory::new();
        assert!(history.needs_reload(0));
        let (_, query) = history.begin_load(0, fixtures::REP_EMAIL);
        assert_eq!(query.rep_email, fixtures::REP_EMAIL);
        assert_eq!(query.limit, 20);
        assert!(!history.needs_reload(0));
        assert!(history.needs_reload(1));
    }

    #[test]
    fn test_older_generation_is_ignored() {
        let mut history = VisitHistory::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        let (old, _) = history.begin_load(0, fixtures::REP_EMAIL);
        let (new, _) = history.begin_load(1, fixtures::REP_EMAIL);
        history.finish_load(
            old,
            Err(StoreError::Request {
                op: StoreOp::QueryVisits,
                reason: "slow".to_string(),
            }),
            &mut session,
        );
        assert!(history.loading);
        assert!(session.notifications.is_empty());
        history.finish_load(new, Ok(Vec::new()), &mut session);
        assert!(!history.loading);
    }

    #[test]
    fn test_failure_ends_loading_and_keeps_records() {
        let mut history = VisitHistory::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        let (generation, _) = history.begin_load(0, fixtures::REP_EMAIL);
        history.finish_load(
            generation,
            Err(StoreError::Decode {
                op: StoreOp::QueryVisits,
                reason: "bad json".to_string(),
            }),
            &mut session,
        );
        assert!(!history.loading);
        assert!(history.records.is_empty());
        assert_eq!(session.notifications.len(), 1);
    }
}
