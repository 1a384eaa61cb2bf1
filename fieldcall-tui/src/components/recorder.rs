//! Visit recorder form.

use crate::nav::Focus;
use crate::session::Session;
use chrono::{DateTime, TimeZone};
use fieldcall_core::validation::{
    format_local_timestamp, optional_text, parse_cost, parse_visit_timestamp,
};
use fieldcall_core::{Location, NewVisit, StoreError, ValidationError, Visit, VisitPurpose};

#[derive(Debug, Clone, Default)]
pub struct VisitRecorder {
    pub location: Option<Location>,
    pub timestamp: String,
    pub purpose: Option<VisitPurpose>,
    pub samples: String,
    pub cost: String,
    pub notes: String,
    pub submitting: bool,
}

impl VisitRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_location(&mut self, location: Option<Location>) {
        self.location = location;
    }

    /// Fill the timestamp with the given moment in its own timezone.
    pub fn set_now<Tz: TimeZone>(&mut self, now: DateTime<Tz>)
    where
        Tz::Offset: std::fmt::Display,
    {
        self.timestamp = format_local_timestamp(&now);
    }

    pub fn cycle_purpose(&mut self, forward: bool) {
        let all = VisitPurpose::all();
        let next = match self.purpose.and_then(|p| all.iter().position(|x| *x == p)) {
            None if forward => 0,
            None => all.len() - 1,
            Some(idx) if forward => (idx + 1) % all.len(),
            Some(idx) => (idx + all.len() - 1) % all.len(),
        };
        self.purpose = Some(all[next]);
    }

    /// The text buffer behind a form field, if it has one.
    pub fn field_mut(&mut self, focus: Focus) -> Option<&mut String> {
        match focus {
            Focus::Timestamp => Some(&mut self.timestamp),
            Focus::Samples => Some(&mut self.samples),
            Focus::Cost => Some(&mut self.cost),
            Focus::Notes => Some(&mut self.notes),
            Focus::Feed | Focus::Search | Focus::Purpose => None,
        }
    }

    /// Validate the form into an insert payload. Timestamps are read in `tz`.
    pub fn build<Tz: TimeZone>(&self, rep_email: &str, tz: &Tz) -> Result<NewVisit, ValidationError> {
        let location = self
            .location
            .as_ref()
            .ok_or_else(|| ValidationError::missing("dispensary"))?;
        let visit_timestamp = parse_visit_timestamp(&self.timestamp, tz)?;
        let purpose = self
            .purpose
            .ok_or_else(|| ValidationError::missing("visit_purpose"))?;
        let estimated_cost = parse_cost(&self.cost)?;
        Ok(NewVisit {
            rep_email: rep_email.to_string(),
            location_id: location.location_id,
            visit_timestamp,
            purpose,
            samples_given: optional_text(&self.samples),
            notes: optional_text(&self.notes),
            estimated_cost,
        })
    }

    /// Validate and mark the form as submitting. `None` means nothing should
    /// be sent: a submit is already in flight or the form is invalid.
    pub fn begin_submit<Tz: TimeZone>(
        &mut self,
        session: &mut Session,
        tz: &Tz,
    ) -> Option<NewVisit> {
        if self.submitting {
            return None;
        }
        match self.build(&session.user_email, tz) {
            Ok(visit) => {
                self.submitting = true;
                Some(visit)
            }
            Err(err) => {
                tracing::debug!(field = err.field(), error = %err, "Visit form rejected");
                session.error(err.to_string());
                None
            }
        }
    }

    /// Returns `true` when the visit was stored. The form is reset then;
    /// on failure every field is kept for a retry.
    pub fn finish_submit(&mut self, result: Result<Visit, StoreError>, session: &mut Session) -> bool {
        self.submitting = false;
        match result {
            Ok(_) => {
                session.success("Visit recorded successfully");
                self.reset();
                true
            }
            Err(err) => {
                session.store_error("Failed to record visit", &err);
                false
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use fieldcall_core::StoreOp;
    use fieldcall_test_utils::fixtures;

    fn pacific() -> FixedOffset {
        FixedOffset::west_opt(7 * 3600).expect("offset")
    }

    fn filled() -> VisitRecorder {
        VisitRecorder {
            location: Some(fixtures::location("Canopy")),
            timestamp: "2026-04-20T09:30".to_string(),
            purpose: Some(VisitPurpose::ProductDemo),
            samples: " 2 gummies ".to_string(),
            cost: "$1,250.50".to_string(),
            notes: String::new(),
            submitting: false,
        }
    }

    #[test]
    fn test_build_converts_local_time_and_optional_fields() {
        let visit = filled().build(fixtures::REP_EMAIL, &pacific()).expect("valid");
        assert_eq!(visit.visit_timestamp.to_rfc3339(), "2026-04-20T16:30:00+00:00");
        assert_eq!(visit.samples_given.as_deref(), Some("2 gummies"));
        assert_eq!(visit.notes, None);
        assert_eq!(visit.estimated_cost, Some(1250.5));
    }

    #[test]
    fn test_missing_location_is_reported_first() {
        let mut form = filled();
        form.location = None;
        form.purpose = None;
        let err = form.build(fixtures::REP_EMAIL, &pacific()).unwrap_err();
        assert_eq!(err.field(), "dispensary");
    }

    #[test]
    fn test_missing_purpose_and_bad_cost() {
        let mut form = filled();
        form.purpose = None;
        assert_eq!(
            form.build(fixtures::REP_EMAIL, &pacific()).unwrap_err().field(),
            "visit_purpose"
        );
        let mut form = filled();
        form.cost = "about ten".to_string();
        assert_eq!(
            form.build(fixtures::REP_EMAIL, &pacific()).unwrap_err().field(),
            "estimated_cost"
        );
    }

    #[test]
    fn test_begin_submit_blocks_double_submit() {
        let mut form = filled();
        let mut session = Session::new(fixtures::REP_EMAIL);
        assert!(form.begin_submit(&mut session, &Utc).is_some());
        assert!(form.begin_submit(&mut session, &Utc).is_none());
    }

    #[test]
    fn test_success_resets_and_failure_keeps_fields() {
        let mut session = Session::new(fixtures::REP_EMAIL);
        let mut form = filled();
        let payload = form.begin_submit(&mut session, &Utc).expect("payload");

        let failed = form.finish_submit(
            Err(StoreError::Rejected {
                op: StoreOp::InsertVisit,
                status: 409,
                message: "violates foreign key".to_string(),
            }),
            &mut session,
        );
        assert!(!failed);
        assert!(form.location.is_some());
        assert!(!form.submitting);

        form.begin_submit(&mut session, &Utc);
        let stored = Visit {
            visit_id: fieldcall_core::VisitId::now_v7(),
            rep_email: payload.rep_email.clone(),
            location_id: payload.location_id,
            visit_timestamp: payload.visit_timestamp,
            purpose: payload.purpose,
            samples_given: payload.samples_given.clone(),
            notes: None,
            estimated_cost: payload.estimated_cost,
            analysis_status: fieldcall_core::AnalysisStatus::Pending,
            created_at: None,
        };
        assert!(form.finish_submit(Ok(stored), &mut session));
        assert!(form.location.is_none());
        assert!(form.timestamp.is_empty());
        assert!(form.purpose.is_none());
        assert!(form.cost.is_empty());
    }

    #[test]
    fn test_cycle_purpose_wraps_both_ways() {
        let mut form = VisitRecorder::new();
        form.cycle_purpose(false);
        assert_eq!(form.purpose, Some(VisitPurpose::Other));
        form.cycle_purpose(true);
        assert_eq!(form.purpose, Some(VisitPurpose::ProductDemo));
    }

    #[test]
    fn test_set_now_produces_parseable_timestamp() {
        let mut form = filled();
        let now = Utc::now().with_timezone(&pacific());
        form.set_now(now);
        assert!(form.build(fixtures::REP_EMAIL, &pacific()).is_ok());
    }
}
