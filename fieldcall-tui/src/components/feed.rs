//! Target feed: matched targets by priority, split into tier tabs.

use super::step_index;
use crate::session::Session;
use fieldcall_core::constants::EXCLUDED_REGION;
use fieldcall_core::{FeedTab, Location, LocationId, StoreError, Target, TargetId};
use fieldcall_storage::{TargetQuery, TargetSource};
use std::collections::BTreeSet;

/// Targets of one tab, in feed order, optionally limited to a region.
pub fn partition<'a>(targets: &'a [Target], tab: FeedTab, region: Option<&str>) -> Vec<&'a Target> {
    targets
        .iter()
        .filter(|t| tab.contains(t.tier))
        .filter(|t| match region {
            Some(region) => t.region.as_deref() == Some(region),
            None => true,
        })
        .collect()
}

/// Distinct regions of the loaded targets, sorted, without the catch-all.
pub fn regions(targets: &[Target]) -> Vec<String> {
    targets
        .iter()
        .filter_map(|t| t.region.as_deref())
        .filter(|r| *r != EXCLUDED_REGION)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct TargetFeed {
    pub targets: Vec<Target>,
    pub tab: FeedTab,
    pub region: Option<String>,
    pub source: TargetSource,
    pub highlighted: usize,
    pub loading: bool,
    pub refreshing: bool,
    pub matching: bool,
    pending_target: Option<TargetId>,
    generation: u64,
}

impl TargetFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> Vec<&Target> {
        partition(&self.targets, self.tab, self.region.as_deref())
    }

    pub fn regions(&self) -> Vec<String> {
        regions(&self.targets)
    }

    /// Count per tab under the current region filter.
    pub fn tab_counts(&self) -> Vec<(FeedTab, usize)> {
        FeedTab::all()
            .iter()
            .map(|tab| (*tab, partition(&self.targets, *tab, self.region.as_deref()).len()))
            .collect()
    }

    pub fn highlighted_target(&self) -> Option<&Target> {
        self.visible().get(self.highlighted).copied()
    }

    pub fn is_pending(&self) -> bool {
        self.pending_target.is_some()
    }

    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.visible().len();
        self.highlighted = step_index(self.highlighted, delta, len);
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
        self.highlighted = 0;
    }

    pub fn previous_tab(&mut self) {
        self.tab = self.tab.previous();
        self.highlighted = 0;
    }

    /// All regions, then each region in order, then back to all.
    pub fn cycle_region(&mut self) {
        let regions = self.regions();
        self.region = match &self.region {
            None => regions.first().cloned(),
            Some(current) => regions
                .iter()
                .position(|r| r == current)
                .and_then(|idx| regions.get(idx + 1))
                .cloned(),
        };
        self.highlighted = 0;
    }

    pub fn toggle_source(&mut self) -> (u64, TargetQuery) {
        self.source = match self.source {
            TargetSource::Available => TargetSource::DueOnly,
            TargetSource::DueOnly => TargetSource::Available,
        };
        self.begin_load()
    }

    /// Start a load. Only the result of the latest generation is applied.
    pub fn begin_load(&mut self) -> (u64, TargetQuery) {
        self.generation += 1;
        self.loading = true;
        (self.generation, TargetQuery::feed(self.source))
    }

    pub fn finish_load(
        &mut self,
        generation: u64,
        result: Result<Vec<Target>, StoreError>,
        session: &mut Session,
    ) {
        if generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "Dropping stale feed load");
            return;
        }
        self.loading = false;
        match result {
            Ok(targets) => {
                tracing::debug!(count = targets.len(), source = ?self.source, "Feed loaded");
                self.targets = targets;
                if let Some(region) = &self.region {
                    if !self.regions().contains(region) {
                        self.region = None;
                    }
                }
                let len = self.visible().len();
                if self.highlighted >= len {
                    self.highlighted = len.saturating_sub(1);
                }
            }
            Err(err) => session.store_error("Failed to load targets", &err),
        }
    }

    /// Start resolving the highlighted target's location.
    pub fn begin_select(&mut self, session: &mut Session) -> Option<(TargetId, LocationId)> {
        let target = self.highlighted_target()?;
        let Some(location_id) = target.location_id else {
            session.warn(format!("{} has no matched dispensary", target.name));
            return None;
        };
        let target_id = target.target_id;
        self.pending_target = Some(target_id);
        Some((target_id, location_id))
    }

    /// Forget the pending pick, so its result is ignored when it arrives.
    pub fn cancel_select(&mut self) {
        self.pending_target = None;
    }

    /// Finish a selection. Results for anything but the latest pick are ignored.
    pub fn finish_select(
        &mut self,
        target_id: TargetId,
        result: Result<Location, StoreError>,
        session: &mut Session,
    ) -> Option<Location> {
        if self.pending_target != Some(target_id) {
            return None;
        }
        self.pending_target = None;
        match result {
            Ok(location) => Some(location),
            Err(err) => {
                session.store_error("Failed to load dispensary details", &err);
                None
            }
        }
    }

    pub fn begin_refresh(&mut self) -> bool {
        if self.refreshing {
            return false;
        }
        self.refreshing = true;
        true
    }

    /// Returns `true` when the list should be re-fetched.
    pub fn finish_refresh(&mut self, result: Result<u64, StoreError>, session: &mut Session) -> bool {
        self.refreshing = false;
        match result {
            Ok(count) => {
                session.success(format!("{} targets updated", count));
                true
            }
            Err(err) => {
                session.store_error("Failed to refresh due dates", &err);
                false
            }
        }
    }

    pub fn begin_match(&mut self) -> bool {
        if self.matching {
            return false;
        }
        self.matching = true;
        true
    }

    /// Returns `true` when the list should be re-fetched.
    pub fn finish_match(&mut self, result: Result<u64, StoreError>, session: &mut Session) -> bool {
        self.matching = false;
        match result {
            Ok(count) => {
                session.success(format!("Matched {} targets to dispensaries", count));
                true
            }
            Err(err) => {
                session.store_error("Dispensary matching failed", &err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcall_core::{StoreOp, TargetTier};
    use fieldcall_test_utils::fixtures;
    use fieldcall_test_utils::generators::arb_targets;
    use proptest::prelude::*;

    fn in_region(mut target: Target, region: &str) -> Target {
        target.region = Some(region.to_string());
        target
    }

    // ========================================================================
    // Partitioning
    // ========================================================================

    #[test]
    fn test_vip_tab_holds_both_vip_tiers() {
        let targets = vec![
            fixtures::target("A", TargetTier::VipConversion, 90.0),
            fixtures::target("B", TargetTier::Maintenance, 80.0),
            fixtures::target("C", TargetTier::VipExpansion, 70.0),
        ];
        let vip: Vec<&str> = partition(&targets, FeedTab::Vip, None)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(vip, vec!["A", "C"]);
        assert_eq!(partition(&targets, FeedTab::Maintain, None).len(), 1);
        assert!(partition(&targets, FeedTab::Grow, None).is_empty());
    }

    #[test]
    fn test_regions_exclude_catch_all() {
        let targets = vec![
            in_region(fixtures::target("A", TargetTier::Maintenance, 1.0), "Willamette Valley"),
            in_region(fixtures::target("B", TargetTier::Maintenance, 1.0), EXCLUDED_REGION),
            in_region(fixtures::target("C", TargetTier::Maintenance, 1.0), "Central Oregon"),
            in_region(fixtures::target("D", TargetTier::Maintenance, 1.0), "Central Oregon"),
        ];
        assert_eq!(regions(&targets), vec!["Central Oregon", "Willamette Valley"]);
    }

    #[test]
    fn test_cycle_region_returns_to_all() {
        let mut feed = TargetFeed::new();
        feed.targets = vec![
            in_region(fixtures::target("A", TargetTier::Maintenance, 1.0), "North"),
            in_region(fixtures::target("B", TargetTier::Maintenance, 1.0), "South"),
        ];
        feed.cycle_region();
        assert_eq!(feed.region.as_deref(), Some("North"));
        feed.cycle_region();
        assert_eq!(feed.region.as_deref(), Some("South"));
        feed.cycle_region();
        assert_eq!(feed.region, None);
    }

    // ========================================================================
    // Loading and selection
    // ========================================================================

    #[test]
    fn test_load_failure_keeps_previous_targets() {
        let mut feed = TargetFeed::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        let (generation, _) = feed.begin_load();
        feed.finish_load(
            generation,
            Ok(vec![fixtures::target("A", TargetTier::VipConversion, 9.0)]),
            &mut session,
        );
        let (generation, _) = feed.begin_load();
        feed.finish_load(
            generation,
            Err(StoreError::Request {
                op: StoreOp::QueryTargets,
                reason: "offline".to_string(),
            }),
            &mut session,
        );
        assert!(!feed.loading);
        assert_eq!(feed.targets.len(), 1);
        assert!(session.notifications.latest().is_some());
    }

    #[test]
    fn test_select_failure_is_independent_of_list() {
        let mut feed = TargetFeed::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        let (generation, _) = feed.begin_load();
        feed.finish_load(
            generation,
            Ok(vec![fixtures::target("A", TargetTier::VipConversion, 9.0)]),
            &mut session,
        );
        let (target_id, location_id) = feed.begin_select(&mut session).expect("selection");
        let picked = feed.finish_select(
            target_id,
            Err(StoreError::NotFound {
                op: StoreOp::GetLocation,
                id: location_id.to_string(),
            }),
            &mut session,
        );
        assert!(picked.is_none());
        assert!(!feed.is_pending());
        assert_eq!(feed.targets.len(), 1);
    }

    #[test]
    fn test_stale_selection_is_ignored() {
        let mut feed = TargetFeed::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        let first = fixtures::target("A", TargetTier::VipConversion, 9.0);
        let second = fixtures::target("B", TargetTier::VipConversion, 8.0);
        let (generation, _) = feed.begin_load();
        feed.finish_load(generation, Ok(vec![first.clone(), second]), &mut session);
        feed.begin_select(&mut session);
        feed.move_highlight(1);
        feed.begin_select(&mut session);
        let stale = feed.finish_select(first.target_id, Ok(fixtures::location("A")), &mut session);
        assert!(stale.is_none());
        assert!(feed.is_pending());
    }

    #[test]
    fn test_older_feed_load_is_ignored() {
        let mut feed = TargetFeed::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        let (old, old_query) = feed.begin_load();
        let (new, new_query) = feed.toggle_source();
        assert_eq!(old_query.source, TargetSource::Available);
        assert_eq!(new_query.source, TargetSource::DueOnly);

        let due = fixtures::target("Due", TargetTier::VipConversion, 9.0);
        feed.finish_load(new, Ok(vec![due.clone()]), &mut session);
        feed.finish_load(
            old,
            Ok(vec![
                fixtures::target("A", TargetTier::VipConversion, 8.0),
                fixtures::target("B", TargetTier::Maintenance, 7.0),
            ]),
            &mut session,
        );
        assert_eq!(feed.targets, vec![due]);
        assert!(!feed.loading);
    }

    #[test]
    fn test_cancelled_selection_is_ignored() {
        let mut feed = TargetFeed::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        let target = fixtures::target("A", TargetTier::VipConversion, 9.0);
        let (generation, _) = feed.begin_load();
        feed.finish_load(generation, Ok(vec![target.clone()]), &mut session);
        feed.begin_select(&mut session);
        feed.cancel_select();
        assert!(!feed.is_pending());
        let late = feed.finish_select(target.target_id, Ok(fixtures::location("A")), &mut session);
        assert!(late.is_none());
    }

    #[test]
    fn test_refresh_reports_count_and_reloads() {
        let mut feed = TargetFeed::new();
        let mut session = Session::new(fixtures::REP_EMAIL);
        assert!(feed.begin_refresh());
        assert!(!feed.begin_refresh());
        assert!(feed.finish_refresh(Ok(4), &mut session));
        assert_eq!(
            session.notifications.latest().map(|n| n.message.as_str()),
            Some("4 targets updated")
        );
        assert!(!feed.refreshing);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_tabs_partition_all_targets(targets in arb_targets(30)) {
            let total: usize = FeedTab::all()
                .iter()
                .map(|tab| partition(&targets, *tab, None).len())
                .sum();
            prop_assert_eq!(total, targets.len());
        }

        #[test]
        fn prop_partition_preserves_order(targets in arb_targets(30)) {
            for tab in FeedTab::all() {
                let ids: Vec<TargetId> = partition(&targets, *tab, None).iter().map(|t| t.target_id).collect();
                let expected: Vec<TargetId> = targets
                    .iter()
                    .filter(|t| tab.contains(t.tier))
                    .map(|t| t.target_id)
                    .collect();
                prop_assert_eq!(ids, expected);
            }
        }
    }
}
