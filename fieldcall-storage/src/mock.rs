//! In-memory store for tests.
//!
//! Emulates the external store closely enough to exercise the client: the
//! target views recompute cadence fields on read with the same resolver the
//! client uses, inserts maintain each target's last visit date, and every
//! operation is counted. Failures and latency can be injected per operation.

use crate::{
    AuthGateway, CadenceSettingUpdate, DataStore, LocationQuery, TargetOrder, TargetOverrideUpdate,
    TargetQuery, TargetSource, VisitQuery,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use fieldcall_core::{
    AnalysisStatus, CadenceSetting, CadenceSettingId, Location, LocationId, NewVisit, StoreError,
    StoreOp, Target, TargetId, TierCadences, Visit, VisitId, VisitRecord,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct MockState {
    locations: RwLock<HashMap<LocationId, Location>>,
    targets: RwLock<HashMap<TargetId, Target>>,
    settings: RwLock<HashMap<CadenceSettingId, CadenceSetting>>,
    visits: RwLock<Vec<Visit>>,
    calls: RwLock<HashMap<StoreOp, usize>>,
    failures: RwLock<HashMap<StoreOp, StoreError>>,
    delays: RwLock<HashMap<StoreOp, Duration>>,
    location_queries: RwLock<Vec<LocationQuery>>,
    today: RwLock<Option<NaiveDate>>,
}

/// In-memory mock store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    state: Arc<MockState>,
}

impl MockStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the date used for cadence computation.
    pub fn with_today(self, today: NaiveDate) -> Self {
        *write(&self.state.today) = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        read(&self.state.today).unwrap_or_else(|| Utc::now().date_naive())
    }

    // === Seeding ===

    pub fn insert_location(&self, location: Location) {
        write(&self.state.locations).insert(location.location_id, location);
    }

    pub fn insert_target(&self, target: Target) {
        write(&self.state.targets).insert(target.target_id, target);
    }

    pub fn insert_setting(&self, setting: CadenceSetting) {
        write(&self.state.settings).insert(setting.setting_id, setting);
    }

    // === Inspection ===

    /// Number of times an operation was invoked, including failed calls.
    pub fn calls(&self, op: StoreOp) -> usize {
        read(&self.state.calls).get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        read(&self.state.calls).values().sum()
    }

    /// Location searches received, oldest first.
    pub fn location_queries(&self) -> Vec<LocationQuery> {
        read(&self.state.location_queries).clone()
    }

    pub fn visits(&self) -> Vec<Visit> {
        read(&self.state.visits).clone()
    }

    pub fn target(&self, id: TargetId) -> Option<Target> {
        read(&self.state.targets).get(&id).cloned()
    }

    pub fn setting(&self, id: CadenceSettingId) -> Option<CadenceSetting> {
        read(&self.state.settings).get(&id).cloned()
    }

    // === Fault injection ===

    /// Fail the next call to `op` with `error`.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        write(&self.state.failures).insert(op, error);
    }

    /// Delay every call to `op` by `delay` before it answers.
    pub fn set_delay(&self, op: StoreOp, delay: Duration) {
        write(&self.state.delays).insert(op, delay);
    }

    async fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        *write(&self.state.calls).entry(op).or_insert(0) += 1;
        let delay = read(&self.state.delays).get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match write(&self.state.failures).remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn tier_cadences(&self) -> TierCadences {
        let settings: Vec<CadenceSetting> = read(&self.state.settings).values().cloned().collect();
        TierCadences::from_settings(&settings)
    }

    /// Recompute the derived cadence fields the store's views expose.
    fn with_derived_cadence(target: &Target, tiers: &TierCadences, today: NaiveDate) -> Target {
        let mut target = target.clone();
        if let Some(days) = tiers.default_for(target.tier) {
            target.cadence.default_cadence_days = Some(days);
        }
        match tiers.resolve_target(&target, today) {
            Ok(resolution) => {
                target.cadence.effective_cadence_days = Some(resolution.effective_cadence_days);
                target.cadence.next_due_date = resolution.next_due_date;
                target.cadence.days_until_due = resolution.days_until_due;
                target.cadence.cadence_status = Some(resolution.cadence_status);
            }
            Err(err) => {
                tracing::debug!(target_id = %target.target_id, error = %err, "Leaving cadence fields as stored");
            }
        }
        target
    }
}

#[async_trait]
impl DataStore for MockStore {
    async fn query_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, StoreError> {
        write(&self.state.location_queries).push(query.clone());
        self.enter(StoreOp::QueryLocations).await?;
        let needle = query.name_contains.trim().to_lowercase();
        let mut found: Vec<Location> = read(&self.state.locations)
            .values()
            .filter(|l| l.display_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        found.truncate(query.limit);
        Ok(found)
    }

    async fn get_location(&self, id: LocationId) -> Result<Location, StoreError> {
        self.enter(StoreOp::GetLocation).await?;
        read(&self.state.locations)
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                op: StoreOp::GetLocation,
                id: id.to_string(),
            })
    }

    async fn query_targets(&self, query: &TargetQuery) -> Result<Vec<Target>, StoreError> {
        self.enter(StoreOp::QueryTargets).await?;
        let tiers = self.tier_cadences();
        let today = self.today();
        let mut targets: Vec<Target> = read(&self.state.targets)
            .values()
            .map(|t| Self::with_derived_cadence(t, &tiers, today))
            .filter(|t| !query.matched_only || t.is_matched())
            .filter(|t| !query.custom_cadence_only || t.has_custom_cadence())
            .filter(|t| match query.source {
                TargetSource::Available => true,
                TargetSource::DueOnly => t
                    .cadence
                    .cadence_status
                    .is_some_and(|s| s.needs_visit()),
            })
            .collect();
        match query.order {
            TargetOrder::PriorityDesc => targets.sort_by(|a, b| {
                b.priority_score
                    .total_cmp(&a.priority_score)
                    .then_with(|| a.name.cmp(&b.name))
            }),
            TargetOrder::NameAsc => targets.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        targets.truncate(query.limit);
        Ok(targets)
    }

    async fn insert_visit(&self, visit: &NewVisit) -> Result<Visit, StoreError> {
        self.enter(StoreOp::InsertVisit).await?;
        if !read(&self.state.locations).contains_key(&visit.location_id) {
            return Err(StoreError::Rejected {
                op: StoreOp::InsertVisit,
                status: 409,
                message: "insert violates foreign key constraint on dispensary_id".to_string(),
            });
        }
        let stored = Visit {
            visit_id: VisitId::now_v7(),
            rep_email: visit.rep_email.clone(),
            location_id: visit.location_id,
            visit_timestamp: visit.visit_timestamp,
            purpose: visit.purpose,
            samples_given: visit.samples_given.clone(),
            notes: visit.notes.clone(),
            estimated_cost: visit.estimated_cost,
            analysis_status: AnalysisStatus::Pending,
            created_at: Some(Utc::now()),
        };
        let visit_date = visit.visit_timestamp.date_naive();
        for target in write(&self.state.targets).values_mut() {
            if target.location_id == Some(visit.location_id)
                && target.cadence.last_visit_date.map_or(true, |d| d < visit_date)
            {
                target.cadence.last_visit_date = Some(visit_date);
            }
        }
        write(&self.state.visits).push(stored.clone());
        Ok(stored)
    }

    async fn query_visits(&self, query: &VisitQuery) -> Result<Vec<VisitRecord>, StoreError> {
        self.enter(StoreOp::QueryVisits).await?;
        let locations = read(&self.state.locations);
        let mut visits: Vec<Visit> = read(&self.state.visits)
            .iter()
            .filter(|v| v.rep_email == query.rep_email)
            .cloned()
            .collect();
        visits.sort_by(|a, b| b.visit_timestamp.cmp(&a.visit_timestamp));
        visits.truncate(query.limit);
        Ok(visits
            .into_iter()
            .map(|visit| VisitRecord {
                location: locations.get(&visit.location_id).map(Location::summary),
                visit,
            })
            .collect())
    }

    async fn get_cadence_settings(&self) -> Result<Vec<CadenceSetting>, StoreError> {
        self.enter(StoreOp::GetCadenceSettings).await?;
        let mut settings: Vec<CadenceSetting> =
            read(&self.state.settings).values().cloned().collect();
        settings.sort_by(|a, b| a.tier.as_db_str().cmp(b.tier.as_db_str()));
        Ok(settings)
    }

    async fn update_cadence_setting(
        &self,
        id: CadenceSettingId,
        update: &CadenceSettingUpdate,
    ) -> Result<(), StoreError> {
        self.enter(StoreOp::UpdateCadenceSetting).await?;
        let mut settings = write(&self.state.settings);
        let setting = settings.get_mut(&id).ok_or(StoreError::NotFound {
            op: StoreOp::UpdateCadenceSetting,
            id: id.to_string(),
        })?;
        if update.default_cadence_days == 0 {
            return Err(StoreError::Rejected {
                op: StoreOp::UpdateCadenceSetting,
                status: 400,
                message: "default_cadence_days violates check constraint".to_string(),
            });
        }
        setting.default_cadence_days = update.default_cadence_days;
        setting.updated_at = Some(update.updated_at);
        Ok(())
    }

    async fn update_target_override(
        &self,
        id: TargetId,
        update: &TargetOverrideUpdate,
    ) -> Result<(), StoreError> {
        self.enter(StoreOp::UpdateTargetOverride).await?;
        let mut targets = write(&self.state.targets);
        let target = targets.get_mut(&id).ok_or(StoreError::NotFound {
            op: StoreOp::UpdateTargetOverride,
            id: id.to_string(),
        })?;
        target.cadence.custom_cadence_days = update.custom_cadence_days;
        target.visit_notes = update.visit_notes.clone();
        Ok(())
    }

    async fn refresh_due_dates(&self) -> Result<u64, StoreError> {
        self.enter(StoreOp::RefreshDueDates).await?;
        let tiers = self.tier_cadences();
        let today = self.today();
        let mut targets = write(&self.state.targets);
        let mut updated = 0u64;
        for target in targets.values_mut() {
            if target.cadence.last_visit_date.is_none() {
                continue;
            }
            *target = Self::with_derived_cadence(target, &tiers, today);
            updated += 1;
        }
        Ok(updated)
    }

    async fn match_locations(&self) -> Result<u64, StoreError> {
        self.enter(StoreOp::MatchLocations).await?;
        let by_name: HashMap<String, LocationId> = read(&self.state.locations)
            .values()
            .map(|l| (l.display_name.trim().to_lowercase(), l.location_id))
            .collect();
        let mut matched = 0u64;
        for target in write(&self.state.targets).values_mut() {
            if target.location_id.is_some() {
                continue;
            }
            if let Some(id) = by_name.get(&target.name.trim().to_lowercase()) {
                target.location_id = Some(*id);
                matched += 1;
            }
        }
        Ok(matched)
    }
}

/// Mock auth gateway.
#[derive(Debug, Clone, Default)]
pub struct MockAuth {
    signed_out: Arc<RwLock<bool>>,
    failure: Arc<RwLock<Option<StoreError>>>,
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_out(&self) -> bool {
        *read(&self.signed_out)
    }

    pub fn fail_next(&self, error: StoreError) {
        *write(&self.failure) = Some(error);
    }
}

#[async_trait]
impl AuthGateway for MockAuth {
    async fn sign_out(&self) -> Result<(), StoreError> {
        if let Some(err) = write(&self.failure).take() {
            return Err(err);
        }
        *write(&self.signed_out) = true;
        Ok(())
    }
}
