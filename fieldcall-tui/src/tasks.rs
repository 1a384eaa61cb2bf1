//! Background store calls.
//!
//! Every round trip runs in its own tokio task and reports back to the event
//! loop as a [`DataEvent`]. The loop never awaits the network itself.

use crate::events::{DataEvent, OverrideChange, TuiEvent};
use fieldcall_core::{CadenceSettingId, LocationId, NewVisit, StoreError, StoreOp, TargetId};
use fieldcall_storage::{
    AuthGateway, CadenceSettingUpdate, DataStore, LocationQuery, TargetOverrideUpdate,
    TargetQuery, VisitQuery,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct TaskRunner {
    store: Arc<dyn DataStore>,
    auth: Arc<dyn AuthGateway>,
    sender: mpsc::Sender<TuiEvent>,
    debounce: Duration,
    search_task: Option<JoinHandle<()>>,
}

impl TaskRunner {
    pub fn new(
        store: Arc<dyn DataStore>,
        auth: Arc<dyn AuthGateway>,
        sender: mpsc::Sender<TuiEvent>,
        debounce: Duration,
    ) -> Self {
        Self {
            store,
            auth,
            sender,
            debounce,
            search_task: None,
        }
    }

    /// Debounced location search. Any pending search is aborted first, so
    /// only the last keystroke inside the window reaches the store.
    pub fn search_locations(&mut self, seq: u64, text: String) {
        self.cancel_search();
        let store = Arc::clone(&self.store);
        let sender = self.sender.clone();
        let debounce = self.debounce;
        self.search_task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let query = LocationQuery::by_name(text);
            let result = guarded(StoreOp::QueryLocations, async move {
                store.query_locations(&query).await
            })
            .await;
            deliver(&sender, DataEvent::LocationsFound { seq, result }).await;
        }));
    }

    pub fn cancel_search(&mut self) {
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
    }

    pub fn load_targets(&self, generation: u64, query: TargetQuery) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::QueryTargets,
            async move { store.query_targets(&query).await },
            move |result| DataEvent::TargetsLoaded { generation, result },
        );
    }

    pub fn refresh_due_dates(&self) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::RefreshDueDates,
            async move { store.refresh_due_dates().await },
            DataEvent::DueDatesRefreshed,
        );
    }

    pub fn match_locations(&self) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::MatchLocations,
            async move { store.match_locations().await },
            DataEvent::LocationsMatched,
        );
    }

    pub fn resolve_target_location(&self, target_id: TargetId, location_id: LocationId) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::GetLocation,
            async move { store.get_location(location_id).await },
            move |result| DataEvent::TargetLocationResolved { target_id, result },
        );
    }

    pub fn insert_visit(&self, visit: NewVisit) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::InsertVisit,
            async move { store.insert_visit(&visit).await },
            DataEvent::VisitRecorded,
        );
    }

    pub fn load_history(&self, generation: u64, query: VisitQuery) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::QueryVisits,
            async move { store.query_visits(&query).await },
            move |result| DataEvent::HistoryLoaded { generation, result },
        );
    }

    pub fn load_cadence_settings(&self) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::GetCadenceSettings,
            async move { store.get_cadence_settings().await },
            DataEvent::CadenceSettingsLoaded,
        );
    }

    pub fn load_overrides(&self) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::QueryTargets,
            async move { store.query_targets(&TargetQuery::overrides()).await },
            DataEvent::OverridesLoaded,
        );
    }

    pub fn save_cadence_setting(
        &self,
        setting_id: CadenceSettingId,
        update: CadenceSettingUpdate,
    ) {
        let store = Arc::clone(&self.store);
        let days = update.default_cadence_days;
        self.run(
            StoreOp::UpdateCadenceSetting,
            async move { store.update_cadence_setting(setting_id, &update).await },
            move |result| DataEvent::CadenceSettingSaved {
                setting_id,
                days,
                result,
            },
        );
    }

    pub fn save_override(
        &self,
        target_id: TargetId,
        change: OverrideChange,
        update: TargetOverrideUpdate,
    ) {
        let store = Arc::clone(&self.store);
        self.run(
            StoreOp::UpdateTargetOverride,
            async move { store.update_target_override(target_id, &update).await },
            move |result| DataEvent::OverrideSaved {
                target_id,
                change,
                result,
            },
        );
    }

    pub fn sign_out(&self) {
        let auth = Arc::clone(&self.auth);
        self.run(
            StoreOp::SignOut,
            async move { auth.sign_out().await },
            DataEvent::SignedOut,
        );
    }

    fn run<T, F, W>(&self, op: StoreOp, call: F, wrap: W)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
        W: FnOnce(Result<T, StoreError>) -> DataEvent + Send + 'static,
    {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = guarded(op, call).await;
            deliver(&sender, wrap(result)).await;
        });
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.cancel_search();
    }
}

/// Run a store call in its own task so a panic inside it surfaces as an
/// unexpected error instead of a result that never arrives.
async fn guarded<T, F>(op: StoreOp, call: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, StoreError>> + Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(op = %op, error = %err, "Store task failed");
            Err(StoreError::Unexpected {
                op,
                reason: err.to_string(),
            })
        }
    }
}

async fn deliver(sender: &mpsc::Sender<TuiEvent>, event: DataEvent) {
    if sender.send(TuiEvent::Data(event)).await.is_err() {
        tracing::debug!("Event loop closed before a store result arrived");
    }
}
