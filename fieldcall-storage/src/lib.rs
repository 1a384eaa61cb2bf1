//! FIELDCALL Storage - Store Traits and Mock Implementation
//!
//! Defines the data-access seam between the client and the external store.
//! The PostgREST implementation lives in fieldcall-tui; the in-memory mock
//! here backs every test.

pub mod mock;

pub use mock::{MockAuth, MockStore};

use async_trait::async_trait;
use fieldcall_core::constants::{
    OVERRIDE_LIST_LIMIT, SEARCH_RESULT_LIMIT, TARGET_FEED_LIMIT, VISIT_HISTORY_LIMIT,
};
use fieldcall_core::{
    CadenceSetting, CadenceSettingId, Location, LocationId, NewVisit, StoreError, Target,
    TargetId, Timestamp, Visit, VisitRecord,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// QUERY TYPES
// ============================================================================

/// Case-insensitive substring search over location display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub name_contains: String,
    pub limit: usize,
}

impl LocationQuery {
    pub fn by_name(text: impl Into<String>) -> Self {
        Self {
            name_contains: text.into(),
            limit: SEARCH_RESULT_LIMIT,
        }
    }
}

/// Which target view to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TargetSource {
    /// Every target (`available_targets`).
    #[default]
    Available,
    /// Only targets that are due or overdue (`due_targets`).
    DueOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOrder {
    PriorityDesc,
    NameAsc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuery {
    pub source: TargetSource,
    /// Only targets with a matched location.
    pub matched_only: bool,
    /// Only targets carrying a custom cadence override.
    pub custom_cadence_only: bool,
    pub order: TargetOrder,
    pub limit: usize,
}

impl TargetQuery {
    /// The call-target feed: matched targets by priority.
    pub fn feed(source: TargetSource) -> Self {
        Self {
            source,
            matched_only: true,
            custom_cadence_only: false,
            order: TargetOrder::PriorityDesc,
            limit: TARGET_FEED_LIMIT,
        }
    }

    /// Targets with a custom cadence, for the settings editor.
    pub fn overrides() -> Self {
        Self {
            source: TargetSource::Available,
            matched_only: false,
            custom_cadence_only: true,
            order: TargetOrder::NameAsc,
            limit: OVERRIDE_LIST_LIMIT,
        }
    }
}

/// A rep's visit history, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitQuery {
    pub rep_email: String,
    pub limit: usize,
}

impl VisitQuery {
    pub fn for_rep(rep_email: impl Into<String>) -> Self {
        Self {
            rep_email: rep_email.into(),
            limit: VISIT_HISTORY_LIMIT,
        }
    }
}

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for a tier's default cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadenceSettingUpdate {
    pub default_cadence_days: u32,
    pub updated_at: Timestamp,
}

/// Update payload for a target's custom cadence and notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOverrideUpdate {
    pub custom_cadence_days: Option<u32>,
    pub visit_notes: Option<String>,
}

impl TargetOverrideUpdate {
    pub fn set(days: u32, notes: Option<String>) -> Self {
        Self {
            custom_cadence_days: Some(days),
            visit_notes: notes,
        }
    }

    /// Drop the override so the tier default applies again.
    pub fn clear() -> Self {
        Self {
            custom_cadence_days: None,
            visit_notes: None,
        }
    }
}

// ============================================================================
// STORE TRAITS
// ============================================================================

/// Data access against the external relational store.
///
/// Derived fields on targets (priority, tier, cadence, due dates) are computed
/// by the store; implementations only move rows.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Search locations by display name.
    async fn query_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, StoreError>;

    /// Fetch one location.
    async fn get_location(&self, id: LocationId) -> Result<Location, StoreError>;

    /// List targets.
    async fn query_targets(&self, query: &TargetQuery) -> Result<Vec<Target>, StoreError>;

    /// Persist a visit and return the stored row.
    async fn insert_visit(&self, visit: &NewVisit) -> Result<Visit, StoreError>;

    /// List visits joined with location identity.
    async fn query_visits(&self, query: &VisitQuery) -> Result<Vec<VisitRecord>, StoreError>;

    /// All tier cadence settings, ordered by tier.
    async fn get_cadence_settings(&self) -> Result<Vec<CadenceSetting>, StoreError>;

    async fn update_cadence_setting(
        &self,
        id: CadenceSettingId,
        update: &CadenceSettingUpdate,
    ) -> Result<(), StoreError>;

    async fn update_target_override(
        &self,
        id: TargetId,
        update: &TargetOverrideUpdate,
    ) -> Result<(), StoreError>;

    /// Recompute next-due dates server-side. Returns the number of rows updated.
    async fn refresh_due_dates(&self) -> Result<u64, StoreError>;

    /// Run the server-side location matcher. Returns the number of targets matched.
    async fn match_locations(&self) -> Result<u64, StoreError>;
}

/// The authentication collaborator. Session management itself is external.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_out(&self) -> Result<(), StoreError>;
}
