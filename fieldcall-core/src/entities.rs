//! Entity types for FIELDCALL

use crate::enums::{AnalysisStatus, CadenceStatus, TargetTier, VisitPurpose};
use crate::identity::{CadenceSettingId, LocationId, TargetId, Timestamp, VisitId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// LOCATION
// ============================================================================

/// A licensed retail location. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    pub display_name: String,
    /// Identifier in the partner survey system.
    pub external_id: Option<String>,
    /// License number as listed by the survey source.
    pub listed_license: Option<String>,
    /// License number confirmed against the state registry.
    pub verified_license: Option<String>,
    pub licensed_business_name: Option<String>,
    pub match_type: Option<String>,
    pub verification_notes: Option<String>,
    pub confidence_score: Option<String>,
    pub is_verified: bool,
    pub created_at: Option<Timestamp>,
}

impl Location {
    pub fn summary(&self) -> LocationSummary {
        LocationSummary {
            location_id: Some(self.location_id),
            display_name: self.display_name.clone(),
            external_id: self.external_id.clone(),
        }
    }
}

/// Display identity of a location, as embedded in joined history rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub location_id: Option<LocationId>,
    pub display_name: String,
    pub external_id: Option<String>,
}

// ============================================================================
// TARGET
// ============================================================================

/// Cadence fields of a target as computed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetCadence {
    pub default_cadence_days: Option<u32>,
    pub custom_cadence_days: Option<u32>,
    pub effective_cadence_days: Option<u32>,
    pub last_visit_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub cadence_status: Option<CadenceStatus>,
    pub days_until_due: Option<i64>,
}

/// A location ranked for outreach, with sales metrics and cadence state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub target_id: TargetId,
    /// Matched location, if the store's matcher found one.
    pub location_id: Option<LocationId>,
    pub name: String,
    pub banner: Option<String>,
    pub tier: TargetTier,
    pub priority_score: f64,
    pub total_sales_ytd: Option<f64>,
    pub brand_share_percent: Option<f64>,
    pub percent_change_ytd: Option<f64>,
    pub trend_classification: Option<String>,
    pub is_vip: bool,
    pub converted: bool,
    pub rationale: Option<String>,
    pub visit_status: Option<String>,
    pub visit_notes: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub region: Option<String>,
    pub cadence: TargetCadence,
}

impl Target {
    pub fn has_custom_cadence(&self) -> bool {
        self.cadence.custom_cadence_days.is_some_and(|d| d >= 1)
    }

    pub fn is_matched(&self) -> bool {
        self.location_id.is_some()
    }
}

// ============================================================================
// CADENCE SETTING
// ============================================================================

/// Default visit cadence for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceSetting {
    pub setting_id: CadenceSettingId,
    pub tier: TargetTier,
    pub default_cadence_days: u32,
    pub description: Option<String>,
    pub updated_at: Option<Timestamp>,
}

// ============================================================================
// VISIT
// ============================================================================

/// A recorded field visit. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub visit_id: VisitId,
    pub rep_email: String,
    pub location_id: LocationId,
    pub visit_timestamp: Timestamp,
    pub purpose: VisitPurpose,
    pub samples_given: Option<String>,
    pub notes: Option<String>,
    pub estimated_cost: Option<f64>,
    pub analysis_status: AnalysisStatus,
    pub created_at: Option<Timestamp>,
}

/// Insert payload for a visit. The store assigns id and analysis status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVisit {
    pub rep_email: String,
    pub location_id: LocationId,
    pub visit_timestamp: Timestamp,
    pub purpose: VisitPurpose,
    pub samples_given: Option<String>,
    pub notes: Option<String>,
    pub estimated_cost: Option<f64>,
}

/// History row: a visit joined with its location's display identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub visit: Visit,
    pub location: Option<LocationSummary>,
}

impl VisitRecord {
    pub fn location_name(&self) -> &str {
        self.location
            .as_ref()
            .map(|l| l.display_name.as_str())
            .unwrap_or("Unknown location")
    }
}
