//! Row shapes exchanged with the PostgREST store.
//!
//! The store mixes naming schemes: the `dispensaries` table uses TitleCase
//! columns, embedded joins come back lowercase, and target views rename a few
//! fields. Everything is adapted into the canonical core entities here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fieldcall_core::{
    normalize_license, AnalysisStatus, CadenceSetting, CadenceSettingId, CadenceStatus, Location,
    LocationId, LocationSummary, NewVisit, Target, TargetCadence, TargetId, TargetTier, Timestamp,
    Visit, VisitId, VisitPurpose, VisitRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const UNNAMED_LOCATION: &str = "Unnamed location";

// ============================================================================
// LOCATIONS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationRow {
    pub id: Option<Uuid>,
    #[serde(rename = "Survey_Display_Name", alias = "survey_display_name")]
    pub survey_display_name: Option<String>,
    #[serde(rename = "Hoodie_ID", alias = "hoodie_id")]
    pub hoodie_id: Option<String>,
    #[serde(rename = "Hoodie_License", alias = "hoodie_license")]
    pub hoodie_license: Option<String>,
    #[serde(rename = "Verified_License", alias = "verified_license")]
    pub verified_license: Option<String>,
    #[serde(rename = "OLCC_Business_Name", alias = "olcc_business_name")]
    pub olcc_business_name: Option<String>,
    #[serde(rename = "Match_Type", alias = "match_type")]
    pub match_type: Option<String>,
    #[serde(rename = "Verification_Notes", alias = "verification_notes")]
    pub verification_notes: Option<String>,
    #[serde(rename = "Confidence_Score", alias = "confidence_score")]
    pub confidence_score: Value,
    #[serde(rename = "Is_Verified", alias = "is_verified")]
    pub is_verified: Value,
    pub created_at: Option<String>,
}

impl LocationRow {
    /// `None` when the row carries no id.
    pub fn into_location(self) -> Option<Location> {
        let id = self.id?;
        let display_name = non_blank(self.survey_display_name)
            .or_else(|| non_blank(self.olcc_business_name.clone()))
            .unwrap_or_else(|| UNNAMED_LOCATION.to_string());
        Some(Location {
            location_id: LocationId::from(id),
            display_name,
            external_id: non_blank(self.hoodie_id),
            listed_license: self.hoodie_license.as_deref().and_then(normalize_license),
            verified_license: self.verified_license.as_deref().and_then(normalize_license),
            licensed_business_name: non_blank(self.olcc_business_name),
            match_type: non_blank(self.match_type),
            verification_notes: non_blank(self.verification_notes),
            confidence_score: value_text(&self.confidence_score),
            is_verified: value_flag(&self.is_verified),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// Location identity embedded in a visit row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationSummaryRow {
    #[serde(alias = "Survey_Display_Name")]
    pub survey_display_name: Option<String>,
    #[serde(alias = "Hoodie_ID")]
    pub hoodie_id: Option<String>,
}

impl LocationSummaryRow {
    pub fn into_summary(self, location_id: Option<LocationId>) -> LocationSummary {
        LocationSummary {
            location_id,
            display_name: non_blank(self.survey_display_name)
                .unwrap_or_else(|| UNNAMED_LOCATION.to_string()),
            external_id: non_blank(self.hoodie_id),
        }
    }
}

// ============================================================================
// TARGETS
// ============================================================================

/// Row of the `available_targets` / `due_targets` views.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetRow {
    #[serde(alias = "id")]
    pub target_id: Option<Uuid>,
    #[serde(alias = "matched_dispensary_id")]
    pub dispensary_id: Option<Uuid>,
    pub dispensary_name: Option<String>,
    pub banner: Option<String>,
    pub target_tier: Option<String>,
    pub priority_score: Option<f64>,
    pub total_sales_ytd: Option<f64>,
    pub smokiez_share_percent: Option<f64>,
    pub percent_change_ytd: Option<f64>,
    pub trend_classification: Option<String>,
    pub is_vip: Option<bool>,
    pub converted: Option<bool>,
    pub target_rationale: Option<String>,
    pub visit_status: Option<String>,
    pub visit_notes: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub region: Option<String>,
    pub default_cadence_days: Option<i64>,
    pub custom_cadence_days: Option<i64>,
    pub effective_cadence_days: Option<i64>,
    pub last_visit_date: Option<String>,
    pub next_due_date: Option<String>,
    pub cadence_status: Option<String>,
    pub days_until_due: Option<i64>,
}

impl TargetRow {
    /// `None` for rows without an id or with a tier this client does not know.
    pub fn into_target(self) -> Option<Target> {
        let Some(id) = self.target_id else {
            tracing::warn!("Skipping target row without id");
            return None;
        };
        let tier_text = self.target_tier.unwrap_or_default();
        let tier = match TargetTier::from_db_str(&tier_text) {
            Ok(tier) => tier,
            Err(err) => {
                tracing::warn!(target_id = %id, error = %err, "Skipping target row");
                return None;
            }
        };
        let cadence = TargetCadence {
            default_cadence_days: positive_days(self.default_cadence_days),
            custom_cadence_days: positive_days(self.custom_cadence_days),
            effective_cadence_days: positive_days(self.effective_cadence_days),
            last_visit_date: self.last_visit_date.as_deref().and_then(parse_date),
            next_due_date: self.next_due_date.as_deref().and_then(parse_date),
            cadence_status: self
                .cadence_status
                .as_deref()
                .and_then(|s| CadenceStatus::from_db_str(s).ok()),
            days_until_due: self.days_until_due,
        };
        Some(Target {
            target_id: TargetId::from(id),
            location_id: self.dispensary_id.map(LocationId::from),
            name: non_blank(self.dispensary_name).unwrap_or_else(|| UNNAMED_LOCATION.to_string()),
            banner: non_blank(self.banner),
            tier,
            priority_score: self.priority_score.unwrap_or(0.0),
            total_sales_ytd: self.total_sales_ytd,
            brand_share_percent: self.smokiez_share_percent,
            percent_change_ytd: self.percent_change_ytd,
            trend_classification: non_blank(self.trend_classification),
            is_vip: self.is_vip.unwrap_or(false),
            converted: self.converted.unwrap_or(false),
            rationale: non_blank(self.target_rationale),
            visit_status: non_blank(self.visit_status),
            visit_notes: non_blank(self.visit_notes),
            address: non_blank(self.address),
            city: non_blank(self.city),
            county: non_blank(self.county),
            region: non_blank(self.region),
            cadence,
        })
    }
}

/// PATCH body for `target_dispensaries`. `None` is sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetOverridePatch {
    pub custom_cadence_days: Option<u32>,
    pub visit_notes: Option<String>,
}

// ============================================================================
// CADENCE SETTINGS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CadenceSettingRow {
    pub id: Uuid,
    pub target_tier: String,
    pub default_cadence_days: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl CadenceSettingRow {
    pub fn into_setting(self) -> Option<CadenceSetting> {
        let tier = match TargetTier::from_db_str(&self.target_tier) {
            Ok(tier) => tier,
            Err(err) => {
                tracing::warn!(setting_id = %self.id, error = %err, "Skipping cadence setting");
                return None;
            }
        };
        let Ok(days) = u32::try_from(self.default_cadence_days) else {
            tracing::warn!(
                setting_id = %self.id,
                days = self.default_cadence_days,
                "Skipping cadence setting with negative days"
            );
            return None;
        };
        Some(CadenceSetting {
            setting_id: CadenceSettingId::from(self.id),
            tier,
            default_cadence_days: days,
            description: non_blank(self.description),
            updated_at: self.updated_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// PATCH body for `visit_cadence_settings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CadenceSettingPatch {
    pub default_cadence_days: u32,
    pub updated_at: Timestamp,
}

// ============================================================================
// VISITS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct VisitRow {
    pub id: Uuid,
    pub rep_email: String,
    #[serde(default)]
    pub dispensary_id: Option<Uuid>,
    pub visit_timestamp: String,
    #[serde(default)]
    pub visit_purpose: Option<String>,
    #[serde(default)]
    pub samples_given: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub analysis_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub dispensaries: Option<LocationSummaryRow>,
}

impl VisitRow {
    fn split(self) -> Option<(Visit, Option<LocationSummaryRow>)> {
        let Some(location_id) = self.dispensary_id.map(LocationId::from) else {
            tracing::warn!(visit_id = %self.id, "Skipping visit without location");
            return None;
        };
        let Some(visit_timestamp) = parse_timestamp(&self.visit_timestamp) else {
            tracing::warn!(
                visit_id = %self.id,
                value = %self.visit_timestamp,
                "Skipping visit with unreadable timestamp"
            );
            return None;
        };
        let visit = Visit {
            visit_id: VisitId::from(self.id),
            rep_email: self.rep_email,
            location_id,
            visit_timestamp,
            purpose: self
                .visit_purpose
                .as_deref()
                .map(|p| VisitPurpose::from_db_str(p).unwrap_or(VisitPurpose::Other))
                .unwrap_or(VisitPurpose::Other),
            samples_given: non_blank(self.samples_given),
            notes: non_blank(self.notes),
            estimated_cost: self.estimated_cost,
            analysis_status: parse_analysis_status(self.analysis_status.as_deref()),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        };
        Some((visit, self.dispensaries))
    }

    pub fn into_visit(self) -> Option<Visit> {
        self.split().map(|(visit, _)| visit)
    }

    pub fn into_record(self) -> Option<VisitRecord> {
        let (visit, summary) = self.split()?;
        let location = summary.map(|s| s.into_summary(Some(visit.location_id)));
        Some(VisitRecord { visit, location })
    }
}

/// Insert body for `visits`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVisitRow {
    pub rep_email: String,
    pub dispensary_id: Uuid,
    pub visit_timestamp: String,
    pub visit_purpose: &'static str,
    pub samples_given: Option<String>,
    pub notes: Option<String>,
    pub estimated_cost: Option<f64>,
}

impl From<&NewVisit> for NewVisitRow {
    fn from(visit: &NewVisit) -> Self {
        Self {
            rep_email: visit.rep_email.clone(),
            dispensary_id: visit.location_id.as_uuid(),
            visit_timestamp: visit.visit_timestamp.to_rfc3339(),
            visit_purpose: visit.purpose.as_db_str(),
            samples_given: visit.samples_given.clone(),
            notes: visit.notes.clone(),
            estimated_cost: visit.estimated_cost,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error body returned by PostgREST and the auth endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostgrestError {
    pub message: Option<String>,
    #[serde(alias = "error_description", alias = "msg")]
    pub detail_message: Option<String>,
    pub code: Option<Value>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl PostgrestError {
    pub fn describe(&self) -> Option<String> {
        let message = non_blank(self.message.clone()).or_else(|| non_blank(self.detail_message.clone()))?;
        Some(match non_blank(self.details.clone()) {
            Some(details) => format!("{} ({})", message, details),
            None => message,
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn positive_days(value: Option<i64>) -> Option<u32> {
    value
        .filter(|d| *d >= 1)
        .and_then(|d| u32::try_from(d).ok())
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "t" | "yes" | "y" | "1" | "verified"
        ),
        _ => false,
    }
}

fn parse_analysis_status(value: Option<&str>) -> AnalysisStatus {
    match value.map(|s| s.trim().to_ascii_lowercase()) {
        None => AnalysisStatus::Pending,
        Some(s) => match s.as_str() {
            "" | "pending" => AnalysisStatus::Pending,
            "approved" => AnalysisStatus::Approved,
            "rejected" => AnalysisStatus::Rejected,
            _ => AnalysisStatus::Unknown,
        },
    }
}

/// RFC 3339, or an offset-less Postgres timestamp taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// A plain date, or the date part of a timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|ts| ts.date_naive()))
}
