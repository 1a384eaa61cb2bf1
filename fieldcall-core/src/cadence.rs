//! Cadence resolution.
//!
//! The store computes cadence fields server-side; this module reproduces the
//! same rules so the client can display and check them:
//!
//! - effective cadence is the custom override when present and at least one
//!   day, otherwise the tier default;
//! - the next due date is the last visit plus the effective cadence;
//! - the status is a pure function of days until due.

use crate::constants::DUE_SOON_WINDOW_DAYS;
use crate::entities::{CadenceSetting, Target};
use crate::enums::{CadenceStatus, TargetTier};
use crate::error::CadenceError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Resolved cadence state of one target on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceResolution {
    pub effective_cadence_days: u32,
    pub next_due_date: Option<NaiveDate>,
    pub days_until_due: Option<i64>,
    pub cadence_status: CadenceStatus,
}

/// Pick the custom override when it is at least one day, else the tier default.
pub fn effective_cadence_days(tier_default_days: u32, custom_days: Option<u32>) -> u32 {
    match custom_days {
        Some(days) if days >= 1 => days,
        _ => tier_default_days,
    }
}

/// Classify days until due. `None` means the target was never visited.
pub fn classify(days_until_due: Option<i64>) -> CadenceStatus {
    match days_until_due {
        None => CadenceStatus::Due,
        Some(d) if d < 0 => CadenceStatus::Overdue,
        Some(0) => CadenceStatus::Due,
        Some(d) if d <= DUE_SOON_WINDOW_DAYS => CadenceStatus::DueSoon,
        Some(_) => CadenceStatus::NotDue,
    }
}

/// Resolve the cadence of a target.
///
/// A missing or zero tier default is a configuration error; it is never
/// papered over with a guess.
pub fn resolve(
    tier: TargetTier,
    tier_default_days: Option<u32>,
    custom_days: Option<u32>,
    last_visit_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<CadenceResolution, CadenceError> {
    let default_days = tier_default_days.ok_or(CadenceError::MissingTierDefault { tier })?;
    if default_days == 0 {
        return Err(CadenceError::InvalidTierDefault {
            tier,
            days: default_days,
        });
    }

    let effective = effective_cadence_days(default_days, custom_days);
    let next_due_date = last_visit_date.map(|last| last + Duration::days(i64::from(effective)));
    let days_until_due = next_due_date.map(|due| (due - today).num_days());

    Ok(CadenceResolution {
        effective_cadence_days: effective,
        next_due_date,
        days_until_due,
        cadence_status: classify(days_until_due),
    })
}

// ============================================================================
// LABELS
// ============================================================================

/// Human label for a cadence length.
///
/// One threshold rule is used everywhere: up to 7 days is weekly, up to 14
/// bi-weekly, up to 30 monthly, up to 60 bi-monthly, anything longer quarterly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CadenceLabel {
    Weekly,
    BiWeekly,
    Monthly,
    BiMonthly,
    Quarterly,
}

impl CadenceLabel {
    pub fn for_days(days: u32) -> Self {
        match days {
            0..=7 => CadenceLabel::Weekly,
            8..=14 => CadenceLabel::BiWeekly,
            15..=30 => CadenceLabel::Monthly,
            31..=60 => CadenceLabel::BiMonthly,
            _ => CadenceLabel::Quarterly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CadenceLabel::Weekly => "Weekly",
            CadenceLabel::BiWeekly => "Bi-weekly",
            CadenceLabel::Monthly => "Monthly",
            CadenceLabel::BiMonthly => "Bi-monthly",
            CadenceLabel::Quarterly => "Quarterly",
        }
    }

    /// "Monthly (30d)" style label.
    pub fn describe(days: u32) -> String {
        format!("{} ({}d)", Self::for_days(days), days)
    }
}

impl fmt::Display for CadenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TIER DEFAULTS
// ============================================================================

/// Tier default cadences keyed by tier, built from cadence settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierCadences {
    defaults: HashMap<TargetTier, u32>,
}

impl TierCadences {
    pub fn from_settings(settings: &[CadenceSetting]) -> Self {
        Self {
            defaults: settings
                .iter()
                .map(|s| (s.tier, s.default_cadence_days))
                .collect(),
        }
    }

    pub fn default_for(&self, tier: TargetTier) -> Option<u32> {
        self.defaults.get(&tier).copied()
    }

    pub fn set(&mut self, tier: TargetTier, days: u32) {
        self.defaults.insert(tier, days);
    }

    /// Tiers with no configured default.
    pub fn missing_tiers(&self) -> Vec<TargetTier> {
        TargetTier::all()
            .iter()
            .copied()
            .filter(|t| !self.defaults.contains_key(t))
            .collect()
    }

    /// Resolve a target against these defaults. Falls back to the default the
    /// store reported on the target row when the tier has no setting loaded.
    pub fn resolve_target(
        &self,
        target: &Target,
        today: NaiveDate,
    ) -> Result<CadenceResolution, CadenceError> {
        let default_days = self
            .default_for(target.tier)
            .or(target.cadence.default_cadence_days);
        resolve(
            target.tier,
            default_days,
            target.cadence.custom_cadence_days,
            target.cadence.last_visit_date,
            today,
        )
    }
}
