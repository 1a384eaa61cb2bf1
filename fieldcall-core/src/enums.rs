//! Enum types for FIELDCALL entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error when parsing an invalid enum string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

// ============================================================================
// TARGET TIER
// ============================================================================

/// Server-assigned priority tier of a sales target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetTier {
    #[serde(rename = "VIP_Conversion")]
    VipConversion,
    #[serde(rename = "VIP_Expansion")]
    VipExpansion,
    #[serde(rename = "Revenue_Protection")]
    RevenueProtection,
    #[serde(rename = "Growth_Expansion")]
    GrowthExpansion,
    #[serde(rename = "Maintenance")]
    Maintenance,
}

impl TargetTier {
    pub fn all() -> &'static [TargetTier] {
        &[
            TargetTier::VipConversion,
            TargetTier::VipExpansion,
            TargetTier::RevenueProtection,
            TargetTier::GrowthExpansion,
            TargetTier::Maintenance,
        ]
    }

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            TargetTier::VipConversion => "VIP_Conversion",
            TargetTier::VipExpansion => "VIP_Expansion",
            TargetTier::RevenueProtection => "Revenue_Protection",
            TargetTier::GrowthExpansion => "Growth_Expansion",
            TargetTier::Maintenance => "Maintenance",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_lowercase().as_str() {
            "vip_conversion" => Ok(TargetTier::VipConversion),
            "vip_expansion" => Ok(TargetTier::VipExpansion),
            "revenue_protection" => Ok(TargetTier::RevenueProtection),
            "growth_expansion" => Ok(TargetTier::GrowthExpansion),
            "maintenance" => Ok(TargetTier::Maintenance),
            _ => Err(EnumParseError::new("target tier", s)),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TargetTier::VipConversion => "VIP Conversion",
            TargetTier::VipExpansion => "VIP Expansion",
            TargetTier::RevenueProtection => "Revenue Protection",
            TargetTier::GrowthExpansion => "Growth Expansion",
            TargetTier::Maintenance => "Maintenance",
        }
    }

    pub fn is_vip(&self) -> bool {
        matches!(self, TargetTier::VipConversion | TargetTier::VipExpansion)
    }

    /// The feed tab this tier is listed under.
    pub fn feed_tab(&self) -> FeedTab {
        match self {
            TargetTier::VipConversion | TargetTier::VipExpansion => FeedTab::Vip,
            TargetTier::RevenueProtection => FeedTab::Protect,
            TargetTier::GrowthExpansion => FeedTab::Grow,
            TargetTier::Maintenance => FeedTab::Maintain,
        }
    }
}

impl fmt::Display for TargetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for TargetTier {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Tabs of the target feed. Each tier belongs to exactly one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FeedTab {
    #[default]
    Vip,
    Protect,
    Grow,
    Maintain,
}

impl FeedTab {
    pub fn all() -> &'static [FeedTab] {
        &[FeedTab::Vip, FeedTab::Protect, FeedTab::Grow, FeedTab::Maintain]
    }

    pub fn title(&self) -> &'static str {
        match self {
            FeedTab::Vip => "VIP",
            FeedTab::Protect => "Protect",
            FeedTab::Grow => "Grow",
            FeedTab::Maintain => "Maintain",
        }
    }

    pub fn contains(&self, tier: TargetTier) -> bool {
        tier.feed_tab() == *self
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> FeedTab {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> FeedTab {
        let all = Self::all();
        let idx = self.index();
        all[if idx == 0 { all.len() - 1 } else { idx - 1 }]
    }
}

// ============================================================================
// VISIT PURPOSE
// ============================================================================

/// Why a rep visited a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitPurpose {
    ProductDemo,
    RelationshipBuilding,
    SampleDrop,
    InventoryCheck,
    Training,
    FeedbackCollection,
    /// Anything else, including values this client does not recognize.
    #[serde(other)]
    Other,
}

impl VisitPurpose {
    pub fn all() -> &'static [VisitPurpose] {
        &[
            VisitPurpose::ProductDemo,
            VisitPurpose::RelationshipBuilding,
            VisitPurpose::SampleDrop,
            VisitPurpose::InventoryCheck,
            VisitPurpose::Training,
            VisitPurpose::FeedbackCollection,
            VisitPurpose::Other,
        ]
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            VisitPurpose::ProductDemo => "product_demo",
            VisitPurpose::RelationshipBuilding => "relationship_building",
            VisitPurpose::SampleDrop => "sample_drop",
            VisitPurpose::InventoryCheck => "inventory_check",
            VisitPurpose::Training => "training",
            VisitPurpose::FeedbackCollection => "feedback_collection",
            VisitPurpose::Other => "other",
        }
    }

    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_db_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EnumParseError::new("visit purpose", s))
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisitPurpose::ProductDemo => "Product Demo",
            VisitPurpose::RelationshipBuilding => "Relationship Building",
            VisitPurpose::SampleDrop => "Sample Drop",
            VisitPurpose::InventoryCheck => "Inventory Check",
            VisitPurpose::Training => "Training",
            VisitPurpose::FeedbackCollection => "Feedback Collection",
            VisitPurpose::Other => "Other",
        }
    }
}

impl fmt::Display for VisitPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for VisitPurpose {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// CADENCE STATUS
// ============================================================================

/// Due-date classification of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CadenceStatus {
    #[serde(rename = "Overdue")]
    Overdue,
    #[serde(rename = "Due", alias = "Due for visit", alias = "due")]
    Due,
    #[serde(rename = "Due Soon", alias = "Due soon", alias = "due_soon")]
    DueSoon,
    #[serde(rename = "Not Due", alias = "Not due", alias = "not_due")]
    NotDue,
}

impl CadenceStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CadenceStatus::Overdue => "Overdue",
            CadenceStatus::Due => "Due",
            CadenceStatus::DueSoon => "Due Soon",
            CadenceStatus::NotDue => "Not Due",
        }
    }

    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "overdue" => Ok(CadenceStatus::Overdue),
            "due" | "due for visit" => Ok(CadenceStatus::Due),
            "due soon" => Ok(CadenceStatus::DueSoon),
            "not due" => Ok(CadenceStatus::NotDue),
            _ => Err(EnumParseError::new("cadence status", s)),
        }
    }

    /// Whether the target should be visited now.
    pub fn needs_visit(&self) -> bool {
        matches!(self, CadenceStatus::Overdue | CadenceStatus::Due)
    }
}

impl fmt::Display for CadenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for CadenceStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// ANALYSIS STATUS
// ============================================================================

/// Review state the server assigns to a recorded visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl AnalysisStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Approved => "approved",
            AnalysisStatus::Rejected => "rejected",
            AnalysisStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

/// Operations issued against the external store. Used to tag errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreOp {
    QueryLocations,
    GetLocation,
    QueryTargets,
    InsertVisit,
    QueryVisits,
    GetCadenceSettings,
    UpdateCadenceSetting,
    UpdateTargetOverride,
    RefreshDueDates,
    MatchLocations,
    SignOut,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::QueryLocations => "query_locations",
            StoreOp::GetLocation => "get_location",
            StoreOp::QueryTargets => "query_targets",
            StoreOp::InsertVisit => "insert_visit",
            StoreOp::QueryVisits => "query_visits",
            StoreOp::GetCadenceSettings => "get_cadence_settings",
            StoreOp::UpdateCadenceSetting => "update_cadence_setting",
            StoreOp::UpdateTargetOverride => "update_target_override",
            StoreOp::RefreshDueDates => "refresh_due_dates",
            StoreOp::MatchLocations => "match_locations",
            StoreOp::SignOut => "sign_out",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_db_round_trip() {
        for tier in TargetTier::all() {
            assert_eq!(TargetTier::from_db_str(tier.as_db_str()), Ok(*tier));
        }
    }

    #[test]
    fn test_tier_parse_is_case_insensitive() {
        assert_eq!(
            TargetTier::from_db_str("vip_conversion"),
            Ok(TargetTier::VipConversion)
        );
        assert!(TargetTier::from_db_str("VIP").is_err());
    }

    #[test]
    fn test_tier_serde_uses_db_names() {
        let json = serde_json::to_string(&TargetTier::RevenueProtection).expect("serialize");
        assert_eq!(json, "\"Revenue_Protection\"");
        let parsed: TargetTier = serde_json::from_str("\"Growth_Expansion\"").expect("parse");
        assert_eq!(parsed, TargetTier::GrowthExpansion);
    }

    #[test]
    fn test_every_tier_has_exactly_one_tab() {
        for tier in TargetTier::all() {
            let tabs: Vec<_> = FeedTab::all().iter().filter(|t| t.contains(*tier)).collect();
            assert_eq!(tabs.len(), 1, "{} should map to one tab", tier);
        }
    }

    #[test]
    fn test_vip_tab_holds_both_vip_tiers() {
        assert!(FeedTab::Vip.contains(TargetTier::VipConversion));
        assert!(FeedTab::Vip.contains(TargetTier::VipExpansion));
        assert!(!FeedTab::Vip.contains(TargetTier::Maintenance));
    }

    #[test]
    fn test_feed_tab_cycles() {
        assert_eq!(FeedTab::Maintain.next(), FeedTab::Vip);
        assert_eq!(FeedTab::Vip.previous(), FeedTab::Maintain);
    }

    #[test]
    fn test_purpose_unknown_value_maps_to_other() {
        let parsed: VisitPurpose = serde_json::from_str("\"site_audit\"").expect("parse");
        assert_eq!(parsed, VisitPurpose::Other);
    }

    #[test]
    fn test_purpose_labels() {
        assert_eq!(VisitPurpose::SampleDrop.label(), "Sample Drop");
        assert_eq!(
            VisitPurpose::from_db_str("feedback_collection"),
            Ok(VisitPurpose::FeedbackCollection)
        );
    }

    #[test]
    fn test_cadence_status_accepts_legacy_strings() {
        assert_eq!(CadenceStatus::from_db_str("Due for visit"), Ok(CadenceStatus::Due));
        assert_eq!(CadenceStatus::from_db_str("Due soon"), Ok(CadenceStatus::DueSoon));
        assert_eq!(CadenceStatus::from_db_str("not_due"), Ok(CadenceStatus::NotDue));
        let parsed: CadenceStatus = serde_json::from_str("\"Due for visit\"").expect("parse");
        assert_eq!(parsed, CadenceStatus::Due);
    }

    #[test]
    fn test_analysis_status_unknown_values() {
        let parsed: AnalysisStatus = serde_json::from_str("\"escalated\"").expect("parse");
        assert_eq!(parsed, AnalysisStatus::Unknown);
        let parsed: AnalysisStatus = serde_json::from_str("\"approved\"").expect("parse");
        assert_eq!(parsed, AnalysisStatus::Approved);
    }
}
