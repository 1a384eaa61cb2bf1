//! FIELDCALL Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for entity types
//! - Fixtures for common scenarios, including a seeded mock store

// Re-export mocks from their source crate
pub use fieldcall_storage::{MockAuth, MockStore};

pub use fieldcall_core::{
    AnalysisStatus, CadenceSetting, CadenceSettingId, CadenceStatus, Location, LocationId,
    LocationSummary, NewVisit, StoreError, StoreOp, Target, TargetCadence, TargetId, TargetTier,
    Timestamp, Visit, VisitId, VisitPurpose, VisitRecord,
};

use chrono::{NaiveDate, TimeZone, Utc};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating FIELDCALL entity types.

    use super::*;
    use proptest::prelude::*;

    // === Enum Generators ===

    pub fn arb_tier() -> impl Strategy<Value = TargetTier> {
        prop_oneof![
            Just(TargetTier::VipConversion),
            Just(TargetTier::VipExpansion),
            Just(TargetTier::RevenueProtection),
            Just(TargetTier::GrowthExpansion),
            Just(TargetTier::Maintenance),
        ]
    }

    pub fn arb_purpose() -> impl Strategy<Value = VisitPurpose> {
        proptest::sample::select(VisitPurpose::all().to_vec())
    }

    /// Cadence lengths the editor accepts.
    pub fn arb_cadence_days() -> impl Strategy<Value = u32> {
        1u32..=365
    }

    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (2024i32..=2027, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
    }

    pub fn arb_region() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("Portland Metro".to_string())),
            Just(Some("Willamette Valley".to_string())),
            Just(Some("Southern Oregon".to_string())),
            Just(Some("Other Oregon".to_string())),
        ]
    }

    // === Entity Generators ===

    pub fn arb_location() -> impl Strategy<Value = Location> {
        ("[A-Z][a-z]{2,10}( [A-Z][a-z]{2,8})?", any::<bool>())
            .prop_map(|(name, verified)| fixtures::location(&name).with_verified(verified))
    }

    pub fn arb_target() -> impl Strategy<Value = Target> {
        (
            "[A-Z][a-z]{2,12}",
            arb_tier(),
            0.0f64..100.0,
            proptest::option::of(arb_cadence_days()),
            proptest::option::of(arb_date()),
            arb_region(),
            any::<bool>(),
        )
            .prop_map(|(name, tier, priority, custom, last_visit, region, matched)| {
                let mut target = fixtures::target(&name, tier, priority);
                if !matched {
                    target.location_id = None;
                }
                target.cadence.custom_cadence_days = custom;
                target.cadence.last_visit_date = last_visit;
                target.region = region;
                target
            })
    }

    pub fn arb_targets(max: usize) -> impl Strategy<Value = Vec<Target>> {
        proptest::collection::vec(arb_target(), 0..max)
    }

    pub fn arb_setting() -> impl Strategy<Value = CadenceSetting> {
        (arb_tier(), arb_cadence_days()).prop_map(|(tier, days)| fixtures::setting(tier, days))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    pub const REP_EMAIL: &str = "rep@example.com";

    /// Fixed "today" used by seeded stores.
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 20).unwrap_or_default()
    }

    pub fn location(name: &str) -> Location {
        Location {
            location_id: LocationId::now_v7(),
            display_name: name.to_string(),
            external_id: Some(format!("HD-{:04}", name.len() * 37)),
            listed_license: Some("0501234567ABC".to_string()),
            verified_license: Some("050-1234567ABC".to_string()),
            licensed_business_name: Some(format!("{} LLC", name)),
            match_type: Some("license".to_string()),
            verification_notes: None,
            confidence_score: Some("0.95".to_string()),
            is_verified: true,
            created_at: None,
        }
    }

    /// A matched target pointing at a fresh location id.
    pub fn target(name: &str, tier: TargetTier, priority: f64) -> Target {
        Target {
            target_id: TargetId::now_v7(),
            location_id: Some(LocationId::now_v7()),
            name: name.to_string(),
            banner: None,
            tier,
            priority_score: priority,
            total_sales_ytd: Some(12_500.0),
            brand_share_percent: Some(4.2),
            percent_change_ytd: Some(-3.5),
            trend_classification: Some("Declining".to_string()),
            is_vip: tier.is_vip(),
            converted: false,
            rationale: None,
            visit_status: None,
            visit_notes: None,
            address: Some("100 Main St".to_string()),
            city: Some("Portland".to_string()),
            county: Some("Multnomah".to_string()),
            region: Some("Portland Metro".to_string()),
            cadence: TargetCadence::default(),
        }
    }

    /// A target matched to the given location.
    pub fn target_at(location: &Location, tier: TargetTier, priority: f64) -> Target {
        let mut t = target(&location.display_name, tier, priority);
        t.location_id = Some(location.location_id);
        t
    }

    pub fn setting(tier: TargetTier, days: u32) -> CadenceSetting {
        CadenceSetting {
            setting_id: CadenceSettingId::now_v7(),
            tier,
            default_cadence_days: days,
            description: Some(format!("{} cadence", tier.display_name())),
            updated_at: None,
        }
    }

    /// One setting per tier: 7, 14, 14, 30, 60 days.
    pub fn default_settings() -> Vec<CadenceSetting> {
        vec![
            setting(TargetTier::VipConversion, 7),
            setting(TargetTier::VipExpansion, 14),
            setting(TargetTier::RevenueProtection, 14),
            setting(TargetTier::GrowthExpansion, 30),
            setting(TargetTier::Maintenance, 60),
        ]
    }

    pub fn new_visit(location_id: LocationId, purpose: VisitPurpose) -> NewVisit {
        NewVisit {
            rep_email: REP_EMAIL.to_string(),
            location_id,
            visit_timestamp: Utc
                .with_ymd_and_hms(2026, 4, 19, 14, 30, 0)
                .single()
                .unwrap_or_else(Utc::now),
            purpose,
            samples_given: Some("2 tins".to_string()),
            notes: None,
            estimated_cost: Some(18.0),
        }
    }

    /// A mock store with default settings and one matched target per tier.
    pub fn seeded_store() -> (MockStore, Vec<Location>, Vec<Target>) {
        let store = MockStore::new().with_today(today());
        for s in default_settings() {
            store.insert_setting(s);
        }
        let mut locations = Vec::new();
        let mut targets = Vec::new();
        for (i, tier) in TargetTier::all().iter().enumerate() {
            let loc = location(&format!("Shop {}", i + 1));
            let t = target_at(&loc, *tier, 100.0 - i as f64 * 10.0);
            store.insert_location(loc.clone());
            store.insert_target(t.clone());
            locations.push(loc);
            targets.push(t);
        }
        (store, locations, targets)
    }
}

/// Builder-style tweaks used by fixtures and generators.
pub trait LocationExt {
    fn with_verified(self, verified: bool) -> Self;
}

impl LocationExt for Location {
    fn with_verified(mut self, verified: bool) -> Self {
        self.is_verified = verified;
        self
    }
}
