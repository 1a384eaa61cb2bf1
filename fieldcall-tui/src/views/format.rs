//! Display formatting shared by the views.

use chrono::{DateTime, Local, NaiveDate};
use fieldcall_core::{CadenceLabel, CadenceStatus, Target, TierCadences, Timestamp};

/// `$1,234` style amount with `decimals` fractional digits.
pub fn currency(value: f64, decimals: usize) -> String {
    let negative = value < 0.0;
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if negative { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{}${}.{}", sign, grouped, fraction),
        None => format!("{}${}", sign, grouped),
    }
}

/// Signed percent change, or `n/a`.
pub fn percent_change(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{:.1}%", v),
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}

/// Relative due text from days until due.
pub fn due_text(days_until_due: Option<i64>) -> String {
    match days_until_due {
        None => "Never visited".to_string(),
        Some(d) if d < 0 => format!("Overdue by {}d", -d),
        Some(0) => "Due today".to_string(),
        Some(d) => format!("Due in {}d", d),
    }
}

/// What the feed shows for a target's cadence, resolved on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadenceSummary {
    /// `None` when the cadence could not be resolved.
    pub status: Option<CadenceStatus>,
    pub status_text: String,
    pub label: String,
}

/// Resolve a target against the loaded tier defaults. Server-computed
/// cadence fields on the row are not trusted for display.
pub fn cadence_summary(target: &Target, tiers: &TierCadences, today: NaiveDate) -> CadenceSummary {
    match tiers.resolve_target(target, today) {
        Ok(resolution) => {
            let label = CadenceLabel::describe(resolution.effective_cadence_days);
            CadenceSummary {
                status: Some(resolution.cadence_status),
                status_text: format!(
                    "{} / {}",
                    resolution.cadence_status,
                    due_text(resolution.days_until_due)
                ),
                label: if target.has_custom_cadence() {
                    format!("{} [Custom]", label)
                } else {
                    label
                },
            }
        }
        Err(err) => CadenceSummary {
            status: None,
            status_text: err.to_string(),
            label: "No cadence".to_string(),
        },
    }
}

/// A stored timestamp in the rep's local time.
pub fn local_time(ts: &Timestamp) -> String {
    let local: DateTime<Local> = ts.with_timezone(&Local);
    local.format("%b %-d, %Y %-I:%M %p").to_string()
}

pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fieldcall_core::TargetTier;
    use fieldcall_test_utils::fixtures;

    #[test]
    fn test_currency_groups_thousands() {
        assert_eq!(currency(0.0, 0), "$0");
        assert_eq!(currency(999.0, 0), "$999");
        assert_eq!(currency(1234567.0, 0), "$1,234,567");
        assert_eq!(currency(1250.5, 2), "$1,250.50");
        assert_eq!(currency(-42.0, 0), "-$42");
    }

    #[test]
    fn test_percent_change_sign() {
        assert_eq!(percent_change(Some(12.34)), "+12.3%");
        assert_eq!(percent_change(Some(-4.0)), "-4.0%");
        assert_eq!(percent_change(None), "n/a");
    }

    #[test]
    fn test_due_text() {
        assert_eq!(due_text(None), "Never visited");
        assert_eq!(due_text(Some(-3)), "Overdue by 3d");
        assert_eq!(due_text(Some(0)), "Due today");
        assert_eq!(due_text(Some(5)), "Due in 5d");
    }

    #[test]
    fn test_cadence_summary_marks_overrides() {
        let tiers = TierCadences::from_settings(&fixtures::default_settings());
        let target = fixtures::target("A", TargetTier::Maintenance, 1.0);
        let summary = cadence_summary(&target, &tiers, fixtures::today());
        assert_eq!(summary.label, "Bi-monthly (60d)");
        assert_eq!(summary.status, Some(CadenceStatus::Due));
        assert_eq!(summary.status_text, "Due / Never visited");

        let mut custom = target.clone();
        custom.cadence.custom_cadence_days = Some(7);
        let summary = cadence_summary(&custom, &tiers, fixtures::today());
        assert_eq!(summary.label, "Weekly (7d) [Custom]");
    }

    #[test]
    fn test_cadence_summary_ignores_server_cadence_fields() {
        let today = fixtures::today();
        let tiers = TierCadences::from_settings(&[fixtures::setting(TargetTier::Maintenance, 30)]);
        let mut target = fixtures::target("A", TargetTier::Maintenance, 1.0);
        target.cadence.default_cadence_days = Some(30);
        target.cadence.custom_cadence_days = Some(14);
        target.cadence.effective_cadence_days = Some(30);
        target.cadence.days_until_due = Some(10);
        target.cadence.cadence_status = None;
        target.cadence.last_visit_date = Some(today - Duration::days(20));

        let summary = cadence_summary(&target, &tiers, today);
        assert_eq!(summary.status, Some(CadenceStatus::Overdue));
        assert_eq!(summary.status_text, "Overdue / Overdue by 6d");
        assert_eq!(summary.label, "Bi-weekly (14d) [Custom]");
    }

    #[test]
    fn test_cadence_summary_reports_missing_tier_default() {
        let target = fixtures::target("A", TargetTier::GrowthExpansion, 1.0);
        let summary = cadence_summary(&target, &TierCadences::default(), fixtures::today());
        assert_eq!(summary.status, None);
        assert_eq!(
            summary.status_text,
            fieldcall_core::CadenceError::MissingTierDefault {
                tier: TargetTier::GrowthExpansion
            }.to_string()
        );
        assert_eq!(summary.label, "No cadence");
    }
}
