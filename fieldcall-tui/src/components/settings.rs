//! Cadence settings editor: tier defaults and per-target overrides.
//!
//! Edits go into drafts. A committed value only changes once the store has
//! confirmed the write; a failed write leaves the draft in place for retry.

use super::step_index;
use crate::events::OverrideChange;
use crate::session::Session;
use fieldcall_core::validation::{optional_text, parse_cadence_days};
use fieldcall_core::{
    CadenceSetting, CadenceSettingId, StoreError, Target, TargetId, TierCadences, Timestamp,
};
use fieldcall_storage::{CadenceSettingUpdate, TargetOverrideUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct TierDefaultRow {
    pub setting: CadenceSetting,
    pub draft: String,
    pub saving: bool,
}

impl TierDefaultRow {
    fn new(setting: CadenceSetting) -> Self {
        let draft = setting.default_cadence_days.to_string();
        Self {
            setting,
            draft,
            saving: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.trim() != self.setting.default_cadence_days.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRow {
    pub target: Target,
    pub draft_days: String,
    pub draft_notes: String,
    pub saving: bool,
}

impl OverrideRow {
    fn new(target: Target) -> Self {
        let draft_days = target
            .cadence
            .custom_cadence_days
            .map(|d| d.to_string())
            .unwrap_or_default();
        let draft_notes = target.visit_notes.clone().unwrap_or_default();
        Self {
            target,
            draft_days,
            draft_notes,
            saving: false,
        }
    }

    fn revert(&mut self) {
        let fresh = Self::new(self.target.clone());
        self.draft_days = fresh.draft_days;
        self.draft_notes = fresh.draft_notes;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsPane {
    #[default]
    TierDefaults,
    Overrides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrideField {
    #[default]
    Days,
    Notes,
}

#[derive(Debug, Clone, Default)]
pub struct CadenceSettingsEditor {
    pub tiers: Vec<TierDefaultRow>,
    pub overrides: Vec<OverrideRow>,
    pub pane: SettingsPane,
    pub field: OverrideField,
    pub tier_highlight: usize,
    pub override_highlight: usize,
    pub loading_settings: bool,
    pub loading_overrides: bool,
}

impl CadenceSettingsEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed tier defaults, for resolving cadences on screen.
    pub fn tier_cadences(&self) -> TierCadences {
        let settings: Vec<CadenceSetting> = self.tiers.iter().map(|r| r.setting.clone()).collect();
        TierCadences::from_settings(&settings)
    }

    pub fn begin_load_settings(&mut self) {
        self.loading_settings = true;
    }

    pub fn begin_load_overrides(&mut self) {
        self.loading_overrides = true;
    }

    pub fn finish_settings(
        &mut self,
        result: Result<Vec<CadenceSetting>, StoreError>,
        session: &mut Session,
    ) {
        self.loading_settings = false;
        match result {
            Ok(settings) => {
                self.tiers = settings.into_iter().map(TierDefaultRow::new).collect();
                self.tier_highlight = self.tier_highlight.min(self.tiers.len().saturating_sub(1));
                let missing = self.tier_cadences().missing_tiers();
                if !missing.is_empty() {
                    let names: Vec<&str> = missing.iter().map(|t| t.display_name()).collect();
                    tracing::warn!(missing = ?names, "Tiers without a default cadence");
                    session.warn(format!("No default cadence for: {}", names.join(", ")));
                }
            }
            Err(err) => session.store_error("Failed to load cadence settings", &err),
        }
    }

    pub fn finish_overrides(&mut self, result: Result<Vec<Target>, StoreError>, session: &mut Session) {
        self.loading_overrides = false;
        match result {
            Ok(targets) => {
                self.overrides = targets.into_iter().map(OverrideRow::new).collect();
                self.override_highlight = self
                    .override_highlight
                    .min(self.overrides.len().saturating_sub(1));
            }
            Err(err) => session.store_error("Failed to load custom cadences", &err),
        }
    }

    pub fn switch_pane(&mut self) {
        self.pane = match self.pane {
            SettingsPane::TierDefaults => SettingsPane::Overrides,
            SettingsPane::Overrides => SettingsPane::TierDefaults,
        };
    }

    pub fn next_field(&mut self) {
        match self.pane {
            SettingsPane::TierDefaults => self.switch_pane(),
            SettingsPane::Overrides => {
                self.field = match self.field {
                    OverrideField::Days => OverrideField::Notes,
                    OverrideField::Notes => OverrideField::Days,
                }
            }
        }
    }

    pub fn move_highlight(&mut self, delta: isize) {
        match self.pane {
            SettingsPane::TierDefaults => {
                self.tier_highlight = step_index(self.tier_highlight, delta, self.tiers.len());
            }
            SettingsPane::Overrides => {
                self.override_highlight =
                    step_index(self.override_highlight, delta, self.overrides.len());
            }
        }
    }

    /// The draft under the cursor.
    pub fn active_draft_mut(&mut self) -> Option<&mut String> {
        match self.pane {
            SettingsPane::TierDefaults => self.tiers.get_mut(self.tier_highlight).map(|r| &mut r.draft),
            SettingsPane::Overrides => {
                let field = self.field;
                self.overrides
                    .get_mut(self.override_highlight)
                    .map(|row| match field {
                        OverrideField::Days => &mut row.draft_days,
                        OverrideField::Notes => &mut row.draft_notes,
                    })
            }
        }
    }

    /// Throw away the draft under the cursor.
    pub fn revert_active(&mut self) {
        match self.pane {
            SettingsPane::TierDefaults => {
                if let Some(row) = self.tiers.get_mut(self.tier_highlight) {
                    row.draft = row.setting.default_cadence_days.to_string();
                }
            }
            SettingsPane::Overrides => {
                if let Some(row) = self.overrides.get_mut(self.override_highlight) {
                    row.revert();
                }
            }
        }
    }

    // ========================================================================
    // Tier defaults
    // ========================================================================

    /// Validate the draft of tier row `index`. Invalid input issues no write.
    pub fn begin_save_default(
        &mut self,
        index: usize,
        now: Timestamp,
        session: &mut Session,
    ) -> Option<(CadenceSettingId, CadenceSettingUpdate)> {
        let row = self.tiers.get_mut(index)?;
        if row.saving {
            return None;
        }
        match parse_cadence_days("default_cadence_days", &row.draft) {
            Ok(days) => {
                row.saving = true;
                Some((
                    row.setting.setting_id,
                    CadenceSettingUpdate {
                        default_cadence_days: days,
                        updated_at: now,
                    },
                ))
            }
            Err(err) => {
                session.error(err.to_string());
                None
            }
        }
    }

    pub fn finish_save_default(
        &mut self,
        setting_id: CadenceSettingId,
        days: u32,
        result: Result<(), StoreError>,
        session: &mut Session,
    ) {
        let Some(row) = self
            .tiers
            .iter_mut()
            .find(|r| r.setting.setting_id == setting_id)
        else {
            return;
        };
        row.saving = false;
        match result {
            Ok(()) => {
                row.setting.default_cadence_days = days;
                // Keep anything typed while the save was in flight.
                if parse_cadence_days("default_cadence_days", &row.draft) == Ok(days) {
                    row.draft = days.to_string();
                }
                session.success(format!(
                    "{} default set to {} days",
                    row.setting.tier.display_name(),
                    days
                ));
            }
            Err(err) => session.store_error("Failed to update cadence setting", &err),
        }
    }

    // ========================================================================
    // Overrides
    // ========================================================================

    pub fn begin_save_override(
        &mut self,
        index: usize,
        session: &mut Session,
    ) -> Option<(TargetId, TargetOverrideUpdate)> {
        let row = self.overrides.get_mut(index)?;
        if row.saving {
            return None;
        }
        match parse_cadence_days("custom_cadence_days", &row.draft_days) {
            Ok(days) => {
                row.saving = true;
                Some((
                    row.target.target_id,
                    TargetOverrideUpdate::set(days, optional_text(&row.draft_notes)),
                ))
            }
            Err(err) => {
                session.error(err.to_string());
                None
            }
        }
    }

    /// Clear the custom cadence (and notes) of override row `index`.
    pub fn begin_remove_override(&mut self, index: usize) -> Option<(TargetId, TargetOverrideUpdate)> {
        let row = self.overrides.get_mut(index)?;
        if row.saving {
            return None;
        }
        row.saving = true;
        Some((row.target.target_id, TargetOverrideUpdate::clear()))
    }

    /// Returns `true` when the override list should be re-read.
    pub fn finish_override(
        &mut self,
        target_id: TargetId,
        change: OverrideChange,
        result: Result<(), StoreError>,
        session: &mut Session,
    ) -> bool {
        if let Some(row) = self
            .overrides
            .iter_mut()
            .find(|r| r.target.target_id == target_id)
        {
            row.saving = false;
        }
        match (result, change) {
            (Ok(()), OverrideChange::Saved) => {
                session.success("Custom cadence saved");
                true
            }
            (Ok(()), OverrideChange::Removed) => {
                session.success("Custom cadence removed");
                true
            }
            (Err(err), _) => {
                session.store_error("Failed to update custom cadence", &err);
                false
            }
        }
    }
}
