//! Event types for the client event loop.

use crossterm::event::KeyEvent;
use fieldcall_core::{
    CadenceSetting, CadenceSettingId, Location, StoreError, Target, TargetId, Visit, VisitRecord,
};

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    Data(DataEvent),
}

/// What kind of override write finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideChange {
    Saved,
    Removed,
}

/// Results of store calls, delivered back to the event loop.
#[derive(Debug)]
pub enum DataEvent {
    LocationsFound {
        seq: u64,
        result: Result<Vec<Location>, StoreError>,
    },
    TargetsLoaded {
        generation: u64,
        result: Result<Vec<Target>, StoreError>,
    },
    DueDatesRefreshed(Result<u64, StoreError>),
    LocationsMatched(Result<u64, StoreError>),
    TargetLocationResolved {
        target_id: TargetId,
        result: Result<Location, StoreError>,
    },
    VisitRecorded(Result<Visit, StoreError>),
    HistoryLoaded {
        generation: u64,
        result: Result<Vec<VisitRecord>, StoreError>,
    },
    CadenceSettingsLoaded(Result<Vec<CadenceSetting>, StoreError>),
    OverridesLoaded(Result<Vec<Target>, StoreError>),
    CadenceSettingSaved {
        setting_id: CadenceSettingId,
        days: u32,
        result: Result<(), StoreError>,
    },
    OverrideSaved {
        target_id: TargetId,
        change: OverrideChange,
        result: Result<(), StoreError>,
    },
    SignedOut(Result<(), StoreError>),
}
