//! FIELDCALL Core - Entity Types and Cadence Rules
//!
//! Data structures shared by every other crate, plus the one piece of
//! scheduling logic the client reproduces locally: the cadence resolver.
//! Everything else (priority scoring, tier assignment, location matching)
//! belongs to the external store.

pub mod cadence;
pub mod constants;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod license;
pub mod validation;

pub use cadence::{
    classify, effective_cadence_days, resolve, CadenceLabel, CadenceResolution, TierCadences,
};
pub use entities::{
    CadenceSetting, Location, LocationSummary, NewVisit, Target, TargetCadence, Visit,
    VisitRecord,
};
pub use enums::{
    AnalysisStatus, CadenceStatus, EnumParseError, FeedTab, StoreOp, TargetTier, VisitPurpose,
};
pub use error::{CadenceError, FieldCallError, FieldCallResult, StoreError, ValidationError};
pub use identity::{CadenceSettingId, LocationId, TargetId, Timestamp, VisitId};
pub use license::normalize_license;
