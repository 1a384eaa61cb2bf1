//! Identity types for FIELDCALL entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh timestamp-sortable id.
            pub fn now_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a retail location (`dispensaries.id`).
    LocationId
);
define_entity_id!(
    /// Identifier of a sales target row (`target_dispensaries.id`).
    TargetId
);
define_entity_id!(
    /// Identifier of a recorded visit.
    VisitId
);
define_entity_id!(
    /// Identifier of a per-tier cadence setting.
    CadenceSettingId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_matches_uuid() {
        let raw = Uuid::now_v7();
        let id = LocationId::new(raw);
        assert_eq!(id.to_string(), raw.to_string());
        assert_eq!(id.as_uuid(), raw);
    }

    #[test]
    fn test_id_from_str_trims_whitespace() {
        let raw = Uuid::now_v7();
        let parsed: TargetId = format!("  {}  ", raw).parse().expect("valid uuid");
        assert_eq!(parsed.as_uuid(), raw);
    }

    #[test]
    fn test_id_from_str_rejects_garbage() {
        assert!("not-a-uuid".parse::<VisitId>().is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let raw = Uuid::now_v7();
        let id = CadenceSettingId::new(raw);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", raw));
    }
}
