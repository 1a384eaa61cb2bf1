//! Constants shared by the client components.

// ============================================================================
// LOCATION SEARCH
// ============================================================================

/// Quiet period after the last keystroke before a location search runs.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Queries shorter than this (after trimming) never reach the store.
pub const SEARCH_MIN_CHARS: usize = 3;

/// Maximum number of locations returned by one search.
pub const SEARCH_RESULT_LIMIT: usize = 10;

// ============================================================================
// LISTS
// ============================================================================

/// Maximum number of targets loaded into the feed.
pub const TARGET_FEED_LIMIT: usize = 100;

/// Maximum number of visits shown in history.
pub const VISIT_HISTORY_LIMIT: usize = 20;

/// Maximum number of custom-cadence targets shown in the settings editor.
pub const OVERRIDE_LIST_LIMIT: usize = 50;

// ============================================================================
// CADENCE
// ============================================================================

/// Smallest cadence, in days, a tier default or override may hold.
pub const MIN_CADENCE_DAYS: u32 = 1;

/// Largest cadence, in days, a tier default or override may hold.
pub const MAX_CADENCE_DAYS: u32 = 365;

/// Targets due within this many days (inclusive) are "Due Soon".
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Region that is never offered as a feed filter.
pub const EXCLUDED_REGION: &str = "Other Oregon";
