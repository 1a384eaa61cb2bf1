//! Screen components. Each one is plain state plus transitions; network
//! calls are issued by the caller through the task runner.

pub mod feed;
pub mod history;
pub mod lookup;
pub mod recorder;
pub mod settings;

pub use feed::TargetFeed;
pub use history::VisitHistory;
pub use lookup::{DispensaryLookup, LookupAction, LookupInput};
pub use recorder::VisitRecorder;
pub use settings::{CadenceSettingsEditor, OverrideField, SettingsPane};

/// Move an index by `delta` within `len` items, wrapping at both ends.
pub(crate) fn step_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    let current = (current as isize).min(len - 1);
    (current + delta).rem_euclid(len) as usize
}
