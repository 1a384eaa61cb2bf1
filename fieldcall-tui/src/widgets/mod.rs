//! Reusable widget components.

pub mod detail;
pub mod feed_tabs;
pub mod input;
pub mod status;

pub use detail::DetailPanel;
pub use feed_tabs::FeedTabBar;
pub use input::TextField;
pub use status::StatusLine;
