//! Navigation between screens and fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum View {
    #[default]
    NewVisit,
    History,
    CadenceSettings,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::NewVisit => "New Visit",
            View::History => "History",
            View::CadenceSettings => "Cadence Settings",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::NewVisit, View::History, View::CadenceSettings]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let idx = self.index();
        let all = Self::all();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}

/// Focusable areas of the New Visit screen, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Feed,
    Search,
    Timestamp,
    Purpose,
    Samples,
    Cost,
    Notes,
}

impl Focus {
    pub fn all() -> &'static [Focus] {
        &[
            Focus::Feed,
            Focus::Search,
            Focus::Timestamp,
            Focus::Purpose,
            Focus::Samples,
            Focus::Cost,
            Focus::Notes,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Focus::Feed => "Targets",
            Focus::Search => "Dispensary",
            Focus::Timestamp => "Visit time",
            Focus::Purpose => "Purpose",
            Focus::Samples => "Samples given",
            Focus::Cost => "Estimated cost",
            Focus::Notes => "Notes",
        }
    }

    pub fn next(&self) -> Focus {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn previous(&self) -> Focus {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[if idx == 0 { all.len() - 1 } else { idx - 1 }]
    }

    /// Whether typed characters go into a text field.
    pub fn accepts_text(&self) -> bool {
        !matches!(self, Focus::Feed | Focus::Purpose)
    }
}
