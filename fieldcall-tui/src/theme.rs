//! Color themes and status color mapping.

use fieldcall_core::{AnalysisStatus, CadenceStatus, TargetTier};
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(16, 18, 20),
            bg_highlight: Color::Rgb(40, 44, 52),
            primary: Color::Rgb(102, 187, 106),
            primary_dim: Color::Rgb(56, 112, 60),
            secondary: Color::Rgb(186, 104, 200),
            success: Color::Rgb(102, 187, 106),
            warning: Color::Rgb(255, 202, 40),
            error: Color::Rgb(239, 83, 80),
            info: Color::Rgb(79, 195, 247),
            text: Color::Rgb(236, 239, 241),
            text_dim: Color::Rgb(144, 164, 174),
            border: Color::Rgb(69, 90, 100),
            border_focus: Color::Rgb(102, 187, 106),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 250),
            bg_highlight: Color::Rgb(224, 224, 224),
            primary: Color::Rgb(46, 125, 50),
            primary_dim: Color::Rgb(129, 199, 132),
            secondary: Color::Rgb(123, 31, 162),
            success: Color::Rgb(46, 125, 50),
            warning: Color::Rgb(239, 108, 0),
            error: Color::Rgb(198, 40, 40),
            info: Color::Rgb(2, 119, 189),
            text: Color::Rgb(33, 33, 33),
            text_dim: Color::Rgb(97, 97, 97),
            border: Color::Rgb(189, 189, 189),
            border_focus: Color::Rgb(46, 125, 50),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }
}

pub fn cadence_status_color(status: Option<CadenceStatus>, theme: &Theme) -> Color {
    match status {
        Some(CadenceStatus::Overdue) => theme.error,
        Some(CadenceStatus::Due) => theme.warning,
        Some(CadenceStatus::DueSoon) => theme.info,
        Some(CadenceStatus::NotDue) => theme.success,
        None => theme.text_dim,
    }
}

pub fn tier_color(tier: TargetTier, theme: &Theme) -> Color {
    match tier {
        TargetTier::VipConversion | TargetTier::VipExpansion => theme.secondary,
        TargetTier::RevenueProtection => theme.error,
        TargetTier::GrowthExpansion => theme.primary,
        TargetTier::Maintenance => theme.text_dim,
    }
}

pub fn analysis_status_color(status: AnalysisStatus, theme: &Theme) -> Color {
    match status {
        AnalysisStatus::Pending => theme.warning,
        AnalysisStatus::Approved => theme.success,
        AnalysisStatus::Rejected => theme.error,
        AnalysisStatus::Unknown => theme.text_dim,
    }
}

/// Green for growth, red for decline, dim when unknown.
pub fn trend_color(percent_change: Option<f64>, theme: &Theme) -> Color {
    match percent_change {
        Some(p) if p > 0.0 => theme.success,
        Some(p) if p < 0.0 => theme.error,
        _ => theme.text_dim,
    }
}
