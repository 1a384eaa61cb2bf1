//! Feed tab bar: one entry per tab with its target count, titled by region.

use fieldcall_core::FeedTab;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct FeedTabBar<'a> {
    pub counts: &'a [(FeedTab, usize)],
    pub active: FeedTab,
    /// `None` means every region is shown.
    pub region: Option<&'a str>,
    pub active_style: Style,
    pub inactive_style: Style,
}

impl<'a> FeedTabBar<'a> {
    pub fn title(&self) -> String {
        format!(" Targets | {} ", self.region.unwrap_or("All regions"))
    }

    /// "Maintain (4)" style label per tab, flagged when it is the active one.
    pub fn labels(&self) -> Vec<(String, bool)> {
        self.counts
            .iter()
            .map(|(tab, count)| (format!("{} ({})", tab.title(), count), *tab == self.active))
            .collect()
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let spans: Vec<Span> = self
            .labels()
            .into_iter()
            .map(|(label, active)| {
                let style = if active {
                    self.active_style
                } else {
                    self.inactive_style
                };
                Span::styled(format!(" {} ", label), style)
            })
            .collect();

        let bar = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title()).borders(Borders::ALL));
        f.render_widget(bar, area);
    }
}
