//! Single-line status text, e.g. "Loading targets...".

use ratatui::{layout::Rect, style::Style, text::Span, widgets::Paragraph, Frame};

pub struct StatusLine<'a> {
    pub text: &'a str,
    pub style: Style,
}

impl<'a> StatusLine<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        f.render_widget(Paragraph::new(Span::styled(self.text, self.style)), area);
    }
}
