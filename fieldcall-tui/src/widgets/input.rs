//! Bordered single-line text field.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct TextField<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    pub text_style: Style,
    pub placeholder_style: Style,
    pub border_style: Style,
    pub focus_style: Style,
}

impl<'a> TextField<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let content = if self.value.is_empty() {
            Span::styled(self.placeholder, self.placeholder_style)
        } else {
            Span::styled(self.value, self.text_style)
        };
        let mut spans = vec![content];
        if self.focused {
            spans.push(Span::styled("_", self.focus_style));
        }
        let border = if self.focused {
            self.focus_style
        } else {
            self.border_style
        };
        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(self.label)
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(paragraph, area);
    }
}
