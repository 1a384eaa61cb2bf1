//! Visit history screen.

use super::format::{currency, local_time, or_dash};
use super::two_columns;
use crate::state::App;
use crate::theme::analysis_status_color;
use crate::widgets::DetailPanel;
use fieldcall_core::VisitRecord;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (left, right) = two_columns(area, 55);

    let title = if app.history.loading {
        "Recent visits (loading...)"
    } else {
        "Recent visits"
    };

    let items: Vec<ListItem> = if app.history.records.is_empty() && !app.history.loading {
        vec![ListItem::new(Span::styled(
            "No visits recorded yet",
            Style::default().fg(app.theme.text_dim),
        ))]
    } else {
        app.history
            .records
            .iter()
            .map(|record| record_item(app, record))
            .collect()
    };

    let mut state = ListState::default();
    if !app.history.records.is_empty() {
        state.select(Some(app.history.highlighted));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        )
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, left, &mut state);

    render_detail(f, app, right);
}

fn record_item<'a>(app: &App, record: &'a VisitRecord) -> ListItem<'a> {
    let visit = &record.visit;
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<22}", local_time(&visit.visit_timestamp)),
            Style::default().fg(app.theme.text_dim),
        ),
        Span::styled(
            record.location_name(),
            Style::default()
                .fg(app.theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(visit.purpose.label(), Style::default().fg(app.theme.secondary)),
        Span::raw("  "),
        Span::styled(
            visit.analysis_status.as_db_str(),
            Style::default().fg(analysis_status_color(visit.analysis_status, &app.theme)),
        ),
    ]))
}

fn render_detail(f: &mut Frame<'_>, app: &App, area: Rect) {
    let label_style = Style::default().fg(app.theme.text_dim);
    let value = Style::default().fg(app.theme.text);
    let fields = match app.history.highlighted_record() {
        Some(record) => {
            let visit = &record.visit;
            let external_id = record
                .location
                .as_ref()
                .and_then(|l| l.external_id.as_deref());
            vec![
                ("Dispensary", Span::styled(record.location_name(), value)),
                ("License", Span::styled(or_dash(external_id), value)),
                ("When", Span::styled(local_time(&visit.visit_timestamp), value)),
                ("Purpose", Span::styled(visit.purpose.label(), value)),
                ("Samples", Span::styled(or_dash(visit.samples_given.as_deref()), value)),
                (
                    "Cost",
                    Span::styled(
                        visit
                            .estimated_cost
                            .map(|c| currency(c, 2))
                            .unwrap_or_else(|| "-".to_string()),
                        value,
                    ),
                ),
                (
                    "Analysis",
                    Span::styled(
                        visit.analysis_status.as_db_str(),
                        Style::default()
                            .fg(analysis_status_color(visit.analysis_status, &app.theme)),
                    ),
                ),
                ("Notes", Span::styled(or_dash(visit.notes.as_deref()), value)),
            ]
        }
        None => vec![("Visit", Span::styled("Nothing selected", label_style))],
    };
    DetailPanel {
        title: "Visit",
        fields,
        label_style,
        border_style: Style::default().fg(app.theme.border),
    }
    .render(f, area);
}
