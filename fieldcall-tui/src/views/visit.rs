//! New Visit screen: target feed on the left, visit form on the right.

use super::format::{cadence_summary, currency, or_dash, percent_change};
use super::{pane_border, two_columns};
use crate::nav::Focus;
use crate::state::App;
use crate::theme::{cadence_status_color, tier_color, trend_color};
use crate::widgets::{DetailPanel, FeedTabBar, StatusLine, TextField};
use chrono::{Local, NaiveDate};
use fieldcall_core::{Target, TierCadences};
use fieldcall_storage::TargetSource;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

const MAX_RESULT_ROWS: u16 = 6;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (left, right) = two_columns(area, 55);
    render_feed(f, app, left);
    render_form(f, app, right);
}

// ============================================================================
// Feed
// ============================================================================

fn render_feed(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let counts = app.feed.tab_counts();
    FeedTabBar {
        counts: &counts,
        active: app.feed.tab,
        region: app.feed.region.as_deref(),
        active_style: Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
        inactive_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, rows[0]);

    let status = feed_status(app);
    StatusLine {
        text: &status,
        style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, rows[1]);

    let visible = app.feed.visible();
    let items: Vec<ListItem> = if visible.is_empty() {
        vec![ListItem::new(Span::styled(
            "No targets in this view",
            Style::default().fg(app.theme.text_dim),
        ))]
    } else {
        let tiers = app.settings.tier_cadences();
        let today = Local::now().date_naive();
        visible
            .iter()
            .map(|target| target_item(app, target, &tiers, today))
            .collect()
    };

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.feed.highlighted.min(visible.len() - 1)));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pane_border(app, app.focus == Focus::Feed)),
        )
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, rows[2], &mut state);
}

fn feed_status(app: &App) -> String {
    let source = match app.feed.source {
        TargetSource::Available => "All targets",
        TargetSource::DueOnly => "Due only",
    };
    let activity = if app.feed.loading {
        " | Loading targets..."
    } else if app.feed.refreshing {
        " | Refreshing due dates..."
    } else if app.feed.matching {
        " | Matching dispensaries..."
    } else if app.feed.is_pending() {
        " | Opening target..."
    } else {
        ""
    };
    format!("{}{}", source, activity)
}

fn target_item<'a>(app: &App, target: &'a Target, tiers: &TierCadences, today: NaiveDate) -> ListItem<'a> {
    let cadence = cadence_summary(target, tiers, today);
    let status_color = match cadence.status {
        Some(_) => cadence_status_color(cadence.status, &app.theme),
        None => app.theme.error,
    };
    let header = Line::from(vec![
        Span::styled(
            target.name.as_str(),
            Style::default()
                .fg(app.theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            target.tier.display_name(),
            Style::default().fg(tier_color(target.tier, &app.theme)),
        ),
        Span::raw("  "),
        Span::styled(cadence.status_text, Style::default().fg(status_color)),
    ]);
    let ytd = target
        .total_sales_ytd
        .map(|v| currency(v, 0))
        .unwrap_or_else(|| "-".to_string());
    let detail = Line::from(vec![
        Span::styled(
            format!("  {}  YTD {}  ", or_dash(target.city.as_deref()), ytd),
            Style::default().fg(app.theme.text_dim),
        ),
        Span::styled(
            percent_change(target.percent_change_ytd),
            Style::default().fg(trend_color(target.percent_change_ytd, &app.theme)),
        ),
        Span::styled(
            format!("  {}", cadence.label),
            Style::default().fg(app.theme.secondary),
        ),
        Span::styled(
            if target.is_matched() { "" } else { "  [unmatched]" },
            Style::default().fg(app.theme.warning),
        ),
    ]);
    ListItem::new(vec![header, detail])
}

// ============================================================================
// Form
// ============================================================================

fn render_form(f: &mut Frame<'_>, app: &App, area: Rect) {
    let results_height = if app.lookup.open {
        (app.lookup.results.len() as u16).clamp(1, MAX_RESULT_ROWS) + 2
    } else {
        0
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(results_height),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let search_label = if app.lookup.loading {
        "Dispensary (searching...)"
    } else {
        "Dispensary"
    };
    field(app, search_label, &app.lookup.text, "Type to search", Focus::Search).render(f, rows[0]);
    if app.lookup.open {
        render_results(f, app, rows[1]);
    }

    field(
        app,
        "Visit time",
        &app.recorder.timestamp,
        "YYYY-MM-DD HH:MM (Ctrl+N for now)",
        Focus::Timestamp,
    )
    .render(f, rows[2]);
    let purpose = app.recorder.purpose.map(|p| p.label()).unwrap_or("");
    field(app, "Purpose", purpose, "Select with arrows", Focus::Purpose).render(f, rows[3]);
    field(app, "Samples given", &app.recorder.samples, "Optional", Focus::Samples).render(f, rows[4]);
    field(app, "Estimated cost", &app.recorder.cost, "Optional, e.g. 125.50", Focus::Cost)
        .render(f, rows[5]);
    field(app, "Notes", &app.recorder.notes, "Optional", Focus::Notes).render(f, rows[6]);

    render_selection(f, app, rows[7]);
}

fn field<'a>(app: &App, label: &'a str, value: &'a str, placeholder: &'a str, focus: Focus) -> TextField<'a> {
    TextField {
        label,
        value,
        placeholder,
        focused: app.focus == focus,
        text_style: Style::default().fg(app.theme.text),
        placeholder_style: Style::default().fg(app.theme.text_dim),
        border_style: Style::default().fg(app.theme.border),
        focus_style: Style::default().fg(app.theme.border_focus),
    }
}

fn render_results(f: &mut Frame<'_>, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.lookup.results.is_empty() {
        let text = if app.lookup.loading {
            "Searching..."
        } else {
            "No dispensaries found"
        };
        vec![ListItem::new(Span::styled(text, Style::default().fg(app.theme.text_dim)))]
    } else {
        app.lookup
            .results
            .iter()
            .map(|location| {
                let license = location
                    .verified_license
                    .as_deref()
                    .or(location.listed_license.as_deref())
                    .unwrap_or("no license");
                ListItem::new(Line::from(vec![
                    Span::styled(location.display_name.as_str(), Style::default().fg(app.theme.text)),
                    Span::styled(format!("  {}", license), Style::default().fg(app.theme.text_dim)),
                ]))
            })
            .collect()
    };
    let mut state = ListState::default();
    if !app.lookup.results.is_empty() {
        state.select(Some(app.lookup.highlighted));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        )
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn render_selection(f: &mut Frame<'_>, app: &App, area: Rect) {
    let label_style = Style::default().fg(app.theme.text_dim);
    let value_style = Style::default().fg(app.theme.text);
    let mut fields = Vec::new();
    match &app.recorder.location {
        Some(location) => {
            fields.push(("Name", Span::styled(location.display_name.as_str(), value_style)));
            fields.push((
                "License",
                Span::styled(
                    or_dash(
                        location
                            .verified_license
                            .as_deref()
                            .or(location.listed_license.as_deref()),
                    ),
                    value_style,
                ),
            ));
            fields.push((
                "Verified",
                Span::styled(if location.is_verified { "yes" } else { "no" }, value_style),
            ));
        }
        None => fields.push((
            "Dispensary",
            Span::styled("None selected", Style::default().fg(app.theme.warning)),
        )),
    }
    if app.recorder.submitting {
        fields.push(("Status", Span::styled("Submitting...", Style::default().fg(app.theme.info))));
    }
    DetailPanel {
        title: "Selected dispensary",
        fields,
        label_style,
        border_style: Style::default().fg(app.theme.border),
    }
    .render(f, area);
}
