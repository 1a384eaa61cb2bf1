//! Cadence Settings screen: tier defaults above, per-target overrides below.

use super::pane_border;
use crate::components::{OverrideField, SettingsPane};
use crate::state::App;
use crate::theme::tier_color;
use chrono::Local;
use fieldcall_core::{CadenceLabel, TierCadences};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    render_tier_defaults(f, app, rows[0]);
    render_overrides(f, app, rows[1], &app.settings.tier_cadences());
}

fn draft_span<'a>(app: &App, draft: &'a str, editing: bool) -> Span<'a> {
    let style = if editing {
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(app.theme.text)
    };
    Span::styled(if draft.is_empty() { "-" } else { draft }, style)
}

fn render_tier_defaults(f: &mut Frame<'_>, app: &App, area: Rect) {
    let editor = &app.settings;
    let focused = editor.pane == SettingsPane::TierDefaults;
    let items: Vec<ListItem> = editor
        .tiers
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let tier = row.setting.tier;
            let editing = focused && i == editor.tier_highlight;
            let marker = if row.saving {
                " saving..."
            } else if row.is_dirty() {
                " *"
            } else {
                ""
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<20}", tier.display_name()),
                    Style::default().fg(tier_color(tier, &app.theme)),
                ),
                draft_span(app, &row.draft, editing),
                Span::styled(" days  ", Style::default().fg(app.theme.text_dim)),
                Span::styled(
                    CadenceLabel::describe(row.setting.default_cadence_days),
                    Style::default().fg(app.theme.secondary),
                ),
                Span::styled(marker, Style::default().fg(app.theme.warning)),
            ]))
        })
        .collect();

    let title = if editor.loading_settings {
        "Tier defaults (loading...)"
    } else {
        "Tier defaults"
    };
    let mut state = ListState::default();
    if focused && !editor.tiers.is_empty() {
        state.select(Some(editor.tier_highlight));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(pane_border(app, focused)),
        )
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn render_overrides(f: &mut Frame<'_>, app: &App, area: Rect, cadences: &TierCadences) {
    let editor = &app.settings;
    let focused = editor.pane == SettingsPane::Overrides;
    let today = Local::now().date_naive();

    let items: Vec<ListItem> = if editor.overrides.is_empty() && !editor.loading_overrides {
        vec![ListItem::new(Span::styled(
            "No custom cadences",
            Style::default().fg(app.theme.text_dim),
        ))]
    } else {
        editor
            .overrides
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let selected = focused && i == editor.override_highlight;
                let effective = match cadences.resolve_target(&row.target, today) {
                    Ok(resolution) => CadenceLabel::describe(resolution.effective_cadence_days),
                    Err(err) => err.to_string(),
                };
                let marker = if row.saving { " saving..." } else { "" };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            row.target.name.as_str(),
                            Style::default()
                                .fg(app.theme.text)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::raw("  "),
                        Span::styled(
                            row.target.tier.display_name(),
                            Style::default().fg(tier_color(row.target.tier, &app.theme)),
                        ),
                        Span::styled(
                            format!("  effective {}", effective),
                            Style::default().fg(app.theme.secondary),
                        ),
                        Span::styled(marker, Style::default().fg(app.theme.warning)),
                    ]),
                    Line::from(vec![
                        Span::styled("  days ", Style::default().fg(app.theme.text_dim)),
                        draft_span(
                            app,
                            &row.draft_days,
                            selected && editor.field == OverrideField::Days,
                        ),
                        Span::styled("  notes ", Style::default().fg(app.theme.text_dim)),
                        draft_span(
                            app,
                            &row.draft_notes,
                            selected && editor.field == OverrideField::Notes,
                        ),
                    ]),
                ])
            })
            .collect()
    };

    let title = if editor.loading_overrides {
        "Custom cadences (loading...)"
    } else {
        "Custom cadences (Ctrl+D remove)"
    };
    let mut state = ListState::default();
    if focused && !editor.overrides.is_empty() {
        state.select(Some(editor.override_highlight));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(pane_border(app, focused)),
        )
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}
