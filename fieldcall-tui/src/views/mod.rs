//! View rendering dispatch.

pub mod format;
pub mod history;
pub mod settings;
pub mod visit;

use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::App;
use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

const HELP: &[(&str, &str)] = &[
    ("F1 / F2 / F3", "New Visit / History / Cadence Settings"),
    ("Tab / Shift+Tab", "Next / previous field"),
    ("Arrows", "Move, switch feed tab or settings pane"),
    ("Enter", "Select / save"),
    ("Esc", "Close list / revert draft"),
    ("Ctrl+S", "Record visit or save setting"),
    ("Ctrl+N", "Visit time = now"),
    ("Ctrl+R / F5", "Refresh due dates / reload"),
    ("Ctrl+U", "Toggle due-only targets"),
    ("Ctrl+G", "Cycle region filter"),
    ("Ctrl+X", "Match targets to dispensaries"),
    ("Ctrl+D", "Remove custom cadence"),
    ("Ctrl+O", "Sign out"),
    ("Ctrl+C", "Quit"),
];

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::NewVisit => visit::render(f, app, layout[1]),
        View::History => history::render(f, app, layout[1]),
        View::CadenceSettings => settings::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);

    if app.show_help {
        render_help(f, app);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("F{} {}", i + 1, view.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(Span::styled(
                    format!(" FIELDCALL | {} ", app.session.user_email),
                    Style::default().fg(app.theme.primary),
                )),
        )
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (text, style) = match app.session.notifications.active(Utc::now(), app.toast_ttl()) {
        Some(note) => {
            let color = match note.level {
                NotificationLevel::Info => app.theme.info,
                NotificationLevel::Warning => app.theme.warning,
                NotificationLevel::Error => app.theme.error,
                NotificationLevel::Success => app.theme.success,
            };
            (
                format!("{}: {}", note.level.label(), note.message),
                Style::default().fg(color),
            )
        }
        None => (
            "F10 help | Tab fields | Ctrl+S save | Ctrl+C quit".to_string(),
            Style::default().fg(app.theme.text_dim),
        ),
    };
    let footer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(style);
    f.render_widget(footer, area);
}

fn render_help(f: &mut Frame<'_>, app: &App) {
    let area = centered(f.size(), 60, (HELP.len() + 2) as u16);
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{:<16}", keys), Style::default().fg(app.theme.primary)),
                Span::styled(*what, Style::default().fg(app.theme.text)),
            ])
        })
        .collect();
    let help = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Keys ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        );
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

/// A `width` x `height` rect centered in `outer`, clipped to it.
fn centered(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}

/// Left/right split used by the list-plus-detail screens.
pub(crate) fn two_columns(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent.min(100)),
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// Border style for a pane, highlighted when it has focus.
pub(crate) fn pane_border(app: &App, focused: bool) -> Style {
    if focused {
        Style::default().fg(app.theme.border_focus)
    } else {
        Style::default().fg(app.theme.border)
    }
}
