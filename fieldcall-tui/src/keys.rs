//! Keybinding definitions.
//!
//! Plain characters are text input on every screen, so commands live on
//! control chords and function keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SignOut,
    SwitchView(usize),
    NextField,
    PrevField,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Confirm,
    Cancel,
    Refresh,
    Submit,
    SetNow,
    Remove,
    ToggleDueOnly,
    CycleRegion,
    MatchLocations,
    ToggleHelp,
    Input(char),
    Backspace,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('o') => Some(Action::SignOut),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('s') => Some(Action::Submit),
            KeyCode::Char('n') => Some(Action::SetNow),
            KeyCode::Char('d') => Some(Action::Remove),
            KeyCode::Char('u') => Some(Action::ToggleDueOnly),
            KeyCode::Char('g') => Some(Action::CycleRegion),
            KeyCode::Char('x') => Some(Action::MatchLocations),
            _ => None,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match code {
        KeyCode::F(n @ 1..=3) => Some(Action::SwitchView(usize::from(n - 1))),
        KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::F(10) => Some(Action::ToggleHelp),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextField),
        KeyCode::BackTab => Some(Action::PrevField),
        KeyCode::Up => Some(Action::MoveUp),
        KeyCode::Down => Some(Action::MoveDown),
        KeyCode::Left => Some(Action::MoveLeft),
        KeyCode::Right => Some(Action::MoveRight),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::Input(c)),
        _ => None,
    }
}
