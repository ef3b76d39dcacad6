use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    YearDelta(i32),
    ScenarioNext,
    ScenarioPrev,
    Apply,
    TogglePause,
    ToggleHud,
    ToggleHelp,
    Back,
    Quit,
}

pub(crate) fn poll_actions(max_frame_time: Duration) -> Result<Vec<Action>> {
    let mut out = Vec::new();

    // tiny timeout so the frame loop stays responsive
    let timeout = Duration::from_millis(1).min(max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press && k.kind != KeyEventKind::Repeat {
                continue;
            }
            if let Some(a) = map_key(k.code, k.modifiers) {
                out.push(a);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_key(code: KeyCode, mods: KeyModifiers) -> Option<Action> {
    let step = if mods.contains(KeyModifiers::SHIFT) {
        10
    } else {
        1
    };
    match code {
        KeyCode::Char('c') if mods.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Left => Some(Action::YearDelta(-step)),
        KeyCode::Right => Some(Action::YearDelta(step)),
        KeyCode::Up => Some(Action::ScenarioPrev),
        KeyCode::Down | KeyCode::Tab => Some(Action::ScenarioNext),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::ScenarioNext),
        KeyCode::Enter => Some(Action::Apply),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::TogglePause),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::ToggleHud),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        _ => None,
    }
}
