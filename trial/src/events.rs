//! Event handling for the trial TUI

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use trial_core::{Action, CharacterId, Phase, Verdict};

use crate::app::App;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event, now: Instant) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key, now),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) -> EventResult {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    // A dialogue with typing enabled captures most keys for the input line.
    if app.session.focus().is_some() {
        return handle_dialogue_key(app, key, now);
    }

    match key.code {
        KeyCode::Char('q') => EventResult::Quit,
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.session.handle_action(Action::Continue, now);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('1') => select(app, CharacterId::Logos, now),
        KeyCode::Char('2') => select(app, CharacterId::Indus, now),
        KeyCode::Char('3') => select(app, CharacterId::Evan, now),
        KeyCode::Char('g') if app.session.phase() == Phase::Investigation => {
            app.session.handle_action(Action::RequestVerdict, now);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('g') if app.session.verdict_buttons_visible() => {
            app.session
                .handle_action(Action::ChooseVerdict(Verdict::Guilty), now);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('n') if app.session.verdict_buttons_visible() => {
            app.session
                .handle_action(Action::ChooseVerdict(Verdict::NotGuilty), now);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_dialogue_key(app: &mut App, key: KeyEvent, now: Instant) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.session.handle_action(Action::CloseDialogue, now);
            EventResult::NeedsRedraw
        }
        KeyCode::Enter => {
            if app.session.input_enabled() {
                let line = app.take_input();
                app.session.handle_action(Action::SubmitLine(line), now);
            } else {
                // The intro or a reply is still revealing; fast-forward it.
                app.session.handle_action(Action::Continue, now);
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.pop_char();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) => {
            if app.session.input_enabled() {
                app.push_char(c);
            }
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn select(app: &mut App, character: CharacterId, now: Instant) -> EventResult {
    app.session
        .handle_action(Action::SelectCharacter(character), now);
    EventResult::NeedsRedraw
}
