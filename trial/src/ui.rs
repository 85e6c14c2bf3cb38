//! Rendering for the trial TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;
use trial_core::{CharacterId, Phase};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, app, outer[0]);

    match app.session.phase() {
        Phase::Debrief => render_debrief(frame, app, outer[1]),
        _ if app.session.focus().is_some() => render_dialogue(frame, app, outer[1]),
        _ => render_courtroom(frame, app, outer[1]),
    }

    render_footer(frame, app, outer[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.session.timer_visible() {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Time "))
            .gauge_style(Style::default().fg(gauge_color(app.timer_ratio())))
            .ratio(app.timer_ratio())
            .label(format!("{} s", app.timer_label().trim()));
        frame.render_widget(gauge, area);
    } else {
        let title = Paragraph::new(Line::from(Span::styled(
            " The Trial of INDUS-07 ",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }
}

fn gauge_color(ratio: f64) -> Color {
    if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn render_courtroom(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.tick_flash > 0 {
        Style::default().fg(Color::White)
    } else {
        Style::default()
    };
    let dialogue = Paragraph::new(app.room_content().to_string())
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Courtroom "));
    frame.render_widget(dialogue, area);
}

fn render_dialogue(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(area);

    let speaker = app
        .session
        .focus()
        .map(CharacterId::name)
        .unwrap_or_default();
    let title = format!(" Flashback - {speaker} ");

    let body = if app.session.is_thinking() {
        format!("{}\n\n...", app.chat_content())
    } else {
        app.chat_content().to_string()
    };
    let chat = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(chat, rows[0]);

    let (input_title, input_text) = if app.session.input_enabled() {
        (" Ask ", app.input_buffer.as_str())
    } else {
        (" Waiting ", "")
    };
    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title(input_title));
    frame.render_widget(input, rows[1]);
}

fn render_debrief(frame: &mut Frame, app: &App, area: Rect) {
    let verdict_line = match app.session.verdict().map(|v| v.is_correct()) {
        Some(true) => "You were CORRECT!",
        Some(false) => "You were INCORRECT!",
        None => "",
    };
    let mut text = String::from(verdict_line);
    text.push_str("\n\n");
    text.push_str(app.debrief_content());

    let debrief = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Debrief "));
    frame.render_widget(debrief, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hint = match app.session.phase() {
        Phase::Opening => "Enter/Space: continue  q: quit",
        Phase::Investigation if app.session.focus().is_some() => {
            "Type your question, Enter: send  Esc: return to court"
        }
        Phase::Investigation => "1: LOGOS-09  2: INDUS-07  3: Evan  g: give verdict  q: quit",
        Phase::Guessing if app.session.verdict_buttons_visible() => {
            "g: GUILTY  n: NOT GUILTY"
        }
        Phase::Guessing => "Enter/Space: continue",
        Phase::Debrief => "q: quit",
    };
    let footer = Paragraph::new(hint).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
