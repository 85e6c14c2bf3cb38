//! Main application state and logic

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc;
use trial_core::{
    Command, DialTimerDisplay, DisplayId, RevealEvent, Session, SessionEvent, Surface,
    TextTimerDisplay,
};

/// Main application state
pub struct App {
    // Channel communication with the AI worker
    pub command_tx: mpsc::UnboundedSender<Command>,
    pub event_rx: mpsc::UnboundedReceiver<SessionEvent>,

    /// The engine; the interaction loop is its only writer.
    pub session: Session,

    // Timer read-out cells filled by the registered displays
    pub timer_text: Arc<Mutex<String>>,
    pub timer_fraction: Arc<Mutex<f64>>,

    // UI state
    pub input_buffer: String,
    pub should_quit: bool,
    /// Frames left on the per-character tick flash.
    pub tick_flash: u8,
}

impl App {
    pub fn new(
        mut session: Session,
        command_tx: mpsc::UnboundedSender<Command>,
        event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        let text = TextTimerDisplay::new(DisplayId("status-bar"));
        let timer_text = text.handle();
        let dial = DialTimerDisplay::new(DisplayId("gauge"));
        let timer_fraction = dial.handle();
        session.timer_mut().register_display(Box::new(text));
        session.timer_mut().register_display(Box::new(dial));

        Self {
            command_tx,
            event_rx,
            session,
            timer_text,
            timer_fraction,
            input_buffer: String::new(),
            should_quit: false,
            tick_flash: 0,
        }
    }

    /// One pass of the interaction loop: apply background events, advance
    /// the clock, and hand queued work to the worker.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.session.handle_event(event, now);
        }

        let events = self.session.tick(now);
        for event in events {
            if let RevealEvent::Updated { sound: true, .. } = event {
                self.tick_flash = 2;
            }
        }
        self.tick_flash = self.tick_flash.saturating_sub(1);

        for command in self.session.take_commands() {
            let _ = self.command_tx.send(command);
        }
    }

    pub fn timer_label(&self) -> String {
        self.timer_text
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn timer_ratio(&self) -> f64 {
        self.timer_fraction
            .lock()
            .map(|f| *f)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    pub fn push_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input_buffer.pop();
    }

    /// Take the typed line for submission.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input_buffer)
    }

    pub fn chat_content(&self) -> &str {
        self.session.content(Surface::Chat)
    }

    pub fn room_content(&self) -> &str {
        self.session.content(Surface::Room)
    }

    pub fn debrief_content(&self) -> &str {
        self.session.content(Surface::Debrief)
    }
}
