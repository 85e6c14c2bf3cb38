//! The game state machine and the session it drives.
//!
//! A single owner (the interaction loop) holds the `Session` and is the only
//! writer. Player input arrives as [`Action`]s, background work reports back
//! as [`SessionEvent`]s, and outbound work for the AI worker is queued as
//! [`Command`]s drained with [`Session::take_commands`]. Invalid or blocked
//! actions are dropped silently; they model clicks landing on an animation,
//! not errors.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::cast::CharacterId;
use crate::prompts;
use crate::reveal::{RevealEngine, RevealEvent, Surface};
use crate::script::Script;
use crate::sync::Exchange;
use crate::timer::CountdownTimer;
use crate::transcript::{ConversationTurn, Transcript, TurnRole};

/// Seconds on the clock for the investigation.
pub const INVESTIGATION_SECS: u32 = 120;

/// Opening a dialogue this close to expiry is pointless and is refused.
const SELECT_LOCKOUT_SECS: u32 = 2;

/// Reveal speed for scripted lines and chat turns.
const REVEAL_DELAY: Duration = Duration::from_millis(50);

/// The debrief analysis is long; it reveals faster.
const DEBRIEF_REVEAL_DELAY: Duration = Duration::from_millis(10);

const INSTRUCTIONS: &str =
    "Question the witnesses and the defendant before time runs out. \
     Press G when you are ready to deliver a verdict.";

const ANALYSIS_FALLBACK: &str = "Analysis failed. Please try again.";

/// The narrative phase the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Investigation,
    Guessing,
    Debrief,
}

/// The player's final call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Guilty,
    NotGuilty,
}

impl Verdict {
    /// INDUS-07 was pressured into raising output; acquittal is correct.
    pub fn is_correct(self) -> bool {
        self == Verdict::NotGuilty
    }
}

/// Player input, already mapped from raw key events by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Advance scripted dialogue, or fast-forward an active reveal.
    Continue,
    /// Open a dialogue with a character.
    SelectCharacter(CharacterId),
    /// Leave the open dialogue and return to the courtroom.
    CloseDialogue,
    /// Submit a question to the focused character.
    SubmitLine(String),
    /// End the investigation early and move to the verdict.
    RequestVerdict,
    /// Decide the case.
    ChooseVerdict(Verdict),
}

/// Completion events posted back to the session by background work.
#[derive(Debug)]
pub enum SessionEvent {
    CountdownExpired,
    ReplyArrived {
        character: CharacterId,
        request_id: u64,
        text: String,
    },
    ReplyFailed {
        character: CharacterId,
        request_id: u64,
    },
    AnalysisArrived {
        text: String,
    },
    AnalysisFailed,
}

/// Work the session wants executed off the interaction thread.
#[derive(Debug)]
pub enum Command {
    RequestReply {
        character: CharacterId,
        request_id: u64,
        system_prompt: String,
        turns: Vec<ConversationTurn>,
    },
    Speak {
        text: String,
    },
    Analyze {
        prompt: String,
    },
}

/// One play-through.
pub struct Session {
    phase: Phase,
    timer: CountdownTimer,
    reveal: RevealEngine,
    script: Script,
    transcript: Transcript,
    verdict: Option<Verdict>,
    focus: Option<CharacterId>,
    exchange: Option<Exchange>,
    user_reveal_generation: Option<u64>,
    next_request_id: u64,
    verdict_buttons_visible: bool,
    commands: Vec<Command>,
}

impl Session {
    /// Create a fresh session. The expiry notifier posts back through
    /// `event_tx`; the owner drains that channel and calls
    /// [`handle_event`](Self::handle_event).
    pub fn new(event_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        let mut timer = CountdownTimer::new(INVESTIGATION_SECS);
        timer.on_expired(Box::new(move || {
            let _ = event_tx.send(SessionEvent::CountdownExpired);
        }));

        Self {
            phase: Phase::Opening,
            timer,
            reveal: RevealEngine::new(),
            script: Script::opening_statement(),
            transcript: Transcript::new(),
            verdict: None,
            focus: None,
            exchange: None,
            user_reveal_generation: None,
            next_request_id: 0,
            verdict_buttons_visible: false,
            commands: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // View accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn focus(&self) -> Option<CharacterId> {
        self.focus
    }

    pub fn verdict_buttons_visible(&self) -> bool {
        self.verdict_buttons_visible
    }

    /// The countdown is only shown during the investigation.
    pub fn timer_visible(&self) -> bool {
        self.phase == Phase::Investigation
    }

    /// True while the reply join window is open: the player's question has
    /// finished revealing and the answer has not started yet.
    pub fn is_thinking(&self) -> bool {
        self.exchange
            .as_ref()
            .map(|e| e.user_finished())
            .unwrap_or(false)
    }

    /// Whether the dialogue input line accepts a submission right now.
    pub fn input_enabled(&self) -> bool {
        self.phase == Phase::Investigation
            && self.focus.is_some()
            && self.exchange.is_none()
            && !self.reveal.is_revealing(Surface::Chat)
    }

    pub fn content(&self, surface: Surface) -> &str {
        self.reveal.content(surface)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut CountdownTimer {
        &mut self.timer
    }

    /// Drain the queued background work.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    // ------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------

    pub fn handle_action(&mut self, action: Action, now: Instant) -> Vec<RevealEvent> {
        match action {
            Action::Continue => self.on_continue(now),
            Action::SelectCharacter(id) => {
                self.on_select_character(id, now);
                Vec::new()
            }
            Action::CloseDialogue => {
                self.on_close_dialogue();
                Vec::new()
            }
            Action::SubmitLine(text) => {
                self.on_submit_line(text, now);
                Vec::new()
            }
            Action::RequestVerdict => {
                self.on_request_verdict(now);
                Vec::new()
            }
            Action::ChooseVerdict(v) => {
                self.on_choose_verdict(v);
                Vec::new()
            }
        }
    }

    fn on_continue(&mut self, now: Instant) -> Vec<RevealEvent> {
        let surface = match self.phase {
            Phase::Opening | Phase::Guessing => Surface::Room,
            Phase::Debrief => Surface::Debrief,
            Phase::Investigation => {
                // No scripted lines here; allow fast-forwarding whichever
                // surface is animating but nothing else.
                let surface = if self.focus.is_some() && self.reveal.is_revealing(Surface::Chat) {
                    Surface::Chat
                } else if self.reveal.is_revealing(Surface::Room) {
                    Surface::Room
                } else {
                    return Vec::new();
                };
                let events = self.reveal.finish_instantly(surface);
                return self.apply_reveal_events(events, now);
            }
        };

        if self.reveal.is_revealing(surface) {
            let events = self.reveal.finish_instantly(surface);
            return self.apply_reveal_events(events, now);
        }

        if self.phase == Phase::Debrief {
            return Vec::new();
        }

        if let Some(line) = self.script.advance() {
            self.reveal
                .reveal(surface, line, REVEAL_DELAY, true, false, now);
            self.commands.push(Command::Speak {
                text: line.to_string(),
            });
        }
        Vec::new()
    }

    fn on_select_character(&mut self, id: CharacterId, now: Instant) {
        if self.phase != Phase::Investigation || self.focus.is_some() {
            return;
        }
        if self.reveal.is_revealing(Surface::Room) || self.reveal.is_revealing(Surface::Chat) {
            return;
        }
        if self.exchange.is_some() {
            return;
        }
        if self.timer.remaining() <= SELECT_LOCKOUT_SECS {
            return;
        }

        self.focus = Some(id);

        if self.transcript.has_spoken_with(id) {
            // Returning visit: restore the character's last line without
            // replaying the reveal.
            let last = self
                .transcript
                .last_assistant_line(id)
                .unwrap_or_default()
                .to_string();
            self.reveal.set_content(Surface::Chat, last);
        } else {
            let intro = id.intro_line();
            self.transcript
                .record(id, TurnRole::Assistant, intro, now);
            self.reveal
                .reveal(Surface::Chat, intro, REVEAL_DELAY, true, true, now);
            self.commands.push(Command::Speak {
                text: intro.to_string(),
            });
        }
    }

    fn on_close_dialogue(&mut self) {
        if self.focus.is_none() {
            return;
        }
        if self.reveal.is_revealing(Surface::Chat) || self.exchange.is_some() {
            return;
        }
        self.focus = None;
    }

    fn on_submit_line(&mut self, text: String, now: Instant) {
        let Some(character) = self.focus else { return };
        if !self.input_enabled() {
            return;
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.transcript
            .record(character, TurnRole::User, &text, now);

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.exchange = Some(Exchange::new(character, request_id));

        let overheard = self.transcript.export().replace("You: ", "Judge: ");
        self.commands.push(Command::RequestReply {
            character,
            request_id,
            system_prompt: prompts::character_prompt(character, &overheard),
            turns: self.transcript.turns(character).to_vec(),
        });

        let generation = self
            .reveal
            .reveal(Surface::Chat, &text, REVEAL_DELAY, true, false, now);
        self.user_reveal_generation = Some(generation);
    }

    fn on_request_verdict(&mut self, now: Instant) {
        if self.phase != Phase::Investigation || self.focus.is_some() {
            return;
        }
        if self.reveal.is_revealing(Surface::Room) {
            return;
        }
        self.enter_guessing(now);
    }

    fn on_choose_verdict(&mut self, verdict: Verdict) {
        if self.phase != Phase::Guessing || !self.verdict_buttons_visible {
            return;
        }
        // A second choice after the first is recorded is ignored.
        if self.verdict.is_some() {
            return;
        }

        self.verdict = Some(verdict);
        self.verdict_buttons_visible = false;
        self.phase = Phase::Debrief;

        let history = self.transcript.export().replace("You: ", "Judge: ");
        self.commands.push(Command::Analyze {
            prompt: prompts::analysis_prompt(&history, verdict.is_correct()),
        });
    }

    // ------------------------------------------------------------------
    // Background events
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::CountdownExpired => {
                if self.phase == Phase::Investigation {
                    self.enter_guessing(now);
                }
            }
            SessionEvent::ReplyArrived {
                character,
                request_id,
                text,
            } => {
                let accepted = match self.exchange.as_mut() {
                    Some(e) if e.character() == character => e.on_reply_arrived(request_id, text),
                    _ => false,
                };
                if !accepted {
                    tracing::debug!(?character, request_id, "dropping stale reply");
                }
            }
            SessionEvent::ReplyFailed {
                character,
                request_id,
            } => {
                let matches = self
                    .exchange
                    .as_ref()
                    .map(|e| e.character() == character && e.request_id() == request_id)
                    .unwrap_or(false);
                if matches {
                    // Recoverable: the turn is simply absent and input
                    // unlocks again.
                    self.exchange = None;
                    self.user_reveal_generation = None;
                }
            }
            SessionEvent::AnalysisArrived { text } => {
                if self.phase == Phase::Debrief {
                    self.reveal.reveal(
                        Surface::Debrief,
                        &text,
                        DEBRIEF_REVEAL_DELAY,
                        true,
                        false,
                        now,
                    );
                }
            }
            SessionEvent::AnalysisFailed => {
                if self.phase == Phase::Debrief {
                    self.reveal.set_content(Surface::Debrief, ANALYSIS_FALLBACK);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Advance everything that runs on time. Called from the interaction
    /// loop; the returned reveal events let the view play per-character
    /// sounds.
    pub fn tick(&mut self, now: Instant) -> Vec<RevealEvent> {
        self.timer.poll(now);
        let events = self.reveal.poll(now);
        let events = self.apply_reveal_events(events, now);

        let due = self
            .exchange
            .as_mut()
            .and_then(|e| e.due_reply(now).map(|reply| (e.character(), reply)));
        if let Some((character, reply)) = due {
            self.exchange = None;
            self.user_reveal_generation = None;

            self.transcript
                .record(character, TurnRole::Assistant, &reply, now);
            self.reveal
                .reveal(Surface::Chat, &reply, REVEAL_DELAY, true, true, now);
            self.commands.push(Command::Speak { text: reply });
        }

        events
    }

    /// React to reveal completions: phase advancement hangs off the Room
    /// surface, the reply join off the Chat surface.
    fn apply_reveal_events(&mut self, events: Vec<RevealEvent>, now: Instant) -> Vec<RevealEvent> {
        for event in &events {
            let RevealEvent::Finished {
                surface,
                generation,
            } = event
            else {
                continue;
            };

            match surface {
                Surface::Room => {
                    if self.script.is_exhausted() {
                        match self.phase {
                            Phase::Opening => self.enter_investigation(now),
                            Phase::Guessing => self.verdict_buttons_visible = true,
                            _ => {}
                        }
                    }
                }
                Surface::Chat => {
                    if self.user_reveal_generation == Some(*generation) {
                        if let Some(exchange) = self.exchange.as_mut() {
                            exchange.on_user_finished(now);
                        }
                    }
                }
                Surface::Debrief => {}
            }
        }
        events
    }

    // ------------------------------------------------------------------
    // Phase entries
    // ------------------------------------------------------------------

    fn enter_investigation(&mut self, now: Instant) {
        self.phase = Phase::Investigation;
        self.reveal.set_content(Surface::Room, INSTRUCTIONS);
        self.timer.set_maximum(INVESTIGATION_SECS);
        self.timer.start(now);
    }

    /// Entered by the player's request or forced by expiry. The forced path
    /// pre-empts everything: an open dialogue is closed and any in-flight
    /// reply becomes stale.
    fn enter_guessing(&mut self, now: Instant) {
        self.phase = Phase::Guessing;
        self.timer.stop();
        self.focus = None;
        self.exchange = None;
        self.user_reveal_generation = None;

        self.script = Script::verdict_announcement();
        if let Some(line) = self.script.advance() {
            self.reveal
                .reveal(Surface::Room, line, REVEAL_DELAY, true, false, now);
            self.commands.push(Command::Speak {
                text: line.to_string(),
            });
        }
    }
}
