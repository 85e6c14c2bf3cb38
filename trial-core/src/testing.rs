//! Testing utilities for the trial game.
//!
//! This module provides tools for integration testing:
//! - `MockDialogue` / `MockSpeech` for deterministic testing without API calls
//! - `TestHarness` for scripted play-throughs on a virtual clock
//! - Assertion helpers for verifying session state

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::backend::{AudioHandle, BackendError, DialogueBackend, SpeechBackend};
use crate::cast::CharacterId;
use crate::reveal::{RevealEvent, Surface};
use crate::session::{Action, Phase, Session, SessionEvent};
use crate::transcript::ConversationTurn;

/// A dialogue backend that returns scripted replies in order.
pub struct MockDialogue {
    replies: Mutex<VecDeque<String>>,
    fail: bool,
}

impl MockDialogue {
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fail: false,
        }
    }

    /// A backend whose every call fails, for the recovery paths.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fail: true,
        }
    }

    fn next(&self) -> String {
        self.replies
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| "I have nothing further to add.".to_string())
    }
}

#[async_trait]
impl DialogueBackend for MockDialogue {
    async fn reply(
        &self,
        _system_prompt: &str,
        _turns: &[ConversationTurn],
    ) -> Result<String, BackendError> {
        if self.fail {
            return Err(BackendError::EmptyReply);
        }
        Ok(self.next())
    }

    async fn analyze(&self, _prompt: &str) -> Result<String, BackendError> {
        if self.fail {
            return Err(BackendError::EmptyReply);
        }
        Ok(self.next())
    }
}

/// A speech backend that counts calls instead of talking to a service.
pub struct MockSpeech {
    calls: AtomicUsize,
    fail: bool,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechBackend for MockSpeech {
    async fn synthesize(&self, _text: &str) -> Result<AudioHandle, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BackendError::EmptyReply);
        }
        Ok(AudioHandle {
            url: "mock://audio".to_string(),
        })
    }
}

/// Harness for running play-through scenarios on a virtual clock.
///
/// Time never passes for real: every step names an offset in milliseconds
/// from the scenario start, and background events are injected directly
/// rather than produced by a live worker.
pub struct TestHarness {
    pub session: Session,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    start: Instant,
}

impl TestHarness {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(tx),
            events: rx,
            start: Instant::now(),
        }
    }

    /// The instant `ms` milliseconds into the scenario.
    pub fn at(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms)
    }

    /// Apply a player action at the given offset.
    pub fn act(&mut self, action: Action, ms: u64) -> Vec<RevealEvent> {
        self.session.handle_action(action, self.at(ms))
    }

    /// Inject a background event at the given offset.
    pub fn event(&mut self, event: SessionEvent, ms: u64) {
        self.session.handle_event(event, self.at(ms));
    }

    /// Drain self-posted events (timer expiry) and advance the clock.
    pub fn pump(&mut self, ms: u64) -> Vec<RevealEvent> {
        let now = self.at(ms);
        while let Ok(event) = self.events.try_recv() {
            self.session.handle_event(event, now);
        }
        self.session.tick(now)
    }

    /// Continue through the whole opening statement, finishing at `ms`.
    /// Leaves the session in `Investigation`.
    pub fn walk_to_investigation(&mut self, ms: u64) {
        let mut t = ms;
        for _ in 0..10 {
            self.act(Action::Continue, t);
            t += 10_000;
            self.pump(t);
        }
        assert_eq!(self.session.phase(), Phase::Investigation);
    }

    /// Open a dialogue at `ms` and let the intro finish revealing.
    pub fn open_dialogue(&mut self, character: CharacterId, ms: u64) {
        self.act(Action::SelectCharacter(character), ms);
        self.pump(ms + 60_000);
        assert_eq!(self.session.focus(), Some(character));
    }

    pub fn content(&self, surface: Surface) -> &str {
        self.session.content(surface)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the session is in the given phase.
#[track_caller]
pub fn assert_phase(harness: &TestHarness, phase: Phase) {
    assert_eq!(
        harness.session.phase(),
        phase,
        "Expected session to be in {phase:?}"
    );
}

/// Assert a surface currently shows exactly `expected`.
#[track_caller]
pub fn assert_content(harness: &TestHarness, surface: Surface, expected: &str) {
    assert_eq!(
        harness.content(surface),
        expected,
        "Unexpected content on {surface:?}"
    );
}
