//! Pacing between the player's question and the character's reply.
//!
//! A reply may come back from the backend before the player's own message
//! has finished revealing, or long after. Either way the reply must not be
//! shown until both have happened, and never sooner than a fixed gap after
//! the player's reveal finished. The gap keeps fast replies from feeling
//! mechanical.

use std::time::{Duration, Instant};

use crate::cast::CharacterId;

/// Minimum pause between the player's reveal finishing and the reply
/// starting to reveal.
pub const MIN_REPLY_GAP: Duration = Duration::from_millis(2000);

/// One in-flight question and its eventual reply.
///
/// Both halves of the join are optional until they arrive: the user half is
/// set when the player's message finishes revealing, the reply half when
/// the backend responds. [`Exchange::due_reply`] yields the reply text once
/// both are present and the pacing gap has elapsed.
pub struct Exchange {
    character: CharacterId,
    request_id: u64,
    user_finished_at: Option<Instant>,
    pending_reply: Option<String>,
}

impl Exchange {
    pub fn new(character: CharacterId, request_id: u64) -> Self {
        Self {
            character,
            request_id,
            user_finished_at: None,
            pending_reply: None,
        }
    }

    pub fn character(&self) -> CharacterId {
        self.character
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// The player's message finished revealing.
    pub fn on_user_finished(&mut self, now: Instant) {
        if self.user_finished_at.is_none() {
            self.user_finished_at = Some(now);
        }
    }

    /// The backend's reply arrived. Ignores replies for other requests.
    pub fn on_reply_arrived(&mut self, request_id: u64, text: String) -> bool {
        if request_id != self.request_id {
            return false;
        }
        self.pending_reply = Some(text);
        true
    }

    pub fn user_finished(&self) -> bool {
        self.user_finished_at.is_some()
    }

    pub fn reply_arrived(&self) -> bool {
        self.pending_reply.is_some()
    }

    /// Take the reply if both halves have arrived and the pacing gap has
    /// elapsed. Returns `None` until then; consumes the reply when it fires.
    pub fn due_reply(&mut self, now: Instant) -> Option<String> {
        let finished_at = self.user_finished_at?;
        if self.pending_reply.is_none() {
            return None;
        }
        if now.saturating_duration_since(finished_at) < MIN_REPLY_GAP {
            return None;
        }
        self.pending_reply.take()
    }
}
