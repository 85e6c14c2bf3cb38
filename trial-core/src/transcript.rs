//! Per-character conversation history and the combined transcript.
//!
//! Each character keeps its own turn list, used verbatim as the message
//! history for reply requests. The combined export interleaves every
//! conversation in chronological order and is what the debrief analysis
//! sees.

use std::collections::HashMap;
use std::time::Instant;

use crate::cast::CharacterId;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    /// The player, acting as the judge.
    User,
    /// The character being questioned.
    Assistant,
}

/// One utterance in a conversation.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub at: Instant,
}

/// All conversations held during the investigation.
#[derive(Default)]
pub struct Transcript {
    by_character: HashMap<CharacterId, Vec<ConversationTurn>>,
    order: Vec<(CharacterId, TurnRole, String)>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, character: CharacterId, role: TurnRole, text: &str, at: Instant) {
        self.by_character
            .entry(character)
            .or_default()
            .push(ConversationTurn {
                role,
                text: text.to_string(),
                at,
            });
        self.order.push((character, role, text.to_string()));
    }

    /// The turn list for one character, oldest first.
    pub fn turns(&self, character: CharacterId) -> &[ConversationTurn] {
        self.by_character
            .get(&character)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The character's most recent utterance, if any.
    pub fn last_assistant_line(&self, character: CharacterId) -> Option<&str> {
        self.turns(character)
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::Assistant)
            .map(|t| t.text.as_str())
    }

    pub fn has_spoken_with(&self, character: CharacterId) -> bool {
        !self.turns(character).is_empty()
    }

    /// Render every conversation in the order it happened. User turns are
    /// labelled "You"; assistant turns carry the character name.
    pub fn export(&self) -> String {
        let mut out = String::new();
        for (character, role, text) in &self.order {
            let speaker = match role {
                TurnRole::User => "You",
                TurnRole::Assistant => character.name(),
            };
            out.push_str(speaker);
            out.push_str(": ");
            out.push_str(text);
            out.push_str("\n\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_kept_per_character() {
        let now = Instant::now();
        let mut transcript = Transcript::new();
        transcript.record(CharacterId::Logos, TurnRole::Assistant, "hello", now);
        transcript.record(CharacterId::Evan, TurnRole::Assistant, "hi", now);
        transcript.record(CharacterId::Logos, TurnRole::User, "who sent it?", now);

        assert_eq!(transcript.turns(CharacterId::Logos).len(), 2);
        assert_eq!(transcript.turns(CharacterId::Evan).len(), 1);
        assert!(transcript.turns(CharacterId::Indus).is_empty());
    }

    #[test]
    fn export_interleaves_chronologically_with_speaker_labels() {
        let now = Instant::now();
        let mut transcript = Transcript::new();
        transcript.record(CharacterId::Logos, TurnRole::Assistant, "first", now);
        transcript.record(CharacterId::Logos, TurnRole::User, "second", now);
        transcript.record(CharacterId::Evan, TurnRole::Assistant, "third", now);

        assert_eq!(
            transcript.export(),
            "LOGOS-09: first\n\nYou: second\n\nEvan: third\n\n"
        );
    }

    #[test]
    fn last_assistant_line_skips_user_turns() {
        let now = Instant::now();
        let mut transcript = Transcript::new();
        transcript.record(CharacterId::Indus, TurnRole::Assistant, "a", now);
        transcript.record(CharacterId::Indus, TurnRole::User, "b", now);

        assert_eq!(
            transcript.last_assistant_line(CharacterId::Indus),
            Some("a")
        );
        assert_eq!(transcript.last_assistant_line(CharacterId::Evan), None);
    }
}
