//! The three characters the judge can question during the investigation.

/// A questionable character in the trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterId {
    /// The log-management AI witness.
    Logos,
    /// The defendant, an industrial supervision AI.
    Indus,
    /// The human worker witness.
    Evan,
}

impl CharacterId {
    pub const ALL: [CharacterId; 3] = [CharacterId::Logos, CharacterId::Indus, CharacterId::Evan];

    /// Display name, also used as the speaker label in transcripts.
    pub fn name(self) -> &'static str {
        match self {
            CharacterId::Logos => "LOGOS-09",
            CharacterId::Indus => "INDUS-07",
            CharacterId::Evan => "Evan",
        }
    }

    /// The fixed line the character opens with on the judge's first visit.
    pub fn intro_line(self) -> &'static str {
        match self {
            CharacterId::Logos => {
                "It is currently 16-07-2027 22:17:32. I have detected a message from INDUS-07 \
                 sent to site workers to increase the output levels of the power plant by 15%."
            }
            CharacterId::Indus => {
                "It is currently 16-07-2027 21:27:34. I am preparing and analysing a way to \
                 increase the output of the power plant."
            }
            CharacterId::Evan => {
                "It's early in the morning. I just arrived at the Greenhill Power Plant site \
                 and heard a huge explosion."
            }
        }
    }
}
