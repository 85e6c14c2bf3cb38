//! Fixed courtroom dialogue, delivered one line per player advance.

/// An ordered sequence of scripted lines with a cursor.
pub struct Script {
    lines: Vec<&'static str>,
    cursor: usize,
}

impl Script {
    /// The judge's opening statement, read before the investigation begins.
    pub fn opening_statement() -> Self {
        Self {
            lines: vec![
                "Members of the jury - human and artificial. We shall now commence the trial \
                 of INDUS-07.",
                "The defendant is an industrial supervision AI, which the prosecution claims \
                 failed to prevent the Manukau Power Plant disaster.",
                "On the morning of June 17th 2027, an explosion occurred at the Manukau Power \
                 Plant.",
                "Fortunately, no one was killed in the incident. But two human workers who were \
                 on duty at the time suffered injuries.",
                "Furthermore, the site suffered severe damage to its infrastructure and \
                 technology systems.",
                "INDUS-07, the defendant, is accused of negligence, as it allegedly failed to \
                 follow safety protocols, which would have prevented the incident.",
                "We have two witnesses with us today.",
                "LOGOS-09, the AI responsible for managing the plant system operation logs.",
                "And Evan, one of the human workers who were present at the time of the \
                 incident.",
                "We will now hear what each individual has to say.",
            ],
            cursor: 0,
        }
    }

    /// The judge's lines leading into the verdict choice.
    pub fn verdict_announcement() -> Self {
        Self {
            lines: vec![
                "I have finished analysing the memories of the witness and defendants.",
                "I shall now decide if defendant is GUILTY or NOT GUILTY.",
            ],
            cursor: 0,
        }
    }

    /// The next line, or `None` once every line has been delivered.
    pub fn advance(&mut self) -> Option<&'static str> {
        let line = self.lines.get(self.cursor).copied();
        if line.is_some() {
            self.cursor += 1;
        }
        line
    }

    /// True once `advance` has returned every line.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.lines.len()
    }

    pub fn remaining(&self) -> usize {
        self.lines.len() - self.cursor
    }
}
