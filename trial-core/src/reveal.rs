//! Character-by-character text reveal.
//!
//! Each display surface can run at most one reveal job at a time. Starting a
//! new job on a surface cancels and replaces the previous one before any of
//! the new job's updates are produced, so characters from two jobs never
//! interleave. Every surface carries a generation counter; a job's events
//! are tagged with the generation it was started under, which lets callers
//! distinguish completions of superseded jobs from the current one.
//!
//! Like the countdown timer, the engine is poll-driven: the interaction loop
//! calls [`RevealEngine::poll`] and applies the returned events. A job with
//! text of length N produces exactly N+1 content updates (indices 0..=N)
//! and reports completion exactly once, whether it finished naturally or was
//! fast-forwarded with [`RevealEngine::finish_instantly`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// The display surfaces the game writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The courtroom dialogue area (scripted lines).
    Room,
    /// The flashback chat area (user and witness turns).
    Chat,
    /// The debrief analysis area.
    Debrief,
}

/// Observable outcome of advancing the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    /// The surface's visible content changed by one character step.
    Updated {
        surface: Surface,
        /// Whether the per-character side effect (tick sound) should fire.
        sound: bool,
    },
    /// The job on this surface completed; fired exactly once per job.
    Finished { surface: Surface, generation: u64 },
}

struct RevealJob {
    chars: Vec<char>,
    prefix: String,
    delay: Duration,
    started_at: Instant,
    /// Next character index to emit, in 0..=chars.len().
    emitted: usize,
    generation: u64,
    sound: bool,
}

/// Reveal scheduler and owner of each surface's visible content.
#[derive(Default)]
pub struct RevealEngine {
    jobs: HashMap<Surface, RevealJob>,
    content: HashMap<Surface, String>,
    generations: HashMap<Surface, u64>,
}

impl RevealEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently visible text on a surface.
    pub fn content(&self, surface: Surface) -> &str {
        self.content.get(&surface).map(String::as_str).unwrap_or("")
    }

    /// Replace a surface's content without animating. Cancels any active job.
    pub fn set_content(&mut self, surface: Surface, text: impl Into<String>) {
        self.jobs.remove(&surface);
        self.content.insert(surface, text.into());
    }

    /// True between a `reveal` call and its completion.
    pub fn is_revealing(&self, surface: Surface) -> bool {
        self.jobs.contains_key(&surface)
    }

    /// Start revealing `text` on `surface`, cancelling any active job there.
    ///
    /// Returns the generation of the new job. The first character update is
    /// due immediately; call [`poll`](Self::poll) to apply it.
    pub fn reveal(
        &mut self,
        surface: Surface,
        text: &str,
        delay_per_char: Duration,
        clear_first: bool,
        sound: bool,
        now: Instant,
    ) -> u64 {
        let generation = {
            let g = self.generations.entry(surface).or_insert(0);
            *g += 1;
            *g
        };

        let prefix = if clear_first {
            String::new()
        } else {
            self.content(surface).to_string()
        };

        self.jobs.insert(
            surface,
            RevealJob {
                chars: text.chars().collect(),
                prefix,
                delay: delay_per_char,
                started_at: now,
                emitted: 0,
                generation,
                sound,
            },
        );

        generation
    }

    /// Advance all active jobs to `now`, returning the updates in order.
    pub fn poll(&mut self, now: Instant) -> Vec<RevealEvent> {
        let mut events = Vec::new();
        let surfaces: Vec<Surface> = self.jobs.keys().copied().collect();

        for surface in surfaces {
            let Some(job) = self.jobs.get_mut(&surface) else {
                continue;
            };

            let len = job.chars.len();
            let due = if job.delay.is_zero() {
                len
            } else {
                let elapsed = now.saturating_duration_since(job.started_at);
                // Nanosecond arithmetic so sub-millisecond delays divide
                // cleanly instead of truncating to zero.
                let steps = (elapsed.as_nanos() / job.delay.as_nanos()) as usize;
                steps.min(len)
            };

            let mut finished = None;
            while job.emitted <= due {
                let shown: String = job.chars[..job.emitted].iter().collect();
                let visible = format!("{}{}", job.prefix, shown);
                self.content.insert(surface, visible);
                events.push(RevealEvent::Updated {
                    surface,
                    sound: job.sound,
                });
                if job.emitted == len {
                    finished = Some(job.generation);
                    job.emitted += 1;
                    break;
                }
                job.emitted += 1;
            }

            if let Some(generation) = finished {
                self.jobs.remove(&surface);
                events.push(RevealEvent::Finished {
                    surface,
                    generation,
                });
            }
        }

        events
    }

    /// Fast-forward the active job on `surface`: show the full text at once
    /// and report completion. No-op when nothing is revealing, so calling it
    /// after completion is harmless.
    pub fn finish_instantly(&mut self, surface: Surface) -> Vec<RevealEvent> {
        let Some(job) = self.jobs.remove(&surface) else {
            return Vec::new();
        };

        let full: String = job.chars.iter().collect();
        self.content
            .insert(surface, format!("{}{}", job.prefix, full));

        vec![
            RevealEvent::Updated {
                surface,
                sound: job.sound,
            },
            RevealEvent::Finished {
                surface,
                generation: job.generation,
            },
        ]
    }
}
