//! Shared countdown timer with multi-display broadcast.
//!
//! One timer instance is created at session start and shared by every phase
//! that needs it. It is an explicitly owned service: whoever owns the
//! `Session` owns the timer, and lifecycle is tied to the session rather
//! than to any global.
//!
//! The timer is poll-driven. The interaction loop calls [`CountdownTimer::poll`]
//! with the current instant; whole elapsed seconds are converted into ticks.
//! Each tick decrements the remaining time by one second and broadcasts the
//! new value to every registered display. When the remaining time reaches
//! zero the timer stops itself and invokes the expiry notifier exactly once.
//! The notifier is expected to enqueue work (e.g. send a session event), not
//! to do it inline.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Identity of a registered display. Registration is idempotent per id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayId(pub &'static str);

/// A subscriber that renders the countdown somewhere.
pub trait TimerDisplay: Send {
    /// Stable identity used to deduplicate registrations.
    fn id(&self) -> DisplayId;

    /// Receive the current countdown value.
    fn update(&mut self, remaining: u32, maximum: u32);
}

/// Textual display: formats the remaining seconds with a fixed width of 3.
pub struct TextTimerDisplay {
    id: DisplayId,
    cell: Arc<Mutex<String>>,
}

impl TextTimerDisplay {
    pub fn new(id: DisplayId) -> Self {
        Self {
            id,
            cell: Arc::new(Mutex::new(String::new())),
        }
    }

    /// Handle the view reads the formatted value through.
    pub fn handle(&self) -> Arc<Mutex<String>> {
        Arc::clone(&self.cell)
    }
}

impl TimerDisplay for TextTimerDisplay {
    fn id(&self) -> DisplayId {
        self.id
    }

    fn update(&mut self, remaining: u32, _maximum: u32) {
        if let Ok(mut cell) = self.cell.lock() {
            *cell = format!("{remaining:3}");
        }
    }
}

/// Radial display: exposes the remaining fraction in `[0, 1]`.
pub struct DialTimerDisplay {
    id: DisplayId,
    cell: Arc<Mutex<f64>>,
}

impl DialTimerDisplay {
    pub fn new(id: DisplayId) -> Self {
        Self {
            id,
            cell: Arc::new(Mutex::new(1.0)),
        }
    }

    pub fn handle(&self) -> Arc<Mutex<f64>> {
        Arc::clone(&self.cell)
    }
}

impl TimerDisplay for DialTimerDisplay {
    fn id(&self) -> DisplayId {
        self.id
    }

    fn update(&mut self, remaining: u32, maximum: u32) {
        if let Ok(mut cell) = self.cell.lock() {
            *cell = if maximum == 0 {
                0.0
            } else {
                f64::from(remaining) / f64::from(maximum)
            };
        }
    }
}

/// The shared countdown.
pub struct CountdownTimer {
    remaining: u32,
    maximum: u32,
    running: bool,
    last_tick: Option<Instant>,
    displays: Vec<Box<dyn TimerDisplay>>,
    on_expired: Option<Box<dyn FnMut() + Send>>,
}

impl CountdownTimer {
    /// Create a stopped timer with the given budget in seconds.
    pub fn new(maximum: u32) -> Self {
        Self {
            remaining: maximum,
            maximum,
            running: false,
            last_tick: None,
            displays: Vec::new(),
            on_expired: None,
        }
    }

    /// Start ticking. Starting a running timer is a no-op.
    pub fn start(&mut self, now: Instant) {
        if !self.running {
            self.running = true;
            self.last_tick = Some(now);
        }
    }

    /// Stop ticking. Stopping a stopped timer is a no-op.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.last_tick = None;
        }
    }

    /// Reset the budget; remaining time snaps to the new maximum.
    pub fn set_maximum(&mut self, seconds: u32) {
        self.maximum = seconds;
        self.remaining = seconds;
        self.broadcast();
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Register a display. Duplicate ids are ignored; every registration
    /// broadcasts the current value to all displays, the new one included.
    pub fn register_display(&mut self, display: Box<dyn TimerDisplay>) {
        if self.displays.iter().any(|d| d.id() == display.id()) {
            return;
        }
        self.displays.push(display);
        self.broadcast();
    }

    /// Set the expiry notifier, replacing any previous one. Single slot:
    /// only the active phase listens for expiry.
    pub fn on_expired(&mut self, notifier: Box<dyn FnMut() + Send>) {
        self.on_expired = Some(notifier);
    }

    /// Convert elapsed wall time into ticks. Called from the interaction
    /// loop; never blocks.
    pub fn poll(&mut self, now: Instant) {
        const SECOND: Duration = Duration::from_secs(1);
        while self.running {
            let Some(last) = self.last_tick else { break };
            if now.saturating_duration_since(last) < SECOND {
                break;
            }
            self.last_tick = Some(last + SECOND);
            self.tick();
        }
    }

    /// One tick: decrement, broadcast, and fire expiry at zero.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.broadcast();
        if self.remaining == 0 {
            self.stop();
            if let Some(notifier) = self.on_expired.as_mut() {
                notifier();
            }
        }
    }

    fn broadcast(&mut self) {
        for display in &mut self.displays {
            display.update(self.remaining, self.maximum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingDisplay {
        id: DisplayId,
        updates: Arc<AtomicU32>,
        last: Arc<Mutex<(u32, u32)>>,
    }

    impl TimerDisplay for CountingDisplay {
        fn id(&self) -> DisplayId {
            self.id
        }

        fn update(&mut self, remaining: u32, maximum: u32) {
            self.updates.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = (remaining, maximum);
        }
    }

    fn counting(id: &'static str) -> (Box<CountingDisplay>, Arc<AtomicU32>, Arc<Mutex<(u32, u32)>>) {
        let updates = Arc::new(AtomicU32::new(0));
        let last = Arc::new(Mutex::new((0, 0)));
        (
            Box::new(CountingDisplay {
                id: DisplayId(id),
                updates: Arc::clone(&updates),
                last: Arc::clone(&last),
            }),
            updates,
            last,
        )
    }

    #[test]
    fn registration_pushes_current_value_immediately() {
        let mut timer = CountdownTimer::new(120);
        let (display, updates, last) = counting("label");
        timer.register_display(display);

        assert_eq!(updates.load(Ordering::SeqCst), 1);
        assert_eq!(*last.lock().unwrap(), (120, 120));
    }

    #[test]
    fn duplicate_registration_is_a_no_op() {
        let mut timer = CountdownTimer::new(10);
        let (a, updates_a, _) = counting("label");
        let (b, updates_b, _) = counting("label");
        timer.register_display(a);
        timer.register_display(b);

        timer.start(Instant::now());
        timer.tick();

        // Only the first registration receives updates.
        assert_eq!(updates_a.load(Ordering::SeqCst), 2);
        assert_eq!(updates_b.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registration_refreshes_existing_displays_too() {
        let mut timer = CountdownTimer::new(120);
        let (a, updates_a, last_a) = counting("label");
        timer.register_display(a);
        assert_eq!(updates_a.load(Ordering::SeqCst), 1);

        let (b, updates_b, _) = counting("arc");
        timer.register_display(b);

        assert_eq!(updates_a.load(Ordering::SeqCst), 2);
        assert_eq!(updates_b.load(Ordering::SeqCst), 1);
        assert_eq!(*last_a.lock().unwrap(), (120, 120));
    }

    #[test]
    fn ticks_broadcast_to_all_displays() {
        let mut timer = CountdownTimer::new(10);
        let (a, _, last_a) = counting("label");
        let (b, _, last_b) = counting("arc");
        timer.register_display(a);
        timer.register_display(b);

        timer.start(Instant::now());
        timer.tick();
        timer.tick();

        assert_eq!(*last_a.lock().unwrap(), (8, 10));
        assert_eq!(*last_b.lock().unwrap(), (8, 10));
    }

    #[test]
    fn expires_exactly_once_and_never_goes_negative() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = Arc::clone(&fired);

        let mut timer = CountdownTimer::new(5);
        timer.on_expired(Box::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let start = Instant::now();
        timer.start(start);
        // Poll well past expiry.
        timer.poll(start + Duration::from_secs(60));

        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_running());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Further polls are inert once stopped.
        timer.poll(start + Duration::from_secs(120));
        assert_eq!(timer.remaining(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn poll_converts_elapsed_seconds_into_ticks() {
        let mut timer = CountdownTimer::new(120);
        let start = Instant::now();
        timer.start(start);

        timer.poll(start + Duration::from_millis(2500));
        assert_eq!(timer.remaining(), 118);

        // Sub-second remainder carries over.
        timer.poll(start + Duration::from_millis(3000));
        assert_eq!(timer.remaining(), 117);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut timer = CountdownTimer::new(10);
        let start = Instant::now();
        timer.start(start);
        timer.start(start + Duration::from_secs(5));
        // Second start must not move the tick origin.
        timer.poll(start + Duration::from_secs(1));
        assert_eq!(timer.remaining(), 9);

        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
    }

    #[test]
    fn set_maximum_resets_remaining_and_broadcasts() {
        let mut timer = CountdownTimer::new(120);
        let (display, _, last) = counting("label");
        timer.register_display(display);

        timer.set_maximum(10);
        assert_eq!(timer.remaining(), 10);
        assert_eq!(*last.lock().unwrap(), (10, 10));
    }

    #[test]
    fn provided_displays_format_as_expected() {
        let text = TextTimerDisplay::new(DisplayId("label"));
        let text_handle = text.handle();
        let dial = DialTimerDisplay::new(DisplayId("arc"));
        let dial_handle = dial.handle();

        let mut timer = CountdownTimer::new(120);
        timer.register_display(Box::new(text));
        timer.register_display(Box::new(dial));

        timer.start(Instant::now());
        timer.tick();

        assert_eq!(&*text_handle.lock().unwrap(), "119");
        let fraction = *dial_handle.lock().unwrap();
        assert!((fraction - 119.0 / 120.0).abs() < 1e-9);

        timer.set_maximum(7);
        assert_eq!(&*text_handle.lock().unwrap(), "  7");
    }
}
