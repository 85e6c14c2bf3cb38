//! Trial simulation engine with AI witnesses.
//!
//! This crate provides:
//! - The game state machine for a courtroom trial play-through
//! - A shared countdown timer with multi-display broadcast
//! - A character-by-character text reveal engine
//! - A response synchronizer pacing AI replies against the player's typing
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Instant;
//! use trial_core::{
//!     spawn_backend_worker, Action, ProxyDialogue, ProxySpeech, Session,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let proxy = apiproxy::ApiProxy::from_env()?;
//!     let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
//!
//!     let mut session = Session::new(event_tx.clone());
//!     let commands = spawn_backend_worker(
//!         Arc::new(ProxyDialogue::new(proxy.clone())),
//!         Arc::new(ProxySpeech::new(proxy)),
//!         event_tx,
//!     );
//!
//!     session.handle_action(Action::Continue, Instant::now());
//!     loop {
//!         let now = Instant::now();
//!         while let Ok(event) = event_rx.try_recv() {
//!             session.handle_event(event, now);
//!         }
//!         session.tick(now);
//!         for command in session.take_commands() {
//!             let _ = commands.send(command);
//!         }
//!         // render, read input...
//!     }
//! }
//! ```

pub mod backend;
pub mod cast;
pub mod prompts;
pub mod reveal;
pub mod script;
pub mod session;
pub mod sync;
pub mod testing;
pub mod timer;
pub mod transcript;
pub mod worker;

// Primary public API
pub use backend::{AudioHandle, BackendError, DialogueBackend, ProxyDialogue, ProxySpeech, SpeechBackend};
pub use cast::CharacterId;
pub use reveal::{RevealEngine, RevealEvent, Surface};
pub use script::Script;
pub use session::{Action, Command, Phase, Session, SessionEvent, Verdict, INVESTIGATION_SECS};
pub use sync::{Exchange, MIN_REPLY_GAP};
pub use testing::{MockDialogue, MockSpeech, TestHarness};
pub use timer::{CountdownTimer, DialTimerDisplay, DisplayId, TextTimerDisplay, TimerDisplay};
pub use transcript::{ConversationTurn, Transcript, TurnRole};
pub use worker::spawn_backend_worker;
