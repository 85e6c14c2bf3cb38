//! Background worker executing AI requests off the interaction thread.
//!
//! The session queues [`Command`]s; the worker runs them against the
//! backends and posts [`SessionEvent`]s back. Speech synthesis is
//! fire-and-forget: failures are logged and never produce an event.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::{DialogueBackend, SpeechBackend};
use crate::session::{Command, SessionEvent};

/// Spawn the worker task. Returns the sender the interaction loop feeds
/// drained session commands into; dropping it shuts the worker down.
pub fn spawn_backend_worker(
    dialogue: Arc<dyn DialogueBackend>,
    speech: Arc<dyn SpeechBackend>,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> mpsc::UnboundedSender<Command> {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Command>();

    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            match command {
                Command::RequestReply {
                    character,
                    request_id,
                    system_prompt,
                    turns,
                } => {
                    // Each request gets its own task so a slow reply never
                    // delays speech or a later request.
                    let dialogue = Arc::clone(&dialogue);
                    let events = events.clone();
                    tokio::spawn(async move {
                        let event = match dialogue.reply(&system_prompt, &turns).await {
                            Ok(text) => SessionEvent::ReplyArrived {
                                character,
                                request_id,
                                text,
                            },
                            Err(error) => {
                                tracing::warn!(?character, request_id, %error, "reply failed");
                                SessionEvent::ReplyFailed {
                                    character,
                                    request_id,
                                }
                            }
                        };
                        let _ = events.send(event);
                    });
                }
                Command::Speak { text } => {
                    let speech = Arc::clone(&speech);
                    tokio::spawn(async move {
                        if let Err(error) = speech.synthesize(&text).await {
                            tracing::warn!(%error, "speech synthesis failed");
                        }
                    });
                }
                Command::Analyze { prompt } => {
                    let dialogue = Arc::clone(&dialogue);
                    let events = events.clone();
                    tokio::spawn(async move {
                        let event = match dialogue.analyze(&prompt).await {
                            Ok(text) => SessionEvent::AnalysisArrived { text },
                            Err(error) => {
                                tracing::warn!(%error, "analysis failed");
                                SessionEvent::AnalysisFailed
                            }
                        };
                        let _ = events.send(event);
                    });
                }
            }
        }
    });

    command_tx
}
