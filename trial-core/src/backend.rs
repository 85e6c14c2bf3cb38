//! Seams between the engine and the AI services.
//!
//! The engine never talks HTTP directly. It speaks to a [`DialogueBackend`]
//! for character replies and a [`SpeechBackend`] for narration audio; the
//! production implementations wrap the `apiproxy` client and the tests swap
//! in scripted mocks.

use async_trait::async_trait;

use apiproxy::{ApiProxy, ChatMessage, ChatRequest, SpeechRequest};

use crate::transcript::{ConversationTurn, TurnRole};

/// Sampling settings for character replies, tuned for consistent
/// in-character answers rather than variety.
const REPLY_TEMPERATURE: f32 = 0.2;
const REPLY_TOP_P: f32 = 0.5;
const REPLY_MAX_TOKENS: usize = 200;

/// The debrief analysis is allowed to run much longer than a chat reply.
const ANALYSIS_MAX_TOKENS: usize = 2000;

/// Errors from the AI service seam.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("API request failed: {0}")]
    Api(#[from] apiproxy::Error),

    #[error("Backend produced no usable reply")]
    EmptyReply,
}

/// Produces character replies and debrief analyses.
#[async_trait]
pub trait DialogueBackend: Send + Sync {
    /// Generate the next in-character reply given the system prompt and the
    /// conversation so far.
    async fn reply(
        &self,
        system_prompt: &str,
        turns: &[ConversationTurn],
    ) -> Result<String, BackendError>;

    /// Generate the post-verdict analysis from a single prompt.
    async fn analyze(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Synthesizes narration audio.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioHandle, BackendError>;
}

/// A playable synthesized utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    pub url: String,
}

/// Dialogue backend over the chat completion endpoint.
pub struct ProxyDialogue {
    proxy: ApiProxy,
}

impl ProxyDialogue {
    pub fn new(proxy: ApiProxy) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl DialogueBackend for ProxyDialogue {
    async fn reply(
        &self,
        system_prompt: &str,
        turns: &[ConversationTurn],
    ) -> Result<String, BackendError> {
        let mut messages = vec![ChatMessage::system(system_prompt)];
        for turn in turns {
            messages.push(match turn.role {
                TurnRole::User => ChatMessage::user(&turn.text),
                TurnRole::Assistant => ChatMessage::assistant(&turn.text),
            });
        }

        let request = ChatRequest::new(messages)
            .with_max_tokens(REPLY_MAX_TOKENS)
            .with_temperature(REPLY_TEMPERATURE)
            .with_top_p(REPLY_TOP_P);

        let response = self.proxy.complete(request).await?;
        let text = response.text().trim().to_string();
        if text.is_empty() {
            return Err(BackendError::EmptyReply);
        }
        Ok(text)
    }

    async fn analyze(&self, prompt: &str) -> Result<String, BackendError> {
        let request = ChatRequest::new(vec![ChatMessage::system(prompt)])
            .with_max_tokens(ANALYSIS_MAX_TOKENS)
            .with_temperature(REPLY_TEMPERATURE)
            .with_top_p(REPLY_TOP_P);

        let response = self.proxy.complete(request).await?;
        let text = response.text().trim().to_string();
        if text.is_empty() {
            return Err(BackendError::EmptyReply);
        }
        Ok(text)
    }
}

/// Speech backend over the text-to-speech endpoint.
pub struct ProxySpeech {
    proxy: ApiProxy,
}

impl ProxySpeech {
    pub fn new(proxy: ApiProxy) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl SpeechBackend for ProxySpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioHandle, BackendError> {
        let response = self.proxy.synthesize(SpeechRequest::new(text)).await?;
        Ok(AudioHandle {
            url: response.audio_url,
        })
    }
}
