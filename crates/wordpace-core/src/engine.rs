//! Speech engine seam — the trait the controller drives utterances through.
//!
//! The controller operates on a trait object (`Box<dyn SpeechEngine>`) so
//! that engines can be swapped without touching the playback logic. An
//! engine is constructed with an [`EngineNotice`] sender; `speak` only
//! issues the utterance and the completion arrives later on that channel,
//! which keeps the controller free of engine-specific callback wiring.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReaderError;

/// Identifier for one engine-level utterance (a single spoken word).
///
/// Allocated by the controller, monotonically increasing. Notices carrying
/// any id other than the controller's current one are stale and ignored, so
/// a cancelled utterance that still manages to report back cannot corrupt
/// the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

/// How an utterance ended.
#[derive(Debug, Clone)]
pub enum UtteranceOutcome {
    /// The engine finished vocalizing the word.
    Completed,

    /// The engine failed mid-utterance. The controller treats this the same
    /// as completion so the session keeps moving instead of stalling.
    Errored(String),
}

/// Asynchronous notifications from a speech engine back to its host.
#[derive(Debug, Clone)]
pub enum EngineNotice {
    /// Exactly one of these fires per utterance that was not cancelled.
    UtteranceFinished {
        /// Id the utterance was issued with.
        id: UtteranceId,
        /// Completed or errored; cancelled utterances report nothing.
        outcome: UtteranceOutcome,
    },

    /// The voice catalog became available or changed. The host should
    /// refresh it wholesale via [`SpeechEngine::voices`].
    VoicesChanged,
}

/// One engine-level request to vocalize a single word.
#[derive(Debug, Clone)]
pub struct UtteranceRequest {
    /// Id the eventual [`EngineNotice::UtteranceFinished`] must echo.
    pub id: UtteranceId,

    /// The word to speak.
    pub text: String,

    /// Playback rate multiplier (1.0 = normal).
    pub rate: f32,

    /// Engine-specific voice identifier; `None` for the engine default.
    pub voice: Option<String>,
}

/// A voice the engine can speak with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Opaque identifier, passed back via [`UtteranceRequest::voice`].
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Language/accent tag (e.g. `"en-GB"`).
    pub language: String,
}

/// Backend-agnostic speech engine.
///
/// Implementations must keep at most one utterance in flight: `speak` cancels
/// any live utterance before issuing the new one.
#[async_trait]
pub trait SpeechEngine: Send {
    /// Start vocalizing one word at the given rate and voice.
    ///
    /// Completion is reported later as exactly one
    /// [`EngineNotice::UtteranceFinished`] carrying `request.id`.
    fn speak(&mut self, request: UtteranceRequest) -> Result<(), ReaderError>;

    /// Pause the in-flight utterance. Engines without mid-utterance pause
    /// may cancel instead — the controller re-speaks the current word on
    /// resume either way.
    fn pause(&mut self);

    /// Resume a paused utterance where supported. Best-effort: the
    /// controller does not rely on it and re-issues `speak` regardless.
    fn resume(&mut self);

    /// Cancel the in-flight utterance. No completion notice follows.
    fn cancel(&mut self);

    /// Update the rate of the in-flight utterance where the engine supports
    /// live mutation; otherwise the new rate applies from the next `speak`.
    fn set_rate(&mut self, rate: f32);

    /// Current voice catalog, swapped wholesale on refresh. May be empty
    /// until the engine signals [`EngineNotice::VoicesChanged`].
    async fn voices(&self) -> Result<Vec<VoiceInfo>, ReaderError>;
}
