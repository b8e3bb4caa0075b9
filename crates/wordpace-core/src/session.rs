//! Playback session state — tokens, cursor, phase, and UI enablement.

use serde::{Deserialize, Serialize};

use crate::tokenizer::WordToken;

/// The enumerated playback state.
///
/// Replaces the `is_speaking`/`is_paused` boolean pair: exactly three valid
/// phases, with the invalid fourth combination unrepresentable. Stopping is
/// not a phase of its own — `stop()` collapses straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// No session active; a new one may start.
    #[default]
    Idle,

    /// A word is being vocalized, or its inter-word gap is elapsing.
    Speaking,

    /// Playback suspended mid-session; the cursor word re-speaks on resume.
    Paused,
}

/// One read-aloud pass over an immutable text snapshot.
///
/// Created when playback starts, mutated only by the controller, dropped on
/// stop or natural completion.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    tokens: Vec<WordToken>,
    cursor: usize,
}

impl PlaybackSession {
    pub(crate) fn new(tokens: Vec<WordToken>, cursor: usize) -> Self {
        Self { tokens, cursor }
    }

    /// All tokens of the session, in source order.
    #[must_use]
    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    /// Index of the current/next token.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of tokens in the session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the session holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token under the cursor, or `None` once the session has run out.
    #[must_use]
    pub fn current(&self) -> Option<&WordToken> {
        self.tokens.get(self.cursor)
    }

    /// Whether the cursor has moved past the last token.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }
}

/// The four UI-enablement signals, derived purely from [`Phase`].
// Wire-shape DTO: the four bools are the four independent button-enablement
// signals a host UI binds to. There is no grouping that would read better
// for consumers of the serialized form.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    /// A new session may start.
    pub start_enabled: bool,

    /// Playback may be paused.
    pub pause_enabled: bool,

    /// Playback may be resumed.
    pub resume_enabled: bool,

    /// Playback may be stopped.
    pub stop_enabled: bool,
}

impl Controls {
    /// Derive the enablement signals for a phase.
    #[must_use]
    pub const fn for_phase(phase: Phase) -> Self {
        Self {
            start_enabled: matches!(phase, Phase::Idle),
            pause_enabled: matches!(phase, Phase::Speaking),
            resume_enabled: matches!(phase, Phase::Paused),
            stop_enabled: matches!(phase, Phase::Speaking | Phase::Paused),
        }
    }
}
