//! Playback controller — the read-aloud state machine.
//!
//! Drives tokenizer output through the speech engine and highlight sink:
//!
//! ```text
//!   Idle --start--> Speaking(cursor) --pause--> Paused(cursor)
//!     ▲                  │  ▲                       │
//!     │   (last word)    │  └────────resume────────┘
//!     └──────────────────┘    (re-speaks the cursor word)
//! ```
//!
//! Each step of `Speaking` highlights the cursor token's byte range, speaks
//! its text at the live rate/voice, and — once the engine reports the
//! utterance finished — arms a single generation-tagged delay timer whose
//! fire advances the cursor. The two asynchronous events
//! ([`utterance_finished`](ReadAloudController::utterance_finished) and
//! [`delay_elapsed`](ReadAloudController::delay_elapsed)) are plain method
//! calls, so hosts can drive them from callbacks, futures, or channels
//! interchangeably.
//!
//! Commands are accepted at any time and never block: the only suspension
//! points live in the engine and the timer, and both are cancellable.

use tokio::sync::mpsc;

use crate::config::{RATE_RANGE, ReaderConfig};
use crate::delay::inter_word_delay;
use crate::engine::{SpeechEngine, UtteranceId, UtteranceOutcome, UtteranceRequest};
use crate::error::ReaderError;
use crate::highlight::HighlightSink;
use crate::session::{Controls, Phase, PlaybackSession};
use crate::timer::{DelayTimer, TimerGeneration};
use crate::tokenizer::{self, WordToken};

/// Events emitted by the controller to the UI / host layer.
#[derive(Debug, Clone)]
pub enum ReaderEvent {
    /// The playback phase changed.
    PhaseChanged(Phase),

    /// A word started speaking. Mirrors the range the highlight sink got.
    WordStarted {
        /// Token index within the session.
        index: usize,
        /// Byte offset of the word's first byte.
        start: usize,
        /// Byte offset one past the word's last byte.
        end: usize,
    },

    /// Token count of the freshly started session — the word-count readout.
    WordCount(usize),

    /// The session ran to natural completion.
    Finished,

    /// A non-fatal error the host may want to surface.
    Error(String),
}

/// The read-aloud state machine.
///
/// Owns the session state outright — no ambient globals — so controllers
/// are constructible in tests and multiple independent instances can
/// coexist. All mutation happens through `&mut self` from a single host
/// loop; live parameters may be updated between any two events.
pub struct ReadAloudController {
    engine: Box<dyn SpeechEngine>,
    highlight: Box<dyn HighlightSink>,
    timer: Box<dyn DelayTimer>,

    config: ReaderConfig,
    phase: Phase,
    session: Option<PlaybackSession>,

    /// Event sender channel.
    event_tx: mpsc::UnboundedSender<ReaderEvent>,

    /// Monotonic id source for utterances; only the latest id is honored.
    utterance_seq: u64,
    current_utterance: Option<UtteranceId>,

    /// Monotonic generation source for delay timers; only the latest armed
    /// generation is honored.
    timer_seq: u64,
    pending_timer: Option<TimerGeneration>,
}

impl ReadAloudController {
    /// Create a controller around the given collaborators.
    ///
    /// Returns the controller and a receiver for [`ReaderEvent`]s.
    ///
    /// # Errors
    ///
    /// Propagates [`ReaderConfig::validate`] failures.
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        highlight: Box<dyn HighlightSink>,
        timer: Box<dyn DelayTimer>,
        config: ReaderConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ReaderEvent>), ReaderError> {
        config.validate()?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let controller = Self {
            engine,
            highlight,
            timer,
            config,
            phase: Phase::Idle,
            session: None,
            event_tx,
            utterance_seq: 0,
            current_utterance: None,
            timer_seq: 0,
            pending_timer: None,
        };

        Ok((controller, event_rx))
    }

    // ── Introspection ──────────────────────────────────────────────

    /// Current playback phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// UI-enablement signals for the current phase.
    #[must_use]
    pub const fn controls(&self) -> Controls {
        Controls::for_phase(self.phase)
    }

    /// Token count of the active session, 0 when idle.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.session.as_ref().map_or(0, PlaybackSession::len)
    }

    /// The active session, if one is running or paused.
    #[must_use]
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Live reader parameters.
    #[must_use]
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    // ── Commands ───────────────────────────────────────────────────

    /// Start reading `text` from its first word.
    ///
    /// No-op if a session is already active or `text` is blank.
    ///
    /// # Errors
    ///
    /// [`ReaderError::TokenizationMismatch`] if a word cannot be placed in
    /// the source text; no session starts in that case.
    pub fn start(&mut self, text: &str) -> Result<(), ReaderError> {
        self.start_from(text, None)
    }

    /// Start reading `text`, optionally from a host-provided token index
    /// (a "resume from current selection" hint). Out-of-range hints fall
    /// back to the first word.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn start_from(
        &mut self,
        text: &str,
        resume_hint: Option<usize>,
    ) -> Result<(), ReaderError> {
        if self.phase != Phase::Idle {
            tracing::debug!(phase = ?self.phase, "start ignored: session already active");
            return Ok(());
        }

        let tokens = match tokenizer::tokenize(text) {
            Ok(tokens) => tokens,
            Err(ReaderError::EmptyInput) => {
                tracing::debug!("start ignored: empty input");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.emit(ReaderEvent::WordCount(tokens.len()));

        let cursor = resume_hint.filter(|&i| i < tokens.len()).unwrap_or(0);
        tracing::info!(words = tokens.len(), cursor, "Starting read-aloud session");

        self.session = Some(PlaybackSession::new(tokens, cursor));
        self.set_phase(Phase::Speaking);
        self.speak_current();
        Ok(())
    }

    /// Pause playback. No-op unless currently speaking.
    ///
    /// Cancels the pending inter-word timer so no advance happens while
    /// paused, and asks the engine to pause the in-flight utterance.
    pub fn pause(&mut self) {
        if self.phase != Phase::Speaking {
            tracing::debug!(phase = ?self.phase, "pause ignored");
            return;
        }

        self.cancel_pending_timer();
        self.engine.pause();
        self.set_phase(Phase::Paused);
    }

    /// Resume playback. No-op unless paused.
    ///
    /// The engine's own resume is signaled, but the controller does not rely
    /// on it: the cursor word is re-spoken from its start, so engines that
    /// cannot resume mid-utterance work unchanged.
    pub fn resume(&mut self) {
        if self.phase != Phase::Paused {
            tracing::debug!(phase = ?self.phase, "resume ignored");
            return;
        }

        self.set_phase(Phase::Speaking);
        self.engine.resume();
        self.speak_current();
    }

    /// Stop playback and tear the session down. Always succeeds, idempotent.
    pub fn stop(&mut self) {
        self.cancel_pending_timer();
        self.engine.cancel();
        self.current_utterance = None;

        if self.session.take().is_some() {
            tracing::info!("Read-aloud session stopped");
        }
        self.set_phase(Phase::Idle);
    }

    /// Update the live playback rate.
    ///
    /// Out-of-range values are ignored with a warning. The engine is asked
    /// to mutate the in-flight utterance; engines that cannot will apply
    /// the new rate from the next word.
    pub fn set_rate(&mut self, rate: f32) {
        if !rate.is_finite() || !RATE_RANGE.contains(&rate) {
            tracing::warn!(rate, "ignoring out-of-range rate");
            return;
        }
        self.config.rate = rate;
        self.engine.set_rate(rate);
    }

    /// Update the live inter-word delay multiplier.
    ///
    /// Non-positive values are ignored with a warning. Affects only future
    /// gap computations, never the one already elapsing.
    pub fn set_delay_multiplier(&mut self, multiplier: f32) {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            tracing::warn!(multiplier, "ignoring non-positive delay multiplier");
            return;
        }
        self.config.delay_multiplier = multiplier;
    }

    /// Select the voice for subsequent words.
    pub fn set_voice(&mut self, voice: impl Into<String>) {
        self.config.voice = Some(voice.into());
    }

    // ── Asynchronous events ────────────────────────────────────────

    /// The engine reports an utterance finished (or failed).
    ///
    /// Stale ids — anything but the utterance the controller last issued —
    /// are dropped, as are reports arriving outside `Speaking` (e.g. for an
    /// utterance the engine tore down during pause). Errors count as
    /// completion so the session keeps moving.
    pub fn utterance_finished(&mut self, id: UtteranceId, outcome: UtteranceOutcome) {
        if self.phase != Phase::Speaking || self.current_utterance != Some(id) {
            tracing::debug!(?id, phase = ?self.phase, "stale utterance report dropped");
            return;
        }
        self.current_utterance = None;

        if let UtteranceOutcome::Errored(message) = outcome {
            tracing::warn!(%message, "engine error mid-utterance, advancing anyway");
            self.emit(ReaderEvent::Error(message));
        }

        if let Some(token) = self.session.as_ref().and_then(PlaybackSession::current) {
            let token = token.clone();
            self.schedule_advance(&token);
        }
    }

    /// The inter-word delay elapsed; advance to the next word.
    ///
    /// Stale generations — anything but the timer last armed — are dropped,
    /// so a fire that raced its own cancellation cannot corrupt the cursor.
    pub fn delay_elapsed(&mut self, generation: TimerGeneration) {
        if self.phase != Phase::Speaking || self.pending_timer != Some(generation) {
            tracing::debug!(?generation, phase = ?self.phase, "stale timer fire dropped");
            return;
        }
        self.pending_timer = None;

        let finished = match self.session.as_mut() {
            Some(session) => {
                session.advance();
                session.is_finished()
            }
            None => return,
        };

        if finished {
            self.finish_session();
        } else {
            self.speak_current();
        }
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Highlight and speak the token under the cursor.
    fn speak_current(&mut self) {
        let Some((index, token)) = self
            .session
            .as_ref()
            .and_then(|s| s.current().map(|t| (s.cursor(), t.clone())))
        else {
            return;
        };

        self.highlight.highlight_range(token.start, token.end);
        self.highlight.ensure_visible(token.start, token.end);
        self.emit(ReaderEvent::WordStarted {
            index,
            start: token.start,
            end: token.end,
        });

        self.utterance_seq += 1;
        let id = UtteranceId(self.utterance_seq);
        self.current_utterance = Some(id);

        tracing::debug!(index, word = %token.text, "speaking word");
        let request = UtteranceRequest {
            id,
            text: token.text.clone(),
            rate: self.config.rate,
            voice: self.config.voice.clone(),
        };
        if let Err(e) = self.engine.speak(request) {
            // Forward-progress rule: a word that cannot be spoken is treated
            // as already finished rather than stalling the session.
            tracing::warn!(error = %e, "speak failed, advancing anyway");
            self.emit(ReaderEvent::Error(e.to_string()));
            self.current_utterance = None;
            self.schedule_advance(&token);
        }
    }

    /// Arm the single inter-word timer for the gap after `token`.
    ///
    /// The previous timer is cancelled unconditionally before the new one is
    /// armed — no code path may leave two pending fires.
    fn schedule_advance(&mut self, token: &WordToken) {
        self.timer.cancel();

        self.timer_seq += 1;
        let generation = TimerGeneration(self.timer_seq);
        self.pending_timer = Some(generation);

        let gap = inter_word_delay(token, self.config.delay_multiplier);
        tracing::debug!(gap_ms = gap.as_millis(), ?generation, "arming inter-word timer");
        self.timer.arm(gap, generation);
    }

    fn cancel_pending_timer(&mut self) {
        self.timer.cancel();
        self.pending_timer = None;
    }

    /// Natural completion: tear the session down and report it.
    fn finish_session(&mut self) {
        self.cancel_pending_timer();
        self.current_utterance = None;
        self.session = None;

        tracing::info!("Read-aloud session finished");
        self.emit(ReaderEvent::Finished);
        self.set_phase(Phase::Idle);
    }

    /// Transition to a new phase and emit a phase-change event.
    fn set_phase(&mut self, new_phase: Phase) {
        if self.phase != new_phase {
            tracing::debug!(old = ?self.phase, new = ?new_phase, "phase transition");
            self.phase = new_phase;
            self.emit(ReaderEvent::PhaseChanged(new_phase));
        }
    }

    /// Emit an event (best-effort — a dropped receiver is logged, not fatal).
    fn emit(&self, event: ReaderEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("Reader event receiver dropped");
        }
    }
}

impl Drop for ReadAloudController {
    fn drop(&mut self) {
        self.stop();
    }
}
