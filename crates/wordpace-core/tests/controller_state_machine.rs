//! Integration tests for the `ReadAloudController` state machine.
//!
//! These tests drive the controller through its phase transitions using
//! recording collaborators. No speech synthesis, terminal, or real timers
//! are involved — utterance completions and timer fires are injected
//! directly, so every interleaving is deterministic.
//!
//! # What is tested
//!
//! - The full word-by-word walk of a short text, including the highlight
//!   ranges and the per-word gap durations
//! - `pause` / `resume` / `stop` guards and their effect on engine and timer
//! - Stale utterance reports and stale timer fires are dropped
//! - At most one timer is ever pending
//! - Engine failures advance the session instead of stalling it

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wordpace_core::{
    DelayTimer, HighlightSink, Phase, ReadAloudController, ReaderConfig, ReaderError,
    ReaderEvent, SpeechEngine, TimerGeneration, UtteranceId, UtteranceOutcome,
    UtteranceRequest, VoiceInfo,
};

// ── Recording collaborators ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    Speak { id: UtteranceId, text: String, rate: f32 },
    Pause,
    Resume,
    Cancel,
    SetRate(f32),
}

/// Engine that records every call and never actually speaks.
#[derive(Clone, Default)]
struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    fail_speak: bool,
}

impl RecordingEngine {
    fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    fn spoken_words(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Speak { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Id of the most recently issued utterance, for injecting completions.
    fn last_utterance(&self) -> UtteranceId {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|c| match c {
                EngineCall::Speak { id, .. } => Some(id),
                _ => None,
            })
            .expect("no utterance was issued")
    }

    fn count(&self, wanted: &EngineCall) -> usize {
        self.calls().iter().filter(|c| *c == wanted).count()
    }
}

#[async_trait]
impl SpeechEngine for RecordingEngine {
    fn speak(&mut self, request: UtteranceRequest) -> Result<(), ReaderError> {
        self.calls.lock().unwrap().push(EngineCall::Speak {
            id: request.id,
            text: request.text,
            rate: request.rate,
        });
        if self.fail_speak {
            Err(ReaderError::EngineFailure("synthesizer unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Resume);
    }

    fn cancel(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Cancel);
    }

    fn set_rate(&mut self, rate: f32) {
        self.calls.lock().unwrap().push(EngineCall::SetRate(rate));
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>, ReaderError> {
        Ok(vec![])
    }
}

/// Sink that records every highlighted range.
#[derive(Clone, Default)]
struct RecordingSink {
    highlighted: Arc<Mutex<Vec<(usize, usize)>>>,
}

impl RecordingSink {
    fn highlighted(&self) -> Vec<(usize, usize)> {
        self.highlighted.lock().unwrap().clone()
    }
}

impl HighlightSink for RecordingSink {
    fn highlight_range(&mut self, start: usize, end: usize) {
        self.highlighted.lock().unwrap().push((start, end));
    }

    fn ensure_visible(&mut self, _start: usize, _end: usize) {}
}

#[derive(Debug, Clone, PartialEq)]
enum TimerOp {
    Arm(Duration, TimerGeneration),
    Cancel,
}

/// Timer that records arms and cancels; fires are injected by the test.
#[derive(Clone, Default)]
struct FakeTimer {
    ops: Arc<Mutex<Vec<TimerOp>>>,
}

impl FakeTimer {
    fn ops(&self) -> Vec<TimerOp> {
        self.ops.lock().unwrap().clone()
    }

    fn arms(&self) -> Vec<(Duration, TimerGeneration)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                TimerOp::Arm(after, generation) => Some((after, generation)),
                TimerOp::Cancel => None,
            })
            .collect()
    }

    /// Generation of the most recent arm, for injecting fires.
    fn last_generation(&self) -> TimerGeneration {
        self.arms().last().expect("no timer was armed").1
    }
}

impl DelayTimer for FakeTimer {
    fn arm(&mut self, after: Duration, generation: TimerGeneration) {
        self.ops.lock().unwrap().push(TimerOp::Arm(after, generation));
    }

    fn cancel(&mut self) {
        self.ops.lock().unwrap().push(TimerOp::Cancel);
    }
}

// ── Helpers ────────────────────────────────────────────────────────

struct Harness {
    controller: ReadAloudController,
    engine: RecordingEngine,
    sink: RecordingSink,
    timer: FakeTimer,
    events: tokio::sync::mpsc::UnboundedReceiver<ReaderEvent>,
}

fn harness() -> Harness {
    harness_with(ReaderConfig::default())
}

fn harness_with(config: ReaderConfig) -> Harness {
    let engine = RecordingEngine::default();
    let sink = RecordingSink::default();
    let timer = FakeTimer::default();
    let (controller, events) = ReadAloudController::new(
        Box::new(engine.clone()),
        Box::new(sink.clone()),
        Box::new(timer.clone()),
        config,
    )
    .expect("default config must be accepted");
    Harness { controller, engine, sink, timer, events }
}

impl Harness {
    /// Report the in-flight utterance as completed.
    fn finish_utterance(&mut self) {
        let id = self.engine.last_utterance();
        self.controller.utterance_finished(id, UtteranceOutcome::Completed);
    }

    /// Fire the most recently armed timer.
    fn fire_timer(&mut self) {
        let generation = self.timer.last_generation();
        self.controller.delay_elapsed(generation);
    }
}

fn drain_events(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ReaderEvent>) -> Vec<ReaderEvent> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

fn phases_from(events: &[ReaderEvent]) -> Vec<Phase> {
    events
        .iter()
        .filter_map(|e| {
            if let ReaderEvent::PhaseChanged(p) = e {
                Some(*p)
            } else {
                None
            }
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────

#[test]
fn initial_phase_is_idle() {
    let h = harness();
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert_eq!(h.controller.word_count(), 0);
    assert!(h.controller.session().is_none());
}

#[test]
fn hi_there_end_to_end() {
    let mut h = harness();
    h.controller.start("hi there").unwrap();

    assert_eq!(h.controller.phase(), Phase::Speaking);
    assert_eq!(h.controller.word_count(), 2);
    assert_eq!(h.engine.spoken_words(), ["hi"]);
    assert_eq!(h.sink.highlighted(), [(0, 2)]);

    // "hi": 2 chars at 100 ms/char.
    h.finish_utterance();
    assert_eq!(h.timer.arms().last().unwrap().0, Duration::from_millis(200));

    h.fire_timer();
    assert_eq!(h.engine.spoken_words(), ["hi", "there"]);
    assert_eq!(h.sink.highlighted(), [(0, 2), (3, 8)]);

    // "there": 5 chars.
    h.finish_utterance();
    assert_eq!(h.timer.arms().last().unwrap().0, Duration::from_millis(500));

    h.fire_timer();
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.controller.session().is_none());

    let events = drain_events(&mut h.events);
    assert!(events.iter().any(|e| matches!(e, ReaderEvent::WordCount(2))));
    assert!(events.iter().any(|e| matches!(e, ReaderEvent::Finished)));
    assert_eq!(phases_from(&events), [Phase::Speaking, Phase::Idle]);

    let word_starts: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ReaderEvent::WordStarted { index, start, end } => Some((*index, *start, *end)),
            _ => None,
        })
        .collect();
    assert_eq!(word_starts, [(0, 0, 2), (1, 3, 8)]);
}

#[test]
fn blank_input_never_starts_a_session() {
    let mut h = harness();
    h.controller.start("").unwrap();
    h.controller.start("   ").unwrap();

    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.engine.calls().is_empty());
    assert!(drain_events(&mut h.events).is_empty());
}

#[test]
fn start_while_speaking_is_ignored() {
    let mut h = harness();
    h.controller.start("alpha beta").unwrap();
    h.controller.start("other text").unwrap();

    assert_eq!(h.engine.spoken_words(), ["alpha"]);
    assert_eq!(h.controller.word_count(), 2);
}

#[test]
fn pause_twice_is_pause_once() {
    let mut h = harness();
    h.controller.start("alpha beta").unwrap();
    h.controller.pause();
    h.controller.pause();

    assert_eq!(h.controller.phase(), Phase::Paused);
    assert_eq!(h.engine.count(&EngineCall::Pause), 1);
}

#[test]
fn resume_while_idle_is_a_noop() {
    let mut h = harness();
    h.controller.resume();

    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.engine.calls().is_empty());
    assert!(drain_events(&mut h.events).is_empty());
}

#[test]
fn resume_re_speaks_the_current_word() {
    let mut h = harness();
    h.controller.start("alpha beta").unwrap();
    h.controller.pause();
    h.controller.resume();

    assert_eq!(h.controller.phase(), Phase::Speaking);
    assert_eq!(h.engine.count(&EngineCall::Resume), 1);
    // Still on the first word; it starts over rather than mid-utterance.
    assert_eq!(h.engine.spoken_words(), ["alpha", "alpha"]);
}

#[test]
fn pause_cancels_the_pending_gap() {
    let mut h = harness();
    h.controller.start("alpha beta").unwrap();
    h.finish_utterance();
    let armed = h.timer.last_generation();

    h.controller.pause();
    assert_eq!(h.timer.ops().last(), Some(&TimerOp::Cancel));

    // A fire that raced the cancel must not advance the cursor.
    h.controller.delay_elapsed(armed);
    assert_eq!(h.engine.spoken_words(), ["alpha"]);
    assert_eq!(h.controller.session().unwrap().cursor(), 0);
}

#[test]
fn stop_resets_cursor_and_silences_stale_timer() {
    let mut h = harness();
    h.controller.start("one two three").unwrap();
    h.finish_utterance();
    let armed = h.timer.last_generation();

    h.controller.stop();
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.controller.session().is_none());
    assert_eq!(h.engine.count(&EngineCall::Cancel), 1);

    h.controller.delay_elapsed(armed);
    assert_eq!(h.engine.spoken_words(), ["one"]);
    assert_eq!(h.controller.phase(), Phase::Idle);

    // Stopping twice is harmless.
    h.controller.stop();
}

#[test]
fn at_most_one_pending_timer() {
    let mut h = harness();
    h.controller.start("one two").unwrap();

    h.finish_utterance();
    // A duplicate completion report for the same utterance must not arm a
    // second timer.
    h.finish_utterance();

    assert_eq!(h.timer.arms().len(), 1);
    // Every arm is preceded by a cancel.
    let ops = h.timer.ops();
    for (i, op) in ops.iter().enumerate() {
        if matches!(op, TimerOp::Arm(..)) {
            assert_eq!(ops[i - 1], TimerOp::Cancel, "arm without preceding cancel");
        }
    }
}

#[test]
fn stale_utterance_report_is_dropped() {
    let mut h = harness();
    h.controller.start("one two").unwrap();

    h.controller
        .utterance_finished(UtteranceId(999), UtteranceOutcome::Completed);
    assert!(h.timer.arms().is_empty());
    assert_eq!(h.controller.session().unwrap().cursor(), 0);
}

#[test]
fn engine_error_counts_as_completion() {
    let mut h = harness();
    h.controller.start("one two").unwrap();

    let id = h.engine.last_utterance();
    h.controller
        .utterance_finished(id, UtteranceOutcome::Errored("device lost".into()));

    // The session keeps moving: the gap timer is armed as if it completed.
    assert_eq!(h.timer.arms().len(), 1);
    let events = drain_events(&mut h.events);
    assert!(events
        .iter()
        .any(|e| matches!(e, ReaderEvent::Error(m) if m == "device lost")));
}

#[test]
fn failing_speak_still_advances() {
    let engine = RecordingEngine { fail_speak: true, ..RecordingEngine::default() };
    let sink = RecordingSink::default();
    let timer = FakeTimer::default();
    let (mut controller, mut events) = ReadAloudController::new(
        Box::new(engine.clone()),
        Box::new(sink),
        Box::new(timer.clone()),
        ReaderConfig::default(),
    )
    .unwrap();

    controller.start("one two").unwrap();

    // The failed word's gap is still scheduled, and the failure surfaced.
    assert_eq!(timer.arms().len(), 1);
    assert!(drain_events(&mut events)
        .iter()
        .any(|e| matches!(e, ReaderEvent::Error(_))));

    controller.delay_elapsed(timer.last_generation());
    assert_eq!(engine.spoken_words(), ["one", "two"]);
}

#[test]
fn delay_multiplier_scales_the_gap() {
    let config = ReaderConfig { delay_multiplier: 2.0, ..ReaderConfig::default() };
    let mut h = harness_with(config);
    h.controller.start("hi there").unwrap();
    h.finish_utterance();

    assert_eq!(h.timer.arms()[0].0, Duration::from_millis(400));
}

#[test]
fn live_multiplier_change_applies_from_the_next_gap() {
    let mut h = harness();
    h.controller.start("hi hi").unwrap();
    h.finish_utterance();
    assert_eq!(h.timer.arms()[0].0, Duration::from_millis(200));

    h.controller.set_delay_multiplier(3.0);
    h.fire_timer();
    h.finish_utterance();
    assert_eq!(h.timer.arms()[1].0, Duration::from_millis(600));
}

#[test]
fn rate_change_reaches_the_engine_and_future_words() {
    let mut h = harness();
    h.controller.start("one two").unwrap();
    h.controller.set_rate(2.0);

    assert_eq!(h.engine.count(&EngineCall::SetRate(2.0)), 1);

    h.finish_utterance();
    h.fire_timer();
    let calls = h.engine.calls();
    let Some(EngineCall::Speak { rate, .. }) = calls.last() else {
        panic!("expected a speak call, got {calls:?}");
    };
    assert!((rate - 2.0).abs() < f32::EPSILON);
}

#[test]
fn start_from_honors_an_in_range_hint() {
    let mut h = harness();
    h.controller.start_from("one two three", Some(2)).unwrap();

    assert_eq!(h.engine.spoken_words(), ["three"]);
    assert_eq!(h.controller.session().unwrap().cursor(), 2);
}

#[test]
fn start_from_out_of_range_hint_falls_back_to_first_word() {
    let mut h = harness();
    h.controller.start_from("one two", Some(5)).unwrap();

    assert_eq!(h.engine.spoken_words(), ["one"]);
    assert_eq!(h.controller.session().unwrap().cursor(), 0);
}

#[test]
fn controls_track_the_phase() {
    let mut h = harness();
    assert!(h.controller.controls().start_enabled);

    h.controller.start("word").unwrap();
    assert!(h.controller.controls().pause_enabled);
    assert!(h.controller.controls().stop_enabled);

    h.controller.pause();
    assert!(h.controller.controls().resume_enabled);
    assert!(!h.controller.controls().pause_enabled);
}

#[test]
fn drop_cancels_the_engine() {
    let engine = RecordingEngine::default();
    let timer = FakeTimer::default();
    {
        let (mut controller, _events) = ReadAloudController::new(
            Box::new(engine.clone()),
            Box::new(RecordingSink::default()),
            Box::new(timer.clone()),
            ReaderConfig::default(),
        )
        .unwrap();
        controller.start("word").unwrap();
    }
    assert_eq!(engine.count(&EngineCall::Cancel), 1);
    assert_eq!(timer.ops().last(), Some(&TimerOp::Cancel));
}
