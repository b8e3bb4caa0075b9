#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod controller;
pub mod delay;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod session;
pub mod timer;
pub mod tokenizer;

// Re-export key types for convenience
pub use config::{RATE_RANGE, ReaderConfig};
pub use controller::{ReadAloudController, ReaderEvent};
pub use engine::{
    EngineNotice, SpeechEngine, UtteranceId, UtteranceOutcome, UtteranceRequest, VoiceInfo,
};
pub use error::ReaderError;
pub use highlight::{HighlightSink, NullHighlightSink};
pub use session::{Controls, Phase, PlaybackSession};
pub use timer::{DelayTimer, TimerGeneration, TokioDelayTimer};
pub use tokenizer::{WordToken, tokenize};
