//! Reader error types.

/// Errors that can occur while preparing or driving a read-aloud session.
///
/// None of these are fatal to the controller: starts with bad input are
/// no-ops, engine failures are absorbed to keep the session moving, and
/// invalid live-parameter updates are ignored. The variants exist so hosts
/// can surface what happened.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Input text was empty or whitespace-only.
    #[error("Input text is empty")]
    EmptyInput,

    /// A word could not be located in the remaining source text.
    #[error("Could not locate {word:?} at or after byte {searched_from} of the source text")]
    TokenizationMismatch {
        /// The word the tokenizer was trying to place.
        word: String,
        /// Byte offset the search was anchored at.
        searched_from: usize,
    },

    /// The speech engine failed to issue or finish an utterance.
    #[error("Speech engine failure: {0}")]
    EngineFailure(String),

    /// Playback rate outside the accepted range.
    #[error("Playback rate {0} is outside the accepted 0.1..=10.0 range")]
    InvalidRate(f32),

    /// Delay multiplier must be strictly positive.
    #[error("Delay multiplier {0} must be strictly positive")]
    InvalidDelayMultiplier(f32),
}
