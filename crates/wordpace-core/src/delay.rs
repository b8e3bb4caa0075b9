//! Inter-word pacing model.
//!
//! The gap after each spoken word scales with the word's character count, so
//! longer words leave the listener more time on the highlight before the
//! next word starts.

use std::time::Duration;

use crate::tokenizer::WordToken;

/// Base pacing delay per character of the word just spoken.
pub const BASE_DELAY_PER_CHAR: Duration = Duration::from_millis(100);

/// Compute the pause between `token` and the next word.
///
/// `multiplier` is read live at computation time — changing it mid-session
/// affects the next gap only, never one that is already elapsing. A
/// zero-length token yields a zero base delay (still multiplied).
#[must_use]
pub fn inter_word_delay(token: &WordToken, multiplier: f32) -> Duration {
    #[allow(clippy::cast_precision_loss)]
    let chars = token.char_count() as f64;
    Duration::from_secs_f64(BASE_DELAY_PER_CHAR.as_secs_f64() * chars * f64::from(multiplier))
}
