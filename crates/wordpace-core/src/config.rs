//! Reader settings and validation.
//!
//! Pure domain types with no infrastructure dependencies; hosts decide how
//! (and whether) to persist them.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ReaderError;

/// Accepted playback rate multipliers.
pub const RATE_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Live-tunable reader parameters.
///
/// Rate and delay multiplier are read at use time, never cached at session
/// start, so mid-session changes take effect from the next word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderConfig {
    /// Playback rate multiplier (1.0 = normal).
    pub rate: f32,

    /// Scales the per-character inter-word gap. Strictly positive.
    pub delay_multiplier: f32,

    /// Engine-specific voice id; `None` selects the engine default.
    pub voice: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            delay_multiplier: 1.0,
            voice: None,
        }
    }
}

impl ReaderConfig {
    /// Check that all parameters are within their accepted ranges.
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidRate`] or [`ReaderError::InvalidDelayMultiplier`]
    /// naming the offending value.
    pub fn validate(&self) -> Result<(), ReaderError> {
        if !self.rate.is_finite() || !RATE_RANGE.contains(&self.rate) {
            return Err(ReaderError::InvalidRate(self.rate));
        }
        if !self.delay_multiplier.is_finite() || self.delay_multiplier <= 0.0 {
            return Err(ReaderError::InvalidDelayMultiplier(self.delay_multiplier));
        }
        Ok(())
    }
}
