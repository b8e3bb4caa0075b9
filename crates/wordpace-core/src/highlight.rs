//! Highlight sink seam — where the controller marks the word being spoken.

/// Visual target for word highlights.
///
/// At most one range is highlighted at a time; each call replaces the prior
/// highlight. Offsets are byte ranges into the session's source text.
/// Infallible from the controller's perspective — a sink that cannot render
/// simply does nothing.
pub trait HighlightSink: Send {
    /// Mark `start..end`, replacing any prior highlight.
    fn highlight_range(&mut self, start: usize, end: usize);

    /// Scroll the range into view if (and only if) it lies outside the
    /// visible viewport, by the minimal amount.
    fn ensure_visible(&mut self, start: usize, end: usize);
}

/// Sink that ignores all highlight requests, for headless hosts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHighlightSink;

impl HighlightSink for NullHighlightSink {
    fn highlight_range(&mut self, _start: usize, _end: usize) {}

    fn ensure_visible(&mut self, _start: usize, _end: usize) {}
}
