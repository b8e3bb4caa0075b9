//! Terminal rendering — alternate-screen text view with a word highlight.
//!
//! The controller only knows the [`HighlightSink`] seam; [`ViewHandle`] is
//! the `Send` proxy it holds, routing highlight calls into the shared view
//! state behind a mutex. The text is wrapped once at startup into
//! byte-range display lines, so a highlight maps to a line by offset
//! arithmetic rather than a re-layout.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crossterm::style::Stylize;
use crossterm::{cursor, execute, queue, style, terminal};

use wordpace_core::HighlightSink;

/// Greedy word wrap: byte ranges of display lines, broken at spaces where
/// possible, mid-word when a single word exceeds the width.
///
/// `width` is counted in chars, not terminal cells: double-width glyphs
/// (CJK, emoji) can still overflow their row visually. Acceptable for the
/// plain-text reading this view targets.
fn wrap_ranges(text: &str, width: usize) -> Vec<(usize, usize)> {
    let width = width.max(1);
    let mut ranges = Vec::new();
    let mut line_start = 0usize;
    let mut chars_in_line = 0usize;
    let mut last_space: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c == ' ' {
            last_space = Some(i);
        }
        chars_in_line += 1;
        if chars_in_line > width {
            let break_at = last_space.filter(|&s| s > line_start).unwrap_or(i);
            ranges.push((line_start, break_at));
            line_start = if text[break_at..].starts_with(' ') {
                break_at + 1
            } else {
                break_at
            };
            last_space = None;
            // The break char itself may be the consumed space, leaving the
            // new line empty with line_start just past i.
            chars_in_line = if line_start > i {
                0
            } else {
                text[line_start..i].chars().count() + 1
            };
        }
    }
    if line_start < text.len() || ranges.is_empty() {
        ranges.push((line_start, text.len()));
    }
    ranges
}

struct Inner {
    out: io::Stdout,
    text: String,
    lines: Vec<(usize, usize)>,
    scroll: usize,
    rows: usize,
    cols: usize,
    highlight: Option<(usize, usize)>,
    status: String,
}

impl Inner {
    fn body_rows(&self) -> usize {
        self.rows.saturating_sub(1)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn redraw(&mut self) -> io::Result<()> {
        let body_rows = self.body_rows();
        for row in 0..body_rows {
            queue!(
                self.out,
                cursor::MoveTo(0, row as u16),
                terminal::Clear(terminal::ClearType::CurrentLine),
            )?;
            let Some(&(start, end)) = self.lines.get(self.scroll + row) else {
                continue;
            };
            match self.highlight {
                Some((hs, he)) if hs < end && he > start => {
                    let hs = hs.max(start);
                    let he = he.min(end);
                    queue!(
                        self.out,
                        style::Print(&self.text[start..hs]),
                        style::PrintStyledContent(self.text[hs..he].reverse()),
                        style::Print(&self.text[he..end]),
                    )?;
                }
                _ => queue!(self.out, style::Print(&self.text[start..end]))?,
            }
        }

        let status: String = self.status.chars().take(self.cols).collect();
        queue!(
            self.out,
            cursor::MoveTo(0, body_rows as u16),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(status.bold()),
        )?;
        self.out.flush()
    }

    /// Scroll by the minimal amount that brings the line holding `start`
    /// into the body viewport.
    fn scroll_to(&mut self, start: usize) {
        let line = self
            .lines
            .iter()
            .rposition(|&(s, _)| s <= start)
            .unwrap_or(0);
        let body_rows = self.body_rows().max(1);
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + body_rows {
            self.scroll = line + 1 - body_rows;
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Full-screen text view. Owns the terminal for its lifetime: raw mode and
/// the alternate screen are entered on construction and restored when the
/// last handle drops.
pub struct TerminalView {
    inner: Arc<Mutex<Inner>>,
}

impl TerminalView {
    /// Take over the terminal and draw `text`.
    pub fn new(text: String) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;

        let (cols, rows) = terminal::size()?;
        let lines = wrap_ranges(&text, cols as usize);
        let mut inner = Inner {
            out,
            text,
            lines,
            scroll: 0,
            rows: rows as usize,
            cols: cols as usize,
            highlight: None,
            status: String::new(),
        };
        inner.redraw()?;
        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// A `Send` handle for the controller's highlight seam.
    #[must_use]
    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Replace the status line and redraw.
    pub fn set_status(&self, status: String) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.status = status;
        if let Err(e) = inner.redraw() {
            tracing::warn!(error = %e, "status redraw failed");
        }
    }
}

/// Shared handle implementing [`HighlightSink`] over the terminal view.
pub struct ViewHandle {
    inner: Arc<Mutex<Inner>>,
}

impl HighlightSink for ViewHandle {
    fn highlight_range(&mut self, start: usize, end: usize) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.highlight = Some((start, end));
        if let Err(e) = inner.redraw() {
            tracing::warn!(error = %e, "highlight redraw failed");
        }
    }

    fn ensure_visible(&mut self, start: usize, _end: usize) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.scroll_to(start);
        if let Err(e) = inner.redraw() {
            tracing::warn!(error = %e, "scroll redraw failed");
        }
    }
}
