//! Display-width aware drawing helpers shared by the widgets in this crate.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

const TAB_WIDTH: usize = 4;

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if state.content_h <= state.viewport_h as u32 || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let max_y = state
        .content_h
        .saturating_sub(state.viewport_h as u32)
        .max(1) as f64;
    let thumb_top = ((state.y as f64 / max_y) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Draws `input` starting at display column `start_col`, writing at most `max_cols` cells.
pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    let mut w = ClippedWriter::new(x, y, start_col, max_cols);
    w.write(buf, input, style);
}

/// Like [`render_str_clipped`] but for styled spans. Unstyled spans use `fallback_style`.
pub fn render_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'_>],
    fallback_style: Style,
) {
    let mut w = ClippedWriter::new(x, y, start_col, max_cols);
    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            span.style
        };
        if !w.write(buf, span.content.as_ref(), style) {
            return;
        }
    }
}

struct ClippedWriter {
    x: u16,
    y: u16,
    start_col: usize,
    max_cols: usize,
    col: usize,
    out_cols: usize,
}

impl ClippedWriter {
    fn new(x: u16, y: u16, start_col: u32, max_cols: u16) -> Self {
        Self {
            x,
            y,
            start_col: start_col as usize,
            max_cols: max_cols as usize,
            col: 0,
            out_cols: 0,
        }
    }

    /// Returns `false` once the output width is exhausted.
    fn write(&mut self, buf: &mut Buffer, input: &str, style: Style) -> bool {
        let mut tmp = [0u8; 4];
        for ch in input.chars() {
            if ch == '\t' {
                for _ in 0..TAB_WIDTH {
                    if !self.put(buf, " ", 1, style) {
                        return false;
                    }
                }
                continue;
            }
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if !self.put(buf, ch.encode_utf8(&mut tmp), w, style) {
                return false;
            }
        }
        true
    }

    fn put(&mut self, buf: &mut Buffer, symbol: &str, w: usize, style: Style) -> bool {
        // Glyphs partially scrolled off the left edge are skipped entirely.
        if self.col < self.start_col {
            self.col += w;
            return true;
        }
        if self.out_cols + w > self.max_cols {
            return false;
        }
        let cx = self.x + self.out_cols as u16;
        if let Some(cell) = buf.cell_mut((cx, self.y)) {
            cell.set_style(style);
            cell.set_symbol(symbol);
        }
        if w == 2 {
            if let Some(cell) = buf.cell_mut((cx + 1, self.y)) {
                cell.set_style(style);
                cell.set_symbol("");
            }
        }
        self.col += w;
        self.out_cols += w;
        true
    }
}

pub fn slice_by_cols(input: &str, start_col: u32, max_cols: u16) -> String {
    if max_cols == 0 {
        return String::new();
    }

    let start_col = start_col as usize;
    let max_cols = max_cols as usize;

    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut out = String::new();

    let expanded = input.chars().flat_map(|ch| {
        let n = if ch == '\t' { TAB_WIDTH } else { 1 };
        std::iter::repeat_n(if ch == '\t' { ' ' } else { ch }, n)
    });
    for ch in expanded {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if col < start_col {
            col += w;
            continue;
        }
        if out_cols + w > max_cols {
            break;
        }
        out.push(ch);
        col += w;
        out_cols += w;
    }

    out
}

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates `input` to `width` display columns, ending in `…` when something was cut.
pub fn truncate_with_ellipsis(input: &str, width: u16) -> String {
    if width == 0 {
        return String::new();
    }
    if display_width(input) <= width as usize {
        return input.to_string();
    }
    let mut out = slice_by_cols(input, 0, width - 1);
    out.push('…');
    out
}
