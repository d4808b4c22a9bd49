//! Display list: the visual tree flattened into paint commands.
//!
//! Geometry is resolved here in CSS pixels: authored card width, header
//! and code-area placement, monospace soft-wrap, line-number gutter. The
//! painter only has to execute items in order; it never re-measures.

use crate::card::{VisualTree, CARD_WIDTH};
use crate::highlight::Span;
use crate::style::{Color, Gradient, Shadow};

/// Width of a monospace glyph cell as a fraction of the font size
const GLYPH_ADVANCE_RATIO: f64 = 0.6;
/// The gutter reserves at least this many digits
const GUTTER_MIN_DIGITS: usize = 2;
/// Transparent margin around the card so blurred shadows are not cut
/// off at the capture boundary
const CAPTURE_MARGIN: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillRectItem {
    pub rect: Rect,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillRoundedRectItem {
    pub rect: Rect,
    pub radius: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeRoundedRectItem {
    pub rect: Rect,
    pub radius: f64,
    pub width: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradientItem {
    pub rect: Rect,
    pub radius: f64,
    pub gradient: Gradient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxShadowItem {
    pub rect: Rect,
    pub radius: f64,
    pub shadow: Shadow,
}

/// Blur the pixels already painted under `rect` before the window fill
/// composites over them
#[derive(Debug, Clone, PartialEq)]
pub struct BackdropBlurItem {
    pub rect: Rect,
    pub radius: f64,
    pub blur: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillCircleItem {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub color: Color,
}

/// One positioned glyph; the cell box is shared by the run
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphInstance {
    pub ch: char,
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRunItem {
    pub cell_w: f64,
    pub cell_h: f64,
    pub glyphs: Vec<GlyphInstance>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    FillRect(FillRectItem),
    FillRoundedRect(FillRoundedRectItem),
    StrokeRoundedRect(StrokeRoundedRectItem),
    LinearGradient(LinearGradientItem),
    BoxShadow(BoxShadowItem),
    BackdropBlur(BackdropBlurItem),
    FillCircle(FillCircleItem),
    GlyphRun(GlyphRunItem),
}

/// Paint commands in back-to-front order plus the authored region size
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub width: f64,
    pub height: f64,
    pub items: Vec<DisplayItem>,
}

/// A wrapped visual row: the logical line number on its first row only,
/// continuation rows leave the gutter blank
struct VisualRow {
    number: Option<usize>,
    spans: Vec<Span>,
}

fn digit_count(n: usize) -> usize {
    let mut n = n.max(1);
    let mut digits = 0;
    while n > 0 {
        digits += 1;
        n /= 10;
    }
    digits
}

/// Split one logical line into rows of at most `columns` characters.
/// Span colors survive the split; an empty line still yields one row.
fn wrap_line(spans: &[Span], columns: usize) -> Vec<Vec<Span>> {
    let columns = columns.max(1);
    let mut rows = Vec::new();
    let mut row: Vec<Span> = Vec::new();
    let mut used = 0usize;

    for span in spans {
        let mut rest = span.text.as_str();
        while !rest.is_empty() {
            if used == columns {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            let free = columns - used;
            let take = rest.chars().count().min(free);
            let split_at = rest
                .char_indices()
                .nth(take)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let (head, tail) = rest.split_at(split_at);
            row.push(Span {
                text: head.to_string(),
                color: span.color,
            });
            used += take;
            rest = tail;
        }
    }
    rows.push(row);
    rows
}

fn wrap_lines(lines: &[Vec<Span>], columns: usize) -> Vec<VisualRow> {
    let mut rows = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        for (row_index, spans) in wrap_line(line, columns).into_iter().enumerate() {
            rows.push(VisualRow {
                number: (row_index == 0).then_some(index + 1),
                spans,
            });
        }
    }
    rows
}

fn glyph_run(
    text: &str,
    x: f64,
    y: f64,
    cell_w: f64,
    cell_h: f64,
    advance: f64,
    color: Color,
) -> GlyphRunItem {
    let glyphs = text
        .chars()
        .enumerate()
        .map(|(i, ch)| GlyphInstance {
            ch,
            x: x + i as f64 * advance,
            y,
            color,
        })
        .collect();
    GlyphRunItem {
        cell_w,
        cell_h,
        glyphs,
    }
}

/// Flatten a visual tree into paint commands at the authored card width.
pub fn build_display_list(tree: &VisualTree) -> DisplayList {
    let frame = &tree.frame;
    let window = &frame.window;
    let code = &window.code;

    let width = CARD_WIDTH + 2.0 * CAPTURE_MARGIN;
    let window_x = CAPTURE_MARGIN + frame.padding.left;
    let window_w = CARD_WIDTH - frame.padding.horizontal();
    let code_w = window_w - window.content_padding.horizontal();

    // Code text metrics: monospace cells at the authored font size
    let advance = code.font_size * GLYPH_ADVANCE_RATIO;
    let row_h = code.font_size * code.line_height;
    let content_w = code_w - code.padding.horizontal();
    let digits = digit_count(code.lines.len()).max(GUTTER_MIN_DIGITS);
    let gutter_w = digits as f64 * advance;
    let gutter_gap = advance;
    let columns = ((content_w - gutter_w - gutter_gap) / advance).floor() as usize;
    let rows = wrap_lines(&code.lines, columns.max(1));

    let code_h = code.padding.vertical() + rows.len() as f64 * row_h;
    let window_h = window.header.height + window.content_padding.vertical() + code_h;
    let card_h = frame.padding.vertical() + window_h;
    let height = card_h + 2.0 * CAPTURE_MARGIN;
    let window_y = CAPTURE_MARGIN + frame.padding.top;
    let window_rect = Rect::new(window_x, window_y, window_w, window_h);

    let mut items = Vec::new();

    if let Some(gradient) = frame.background {
        items.push(DisplayItem::LinearGradient(LinearGradientItem {
            rect: Rect::new(CAPTURE_MARGIN, CAPTURE_MARGIN, CARD_WIDTH, card_h),
            radius: frame.corner_radius,
            gradient,
        }));
    }

    items.push(DisplayItem::BoxShadow(BoxShadowItem {
        rect: window_rect,
        radius: window.corner_radius,
        shadow: window.shadow,
    }));

    if window.backdrop_blur > 0.0 {
        items.push(DisplayItem::BackdropBlur(BackdropBlurItem {
            rect: window_rect,
            radius: window.corner_radius,
            blur: window.backdrop_blur,
        }));
    }

    items.push(DisplayItem::FillRoundedRect(FillRoundedRectItem {
        rect: window_rect,
        radius: window.corner_radius,
        color: window.fill,
    }));

    // Header bar is painted square; it overhangs the rounded top corners
    let header = &window.header;
    items.push(DisplayItem::FillRect(FillRectItem {
        rect: Rect::new(window_x, window_y, window_w, header.height),
        color: header.background,
    }));

    let mut dot_x = window_x + header.padding_x;
    let dot_cy = window_y + header.height / 2.0;
    for dot in &header.dots {
        items.push(DisplayItem::FillCircle(FillCircleItem {
            cx: dot_x + dot.diameter / 2.0,
            cy: dot_cy,
            radius: dot.diameter / 2.0,
            color: dot.color,
        }));
        dot_x += dot.diameter + header.dot_gap;
    }

    let badge = &header.badge;
    let badge_cell_w = badge.font_size * GLYPH_ADVANCE_RATIO;
    let badge_advance = badge_cell_w + badge.letter_spacing;
    let badge_chars = badge.label.chars().count() as f64;
    let badge_w = (badge_chars * badge_advance - badge.letter_spacing).max(0.0);
    items.push(DisplayItem::GlyphRun(glyph_run(
        &badge.label,
        window_x + window_w - header.padding_x - badge_w,
        window_y + (header.height - badge.font_size) / 2.0,
        badge_cell_w,
        badge.font_size,
        badge_advance,
        badge.color,
    )));

    // The code block sits inset within the window, so the surface stays
    // visible as a ring around it
    let code_x = window_x + window.content_padding.left;
    let code_y = window_y + header.height + window.content_padding.top;
    let code_rect = Rect::new(code_x, code_y, code_w, code_h);
    items.push(DisplayItem::FillRoundedRect(FillRoundedRectItem {
        rect: code_rect,
        radius: code.corner_radius,
        color: code.background,
    }));

    let text_x = code_x + code.padding.left + gutter_w + gutter_gap;
    let first_row_y = code_rect.y + code.padding.top;
    let cell_y_offset = (row_h - code.font_size) / 2.0;
    for (row_index, row) in rows.iter().enumerate() {
        let row_y = first_row_y + row_index as f64 * row_h + cell_y_offset;

        if let Some(number) = row.number {
            let label = number.to_string();
            let pad = digits.saturating_sub(label.len());
            items.push(DisplayItem::GlyphRun(glyph_run(
                &label,
                code_x + code.padding.left + pad as f64 * advance,
                row_y,
                advance,
                code.font_size,
                advance,
                code.gutter_color,
            )));
        }

        let mut glyphs = Vec::new();
        let mut x = text_x;
        for span in &row.spans {
            for ch in span.text.chars() {
                glyphs.push(GlyphInstance {
                    ch,
                    x,
                    y: row_y,
                    color: span.color,
                });
                x += advance;
            }
        }
        if !glyphs.is_empty() {
            items.push(DisplayItem::GlyphRun(GlyphRunItem {
                cell_w: advance,
                cell_h: code.font_size,
                glyphs,
            }));
        }
    }

    // Window border goes last so it stays crisp over the header edges
    items.push(DisplayItem::StrokeRoundedRect(StrokeRoundedRectItem {
        rect: window_rect,
        radius: window.corner_radius,
        width: window.border.width,
        color: window.border.color,
    }));

    DisplayList {
        width,
        height,
        items,
    }
}
