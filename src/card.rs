//! Typed visual tree for the code card, plus the authored style constants.
//!
//! The tree is pure data in CSS pixels: the renderer builds it, the
//! capture layout places it, the painter rasterizes it. Nothing here
//! touches the live form state.

use crate::highlight::Span;
use crate::style::{Color, Gradient, Insets, Shadow, ShadowOffset};
use serde::{Deserialize, Serialize};

/// Fixed authored width of the capture region in CSS pixels
pub const CARD_WIDTH: f64 = 480.0;

pub const FRAME_PADDING: f64 = 20.0;
pub const FRAME_RADIUS: f64 = 16.0;
pub const FRAME_GRADIENT: Gradient = Gradient {
    angle_deg: 135.0,
    from: Color::rgb(0x66, 0x7e, 0xea),
    to: Color::rgb(0x76, 0x4b, 0xa2),
};

/// Window-interior inset around the code block, below the header; the
/// window surface shows through as a ring
pub const CONTENT_PADDING: f64 = 32.0;

pub const WINDOW_RADIUS: f64 = 12.0;
pub const GLASS_FILL: Color = Color::rgba(0xff, 0xff, 0xff, 0.75);
pub const GLASS_BACKDROP_BLUR: f64 = 12.0;
pub const GLASS_BORDER: Color = Color::rgba(0xff, 0xff, 0xff, 0.5);
pub const GLASS_SHADOW: Shadow = Shadow {
    color: Color::rgba(0x1f, 0x26, 0x87, 0.15),
    offset: ShadowOffset { x: 0.0, y: 8.0 },
    blur: 32.0,
};
pub const SOLID_FILL: Color = Color::rgb(0xff, 0xff, 0xff);
pub const SOLID_BORDER: Color = Color::rgb(0xe0, 0xe0, 0xe0);
pub const SOLID_SHADOW: Shadow = Shadow {
    color: Color::rgba(0x00, 0x00, 0x00, 0.1),
    offset: ShadowOffset { x: 0.0, y: 4.0 },
    blur: 6.0,
};

pub const HEADER_HEIGHT: f64 = 30.0;
pub const HEADER_PADDING_X: f64 = 12.0;
pub const HEADER_GLASS_BG: Color = Color::rgba(0x00, 0x00, 0x00, 0.1);
pub const HEADER_SOLID_BG: Color = Color::rgb(0x2d, 0x2d, 0x2d);
pub const DOT_DIAMETER: f64 = 12.0;
pub const DOT_GAP: f64 = 8.0;
pub const DOT_COLORS: [Color; 3] = [
    Color::rgb(0xff, 0x5f, 0x56),
    Color::rgb(0xff, 0xbd, 0x2e),
    Color::rgb(0x27, 0xc9, 0x3f),
];

pub const BADGE_FONT_SIZE: f64 = 12.0;
pub const BADGE_COLOR: Color = Color::rgba(0xff, 0xff, 0xff, 0.6);
pub const BADGE_LETTER_SPACING: f64 = 0.5;

/// Code area background is dark regardless of glass/solid so the
/// highlighted text stays legible under every outer treatment
pub const CODE_BG: Color = Color::rgb(0x1e, 0x1e, 0x1e);
pub const CODE_PADDING: f64 = 25.0;
pub const CODE_RADIUS: f64 = 12.0;
pub const CODE_FONT_SIZE: f64 = 14.0;
pub const CODE_LINE_HEIGHT: f64 = 1.6;
pub const GUTTER_COLOR: Color = Color::rgb(0x99, 0x99, 0x99);

/// Shown in place of the code when the field is blank (display only)
pub const PLACEHOLDER_TEXT: &str = "// Type some code...";

/// Complete render output for one card state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTree {
    pub frame: Frame,
}

/// Outer frame - gradient mat around the window when the background is on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub padding: Insets,
    pub corner_radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Gradient>,
    pub window: Window,
}

/// Card window - glass or solid surface carrying the header and code block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub fill: Color,
    /// Blur radius applied to the pixels behind the window; 0 = none
    pub backdrop_blur: f64,
    pub border: Border,
    pub shadow: Shadow,
    pub corner_radius: f64,
    /// Inset between the window edge and the code block below the header
    pub content_padding: Insets,
    pub header: Header,
    pub code: CodeBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    pub color: Color,
}

/// Header bar - indicator dots left, language badge right.
/// Painted square; it overhangs the window's rounded top corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub height: f64,
    pub padding_x: f64,
    pub background: Color,
    pub dots: [Dot; 3],
    pub dot_gap: f64,
    pub badge: Badge,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub diameter: f64,
    pub color: Color,
}

/// Language badge - upper-cased label on the header's right edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub label: String,
    pub font_size: f64,
    pub color: Color,
    pub letter_spacing: f64,
}

/// Highlighted code area with a line-number gutter; lines soft-wrap at
/// the content width so nothing is lost to horizontal overflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    pub background: Color,
    pub padding: Insets,
    pub corner_radius: f64,
    pub font_size: f64,
    /// Line height as a multiplier of the font size
    pub line_height: f64,
    pub gutter_color: Color,
    /// One entry per logical source line
    pub lines: Vec<Vec<Span>>,
    /// True when `lines` holds the placeholder, not user code
    pub placeholder: bool,
}
