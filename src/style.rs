use serde::{Deserialize, Serialize};

/// An sRGB color with straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 transparent, 1.0 opaque
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    /// Whether compositing this color can change any pixel
    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

/// Offset of a drop shadow from its caster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowOffset {
    pub x: f64,
    pub y: f64,
}

/// Soft drop shadow: color carries the opacity, blur is the CSS blur radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Color,
    pub offset: ShadowOffset,
    pub blur: f64,
}

/// Two-stop linear gradient at a CSS angle (degrees, 0 = up, clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    pub angle_deg: f64,
    pub from: Color,
    pub to: Color,
}

/// Per-side padding in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_visibility() {
        assert!(Color::rgb(255, 0, 0).is_visible());
        assert!(Color::rgba(0, 0, 0, 0.1).is_visible());
        assert!(!Color::TRANSPARENT.is_visible());
    }

    #[test]
    fn test_insets_sums() {
        let insets = Insets {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        assert_eq!(insets.horizontal(), 6.0);
        assert_eq!(insets.vertical(), 4.0);
        assert_eq!(Insets::uniform(5.0).horizontal(), 10.0);
    }
}
