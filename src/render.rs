//! Card renderer: a pure function from view state to visual tree.

use crate::card::{
    Badge, Border, CodeBlock, Dot, Frame, Header, VisualTree, Window, BADGE_COLOR,
    BADGE_FONT_SIZE, BADGE_LETTER_SPACING, CODE_BG, CODE_FONT_SIZE, CODE_LINE_HEIGHT,
    CODE_PADDING, CODE_RADIUS, CONTENT_PADDING, DOT_COLORS, DOT_DIAMETER, DOT_GAP,
    FRAME_GRADIENT, FRAME_PADDING, FRAME_RADIUS, GLASS_BACKDROP_BLUR, GLASS_BORDER, GLASS_FILL,
    GLASS_SHADOW, GUTTER_COLOR, HEADER_GLASS_BG, HEADER_HEIGHT, HEADER_PADDING_X,
    HEADER_SOLID_BG, PLACEHOLDER_TEXT, SOLID_BORDER, SOLID_FILL, SOLID_SHADOW, WINDOW_RADIUS,
};
use crate::highlight::highlight_code;
use crate::state::ViewState;
use crate::style::Insets;
use crate::theme::ThemeCatalog;

/// Badge label for a language id: fixed labels for the known set,
/// upper-cased verbatim for anything else, "TEXT" when empty
pub fn format_language_badge(language: &str) -> String {
    if language.is_empty() {
        return "TEXT".to_string();
    }
    match language {
        "javascript" => "JAVASCRIPT".to_string(),
        "python" => "PYTHON".to_string(),
        "css" => "CSS".to_string(),
        "html" => "HTML".to_string(),
        "json" => "JSON".to_string(),
        other => other.to_uppercase(),
    }
}

/// Stateless card renderer over the built-in theme catalog.
///
/// `render` is deterministic: identical snapshots yield identical trees,
/// with no dependency on prior calls.
#[derive(Debug, Clone, Default)]
pub struct CardRenderer {
    catalog: ThemeCatalog,
}

impl CardRenderer {
    pub fn new() -> Self {
        Self {
            catalog: ThemeCatalog::new(),
        }
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    /// Build the visual tree for one snapshot.
    ///
    /// A blank code field is swapped for the display placeholder here;
    /// the snapshot itself is never modified.
    pub fn render(&self, state: &ViewState) -> VisualTree {
        let theme = self.catalog.resolve(&state.theme);
        let placeholder = state.code.trim().is_empty();
        let code_text = if placeholder {
            PLACEHOLDER_TEXT
        } else {
            state.code.as_str()
        };
        let lines = highlight_code(code_text, &state.language, theme);

        let (fill, backdrop_blur, border_color, shadow, header_bg) = if state.glass_effect {
            (
                GLASS_FILL,
                GLASS_BACKDROP_BLUR,
                GLASS_BORDER,
                GLASS_SHADOW,
                HEADER_GLASS_BG,
            )
        } else {
            (SOLID_FILL, 0.0, SOLID_BORDER, SOLID_SHADOW, HEADER_SOLID_BG)
        };

        let window = Window {
            fill,
            backdrop_blur,
            border: Border {
                width: 1.0,
                color: border_color,
            },
            shadow,
            corner_radius: WINDOW_RADIUS,
            content_padding: Insets::uniform(CONTENT_PADDING),
            header: Header {
                height: HEADER_HEIGHT,
                padding_x: HEADER_PADDING_X,
                background: header_bg,
                dots: DOT_COLORS.map(|color| Dot {
                    diameter: DOT_DIAMETER,
                    color,
                }),
                dot_gap: DOT_GAP,
                badge: Badge {
                    label: format_language_badge(&state.language),
                    font_size: BADGE_FONT_SIZE,
                    color: BADGE_COLOR,
                    letter_spacing: BADGE_LETTER_SPACING,
                },
            },
            code: CodeBlock {
                background: CODE_BG,
                padding: Insets::uniform(CODE_PADDING),
                corner_radius: CODE_RADIUS,
                font_size: CODE_FONT_SIZE,
                line_height: CODE_LINE_HEIGHT,
                gutter_color: GUTTER_COLOR,
                lines,
                placeholder,
            },
        };

        let frame = if state.show_background {
            Frame {
                padding: Insets::uniform(FRAME_PADDING),
                corner_radius: FRAME_RADIUS,
                background: Some(FRAME_GRADIENT),
                window,
            }
        } else {
            Frame {
                padding: Insets::default(),
                corner_radius: 0.0,
                background: None,
                window,
            }
        };

        VisualTree { frame }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Field;

    #[test]
    fn test_badge_table() {
        assert_eq!(format_language_badge("javascript"), "JAVASCRIPT");
        assert_eq!(format_language_badge("python"), "PYTHON");
        assert_eq!(format_language_badge("css"), "CSS");
        assert_eq!(format_language_badge("html"), "HTML");
        assert_eq!(format_language_badge("json"), "JSON");
    }

    #[test]
    fn test_badge_unknown_upper_cased_verbatim() {
        assert_eq!(format_language_badge("rust"), "RUST");
        assert_eq!(format_language_badge("c++"), "C++");
    }

    #[test]
    fn test_badge_empty_is_text() {
        assert_eq!(format_language_badge(""), "TEXT");
        // Whitespace is not empty; it upper-cases verbatim like any
        // other unknown id
        assert_eq!(format_language_badge("   "), "   ");
    }

    #[test]
    fn test_render_same_state_twice_is_identical() {
        let renderer = CardRenderer::new();
        let state = ViewState::new();
        assert_eq!(renderer.render(&state), renderer.render(&state));
    }

    #[test]
    fn test_blank_code_renders_placeholder_without_touching_state() {
        let renderer = CardRenderer::new();
        let state = ViewState::new().with(Field::Code(String::new()));
        let tree = renderer.render(&state);

        assert!(tree.frame.window.code.placeholder);
        let shown: String = tree.frame.window.code.lines[0]
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(shown, PLACEHOLDER_TEXT);
        // Display-only substitution
        assert_eq!(state.code, "");
    }

    #[test]
    fn test_glass_and_solid_windows_differ() {
        let renderer = CardRenderer::new();
        let glass = renderer.render(&ViewState::new().with(Field::GlassEffect(true)));
        let solid = renderer.render(&ViewState::new().with(Field::GlassEffect(false)));

        let g = &glass.frame.window;
        let s = &solid.frame.window;
        assert!(g.fill.a < 1.0);
        assert_eq!(g.backdrop_blur, GLASS_BACKDROP_BLUR);
        assert_eq!(s.fill, SOLID_FILL);
        assert_eq!(s.backdrop_blur, 0.0);
        assert_eq!(g.header.background, HEADER_GLASS_BG);
        assert_eq!(s.header.background, HEADER_SOLID_BG);
    }

    #[test]
    fn test_background_toggle_controls_frame() {
        let renderer = CardRenderer::new();
        let on = renderer.render(&ViewState::new().with(Field::ShowBackground(true)));
        let off = renderer.render(&ViewState::new().with(Field::ShowBackground(false)));

        assert!(on.frame.background.is_some());
        assert_eq!(on.frame.padding.left, FRAME_PADDING);
        assert_eq!(on.frame.corner_radius, FRAME_RADIUS);
        assert!(off.frame.background.is_none());
        assert_eq!(off.frame.padding.left, 0.0);
        assert_eq!(off.frame.corner_radius, 0.0);
        // The window-interior inset stays regardless of the outer
        // treatment
        assert_eq!(off.frame.window.content_padding.left, CONTENT_PADDING);
        assert_eq!(on.frame.window.content_padding.left, CONTENT_PADDING);
    }

    #[test]
    fn test_code_area_constants_are_independent_of_style_flags() {
        let renderer = CardRenderer::new();
        for (bg, glass) in [(true, true), (true, false), (false, true), (false, false)] {
            let state = ViewState::new()
                .with(Field::ShowBackground(bg))
                .with(Field::GlassEffect(glass));
            let tree = renderer.render(&state);
            assert_eq!(tree.frame.window.code.background, CODE_BG);
            assert_eq!(tree.frame.window.code.padding.top, CODE_PADDING);
        }
    }
}
