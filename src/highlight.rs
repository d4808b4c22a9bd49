//! Syntax highlighting: source text to per-line colored spans via syntect.

use crate::style::Color;
use crate::theme::ThemeDescriptor;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{
    Color as SyntectColor, ScopeSelectors, Style as SyntectStyle, StyleModifier, Theme, ThemeItem,
};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// A run of characters sharing one color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub color: Color,
}

static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();

/// Bundled syntax definitions, loaded once per process
fn syntax_set() -> &'static SyntaxSet {
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Map a form language id to a syntect lookup token.
fn syntax_token_for(language: &str) -> &str {
    match language.to_lowercase().as_str() {
        "javascript" | "js" => "js",
        "python" | "py" => "py",
        "css" => "css",
        "html" => "html",
        "json" => "json",
        _ => language,
    }
}

fn syntect_color(color: Color) -> SyntectColor {
    SyntectColor {
        r: color.r,
        g: color.g,
        b: color.b,
        a: (color.a * 255.0).round() as u8,
    }
}

fn span_color(color: SyntectColor) -> Color {
    Color::rgba(color.r, color.g, color.b, color.a as f32 / 255.0)
}

fn scope_item(selectors: &str, color: Color) -> ThemeItem {
    ThemeItem {
        scope: selectors.parse::<ScopeSelectors>().unwrap_or_default(),
        style: StyleModifier {
            foreground: Some(syntect_color(color)),
            background: None,
            font_style: None,
        },
    }
}

/// Build a syntect theme carrying the descriptor's token colors
fn syntect_theme(descriptor: &ThemeDescriptor) -> Theme {
    let mut theme = Theme::default();
    theme.settings.foreground = Some(syntect_color(descriptor.foreground));
    theme.settings.background = Some(syntect_color(descriptor.background));
    theme.scopes = vec![
        scope_item("comment, punctuation.definition.comment", descriptor.comment),
        scope_item("keyword, storage.type, storage.modifier", descriptor.keyword),
        scope_item("string, punctuation.definition.string", descriptor.string),
        scope_item("constant.numeric, constant.language", descriptor.number),
        scope_item(
            "entity.name.function, support.function, variable.function",
            descriptor.function,
        ),
        scope_item(
            "entity.name.type, entity.name.class, support.type, support.class",
            descriptor.type_name,
        ),
    ];
    theme
}

fn strip_line_ending(text: &str) -> String {
    text.trim_end_matches(|c| c == '\n' || c == '\r').to_string()
}

fn regions_to_spans(regions: Vec<(SyntectStyle, &str)>) -> Vec<Span> {
    regions
        .into_iter()
        .map(|(style, text)| Span {
            text: strip_line_ending(text),
            color: span_color(style.foreground),
        })
        .filter(|span| !span.text.is_empty())
        .collect()
}

/// Highlight source text into per-line colored spans.
///
/// Unknown language ids fall back to plain text, and a line the grammar
/// fails on falls back to a single foreground span, so highlighting
/// never errors out of the render path.
pub fn highlight_code(code: &str, language: &str, descriptor: &ThemeDescriptor) -> Vec<Vec<Span>> {
    let ss = syntax_set();
    let syntax = ss
        .find_syntax_by_token(syntax_token_for(language))
        .unwrap_or_else(|| ss.find_syntax_plain_text());
    let theme = syntect_theme(descriptor);
    let mut highlighter = HighlightLines::new(syntax, &theme);

    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let spans = match highlighter.highlight_line(line, ss) {
            Ok(regions) => regions_to_spans(regions),
            Err(_) => vec![Span {
                text: strip_line_ending(line),
                color: descriptor.foreground,
            }],
        };
        lines.push(spans);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeCatalog;

    fn line_text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_line_structure_preserved() {
        let catalog = ThemeCatalog::new();
        let lines = highlight_code("a = 1\n\nb = 2", "python", catalog.default_theme());
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[0]), "a = 1");
        assert!(lines[1].is_empty());
        assert_eq!(line_text(&lines[2]), "b = 2");
    }

    #[test]
    fn test_python_keyword_gets_keyword_color() {
        let catalog = ThemeCatalog::new();
        let theme = catalog.resolve("dracula");
        let lines = highlight_code("def foo():\n    return 1", "python", theme);
        assert!(lines[0]
            .iter()
            .any(|s| s.text.contains("def") && s.color == theme.keyword));
        assert!(lines[1]
            .iter()
            .any(|s| s.text.contains("return") && s.color == theme.keyword));
    }

    #[test]
    fn test_string_literal_gets_string_color() {
        let catalog = ThemeCatalog::new();
        let theme = catalog.resolve("vsDark");
        let lines = highlight_code("x = 'hi'", "python", theme);
        assert!(lines[0]
            .iter()
            .any(|s| s.text.contains("hi") && s.color == theme.string));
    }

    #[test]
    fn test_unknown_language_is_plain_foreground() {
        let catalog = ThemeCatalog::new();
        let theme = catalog.default_theme();
        let lines = highlight_code("def foo():", "brainfuck", theme);
        assert!(lines[0].iter().all(|s| s.color == theme.foreground));
    }

    #[test]
    fn test_empty_source_yields_no_lines() {
        let catalog = ThemeCatalog::new();
        let lines = highlight_code("", "javascript", catalog.default_theme());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_highlight_is_deterministic() {
        let catalog = ThemeCatalog::new();
        let theme = catalog.resolve("atomDark");
        let a = highlight_code("const x = 1;", "javascript", theme);
        let b = highlight_code("const x = 1;", "javascript", theme);
        assert_eq!(a, b);
    }
}
