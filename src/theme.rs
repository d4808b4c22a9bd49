use crate::style::Color;
use serde::{Deserialize, Serialize};

/// Token color palette consumed by the highlighting renderer.
///
/// Descriptors are looked up through [`ThemeCatalog::resolve`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDescriptor {
    pub id: String,
    pub background: Color,
    pub foreground: Color,
    pub comment: Color,
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub function: Color,
    pub type_name: Color,
}

impl ThemeDescriptor {
    pub fn dracula() -> Self {
        Self {
            id: "dracula".to_string(),
            background: Color::rgb(0x28, 0x2a, 0x36),
            foreground: Color::rgb(0xf8, 0xf8, 0xf2),
            comment: Color::rgb(0x62, 0x72, 0xa4),
            keyword: Color::rgb(0xff, 0x79, 0xc6),
            string: Color::rgb(0xf1, 0xfa, 0x8c),
            number: Color::rgb(0xbd, 0x93, 0xf9),
            function: Color::rgb(0x50, 0xfa, 0x7b),
            type_name: Color::rgb(0x8b, 0xe9, 0xfd),
        }
    }

    pub fn vs_dark() -> Self {
        Self {
            id: "vsDark".to_string(),
            background: Color::rgb(0x1e, 0x1e, 0x1e),
            foreground: Color::rgb(0xd4, 0xd4, 0xd4),
            comment: Color::rgb(0x6a, 0x99, 0x55),
            keyword: Color::rgb(0x56, 0x9c, 0xd6),
            string: Color::rgb(0xce, 0x91, 0x78),
            number: Color::rgb(0xb5, 0xce, 0xa8),
            function: Color::rgb(0xdc, 0xdc, 0xaa),
            type_name: Color::rgb(0x4e, 0xc9, 0xb0),
        }
    }

    pub fn atom_dark() -> Self {
        Self {
            id: "atomDark".to_string(),
            background: Color::rgb(0x1d, 0x1f, 0x21),
            foreground: Color::rgb(0xc5, 0xc8, 0xc6),
            comment: Color::rgb(0x7c, 0x7c, 0x7c),
            keyword: Color::rgb(0x96, 0xcb, 0xfe),
            string: Color::rgb(0xa8, 0xff, 0x60),
            number: Color::rgb(0xff, 0x73, 0xfd),
            function: Color::rgb(0xda, 0xd0, 0x85),
            type_name: Color::rgb(0xff, 0xff, 0xb6),
        }
    }
}

/// Built-in theme registry with a guaranteed fallback.
///
/// `resolve` is total: any id, including the empty string, yields a
/// descriptor. Unknown ids fall back to the default theme at resolve
/// time rather than being rejected upstream.
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<ThemeDescriptor>,
}

/// Theme used when an id does not match any built-in
pub const DEFAULT_THEME_ID: &str = "dracula";

impl ThemeCatalog {
    pub fn new() -> Self {
        Self {
            themes: vec![
                ThemeDescriptor::dracula(),
                ThemeDescriptor::vs_dark(),
                ThemeDescriptor::atom_dark(),
            ],
        }
    }

    /// Look up a theme by id; unknown or empty ids yield the default
    pub fn resolve(&self, theme_id: &str) -> &ThemeDescriptor {
        self.themes
            .iter()
            .find(|t| t.id == theme_id)
            .unwrap_or(&self.themes[0])
    }

    pub fn default_theme(&self) -> &ThemeDescriptor {
        &self.themes[0]
    }

    /// Ids offered by the form's theme picker, default first
    pub fn theme_ids(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.id.as_str()).collect()
    }
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_ids() {
        let catalog = ThemeCatalog::new();
        assert_eq!(catalog.resolve("dracula").id, "dracula");
        assert_eq!(catalog.resolve("vsDark").id, "vsDark");
        assert_eq!(catalog.resolve("atomDark").id, "atomDark");
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_default() {
        let catalog = ThemeCatalog::new();
        assert_eq!(catalog.resolve("monokai").id, DEFAULT_THEME_ID);
        assert_eq!(catalog.resolve("").id, DEFAULT_THEME_ID);
        assert_eq!(catalog.resolve("DRACULA").id, DEFAULT_THEME_ID);
        assert_eq!(catalog.resolve("\u{1f980}").id, DEFAULT_THEME_ID);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let catalog = ThemeCatalog::new();
        assert_eq!(catalog.resolve("nope"), catalog.resolve("nope"));
        assert_eq!(catalog.resolve("nope"), catalog.default_theme());
    }

    #[test]
    fn test_theme_ids_default_first() {
        let catalog = ThemeCatalog::new();
        let ids = catalog.theme_ids();
        assert_eq!(ids[0], DEFAULT_THEME_ID);
        assert_eq!(ids.len(), 3);
    }
}
