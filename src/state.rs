use serde::{Deserialize, Serialize};

/// A single form edit: the field tag together with its new value.
///
/// Edits are applied with [`ViewState::with`], which returns a complete
/// replacement snapshot rather than patching in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Code(String),
    Language(String),
    Theme(String),
    ShowBackground(bool),
    GlassEffect(bool),
}

/// Immutable snapshot of everything the card renderer needs.
///
/// Always fully populated: every field has a default, so downstream code
/// never has to handle an absent value. The snapshot is replaced
/// wholesale on every edit and discarded when the panel goes away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub code: String,
    pub language: String,
    pub theme: String,
    pub show_background: bool,
    pub glass_effect: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            code: "console.log('Hello, world!');".to_string(),
            language: "javascript".to_string(),
            theme: "dracula".to_string(),
            show_background: true,
            glass_effect: true,
        }
    }
}

impl ViewState {
    /// Create the initial snapshot with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy-with-change: a new complete snapshot with one field replaced
    pub fn with(&self, field: Field) -> Self {
        let mut next = self.clone();
        match field {
            Field::Code(code) => next.code = code,
            Field::Language(language) => next.language = language,
            Field::Theme(theme) => next.theme = theme,
            Field::ShowBackground(on) => next.show_background = on,
            Field::GlassEffect(on) => next.glass_effect = on,
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fully_populated() {
        let state = ViewState::new();
        assert!(!state.code.is_empty());
        assert_eq!(state.language, "javascript");
        assert_eq!(state.theme, "dracula");
        assert!(state.show_background);
        assert!(state.glass_effect);
    }

    #[test]
    fn test_with_replaces_one_field() {
        let state = ViewState::new();
        let next = state.with(Field::Language("python".to_string()));

        assert_eq!(next.language, "python");
        assert_eq!(next.code, state.code);
        assert_eq!(next.theme, state.theme);
        assert_eq!(next.show_background, state.show_background);
        assert_eq!(next.glass_effect, state.glass_effect);
        // The original snapshot is untouched
        assert_eq!(state.language, "javascript");
    }

    #[test]
    fn test_later_edit_wins() {
        let state = ViewState::new()
            .with(Field::Theme("vsDark".to_string()))
            .with(Field::Theme("atomDark".to_string()));
        assert_eq!(state.theme, "atomDark");
    }

    #[test]
    fn test_field_serializes_camel_case() {
        let json = serde_json::to_string(&Field::ShowBackground(false)).unwrap();
        assert_eq!(json, r#"{"showBackground":false}"#);
    }
}
