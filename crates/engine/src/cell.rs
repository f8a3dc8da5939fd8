use serde::{Deserialize, Serialize};

/// Generation metadata carried by a cell.
///
/// Both fields are set together on cells produced by generation and cleared
/// together by any manual edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMeta {
    /// Input text that produced this cell's content
    pub source_text: Option<String>,
    /// Tone used for generation
    pub tone: Option<String>,
}

impl CellMeta {
    pub fn generated(source_text: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            source_text: Some(source_text.into()),
            tone: Some(tone.into()),
        }
    }

    /// Metadata for a manually edited (or errored) cell.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.source_text.is_none() && self.tone.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub meta: CellMeta,
    /// Loading placeholder shown while a generation call is in flight.
    /// Display-only: never read back as the cell's text, never recorded.
    #[serde(skip)]
    pub placeholder: Option<String>,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_generating(&self) -> bool {
        self.placeholder.is_some()
    }

    /// What a renderer should show for this cell.
    pub fn display_text(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(&self.text)
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.meta.is_empty() && self.placeholder.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_generated_and_cleared() {
        let meta = CellMeta::generated("Sign in", "playful");
        assert_eq!(meta.source_text.as_deref(), Some("Sign in"));
        assert_eq!(meta.tone.as_deref(), Some("playful"));
        assert!(!meta.is_empty());
        assert!(CellMeta::cleared().is_empty());
    }

    #[test]
    fn test_placeholder_is_display_only() {
        let mut cell = Cell::with_text("Hello");
        cell.placeholder = Some("Writing...".into());
        assert!(cell.is_generating());
        assert_eq!(cell.display_text(), "Writing...");
        assert_eq!(cell.text, "Hello");
    }
}
