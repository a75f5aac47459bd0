//! Board configuration.

use crate::model::{DEFAULT_NOTE_SIZE, MAX_NOTE_SIZE, MIN_NOTE_SIZE, Rect, Size};
use serde::{Deserialize, Serialize};

/// Storage key holding the serialized note collection.
pub const STORAGE_KEY: &str = "sticky-notes";

/// Quiescence window before a changed value is written to storage.
pub const DEBOUNCE_MS: i64 = 300;

/// The toolbar region at the canvas origin that notes must not slide under.
pub const TOOLBAR_RECT: Rect = Rect::new(0, 0, 280, 330);

/// Tunables for a board. Every field falls back to its default when absent,
/// so hosts may pass a partial JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardConfig {
    /// Storage key for the note collection. Default: `"sticky-notes"`.
    pub storage_key: String,

    /// Debounce window in milliseconds. Default: **300**.
    pub debounce_ms: i64,

    pub default_size: Size,
    pub min_size: Size,
    pub max_size: Size,

    /// Reserved toolbar rectangle. Default: `(0, 0, 280, 330)`.
    pub toolbar: Rect,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            debounce_ms: DEBOUNCE_MS,
            default_size: DEFAULT_NOTE_SIZE,
            min_size: MIN_NOTE_SIZE,
            max_size: MAX_NOTE_SIZE,
            toolbar: TOOLBAR_RECT,
        }
    }
}

impl BoardConfig {
    /// Parse a (possibly partial) JSON config.
    ///
    /// # Errors
    /// Returns the `serde_json` message when the input is not valid JSON or
    /// a field has the wrong shape.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BoardConfig::from_json(r#"{"debounceMs": 50}"#).unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.storage_key, "sticky-notes");
        assert_eq!(config.toolbar, TOOLBAR_RECT);
        assert_eq!(config.min_size, Size::new(150, 150));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(BoardConfig::from_json("{debounce").is_err());
        assert!(BoardConfig::from_json(r#"{"debounceMs": "soon"}"#).is_err());
    }
}
