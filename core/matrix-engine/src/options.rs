//! FILENAME: core/matrix-engine/src/options.rs
//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Property key handed to the formatting collaborator alongside a source.
pub const DEFAULT_FORMAT_STRING_PROPERTY: &str = "formatString";

/// Controls how labels and empty cells are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOptions {
    /// Name of the format-string property passed to the formatter.
    #[serde(default = "default_format_string_property")]
    pub format_string_property: String,

    /// Label for header nodes bound to an explicit null.
    #[serde(default = "default_blank_label")]
    pub blank_label: String,

    /// Text to show in body cells with no value (pending or absent).
    #[serde(default)]
    pub empty_cell_text: Option<String>,
}

fn default_format_string_property() -> String {
    DEFAULT_FORMAT_STRING_PROPERTY.to_string()
}

fn default_blank_label() -> String {
    "(blank)".to_string()
}

impl Default for MatrixOptions {
    fn default() -> Self {
        MatrixOptions {
            format_string_property: default_format_string_property(),
            blank_label: default_blank_label(),
            empty_cell_text: None,
        }
    }
}
