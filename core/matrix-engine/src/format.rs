//! FILENAME: core/matrix-engine/src/format.rs
//! Formatting collaborators supplied by the host.
//!
//! The engine never formats numbers or dates itself. Labels and body text
//! go through a `ValueFormatter`; KPI-style sources go through a
//! `StatusGraphicResolver` that may turn a formatted value into an icon.

use serde::{Deserialize, Serialize};

use crate::definition::{MatrixValue, StatusGraphicMapping, ValueSource};

/// Formats a raw value for display.
pub trait ValueFormatter {
    /// `format_property` names the property that holds the format string
    /// on `source` (see `MatrixOptions::format_string_property`).
    fn format(&self, value: &MatrixValue, source: &ValueSource, format_property: &str) -> String;
}

/// Decides whether a formatted value renders as an icon instead of text.
pub trait StatusGraphicResolver {
    fn resolve(&self, mapping: &StatusGraphicMapping, formatted: &str) -> Option<StatusGraphicToken>;
}

/// An icon to draw in place of a formatted value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusGraphicToken {
    pub graphic: String,
    pub icon: String,
}

// ============================================================================
// DEFAULT COLLABORATORS
// ============================================================================

/// Ignores format strings and renders the value's plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl ValueFormatter for PlainFormatter {
    fn format(&self, value: &MatrixValue, _source: &ValueSource, _format_property: &str) -> String {
        match value {
            MatrixValue::Null => String::new(),
            other => other.to_plain_text(""),
        }
    }
}

/// Looks the formatted value up in the mapping's icon table.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappedStatusGraphics;

impl StatusGraphicResolver for MappedStatusGraphics {
    fn resolve(&self, mapping: &StatusGraphicMapping, formatted: &str) -> Option<StatusGraphicToken> {
        mapping.icons.get(formatted).map(|icon| StatusGraphicToken {
            graphic: mapping.graphic.clone(),
            icon: icon.clone(),
        })
    }
}

impl<F> ValueFormatter for F
where
    F: Fn(&MatrixValue, &ValueSource, &str) -> String,
{
    fn format(&self, value: &MatrixValue, source: &ValueSource, format_property: &str) -> String {
        self(value, source, format_property)
    }
}
