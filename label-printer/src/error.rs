//! Error types for label generation

use thiserror::Error;

/// Label generation error types
///
/// Generation is all-or-nothing: any of these means no command string
/// was produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    /// An element lacks a property its variant requires
    #[error("element {index}: missing required field `{field}`")]
    MissingRequiredField { index: usize, field: &'static str },

    /// Element type is not one of text, line, barcode
    #[error("element {index}: unsupported element type `{element_type}`")]
    UnsupportedElementType { index: usize, element_type: String },

    /// A property is present but unusable (wrong type, out of range, ...)
    #[error("element {index}: invalid `{field}`: {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// Paper too small (or not finite) to lay out a page
    #[error("degenerate geometry: `{field}` {reason}")]
    DegenerateGeometry { field: &'static str, reason: String },

    /// Barcode orientation the target language cannot render
    #[error("element {index}: `{field}` vertical is not supported by {language}")]
    UnsupportedOrientation {
        index: usize,
        field: &'static str,
        language: &'static str,
    },

    /// Generator configuration that would corrupt the command stream
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Command text cannot be represented in the device encoding
    #[error("cannot encode {character:?} as {encoding}")]
    Encoding {
        character: char,
        encoding: &'static str,
    },

    /// Layout JSON could not be parsed
    #[error("invalid layout document: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for LabelError {
    fn from(e: serde_json::Error) -> Self {
        LabelError::Parse(e.to_string())
    }
}

/// Result type for label generation
pub type LabelResult<T> = Result<T, LabelError>;
