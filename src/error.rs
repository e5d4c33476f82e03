//! Structured error types for quire.
//!
//! Design errors abort the generation of a document and carry a source
//! position. Content-resolution errors never leave the content pass: they
//! are turned into empty outcomes plus a diagnostic counter.

use thiserror::Error;

/// The design is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct DesignError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl DesignError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// A referenced domain object or resource could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("not found: {what}")]
    NotFound { what: String },
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

/// The unified error type returned by the public quire API.
#[derive(Debug, Error)]
pub enum QuireError {
    #[error("design error: {0}")]
    Design(#[from] DesignError),

    /// JSON input failed to parse.
    #[error("failed to parse JSON: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    #[error("failed to parse XML: {message} (line {line}, column {column})")]
    Xml {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for QuireError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        QuireError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, QuireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_error_display_carries_position() {
        let e = DesignError::new("columns must be positive", 12, 4);
        assert_eq!(e.to_string(), "columns must be positive (line 12, column 4)");
    }

    #[test]
    fn json_error_gets_hint() {
        let err: QuireError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Hint"), "{}", msg);
    }
}
