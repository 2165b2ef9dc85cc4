//! Non-fatal problems found while reading a JSONL file.

use std::fmt;

/// A non-fatal warning produced by resilient reading.
///
/// The offending line is skipped and reading continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A non-empty line could not be deserialized into the target type.
    MalformedJson {
        /// The 1-based line number of the bad line.
        line_number: usize,
        /// The deserializer's error message.
        error: String,
    },

    /// A line was not valid UTF-8 and could not be decoded.
    InvalidUtf8 {
        /// The 1-based line number of the bad line.
        line_number: usize,
    },
}

impl Warning {
    /// Returns the 1-based line number this warning refers to.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::InvalidUtf8 { line_number } => {
                *line_number
            }
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            Self::InvalidUtf8 { line_number } => {
                write!(f, "line {line_number}: not valid UTF-8")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_error() {
        let warning = Warning::MalformedJson {
            line_number: 7,
            error: "expected value".to_string(),
        };
        let text = warning.to_string();
        assert!(text.contains("line 7"));
        assert!(text.contains("expected value"));
        assert_eq!(warning.line_number(), 7);
        assert_eq!(warning.kind(), "malformed_json");
    }

    #[test]
    fn invalid_utf8_display() {
        let warning = Warning::InvalidUtf8 { line_number: 3 };
        assert_eq!(warning.to_string(), "line 3: not valid UTF-8");
        assert_eq!(warning.line_number(), 3);
        assert_eq!(warning.kind(), "invalid_utf8");
    }
}
