//! Error types for source parsing.

use thiserror::Error;

/// Longest source excerpt quoted in a syntax error.
const EXCERPT_LEN: usize = 24;

/// Error type for source parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The TypeScript grammar could not be loaded.
    #[error("failed to load the TypeScript grammar: {message}")]
    Language {
        /// Error message.
        message: String,
    },

    /// The parser returned no syntax tree.
    #[error("parser produced no syntax tree")]
    NoTree,

    /// Malformed source text inside a declaration.
    #[error("syntax error at offset {offset} near `{excerpt}`")]
    Syntax {
        /// Byte offset into the source.
        offset: usize,
        /// Source text around the error.
        excerpt: String,
    },

    /// Well-formed syntax outside the supported type subset.
    #[error("unsupported {kind} at offset {offset}")]
    Unsupported {
        /// Byte offset into the source.
        offset: usize,
        /// Syntax node kind.
        kind: String,
    },
}

impl ParseError {
    /// Creates a grammar loading error.
    pub fn language(message: impl Into<String>) -> Self {
        Self::Language {
            message: message.into(),
        }
    }

    /// Creates a syntax error quoting the start of `excerpt`.
    pub fn syntax(offset: usize, excerpt: &str) -> Self {
        Self::Syntax {
            offset,
            excerpt: excerpt.chars().take(EXCERPT_LEN).collect(),
        }
    }

    /// Creates an unsupported construct error.
    pub fn unsupported(offset: usize, kind: impl Into<String>) -> Self {
        Self::Unsupported {
            offset,
            kind: kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParseError::unsupported(12, "function_type");
        assert_eq!(err.to_string(), "unsupported function_type at offset 12");

        let err = ParseError::syntax(3, "{ a: }");
        assert_eq!(err.to_string(), "syntax error at offset 3 near `{ a: }`");
    }

    #[test]
    fn test_syntax_excerpt_is_truncated() {
        let long = "x".repeat(100);
        let ParseError::Syntax { excerpt, .. } = ParseError::syntax(0, &long) else {
            panic!("expected syntax error");
        };
        assert_eq!(excerpt.len(), EXCERPT_LEN);
    }
}
