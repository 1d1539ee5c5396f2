//! Error types for flattening and code generation.

use thiserror::Error;

/// Error type for naming configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A name template is malformed or uses the wrong placeholders.
    #[error("invalid template for '{field}' ({template:?}): {reason}")]
    InvalidTemplate {
        /// Configuration field name.
        field: &'static str,
        /// Offending template.
        template: String,
        /// Why the template was rejected.
        reason: String,
    },

    /// Two templates that must differ are identical.
    #[error("'{first}' and '{second}' share the template {template:?}")]
    DuplicateTemplate {
        /// First field name.
        first: &'static str,
        /// Second field name.
        second: &'static str,
        /// Shared template.
        template: String,
    },

    /// The separator contains characters not allowed in identifiers.
    #[error("invalid separator {separator:?}: only identifier characters are allowed")]
    InvalidSeparator {
        /// Offending separator.
        separator: String,
    },

    /// Configuration JSON could not be decoded.
    #[error("config decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates an invalid template error.
    pub fn template(
        field: &'static str,
        template: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTemplate {
            field,
            template: template.into(),
            reason: reason.into(),
        }
    }
}

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Source parse error.
    #[error("source parse error: {0}")]
    Parse(#[from] supaflat_schema::ParseError),

    /// Naming configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema discovery found nothing to process.
    #[error("no schemas found under root declaration '{root}'")]
    NoSchemas {
        /// Root declaration name.
        root: String,
    },

    /// The validator generator reported errors.
    #[error(
        "validator generation failed with {} error(s): {}",
        .messages.len(),
        .messages.join("; ")
    )]
    Generation {
        /// Every reported message.
        messages: Vec<String>,
    },

    /// The pretty printer failed.
    #[error("format error: {message}")]
    Format {
        /// Error message.
        message: String,
    },

    /// A rewrite pattern could not be compiled.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl CodegenError {
    /// Creates a format error with the given message.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}
