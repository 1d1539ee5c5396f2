//! Collaborator interfaces.
//!
//! Validator generation and pretty-printing are supplied by the caller.

use crate::error::CodegenError;
use crate::naming::{to_pascal_case, to_schema_variable_name};

/// Output of a validator generator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorOutput {
    /// Generated validator source.
    pub validators: String,
    /// Generated inferred-types source.
    pub inferred_types: String,
    /// Errors reported by the generator.
    pub errors: Vec<String>,
}

/// Generates validators from flattened type declarations.
pub trait ValidatorGenerator {
    /// Generates validator source for `types_source`.
    ///
    /// `import_path` is the module specifier the generated code imports
    /// the flattened types from.
    fn generate(&self, types_source: &str, import_path: &str) -> ValidatorOutput;

    /// Returns the validator identifier this generator derives from a type name.
    fn validator_name(&self, type_name: &str) -> String {
        to_schema_variable_name(type_name, false)
    }

    /// Returns the inferred type identifier this generator derives from a type name.
    fn inferred_type_name(&self, type_name: &str) -> String {
        to_pascal_case(type_name)
    }
}

/// Parser mode for pretty-printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserMode {
    /// TypeScript source.
    #[default]
    TypeScript,
    /// JavaScript source.
    JavaScript,
}

/// Formats generated source.
pub trait PrettyPrinter {
    /// Formats `source`.
    ///
    /// # Errors
    /// Returns `CodegenError::Format` if the source cannot be formatted.
    fn format(&self, source: &str, mode: ParserMode) -> Result<String, CodegenError>;
}

/// Printer that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPrinter;

impl PrettyPrinter for IdentityPrinter {
    fn format(&self, source: &str, _mode: ParserMode) -> Result<String, CodegenError> {
        Ok(source.to_string())
    }
}
