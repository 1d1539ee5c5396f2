//! # Supaflat Codegen
//!
//! Flattening of generated database types and validator naming.
//!
//! This crate provides:
//! - Name templates and identifier derivation
//! - Per-schema flattening of the nested root declaration
//! - Cross-reference rewriting between flattened declarations
//! - Validator and type name overrides
//! - The generation pipeline around a caller-supplied validator generator

pub mod backend;
pub mod banner;
pub mod config;
pub mod error;
pub mod flatten;
pub mod generator;
pub mod naming;
pub mod overrides;
pub mod rewrite;

pub use backend::{IdentityPrinter, ParserMode, PrettyPrinter, ValidatorGenerator, ValidatorOutput};
pub use config::Config;
pub use error::{CodegenError, ConfigError};
pub use flatten::{FlattenEngine, FlattenedSchema};
pub use generator::{
    FlattenOutput, GenerateRequest, GeneratedOutput, Generator, flatten_types,
};
pub use naming::{NamingConfig, format_name, to_schema_variable_name};
pub use overrides::{NameOverride, NamingConflict, OverrideEngine, OverrideReport};
pub use rewrite::CrossReferenceRewriter;

/// Flattens schemas of a TypeScript source string with the default naming.
///
/// # Arguments
/// * `source` - Generated database type declarations
/// * `schemas` - Schemas to flatten; empty discovers every schema
///
/// # Returns
/// The flattened declarations with cross-references rewritten.
///
/// # Errors
/// Returns `CodegenError` if parsing fails or no schema is found.
pub fn flatten_source(source: &str, schemas: &[&str]) -> Result<String, CodegenError> {
    let request = GenerateRequest::for_schemas(schemas.iter().copied());
    let output = flatten_types(source, &NamingConfig::default(), &request)?;
    Ok(output.types_source)
}

/// Flattens schemas of a TypeScript declaration file with the default naming.
///
/// # Arguments
/// * `path` - Path to the generated type declarations
/// * `schemas` - Schemas to flatten; empty discovers every schema
///
/// # Returns
/// The flattened declarations with cross-references rewritten.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, or discovery fails.
pub fn flatten_file(path: &std::path::Path, schemas: &[&str]) -> Result<String, CodegenError> {
    let source = std::fs::read_to_string(path)?;
    flatten_source(&source, schemas)
}
