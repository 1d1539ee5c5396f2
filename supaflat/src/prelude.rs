//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use supaflat::prelude::*;
//! ```

// Schema types
pub use supaflat_schema::{
    DEFAULT_ROOT_NAME, DeclarationCategory, FlatDeclaration, ParseError, SchemaLocator,
    SchemaNameMapping, parse_source,
};

// Pipeline types
pub use supaflat_codegen::{
    CodegenError, Config, ConfigError, CrossReferenceRewriter, FlattenEngine, FlattenOutput,
    FlattenedSchema, GenerateRequest, GeneratedOutput, Generator, IdentityPrinter, NamingConfig,
    OverrideReport, ParserMode, PrettyPrinter, ValidatorGenerator, ValidatorOutput,
    flatten_types,
};
