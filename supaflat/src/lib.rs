//! # Supaflat
//!
//! Flattens the nested `Database` type emitted by Supabase type generation
//! into one standalone declaration per table operation, enum, composite
//! type and function signature.
//!
//! ## Features
//!
//! - **Schema-scoped flattening** - Pick schemas or discover them from the root
//! - **Self-contained output** - Enums referenced from other schemas are pulled in
//! - **Cross-reference rewriting** - Nested lookups become flattened names
//! - **Configurable naming** - Templates for declaration and validator names
//!
//! ## Quick Start
//!
//! ```ignore
//! use supaflat::prelude::*;
//!
//! let naming = NamingConfig::default();
//! let output = Generator::new(&naming, &my_validator_generator)
//!     .generate(&source, &GenerateRequest::for_schemas(["public"]))?;
//! println!("{}", output.validators);
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Declaration parsing, root location and flattening IR
//! - [`codegen`] - Naming, flattening, rewriting and the generation pipeline

pub mod prelude;

/// Declaration parsing and root location.
pub mod schema {
    pub use supaflat_schema::*;
}

/// Flattening and generation pipeline.
pub mod codegen {
    pub use supaflat_codegen::*;
}

// Re-export commonly used items at the crate root
pub use supaflat_codegen::{
    CodegenError, Config, GenerateRequest, GeneratedOutput, Generator, NamingConfig,
    flatten_file, flatten_source,
};
pub use supaflat_schema::{DEFAULT_ROOT_NAME, ParseError};
