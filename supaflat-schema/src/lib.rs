//! # Supaflat Schema
//!
//! TypeScript declaration parsing for generated database types.
//!
//! This crate provides:
//! - Parsing of the generated type-declaration subset with tree-sitter
//! - Syntax tree definitions with source spans
//! - Location of the nested root schema map
//! - Intermediate representation for flattened declarations

pub mod error;
pub mod ir;
pub mod locator;
pub mod parser;
pub mod types;

pub use error::ParseError;
pub use ir::{
    DeclarationCategory, DeclarationKey, EnumReference, FlatDeclaration, SchemaNameMapping,
};
pub use locator::{DEFAULT_ROOT_NAME, SchemaLocator, locate_root};
pub use parser::{parse_source, parse_type};
pub use types::{
    Keyword, Literal, Member, MemberKind, SkippedAlias, SourceFile, Span, TupleElement,
    TypeAlias, TypeKind, TypeNode, is_ident_continue,
};
