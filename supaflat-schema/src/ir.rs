//! Intermediate representation for flattened declarations.
//!
//! This module provides the flat, standalone declarations extracted from the
//! nested root structure, plus the bookkeeping records that travel with them
//! into cross-reference rewriting and validator naming.

use crate::locator::{COMPOSITE_TYPES_KEY, ENUMS_KEY, FUNCTIONS_KEY, TABLES_KEY, VIEWS_KEY};
use std::fmt;

/// Category of a flattened declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationCategory {
    /// One operation (`Row`, `Insert`, ...) of a table or view.
    TableOperation,
    /// An enum.
    Enum,
    /// A composite type.
    CompositeType,
    /// The `Args` member of a function.
    FunctionArgs,
    /// The `Returns` member of a function.
    FunctionReturns,
}

impl DeclarationCategory {
    /// All categories, in emission order.
    pub const ALL: [Self; 5] = [
        Self::TableOperation,
        Self::Enum,
        Self::CompositeType,
        Self::FunctionArgs,
        Self::FunctionReturns,
    ];

    /// Returns the placeholder names a template for this category may use.
    #[must_use]
    pub const fn placeholders(&self) -> &'static [&'static str] {
        match self {
            Self::TableOperation => &["schema", "table", "operation"],
            Self::Enum | Self::CompositeType => &["schema", "name"],
            Self::FunctionArgs | Self::FunctionReturns => &["schema", "function"],
        }
    }

    /// Returns true if the category holds enums.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum)
    }
}

impl fmt::Display for DeclarationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TableOperation => "table operation",
            Self::Enum => "enum",
            Self::CompositeType => "composite type",
            Self::FunctionArgs => "function args",
            Self::FunctionReturns => "function returns",
        };
        f.write_str(name)
    }
}

/// A standalone declaration extracted from the root structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatDeclaration {
    /// Declaration category.
    pub category: DeclarationCategory,
    /// Schema the entity originates from.
    pub schema_key: String,
    /// Key under which the entity sits inside its schema (`Tables`, `Enums`, ...).
    pub category_key: String,
    /// Table, enum, composite or function name.
    pub entity_name: String,
    /// Table operation or function member (`Row`, `Args`, ...), if any.
    pub member: Option<String>,
    /// Final declaration identifier.
    pub formatted_name: String,
    /// Right-hand side type text.
    pub body: String,
}

impl FlatDeclaration {
    /// Returns the key identifying the entity regardless of its formatted name.
    #[must_use]
    pub fn key(&self) -> DeclarationKey {
        DeclarationKey {
            category: self.category,
            schema_key: self.schema_key.clone(),
            entity_name: self.entity_name.clone(),
            member: self.member.clone(),
        }
    }

    /// Returns the nested path segments that referenced this entity in the
    /// source, e.g. `["public", "Tables", "users", "Row"]`.
    #[must_use]
    pub fn source_path(&self) -> Vec<&str> {
        let mut path = vec![
            self.schema_key.as_str(),
            self.category_key.as_str(),
            self.entity_name.as_str(),
        ];
        if let Some(member) = &self.member {
            path.push(member);
        }
        path
    }

    /// Renders the declaration as a TypeScript type alias.
    #[must_use]
    pub fn render(&self) -> String {
        format!("export type {} = {};\n", self.formatted_name, self.body)
    }
}

/// Identity of a flattened entity within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationKey {
    /// Declaration category.
    pub category: DeclarationCategory,
    /// Origin schema.
    pub schema_key: String,
    /// Entity name.
    pub entity_name: String,
    /// Member, if any.
    pub member: Option<String>,
}

/// A `(schema, enum)` pair referenced through a nested path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumReference {
    /// Schema the enum lives in.
    pub schema_key: String,
    /// Enum name.
    pub enum_name: String,
}

/// Link between a declaration name and its configured validator identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNameMapping {
    /// Flattened declaration name.
    pub type_name: String,
    /// Configured validator identifier.
    pub schema_name: String,
    /// Whether the originating entity name contains non-identifier characters.
    pub lossy: bool,
}

/// Returns the source category key for a declaration category.
///
/// Table operations may come from either `Tables` or `Views`; `Tables` is
/// returned for them.
#[must_use]
pub const fn category_key(category: DeclarationCategory) -> &'static str {
    match category {
        DeclarationCategory::TableOperation => TABLES_KEY,
        DeclarationCategory::Enum => ENUMS_KEY,
        DeclarationCategory::CompositeType => COMPOSITE_TYPES_KEY,
        DeclarationCategory::FunctionArgs | DeclarationCategory::FunctionReturns => {
            FUNCTIONS_KEY
        }
    }
}

/// Returns true if `key` names a category holding tables.
#[must_use]
pub fn is_table_category(key: &str) -> bool {
    key == TABLES_KEY || key == VIEWS_KEY
}
