//! Root declaration lookup.
//!
//! Finds the nested schema map inside a parsed source. Two root shapes are
//! accepted:
//!
//! 1. `type Database = { public: { ... }, ... }`
//! 2. `type Database = MergeDeep<Generated, { ... }>` where `Generated` is an
//!    object literal or the name of another alias resolving to one.
//!
//! Only the first `MergeDeep` argument is consulted.

use crate::types::{SourceFile, TypeNode};

/// Conventional name of the root declaration.
pub const DEFAULT_ROOT_NAME: &str = "Database";

/// Name of the two-argument merge helper accepted as a root shape.
pub const MERGE_HELPER: &str = "MergeDeep";

/// Category keys that may appear directly under a schema.
pub const TABLES_KEY: &str = "Tables";
/// Views category key.
pub const VIEWS_KEY: &str = "Views";
/// Enums category key.
pub const ENUMS_KEY: &str = "Enums";
/// Composite types category key.
pub const COMPOSITE_TYPES_KEY: &str = "CompositeTypes";
/// Functions category key.
pub const FUNCTIONS_KEY: &str = "Functions";

/// Every category key, in emission order.
pub const CATEGORY_KEYS: [&str; 5] = [
    TABLES_KEY,
    VIEWS_KEY,
    ENUMS_KEY,
    COMPOSITE_TYPES_KEY,
    FUNCTIONS_KEY,
];

/// Locates schemas inside a parsed source file.
#[derive(Debug, Clone, Copy)]
pub struct SchemaLocator<'a> {
    file: &'a SourceFile,
    root_name: &'a str,
    root: Option<&'a TypeNode>,
}

impl<'a> SchemaLocator<'a> {
    /// Creates a locator for the root declaration named `root_name`.
    #[must_use]
    pub fn new(file: &'a SourceFile, root_name: &'a str) -> Self {
        let root = locate_root(file, root_name);
        if root.is_none() {
            tracing::debug!("Root declaration '{}' not found", root_name);
        }
        Self {
            file,
            root_name,
            root,
        }
    }

    /// Returns the source file.
    #[must_use]
    pub const fn file(&self) -> &'a SourceFile {
        self.file
    }

    /// Returns the root declaration name.
    #[must_use]
    pub const fn root_name(&self) -> &'a str {
        self.root_name
    }

    /// Returns the root map node, if the root has a supported shape.
    #[must_use]
    pub const fn root(&self) -> Option<&'a TypeNode> {
        self.root
    }

    /// Returns the top-level keys of the root map that hold a schema, in
    /// source order.
    ///
    /// Entries with none of the category keys, such as client metadata, are
    /// not schemas.
    #[must_use]
    pub fn schema_keys(&self) -> Vec<String> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        root.properties()
            .filter(|(key, ty)| {
                let schema = is_schema(ty);
                if !schema {
                    tracing::debug!("Ignoring root entry '{}': not a schema", key);
                }
                schema
            })
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Returns the member map of one schema.
    #[must_use]
    pub fn schema(&self, key: &str) -> Option<&'a TypeNode> {
        self.root?.property(key).filter(|ty| ty.is_object())
    }
}

/// Returns true if `ty` is an object holding at least one category.
#[must_use]
pub fn is_schema(ty: &TypeNode) -> bool {
    ty.properties().any(|(key, _)| CATEGORY_KEYS.contains(&key))
}

/// Finds the root map node for the alias named `root_name`.
#[must_use]
pub fn locate_root<'a>(file: &'a SourceFile, root_name: &str) -> Option<&'a TypeNode> {
    let alias = file.alias(root_name)?;
    let ty = alias.ty.unparen();

    if ty.is_object() {
        return Some(ty);
    }

    let (name, args) = ty.as_reference()?;
    let is_merge = name == MERGE_HELPER || name.ends_with(&format!(".{}", MERGE_HELPER));
    if !is_merge || args.len() != 2 {
        return None;
    }

    let mut visited = vec![alias.name.as_str()];
    resolve_object(file, &args[0], &mut visited)
}

/// Resolves `ty` to an object literal, following alias references.
fn resolve_object<'a>(
    file: &'a SourceFile,
    ty: &'a TypeNode,
    visited: &mut Vec<&'a str>,
) -> Option<&'a TypeNode> {
    let ty = ty.unparen();
    if ty.is_object() {
        return Some(ty);
    }

    let (name, args) = ty.as_reference()?;
    if !args.is_empty() || visited.contains(&name) {
        return None;
    }
    visited.push(name);
    let alias = file.alias(name)?;
    resolve_object(file, &alias.ty, visited)
}
