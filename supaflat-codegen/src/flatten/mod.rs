//! Type flattening engine.
//!
//! Turns one schema of the nested root map into standalone declarations.
//! Each category has its own module; this module owns the accumulator and
//! the shared naming step.

pub mod body;
mod composites;
mod enums;
mod functions;
mod tables;

use crate::naming::{NamingConfig, has_non_identifier_chars};
use std::collections::{HashMap, HashSet};
use supaflat_schema::locator::{
    COMPOSITE_TYPES_KEY, ENUMS_KEY, FUNCTIONS_KEY, TABLES_KEY, VIEWS_KEY,
};
use supaflat_schema::{
    DeclarationCategory, DeclarationKey, EnumReference, FlatDeclaration, SchemaLocator,
    SchemaNameMapping, SourceFile, Span, TypeKind, TypeNode,
};
use tracing::{debug, info, warn};

/// Categories whose bodies may reference enums of other schemas.
const REFERENCING_CATEGORIES: [&str; 3] = [TABLES_KEY, VIEWS_KEY, FUNCTIONS_KEY];

/// A top-level alias of the source that flattened bodies refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportingAlias {
    /// Alias name.
    pub name: String,
    /// Span of the statement in the source.
    pub span: Span,
    /// Statement text, copied verbatim.
    pub text: String,
}

impl SupportingAlias {
    /// Renders the statement on its own line, terminated by a semicolon.
    #[must_use]
    pub fn render(&self) -> String {
        let text = self.text.trim_end();
        if text.ends_with(';') {
            format!("{}\n", text)
        } else {
            format!("{};\n", text)
        }
    }
}

/// Declarations and name mappings produced by flattening.
///
/// Values are folded together with [`FlattenedSchema::merge`]. A
/// declaration whose key was already seen is dropped, as is one whose
/// formatted name is taken by a different entity.
#[derive(Debug, Clone, Default)]
pub struct FlattenedSchema {
    declarations: Vec<FlatDeclaration>,
    mappings: Vec<SchemaNameMapping>,
    dependencies: Vec<EnumReference>,
    references: Vec<String>,
    supporting: Vec<SupportingAlias>,
    keys: HashSet<DeclarationKey>,
    names: HashMap<String, DeclarationKey>,
}

impl FlattenedSchema {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration with its name mapping.
    ///
    /// Returns false if the declaration was dropped as a duplicate.
    pub fn push(&mut self, declaration: FlatDeclaration, mapping: SchemaNameMapping) -> bool {
        let key = declaration.key();
        if self.keys.contains(&key) {
            debug!(
                "Skipping duplicate {} '{}' from schema '{}'",
                declaration.category, declaration.entity_name, declaration.schema_key
            );
            return false;
        }
        if let Some(existing) = self.names.get(&declaration.formatted_name) {
            warn!(
                "Declaration name '{}' for {} '{}.{}' is already used by '{}.{}'; skipping",
                declaration.formatted_name,
                declaration.category,
                declaration.schema_key,
                declaration.entity_name,
                existing.schema_key,
                existing.entity_name
            );
            return false;
        }

        self.names.insert(declaration.formatted_name.clone(), key.clone());
        self.keys.insert(key);
        self.declarations.push(declaration);
        self.mappings.push(mapping);
        true
    }

    /// Folds `other` into `self`, keeping the first occurrence of each entity.
    pub fn merge(&mut self, other: Self) {
        for (declaration, mapping) in other.declarations.into_iter().zip(other.mappings) {
            self.push(declaration, mapping);
        }
        for dependency in other.dependencies {
            if !self.dependencies.contains(&dependency) {
                self.dependencies.push(dependency);
            }
        }
        for reference in other.references {
            if !self.references.contains(&reference) {
                self.references.push(reference);
            }
        }
        for alias in other.supporting {
            if !self.supporting.iter().any(|existing| existing.name == alias.name) {
                self.supporting.push(alias);
            }
        }
        self.supporting.sort_by_key(|alias| alias.span.start);
    }

    /// Records the plain type names `ty` refers to.
    fn note_references(&mut self, ty: &TypeNode) {
        let references = &mut self.references;
        ty.walk(&mut |node| {
            if let TypeKind::Reference { name, .. } = &node.kind {
                if !name.contains('.') && !references.contains(name) {
                    references.push(name.clone());
                }
            }
        });
    }

    /// Returns the declarations in emission order.
    #[must_use]
    pub fn declarations(&self) -> &[FlatDeclaration] {
        &self.declarations
    }

    /// Returns one name mapping per declaration.
    #[must_use]
    pub fn mappings(&self) -> &[SchemaNameMapping] {
        &self.mappings
    }

    /// Returns the foreign enums pulled in as dependencies.
    #[must_use]
    pub fn dependencies(&self) -> &[EnumReference] {
        &self.dependencies
    }

    /// Returns the source aliases the declarations depend on, in source order.
    #[must_use]
    pub fn supporting(&self) -> &[SupportingAlias] {
        &self.supporting
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Returns true if no declaration was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Renders supporting aliases, then every declaration with enums first.
    #[must_use]
    pub fn render(&self) -> String {
        let (enums, others): (Vec<_>, Vec<_>) = self
            .declarations
            .iter()
            .partition(|declaration| declaration.category.is_enum());

        let mut output = String::new();
        for alias in &self.supporting {
            output.push_str(&alias.render());
        }
        for declaration in enums.into_iter().chain(others) {
            output.push_str(&declaration.render());
        }
        output
    }
}

/// Identity of an entity about to be declared.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entity<'n> {
    pub category: DeclarationCategory,
    pub schema_key: &'n str,
    pub category_key: &'n str,
    pub entity_name: &'n str,
    pub member: Option<&'n str>,
}

impl Entity<'_> {
    /// Returns the template placeholders for this entity.
    fn placeholders(&self) -> Vec<(&str, &str)> {
        let mut placeholders = vec![("schema", self.schema_key)];
        match self.category {
            DeclarationCategory::TableOperation => {
                placeholders.push(("table", self.entity_name));
                placeholders.push(("operation", self.member.unwrap_or_default()));
            }
            DeclarationCategory::Enum | DeclarationCategory::CompositeType => {
                placeholders.push(("name", self.entity_name));
            }
            DeclarationCategory::FunctionArgs | DeclarationCategory::FunctionReturns => {
                placeholders.push(("function", self.entity_name));
            }
        }
        placeholders
    }
}

/// Flattens schemas of one parsed source.
#[derive(Debug, Clone, Copy)]
pub struct FlattenEngine<'a> {
    locator: SchemaLocator<'a>,
    naming: &'a NamingConfig,
    process_dependencies: bool,
}

impl<'a> FlattenEngine<'a> {
    /// Creates an engine with dependency processing enabled.
    #[must_use]
    pub fn new(locator: SchemaLocator<'a>, naming: &'a NamingConfig) -> Self {
        Self {
            locator,
            naming,
            process_dependencies: true,
        }
    }

    /// Enables or disables pulling in referenced enums of other schemas.
    #[must_use]
    pub fn with_dependencies(mut self, process_dependencies: bool) -> Self {
        self.process_dependencies = process_dependencies;
        self
    }

    /// Returns the schema locator.
    #[must_use]
    pub const fn locator(&self) -> &SchemaLocator<'a> {
        &self.locator
    }

    pub(crate) fn file(&self) -> &'a SourceFile {
        self.locator.file()
    }

    /// Flattens one schema.
    ///
    /// A schema missing from the root yields an empty result.
    #[must_use]
    pub fn flatten_schema(&self, schema_key: &str) -> FlattenedSchema {
        let mut out = FlattenedSchema::new();
        let Some(schema) = self.locator.schema(schema_key) else {
            debug!("Schema '{}' not found under '{}'", schema_key, self.locator.root_name());
            return out;
        };

        for category_key in [TABLES_KEY, VIEWS_KEY] {
            if let Some(tables) = schema.property(category_key) {
                tables::flatten_tables(self, schema_key, category_key, tables, &mut out);
            }
        }
        if let Some(enums) = schema.property(ENUMS_KEY) {
            enums::flatten_enums(self, schema_key, enums, |_| true, &mut out);
        }
        if let Some(composites) = schema.property(COMPOSITE_TYPES_KEY) {
            composites::flatten_composites(self, schema_key, composites, &mut out);
        }
        if let Some(functions) = schema.property(FUNCTIONS_KEY) {
            functions::flatten_functions(self, schema_key, functions, &mut out);
        }

        if self.process_dependencies {
            self.flatten_dependencies(schema_key, schema, &mut out);
        }
        self.collect_supporting(&mut out);

        info!("Flattened schema '{}': {} declaration(s)", schema_key, out.len());
        out
    }

    /// Flattens several schemas in order, folding the results.
    #[must_use]
    pub fn flatten_schemas<S: AsRef<str>>(&self, schema_keys: &[S]) -> FlattenedSchema {
        schema_keys
            .iter()
            .fold(FlattenedSchema::new(), |mut acc, key| {
                acc.merge(self.flatten_schema(key.as_ref()));
                acc
            })
    }

    /// Resolves the source aliases referenced by the declarations of `out`,
    /// following references between aliases.
    ///
    /// The root declaration and names already taken by a declaration are
    /// never carried.
    fn collect_supporting(&self, out: &mut FlattenedSchema) {
        let file = self.file();
        let root_name = self.locator.root_name();
        let mut pending: Vec<String> = out.references.iter().rev().cloned().collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut supporting = Vec::new();

        while let Some(name) = pending.pop() {
            if name == root_name || !seen.insert(name.clone()) {
                continue;
            }
            if out.names.contains_key(&name) {
                warn!("Source alias '{}' shares its name with a declaration; not carried", name);
                continue;
            }

            let span = if let Some(alias) = file.alias(&name) {
                alias.ty.walk(&mut |node| {
                    if let TypeKind::Reference { name: referenced, .. } = &node.kind {
                        if !referenced.contains('.') {
                            pending.push(referenced.clone());
                        }
                    }
                });
                alias.span
            } else if let Some(skipped) = file.skipped.iter().find(|s| s.name == name) {
                skipped.span
            } else {
                continue;
            };

            debug!("Carrying source alias '{}'", name);
            supporting.push(SupportingAlias {
                text: file.slice(span).to_string(),
                name,
                span,
            });
        }

        supporting.sort_by_key(|alias| alias.span.start);
        out.supporting = supporting;
    }

    /// Emits enums of other schemas referenced from this schema's bodies.
    fn flatten_dependencies(&self, schema_key: &str, schema: &TypeNode, out: &mut FlattenedSchema) {
        let root_name = self.locator.root_name();
        let mut referenced: Vec<EnumReference> = Vec::new();
        for category_key in REFERENCING_CATEGORIES {
            if let Some(category) = schema.property(category_key) {
                for reference in body::referenced_enums(category, root_name) {
                    if reference.schema_key != schema_key && !referenced.contains(&reference) {
                        referenced.push(reference);
                    }
                }
            }
        }
        if referenced.is_empty() {
            return;
        }

        for foreign_key in self.locator.schema_keys() {
            if foreign_key == schema_key {
                continue;
            }
            let Some(enums) = self
                .locator
                .schema(&foreign_key)
                .and_then(|foreign| foreign.property(ENUMS_KEY))
            else {
                continue;
            };

            let is_referenced = |name: &str| {
                referenced
                    .iter()
                    .any(|r| r.schema_key == foreign_key && r.enum_name == name)
            };
            let emitted = enums::flatten_enums(self, &foreign_key, enums, is_referenced, out);
            for enum_name in emitted {
                debug!(
                    "Pulled in enum '{}.{}' referenced from schema '{}'",
                    foreign_key, enum_name, schema_key
                );
                out.dependencies.push(EnumReference {
                    schema_key: foreign_key.clone(),
                    enum_name,
                });
            }
        }
    }

    /// Names an entity and adds its declaration to `out`.
    ///
    /// Numeric-indexed maps of unknown values are not representable as
    /// standalone declarations and are dropped.
    pub(crate) fn declare(
        &self,
        entity: Entity<'_>,
        ty: &TypeNode,
        body: String,
        out: &mut FlattenedSchema,
    ) -> bool {
        if body::is_numeric_unknown_map(ty) {
            debug!(
                "Skipping numeric-indexed map {} '{}.{}'",
                entity.category, entity.schema_key, entity.entity_name
            );
            return false;
        }

        let placeholders = entity.placeholders();
        let lossy = has_non_identifier_chars(entity.entity_name);
        let formatted_name = self.naming.declaration_name(entity.category, &placeholders);
        let schema_name = self
            .naming
            .validator_name(entity.category, &placeholders, lossy);

        let declaration = FlatDeclaration {
            category: entity.category,
            schema_key: entity.schema_key.to_string(),
            category_key: entity.category_key.to_string(),
            entity_name: entity.entity_name.to_string(),
            member: entity.member.map(str::to_string),
            formatted_name: formatted_name.clone(),
            body,
        };
        let mapping = SchemaNameMapping {
            type_name: formatted_name,
            schema_name,
            lossy,
        };
        let pushed = out.push(declaration, mapping);
        if pushed {
            out.note_references(ty);
        }
        pushed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use supaflat_schema::{DEFAULT_ROOT_NAME, parse_source};

    pub(crate) const TWO_SCHEMAS: &str = r#"export type Json =
  | string
  | number
  | boolean
  | null
  | { [key: string]: Json | undefined }
  | Json[]

export type Database = {
  auth: {
    Tables: {
      users: {
        Row: {
          id: string
          factor: Database["auth"]["Enums"]["factor_type"] | null
        }
        Insert: {
          id: string
        }
        Update: {
          id?: string
        }
        Relationships: []
      }
    }
    Views: {
      [_ in never]: never
    }
    Functions: {
      [_ in never]: never
    }
    Enums: {
      factor_type: "totp" | "webauthn"
      aal_level: "aal1" | "aal2" | "aal3"
    }
    CompositeTypes: {
      [_ in never]: never
    }
  }
  public: {
    Tables: {
      profiles: {
        Row: {
          id: string
          user_id: string
          status: Database["public"]["Enums"]["status"]
          factor: Database['auth']['Enums']['factor_type'] | null
          tags: never[]
        }
        Insert: {
          id?: string
          user_id: string
          status?: Database["public"]["Enums"]["status"]
          factor?: Database['auth']['Enums']['factor_type'] | null
          tags?: never[]
        }
        Update: {
          id?: string
          user_id?: string
          status?: Database["public"]["Enums"]["status"]
          factor?: Database['auth']['Enums']['factor_type'] | null
          tags?: never[]
        }
        Relationships: [
          {
            foreignKeyName: "profiles_user_id_fkey"
            columns: ["user_id"]
            isOneToOne: true
            referencedRelation: "users"
            referencedColumns: ["id"]
          },
        ]
      }
    }
    Views: {
      active_profiles: {
        Row: {
          id: string | null
          status: Database["public"]["Enums"]["status"] | null
        }
        Relationships: []
      }
    }
    Functions: {
      is_admin: {
        Args: Record<PropertyKey, never>
        Returns: boolean
      }
      search_profiles: {
        Args: { query: string; limit?: number }
        Returns: Database["public"]["Tables"]["profiles"]["Row"][]
      }
      lookup:
        | { Args: { id: string }; Returns: string }
        | { Args: { name: string }; Returns: string }
    }
    Enums: {
      status: "active" | "inactive"
      "billing-plan": "free" | "pro"
    }
    CompositeTypes: {
      address: {
        street: string | null
        city: string | null
      }
      sparse: {
        [k: number]: unknown
      }
    }
  }
}
"#;

    fn flatten(source: &str, schema: &str, deps: bool) -> FlattenedSchema {
        let file = parse_source(source).expect("Failed to parse");
        let naming = NamingConfig::default();
        let locator = SchemaLocator::new(&file, DEFAULT_ROOT_NAME);
        FlattenEngine::new(locator, &naming)
            .with_dependencies(deps)
            .flatten_schema(schema)
    }

    fn names(flat: &FlattenedSchema) -> Vec<&str> {
        flat.declarations()
            .iter()
            .map(|d| d.formatted_name.as_str())
            .collect()
    }

    #[test]
    fn test_declaration_count() {
        let flat = flatten(TWO_SCHEMAS, "public", false);
        // 4 table operations + 2 view operations, 2 enums, 1 composite
        // (the numeric map is dropped), 3 functions x 2 members.
        assert_eq!(flat.len(), 6 + 2 + 1 + 6);
        assert_eq!(flat.mappings().len(), flat.len());
    }

    #[test]
    fn test_category_order_and_names() {
        let flat = flatten(TWO_SCHEMAS, "public", false);
        assert_eq!(
            names(&flat),
            vec![
                "PublicProfilesRow",
                "PublicProfilesInsert",
                "PublicProfilesUpdate",
                "PublicProfilesRelationships",
                "PublicActiveProfilesRow",
                "PublicActiveProfilesRelationships",
                "PublicStatus",
                "PublicBilling_plan",
                "PublicAddress",
                "PublicIsAdminArgs",
                "PublicIsAdminReturns",
                "PublicSearchProfilesArgs",
                "PublicSearchProfilesReturns",
                "PublicLookupArgs",
                "PublicLookupReturns",
            ]
        );
    }

    #[test]
    fn test_empty_arrays_normalized() {
        let flat = flatten(TWO_SCHEMAS, "public", false);
        let row = &flat.declarations()[0];
        assert!(row.body.contains("tags: unknown[]"));
        assert!(!row.body.contains("never[]"));

        let relationships = flat
            .declarations()
            .iter()
            .find(|d| d.formatted_name == "PublicActiveProfilesRelationships")
            .expect("relationships");
        assert_eq!(relationships.body, "unknown[]");
    }

    #[test]
    fn test_function_bodies() {
        let flat = flatten(TWO_SCHEMAS, "public", false);
        let body = |name: &str| {
            flat.declarations()
                .iter()
                .find(|d| d.formatted_name == name)
                .map(|d| d.body.as_str())
                .expect("declaration")
        };
        assert_eq!(body("PublicIsAdminArgs"), "{}");
        assert_eq!(body("PublicIsAdminReturns"), "boolean");
        assert_eq!(body("PublicSearchProfilesArgs"), "{ query: string; limit?: number }");
        assert_eq!(body("PublicLookupArgs"), "{ id: string }");
    }

    #[test]
    fn test_lossy_entity_mapping() {
        let flat = flatten(TWO_SCHEMAS, "public", false);
        let mapping = flat
            .mappings()
            .iter()
            .find(|m| m.type_name == "PublicBilling_plan")
            .expect("mapping");
        assert!(mapping.lossy);
        assert_eq!(mapping.schema_name, "publicbilling_plan_schema");

        let row = &flat.mappings()[0];
        assert!(!row.lossy);
        assert_eq!(row.schema_name, "publicProfilesRowSchema");
    }

    #[test]
    fn test_cross_schema_enum_pull_in() {
        let flat = flatten(TWO_SCHEMAS, "public", true);
        let pulled = flat
            .declarations()
            .iter()
            .find(|d| d.formatted_name == "AuthFactorType")
            .expect("foreign enum");
        assert_eq!(pulled.schema_key, "auth");
        assert_eq!(pulled.category, DeclarationCategory::Enum);
        assert_eq!(
            flat.dependencies(),
            &[EnumReference {
                schema_key: "auth".to_string(),
                enum_name: "factor_type".to_string(),
            }]
        );
        assert!(!names(&flat).contains(&"AuthAalLevel"));
    }

    #[test]
    fn test_dependencies_disabled() {
        let flat = flatten(TWO_SCHEMAS, "public", false);
        assert!(!names(&flat).contains(&"AuthFactorType"));
        assert!(flat.dependencies().is_empty());
    }

    #[test]
    fn test_missing_schema_is_empty() {
        let flat = flatten(TWO_SCHEMAS, "storage", true);
        assert!(flat.is_empty());
    }

    #[test]
    fn test_render_hoists_enums() {
        let flat = flatten(TWO_SCHEMAS, "auth", false);
        let rendered = flat.render();
        assert!(rendered.starts_with("export type AuthFactorType = \"totp\" | \"webauthn\";\n"));
        let enum_pos = rendered.find("AuthAalLevel").expect("enum");
        let row_pos = rendered.find("AuthUsersRow").expect("row");
        assert!(enum_pos < row_pos);
    }

    #[test]
    fn test_merge_drops_duplicates() {
        let file = parse_source(TWO_SCHEMAS).expect("Failed to parse");
        let naming = NamingConfig::default();
        let engine = FlattenEngine::new(SchemaLocator::new(&file, DEFAULT_ROOT_NAME), &naming);

        // `public` pulls in auth.factor_type, which `auth` then declares again.
        let flat = engine.flatten_schemas(&["public", "auth"]);
        let count = names(&flat)
            .iter()
            .filter(|name| **name == "AuthFactorType")
            .count();
        assert_eq!(count, 1);
        assert_eq!(flat.mappings().len(), flat.len());
    }

    #[test]
    fn test_name_collision_keeps_first() {
        let source = r#"type Database = {
  public: {
    Enums: {
      a_b: "x"
      aB: "y"
    }
  }
}"#;
        let flat = flatten(source, "public", false);
        assert_eq!(names(&flat), vec!["PublicAB"]);
        assert_eq!(flat.declarations()[0].body, "\"x\"");
    }

    #[test]
    fn test_foreign_enums_from_views_and_functions() {
        let source = r#"type Database = {
  auth: {
    Enums: {
      factor_type: "totp" | "webauthn"
      aal_level: "aal1" | "aal2"
      unused: "x"
    }
  }
  public: {
    Views: {
      sessions: {
        Row: {
          aal: Database["auth"]["Enums"]["aal_level"] | null
        }
        Relationships: []
      }
    }
    Functions: {
      enroll: {
        Args: { factor: Database['auth']['Enums']['factor_type'] }
        Returns: undefined
      }
    }
  }
}"#;
        let flat = flatten(source, "public", true);
        let names = names(&flat);
        assert!(names.contains(&"AuthAalLevel"));
        assert!(names.contains(&"AuthFactorType"));
        assert!(!names.contains(&"AuthUnused"));
        assert_eq!(flat.dependencies().len(), 2);
    }

    #[test]
    fn test_referenced_source_aliases_are_carried() {
        let source = r#"export type Json =
  | string
  | number
  | boolean
  | null
  | { [key: string]: Json | undefined }
  | Json[]

type Payload = { data: Json; tags: Tag[] }
type Tag = string
type Unused = number

export type Database = {
  public: {
    Tables: {
      events: {
        Row: { id: number; meta: Json | null }
        Relationships: []
      }
    }
    Functions: {
      publish: {
        Args: { payload: Payload }
        Returns: undefined
      }
    }
  }
}
"#;
        let flat = flatten(source, "public", true);
        let carried: Vec<&str> = flat.supporting().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(carried, vec!["Json", "Payload", "Tag"]);

        let rendered = flat.render();
        assert!(rendered.starts_with("export type Json =\n  | string\n"));
        assert!(rendered.contains("  | Json[];\n"));
        assert!(rendered.contains("type Payload = { data: Json; tags: Tag[] };\n"));
        assert!(!rendered.contains("Unused"));
        let json = rendered.find("export type Json").expect("Json");
        let row = rendered.find("export type PublicEventsRow").expect("row");
        assert!(json < row);
    }

    #[test]
    fn test_supporting_aliases_without_references() {
        let flat = flatten(TWO_SCHEMAS, "public", true);
        assert!(flat.supporting().is_empty());
        assert!(!flat.render().contains("export type Json"));
    }
}
