//! Tables and views.

use super::{Entity, FlattenEngine, FlattenedSchema, body};
use supaflat_schema::{DeclarationCategory, TypeNode};
use tracing::debug;

/// Emits one declaration per object or tuple operation of every table.
///
/// Scalar, array and reference entries are left alone.
pub(super) fn flatten_tables(
    engine: &FlattenEngine<'_>,
    schema_key: &str,
    category_key: &str,
    tables: &TypeNode,
    out: &mut FlattenedSchema,
) {
    for (table, operations) in tables.properties() {
        if !operations.is_object() {
            debug!("Skipping non-object table '{}.{}'", schema_key, table);
            continue;
        }

        for (operation, ty) in operations.properties() {
            if !(ty.is_object() || ty.is_tuple()) {
                debug!(
                    "Skipping operation '{}.{}.{}': not an object or tuple",
                    schema_key, table, operation
                );
                continue;
            }

            let entity = Entity {
                category: DeclarationCategory::TableOperation,
                schema_key,
                category_key,
                entity_name: table,
                member: Some(operation),
            };
            engine.declare(entity, ty, body::extract_body(engine.file(), ty), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::flatten::FlattenEngine;
    use crate::naming::NamingConfig;
    use supaflat_schema::{DEFAULT_ROOT_NAME, SchemaLocator, parse_source};

    #[test]
    fn test_only_object_and_tuple_operations() {
        let source = r#"type Database = {
  public: {
    Tables: {
      events: {
        Row: { id: number; payload: Json }
        Insert: Json
        Update: string[]
        Relationships: []
      }
      broken: string
    }
  }
}"#;
        let file = parse_source(source).expect("Failed to parse");
        let naming = NamingConfig::default();
        let engine = FlattenEngine::new(SchemaLocator::new(&file, DEFAULT_ROOT_NAME), &naming);
        let flat = engine.flatten_schema("public");

        let names: Vec<_> = flat
            .declarations()
            .iter()
            .map(|d| d.formatted_name.as_str())
            .collect();
        assert_eq!(names, vec!["PublicEventsRow", "PublicEventsRelationships"]);
        assert_eq!(flat.declarations()[0].body, "{ id: number; payload: Json }");
        assert_eq!(flat.declarations()[1].member.as_deref(), Some("Relationships"));
    }

    #[test]
    fn test_views_keep_their_category_key() {
        let source = "type Database = { api: { Views: { stats: { Row: { n: number } } } } }";
        let file = parse_source(source).expect("Failed to parse");
        let naming = NamingConfig::default();
        let engine = FlattenEngine::new(SchemaLocator::new(&file, DEFAULT_ROOT_NAME), &naming);
        let flat = engine.flatten_schema("api");

        assert_eq!(flat.len(), 1);
        assert_eq!(
            flat.declarations()[0].source_path(),
            vec!["api", "Views", "stats", "Row"]
        );
    }
}
