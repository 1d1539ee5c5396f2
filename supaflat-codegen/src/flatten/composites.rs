//! Composite types.

use super::{Entity, FlattenEngine, FlattenedSchema, body};
use supaflat_schema::locator::COMPOSITE_TYPES_KEY;
use supaflat_schema::{DeclarationCategory, TypeNode};
use tracing::debug;

pub(super) fn flatten_composites(
    engine: &FlattenEngine<'_>,
    schema_key: &str,
    composites: &TypeNode,
    out: &mut FlattenedSchema,
) {
    for (name, ty) in composites.properties() {
        if !ty.is_object() {
            debug!("Skipping composite type '{}.{}'", schema_key, name);
            continue;
        }

        let entity = Entity {
            category: DeclarationCategory::CompositeType,
            schema_key,
            category_key: COMPOSITE_TYPES_KEY,
            entity_name: name,
            member: None,
        };
        engine.declare(entity, ty, body::extract_body(engine.file(), ty), out);
    }
}

#[cfg(test)]
mod tests {
    use crate::flatten::FlattenEngine;
    use crate::naming::NamingConfig;
    use supaflat_schema::{DEFAULT_ROOT_NAME, SchemaLocator, parse_source};

    #[test]
    fn test_object_composites() {
        let source = r#"type Database = {
  public: {
    CompositeTypes: {
      money: { amount: number | null; currency: string | null }
      alias: Json
      grid: Record<number, unknown>
    }
  }
}"#;
        let file = parse_source(source).expect("Failed to parse");
        let naming = NamingConfig::default();
        let engine = FlattenEngine::new(SchemaLocator::new(&file, DEFAULT_ROOT_NAME), &naming);
        let flat = engine.flatten_schema("public");

        assert_eq!(flat.len(), 1);
        assert_eq!(flat.declarations()[0].formatted_name, "PublicMoney");
        assert_eq!(
            flat.declarations()[0].body,
            "{ amount: number | null; currency: string | null }"
        );
    }
}
