//! Functions.

use super::{Entity, FlattenEngine, FlattenedSchema, body};
use supaflat_schema::locator::FUNCTIONS_KEY;
use supaflat_schema::{DeclarationCategory, TypeKind, TypeNode};
use tracing::debug;

/// Function members and the category each one is declared under.
const MEMBERS: [(&str, DeclarationCategory); 2] = [
    ("Args", DeclarationCategory::FunctionArgs),
    ("Returns", DeclarationCategory::FunctionReturns),
];

pub(super) fn flatten_functions(
    engine: &FlattenEngine<'_>,
    schema_key: &str,
    functions: &TypeNode,
    out: &mut FlattenedSchema,
) {
    for (function, value) in functions.properties() {
        let Some(shape) = signature(value) else {
            debug!("Skipping function '{}.{}': no object signature", schema_key, function);
            continue;
        };

        for (member, category) in MEMBERS {
            let Some(ty) = shape.property(member) else {
                debug!("Function '{}.{}' has no {}", schema_key, function, member);
                continue;
            };
            let entity = Entity {
                category,
                schema_key,
                category_key: FUNCTIONS_KEY,
                entity_name: function,
                member: Some(member),
            };
            engine.declare(entity, ty, body::extract_function_body(engine.file(), ty), out);
        }
    }
}

/// Returns the object describing a function, using the first overload of a union.
fn signature(value: &TypeNode) -> Option<&TypeNode> {
    let value = value.unparen();
    match &value.kind {
        TypeKind::Object(_) => Some(value),
        TypeKind::Union(overloads) => overloads
            .iter()
            .map(TypeNode::unparen)
            .find(|overload| overload.is_object()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::flatten::FlattenEngine;
    use crate::naming::NamingConfig;
    use supaflat_schema::{DEFAULT_ROOT_NAME, SchemaLocator, parse_source};

    fn bodies(source: &str) -> Vec<(String, String)> {
        let file = parse_source(source).expect("Failed to parse");
        let naming = NamingConfig::default();
        let engine = FlattenEngine::new(SchemaLocator::new(&file, DEFAULT_ROOT_NAME), &naming);
        engine
            .flatten_schema("public")
            .declarations()
            .iter()
            .map(|d| (d.formatted_name.clone(), d.body.clone()))
            .collect()
    }

    #[test]
    fn test_function_members() {
        let source = r#"type Database = {
  public: {
    Functions: {
      touch: {
        Args: { [_ in never]: never }
        Returns: undefined
      }
      has_role: {
        Args: { role: string }
        Returns: true | false
      }
      list_ids: {
        Args: Record<string, never>
        Returns: []
      }
    }
  }
}"#;
        let pairs = bodies(source);
        let expected = [
            ("PublicTouchArgs", "{}"),
            ("PublicTouchReturns", "undefined"),
            ("PublicHasRoleArgs", "{ role: string }"),
            ("PublicHasRoleReturns", "boolean"),
            ("PublicListIdsArgs", "{}"),
            ("PublicListIdsReturns", "unknown[]"),
        ];
        assert_eq!(pairs.len(), expected.len());
        for ((name, body), (expected_name, expected_body)) in pairs.iter().zip(expected) {
            assert_eq!(name, expected_name);
            assert_eq!(body, expected_body);
        }
    }

    #[test]
    fn test_first_overload_wins() {
        let source = r#"type Database = {
  public: {
    Functions: {
      find:
        | { Args: { id: number }; Returns: Json }
        | { Args: { slug: string }; Returns: Json }
    }
  }
}"#;
        let pairs = bodies(source);
        assert_eq!(pairs[0], ("PublicFindArgs".to_string(), "{ id: number }".to_string()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_missing_member_is_skipped() {
        let source = "type Database = { public: { Functions: { ping: { Returns: string } } } }";
        let pairs = bodies(source);
        assert_eq!(pairs, vec![("PublicPingReturns".to_string(), "string".to_string())]);
    }
}
