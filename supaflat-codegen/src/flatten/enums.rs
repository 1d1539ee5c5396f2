//! Enums.

use super::{Entity, FlattenEngine, FlattenedSchema, body};
use supaflat_schema::locator::ENUMS_KEY;
use supaflat_schema::{DeclarationCategory, TypeNode};
use tracing::debug;

/// Emits literal and literal-union enums accepted by `filter`.
///
/// Returns the names of the enums that were emitted.
pub(super) fn flatten_enums(
    engine: &FlattenEngine<'_>,
    schema_key: &str,
    enums: &TypeNode,
    filter: impl Fn(&str) -> bool,
    out: &mut FlattenedSchema,
) -> Vec<String> {
    let mut emitted = Vec::new();

    for (name, ty) in enums.properties() {
        if !filter(name) {
            continue;
        }
        if !ty.is_literal_union() {
            debug!("Skipping enum '{}.{}': not a literal union", schema_key, name);
            continue;
        }

        let entity = Entity {
            category: DeclarationCategory::Enum,
            schema_key,
            category_key: ENUMS_KEY,
            entity_name: name,
            member: None,
        };
        if engine.declare(entity, ty, body::extract_body(engine.file(), ty), out) {
            emitted.push(name.to_string());
        }
    }

    emitted
}
