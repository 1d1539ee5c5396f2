//! Declaration body extraction and normalization.
//!
//! Bodies are copied verbatim from the source text. Only the spans of
//! nodes that need a structural rewrite are patched.

use supaflat_schema::locator::ENUMS_KEY;
use supaflat_schema::{
    EnumReference, Keyword, Literal, MemberKind, SourceFile, Span, TypeKind, TypeNode,
};

/// Replacement for empty tuples and `never` arrays.
pub const UNKNOWN_ARRAY: &str = "unknown[]";

/// Replacement for bodies denoting an object without properties.
pub const EMPTY_OBJECT: &str = "{}";

/// Boolean body.
pub const BOOLEAN: &str = "boolean";

/// Copies the text of `ty`, rewriting empty arrays to `unknown[]`.
#[must_use]
pub fn extract_body(file: &SourceFile, ty: &TypeNode) -> String {
    let mut patches: Vec<Span> = Vec::new();
    ty.walk(&mut |node| {
        if is_empty_array(node) {
            patches.push(node.span);
        }
    });
    patches.sort_by_key(|span| (span.start, std::cmp::Reverse(span.end)));

    let mut output = String::new();
    let mut cursor = ty.span.start;
    for span in patches {
        if span.start < cursor {
            continue;
        }
        output.push_str(file.slice(Span::new(cursor, span.start)));
        output.push_str(UNKNOWN_ARRAY);
        cursor = span.end;
    }
    output.push_str(file.slice(Span::new(cursor, ty.span.end)));

    output
}

/// Extracts a function `Args` or `Returns` body.
///
/// Boolean shapes collapse to `boolean` and property-less shapes to `{}`.
#[must_use]
pub fn extract_function_body(file: &SourceFile, ty: &TypeNode) -> String {
    if is_boolean(ty) {
        return BOOLEAN.to_string();
    }
    if is_empty_object(ty) {
        return EMPTY_OBJECT.to_string();
    }
    extract_body(file, ty)
}

/// Returns true for `[]`, `never[]` and `Array<never>`.
#[must_use]
pub fn is_empty_array(ty: &TypeNode) -> bool {
    match &ty.unparen().kind {
        TypeKind::Tuple(elements) => elements.is_empty(),
        TypeKind::Array(inner) => inner.is_keyword(Keyword::Never),
        TypeKind::Reference { name, args } => {
            (name == "Array" || name == "ReadonlyArray")
                && args.len() == 1
                && args[0].is_keyword(Keyword::Never)
        }
        _ => false,
    }
}

/// Returns true for `boolean` and `true | false`.
#[must_use]
pub fn is_boolean(ty: &TypeNode) -> bool {
    match &ty.unparen().kind {
        TypeKind::Keyword(Keyword::Boolean) => true,
        TypeKind::Union(variants) if variants.len() == 2 => {
            let has = |value: bool| {
                variants
                    .iter()
                    .any(|v| matches!(v.unparen().kind, TypeKind::Literal(Literal::Bool(b)) if b == value))
            };
            has(true) && has(false)
        }
        _ => false,
    }
}

/// Returns true for shapes without properties.
///
/// Matches `{}`, `{ [_ in never]: never }` and `Record<K, never>` with
/// `K` one of `PropertyKey`, `string` or `number`.
#[must_use]
pub fn is_empty_object(ty: &TypeNode) -> bool {
    let ty = ty.unparen();
    if let Some(members) = ty.as_object() {
        return match members {
            [] => true,
            [member] => matches!(
                &member.kind,
                MemberKind::Mapped { constraint, value, .. }
                    if constraint.is_keyword(Keyword::Never) && value.is_keyword(Keyword::Never)
            ),
            _ => false,
        };
    }

    match ty.as_reference() {
        Some(("Record", [key, value])) => is_property_key(key) && value.is_keyword(Keyword::Never),
        _ => false,
    }
}

fn is_property_key(ty: &TypeNode) -> bool {
    ty.is_keyword(Keyword::String)
        || ty.is_keyword(Keyword::Number)
        || matches!(ty.as_reference(), Some(("PropertyKey", [])))
}

/// Returns true for `{ [k: number]: unknown }` and `Record<number, unknown>`.
#[must_use]
pub fn is_numeric_unknown_map(ty: &TypeNode) -> bool {
    let ty = ty.unparen();
    if let Some(members) = ty.as_object() {
        return matches!(
            members,
            [member] if matches!(
                &member.kind,
                MemberKind::Index { key, value, .. }
                    if key.is_keyword(Keyword::Number) && value.is_keyword(Keyword::Unknown)
            )
        );
    }

    match ty.as_reference() {
        Some(("Record", [key, value])) => {
            key.is_keyword(Keyword::Number) && value.is_keyword(Keyword::Unknown)
        }
        _ => false,
    }
}

/// Collects every `Root["schema"]["Enums"]["name"]` path inside `ty`.
#[must_use]
pub fn referenced_enums(ty: &TypeNode, root_name: &str) -> Vec<EnumReference> {
    let mut references = Vec::new();
    ty.walk(&mut |node| {
        if !matches!(node.kind, TypeKind::IndexedAccess { .. }) {
            return;
        }
        let Some((root, path)) = node.access_path() else {
            return;
        };
        if root != root_name {
            return;
        }
        if let [schema, category, name] = path.as_slice() {
            if *category == ENUMS_KEY {
                let reference = EnumReference {
                    schema_key: (*schema).to_string(),
                    enum_name: (*name).to_string(),
                };
                if !references.contains(&reference) {
                    references.push(reference);
                }
            }
        }
    });
    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaflat_schema::parse_source;

    fn parse_body(body: &str) -> SourceFile {
        parse_source(&format!("type T = {}", body)).expect("Failed to parse")
    }

    fn body_of(file: &SourceFile) -> &TypeNode {
        &file.alias("T").expect("alias").ty
    }

    #[test]
    fn test_extract_body_verbatim() {
        let file = parse_body("{\n  id: number\n  name: string | null\n}");
        assert_eq!(
            extract_body(&file, body_of(&file)),
            "{\n  id: number\n  name: string | null\n}"
        );
    }

    #[test]
    fn test_empty_arrays_become_unknown_arrays() {
        let file = parse_body("{ a: []; b: never[]; c: Array<never>; d: string[] }");
        assert_eq!(
            extract_body(&file, body_of(&file)),
            "{ a: unknown[]; b: unknown[]; c: unknown[]; d: string[] }"
        );

        let file = parse_body("[]");
        assert_eq!(extract_body(&file, body_of(&file)), "unknown[]");
    }

    #[test]
    fn test_function_body_normalization() {
        for (body, expected) in [
            ("boolean", "boolean"),
            ("true | false", "boolean"),
            ("{}", "{}"),
            ("Record<PropertyKey, never>", "{}"),
            ("Record<string, never>", "{}"),
            ("{ [_ in never]: never }", "{}"),
            ("{ user_id: string }", "{ user_id: string }"),
            ("Json", "Json"),
        ] {
            let file = parse_body(body);
            assert_eq!(extract_function_body(&file, body_of(&file)), expected, "{body}");
        }
    }

    #[test]
    fn test_numeric_unknown_map() {
        for body in ["{ [k: number]: unknown }", "Record<number, unknown>"] {
            let file = parse_body(body);
            assert!(is_numeric_unknown_map(body_of(&file)), "{body}");
        }
        let file = parse_body("{ [k: string]: unknown }");
        assert!(!is_numeric_unknown_map(body_of(&file)));
    }

    #[test]
    fn test_referenced_enums_both_quote_styles() {
        let file = parse_body(
            r#"{ a: Database["auth"]["Enums"]["factor_type"]; b: Database['public']['Enums']['status'] | null; c: Database["auth"]["Enums"]["factor_type"] }"#,
        );
        let refs = referenced_enums(body_of(&file), "Database");
        assert_eq!(
            refs,
            vec![
                EnumReference {
                    schema_key: "auth".to_string(),
                    enum_name: "factor_type".to_string(),
                },
                EnumReference {
                    schema_key: "public".to_string(),
                    enum_name: "status".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_referenced_enums_ignores_other_roots() {
        let file = parse_body(r#"{ a: Other["auth"]["Enums"]["x"]; b: Database["auth"]["Tables"]["x"] }"#);
        assert!(referenced_enums(body_of(&file), "Database").is_empty());
    }
}
