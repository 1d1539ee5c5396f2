//! TypeScript declaration parser.
//!
//! Source text is parsed with the tree-sitter TypeScript grammar, and the
//! type aliases and interfaces of the resulting syntax tree are converted
//! into [`crate::types`]. The grammar recovers from syntax errors, so a
//! malformed statement only affects the declaration it belongs to. Aliases
//! whose right-hand side falls outside the supported subset are recorded in
//! [`SourceFile::skipped`].

use crate::error::ParseError;
use crate::types::{
    Keyword, Literal, Member, MemberKind, SkippedAlias, SourceFile, Span, TupleElement,
    TypeAlias, TypeKind, TypeNode,
};
use tree_sitter::{Node, Parser, Tree};

/// Prefix turning a standalone type into a parseable statement.
const TYPE_PREFIX: &str = "type T = ";

/// Parses a TypeScript source into its type aliases.
///
/// # Arguments
/// * `source` - TypeScript source text
///
/// # Returns
/// Parsed source file or parse error.
///
/// # Errors
/// Returns `ParseError` only if the grammar cannot be loaded. Declarations
/// that fail to convert are recorded in [`SourceFile::skipped`] instead.
pub fn parse_source(source: &str) -> Result<SourceFile, ParseError> {
    let tree = syntax_tree(source)?;
    let converter = Converter { text: source, base: 0 };
    let mut file = SourceFile {
        text: source.to_string(),
        aliases: Vec::new(),
        skipped: Vec::new(),
    };

    for statement in named_children(tree.root_node()) {
        let Some((declaration, exported)) = declaration_of(statement, false) else {
            continue;
        };
        let Some(name) = declaration
            .child_by_field_name("name")
            .map(|name| converter.text(name))
        else {
            continue;
        };

        match converter.alias(statement, declaration, name, exported) {
            Ok(alias) => file.aliases.push(alias),
            Err(err) => {
                tracing::debug!("Skipping declaration '{}': {}", name, err);
                file.skipped.push(SkippedAlias {
                    name: name.to_string(),
                    reason: err.to_string(),
                    span: converter.span(statement),
                });
            }
        }
    }

    Ok(file)
}

/// Parses a standalone type expression.
///
/// # Errors
/// Returns `ParseError` if the text is not a single supported type.
pub fn parse_type(source: &str) -> Result<TypeNode, ParseError> {
    let text = format!("{}{}", TYPE_PREFIX, source);
    let tree = syntax_tree(&text)?;
    let converter = Converter {
        text: &text,
        base: TYPE_PREFIX.len(),
    };

    converter.check(tree.root_node())?;
    let statements = named_children(tree.root_node());
    let value = match statements.as_slice() {
        [statement] if statement.kind() == "type_alias_declaration" => {
            statement.child_by_field_name("value")
        }
        _ => None,
    };
    match value {
        Some(value) => converter.convert(value),
        None => Err(ParseError::unsupported(0, "type expression")),
    }
}

/// Parses `text` into a syntax tree.
fn syntax_tree(text: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        .map_err(|err| ParseError::language(err.to_string()))?;
    parser.parse(text, None).ok_or(ParseError::NoTree)
}

/// Returns the non-comment named children of `node`.
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// Returns true if `node` has an anonymous child token `token`.
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token)
}

/// Finds the alias or interface declared by a top-level statement.
fn declaration_of(statement: Node<'_>, exported: bool) -> Option<(Node<'_>, bool)> {
    match statement.kind() {
        "type_alias_declaration" | "interface_declaration" => Some((statement, exported)),
        "export_statement" => statement
            .child_by_field_name("declaration")
            .and_then(|declaration| declaration_of(declaration, true)),
        "ambient_declaration" => named_children(statement)
            .into_iter()
            .find_map(|child| declaration_of(child, exported)),
        _ => None,
    }
}

/// Returns the first error or missing node below `node`.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Strips the quotes of a string literal and resolves simple escapes.
fn unquote(literal: &str) -> String {
    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}

/// Converts syntax nodes into [`TypeNode`]s.
///
/// Spans are reported relative to `base`.
struct Converter<'s> {
    text: &'s str,
    base: usize,
}

impl<'s> Converter<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        self.text.get(node.byte_range()).unwrap_or_default()
    }

    fn span(&self, node: Node<'_>) -> Span {
        Span::new(
            node.start_byte().saturating_sub(self.base),
            node.end_byte().saturating_sub(self.base),
        )
    }

    fn offset(&self, node: Node<'_>) -> usize {
        node.start_byte().saturating_sub(self.base)
    }

    fn unsupported(&self, node: Node<'_>) -> ParseError {
        ParseError::unsupported(self.offset(node), node.kind())
    }

    /// Fails on the first syntax error inside `node`.
    fn check(&self, node: Node<'_>) -> Result<(), ParseError> {
        match first_error(node) {
            Some(error) => Err(ParseError::syntax(self.offset(error), self.text(error))),
            None => Ok(()),
        }
    }

    fn field<'t>(&self, node: Node<'t>, field: &str) -> Result<Node<'t>, ParseError> {
        node.child_by_field_name(field)
            .ok_or_else(|| self.unsupported(node))
    }

    fn first_named<'t>(&self, node: Node<'t>) -> Result<Node<'t>, ParseError> {
        named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.unsupported(node))
    }

    /// Converts a type annotation (`: T`, `?: T`, ...) to its type.
    fn annotated(&self, node: Node<'_>) -> Result<TypeNode, ParseError> {
        if node.kind().ends_with("type_annotation") {
            self.convert(self.first_named(node)?)
        } else {
            self.convert(node)
        }
    }

    fn alias(
        &self,
        statement: Node<'_>,
        declaration: Node<'_>,
        name: &str,
        exported: bool,
    ) -> Result<TypeAlias, ParseError> {
        self.check(statement)?;
        let generic = declaration.child_by_field_name("type_parameters").is_some();

        let ty = if declaration.kind() == "interface_declaration" {
            let heritage = named_children(declaration)
                .into_iter()
                .find(|child| child.kind().starts_with("extends"));
            if let Some(heritage) = heritage {
                return Err(self.unsupported(heritage));
            }
            self.convert(self.field(declaration, "body")?)?
        } else {
            self.convert(self.field(declaration, "value")?)?
        };

        Ok(TypeAlias {
            name: name.to_string(),
            exported,
            generic,
            ty,
            span: self.span(statement),
        })
    }

    fn convert(&self, node: Node<'_>) -> Result<TypeNode, ParseError> {
        let kind = match node.kind() {
            "object_type" | "interface_body" => TypeKind::Object(self.members(node)?),
            "tuple_type" => TypeKind::Tuple(self.tuple_elements(node)?),
            "array_type" => TypeKind::Array(Box::new(self.convert(self.first_named(node)?)?)),
            "lookup_type" => {
                let children = named_children(node);
                let [object, index] = children.as_slice() else {
                    return Err(self.unsupported(node));
                };
                TypeKind::IndexedAccess {
                    object: Box::new(self.convert(*object)?),
                    index: Box::new(self.convert(*index)?),
                }
            }
            "union_type" => TypeKind::Union(self.flatten_binary(node, "union_type")?),
            "intersection_type" => {
                TypeKind::Intersection(self.flatten_binary(node, "intersection_type")?)
            }
            "parenthesized_type" => {
                TypeKind::Paren(Box::new(self.convert(self.first_named(node)?)?))
            }
            "predefined_type" => match Keyword::from_ident(self.text(node)) {
                Some(keyword) => TypeKind::Keyword(keyword),
                None => return Err(self.unsupported(node)),
            },
            "literal_type" => TypeKind::Literal(self.literal(self.first_named(node)?)?),
            "string" | "number" | "true" | "false" | "null" | "undefined" => {
                TypeKind::Literal(self.literal(node)?)
            }
            "type_identifier" | "identifier" => {
                let name = self.text(node);
                match (name, Keyword::from_ident(name)) {
                    ("undefined", _) => TypeKind::Literal(Literal::Undefined),
                    (_, Some(keyword)) => TypeKind::Keyword(keyword),
                    _ => TypeKind::Reference {
                        name: name.to_string(),
                        args: Vec::new(),
                    },
                }
            }
            "nested_type_identifier" | "this_type" => TypeKind::Reference {
                name: self.qualified_name(node),
                args: Vec::new(),
            },
            "generic_type" => {
                let name = self.qualified_name(self.field(node, "name")?);
                let args = match node.child_by_field_name("type_arguments") {
                    Some(arguments) => named_children(arguments)
                        .into_iter()
                        .map(|argument| self.convert(argument))
                        .collect::<Result<_, _>>()?,
                    None => Vec::new(),
                };
                TypeKind::Reference { name, args }
            }
            "index_type_query" => self.operator("keyof", self.first_named(node)?)?,
            "readonly_type" => self.operator("readonly", self.first_named(node)?)?,
            "type_query" => TypeKind::Operator {
                operator: "typeof".to_string(),
                operand: Box::new(self.reference(self.first_named(node)?)),
            },
            "infer_type" => TypeKind::Operator {
                operator: "infer".to_string(),
                operand: Box::new(self.reference(self.first_named(node)?)),
            },
            "conditional_type" => TypeKind::Conditional {
                check: Box::new(self.convert(self.field(node, "left")?)?),
                extends: Box::new(self.convert(self.field(node, "right")?)?),
                then: Box::new(self.convert(self.field(node, "consequence")?)?),
                otherwise: Box::new(self.convert(self.field(node, "alternative")?)?),
            },
            _ => return Err(self.unsupported(node)),
        };
        Ok(TypeNode::new(kind, self.span(node)))
    }

    /// Collects the operands of a left-nested binary type chain.
    fn flatten_binary(&self, node: Node<'_>, kind: &str) -> Result<Vec<TypeNode>, ParseError> {
        let mut operands = Vec::new();
        for child in named_children(node) {
            if child.kind() == kind {
                operands.extend(self.flatten_binary(child, kind)?);
            } else {
                operands.push(self.convert(child)?);
            }
        }
        Ok(operands)
    }

    fn operator(&self, operator: &str, operand: Node<'_>) -> Result<TypeKind, ParseError> {
        Ok(TypeKind::Operator {
            operator: operator.to_string(),
            operand: Box::new(self.convert(operand)?),
        })
    }

    fn qualified_name(&self, node: Node<'_>) -> String {
        self.text(node).split_whitespace().collect()
    }

    fn reference(&self, node: Node<'_>) -> TypeNode {
        TypeNode::new(
            TypeKind::Reference {
                name: self.qualified_name(node),
                args: Vec::new(),
            },
            self.span(node),
        )
    }

    fn literal(&self, node: Node<'_>) -> Result<Literal, ParseError> {
        let text = self.text(node);
        Ok(match node.kind() {
            "string" => Literal::String(unquote(text)),
            "number" => Literal::Number(text.to_string()),
            "unary_expression" => Literal::Number(text.split_whitespace().collect()),
            "true" => Literal::Bool(true),
            "false" => Literal::Bool(false),
            "null" => Literal::Null,
            "undefined" => Literal::Undefined,
            _ => return Err(self.unsupported(node)),
        })
    }

    fn members(&self, node: Node<'_>) -> Result<Vec<Member>, ParseError> {
        named_children(node)
            .into_iter()
            .map(|member| -> Result<Member, ParseError> {
                let kind = match member.kind() {
                    "property_signature" => self.property(member)?,
                    "index_signature" => self.index_signature(member)?,
                    _ => return Err(self.unsupported(member)),
                };
                Ok(Member {
                    kind,
                    span: self.span(member),
                })
            })
            .collect()
    }

    fn property(&self, node: Node<'_>) -> Result<MemberKind, ParseError> {
        let name = self.field(node, "name")?;
        let key = match name.kind() {
            "string" => unquote(self.text(name)),
            "property_identifier" | "private_property_identifier" | "number" => {
                self.text(name).to_string()
            }
            _ => return Err(self.unsupported(name)),
        };
        Ok(MemberKind::Property {
            key,
            optional: has_token(node, "?"),
            readonly: has_token(node, "readonly"),
            ty: self.annotated(self.field(node, "type")?)?,
        })
    }

    fn index_signature(&self, node: Node<'_>) -> Result<MemberKind, ParseError> {
        let value = self.annotated(self.field(node, "type")?)?;
        let clause = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "mapped_type_clause");

        match clause {
            Some(clause) => Ok(MemberKind::Mapped {
                param: self.text(self.field(clause, "name")?).to_string(),
                constraint: self.convert(self.field(clause, "type")?)?,
                value,
            }),
            None => Ok(MemberKind::Index {
                param: self.text(self.field(node, "name")?).to_string(),
                key: self.convert(self.field(node, "index_type")?)?,
                value,
            }),
        }
    }

    fn tuple_elements(&self, node: Node<'_>) -> Result<Vec<TupleElement>, ParseError> {
        named_children(node)
            .into_iter()
            .map(|element| -> Result<TupleElement, ParseError> {
                match element.kind() {
                    "required_parameter" | "optional_parameter" => {
                        let label = element
                            .child_by_field_name("name")
                            .or_else(|| element.child_by_field_name("pattern"))
                            .ok_or_else(|| self.unsupported(element))?;
                        let rest = label.kind() == "rest_pattern";
                        let label = if rest { self.first_named(label)? } else { label };
                        Ok(TupleElement {
                            label: Some(self.text(label).to_string()),
                            ty: self.annotated(self.field(element, "type")?)?,
                            optional: element.kind() == "optional_parameter",
                            rest,
                        })
                    }
                    "optional_type" | "rest_type" => Ok(TupleElement {
                        label: None,
                        ty: self.convert(self.first_named(element)?)?,
                        optional: element.kind() == "optional_type",
                        rest: element.kind() == "rest_type",
                    }),
                    _ => Ok(TupleElement {
                        label: None,
                        ty: self.convert(element)?,
                        optional: false,
                        rest: false,
                    }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED_TYPES: &str = r#"export type Json =
  | string
  | number
  | boolean
  | null
  | { [key: string]: Json | undefined }
  | Json[]

export type Database = {
  public: {
    Tables: {
      users: {
        Row: {
          id: number
          status: Database["public"]["Enums"]["status"] | null
        }
        Insert: {
          id?: number
          status?: Database["public"]["Enums"]["status"] | null
        }
        Relationships: []
      }
    }
    Views: {
      [_ in never]: never
    }
    Enums: {
      status: "active" | "inactive"
    }
  }
}

type DefaultSchema = Database[Extract<keyof Database, "public">]

export type Tables<
  DefaultSchemaTableNameOrOptions extends
    | keyof DefaultSchema["Tables"]
    | { schema: keyof Database },
> = DefaultSchemaTableNameOrOptions extends { schema: keyof Database }
  ? Database[DefaultSchemaTableNameOrOptions["schema"]]["Tables"]
  : never

export const Constants = {
  public: {
    Enums: {
      status: ["active", "inactive"],
    },
  },
} as const
"#;

    #[test]
    fn test_parse_generated_file() {
        let file = parse_source(GENERATED_TYPES).expect("Failed to parse source");

        let names: Vec<&str> = file.aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Json", "Database", "DefaultSchema", "Tables"]);

        let database = file.alias("Database").expect("Database alias");
        assert!(database.exported);
        assert!(!database.generic);
        assert!(database.ty.is_object());
        assert!(file.alias("Tables").expect("Tables alias").generic);
        assert!(!file.alias("DefaultSchema").expect("DefaultSchema alias").exported);
    }

    #[test]
    fn test_parse_nested_properties() {
        let file = parse_source(GENERATED_TYPES).expect("Failed to parse source");
        let database = &file.alias("Database").expect("Database alias").ty;

        let users = database
            .property("public")
            .and_then(|s| s.property("Tables"))
            .and_then(|t| t.property("users"))
            .expect("users table");
        let keys: Vec<&str> = users.properties().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Row", "Insert", "Relationships"]);

        let relationships = users.property("Relationships").expect("relationships");
        assert!(relationships.is_tuple());
        assert_eq!(file.slice(relationships.span), "[]");
    }

    #[test]
    fn test_optional_and_quoted_keys() {
        let ty = parse_type(r#"{ id?: number; "billing-plan": string; readonly name: string }"#)
            .expect("Failed to parse");
        let members = ty.as_object().expect("object");
        let MemberKind::Property { key, optional, .. } = &members[0].kind else {
            panic!("expected property");
        };
        assert_eq!(key, "id");
        assert!(*optional);
        assert!(ty.property("billing-plan").is_some());
        assert!(matches!(
            members[2].kind,
            MemberKind::Property { readonly: true, .. }
        ));
    }

    #[test]
    fn test_parse_indexed_access_path() {
        let ty = parse_type(r#"Database['public']["Enums"]["status"] | null"#)
            .expect("Failed to parse type");
        let TypeKind::Union(variants) = &ty.kind else {
            panic!("expected union, got {:?}", ty.kind);
        };
        let (root, path) = variants[0].access_path().expect("access path");
        assert_eq!(root, "Database");
        assert_eq!(path, vec!["public", "Enums", "status"]);
    }

    #[test]
    fn test_parse_mapped_and_index_members() {
        let ty = parse_type("{ [_ in never]: never }").expect("Failed to parse");
        let members = ty.as_object().expect("object");
        assert!(matches!(members[0].kind, MemberKind::Mapped { .. }));

        let ty = parse_type("{ [key: number]: unknown }").expect("Failed to parse");
        let members = ty.as_object().expect("object");
        assert!(matches!(members[0].kind, MemberKind::Index { .. }));
    }

    #[test]
    fn test_parse_literal_union() {
        let ty = parse_type(r#"| "a" | 'b' | -1 | true"#).expect("Failed to parse");
        assert!(ty.is_literal_union());
        let TypeKind::Union(variants) = &ty.kind else {
            panic!("expected union");
        };
        assert_eq!(variants.len(), 4);
        assert_eq!(variants[1].as_string_literal(), Some("b"));
    }

    #[test]
    fn test_parse_tuple_elements() {
        let ty = parse_type("[first: string, second?: number, ...rest: boolean[]]")
            .expect("Failed to parse");
        let TypeKind::Tuple(elements) = &ty.kind else {
            panic!("expected tuple");
        };
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].label.as_deref(), Some("first"));
        assert!(elements[1].optional);
        assert!(elements[2].rest);
    }

    #[test]
    fn test_parse_merge_deep_root() {
        let source = r#"
import type { MergeDeep } from "type-fest"
import type { Database as DatabaseGenerated } from "./generated"

export type Database = MergeDeep<
  DatabaseGenerated,
  {
    public: {
      Views: {}
    }
  }
>
"#;
        let file = parse_source(source).expect("Failed to parse source");
        let database = file.alias("Database").expect("Database alias");
        let (name, args) = database.ty.as_reference().expect("reference");
        assert_eq!(name, "MergeDeep");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_spans_cover_source_text() {
        let source = "type A = {\n  id: number\n  tags: string[]\n}";
        let file = parse_source(source).expect("Failed to parse source");
        let alias = &file.aliases[0];
        let tags = alias.ty.property("tags").expect("tags");
        assert_eq!(file.slice(tags.span), "string[]");
        assert_eq!(file.slice(alias.ty.span), &source[9..]);
    }

    #[test]
    fn test_standalone_type_spans_are_relative() {
        let ty = parse_type("{ a: string[] }").expect("Failed to parse");
        assert_eq!(ty.span, Span::new(0, 15));
        assert_eq!(ty.property("a").expect("a").span, Span::new(5, 13));
    }

    #[test]
    fn test_unsupported_alias_is_skipped() {
        let source = "type Fn = (a: string) => void\ntype Ok = string";
        let file = parse_source(source).expect("Failed to parse source");
        assert_eq!(file.aliases.len(), 1);
        assert_eq!(file.skipped.len(), 1);
        assert_eq!(file.skipped[0].name, "Fn");
        assert_eq!(file.slice(file.skipped[0].span), "type Fn = (a: string) => void");
    }

    #[test]
    fn test_interface_declaration() {
        let file = parse_source("export interface Row { id: number; name?: string }")
            .expect("Failed to parse source");
        let row = file.alias("Row").expect("Row");
        assert!(row.exported);
        assert_eq!(row.ty.properties().count(), 2);
    }

    #[test]
    fn test_unrelated_statements_do_not_abort() {
        let source = "export const label = `a${`b${c}`}`\ntype Ok = { id: number }\n";
        let file = parse_source(source).expect("Failed to parse source");
        assert!(file.alias("Ok").is_some());
    }

    #[test]
    fn test_invalid_type_is_an_error() {
        assert!(parse_type("{ a: }").is_err());
        assert!(parse_type("string; number").is_err());
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r#""a\"b""#), "a\"b");
        assert_eq!(unquote("'it\\'s'"), "it's");
    }
}
