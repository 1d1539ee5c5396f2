//! Syntax tree definitions.
//!
//! This module contains the data structures representing the TypeScript
//! type-declaration subset emitted by database introspection tooling:
//! type aliases, object literals, tuples, unions, indexed accesses and
//! references.

use std::ops::Range;

/// Byte range of a syntax element within its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns a span covering both `self` and `other`.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the span as a byte range.
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns true if `other` lies entirely inside this span.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Returns true if `c` may appear in an identifier after its first character.
#[must_use]
pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original source text; every span indexes into it.
    pub text: String,
    /// Type aliases in declaration order.
    pub aliases: Vec<TypeAlias>,
    /// Aliases whose right-hand side could not be parsed.
    pub skipped: Vec<SkippedAlias>,
}

impl SourceFile {
    /// Looks up a type alias by name.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&TypeAlias> {
        self.aliases.iter().find(|alias| alias.name == name)
    }

    /// Returns the source text covered by `span`.
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        self.text.get(span.range()).unwrap_or("")
    }
}

/// A `type Name<...> = Type` declaration.
#[derive(Debug, Clone)]
pub struct TypeAlias {
    /// Alias name.
    pub name: String,
    /// Whether the alias is exported.
    pub exported: bool,
    /// Whether the alias declares type parameters.
    pub generic: bool,
    /// Right-hand side type.
    pub ty: TypeNode,
    /// Span of the whole statement.
    pub span: Span,
}

/// A declaration the parser recognised but could not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAlias {
    /// Declared name.
    pub name: String,
    /// Parse error message.
    pub reason: String,
    /// Span of the whole statement.
    pub span: Span,
}

/// A type expression together with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    /// Node kind.
    pub kind: TypeKind,
    /// Source span.
    pub span: Span,
}

/// Built-in keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `bigint`
    Bigint,
    /// `symbol`
    Symbol,
    /// `object`
    Object,
    /// `unknown`
    Unknown,
    /// `any`
    Any,
    /// `never`
    Never,
    /// `void`
    Void,
}

impl Keyword {
    /// Parses a keyword type from its identifier.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "bigint" => Some(Self::Bigint),
            "symbol" => Some(Self::Symbol),
            "object" => Some(Self::Object),
            "unknown" => Some(Self::Unknown),
            "any" => Some(Self::Any),
            "never" => Some(Self::Never),
            "void" => Some(Self::Void),
            _ => None,
        }
    }

    /// Returns the TypeScript spelling of the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Bigint => "bigint",
            Self::Symbol => "symbol",
            Self::Object => "object",
            Self::Unknown => "unknown",
            Self::Any => "any",
            Self::Never => "never",
            Self::Void => "void",
        }
    }
}

/// Literal types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// String literal (unescaped value).
    String(String),
    /// Numeric literal, kept as written.
    Number(String),
    /// `true` / `false`.
    Bool(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
}

/// Type expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Keyword type such as `string`.
    Keyword(Keyword),
    /// Literal type.
    Literal(Literal),
    /// Named reference, optionally qualified and with type arguments.
    Reference {
        /// Dotted name.
        name: String,
        /// Type arguments.
        args: Vec<TypeNode>,
    },
    /// Object literal `{ ... }`.
    Object(Vec<Member>),
    /// Tuple literal `[A, B]`.
    Tuple(Vec<TupleElement>),
    /// Array type `T[]`.
    Array(Box<TypeNode>),
    /// Indexed access `T[K]`.
    IndexedAccess {
        /// Indexed type.
        object: Box<TypeNode>,
        /// Index type.
        index: Box<TypeNode>,
    },
    /// Union `A | B`.
    Union(Vec<TypeNode>),
    /// Intersection `A & B`.
    Intersection(Vec<TypeNode>),
    /// Parenthesized type.
    Paren(Box<TypeNode>),
    /// Prefix operator (`keyof`, `typeof`, `readonly`, `unique`, `infer`).
    Operator {
        /// Operator keyword.
        operator: String,
        /// Operand.
        operand: Box<TypeNode>,
    },
    /// Conditional type `C extends E ? T : F`.
    Conditional {
        /// Checked type.
        check: Box<TypeNode>,
        /// Constraint.
        extends: Box<TypeNode>,
        /// True branch.
        then: Box<TypeNode>,
        /// False branch.
        otherwise: Box<TypeNode>,
    },
}

/// Tuple element.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    /// Optional label (`name: T`).
    pub label: Option<String>,
    /// Element type.
    pub ty: TypeNode,
    /// Whether the element is optional.
    pub optional: bool,
    /// Whether the element is a rest element.
    pub rest: bool,
}

/// Object literal member.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Member kind.
    pub kind: MemberKind,
    /// Span of the whole member.
    pub span: Span,
}

/// Object literal member variants.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    /// Named property `key?: T`.
    Property {
        /// Property key, unquoted.
        key: String,
        /// Whether the property is optional.
        optional: bool,
        /// Whether the property is readonly.
        readonly: bool,
        /// Property type.
        ty: TypeNode,
    },
    /// Index signature `[key: K]: V`.
    Index {
        /// Parameter name.
        param: String,
        /// Key type.
        key: TypeNode,
        /// Value type.
        value: TypeNode,
    },
    /// Mapped type `[P in K]: V`.
    Mapped {
        /// Type parameter name.
        param: String,
        /// Constraint type.
        constraint: TypeNode,
        /// Value type.
        value: TypeNode,
    },
}

impl TypeNode {
    /// Creates a new node.
    #[must_use]
    pub const fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the node with parentheses removed.
    #[must_use]
    pub fn unparen(&self) -> &Self {
        match &self.kind {
            TypeKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    /// Returns the members if this is an object literal.
    #[must_use]
    pub fn as_object(&self) -> Option<&[Member]> {
        match &self.unparen().kind {
            TypeKind::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Returns true if this is an object literal.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.as_object().is_some()
    }

    /// Returns true if this is a tuple literal.
    #[must_use]
    pub fn is_tuple(&self) -> bool {
        matches!(self.unparen().kind, TypeKind::Tuple(_))
    }

    /// Returns true if this is the keyword type `kw`.
    #[must_use]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self.unparen().kind, TypeKind::Keyword(k) if k == kw)
    }

    /// Returns true if this is a literal type.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self.unparen().kind, TypeKind::Literal(_))
    }

    /// Returns true if this is a literal or a union made only of literals.
    #[must_use]
    pub fn is_literal_union(&self) -> bool {
        match &self.unparen().kind {
            TypeKind::Literal(_) => true,
            TypeKind::Union(variants) => variants.iter().all(Self::is_literal),
            _ => false,
        }
    }

    /// Returns the reference name and arguments if this is a reference.
    #[must_use]
    pub fn as_reference(&self) -> Option<(&str, &[TypeNode])> {
        match &self.unparen().kind {
            TypeKind::Reference { name, args } => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }

    /// Returns the string value if this is a string literal.
    #[must_use]
    pub fn as_string_literal(&self) -> Option<&str> {
        match &self.unparen().kind {
            TypeKind::Literal(Literal::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Looks up a named property of an object literal.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&TypeNode> {
        self.properties().find(|(k, _)| *k == key).map(|(_, ty)| ty)
    }

    /// Iterates the named properties of an object literal, in source order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &TypeNode)> {
        self.as_object()
            .unwrap_or(&[])
            .iter()
            .filter_map(|member| match &member.kind {
                MemberKind::Property { key, ty, .. } => Some((key.as_str(), ty)),
                _ => None,
            })
    }

    /// Resolves an indexed-access chain rooted at a plain reference.
    ///
    /// `Database["public"]["Enums"]["status"]` yields
    /// `("Database", ["public", "Enums", "status"])`. Chains with a
    /// non-string-literal index yield `None`.
    #[must_use]
    pub fn access_path(&self) -> Option<(&str, Vec<&str>)> {
        match &self.unparen().kind {
            TypeKind::Reference { name, args } if args.is_empty() => {
                Some((name.as_str(), Vec::new()))
            }
            TypeKind::IndexedAccess { object, index } => {
                let key = index.as_string_literal()?;
                let (root, mut path) = object.access_path()?;
                path.push(key);
                Some((root, path))
            }
            _ => None,
        }
    }

    /// Calls `visit` for this node and every nested type node, pre-order.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TypeNode)) {
        visit(self);
        match &self.kind {
            TypeKind::Keyword(_) | TypeKind::Literal(_) => {}
            TypeKind::Reference { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            TypeKind::Object(members) => {
                for member in members {
                    match &member.kind {
                        MemberKind::Property { ty, .. } => ty.walk(visit),
                        MemberKind::Index { key, value, .. } => {
                            key.walk(visit);
                            value.walk(visit);
                        }
                        MemberKind::Mapped {
                            constraint, value, ..
                        } => {
                            constraint.walk(visit);
                            value.walk(visit);
                        }
                    }
                }
            }
            TypeKind::Tuple(elements) => {
                for element in elements {
                    element.ty.walk(visit);
                }
            }
            TypeKind::Array(inner) | TypeKind::Paren(inner) => inner.walk(visit),
            TypeKind::Operator { operand, .. } => operand.walk(visit),
            TypeKind::IndexedAccess { object, index } => {
                object.walk(visit);
                index.walk(visit);
            }
            TypeKind::Union(variants) | TypeKind::Intersection(variants) => {
                for variant in variants {
                    variant.walk(visit);
                }
            }
            TypeKind::Conditional {
                check,
                extends,
                then,
                otherwise,
            } => {
                check.walk(visit);
                extends.walk(visit);
                then.walk(visit);
                otherwise.walk(visit);
            }
        }
    }
}
