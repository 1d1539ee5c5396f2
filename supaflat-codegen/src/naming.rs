//! Name templates and identifier derivation.
//!
//! Every flattened declaration name and every validator variable name is
//! produced from a template such as `{schema}{table}{operation}`. Two
//! template families exist: declaration names and validator names.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use supaflat_schema::DeclarationCategory;
use supaflat_schema::is_ident_continue;

/// Suffix appended to validator variable names.
pub const SCHEMA_SUFFIX: &str = "Schema";

/// Suffix appended to validator variable names in separator-preserving mode.
pub const SNAKE_SCHEMA_SUFFIX: &str = "_schema";

/// Validator name returned for an empty input in separator-preserving mode.
pub const EMPTY_SCHEMA_NAME: &str = "unnamed_schema";

/// Validator name returned for an empty input in the default mode.
pub const EMPTY_CAMEL_SCHEMA_NAME: &str = "unnamedSchema";

/// Placeholder role that follows `capitalize_schema`.
const SCHEMA_PLACEHOLDER: &str = "schema";

/// Naming configuration.
///
/// Unset fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct NamingConfig {
    /// Declaration template for table and view operations.
    pub table_operation_pattern: String,
    /// Declaration template for enums.
    pub enum_pattern: String,
    /// Declaration template for composite types.
    pub composite_type_pattern: String,
    /// Declaration template for function arguments.
    pub function_args_pattern: String,
    /// Declaration template for function return types.
    pub function_returns_pattern: String,
    /// Validator template for table and view operations.
    pub table_schema_pattern: String,
    /// Validator template for enums.
    pub enum_schema_pattern: String,
    /// Validator template for composite types.
    pub composite_type_schema_pattern: String,
    /// Validator template for function arguments.
    pub function_args_schema_pattern: String,
    /// Validator template for function return types.
    pub function_returns_schema_pattern: String,
    /// Capitalize the `{schema}` placeholder.
    pub capitalize_schema: bool,
    /// Capitalize every other placeholder.
    pub capitalize_names: bool,
    /// Joins underscore-separated words of uncapitalized placeholder values.
    pub separator: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            table_operation_pattern: "{schema}{table}{operation}".to_string(),
            enum_pattern: "{schema}{name}".to_string(),
            composite_type_pattern: "{schema}{name}".to_string(),
            function_args_pattern: "{schema}{function}Args".to_string(),
            function_returns_pattern: "{schema}{function}Returns".to_string(),
            table_schema_pattern: "{schema}{table}{operation}".to_string(),
            enum_schema_pattern: "{schema}{name}".to_string(),
            composite_type_schema_pattern: "{schema}{name}".to_string(),
            function_args_schema_pattern: "{schema}{function}Args".to_string(),
            function_returns_schema_pattern: "{schema}{function}Returns".to_string(),
            capitalize_schema: true,
            capitalize_names: true,
            separator: "_".to_string(),
        }
    }
}

impl NamingConfig {
    /// Returns the declaration template for `category`.
    #[must_use]
    pub fn type_pattern(&self, category: DeclarationCategory) -> &str {
        match category {
            DeclarationCategory::TableOperation => &self.table_operation_pattern,
            DeclarationCategory::Enum => &self.enum_pattern,
            DeclarationCategory::CompositeType => &self.composite_type_pattern,
            DeclarationCategory::FunctionArgs => &self.function_args_pattern,
            DeclarationCategory::FunctionReturns => &self.function_returns_pattern,
        }
    }

    /// Returns the validator template for `category`.
    #[must_use]
    pub fn schema_pattern(&self, category: DeclarationCategory) -> &str {
        match category {
            DeclarationCategory::TableOperation => &self.table_schema_pattern,
            DeclarationCategory::Enum => &self.enum_schema_pattern,
            DeclarationCategory::CompositeType => &self.composite_type_schema_pattern,
            DeclarationCategory::FunctionArgs => &self.function_args_schema_pattern,
            DeclarationCategory::FunctionReturns => &self.function_returns_schema_pattern,
        }
    }

    /// Derives the declaration name for an entity.
    #[must_use]
    pub fn declaration_name(
        &self,
        category: DeclarationCategory,
        placeholders: &[(&str, &str)],
    ) -> String {
        sanitize_identifier(&format_name(
            self.type_pattern(category),
            placeholders,
            self,
        ))
    }

    /// Derives the configured validator name for an entity.
    ///
    /// `preserve_separators` selects the underscore-delimited form used for
    /// entities whose names are not valid identifiers.
    #[must_use]
    pub fn validator_name(
        &self,
        category: DeclarationCategory,
        placeholders: &[(&str, &str)],
        preserve_separators: bool,
    ) -> String {
        let formatted = format_name(self.schema_pattern(category), placeholders, self);
        to_schema_variable_name(&formatted, preserve_separators)
    }

    /// Validates every template and the separator.
    ///
    /// # Errors
    /// Returns `ConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("tableOperationPattern", DeclarationCategory::TableOperation, &self.table_operation_pattern),
            ("enumPattern", DeclarationCategory::Enum, &self.enum_pattern),
            ("compositeTypePattern", DeclarationCategory::CompositeType, &self.composite_type_pattern),
            ("functionArgsPattern", DeclarationCategory::FunctionArgs, &self.function_args_pattern),
            ("functionReturnsPattern", DeclarationCategory::FunctionReturns, &self.function_returns_pattern),
            ("tableSchemaPattern", DeclarationCategory::TableOperation, &self.table_schema_pattern),
            ("enumSchemaPattern", DeclarationCategory::Enum, &self.enum_schema_pattern),
            ("compositeTypeSchemaPattern", DeclarationCategory::CompositeType, &self.composite_type_schema_pattern),
            ("functionArgsSchemaPattern", DeclarationCategory::FunctionArgs, &self.function_args_schema_pattern),
            ("functionReturnsSchemaPattern", DeclarationCategory::FunctionReturns, &self.function_returns_schema_pattern),
        ];
        for (field, category, template) in fields {
            validate_template(field, category, template)?;
        }

        if self.function_args_pattern == self.function_returns_pattern {
            return Err(ConfigError::DuplicateTemplate {
                first: "functionArgsPattern",
                second: "functionReturnsPattern",
                template: self.function_args_pattern.clone(),
            });
        }
        if self.function_args_schema_pattern == self.function_returns_schema_pattern {
            return Err(ConfigError::DuplicateTemplate {
                first: "functionArgsSchemaPattern",
                second: "functionReturnsSchemaPattern",
                template: self.function_args_schema_pattern.clone(),
            });
        }

        if !self.separator.chars().all(is_ident_continue) {
            return Err(ConfigError::InvalidSeparator {
                separator: self.separator.clone(),
            });
        }

        Ok(())
    }
}

/// Checks one template against the placeholders of its category.
fn validate_template(
    field: &'static str,
    category: DeclarationCategory,
    template: &str,
) -> Result<(), ConfigError> {
    if template.trim().is_empty() {
        return Err(ConfigError::template(field, template, "template is empty"));
    }

    let keys = placeholder_keys(template)
        .map_err(|reason| ConfigError::template(field, template, reason))?;
    let allowed = category.placeholders();

    if let Some(unknown) = keys.iter().find(|key| !allowed.contains(*key)) {
        return Err(ConfigError::template(
            field,
            template,
            format!(
                "unknown placeholder '{{{}}}', expected one of {}",
                unknown,
                allowed
                    .iter()
                    .map(|key| format!("{{{}}}", key))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }

    for required in allowed.iter().filter(|key| **key != SCHEMA_PLACEHOLDER) {
        if !keys.contains(required) {
            return Err(ConfigError::template(
                field,
                template,
                format!("missing placeholder '{{{}}}'", required),
            ));
        }
    }

    Ok(())
}

/// Extracts the placeholder keys of a template, checking brace balance.
fn placeholder_keys(template: &str) -> Result<Vec<&str>, String> {
    let mut keys = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err("unbalanced '}'".to_string());
        }
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| "unclosed '{'".to_string())?;
        let key = &after[..close];
        if key.contains('{') {
            return Err("nested '{'".to_string());
        }
        if key.is_empty() {
            return Err("empty placeholder '{}'".to_string());
        }
        keys.push(key);
        rest = &after[close + 1..];
    }

    Ok(keys)
}

/// Substitutes placeholders of `template` with values from `placeholders`.
///
/// Each value is capitalized when the flag for its role is enabled: the
/// `schema` placeholder follows `capitalize_schema`, every other placeholder
/// follows `capitalize_names`. Placeholders without a value stay as written.
#[must_use]
pub fn format_name(template: &str, placeholders: &[(&str, &str)], config: &NamingConfig) -> String {
    let mut output = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };

        let key = &after[..close];
        match placeholders.iter().find(|(name, _)| *name == key) {
            Some((name, value)) => {
                let capitalize = if *name == SCHEMA_PLACEHOLDER {
                    config.capitalize_schema
                } else {
                    config.capitalize_names
                };
                if capitalize {
                    output.push_str(&capitalize_words(value));
                } else {
                    output.push_str(&join_words(value, &config.separator));
                }
            }
            None => {
                output.push('{');
                output.push_str(key);
                output.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    output.push_str(rest);

    output
}

/// Capitalizes each underscore-separated word and joins them.
///
/// Without underscores only the first character is capitalized:
/// `user_profile` becomes `UserProfile`, `userProfile` becomes `UserProfile`.
#[must_use]
pub fn capitalize_words(value: &str) -> String {
    if !value.contains('_') {
        return capitalize_first(value);
    }
    value.split('_').map(capitalize_first).collect()
}

/// Uppercases the first character of `value`.
#[must_use]
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowercase_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_words(value: &str, separator: &str) -> String {
    value.split('_').collect::<Vec<_>>().join(separator)
}

/// Replaces characters that cannot appear in an identifier with `_`.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    let mut output: String = name
        .chars()
        .map(|c| if is_ident_continue(c) { c } else { '_' })
        .collect();
    if output.is_empty() || output.starts_with(|c: char| c.is_ascii_digit()) {
        output.insert(0, '_');
    }
    output
}

/// Returns true if `name` contains characters that are not valid in identifiers.
#[must_use]
pub fn has_non_identifier_chars(name: &str) -> bool {
    !name.chars().all(is_ident_continue)
}

/// Derives a validator variable name from a declaration name.
///
/// The default mode produces lower camel case with a `Schema` suffix:
/// `PublicUsersRow` becomes `publicUsersRowSchema`. With
/// `preserve_separators` the result is lowercase and underscore-delimited:
/// `Public-Users.Row` becomes `public_users_row_schema`. The suffix is never
/// appended twice.
#[must_use]
pub fn to_schema_variable_name(name: &str, preserve_separators: bool) -> String {
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    if preserve_separators {
        if words.is_empty() {
            return EMPTY_SCHEMA_NAME.to_string();
        }
        let joined = words
            .iter()
            .map(|word| word.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        if joined.ends_with(SNAKE_SCHEMA_SUFFIX) {
            return joined;
        }
        return format!("{}{}", joined, SNAKE_SCHEMA_SUFFIX);
    }

    if words.is_empty() {
        return EMPTY_CAMEL_SCHEMA_NAME.to_string();
    }
    let mut camel = lowercase_first(words[0]);
    for word in &words[1..] {
        camel.push_str(&capitalize_first(word));
    }
    if camel.ends_with(SCHEMA_SUFFIX) {
        return camel;
    }
    camel.push_str(SCHEMA_SUFFIX);
    camel
}

/// Converts a name to PascalCase, dropping `_` and `-` separators.
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
