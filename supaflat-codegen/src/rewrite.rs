//! Cross-reference rewriting.
//!
//! Flattened bodies still refer to each other through nested lookups such
//! as `Database["public"]["Enums"]["status"]`. The rewriter replaces those
//! paths, and several older spellings of the same names, with the
//! formatted declaration names of the run.

use crate::error::CodegenError;
use crate::naming::{NamingConfig, capitalize_words, has_non_identifier_chars, to_pascal_case};
use regex::{Captures, NoExpand, Regex};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use supaflat_schema::FlatDeclaration;
use tracing::debug;

/// Matches a single-line string literal in any quote style, or an
/// identifier-like token.
const IDENTIFIER_PATTERN: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|`(?:[^`\\]|\\.)*`|[\w$]+"#;

/// Whole-identifier substitution table.
///
/// Only complete identifiers are replaced, so a key never matches inside a
/// longer name. String literals are copied unchanged.
#[derive(Debug, Clone)]
pub struct IdentifierSubstitution {
    pattern: Regex,
    replacements: HashMap<String, String>,
}

impl IdentifierSubstitution {
    /// Creates a substitution table.
    ///
    /// # Errors
    /// Returns `regex::Error` if the identifier pattern fails to compile.
    pub fn new(replacements: HashMap<String, String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(IDENTIFIER_PATTERN)?,
            replacements,
        })
    }

    /// Returns true if there is nothing to substitute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Returns the substitution table.
    #[must_use]
    pub fn replacements(&self) -> &HashMap<String, String> {
        &self.replacements
    }

    /// Applies the table to `text`.
    #[must_use]
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.replacements.is_empty() {
            return Cow::Borrowed(text);
        }
        self.pattern.replace_all(text, |caps: &Captures<'_>| {
            let token = &caps[0];
            if token.starts_with(['"', '\'', '`']) {
                return token.to_string();
            }
            self.replacements
                .get(token)
                .cloned()
                .unwrap_or_else(|| token.to_string())
        })
    }
}

/// One nested-path replacement.
#[derive(Debug, Clone)]
struct PathRule {
    regex: Regex,
    needle: String,
    replacement: String,
    depth: usize,
}

/// Rewrites nested lookups and legacy spellings to flattened names.
#[derive(Debug, Clone)]
pub struct CrossReferenceRewriter {
    root_name: String,
    paths: Vec<PathRule>,
    legacy: IdentifierSubstitution,
}

impl CrossReferenceRewriter {
    /// Builds the rewrite rules for every declaration of a run.
    ///
    /// # Errors
    /// Returns `CodegenError::Pattern` if a pattern fails to compile.
    pub fn new(
        root_name: &str,
        declarations: &[FlatDeclaration],
        config: &NamingConfig,
    ) -> Result<Self, CodegenError> {
        let mut paths = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            let segments = declaration.source_path();
            paths.push(PathRule {
                regex: Regex::new(&path_pattern(root_name, &segments))?,
                needle: declaration.entity_name.clone(),
                replacement: declaration.formatted_name.clone(),
                depth: segments.len(),
            });
        }
        paths.sort_by(|a, b| {
            b.depth
                .cmp(&a.depth)
                .then_with(|| b.regex.as_str().len().cmp(&a.regex.as_str().len()))
        });

        let legacy = IdentifierSubstitution::new(legacy_spellings(declarations, config))?;
        debug!(
            "Built {} path rule(s) and {} legacy spelling(s)",
            paths.len(),
            legacy.replacements().len()
        );

        Ok(Self {
            root_name: root_name.to_string(),
            paths,
            legacy,
        })
    }

    /// Rewrites every known reference in `text`.
    ///
    /// Unknown references are left untouched.
    #[must_use]
    pub fn rewrite(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            if !line.contains(&self.root_name) {
                output.push_str(line);
                continue;
            }

            let mut current = Cow::Borrowed(line);
            for rule in &self.paths {
                if !current.contains(&rule.needle) {
                    continue;
                }
                let replaced = match rule.regex.replace_all(&current, NoExpand(&rule.replacement)) {
                    Cow::Owned(replaced) => Some(replaced),
                    Cow::Borrowed(_) => None,
                };
                if let Some(replaced) = replaced {
                    current = Cow::Owned(replaced);
                }
            }
            output.push_str(&current);
        }

        self.legacy.apply(&output).into_owned()
    }
}

/// Builds the pattern for `Root["a"]["b"]...`, accepting either quote style.
fn path_pattern(root_name: &str, segments: &[&str]) -> String {
    let mut pattern = format!(r"\b{}", regex::escape(root_name));
    for segment in segments {
        let segment = regex::escape(segment);
        pattern.push_str(&format!(r#"\[\s*(?:"{0}"|'{0}')\s*\]"#, segment));
    }
    pattern
}

/// Spellings older naming schemes produced for one declaration.
fn guesses(declaration: &FlatDeclaration, config: &NamingConfig) -> Vec<String> {
    let schema = declaration.schema_key.as_str();
    let category = declaration.category_key.as_str();
    let entity = declaration.entity_name.as_str();
    let member = declaration.member.as_deref();

    let mut pascal = format!(
        "{}{}{}",
        to_pascal_case(schema),
        category,
        to_pascal_case(entity)
    );
    let mut short = format!("{}{}", to_pascal_case(schema), to_pascal_case(entity));
    let mut raw = vec![schema, category, entity];
    if let Some(member) = member {
        pascal.push_str(&to_pascal_case(member));
        short.push_str(&to_pascal_case(member));
        raw.push(member);
    }

    let mut camel = pascal.clone();
    if let Some(first) = camel.get(..1) {
        let lower = first.to_lowercase();
        camel.replace_range(..1, &lower);
    }

    let joined = raw.join(config.separator.as_str());
    let capitalized = raw
        .iter()
        .map(|segment| capitalize_words(segment))
        .collect::<Vec<_>>()
        .join(config.separator.as_str());

    vec![pascal, camel, joined, capitalized, short]
}

/// Collects unambiguous legacy spellings, mapped to their formatted names.
///
/// A spelling equal to any formatted name of the run is never rewritten,
/// which keeps rewriting idempotent.
fn legacy_spellings(
    declarations: &[FlatDeclaration],
    config: &NamingConfig,
) -> HashMap<String, String> {
    let formatted: HashSet<&str> = declarations
        .iter()
        .map(|declaration| declaration.formatted_name.as_str())
        .collect();

    let mut candidates: HashMap<String, Option<String>> = HashMap::new();
    for declaration in declarations {
        for guess in guesses(declaration, config) {
            if guess.is_empty()
                || has_non_identifier_chars(&guess)
                || guess.starts_with(|c: char| c.is_ascii_digit())
                || formatted.contains(guess.as_str())
            {
                continue;
            }
            match candidates.get_mut(&guess) {
                Some(slot) => {
                    if slot.as_deref() != Some(declaration.formatted_name.as_str()) {
                        debug!("Legacy spelling '{}' is ambiguous; ignoring", guess);
                        *slot = None;
                    }
                }
                None => {
                    candidates.insert(guess, Some(declaration.formatted_name.clone()));
                }
            }
        }
    }

    candidates
        .into_iter()
        .filter_map(|(guess, target)| target.map(|target| (guess, target)))
        .collect()
}
