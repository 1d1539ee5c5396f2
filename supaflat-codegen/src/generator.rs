//! Generation pipeline.
//!
//! Parses the source, flattens the requested schemas, rewrites
//! cross-references and hands the result to the validator generator.

use crate::backend::{IdentityPrinter, ParserMode, PrettyPrinter, ValidatorGenerator};
use crate::banner::{DEFAULT_BANNER, replace_banner};
use crate::error::CodegenError;
use crate::flatten::{FlattenEngine, FlattenedSchema};
use crate::naming::NamingConfig;
use crate::overrides::{OverrideEngine, OverrideReport};
use crate::rewrite::CrossReferenceRewriter;
use std::path::Path;
use supaflat_schema::{DEFAULT_ROOT_NAME, SchemaLocator, parse_source};
use tracing::{info, warn};

static IDENTITY_PRINTER: IdentityPrinter = IdentityPrinter;

/// Options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Schemas to flatten; empty means every schema under the root.
    pub schemas: Vec<String>,
    /// Module specifier the validators import the flattened types from.
    pub import_path: String,
    /// Whether to return the inferred-types source.
    pub emit_types: bool,
    /// Whether to pull in enums of other schemas that are referenced.
    pub process_dependencies: bool,
    /// Name of the root declaration.
    pub root_name: String,
    /// Banner placed above the first import of each generated file.
    pub banner: String,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            schemas: Vec::new(),
            import_path: "./database.types".to_string(),
            emit_types: true,
            process_dependencies: true,
            root_name: DEFAULT_ROOT_NAME.to_string(),
            banner: DEFAULT_BANNER.to_string(),
        }
    }
}

impl GenerateRequest {
    /// Creates a request for explicit schemas.
    #[must_use]
    pub fn for_schemas<S: Into<String>>(schemas: impl IntoIterator<Item = S>) -> Self {
        Self {
            schemas: schemas.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Flattened types of one run.
#[derive(Debug, Clone)]
pub struct FlattenOutput {
    /// Schemas that were processed, in order.
    pub schemas: Vec<String>,
    /// Declarations and name mappings.
    pub flattened: FlattenedSchema,
    /// Rendered declarations with cross-references rewritten.
    pub types_source: String,
}

/// Generated sources of one run.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Schemas that were processed, in order.
    pub schemas: Vec<String>,
    /// Flattened type declarations.
    pub types_source: String,
    /// Validator source.
    pub validators: String,
    /// Inferred-types source, when requested.
    pub inferred_types: Option<String>,
    /// Applied overrides and naming conflicts.
    pub report: OverrideReport,
}

/// Flattens the requested schemas of `source` without generating validators.
///
/// # Errors
/// Returns `CodegenError` if the naming configuration is invalid, the source
/// cannot be parsed, or schema discovery finds nothing.
pub fn flatten_types(
    source: &str,
    naming: &NamingConfig,
    request: &GenerateRequest,
) -> Result<FlattenOutput, CodegenError> {
    naming.validate()?;

    let file = parse_source(source)?;
    let locator = SchemaLocator::new(&file, &request.root_name);
    if locator.root().is_none() {
        match file.skipped.iter().find(|s| s.name == request.root_name) {
            Some(skipped) => warn!(
                "Root declaration '{}' could not be parsed: {}",
                request.root_name, skipped.reason
            ),
            None => warn!(
                "Root declaration '{}' not found or has an unsupported shape",
                request.root_name
            ),
        }
    }

    let schemas = if request.schemas.is_empty() {
        let discovered = locator.schema_keys();
        if discovered.is_empty() {
            return Err(CodegenError::NoSchemas {
                root: request.root_name.clone(),
            });
        }
        info!("Discovered schemas: {}", discovered.join(", "));
        discovered
    } else {
        request.schemas.clone()
    };

    let engine = FlattenEngine::new(locator, naming).with_dependencies(request.process_dependencies);
    let flattened = engine.flatten_schemas(&schemas);
    if flattened.is_empty() {
        warn!("No declarations produced for schemas: {}", schemas.join(", "));
    }

    let rewriter =
        CrossReferenceRewriter::new(&request.root_name, flattened.declarations(), naming)?;
    let types_source = rewriter.rewrite(&flattened.render());

    Ok(FlattenOutput {
        schemas,
        flattened,
        types_source,
    })
}

/// Runs the full pipeline against caller-supplied collaborators.
pub struct Generator<'a> {
    naming: &'a NamingConfig,
    validator: &'a dyn ValidatorGenerator,
    printer: &'a dyn PrettyPrinter,
}

impl<'a> Generator<'a> {
    /// Creates a generator that leaves output formatting untouched.
    #[must_use]
    pub fn new(naming: &'a NamingConfig, validator: &'a dyn ValidatorGenerator) -> Self {
        Self {
            naming,
            validator,
            printer: &IDENTITY_PRINTER,
        }
    }

    /// Sets the pretty printer applied to generated sources.
    #[must_use]
    pub fn with_printer(mut self, printer: &'a dyn PrettyPrinter) -> Self {
        self.printer = printer;
        self
    }

    /// Flattens without invoking the validator generator.
    ///
    /// # Errors
    /// See [`flatten_types`].
    pub fn flatten(
        &self,
        source: &str,
        request: &GenerateRequest,
    ) -> Result<FlattenOutput, CodegenError> {
        flatten_types(source, self.naming, request)
    }

    /// Generates validators for `source`.
    ///
    /// # Errors
    /// Returns `CodegenError` if flattening fails, the validator generator
    /// reports errors, or formatting fails.
    pub fn generate(
        &self,
        source: &str,
        request: &GenerateRequest,
    ) -> Result<GeneratedOutput, CodegenError> {
        let flat = self.flatten(source, request)?;

        let output = self
            .validator
            .generate(&flat.types_source, &request.import_path);
        if !output.errors.is_empty() {
            return Err(CodegenError::Generation {
                messages: output.errors,
            });
        }

        let overrides = OverrideEngine::from_mappings(flat.flattened.mappings(), self.validator)?;

        let validators = overrides.apply_to_validators(&output.validators);
        let validators = self.printer.format(
            &replace_banner(&validators, &request.banner),
            ParserMode::TypeScript,
        )?;

        let inferred_types = if request.emit_types {
            let types = overrides.apply_to_types(&output.inferred_types);
            Some(self.printer.format(
                &replace_banner(&types, &request.banner),
                ParserMode::TypeScript,
            )?)
        } else {
            None
        };

        let report = overrides.into_report();
        info!(
            "Generated {} declaration(s) for {} schema(s) with {} override(s) and {} conflict(s)",
            flat.flattened.len(),
            flat.schemas.len(),
            report.schema_overrides.len() + report.type_overrides.len(),
            report.conflicts.len()
        );

        Ok(GeneratedOutput {
            schemas: flat.schemas,
            types_source: flat.types_source,
            validators,
            inferred_types,
            report,
        })
    }

    /// Reads `path` and generates validators for it.
    ///
    /// # Errors
    /// Returns `CodegenError` if reading or generation fails.
    pub fn generate_from_file(
        &self,
        path: &Path,
        request: &GenerateRequest,
    ) -> Result<GeneratedOutput, CodegenError> {
        let source = std::fs::read_to_string(path)?;
        self.generate(&source, request)
    }
}
