//! Validator and type name overrides.
//!
//! The validator generator names its output after the flattened type names.
//! When the configured validator templates differ from that derivation, the
//! generated identifiers are substituted afterwards.

use crate::backend::ValidatorGenerator;
use crate::error::CodegenError;
use crate::rewrite::IdentifierSubstitution;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use supaflat_schema::SchemaNameMapping;
use tracing::{debug, warn};

/// One identifier substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOverride {
    /// Identifier produced by the generator.
    pub default: String,
    /// Identifier required by the configuration.
    pub configured: String,
}

/// Two declarations claiming the same generated identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConflict {
    /// Shared generated identifier.
    pub default: String,
    /// Target kept from the first claim.
    pub kept: String,
    /// Target of the rejected claim.
    pub rejected: String,
    /// Declaration whose claim was rejected.
    pub type_name: String,
}

/// Overrides computed for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideReport {
    /// Validator identifier substitutions.
    pub schema_overrides: Vec<NameOverride>,
    /// Inferred type identifier substitutions.
    pub type_overrides: Vec<NameOverride>,
    /// Rejected claims.
    pub conflicts: Vec<NamingConflict>,
}

impl OverrideReport {
    /// Returns true if nothing needs substituting and nothing conflicted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schema_overrides.is_empty()
            && self.type_overrides.is_empty()
            && self.conflicts.is_empty()
    }
}

/// Applies validator and type name overrides to generated sources.
#[derive(Debug, Clone)]
pub struct OverrideEngine {
    validators: IdentifierSubstitution,
    types: IdentifierSubstitution,
    report: OverrideReport,
}

impl OverrideEngine {
    /// Computes overrides from every name mapping of a run.
    ///
    /// The first claim on a generated identifier wins; later claims with a
    /// different target are recorded as conflicts.
    ///
    /// # Errors
    /// Returns `CodegenError::Pattern` if the substitution pattern fails to compile.
    pub fn from_mappings(
        mappings: &[SchemaNameMapping],
        generator: &dyn ValidatorGenerator,
    ) -> Result<Self, CodegenError> {
        let mut report = OverrideReport::default();

        let mut claims: HashMap<String, String> = HashMap::new();
        for mapping in mappings {
            let default = generator.validator_name(&mapping.type_name);
            match claims.entry(default) {
                Entry::Occupied(entry) => {
                    if *entry.get() != mapping.schema_name {
                        warn!(
                            "Validator name '{}' for '{}' conflicts with '{}'; keeping the first",
                            mapping.schema_name,
                            mapping.type_name,
                            entry.get()
                        );
                        report.conflicts.push(NamingConflict {
                            default: entry.key().clone(),
                            kept: entry.get().clone(),
                            rejected: mapping.schema_name.clone(),
                            type_name: mapping.type_name.clone(),
                        });
                    }
                }
                Entry::Vacant(entry) => {
                    if *entry.key() != mapping.schema_name {
                        report.schema_overrides.push(NameOverride {
                            default: entry.key().clone(),
                            configured: mapping.schema_name.clone(),
                        });
                    }
                    entry.insert(mapping.schema_name.clone());
                }
            }
        }

        let mut type_claims: HashMap<String, String> = HashMap::new();
        for mapping in mappings.iter().filter(|mapping| mapping.lossy) {
            let inferred = generator.inferred_type_name(&mapping.type_name);
            if inferred == mapping.type_name {
                continue;
            }
            match type_claims.entry(inferred) {
                Entry::Occupied(entry) => {
                    if *entry.get() != mapping.type_name {
                        warn!(
                            "Inferred type name '{}' is claimed by '{}' and '{}'; keeping the first",
                            entry.key(),
                            entry.get(),
                            mapping.type_name
                        );
                        report.conflicts.push(NamingConflict {
                            default: entry.key().clone(),
                            kept: entry.get().clone(),
                            rejected: mapping.type_name.clone(),
                            type_name: mapping.type_name.clone(),
                        });
                    }
                }
                Entry::Vacant(entry) => {
                    report.type_overrides.push(NameOverride {
                        default: entry.key().clone(),
                        configured: mapping.type_name.clone(),
                    });
                    entry.insert(mapping.type_name.clone());
                }
            }
        }

        debug!(
            "{} validator override(s), {} type override(s), {} conflict(s)",
            report.schema_overrides.len(),
            report.type_overrides.len(),
            report.conflicts.len()
        );

        Ok(Self {
            validators: IdentifierSubstitution::new(substitutions(&report.schema_overrides))?,
            types: IdentifierSubstitution::new(substitutions(&report.type_overrides))?,
            report,
        })
    }

    /// Returns the computed overrides and conflicts.
    #[must_use]
    pub fn report(&self) -> &OverrideReport {
        &self.report
    }

    /// Consumes the engine, returning its report.
    #[must_use]
    pub fn into_report(self) -> OverrideReport {
        self.report
    }

    /// Applies validator overrides to the validator source.
    #[must_use]
    pub fn apply_to_validators(&self, source: &str) -> String {
        self.validators.apply(source).into_owned()
    }

    /// Applies validator and type overrides to the inferred-types source.
    #[must_use]
    pub fn apply_to_types(&self, source: &str) -> String {
        let renamed = self.validators.apply(source);
        self.types.apply(&renamed).into_owned()
    }
}

fn substitutions(overrides: &[NameOverride]) -> HashMap<String, String> {
    overrides
        .iter()
        .map(|o| (o.default.clone(), o.configured.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ValidatorOutput;

    struct DefaultNames;

    impl ValidatorGenerator for DefaultNames {
        fn generate(&self, _types_source: &str, _import_path: &str) -> ValidatorOutput {
            ValidatorOutput::default()
        }
    }

    fn mapping(type_name: &str, schema_name: &str, lossy: bool) -> SchemaNameMapping {
        SchemaNameMapping {
            type_name: type_name.to_string(),
            schema_name: schema_name.to_string(),
            lossy,
        }
    }

    #[test]
    fn test_default_names_need_no_overrides() {
        let engine = OverrideEngine::from_mappings(
            &[mapping("PublicUsersRow", "publicUsersRowSchema", false)],
            &DefaultNames,
        )
        .expect("Failed to build overrides");
        assert!(engine.report().is_empty());
        let source = "export const publicUsersRowSchema = z.object({});\n";
        assert_eq!(engine.apply_to_validators(source), source);
    }

    #[test]
    fn test_configured_names_are_substituted() {
        let engine = OverrideEngine::from_mappings(
            &[
                mapping("PublicUsersRow", "usersRowValidator", false),
                mapping("PublicUsersRowHistory", "historyValidator", false),
            ],
            &DefaultNames,
        )
        .expect("Failed to build overrides");

        let source = "export const publicUsersRowSchema = z.object({});\nexport const publicUsersRowHistorySchema = z.array(publicUsersRowSchema);\n";
        assert_eq!(
            engine.apply_to_validators(source),
            "export const usersRowValidator = z.object({});\nexport const historyValidator = z.array(usersRowValidator);\n"
        );
        assert_eq!(engine.report().schema_overrides.len(), 2);
    }

    #[test]
    fn test_conflict_keeps_first() {
        // Both type names derive `publicABSchema` by default.
        let engine = OverrideEngine::from_mappings(
            &[
                mapping("PublicAB", "firstSchema", false),
                mapping("Public_AB", "secondSchema", false),
            ],
            &DefaultNames,
        )
        .expect("Failed to build overrides");

        let report = engine.report();
        assert_eq!(
            report.schema_overrides,
            vec![NameOverride {
                default: "publicABSchema".to_string(),
                configured: "firstSchema".to_string(),
            }]
        );
        assert_eq!(
            report.conflicts,
            vec![NamingConflict {
                default: "publicABSchema".to_string(),
                kept: "firstSchema".to_string(),
                rejected: "secondSchema".to_string(),
                type_name: "Public_AB".to_string(),
            }]
        );
    }

    #[test]
    fn test_identical_claims_are_not_conflicts() {
        let engine = OverrideEngine::from_mappings(
            &[
                mapping("PublicAB", "abSchema", false),
                mapping("Public_AB", "abSchema", false),
            ],
            &DefaultNames,
        )
        .expect("Failed to build overrides");
        assert!(engine.report().conflicts.is_empty());
    }

    #[test]
    fn test_type_overrides_for_lossy_names() {
        let engine = OverrideEngine::from_mappings(
            &[
                mapping("PublicBilling_plan", "publicbilling_plan_schema", true),
                mapping("PublicUsersRow", "publicUsersRowSchema", false),
            ],
            &DefaultNames,
        )
        .expect("Failed to build overrides");

        assert_eq!(
            engine.report().type_overrides,
            vec![NameOverride {
                default: "PublicBillingPlan".to_string(),
                configured: "PublicBilling_plan".to_string(),
            }]
        );
        let types = "export type PublicBillingPlan = z.infer<typeof publicBillingPlanSchema>;\n";
        assert_eq!(
            engine.apply_to_types(types),
            "export type PublicBilling_plan = z.infer<typeof publicbilling_plan_schema>;\n"
        );
    }
}
