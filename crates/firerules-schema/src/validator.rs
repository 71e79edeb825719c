//! JSON Schema validation of policy documents.
//!
//! `JsonSchemaValidator` implements the `ModelValidator` trait from
//! `firerules-core`. The policy model schema is embedded at build time and
//! compiled once; validation collects every violation before returning so
//! the author sees the full failure set in one run.

use tracing::{debug, warn};

use firerules_contracts::error::{FireRulesError, FireRulesResult};
use firerules_core::traits::ModelValidator;

/// The policy model schema document.
pub const MODEL_SCHEMA: &str = include_str!("../schema/model.schema.json");

/// Validates documents against the embedded policy model schema.
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile the embedded policy model schema.
    ///
    /// Returns `FireRulesError::ConfigError` if the embedded document is not
    /// valid JSON or not a valid schema.
    pub fn new() -> FireRulesResult<Self> {
        let schema: serde_json::Value =
            serde_json::from_str(MODEL_SCHEMA).map_err(|e| FireRulesError::ConfigError {
                reason: format!("embedded model schema is not valid JSON: {e}"),
            })?;
        Self::from_schema(&schema)
    }

    /// Compile an arbitrary schema document.
    pub fn from_schema(schema: &serde_json::Value) -> FireRulesResult<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| FireRulesError::ConfigError {
                reason: format!("invalid JSON Schema document: {e}"),
            })?;
        Ok(Self { validator })
    }
}

impl ModelValidator for JsonSchemaValidator {
    fn validate(&self, document: &serde_json::Value) -> FireRulesResult<()> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(document)
            .map(|error| {
                let message = format!("{}: {}", error.instance_path, error);
                warn!(%message, "schema violation");
                message
            })
            .collect();

        debug!(violation_count = violations.len(), "schema validation complete");

        if violations.is_empty() {
            Ok(())
        } else {
            Err(FireRulesError::SchemaValidation {
                reason: violations.join("; "),
            })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
