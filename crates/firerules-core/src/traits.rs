//! Collaborator traits at the edges of the compilation pipeline.
//!
//! - `ModelValidator` checks the raw document before it is decoded
//! - `RulesRenderer` turns the compiled `Rules` value into rules text
//!
//! The `Compiler` wires them around the pure passes in this crate. Neither
//! collaborator is consulted by the passes themselves.

use firerules_contracts::{error::FireRulesResult, output::Rules};

/// Validates an input document before it is decoded into a `Model`.
pub trait ModelValidator {
    /// Return `Ok(())` if `document` conforms to the policy model.
    ///
    /// Implementations should report every violation in a single
    /// `FireRulesError::SchemaValidation` rather than only the first.
    fn validate(&self, document: &serde_json::Value) -> FireRulesResult<()>;
}

/// Produces the final rules text from a compiled document.
pub trait RulesRenderer {
    fn render(&self, rules: &Rules) -> FireRulesResult<String>;
}
