//! The compilation pipeline and the `Compiler` that wraps it with
//! validation and rendering.
//!
//!   Document → Validate → Decode → Expand → Flatten → Merge → Render
//!
//! `compile_model` is the pure middle of that chain. Each pass takes a tree
//! by reference and builds a new one, so the input `Model` is never touched.

use tracing::{debug, info};

use firerules_contracts::{
    error::FireRulesResult,
    model::{Match, Model},
    output::{MergedMatch, Rules},
};

use crate::{
    expand::expand_methods,
    expression::Flatten,
    merge::merge_match,
    traits::{ModelValidator, RulesRenderer},
};

fn compile_match(node: &Match) -> MergedMatch {
    let expanded = expand_methods(node);
    let flat = expanded.flatten();
    merge_match(&flat)
}

/// Run every pass over every top-level match of `model`.
///
/// Custom functions are passed through untouched.
pub fn compile_model(model: &Model) -> Rules {
    debug!(
        top_level = %model.top_level_match_path,
        match_count = model.matches.len(),
        "compiling model"
    );

    Rules {
        top_level_match_path: model.top_level_match_path.clone(),
        matches: model.matches.iter().map(compile_match).collect(),
        custom_functions: model.custom_functions.clone(),
    }
}

/// Drives one document through validation, the passes and rendering.
///
/// Any error aborts the run; there is no partial output.
pub struct Compiler {
    validator: Box<dyn ModelValidator>,
    renderer: Box<dyn RulesRenderer>,
}

impl Compiler {
    pub fn new(validator: Box<dyn ModelValidator>, renderer: Box<dyn RulesRenderer>) -> Self {
        Self { validator, renderer }
    }

    /// Validate and decode `document` into a `Model`.
    pub fn load(&self, document: serde_json::Value) -> FireRulesResult<Model> {
        self.validator.validate(&document)?;
        Model::from_value(document)
    }

    /// Compile `document` all the way to rules text.
    pub fn compile_document(&self, document: serde_json::Value) -> FireRulesResult<String> {
        let model = self.load(document)?;
        let rules = compile_model(&model);
        let text = self.renderer.render(&rules)?;

        info!(
            top_level = %rules.top_level_match_path,
            match_count = rules.matches.len(),
            bytes = text.len(),
            "compiled rules"
        );
        Ok(text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
