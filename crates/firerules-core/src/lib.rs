//! # firerules-core
//!
//! The rule compilation pipeline for firerules policy models.
//!
//! This crate provides:
//! - The expression flattening (`Flatten`) for fields, conditions and rules
//! - The method expansion and rule merge passes
//! - The collaborator traits (`ModelValidator`, `RulesRenderer`)
//! - `compile_model` and the `Compiler` that wires everything together
//!
//! ## Usage
//!
//! ```rust,ignore
//! use firerules_core::{compile_model, Compiler};
//!
//! let rules = compile_model(&model);
//! ```

pub mod compiler;
pub mod expand;
pub mod expression;
pub mod flatten;
pub mod merge;
pub mod traits;

pub use compiler::{compile_model, Compiler};
pub use expression::Flatten;
