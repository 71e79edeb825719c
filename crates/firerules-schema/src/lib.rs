//! # firerules-schema
//!
//! Input handling for the firerules compiler.
//!
//! This crate provides [`validator::JsonSchemaValidator`], which implements
//! the [`firerules_core::traits::ModelValidator`] trait against an embedded
//! JSON Schema for the policy model, and the [`loader`] functions that read
//! JSON or TOML policy documents into a `serde_json::Value`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use firerules_schema::{loader, JsonSchemaValidator};
//!
//! let document = loader::document_from_file(Path::new("firestore.json"))?;
//! JsonSchemaValidator::new()?.validate(&document)?;
//! ```

pub mod loader;
pub mod validator;

pub use loader::{document_from_file, document_from_json_str, document_from_toml_str, DocumentFormat};
pub use validator::{JsonSchemaValidator, MODEL_SCHEMA};
