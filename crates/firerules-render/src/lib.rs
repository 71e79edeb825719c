//! # firerules-render
//!
//! Text rendering for compiled firerules output.
//!
//! [`TextRenderer`] implements [`firerules_core::traits::RulesRenderer`] and
//! lays out a complete Firestore security rules file from a
//! [`firerules_contracts::output::Rules`] value.

pub mod text;

pub use text::{RenderOptions, TextRenderer};
