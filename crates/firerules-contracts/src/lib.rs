//! # firerules-contracts
//!
//! Shared types for the firerules compiler: the policy model, the compiled
//! output handed to renderers, and the error type.
//!
//! All crates in the workspace import from here. No compilation logic lives
//! in this crate, only data definitions, decoding, and `Display` impls.

pub mod error;
pub mod expression;
pub mod method;
pub mod model;
pub mod output;
