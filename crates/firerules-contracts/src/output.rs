//! Output of the compilation pipeline, handed to the renderer.
//!
//! Each node is reduced to its path, wildcard and the finished `allow`
//! statements; everything else has been folded into the statement text.

use serde::{Deserialize, Serialize};

/// A compiled document, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    pub top_level_match_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MergedMatch>,
    /// Opaque function bodies, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_functions: Vec<String>,
}

/// One node of the compiled tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedMatch {
    pub collection_path: String,
    pub wildcard_name: String,
    #[serde(default)]
    pub is_wild_card_recursive: bool,
    /// `allow <method>;` or `allow <method>: if <expr>;`, one per method.
    pub rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MergedMatch>,
}
