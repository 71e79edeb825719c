//! Loading policy documents from JSON or TOML.
//!
//! Both formats decode into a `serde_json::Value` so the same schema
//! validation applies to either. Files are dispatched on extension:
//! `.toml` is read as TOML, everything else as JSON.

use std::path::Path;

use tracing::debug;

use firerules_contracts::error::{FireRulesError, FireRulesResult};

/// Source format of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick the format for `path` from its extension.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Parse `s` as a JSON policy document.
///
/// Returns `FireRulesError::ConfigError` if `s` is not valid JSON.
pub fn document_from_json_str(s: &str) -> FireRulesResult<serde_json::Value> {
    serde_json::from_str(s).map_err(|e| FireRulesError::ConfigError {
        reason: format!("failed to parse policy JSON: {e}"),
    })
}

/// Parse `s` as a TOML policy document.
///
/// Returns `FireRulesError::ConfigError` if `s` is not valid TOML.
pub fn document_from_toml_str(s: &str) -> FireRulesResult<serde_json::Value> {
    toml::from_str(s).map_err(|e| FireRulesError::ConfigError {
        reason: format!("failed to parse policy TOML: {e}"),
    })
}

/// Read the file at `path` and parse it in the format its extension names.
///
/// Returns `FireRulesError::ConfigError` if the file cannot be read or its
/// contents do not parse.
pub fn document_from_file(path: &Path) -> FireRulesResult<serde_json::Value> {
    let contents = std::fs::read_to_string(path).map_err(|e| FireRulesError::ConfigError {
        reason: format!("failed to read policy file '{}': {}", path.display(), e),
    })?;

    let format = DocumentFormat::for_path(path);
    debug!(path = %path.display(), ?format, "loading policy document");

    match format {
        DocumentFormat::Json => document_from_json_str(&contents),
        DocumentFormat::Toml => document_from_toml_str(&contents),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
