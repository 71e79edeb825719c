//! firerules: compile a policy model into Firestore security rules.
//!
//! Reads a JSON or TOML policy model, validates it against the model schema,
//! runs the compilation passes and writes the rendered `.rules` file.
//!
//! Usage:
//!   firerules firestore.json
//!   firerules firestore.toml -o firestore.rules
//!   firerules firestore.json --debug

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use firerules_contracts::error::{FireRulesError, FireRulesResult};
use firerules_core::Compiler;
use firerules_render::{RenderOptions, TextRenderer};
use firerules_schema::{loader, JsonSchemaValidator};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Compile a firerules policy model into Firestore security rules.
#[derive(Parser, Debug)]
#[command(
    name = "firerules",
    version,
    about = "Firestore security rules compiler",
    long_about = "Compiles a declarative policy model (JSON or TOML) into a Firestore\n\
                  security rules file, expanding read/write methods, merging conditions\n\
                  per method and synthesizing field type and presence checks."
)]
struct Cli {
    /// Policy model file to load (`.toml` is read as TOML, anything else as JSON).
    input: PathBuf,

    /// Where to save the generated rules. Defaults to the input path with a
    /// `.rules` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output extra debugging (equivalent to RUST_LOG=debug).
    #[arg(short, long)]
    debug: bool,

    /// Value of the `rules_version` header.
    #[arg(long, default_value = "2")]
    rules_version: String,

    /// Spaces per nesting level in the generated file.
    #[arg(long, default_value_t = 2)]
    indent: usize,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Set RUST_LOG=debug (or pass --debug) for verbose output.
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    match run(&cli) {
        Ok(path) => {
            println!("Wrote {}", path.display());
        }
        Err(e) => {
            eprintln!("firerules: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("rules")
}

/// Compile `cli.input` and write the result. Returns the path written.
fn run(cli: &Cli) -> FireRulesResult<PathBuf> {
    let document = loader::document_from_file(&cli.input)?;

    let renderer = TextRenderer::new(RenderOptions {
        rules_version: cli.rules_version.clone(),
        indent: cli.indent,
    });
    let compiler = Compiler::new(Box::new(JsonSchemaValidator::new()?), Box::new(renderer));
    let text = compiler.compile_document(document)?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    std::fs::write(&output, text).map_err(|e| FireRulesError::OutputWriteFailed {
        reason: format!("'{}': {}", output.display(), e),
    })?;

    info!(input = %cli.input.display(), output = %output.display(), "rules written");
    Ok(output)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use clap::Parser;

    use firerules_contracts::error::FireRulesError;

    use super::{default_output_path, run, Cli};

    fn cli_for(input: &Path, output: Option<PathBuf>) -> Cli {
        Cli {
            input: input.to_path_buf(),
            output,
            debug: false,
            rules_version: "2".to_string(),
            indent: 2,
        }
    }

    #[test]
    fn test_default_output_replaces_extension() {
        assert_eq!(
            default_output_path(Path::new("policies/firestore.json")),
            PathBuf::from("policies/firestore.rules")
        );
        assert_eq!(
            default_output_path(Path::new("firestore")),
            PathBuf::from("firestore.rules")
        );
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["firerules", "model.toml", "-o", "out.rules", "-d", "--indent", "4"]);
        assert_eq!(cli.input, PathBuf::from("model.toml"));
        assert_eq!(cli.output, Some(PathBuf::from("out.rules")));
        assert!(cli.debug);
        assert_eq!(cli.indent, 4);
        assert_eq!(cli.rules_version, "2");
    }

    #[test]
    fn test_run_writes_rules_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("firestore.json");
        std::fs::write(
            &input,
            r#"{
                "topLevelMatchPath": "/databases/{database}/documents",
                "matches": [{
                    "collectionPath": "users",
                    "wildcardName": "uid",
                    "allowRules": [{ "methods": ["read"], "requireAuth": true }],
                    "structureRules": [{ "field": "name", "type": ["string"], "required": true }]
                }]
            }"#,
        )
        .unwrap();

        let written = run(&cli_for(&input, None)).unwrap();
        assert_eq!(written, dir.path().join("firestore.rules"));

        let text = std::fs::read_to_string(&written).unwrap();
        assert!(text.contains("match /users/{uid} {"));
        assert!(text.contains("allow read: if request.auth != null;"));
        assert!(text.contains(
            "allow create: if request.resource.data.name is string \
             && request.resource.data.keys().hasAll(['name']);"
        ));
        assert!(text.contains("allow update: if getOr(request, 'name', '') is string;"));
    }

    #[test]
    fn test_run_reads_toml_and_honours_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("model.toml");
        let output = dir.path().join("custom.rules");
        std::fs::write(
            &input,
            r#"
                topLevelMatchPath = "/databases/{database}/documents"

                [[matches]]
                collectionPath = "public"
                wildcardName = "docId"

                [[matches.allowRules]]
                methods = ["get"]
            "#,
        )
        .unwrap();

        let written = run(&cli_for(&input, Some(output.clone()))).unwrap();
        assert_eq!(written, output);
        assert!(std::fs::read_to_string(&output).unwrap().contains("      allow get;\n"));
    }

    #[test]
    fn test_run_rejects_invalid_model_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.json");
        std::fs::write(&input, r#"{ "matches": [] }"#).unwrap();

        let result = run(&cli_for(&input, None));
        assert!(matches!(result, Err(FireRulesError::SchemaValidation { .. })));
        assert!(!dir.path().join("bad.rules").exists());
    }
}
