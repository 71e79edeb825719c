//! Firestore security rules text renderer.
//!
//! `TextRenderer` implements the `RulesRenderer` trait from
//! `firerules-core`. It owns the file layout only: the header, one nested
//! `match` block per compiled node, the `getOr` helper the structural checks
//! call, and the custom functions. Statement text is written exactly as the
//! merge pass produced it.

use std::fmt::Write;

use tracing::debug;

use firerules_contracts::{
    error::{FireRulesError, FireRulesResult},
    output::{MergedMatch, Rules},
};
use firerules_core::traits::RulesRenderer;

/// Helper called by optional-field type checks.
const GET_OR_HELPER: &str = "function getOr(request, field, defaultValue) {\n  \
                             return request.resource.data.get(field, defaultValue);\n}";

/// Layout settings for `TextRenderer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Value written to the `rules_version` header.
    pub rules_version: String,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            rules_version: "2".to_string(),
            indent: 2,
        }
    }
}

/// Renders compiled `Rules` as a `.rules` document.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    options: RenderOptions,
}

impl TextRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(self.options.indent * depth)
    }

    fn write_match(&self, out: &mut String, node: &MergedMatch, depth: usize) -> std::fmt::Result {
        let pad = self.pad(depth);
        let wildcard = if node.is_wild_card_recursive {
            format!("{}=**", node.wildcard_name)
        } else {
            node.wildcard_name.clone()
        };
        writeln!(out, "{pad}match /{}/{{{wildcard}}} {{", node.collection_path)?;

        let inner = self.pad(depth + 1);
        for rule in &node.rules {
            writeln!(out, "{inner}{rule}")?;
        }

        for (i, child) in node.children.iter().enumerate() {
            if i > 0 || !node.rules.is_empty() {
                writeln!(out)?;
            }
            self.write_match(out, child, depth + 1)?;
        }

        writeln!(out, "{pad}}}")
    }

    /// Write `text` with every non-blank line prefixed by the block padding.
    fn write_block(&self, out: &mut String, text: &str, depth: usize) -> std::fmt::Result {
        let pad = self.pad(depth);
        for line in text.trim().lines() {
            if line.trim().is_empty() {
                writeln!(out)?;
            } else {
                writeln!(out, "{pad}{}", line.trim_end())?;
            }
        }
        Ok(())
    }

    fn write_document(&self, out: &mut String, rules: &Rules) -> std::fmt::Result {
        writeln!(out, "rules_version = '{}';", self.options.rules_version)?;
        writeln!(out)?;
        writeln!(out, "service cloud.firestore {{")?;
        writeln!(out, "{}match {} {{", self.pad(1), rules.top_level_match_path)?;

        for node in &rules.matches {
            self.write_match(out, node, 2)?;
            writeln!(out)?;
        }

        self.write_block(out, GET_OR_HELPER, 2)?;
        for function in &rules.custom_functions {
            writeln!(out)?;
            self.write_block(out, function, 2)?;
        }

        writeln!(out, "{}}}", self.pad(1))?;
        writeln!(out, "}}")
    }
}

impl RulesRenderer for TextRenderer {
    fn render(&self, rules: &Rules) -> FireRulesResult<String> {
        let mut out = String::new();
        self.write_document(&mut out, rules)
            .map_err(|e| FireRulesError::RenderFailed {
                reason: e.to_string(),
            })?;

        debug!(
            match_count = rules.matches.len(),
            function_count = rules.custom_functions.len(),
            bytes = out.len(),
            "rendered rules document"
        );
        Ok(out)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use firerules_contracts::output::{MergedMatch, Rules};
    use firerules_core::traits::RulesRenderer;

    use super::{RenderOptions, TextRenderer};

    fn node(path: &str, wildcard: &str, rules: &[&str], children: Vec<MergedMatch>) -> MergedMatch {
        MergedMatch {
            collection_path: path.to_string(),
            wildcard_name: wildcard.to_string(),
            is_wild_card_recursive: false,
            rules: rules.iter().map(|r| r.to_string()).collect(),
            children,
        }
    }

    fn document(matches: Vec<MergedMatch>, custom_functions: Vec<&str>) -> Rules {
        Rules {
            top_level_match_path: "/databases/{database}/documents".to_string(),
            matches,
            custom_functions: custom_functions.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_render_empty_document() {
        let text = TextRenderer::default().render(&document(vec![], vec![])).unwrap();
        assert_eq!(
            text,
            "rules_version = '2';\n\
             \n\
             service cloud.firestore {\n\
             \x20 match /databases/{database}/documents {\n\
             \x20   function getOr(request, field, defaultValue) {\n\
             \x20     return request.resource.data.get(field, defaultValue);\n\
             \x20   }\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn test_render_nested_matches() {
        let mut posts = node("posts", "postId", &["allow read;"], vec![]);
        posts.is_wild_card_recursive = true;
        let users = node(
            "users",
            "uid",
            &["allow get: if request.auth != null;", "allow list;"],
            vec![posts],
        );

        let text = TextRenderer::default().render(&document(vec![users], vec![])).unwrap();
        let expected_block = "    match /users/{uid} {\n\
                              \x20     allow get: if request.auth != null;\n\
                              \x20     allow list;\n\
                              \n\
                              \x20     match /posts/{postId=**} {\n\
                              \x20       allow read;\n\
                              \x20     }\n\
                              \x20   }\n";
        assert!(text.contains(expected_block), "unexpected output:\n{text}");
    }

    #[test]
    fn test_render_separates_sibling_matches() {
        let text = TextRenderer::default()
            .render(&document(
                vec![
                    node("a", "aid", &["allow get;"], vec![]),
                    node("b", "bid", &["allow get;"], vec![]),
                ],
                vec![],
            ))
            .unwrap();
        assert!(text.contains("    }\n\n    match /b/{bid} {\n"), "unexpected output:\n{text}");
    }

    #[test]
    fn test_render_reindents_custom_functions() {
        let function = "\nfunction isAdmin() {\n  return request.auth.token.admin == true;\n}\n";
        let text = TextRenderer::default()
            .render(&document(vec![], vec![function]))
            .unwrap();
        assert!(
            text.contains(
                "\n\n    function isAdmin() {\n      return request.auth.token.admin == true;\n    }\n  }\n}\n"
            ),
            "unexpected output:\n{text}"
        );
    }

    #[test]
    fn test_render_honours_options() {
        let renderer = TextRenderer::new(RenderOptions {
            rules_version: "1".to_string(),
            indent: 4,
        });
        let text = renderer
            .render(&document(vec![node("a", "aid", &["allow get;"], vec![])], vec![]))
            .unwrap();
        assert!(text.starts_with("rules_version = '1';\n"));
        assert!(text.contains("\n        match /a/{aid} {\n            allow get;\n        }\n"));
    }
}
