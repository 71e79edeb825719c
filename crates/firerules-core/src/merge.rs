//! Rule merge pass.
//!
//! Reduces each flattened node to one `allow` statement per method:
//!
//! 1. Allow rules in declaration order. A rule without conditions grants its
//!    methods unconditionally unless they are already present. A rule with
//!    conditions AND-appends them, but never narrows a method that is
//!    already unconditional.
//! 2. Structure rules with a type list add a type check to `create`, using
//!    the defaulting accessor for optional fields, and the defaulting form to
//!    `update` regardless of `required`.
//! 3. When the node has structure rules, a `hasOnly` / `hasAll` check over
//!    the required fields closes the `create` condition.
//!
//! Structural checks in steps 2 and 3 replace an unconditional accumulator
//! instead of being dropped by it.

use tracing::debug;

use firerules_contracts::{
    method::{FirestoreType, RuleMethod},
    model::StructureRule,
    output::MergedMatch,
};

use crate::flatten::{FlatAllowRule, FlatMatch};

/// Per-method condition accumulator. Keeps first-insertion order so the
/// statements come out in the order their methods were first mentioned.
///
/// An empty string is an unconditional grant.
#[derive(Debug, Default)]
struct MethodConditions {
    entries: Vec<(RuleMethod, String)>,
}

impl MethodConditions {
    fn get_mut(&mut self, method: RuleMethod) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(m, _)| *m == method)
            .map(|(_, condition)| condition)
    }

    fn apply_allow_rule(&mut self, rule: &FlatAllowRule) {
        if rule.conditions.is_empty() {
            for method in &rule.methods {
                if self.get_mut(*method).is_none() {
                    self.entries.push((*method, String::new()));
                }
            }
            return;
        }

        let joined = rule.conditions.join(" && ");
        for method in &rule.methods {
            match self.get_mut(*method) {
                None => self.entries.push((*method, joined.clone())),
                Some(existing) if existing.is_empty() => {}
                Some(existing) => {
                    existing.push_str(" && ");
                    existing.push_str(&joined);
                }
            }
        }
    }

    fn constrain(&mut self, method: RuleMethod, condition: String) {
        match self.get_mut(method) {
            None => self.entries.push((method, condition)),
            Some(existing) if existing.is_empty() => *existing = condition,
            Some(existing) => {
                existing.push_str(" && ");
                existing.push_str(&condition);
            }
        }
    }

    fn into_statements(self) -> Vec<String> {
        self.entries
            .into_iter()
            .map(|(method, condition)| {
                if condition.is_empty() {
                    format!("allow {method};")
                } else {
                    format!("allow {method}: if {condition};")
                }
            })
            .collect()
    }
}

/// Reads `field` from the incoming document, substituting the type's
/// placeholder when the field is absent.
pub fn optional_accessor(field: &str, ty: FirestoreType) -> String {
    format!("getOr(request, '{field}', {})", ty.default_literal())
}

/// OR-joins one `is` check per allowed type, parenthesized when there is more
/// than one. `defaulted` selects the placeholder accessor.
fn type_check(rule: &StructureRule, defaulted: bool) -> String {
    let checks: Vec<String> = rule
        .types
        .iter()
        .map(|ty| {
            if defaulted {
                format!("{} is {ty}", optional_accessor(&rule.field, *ty))
            } else {
                format!("request.resource.data.{} is {ty}", rule.field)
            }
        })
        .collect();

    if checks.len() > 1 {
        format!("({})", checks.join(" || "))
    } else {
        checks.join(" || ")
    }
}

fn field_presence_check(required_fields: &[&str], exclusive: bool) -> String {
    let listed = required_fields
        .iter()
        .map(|field| format!("'{field}'"))
        .collect::<Vec<_>>()
        .join(", ");
    let operation = if exclusive { "hasOnly" } else { "hasAll" };
    format!("request.resource.data.keys().{operation}([{listed}])")
}

/// Merge one flattened node and its descendants into rule statements.
pub fn merge_match(node: &FlatMatch) -> MergedMatch {
    let mut accumulator = MethodConditions::default();

    for rule in &node.allow_rules {
        accumulator.apply_allow_rule(rule);
    }

    if !node.structure_rules.is_empty() {
        let mut required_fields: Vec<&str> = Vec::new();

        for rule in &node.structure_rules {
            if rule.required {
                required_fields.push(&rule.field);
            }
            if rule.types.is_empty() {
                continue;
            }

            accumulator.constrain(RuleMethod::Create, type_check(rule, !rule.required));
            accumulator.constrain(RuleMethod::Update, type_check(rule, true));
        }

        accumulator.constrain(
            RuleMethod::Create,
            field_presence_check(&required_fields, node.is_structure_exclusive),
        );
    }

    let rules = accumulator.into_statements();
    debug!(
        collection = %node.collection_path,
        statement_count = rules.len(),
        "merged node rules"
    );

    MergedMatch {
        collection_path: node.collection_path.clone(),
        wildcard_name: node.wildcard_name.clone(),
        is_wild_card_recursive: node.is_wild_card_recursive,
        rules,
        children: node.children.iter().map(merge_match).collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
