//! Per-node flattening: allow rules and match trees with every expression
//! already rendered to text.
//!
//! The flat tree is what the merge pass consumes. Structure rules carry no
//! expressions and are copied across as they are.

use firerules_contracts::{
    method::RuleMethod,
    model::{AllowRule, Match, RequiredClaim, StructureRule},
};

use crate::expression::Flatten;

/// An allow rule reduced to its methods and one text condition per clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatAllowRule {
    /// Distinct methods, in first-occurrence order.
    pub methods: Vec<RuleMethod>,
    /// Not yet joined; the merge pass combines rules sharing a method.
    pub conditions: Vec<String>,
}

/// A `Match` whose allow rules have been flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMatch {
    pub collection_path: String,
    pub wildcard_name: String,
    pub is_wild_card_recursive: bool,
    pub allow_rules: Vec<FlatAllowRule>,
    pub structure_rules: Vec<StructureRule>,
    pub is_structure_exclusive: bool,
    pub children: Vec<FlatMatch>,
}

const AUTH_REQUIRED: &str = "request.auth != null";

/// Token accessor for a claim. Dot access only supports ASCII identifiers,
/// anything else goes through a single-quoted subscript.
fn claim_accessor(name: &str) -> String {
    if name.is_ascii() {
        format!("request.auth.token.{name}")
    } else {
        let quoted = name.replace('\\', "\\\\").replace('\'', "\\'");
        format!("request.auth.token['{quoted}']")
    }
}

fn claim_check(claim: &RequiredClaim) -> String {
    let accessor = claim_accessor(&claim.name);
    match &claim.value {
        None => format!("{accessor} != null"),
        Some(value) => format!("{accessor} == {value}"),
    }
}

impl Flatten for AllowRule {
    type Flat = FlatAllowRule;

    /// Conditions come first in declaration order, then the auth check, then
    /// one check per required claim.
    fn flatten(&self) -> FlatAllowRule {
        let mut methods: Vec<RuleMethod> = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            if !methods.contains(method) {
                methods.push(*method);
            }
        }

        let mut conditions: Vec<String> = self.conditions.iter().map(Flatten::flatten).collect();
        if self.require_auth {
            conditions.push(AUTH_REQUIRED.to_string());
        }
        conditions.extend(self.required_claims.iter().map(claim_check));

        FlatAllowRule { methods, conditions }
    }
}

impl Flatten for Match {
    type Flat = FlatMatch;

    fn flatten(&self) -> FlatMatch {
        FlatMatch {
            collection_path: self.collection_path.clone(),
            wildcard_name: self.wildcard_name.clone(),
            is_wild_card_recursive: self.is_wild_card_recursive,
            allow_rules: self.allow_rules.iter().map(Flatten::flatten).collect(),
            structure_rules: self.structure_rules.clone(),
            is_structure_exclusive: self.is_structure_exclusive,
            children: self.children.iter().map(Flatten::flatten).collect(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use firerules_contracts::{
        expression::{Comparator, Condition},
        method::{FirestoreType, RuleMethod},
        model::{AllowRule, Match, RequiredClaim, StructureRule},
    };

    use super::*;

    // ── AllowRule ─────────────────────────────────────────────────────────────

    /// Literal conditions, rendered conditions, auth, then claims, in order.
    #[test]
    fn test_allow_rule_flatten_orders_clauses() {
        let rule = AllowRule::new([RuleMethod::Get])
            .with_condition("A String")
            .with_condition(Condition::new("A", Comparator::Eq, "B").inverted())
            .with_auth()
            .with_claim(RequiredClaim::equal_to("ClaimA", "ValueA"))
            .with_claim(RequiredClaim::present("ClaimB"));

        assert_eq!(
            rule.flatten(),
            FlatAllowRule {
                methods: vec![RuleMethod::Get],
                conditions: vec![
                    "A String".to_string(),
                    "!(A == B)".to_string(),
                    "request.auth != null".to_string(),
                    "request.auth.token.ClaimA == \"ValueA\"".to_string(),
                    "request.auth.token.ClaimB != null".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_allow_rule_require_auth_alone() {
        let flat = AllowRule::new([RuleMethod::Read]).with_auth().flatten();
        assert_eq!(flat.conditions, vec!["request.auth != null".to_string()]);
    }

    #[test]
    fn test_allow_rule_without_clauses_has_no_conditions() {
        let flat = AllowRule::new([RuleMethod::Read, RuleMethod::Write]).flatten();
        assert_eq!(flat.methods, vec![RuleMethod::Read, RuleMethod::Write]);
        assert!(flat.conditions.is_empty());
    }

    #[test]
    fn test_allow_rule_renders_number_and_bool_claims_literally() {
        let flat = AllowRule::new([RuleMethod::Get])
            .with_claim(RequiredClaim::equal_to("level", 3_i64))
            .with_claim(RequiredClaim::equal_to("admin", true))
            .flatten();
        assert_eq!(
            flat.conditions,
            vec![
                "request.auth.token.level == 3".to_string(),
                "request.auth.token.admin == true".to_string(),
            ]
        );
    }

    #[test]
    fn test_allow_rule_non_ascii_claim_uses_subscript() {
        let flat = AllowRule::new([RuleMethod::Get])
            .with_claim(RequiredClaim::present("rôle"))
            .with_claim(RequiredClaim::equal_to("grupo_ñ", "a"))
            .flatten();
        assert_eq!(
            flat.conditions,
            vec![
                "request.auth.token['rôle'] != null".to_string(),
                "request.auth.token['grupo_ñ'] == \"a\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_allow_rule_subscript_claim_escapes_quotes() {
        let flat = AllowRule::new([RuleMethod::Get])
            .with_claim(RequiredClaim::present("o'ré"))
            .with_claim(RequiredClaim::present("ré\\x"))
            .flatten();
        assert_eq!(
            flat.conditions,
            vec![
                r"request.auth.token['o\'ré'] != null".to_string(),
                r"request.auth.token['ré\\x'] != null".to_string(),
            ]
        );
    }

    #[test]
    fn test_allow_rule_collapses_duplicate_methods() {
        let flat = AllowRule::new([RuleMethod::Get, RuleMethod::List, RuleMethod::Get]).flatten();
        assert_eq!(flat.methods, vec![RuleMethod::Get, RuleMethod::List]);
    }

    // ── Match ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_match_flatten_preserves_shape() {
        let node = Match::new("test", "test")
            .recursive()
            .exclusive()
            .with_allow(AllowRule::new([RuleMethod::Get]).with_auth())
            .with_structure(StructureRule::new("name").of_type(FirestoreType::String))
            .with_child(Match::new("child", "childId"));

        let flat = node.flatten();
        assert_eq!(flat.collection_path, "test");
        assert_eq!(flat.wildcard_name, "test");
        assert!(flat.is_wild_card_recursive);
        assert!(flat.is_structure_exclusive);
        assert_eq!(flat.allow_rules[0].conditions, vec!["request.auth != null".to_string()]);
        assert_eq!(flat.structure_rules, node.structure_rules);
        assert_eq!(flat.children.len(), 1);
        assert_eq!(flat.children[0].collection_path, "child");
        assert!(flat.children[0].children.is_empty());
    }
}
