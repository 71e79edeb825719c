//! Method expansion pass.
//!
//! On a node with children, `read` becomes `get` + `list` and `write` becomes
//! `create` + `update` + `delete`. Leaf nodes keep their coarse tokens. The
//! pass returns a new tree and recurses into every child whether or not the
//! parent has allow rules.

use tracing::debug;

use firerules_contracts::{
    method::RuleMethod,
    model::{AllowRule, Match},
};

const READ_METHODS: [RuleMethod; 2] = [RuleMethod::Get, RuleMethod::List];
const WRITE_METHODS: [RuleMethod; 3] = [RuleMethod::Create, RuleMethod::Update, RuleMethod::Delete];

fn expand_method(method: RuleMethod) -> &'static [RuleMethod] {
    match method {
        RuleMethod::Read => &READ_METHODS,
        RuleMethod::Write => &WRITE_METHODS,
        RuleMethod::Get => &[RuleMethod::Get],
        RuleMethod::List => &[RuleMethod::List],
        RuleMethod::Create => &[RuleMethod::Create],
        RuleMethod::Update => &[RuleMethod::Update],
        RuleMethod::Delete => &[RuleMethod::Delete],
    }
}

fn expand_rule(rule: &AllowRule) -> AllowRule {
    AllowRule {
        methods: rule
            .methods
            .iter()
            .flat_map(|method| expand_method(*method).iter().copied())
            .collect(),
        conditions: rule.conditions.clone(),
        require_auth: rule.require_auth,
        required_claims: rule.required_claims.clone(),
    }
}

/// Build the expanded copy of `node` and all of its descendants.
pub fn expand_methods(node: &Match) -> Match {
    let is_container = !node.children.is_empty();

    let allow_rules = if is_container {
        node.allow_rules.iter().map(expand_rule).collect()
    } else {
        node.allow_rules.clone()
    };

    debug!(
        collection = %node.collection_path,
        child_count = node.children.len(),
        expanded = is_container && !node.allow_rules.is_empty(),
        "method expansion"
    );

    Match {
        collection_path: node.collection_path.clone(),
        wildcard_name: node.wildcard_name.clone(),
        is_wild_card_recursive: node.is_wild_card_recursive,
        allow_rules,
        structure_rules: node.structure_rules.clone(),
        is_structure_exclusive: node.is_structure_exclusive,
        children: node.children.iter().map(expand_methods).collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
