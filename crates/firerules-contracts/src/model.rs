//! The policy model: a tree of `Match` nodes with their permission and
//! structure rules.
//!
//! A `Model` is decoded once per compilation from an already-validated JSON
//! document and never mutated afterwards; every pipeline pass builds a new
//! tree from it.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{
    error::{FireRulesError, FireRulesResult},
    expression::ConditionEntry,
    method::{FirestoreType, RuleMethod},
};

/// The root of a policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// The outermost match path, e.g. `/databases/{database}/documents`.
    pub top_level_match_path: String,
    #[serde(default)]
    pub matches: Vec<Match>,
    /// Helper functions copied verbatim into the rendered rules.
    #[serde(default)]
    pub custom_functions: Vec<String>,
}

impl Model {
    /// Decode a JSON document into a `Model`.
    ///
    /// Returns `FireRulesError::UnsupportedType` for a structure rule type
    /// outside the closed type set, and `FireRulesError::InvalidModel` when a
    /// required field is missing, a value has the wrong type, an enum token
    /// is unknown, or an allow rule declares no methods.
    pub fn from_value(value: serde_json::Value) -> FireRulesResult<Self> {
        check_structure_types(value.get("matches"))?;

        let model: Model = serde_json::from_value(value).map_err(|e| FireRulesError::InvalidModel {
            reason: e.to_string(),
        })?;

        for node in &model.matches {
            node.check_methods()?;
        }
        Ok(model)
    }
}

/// Parse every `structureRules[*].type[*]` name in a list of raw match
/// nodes, descending into `children`. Entries that are not strings are left
/// for the decoder to reject.
fn check_structure_types(nodes: Option<&serde_json::Value>) -> FireRulesResult<()> {
    let Some(nodes) = nodes.and_then(serde_json::Value::as_array) else {
        return Ok(());
    };
    for node in nodes {
        let rules = node
            .get("structureRules")
            .and_then(serde_json::Value::as_array)
            .into_iter()
            .flatten();
        for rule in rules {
            let names = rule
                .get("type")
                .and_then(serde_json::Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(serde_json::Value::as_str);
            for name in names {
                name.parse::<FirestoreType>()?;
            }
        }
        check_structure_types(node.get("children"))?;
    }
    Ok(())
}

/// One path segment of the document hierarchy: a collection plus the
/// wildcard bound to the documents in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Relative path, no leading or trailing `/`.
    pub collection_path: String,
    pub wildcard_name: String,
    /// Bind the wildcard as `{name=**}` so it also matches descendants.
    #[serde(default)]
    pub is_wild_card_recursive: bool,
    #[serde(default)]
    pub allow_rules: Vec<AllowRule>,
    #[serde(default)]
    pub structure_rules: Vec<StructureRule>,
    /// Use `hasOnly` instead of `hasAll` for the required-field check.
    #[serde(default)]
    pub is_structure_exclusive: bool,
    #[serde(default)]
    pub children: Vec<Match>,
}

impl Match {
    pub fn new(collection_path: impl Into<String>, wildcard_name: impl Into<String>) -> Self {
        Self {
            collection_path: collection_path.into(),
            wildcard_name: wildcard_name.into(),
            is_wild_card_recursive: false,
            allow_rules: Vec::new(),
            structure_rules: Vec::new(),
            is_structure_exclusive: false,
            children: Vec::new(),
        }
    }

    pub fn with_allow(mut self, rule: AllowRule) -> Self {
        self.allow_rules.push(rule);
        self
    }

    pub fn with_structure(mut self, rule: StructureRule) -> Self {
        self.structure_rules.push(rule);
        self
    }

    pub fn with_child(mut self, child: Match) -> Self {
        self.children.push(child);
        self
    }

    pub fn recursive(mut self) -> Self {
        self.is_wild_card_recursive = true;
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.is_structure_exclusive = true;
        self
    }

    fn check_methods(&self) -> FireRulesResult<()> {
        if self.allow_rules.iter().any(|rule| rule.methods.is_empty()) {
            return Err(FireRulesError::InvalidModel {
                reason: format!(
                    "allow rule on '{}/{{{}}}' must declare at least one method",
                    self.collection_path, self.wildcard_name
                ),
            });
        }
        self.children.iter().try_for_each(Match::check_methods)
    }
}

/// A permission grant for one or more methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowRule {
    pub methods: Vec<RuleMethod>,
    /// AND-combined conditions.
    #[serde(default)]
    pub conditions: Vec<ConditionEntry>,
    /// Require a signed-in user (`request.auth != null`).
    #[serde(default)]
    pub require_auth: bool,
    #[serde(default)]
    pub required_claims: Vec<RequiredClaim>,
}

impl AllowRule {
    pub fn new(methods: impl IntoIterator<Item = RuleMethod>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
            conditions: Vec::new(),
            require_auth: false,
            required_claims: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<ConditionEntry>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn with_auth(mut self) -> Self {
        self.require_auth = true;
        self
    }

    pub fn with_claim(mut self, claim: RequiredClaim) -> Self {
        self.required_claims.push(claim);
        self
    }
}

/// A custom auth token claim that must be present, optionally with a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredClaim {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ClaimValue>,
}

impl RequiredClaim {
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn equal_to(name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// The value a claim is compared against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl<'de> Deserialize<'de> for ClaimValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Bool(b) => Ok(ClaimValue::Bool(b)),
            serde_json::Value::Number(n) => Ok(ClaimValue::Number(n)),
            serde_json::Value::String(s) => Ok(ClaimValue::String(s)),
            other => Err(de::Error::custom(format!(
                "claim value must be a string, number or boolean, got {other}"
            ))),
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::String(value.to_string())
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Number(value.into())
    }
}

/// Renders the value as a rule-language literal. Strings are double-quoted
/// with JSON escaping.
impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::Bool(b) => write!(f, "{b}"),
            ClaimValue::Number(n) => write!(f, "{n}"),
            ClaimValue::String(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
        }
    }
}

/// A shape constraint on one document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRule {
    pub field: String,
    /// Allowed types, OR-combined. Empty means existence only.
    #[serde(default, rename = "type")]
    pub types: Vec<FirestoreType>,
    #[serde(default)]
    pub required: bool,
}

impl StructureRule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            types: Vec::new(),
            required: false,
        }
    }

    pub fn of_type(mut self, ty: FirestoreType) -> Self {
        self.types.push(ty);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
