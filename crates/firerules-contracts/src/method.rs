//! Rule methods and the Firestore types structure rules can assert.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FireRulesError;

/// A method an `allow` statement can grant.
///
/// `Read` and `Write` are the coarse forms; method expansion rewrites them to
/// `Get`/`List` and `Create`/`Update`/`Delete` on nodes that have children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMethod {
    Read,
    Write,
    Get,
    List,
    Create,
    Update,
    Delete,
}

impl RuleMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleMethod::Read => "read",
            RuleMethod::Write => "write",
            RuleMethod::Get => "get",
            RuleMethod::List => "list",
            RuleMethod::Create => "create",
            RuleMethod::Update => "update",
            RuleMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for RuleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Firestore value type usable on the right-hand side of `is`.
///
/// Deserialized through `FromStr`. `Model::from_value` parses the raw names
/// before decoding, so an unknown name surfaces as
/// `FireRulesError::UnsupportedType` rather than a generic decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum FirestoreType {
    Bool,
    Bytes,
    Float,
    Int,
    List,
    Latlng,
    Number,
    Path,
    Map,
    String,
    Timestamp,
}

impl FirestoreType {
    /// Every supported type, in declaration order.
    pub const ALL: [FirestoreType; 11] = [
        FirestoreType::Bool,
        FirestoreType::Bytes,
        FirestoreType::Float,
        FirestoreType::Int,
        FirestoreType::List,
        FirestoreType::Latlng,
        FirestoreType::Number,
        FirestoreType::Path,
        FirestoreType::Map,
        FirestoreType::String,
        FirestoreType::Timestamp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FirestoreType::Bool => "bool",
            FirestoreType::Bytes => "bytes",
            FirestoreType::Float => "float",
            FirestoreType::Int => "int",
            FirestoreType::List => "list",
            FirestoreType::Latlng => "latlng",
            FirestoreType::Number => "number",
            FirestoreType::Path => "path",
            FirestoreType::Map => "map",
            FirestoreType::String => "string",
            FirestoreType::Timestamp => "timestamp",
        }
    }

    /// The literal substituted for an absent optional field of this type, so
    /// a type check against it still succeeds.
    pub fn default_literal(&self) -> &'static str {
        match self {
            FirestoreType::Bool => "false",
            FirestoreType::String => "''",
            FirestoreType::Number | FirestoreType::Int | FirestoreType::Float => "0",
            FirestoreType::Bytes => r"b'\x2A'",
            FirestoreType::List => "[]",
            FirestoreType::Map => "{}",
            FirestoreType::Latlng => "latlng.value(0,0)",
            FirestoreType::Timestamp => "timestamp.date(2000, 1, 1)",
            FirestoreType::Path => "path('')",
        }
    }
}

impl fmt::Display for FirestoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FirestoreType {
    type Err = FireRulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FirestoreType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FireRulesError::UnsupportedType {
                type_name: s.to_string(),
            })
    }
}

impl TryFrom<String> for FirestoreType {
    type Error = FireRulesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
