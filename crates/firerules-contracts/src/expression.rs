//! Expression trees used to build rule conditions.
//!
//! A `Condition` compares two operands; each operand is either raw
//! rule-language text or a nested `Field` expression. Leaves are never
//! escaped or checked, they are emitted exactly as written.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Operator joining the two sides of a `Condition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
            Comparator::Eq => "==",
            Comparator::Neq => "!=",
            Comparator::Gte => ">=",
            Comparator::Gt => ">",
            Comparator::In => "in",
            Comparator::Is => "is",
            Comparator::And => "&&",
            Comparator::Or => "||",
        };
        f.write_str(token)
    }
}

/// Operator joining the two sides of a `Field`: any comparator, or arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldOperator {
    Compare(Comparator),
    Arithmetic(ArithmeticOperator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Sub => "-",
            ArithmeticOperator::Mul => "*",
            ArithmeticOperator::Div => "/",
            ArithmeticOperator::Rem => "%",
        };
        f.write_str(token)
    }
}

impl fmt::Display for FieldOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldOperator::Compare(op) => write!(f, "{op}"),
            FieldOperator::Arithmetic(op) => write!(f, "{op}"),
        }
    }
}

impl FieldOperator {
    /// Look up an operator by its rule-language token.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "<" => Comparator::Lt.into(),
            "<=" => Comparator::Lte.into(),
            "==" => Comparator::Eq.into(),
            "!=" => Comparator::Neq.into(),
            ">=" => Comparator::Gte.into(),
            ">" => Comparator::Gt.into(),
            "in" => Comparator::In.into(),
            "is" => Comparator::Is.into(),
            "&&" => Comparator::And.into(),
            "||" => Comparator::Or.into(),
            "+" => ArithmeticOperator::Add.into(),
            "-" => ArithmeticOperator::Sub.into(),
            "*" => ArithmeticOperator::Mul.into(),
            "/" => ArithmeticOperator::Div.into(),
            "%" => ArithmeticOperator::Rem.into(),
            _ => return None,
        };
        Some(op)
    }
}

impl<'de> Deserialize<'de> for FieldOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        FieldOperator::from_token(&token)
            .ok_or_else(|| de::Error::custom(format!("unknown operator `{token}`")))
    }
}

impl From<Comparator> for FieldOperator {
    fn from(op: Comparator) -> Self {
        FieldOperator::Compare(op)
    }
}

impl From<ArithmeticOperator> for FieldOperator {
    fn from(op: ArithmeticOperator) -> Self {
        FieldOperator::Arithmetic(op)
    }
}

/// One side of a `Field` or `Condition`.
///
/// In JSON a string is a `Literal` and an object is an `Expression`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Literal(String),
    Expression(Box<Field>),
}

impl<'de> Deserialize<'de> for Operand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => Ok(Operand::Literal(text)),
            other => serde_json::from_value::<Field>(other)
                .map(|field| Operand::Expression(Box::new(field)))
                .map_err(|e| de::Error::custom(format!("invalid field expression: {e}"))),
        }
    }
}

impl From<&str> for Operand {
    fn from(text: &str) -> Self {
        Operand::Literal(text.to_string())
    }
}

impl From<String> for Operand {
    fn from(text: String) -> Self {
        Operand::Literal(text)
    }
}

impl From<Field> for Operand {
    fn from(field: Field) -> Self {
        Operand::Expression(Box::new(field))
    }
}

/// A binary arithmetic or logical expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub field_a: Operand,
    pub operator: FieldOperator,
    pub field_b: Operand,
}

impl Field {
    pub fn new(
        field_a: impl Into<Operand>,
        operator: impl Into<FieldOperator>,
        field_b: impl Into<Operand>,
    ) -> Self {
        Self {
            field_a: field_a.into(),
            operator: operator.into(),
            field_b: field_b.into(),
        }
    }
}

/// A boolean comparison between two operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_a: Operand,
    pub comparator: Comparator,
    pub field_b: Operand,

    /// Prefix the whole comparison with `!`.
    #[serde(default)]
    pub is_inverted: bool,

    /// Literal text emitted instead of the comparison. When set, every other
    /// field is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_override: Option<String>,
}

impl Condition {
    pub fn new(
        field_a: impl Into<Operand>,
        comparator: Comparator,
        field_b: impl Into<Operand>,
    ) -> Self {
        Self {
            field_a: field_a.into(),
            comparator,
            field_b: field_b.into(),
            is_inverted: false,
            custom_override: None,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.is_inverted = true;
        self
    }

    pub fn with_override(mut self, text: impl Into<String>) -> Self {
        self.custom_override = Some(text.into());
        self
    }
}

/// An entry of `AllowRule::conditions`: raw rule text or a `Condition`.
///
/// Decoding dispatches on the JSON shape, so a malformed condition object
/// reports what is wrong with it rather than failing both alternatives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionEntry {
    Literal(String),
    Condition(Condition),
}

impl<'de> Deserialize<'de> for ConditionEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => Ok(ConditionEntry::Literal(text)),
            other => serde_json::from_value::<Condition>(other)
                .map(ConditionEntry::Condition)
                .map_err(|e| de::Error::custom(format!("invalid condition: {e}"))),
        }
    }
}

impl From<&str> for ConditionEntry {
    fn from(text: &str) -> Self {
        ConditionEntry::Literal(text.to_string())
    }
}

impl From<Condition> for ConditionEntry {
    fn from(condition: Condition) -> Self {
        ConditionEntry::Condition(condition)
    }
}
