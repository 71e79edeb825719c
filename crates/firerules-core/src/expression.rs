//! Textual flattening of the model's expression and rule types.
//!
//! Every composite operand is wrapped in parentheses and no precedence
//! table is consulted. The output is verbose but a nested expression can
//! never rebind to a neighbouring operator.

use firerules_contracts::expression::{Condition, ConditionEntry, Field, Operand};

/// Conversion of a model value into its flattened form.
pub trait Flatten {
    type Flat;

    fn flatten(&self) -> Self::Flat;
}

/// Literals are emitted verbatim; a nested `Field` is parenthesized.
fn render_operand(operand: &Operand) -> String {
    match operand {
        Operand::Literal(text) => text.clone(),
        Operand::Expression(field) => format!("({})", field.flatten()),
    }
}

impl Flatten for Field {
    type Flat = String;

    fn flatten(&self) -> String {
        format!(
            "{} {} {}",
            render_operand(&self.field_a),
            self.operator,
            render_operand(&self.field_b)
        )
    }
}

impl Flatten for Condition {
    type Flat = String;

    fn flatten(&self) -> String {
        if let Some(text) = &self.custom_override {
            return text.clone();
        }

        let expr = format!(
            "{} {} {}",
            render_operand(&self.field_a),
            self.comparator,
            render_operand(&self.field_b)
        );

        if self.is_inverted {
            format!("!({expr})")
        } else {
            expr
        }
    }
}

impl Flatten for ConditionEntry {
    type Flat = String;

    fn flatten(&self) -> String {
        match self {
            ConditionEntry::Literal(text) => text.clone(),
            ConditionEntry::Condition(condition) => condition.flatten(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use firerules_contracts::expression::{
        ArithmeticOperator, Comparator, Condition, ConditionEntry, Field,
    };

    use super::Flatten;

    // ── Field ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_field_with_literal_leaves_is_unwrapped() {
        let field = Field::new("fieldA", Comparator::Eq, "fieldB");
        assert_eq!(field.flatten(), "fieldA == fieldB");
    }

    /// Nested fields are parenthesized on either side, leaves never are.
    #[test]
    fn test_field_parenthesizes_nested_operands() {
        let sum = Field::new("a", ArithmeticOperator::Add, "b");
        let product = Field::new(sum.clone(), ArithmeticOperator::Mul, "c");
        assert_eq!(product.flatten(), "(a + b) * c");

        let both = Field::new(sum.clone(), ArithmeticOperator::Rem, sum);
        assert_eq!(both.flatten(), "(a + b) % (a + b)");
    }

    #[test]
    fn test_field_deep_nesting_keeps_every_group() {
        let inner = Field::new("x", ArithmeticOperator::Sub, "1");
        let middle = Field::new("2", ArithmeticOperator::Div, inner);
        let outer = Field::new(middle, Comparator::Gte, "y");
        assert_eq!(outer.flatten(), "(2 / (x - 1)) >= y");
    }

    // ── Condition ─────────────────────────────────────────────────────────────

    #[test]
    fn test_condition_plain_comparison() {
        let condition = Condition::new("A", Comparator::Eq, "B");
        assert_eq!(condition.flatten(), "A == B");
    }

    #[test]
    fn test_condition_inverted_wraps_whole_expression() {
        let condition = Condition::new("A", Comparator::Eq, "B").inverted();
        assert_eq!(condition.flatten(), "!(A == B)");
    }

    /// Logical comparators are not wrapped unless the condition is inverted.
    #[test]
    fn test_condition_logical_comparator_only_wrapped_when_inverted() {
        let condition = Condition::new("a", Comparator::Or, "b");
        assert_eq!(condition.flatten(), "a || b");
        assert_eq!(condition.inverted().flatten(), "!(a || b)");
    }

    #[test]
    fn test_condition_field_operands_are_parenthesized() {
        let sum = Field::new("resource.data.count", ArithmeticOperator::Add, "1");
        let condition = Condition::new(sum, Comparator::Lte, "100");
        assert_eq!(condition.flatten(), "(resource.data.count + 1) <= 100");

        let inverted = condition.inverted();
        assert_eq!(inverted.flatten(), "!((resource.data.count + 1) <= 100)");
    }

    #[test]
    fn test_condition_custom_override_ignores_everything_else() {
        let condition = Condition::new("A", Comparator::In, "B")
            .inverted()
            .with_override("exists(/databases/$(database)/documents/admins/$(request.auth.uid))");
        assert_eq!(
            condition.flatten(),
            "exists(/databases/$(database)/documents/admins/$(request.auth.uid))"
        );
    }

    // ── ConditionEntry ────────────────────────────────────────────────────────

    #[test]
    fn test_condition_entry_literal_passes_through() {
        let entry = ConditionEntry::from("request.time < timestamp.date(2030, 1, 1)");
        assert_eq!(entry.flatten(), "request.time < timestamp.date(2030, 1, 1)");
    }

    #[test]
    fn test_condition_entry_dispatches_to_condition() {
        let entry = ConditionEntry::from(Condition::new("x", Comparator::Is, "string"));
        assert_eq!(entry.flatten(), "x is string");
    }
}
