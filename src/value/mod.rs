pub mod error;

use compact_str::{CompactString, CompactStringExt};
use error::RuntimeErrorKind;

/// The two kinds of value a ZPM variable can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTag {
    Integer,
    Text,
}

impl std::fmt::Display for ValueTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueTag::Integer => write!(f, "Integer"),
            ValueTag::Text => write!(f, "Text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(CompactString),
}

/// Renders the value the way ZPM prints it, with text in double quotes.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "\"{v}\""),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.into())
    }
}

/// The arithmetic behind each compound assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Add => write!(f, "+="),
            Operator::Subtract => write!(f, "-="),
            Operator::Multiply => write!(f, "*="),
            Operator::Divide => write!(f, "\\="),
        }
    }
}

impl Value {
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Integer(_) => ValueTag::Integer,
            Value::Text(_) => ValueTag::Text,
        }
    }

    /// The value an unseen variable starts from before a compound assignment.
    pub fn zero(tag: ValueTag) -> Value {
        match tag {
            ValueTag::Integer => Value::Integer(0),
            ValueTag::Text => Value::Text(CompactString::default()),
        }
    }

    pub fn apply(&self, operator: Operator, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match operator {
            Operator::Add => self.add(other),
            Operator::Subtract => self.subtract(other),
            Operator::Multiply => self.multiply(other),
            Operator::Divide => self.divide(other),
        }
    }

    fn mismatch(&self, operator: Operator, other: &Value) -> RuntimeErrorKind {
        RuntimeErrorKind::TypeMismatch {
            operator,
            target: self.tag(),
            operand: other.tag(),
        }
    }

    // Arithmetic + string concatenation
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_add(*rhs)
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::ArithmeticOverflow),
            (Value::Text(lhs), Value::Text(rhs)) => Ok(Value::Text([lhs, rhs].concat_compact())),
            (lhs, rhs) => Err(lhs.mismatch(Operator::Add, rhs)),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_sub(*rhs)
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::ArithmeticOverflow),
            (lhs, rhs) => Err(lhs.mismatch(Operator::Subtract, rhs)),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_mul(*rhs)
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::ArithmeticOverflow),
            (lhs, rhs) => Err(lhs.mismatch(Operator::Multiply, rhs)),
        }
    }

    /// Truncating integer division. A zero divisor is reported before the operand types are
    /// looked at.
    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (_, Value::Integer(0)) => Err(RuntimeErrorKind::DivisionByZero),
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_div(*rhs)
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::ArithmeticOverflow),
            (lhs, rhs) => Err(lhs.mismatch(Operator::Divide, rhs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenation() {
        let lhs = Value::from("x");
        assert_eq!(lhs.add(&Value::from("y")), Ok(Value::from("xy")));
    }

    #[test]
    fn text_only_supports_addition() {
        let lhs = Value::from("x");
        assert_eq!(
            lhs.multiply(&Value::from(2)),
            Err(RuntimeErrorKind::TypeMismatch {
                operator: Operator::Multiply,
                target: ValueTag::Text,
                operand: ValueTag::Integer,
            })
        );
        assert!(matches!(
            lhs.subtract(&Value::from("y")),
            Err(RuntimeErrorKind::TypeMismatch { .. })
        ));
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(Value::from(7).divide(&Value::from(2)), Ok(Value::from(3)));
        assert_eq!(Value::from(-7).divide(&Value::from(2)), Ok(Value::from(-3)));
    }

    #[test]
    fn division_by_zero_wins_over_type_mismatch() {
        assert_eq!(
            Value::from("x").divide(&Value::from(0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            Value::from(i64::MAX).add(&Value::from(1)),
            Err(RuntimeErrorKind::ArithmeticOverflow)
        );
        assert_eq!(
            Value::from(i64::MIN).divide(&Value::from(-1)),
            Err(RuntimeErrorKind::ArithmeticOverflow)
        );
    }

    #[test]
    fn display_quotes_text() {
        assert_eq!(Value::from(-4).to_string(), "-4");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
    }
}
