use super::{Operator, ValueTag};
use crate::lexer::Span;
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Undefined variable '{0}'")]
    UndefinedVariable(CompactString),
    #[error("Type mismatch: cannot apply '{operator}' to {target} and {operand}")]
    TypeMismatch {
        operator: Operator,
        target: ValueTag,
        operand: ValueTag,
    },
    #[error("Divide by zero")]
    DivisionByZero,
    #[error("Malformed statement: {0}")]
    MalformedStatement(CompactString),
    #[error("Integer overflow")]
    ArithmeticOverflow,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    /// Byte span within the physical source line.
    pub span: Span,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::UndefinedVariable(_) => "RT001",
            RuntimeErrorKind::TypeMismatch { .. } => "RT002",
            RuntimeErrorKind::DivisionByZero => "RT003",
            RuntimeErrorKind::MalformedStatement(_) => "RT004",
            RuntimeErrorKind::ArithmeticOverflow => "RT005",
        }
    }
}
