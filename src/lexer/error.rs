use super::token::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("unexpected character '{0}'")]
    Unrecognized(char),
    #[error("unterminated string literal")]
    UnclosedString,
    #[error("a number or name must end at whitespace or an operator")]
    Undelimited,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct LexicalError {
    #[source]
    pub kind: LexicalErrorKind,
    pub span: Span,
}
