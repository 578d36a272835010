use super::token::{Token, TokenKind};
use crate::lexer::{Lexer, LexicalError};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self, line: u32) -> F;
}

/// Formats tokens as `KIND lexeme`, followed by the literal value for numbers and strings.
pub struct BasicFormatter<'src> {
    text: &'src str,
    line: u32,
}

impl<'src> ToFormatter<BasicFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self, line: u32) -> BasicFormatter<'src> {
        BasicFormatter {
            text: self.get_source(),
            line,
        }
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let lexeme = &self.text[token.span.range()];
        match token.kind {
            TokenKind::Eof => "EOF".into(),
            TokenKind::IntegerLiteral => match lexeme.parse::<i64>() {
                Ok(value) => format!("NUMBER {lexeme} {value}"),
                Err(_) => format!("NUMBER {lexeme} overflow"),
            },
            TokenKind::StringLiteral => {
                let value = &lexeme[1..lexeme.len() - 1];
                format!("STRING {lexeme} {value}")
            }
            kind => format!("{kind} {lexeme}"),
        }
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!(
            "LEXICAL ERROR: Line {}: {} at '{}'",
            self.line,
            error.kind,
            &self.text[error.span.range()]
        )
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self, _line: u32) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}
