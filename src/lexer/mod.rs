mod cursor;
mod error;
pub mod formatter;
mod state;
mod token;

use cursor::SourceChar;
pub use error::{LexicalError, LexicalErrorKind};
use state::{LexerState, LexerStateTransition};
use std::str::Chars;
pub use token::{Span, SpanIndex, SpanLength, Token, TokenKind};

/// Splits a single line of ZPM source into tokens, left to right.
///
/// A `FOR` keyword makes the lexer swallow everything up to its matching `ENDFOR`, so a
/// loop always reaches the interpreter as one [`TokenKind::Loop`] token.
#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Chars<'src>,
    state: LexerState,
    offset: SpanIndex,
    lookahead: Option<SourceChar>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            state: LexerState::default(),
            offset: 0.into(),
            lookahead: None,
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }
}

impl<'src> Lexer<'src> {
    fn next_char(&mut self) -> Option<SourceChar> {
        if let Some(lookahead) = self.lookahead.take() {
            return Some(lookahead);
        }
        let c = self.chars.next()?;
        let old_offset = self.offset;
        self.offset = self.offset + c.len_utf8();
        Some(SourceChar {
            value: c,
            offset: old_offset,
        })
    }

    fn put_back_char(&mut self, c: SourceChar) {
        self.lookahead = Some(c);
    }

    fn next_flat_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let next_char = self.next_char();
            let transition = self.state.execute(self.source, &next_char);

            match transition {
                LexerStateTransition::Stay => {}
                LexerStateTransition::ChangeState(new_state) => {
                    self.state = new_state;
                }
                LexerStateTransition::ChangeStateAndEmit {
                    new_state,
                    token_or_error,
                } => {
                    self.state = new_state;
                    return token_or_error;
                }
                LexerStateTransition::ChangeStateAndEmitAndPutBack {
                    new_state,
                    token_or_error,
                    put_back,
                } => {
                    self.state = new_state;
                    self.put_back_char(put_back);
                    return token_or_error;
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        let token = self.next_flat_token()?;
        match token.kind {
            TokenKind::KeywordFor => Ok(self.lex_loop(token.span)),
            _ => Ok(token),
        }
    }

    // Nested loops come back from `next_token` already folded, so the first `ENDFOR` seen
    // here is always the matching one.
    fn lex_loop(&mut self, start: Span) -> Token {
        let mut span = start;
        loop {
            match self.next_token() {
                Ok(Token {
                    kind: TokenKind::KeywordEndFor,
                    span: end,
                }) => {
                    return Token {
                        kind: TokenKind::Loop,
                        span: span.merge(&end),
                    };
                }
                Ok(Token {
                    kind: TokenKind::Eof,
                    ..
                }) => {
                    return Token {
                        kind: TokenKind::UnclosedLoop,
                        span: Span::new(start.start.into(), self.source.len()),
                    };
                }
                Ok(token) => span = span.merge(&token.span),
                Err(error) => span = span.merge(&error.span),
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Token {
                kind: TokenKind::Eof,
                ..
            }) => None,
            token_or_error => Some(token_or_error),
        }
    }
}

/// Lexes `source` the way the evaluator sees a line.
///
/// A line made of nothing but unrecognised text has no tokens and does nothing. Once a line
/// holds real tokens, any text the lexer could not read is reported as the first error, so a
/// statement is never run with part of it silently missing.
pub fn tokenize_line(source: &str) -> Result<Vec<Token>, LexicalError> {
    let mut tokens = Vec::new();
    let mut first_error = None;
    for token_or_error in Lexer::new(source) {
        match token_or_error {
            Ok(token) => tokens.push(token),
            Err(error) => {
                tracing::debug!("Unlexable text {:?}: {error}", &source[error.span.range()]);
                first_error.get_or_insert(error);
            }
        }
    }
    match first_error {
        Some(error) if !tokens.is_empty() => Err(error),
        _ => Ok(tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize_line(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn first_error(source: &str) -> LexicalError {
        tokenize_line(source).unwrap_err()
    }

    #[test]
    fn negative_literal_versus_minus_assign() {
        assert_eq!(
            kinds("b -= -5;"),
            vec![
                TokenKind::Ident,
                TokenKind::MinusEqual,
                TokenKind::IntegerLiteral,
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn both_division_spellings() {
        assert_eq!(kinds(r"c \= 2;")[1], TokenKind::DivideEqual);
        assert_eq!(kinds("c /= 2;")[1], TokenKind::DivideEqual);
    }

    #[test]
    fn nested_loop_is_one_token() {
        let source = "FOR 2 FOR 3 x += 1; ENDFOR ENDFOR y = 1;";
        let tokens = tokenize_line(source).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Loop);
        assert_eq!(
            tokens[0].lexeme(source),
            "FOR 2 FOR 3 x += 1; ENDFOR ENDFOR"
        );
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn loop_without_endfor() {
        let tokens = tokenize_line("FOR 2 x = 1;").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::UnclosedLoop);
    }

    #[test]
    fn noise_only_lines_have_no_tokens() {
        assert_eq!(tokenize_line("!@#$%^&()"), Ok(vec![]));
        assert_eq!(tokenize_line("   "), Ok(vec![]));
    }

    #[test]
    fn noise_next_to_tokens_is_an_error() {
        let error = first_error("# just a comment?");
        assert_eq!(error.kind, LexicalErrorKind::Unrecognized('#'));
        assert_eq!(error.span, Span::new(0, 1));

        let error = first_error("w = 1.;");
        assert_eq!(error.kind, LexicalErrorKind::Unrecognized('.'));
        assert_eq!(error.span, Span::new(5, 6));

        let error = first_error("z = +4;");
        assert_eq!(error.kind, LexicalErrorKind::Unrecognized('+'));
    }

    #[test]
    fn numbers_and_names_must_be_delimited() {
        let error = first_error("x = 5abc;");
        assert_eq!(error.kind, LexicalErrorKind::Undelimited);
        assert_eq!(error.span, Span::new(4, 8));

        let source = "café = 1;";
        let error = first_error(source);
        assert_eq!(error.kind, LexicalErrorKind::Undelimited);
        assert_eq!(&source[error.span.range()], "café");

        assert_eq!(
            kinds("x=5;"),
            vec![
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::IntegerLiteral,
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn unclosed_string_reports_an_error() {
        let mut lexer = Lexer::new("s = \"abc");
        assert_eq!(lexer.next_token().map(|t| t.kind), Ok(TokenKind::Ident));
        assert_eq!(lexer.next_token().map(|t| t.kind), Ok(TokenKind::Equal));
        let error = lexer.next_token().unwrap_err();
        assert_eq!(error.kind, LexicalErrorKind::UnclosedString);
        assert_eq!(error.span, Span::new(4, 8));
        assert_eq!(lexer.next_token().map(|t| t.kind), Ok(TokenKind::Eof));
    }
}
