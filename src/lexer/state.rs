use super::cursor::SourceChar;
use super::token::{Span, SpanIndex, Token, TokenKind, KEYWORD_HASHMAP};
use super::{LexicalError, LexicalErrorKind};

pub enum LexerStateTransition {
    Stay,
    ChangeState(LexerState),
    ChangeStateAndEmit {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
    },
    ChangeStateAndEmitAndPutBack {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
        put_back: SourceChar,
    },
}

impl LexerStateTransition {
    /// Emits a token that ended just before `next_char`, handing that character back to the
    /// lexer so the normal state can look at it again.
    fn emit_before(
        next_char: &Option<SourceChar>,
        token_or_error: Result<Token, LexicalError>,
    ) -> Self {
        match next_char {
            Some(c) => LexerStateTransition::ChangeStateAndEmitAndPutBack {
                new_state: LexerState::Normal,
                token_or_error,
                put_back: *c,
            },
            None => LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token_or_error,
            },
        }
    }

    fn emit(token_or_error: Result<Token, LexicalError>) -> Self {
        LexerStateTransition::ChangeStateAndEmit {
            new_state: LexerState::Normal,
            token_or_error,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub enum LexerState {
    #[default]
    Normal,
    Ident {
        start: SpanIndex,
    },
    Integer {
        start: SpanIndex,
    },
    String {
        start: SpanIndex,
    },
    // A '-' which may start either `-=` or a negative integer literal.
    Minus {
        start: SpanIndex,
    },
    // One of `+`, `*`, `\` or `/` waiting for its trailing `=`.
    CompoundAssign {
        start: SpanIndex,
        first: char,
    },
    // A number or name that ran straight into letters it cannot hold, e.g. `5abc` or `café`.
    Undelimited {
        start: SpanIndex,
    },
}

impl LexerState {
    pub fn execute(&self, source: &str, next_char: &Option<SourceChar>) -> LexerStateTransition {
        match *self {
            LexerState::Normal => Self::execute_normal(source, next_char),
            LexerState::Ident { start } => Self::execute_ident(source, start, next_char),
            LexerState::Integer { start } => Self::execute_integer(source, start, next_char),
            LexerState::String { start } => Self::execute_string(source, start, next_char),
            LexerState::Minus { start } => Self::execute_minus(start, next_char),
            LexerState::CompoundAssign { start, first } => {
                Self::execute_compound_assign(start, first, next_char)
            }
            LexerState::Undelimited { start } => {
                Self::execute_undelimited(source, start, next_char)
            }
        }
    }

    fn execute_normal(source: &str, next_char: &Option<SourceChar>) -> LexerStateTransition {
        let Some(c) = next_char else {
            return LexerStateTransition::emit(Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(source.len(), source.len()),
            }));
        };

        let start = c.offset;
        let just = |kind: TokenKind| {
            LexerStateTransition::emit(Ok(Token {
                kind,
                span: Span::new(start.into(), c.next_offset().into()),
            }))
        };

        match c.value {
            ';' => just(TokenKind::Semicolon),
            '=' => just(TokenKind::Equal),
            '-' => LexerStateTransition::ChangeState(LexerState::Minus { start }),
            '+' | '*' | '\\' | '/' => LexerStateTransition::ChangeState(LexerState::CompoundAssign {
                start,
                first: c.value,
            }),
            '0'..='9' => LexerStateTransition::ChangeState(LexerState::Integer { start }),
            'a'..='z' | 'A'..='Z' | '_' => {
                LexerStateTransition::ChangeState(LexerState::Ident { start })
            }
            '"' => LexerStateTransition::ChangeState(LexerState::String { start }),
            value if value.is_whitespace() => LexerStateTransition::Stay,
            value => LexerStateTransition::emit(Err(LexicalError {
                kind: LexicalErrorKind::Unrecognized(value),
                span: Span::new(start.into(), c.next_offset().into()),
            })),
        }
    }

    fn execute_ident(
        source: &str,
        start: SpanIndex,
        next_char: &Option<SourceChar>,
    ) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value.is_ascii_alphanumeric() || c.value == '_' => {
                LexerStateTransition::Stay
            }
            Some(c) if c.value.is_alphanumeric() => {
                LexerStateTransition::ChangeState(LexerState::Undelimited { start })
            }
            _ => {
                let end = next_char.map_or(source.len(), |c| c.offset.into());
                let span = Span::new(start.into(), end);
                let kind = KEYWORD_HASHMAP
                    .get(&source[span.range()])
                    .copied()
                    .unwrap_or(TokenKind::Ident);
                LexerStateTransition::emit_before(next_char, Ok(Token { kind, span }))
            }
        }
    }

    fn execute_integer(
        source: &str,
        start: SpanIndex,
        next_char: &Option<SourceChar>,
    ) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value.is_ascii_digit() => LexerStateTransition::Stay,
            Some(c) if c.value.is_alphanumeric() || c.value == '_' => {
                LexerStateTransition::ChangeState(LexerState::Undelimited { start })
            }
            _ => {
                let end = next_char.map_or(source.len(), |c| c.offset.into());
                LexerStateTransition::emit_before(
                    next_char,
                    Ok(Token {
                        kind: TokenKind::IntegerLiteral,
                        span: Span::new(start.into(), end),
                    }),
                )
            }
        }
    }

    fn execute_undelimited(
        source: &str,
        start: SpanIndex,
        next_char: &Option<SourceChar>,
    ) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value.is_alphanumeric() || c.value == '_' => LexerStateTransition::Stay,
            _ => {
                let end = next_char.map_or(source.len(), |c| c.offset.into());
                LexerStateTransition::emit_before(
                    next_char,
                    Err(LexicalError {
                        kind: LexicalErrorKind::Undelimited,
                        span: Span::new(start.into(), end),
                    }),
                )
            }
        }
    }

    fn execute_string(
        source: &str,
        start: SpanIndex,
        next_char: &Option<SourceChar>,
    ) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value == '"' => LexerStateTransition::emit(Ok(Token {
                kind: TokenKind::StringLiteral,
                span: Span::new(start.into(), c.next_offset().into()),
            })),
            Some(_) => LexerStateTransition::Stay,
            None => LexerStateTransition::emit(Err(LexicalError {
                kind: LexicalErrorKind::UnclosedString,
                span: Span::new(start.into(), source.len()),
            })),
        }
    }

    fn execute_minus(start: SpanIndex, next_char: &Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value == '=' => LexerStateTransition::emit(Ok(Token {
                kind: TokenKind::MinusEqual,
                span: Span::new(start.into(), c.next_offset().into()),
            })),
            Some(c) if c.value.is_ascii_digit() => {
                LexerStateTransition::ChangeState(LexerState::Integer { start })
            }
            _ => LexerStateTransition::emit_before(
                next_char,
                Err(LexicalError {
                    kind: LexicalErrorKind::Unrecognized('-'),
                    span: Span::new(start.into(), usize::from(start) + 1),
                }),
            ),
        }
    }

    fn execute_compound_assign(
        start: SpanIndex,
        first: char,
        next_char: &Option<SourceChar>,
    ) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value == '=' => {
                let kind = match first {
                    '+' => TokenKind::PlusEqual,
                    '*' => TokenKind::StarEqual,
                    _ => TokenKind::DivideEqual,
                };
                LexerStateTransition::emit(Ok(Token {
                    kind,
                    span: Span::new(start.into(), c.next_offset().into()),
                }))
            }
            _ => LexerStateTransition::emit_before(
                next_char,
                Err(LexicalError {
                    kind: LexicalErrorKind::Unrecognized(first),
                    span: Span::new(start.into(), usize::from(start) + first.len_utf8()),
                }),
            ),
        }
    }
}
