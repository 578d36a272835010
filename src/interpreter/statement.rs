use crate::lexer::{Span, Token, TokenKind};
use std::ops::Range;

/// A piece of a physical source line together with its byte offset in that line.
///
/// Loop bodies are re-lexed from fragments, so spans found in them have to be moved back
/// onto the line before they end up in an error.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'src> {
    pub text: &'src str,
    pub offset: usize,
}

impl<'src> Fragment<'src> {
    pub fn line(text: &'src str) -> Self {
        Self { text, offset: 0 }
    }

    pub fn lexeme(&self, token: &Token) -> &'src str {
        &self.text[token.span.range()]
    }

    pub fn locate(&self, span: Span) -> Span {
        span.shift(self.offset)
    }

    pub fn slice(&self, range: Range<usize>) -> Fragment<'src> {
        Fragment {
            text: &self.text[range.clone()],
            offset: self.offset + range.start,
        }
    }
}

/// Groups a line's tokens into statements.
///
/// A loop token stands alone, `PRINT name` may omit its `;`, and everything else runs up to
/// and including the next `;` (or the end of the tokens).
pub fn split_statements(tokens: &[Token]) -> Vec<&[Token]> {
    let mut statements = Vec::new();
    let mut rest = tokens;
    while !rest.is_empty() {
        let (statement, tail) = rest.split_at(statement_length(rest));
        statements.push(statement);
        rest = tail;
    }
    statements
}

fn statement_length(tokens: &[Token]) -> usize {
    let kind_at = |index: usize| tokens.get(index).map(|token| token.kind);
    match tokens[0].kind {
        TokenKind::Loop | TokenKind::UnclosedLoop => 1,
        TokenKind::KeywordPrint => {
            let mut length = 1;
            if kind_at(length) == Some(TokenKind::Ident) {
                length += 1;
            }
            if kind_at(length) == Some(TokenKind::Semicolon) {
                length += 1;
            }
            length
        }
        _ => tokens
            .iter()
            .position(|token| token.kind == TokenKind::Semicolon)
            .map_or(tokens.len(), |index| index + 1),
    }
}

/// The span covering a whole statement.
pub fn statement_span(statement: &[Token]) -> Span {
    match (statement.first(), statement.last()) {
        (Some(first), Some(last)) => first.span.merge(&last.span),
        _ => Span::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize_line;

    fn groups(source: &str) -> Vec<&str> {
        let tokens = tokenize_line(source).unwrap();
        split_statements(&tokens)
            .into_iter()
            .map(|statement| &source[statement_span(statement).range()])
            .collect()
    }

    #[test]
    fn several_statements_on_one_line() {
        assert_eq!(groups("a = 1; a += 2;"), vec!["a = 1;", "a += 2;"]);
    }

    #[test]
    fn print_without_terminator() {
        assert_eq!(groups("PRINT a x = 1;"), vec!["PRINT a", "x = 1;"]);
        assert_eq!(groups("PRINT a; PRINT b"), vec!["PRINT a;", "PRINT b"]);
    }

    #[test]
    fn loop_stands_alone() {
        assert_eq!(
            groups("FOR 2 x += 1; ENDFOR PRINT x;"),
            vec!["FOR 2 x += 1; ENDFOR", "PRINT x;"]
        );
    }

    #[test]
    fn unterminated_assignment_runs_to_end() {
        assert_eq!(groups("x = 1 y = 2"), vec!["x = 1 y = 2"]);
    }

    #[test]
    fn fragment_offsets_accumulate() {
        let line = Fragment::line("    FOR 1 x = 1; ENDFOR");
        let body = line.slice(4..23).slice(6..12);
        assert_eq!(body.text, "x = 1;");
        assert_eq!(body.offset, 10);
        assert_eq!(body.locate(Span::new(0, 1)), Span::new(10, 11));
    }
}
