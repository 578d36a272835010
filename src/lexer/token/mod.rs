mod span;

pub use span::{SpanIndex, SpanLength};
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Range;
use std::sync::LazyLock;

/// The hashmap for keywords. Keywords are case sensitive.
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("FOR", TokenKind::KeywordFor);
    map.insert("ENDFOR", TokenKind::KeywordEndFor);
    map.insert("PRINT", TokenKind::KeywordPrint);
    map
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: SpanIndex,
    /// The length of the token in bytes.
    pub length: SpanLength,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.into(),
            length: (end - start).into(),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start.into()..(self.start + self.length).into()
    }

    pub fn end(&self) -> SpanIndex {
        self.start + self.length
    }

    pub fn merge(&self, other: &Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        let length = end - start;
        Span { start, length }
    }

    /// Moves the span right by `offset` bytes. Used to rebase a span found in a
    /// fragment of a line onto the line itself.
    pub fn shift(&self, offset: usize) -> Span {
        Span {
            start: self.start + offset,
            length: self.length,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // A whole `FOR ... ENDFOR` construct
    Loop,
    // A `FOR` that ran to the end of the line without its `ENDFOR`
    UnclosedLoop,

    // Assignment operators
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    DivideEqual,

    // Miscellaneous
    Semicolon,

    // Literals
    IntegerLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordFor,
    KeywordEndFor,
    KeywordPrint,

    // End of file.
    Eof,
}

impl TokenKind {
    pub fn is_assignment_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::DivideEqual
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Loop => write!(f, "FOR_LOOP"),
            TokenKind::UnclosedLoop => write!(f, "UNCLOSED_FOR_LOOP"),
            TokenKind::Equal => write!(f, "ASSIGN"),
            TokenKind::PlusEqual => write!(f, "PLUS_ASSIGN"),
            TokenKind::MinusEqual => write!(f, "MINUS_ASSIGN"),
            TokenKind::StarEqual => write!(f, "MULT_ASSIGN"),
            TokenKind::DivideEqual => write!(f, "DIV_ASSIGN"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::IntegerLiteral => write!(f, "NUMBER"),
            TokenKind::StringLiteral => write!(f, "STRING"),
            TokenKind::Ident => write!(f, "IDENTIFIER"),
            TokenKind::KeywordFor => write!(f, "FOR"),
            TokenKind::KeywordEndFor => write!(f, "ENDFOR"),
            TokenKind::KeywordPrint => write!(f, "PRINT"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn lexeme<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span.range()]
    }
}
